use anyhow::{Context, Result};
use std::net::SocketAddr;
use std::time::Duration;

use tracing::{info, warn};

use axum::{
    extract::{Path, State},
    http::StatusCode,
    middleware,
    response::IntoResponse,
    routing::{get, post},
    Json, Router,
};
use serde::Serialize;

#[cfg(feature = "slowdown")]
use super::slowdown_request;
use super::{
    log_requests,
    request_bodies::{
        validate_id, validate_reference, AlbumBody, ArtistBody, CreateUserBody, TrackBody,
        UpdatePasswordBody, ValidatedJson,
    },
    state::*,
    ApiError, ServerConfig,
};
use crate::library_store::{
    generate_id, Album, AlbumUpdate, Artist, ArtistUpdate, EntityKind, FavoriteEntity,
    FavoriteKind, LibraryCounts, LibraryStore, PasswordUpdate, ResolvedFavorites, StoreError,
    Track, TrackUpdate, User, UserView,
};

#[derive(Serialize)]
struct ServerStats {
    pub version: &'static str,
    pub uptime: String,
    pub library: LibraryCounts,
}

fn format_uptime(duration: Duration) -> String {
    let total_seconds = duration.as_secs();

    let days = total_seconds / 86_400;
    let hours = (total_seconds % 86_400) / 3600;
    let minutes = (total_seconds % 3600) / 60;
    let seconds = total_seconds % 60;

    format!("{}d {:02}:{:02}:{:02}", days, hours, minutes, seconds)
}

async fn home(State(state): State<ServerState>) -> Result<Json<ServerStats>, ApiError> {
    let library = read_store(&state.store)?.counts();
    Ok(Json(ServerStats {
        version: env!("CARGO_PKG_VERSION"),
        uptime: format_uptime(state.start_time.elapsed()),
        library,
    }))
}

fn not_found(kind: EntityKind, id: &str) -> ApiError {
    StoreError::not_found(kind, id).into()
}

// =============================================================================
// Users
// =============================================================================

async fn get_users(
    State(store): State<GuardedLibraryStore>,
) -> Result<Json<Vec<UserView>>, ApiError> {
    let users = read_store(&store)?.list_users();
    Ok(Json(users.iter().map(UserView::from).collect()))
}

async fn get_user(
    State(store): State<GuardedLibraryStore>,
    Path(id): Path<String>,
) -> Result<Json<UserView>, ApiError> {
    validate_id(&id)?;
    let user = read_store(&store)?
        .get_user(&id)
        .ok_or_else(|| not_found(EntityKind::User, &id))?;
    Ok(Json(UserView::from(&user)))
}

async fn post_user(
    State(store): State<GuardedLibraryStore>,
    ValidatedJson(body): ValidatedJson<CreateUserBody>,
) -> Result<impl IntoResponse, ApiError> {
    // Hash before taking the lock, it is the slow part.
    let user = User::new(&body.login, &body.password)?;
    let user = write_store(&store)?.create_user(user);
    Ok((StatusCode::CREATED, Json(UserView::from(&user))))
}

async fn put_user_password(
    State(store): State<GuardedLibraryStore>,
    Path(id): Path<String>,
    ValidatedJson(body): ValidatedJson<UpdatePasswordBody>,
) -> Result<Json<UserView>, ApiError> {
    validate_id(&id)?;
    let update = PasswordUpdate::new(&body.old_password, &body.new_password)?;

    // Verify against a snapshot so the hash check runs without any lock held.
    let current = read_store(&store)?
        .get_user(&id)
        .ok_or_else(|| not_found(EntityKind::User, &id))?;
    if !current.password.verify(&update.old_password) {
        warn!("Wrong old password for user {}", id);
        return Err(StoreError::Forbidden.into());
    }

    let user = write_store(&store)?.replace_user_password(
        &id,
        current.version,
        update.new_password,
    )?;
    Ok(Json(UserView::from(&user)))
}

async fn delete_user(
    State(store): State<GuardedLibraryStore>,
    Path(id): Path<String>,
) -> Result<StatusCode, ApiError> {
    validate_id(&id)?;
    write_store(&store)?.delete_user(&id)?;
    Ok(StatusCode::NO_CONTENT)
}

// =============================================================================
// Tracks
// =============================================================================

fn validate_track_references(
    store: &dyn LibraryStore,
    body: &TrackBody,
) -> Result<(), ApiError> {
    validate_reference(store, EntityKind::Artist, body.artist_id.as_deref())?;
    validate_reference(store, EntityKind::Album, body.album_id.as_deref())
}

async fn get_tracks(
    State(store): State<GuardedLibraryStore>,
) -> Result<Json<Vec<Track>>, ApiError> {
    let tracks = read_store(&store)?.list_tracks();
    Ok(Json(tracks))
}

async fn get_track(
    State(store): State<GuardedLibraryStore>,
    Path(id): Path<String>,
) -> Result<Json<Track>, ApiError> {
    validate_id(&id)?;
    let track = read_store(&store)?
        .get_track(&id)
        .ok_or_else(|| not_found(EntityKind::Track, &id))?;
    Ok(Json(track))
}

async fn post_track(
    State(store): State<GuardedLibraryStore>,
    ValidatedJson(body): ValidatedJson<TrackBody>,
) -> Result<impl IntoResponse, ApiError> {
    let mut library = write_store(&store)?;
    validate_track_references(&**library, &body)?;
    let track = library.create_track(Track {
        id: generate_id(),
        name: body.name,
        artist_id: body.artist_id,
        album_id: body.album_id,
        duration: body.duration,
    });
    Ok((StatusCode::CREATED, Json(track)))
}

async fn put_track(
    State(store): State<GuardedLibraryStore>,
    Path(id): Path<String>,
    ValidatedJson(body): ValidatedJson<TrackBody>,
) -> Result<Json<Track>, ApiError> {
    validate_id(&id)?;
    let mut library = write_store(&store)?;
    validate_track_references(&**library, &body)?;
    let track = library.update_track(
        &id,
        TrackUpdate {
            name: body.name,
            artist_id: body.artist_id,
            album_id: body.album_id,
            duration: body.duration,
        },
    )?;
    Ok(Json(track))
}

async fn delete_track(
    State(store): State<GuardedLibraryStore>,
    Path(id): Path<String>,
) -> Result<StatusCode, ApiError> {
    validate_id(&id)?;
    write_store(&store)?.delete_track(&id)?;
    Ok(StatusCode::NO_CONTENT)
}

// =============================================================================
// Artists
// =============================================================================

async fn get_artists(
    State(store): State<GuardedLibraryStore>,
) -> Result<Json<Vec<Artist>>, ApiError> {
    let artists = read_store(&store)?.list_artists();
    Ok(Json(artists))
}

async fn get_artist(
    State(store): State<GuardedLibraryStore>,
    Path(id): Path<String>,
) -> Result<Json<Artist>, ApiError> {
    validate_id(&id)?;
    let artist = read_store(&store)?
        .get_artist(&id)
        .ok_or_else(|| not_found(EntityKind::Artist, &id))?;
    Ok(Json(artist))
}

async fn post_artist(
    State(store): State<GuardedLibraryStore>,
    ValidatedJson(body): ValidatedJson<ArtistBody>,
) -> Result<impl IntoResponse, ApiError> {
    let artist = write_store(&store)?.create_artist(Artist {
        id: generate_id(),
        name: body.name,
        grammy: body.grammy,
    });
    Ok((StatusCode::CREATED, Json(artist)))
}

async fn put_artist(
    State(store): State<GuardedLibraryStore>,
    Path(id): Path<String>,
    ValidatedJson(body): ValidatedJson<ArtistBody>,
) -> Result<Json<Artist>, ApiError> {
    validate_id(&id)?;
    let artist = write_store(&store)?.update_artist(
        &id,
        ArtistUpdate {
            name: body.name,
            grammy: body.grammy,
        },
    )?;
    Ok(Json(artist))
}

async fn delete_artist(
    State(store): State<GuardedLibraryStore>,
    Path(id): Path<String>,
) -> Result<StatusCode, ApiError> {
    validate_id(&id)?;
    write_store(&store)?.delete_artist(&id)?;
    Ok(StatusCode::NO_CONTENT)
}

// =============================================================================
// Albums
// =============================================================================

async fn get_albums(
    State(store): State<GuardedLibraryStore>,
) -> Result<Json<Vec<Album>>, ApiError> {
    let albums = read_store(&store)?.list_albums();
    Ok(Json(albums))
}

async fn get_album(
    State(store): State<GuardedLibraryStore>,
    Path(id): Path<String>,
) -> Result<Json<Album>, ApiError> {
    validate_id(&id)?;
    let album = read_store(&store)?
        .get_album(&id)
        .ok_or_else(|| not_found(EntityKind::Album, &id))?;
    Ok(Json(album))
}

async fn post_album(
    State(store): State<GuardedLibraryStore>,
    ValidatedJson(body): ValidatedJson<AlbumBody>,
) -> Result<impl IntoResponse, ApiError> {
    let mut library = write_store(&store)?;
    validate_reference(&**library, EntityKind::Artist, body.artist_id.as_deref())?;
    let album = library.create_album(Album {
        id: generate_id(),
        name: body.name,
        year: body.year,
        artist_id: body.artist_id,
    });
    Ok((StatusCode::CREATED, Json(album)))
}

async fn put_album(
    State(store): State<GuardedLibraryStore>,
    Path(id): Path<String>,
    ValidatedJson(body): ValidatedJson<AlbumBody>,
) -> Result<Json<Album>, ApiError> {
    validate_id(&id)?;
    let mut library = write_store(&store)?;
    validate_reference(&**library, EntityKind::Artist, body.artist_id.as_deref())?;
    let album = library.update_album(
        &id,
        AlbumUpdate {
            name: body.name,
            year: body.year,
            artist_id: body.artist_id,
        },
    )?;
    Ok(Json(album))
}

async fn delete_album(
    State(store): State<GuardedLibraryStore>,
    Path(id): Path<String>,
) -> Result<StatusCode, ApiError> {
    validate_id(&id)?;
    write_store(&store)?.delete_album(&id)?;
    Ok(StatusCode::NO_CONTENT)
}

// =============================================================================
// Favorites
// =============================================================================

fn parse_favorite_path(kind: &str, id: &str) -> Result<FavoriteKind, ApiError> {
    let kind = kind
        .parse::<FavoriteKind>()
        .map_err(|err| ApiError::BadRequest(err.to_string()))?;
    validate_id(id)?;
    Ok(kind)
}

async fn get_favorites(
    State(store): State<GuardedLibraryStore>,
) -> Result<Json<ResolvedFavorites>, ApiError> {
    let favorites = read_store(&store)?.get_favorites();
    Ok(Json(favorites))
}

async fn post_favorite(
    State(store): State<GuardedLibraryStore>,
    Path((kind, id)): Path<(String, String)>,
) -> Result<(StatusCode, Json<FavoriteEntity>), ApiError> {
    let kind = parse_favorite_path(&kind, &id)?;
    let entity = write_store(&store)?.add_favorite(kind, &id)?;
    Ok((StatusCode::CREATED, Json(entity)))
}

async fn delete_favorite(
    State(store): State<GuardedLibraryStore>,
    Path((kind, id)): Path<(String, String)>,
) -> Result<StatusCode, ApiError> {
    let kind = parse_favorite_path(&kind, &id)?;
    write_store(&store)?.remove_favorite(kind, &id)?;
    Ok(StatusCode::NO_CONTENT)
}

// =============================================================================
// App
// =============================================================================

pub fn make_app(config: ServerConfig, store: Box<dyn LibraryStore>) -> Router {
    let state = ServerState::new(config, store);

    let user_routes: Router = Router::new()
        .route("/", get(get_users).post(post_user))
        .route(
            "/{id}",
            get(get_user).put(put_user_password).delete(delete_user),
        )
        .with_state(state.clone());

    let track_routes: Router = Router::new()
        .route("/", get(get_tracks).post(post_track))
        .route("/{id}", get(get_track).put(put_track).delete(delete_track))
        .with_state(state.clone());

    let artist_routes: Router = Router::new()
        .route("/", get(get_artists).post(post_artist))
        .route(
            "/{id}",
            get(get_artist).put(put_artist).delete(delete_artist),
        )
        .with_state(state.clone());

    let album_routes: Router = Router::new()
        .route("/", get(get_albums).post(post_album))
        .route("/{id}", get(get_album).put(put_album).delete(delete_album))
        .with_state(state.clone());

    let favorites_routes: Router = Router::new()
        .route("/", get(get_favorites))
        .route("/{kind}/{id}", post(post_favorite).delete(delete_favorite))
        .with_state(state.clone());

    let mut app: Router = Router::new()
        .route("/", get(home))
        .with_state(state.clone())
        .nest("/user", user_routes)
        .nest("/track", track_routes)
        .nest("/artist", artist_routes)
        .nest("/album", album_routes)
        .nest("/favs", favorites_routes);

    #[cfg(feature = "slowdown")]
    {
        app = app.layer(middleware::from_fn(slowdown_request));
    }
    app = app.layer(middleware::from_fn_with_state(state, log_requests));

    app
}

async fn shutdown_signal() {
    if let Err(err) = tokio::signal::ctrl_c().await {
        tracing::error!("Could not listen for shutdown signal: {}", err);
        std::future::pending::<()>().await;
    }
    info!("Shutting down...");
}

pub async fn run_server(config: ServerConfig, store: Box<dyn LibraryStore>) -> Result<()> {
    let address = SocketAddr::new(config.host, config.port);
    let app = make_app(config, store);

    let listener = tokio::net::TcpListener::bind(address)
        .await
        .with_context(|| format!("Could not bind to {}", address))?;

    info!("Ready to serve at {}!", address);
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;
    Ok(())
}
