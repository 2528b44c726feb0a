//! In-memory implementation of [`LibraryStore`].

use tracing::{debug, info, warn};

use super::errors::{StoreError, StoreResult};
use super::models::{
    now_millis, Album, AlbumUpdate, Artist, ArtistUpdate, EntityKind, FavoriteEntity,
    FavoriteKind, Favorites, LibraryCounts, PasswordUpdate, ResolvedFavorites, Track,
    TrackUpdate, User,
};
use super::password::StoredPassword;
use super::relations::{cascade_rule, ReferenceField};
use super::trait_def::LibraryStore;

trait Record {
    fn id(&self) -> &str;
}

impl Record for User {
    fn id(&self) -> &str {
        &self.id
    }
}

impl Record for Track {
    fn id(&self) -> &str {
        &self.id
    }
}

impl Record for Artist {
    fn id(&self) -> &str {
        &self.id
    }
}

impl Record for Album {
    fn id(&self) -> &str {
        &self.id
    }
}

fn find<'a, T: Record>(records: &'a [T], id: &str) -> Option<&'a T> {
    records.iter().find(|record| record.id() == id)
}

fn find_mut<'a, T: Record>(records: &'a mut [T], id: &str) -> Option<&'a mut T> {
    records.iter_mut().find(|record| record.id() == id)
}

/// Removes every record with the given id, returns how many were removed.
fn remove_all<T: Record>(records: &mut Vec<T>, id: &str) -> usize {
    let before = records.len();
    records.retain(|record| record.id() != id);
    before - records.len()
}

/// Sets to None every reference equal to `id`, returns how many were cleared.
fn null_matching<'a>(references: impl Iterator<Item = &'a mut Option<String>>, id: &str) -> usize {
    let mut cleared = 0;
    for reference in references {
        if reference.as_deref() == Some(id) {
            *reference = None;
            cleared += 1;
        }
    }
    cleared
}

/// Holds every collection of the library in process memory. Collections
/// keep insertion order.
#[derive(Debug, Default)]
pub struct InMemoryLibraryStore {
    users: Vec<User>,
    tracks: Vec<Track>,
    artists: Vec<Artist>,
    albums: Vec<Album>,
    favorites: Favorites,
}

impl InMemoryLibraryStore {
    pub fn new() -> InMemoryLibraryStore {
        InMemoryLibraryStore::default()
    }

    fn contains(&self, kind: EntityKind, id: &str) -> bool {
        match kind {
            EntityKind::User => find(&self.users, id).is_some(),
            EntityKind::Track => find(&self.tracks, id).is_some(),
            EntityKind::Artist => find(&self.artists, id).is_some(),
            EntityKind::Album => find(&self.albums, id).is_some(),
        }
    }

    fn remove_record(&mut self, kind: EntityKind, id: &str) -> usize {
        match kind {
            EntityKind::User => remove_all(&mut self.users, id),
            EntityKind::Track => remove_all(&mut self.tracks, id),
            EntityKind::Artist => remove_all(&mut self.artists, id),
            EntityKind::Album => remove_all(&mut self.albums, id),
        }
    }

    fn clear_reference(&mut self, field: ReferenceField, id: &str) -> usize {
        match field {
            ReferenceField::TrackArtist => {
                null_matching(self.tracks.iter_mut().map(|t| &mut t.artist_id), id)
            }
            ReferenceField::TrackAlbum => {
                null_matching(self.tracks.iter_mut().map(|t| &mut t.album_id), id)
            }
            ReferenceField::AlbumArtist => {
                null_matching(self.albums.iter_mut().map(|a| &mut a.artist_id), id)
            }
        }
    }

    fn purge_favorite(&mut self, kind: FavoriteKind, id: &str) -> usize {
        let ids = self.favorites.ids_mut(kind);
        let before = ids.len();
        ids.retain(|favorite_id| favorite_id != id);
        before - ids.len()
    }

    /// Removes the record and applies the cascade rule of its kind.
    fn delete_entity(&mut self, kind: EntityKind, id: &str) -> StoreResult<()> {
        if !self.contains(kind, id) {
            return Err(StoreError::not_found(kind, id));
        }

        self.remove_record(kind, id);

        let rule = cascade_rule(kind);
        for field in rule.nulled_references {
            let cleared = self.clear_reference(*field, id);
            if cleared > 0 {
                debug!("Cleared {} {:?} references to {} {}", cleared, field, kind, id);
            }
        }
        if let Some(favorite_kind) = rule.favorites {
            let purged = self.purge_favorite(favorite_kind, id);
            if purged > 0 {
                debug!("Removed {} {} {} from favorites", purged, kind, id);
            }
        }

        info!("Deleted {} {}", kind, id);
        Ok(())
    }

    fn favorite_entity(&self, kind: FavoriteKind, id: &str) -> Option<FavoriteEntity> {
        match kind {
            FavoriteKind::Artist => find(&self.artists, id).cloned().map(FavoriteEntity::Artist),
            FavoriteKind::Album => find(&self.albums, id).cloned().map(FavoriteEntity::Album),
            FavoriteKind::Track => find(&self.tracks, id).cloned().map(FavoriteEntity::Track),
        }
    }
}

/// Looks up every id, skipping the ones that do not resolve.
fn resolve_all<T: Record + Clone>(
    kind: FavoriteKind,
    favorites: &Favorites,
    records: &[T],
) -> Vec<T> {
    favorites
        .ids(kind)
        .iter()
        .filter_map(|id| {
            let resolved = find(records, id).cloned();
            if resolved.is_none() {
                warn!("Favorite {} {} does not resolve to any record", kind.as_str(), id);
            }
            resolved
        })
        .collect()
}

impl LibraryStore for InMemoryLibraryStore {
    fn list_users(&self) -> Vec<User> {
        self.users.clone()
    }

    fn get_user(&self, id: &str) -> Option<User> {
        find(&self.users, id).cloned()
    }

    fn create_user(&mut self, user: User) -> User {
        info!("Created user {} ({})", user.id, user.login);
        self.users.push(user.clone());
        user
    }

    fn update_user_password(&mut self, id: &str, update: PasswordUpdate) -> StoreResult<User> {
        let user = find(&self.users, id)
            .ok_or_else(|| StoreError::not_found(EntityKind::User, id))?;

        if !user.password.verify(&update.old_password) {
            warn!("Wrong old password for user {}", id);
            return Err(StoreError::Forbidden);
        }

        let version = user.version;
        self.replace_user_password(id, version, update.new_password)
    }

    fn replace_user_password(
        &mut self,
        id: &str,
        expected_version: u32,
        new_password: StoredPassword,
    ) -> StoreResult<User> {
        let user = find_mut(&mut self.users, id)
            .ok_or_else(|| StoreError::not_found(EntityKind::User, id))?;

        if user.version != expected_version {
            warn!(
                "Password of user {} changed since version {}, now at {}",
                id, expected_version, user.version
            );
            return Err(StoreError::Forbidden);
        }

        user.password = new_password;
        user.version += 1;
        // Strictly increasing even if the clock did not move.
        user.updated_at = now_millis().max(user.updated_at + 1);

        info!("Updated password of user {} to version {}", id, user.version);
        Ok(user.clone())
    }

    fn delete_user(&mut self, id: &str) -> StoreResult<()> {
        self.delete_entity(EntityKind::User, id)
    }

    fn list_tracks(&self) -> Vec<Track> {
        self.tracks.clone()
    }

    fn get_track(&self, id: &str) -> Option<Track> {
        find(&self.tracks, id).cloned()
    }

    fn create_track(&mut self, track: Track) -> Track {
        info!("Created track {} ({})", track.id, track.name);
        self.tracks.push(track.clone());
        track
    }

    fn update_track(&mut self, id: &str, update: TrackUpdate) -> StoreResult<Track> {
        let track = find_mut(&mut self.tracks, id)
            .ok_or_else(|| StoreError::not_found(EntityKind::Track, id))?;
        track.name = update.name;
        track.artist_id = update.artist_id;
        track.album_id = update.album_id;
        track.duration = update.duration;
        info!("Updated track {}", id);
        Ok(track.clone())
    }

    fn delete_track(&mut self, id: &str) -> StoreResult<()> {
        self.delete_entity(EntityKind::Track, id)
    }

    fn list_artists(&self) -> Vec<Artist> {
        self.artists.clone()
    }

    fn get_artist(&self, id: &str) -> Option<Artist> {
        find(&self.artists, id).cloned()
    }

    fn create_artist(&mut self, artist: Artist) -> Artist {
        info!("Created artist {} ({})", artist.id, artist.name);
        self.artists.push(artist.clone());
        artist
    }

    fn update_artist(&mut self, id: &str, update: ArtistUpdate) -> StoreResult<Artist> {
        let artist = find_mut(&mut self.artists, id)
            .ok_or_else(|| StoreError::not_found(EntityKind::Artist, id))?;
        artist.name = update.name;
        artist.grammy = update.grammy;
        info!("Updated artist {}", id);
        Ok(artist.clone())
    }

    fn delete_artist(&mut self, id: &str) -> StoreResult<()> {
        self.delete_entity(EntityKind::Artist, id)
    }

    fn list_albums(&self) -> Vec<Album> {
        self.albums.clone()
    }

    fn get_album(&self, id: &str) -> Option<Album> {
        find(&self.albums, id).cloned()
    }

    fn create_album(&mut self, album: Album) -> Album {
        info!("Created album {} ({})", album.id, album.name);
        self.albums.push(album.clone());
        album
    }

    fn update_album(&mut self, id: &str, update: AlbumUpdate) -> StoreResult<Album> {
        let album = find_mut(&mut self.albums, id)
            .ok_or_else(|| StoreError::not_found(EntityKind::Album, id))?;
        album.name = update.name;
        album.year = update.year;
        album.artist_id = update.artist_id;
        info!("Updated album {}", id);
        Ok(album.clone())
    }

    fn delete_album(&mut self, id: &str) -> StoreResult<()> {
        self.delete_entity(EntityKind::Album, id)
    }

    fn add_favorite(&mut self, kind: FavoriteKind, id: &str) -> StoreResult<FavoriteEntity> {
        let entity = self
            .favorite_entity(kind, id)
            .ok_or_else(|| StoreError::not_found(kind.entity_kind(), id))?;
        self.favorites.ids_mut(kind).push(id.to_owned());
        info!("Added {} {} to favorites", kind.as_str(), id);
        Ok(entity)
    }

    fn remove_favorite(&mut self, kind: FavoriteKind, id: &str) -> StoreResult<()> {
        if self.purge_favorite(kind, id) == 0 {
            return Err(StoreError::not_found(kind.entity_kind(), id));
        }
        info!("Removed {} {} from favorites", kind.as_str(), id);
        Ok(())
    }

    fn get_favorites(&self) -> ResolvedFavorites {
        ResolvedFavorites {
            artists: resolve_all(FavoriteKind::Artist, &self.favorites, &self.artists),
            albums: resolve_all(FavoriteKind::Album, &self.favorites, &self.albums),
            tracks: resolve_all(FavoriteKind::Track, &self.favorites, &self.tracks),
        }
    }

    fn get_favorite_ids(&self) -> Favorites {
        self.favorites.clone()
    }

    fn counts(&self) -> LibraryCounts {
        LibraryCounts {
            users: self.users.len(),
            artists: self.artists.len(),
            albums: self.albums.len(),
            tracks: self.tracks.len(),
        }
    }
}
