//! Request bodies and their validation.
//!
//! Bodies are checked for shape and ranges before anything reaches the
//! library store, so the store only ever sees well formed input.

use axum::{
    extract::{FromRequest, Request},
    Json,
};
use serde::de::DeserializeOwned;
use serde::Deserialize;

use super::ApiError;
use crate::library_store::{EntityKind, LibraryStore};

pub trait Validate {
    fn validate(&self) -> Result<(), String>;
}

/// Like `Json`, but rejects malformed or invalid bodies with a 400.
pub struct ValidatedJson<T>(pub T);

impl<S, T> FromRequest<S> for ValidatedJson<T>
where
    T: DeserializeOwned + Validate,
    S: Send + Sync,
{
    type Rejection = ApiError;

    async fn from_request(req: Request, state: &S) -> Result<Self, Self::Rejection> {
        let Json(value) = Json::<T>::from_request(req, state)
            .await
            .map_err(|rejection| ApiError::BadRequest(rejection.body_text()))?;
        value.validate().map_err(ApiError::BadRequest)?;
        Ok(ValidatedJson(value))
    }
}

fn require_non_empty(field: &str, value: &str) -> Result<(), String> {
    if value.trim().is_empty() {
        return Err(format!("Field '{}' is required but was empty", field));
    }
    Ok(())
}

/// Path and reference ids are UUIDs.
pub fn validate_id(id: &str) -> Result<(), ApiError> {
    uuid::Uuid::parse_str(id)
        .map(|_| ())
        .map_err(|_| ApiError::BadRequest(format!("Invalid id {}", id)))
}

/// Checks that an optional foreign reference points at an existing record.
pub fn validate_reference(
    store: &dyn LibraryStore,
    kind: EntityKind,
    id: Option<&str>,
) -> Result<(), ApiError> {
    let Some(id) = id else {
        return Ok(());
    };
    validate_id(id)?;
    let exists = match kind {
        EntityKind::Artist => store.get_artist(id).is_some(),
        EntityKind::Album => store.get_album(id).is_some(),
        EntityKind::Track => store.get_track(id).is_some(),
        EntityKind::User => store.get_user(id).is_some(),
    };
    if !exists {
        return Err(ApiError::BadRequest(format!(
            "Referenced {} {} does not exist",
            kind, id
        )));
    }
    Ok(())
}

#[derive(Deserialize, Debug)]
pub struct CreateUserBody {
    pub login: String,
    pub password: String,
}

impl Validate for CreateUserBody {
    fn validate(&self) -> Result<(), String> {
        require_non_empty("login", &self.login)?;
        require_non_empty("password", &self.password)
    }
}

#[derive(Deserialize, Debug)]
#[serde(rename_all = "camelCase")]
pub struct UpdatePasswordBody {
    pub old_password: String,
    pub new_password: String,
}

impl Validate for UpdatePasswordBody {
    fn validate(&self) -> Result<(), String> {
        require_non_empty("oldPassword", &self.old_password)?;
        require_non_empty("newPassword", &self.new_password)
    }
}

#[derive(Deserialize, Debug)]
#[serde(rename_all = "camelCase")]
pub struct TrackBody {
    pub name: String,
    pub artist_id: Option<String>,
    pub album_id: Option<String>,
    pub duration: i64,
}

impl Validate for TrackBody {
    fn validate(&self) -> Result<(), String> {
        require_non_empty("name", &self.name)?;
        if self.duration < 0 {
            return Err(format!(
                "Field 'duration' must be non-negative, got {}",
                self.duration
            ));
        }
        Ok(())
    }
}

#[derive(Deserialize, Debug)]
pub struct ArtistBody {
    pub name: String,
    pub grammy: bool,
}

impl Validate for ArtistBody {
    fn validate(&self) -> Result<(), String> {
        require_non_empty("name", &self.name)
    }
}

#[derive(Deserialize, Debug)]
#[serde(rename_all = "camelCase")]
pub struct AlbumBody {
    pub name: String,
    pub year: i32,
    pub artist_id: Option<String>,
}

impl Validate for AlbumBody {
    fn validate(&self) -> Result<(), String> {
        require_non_empty("name", &self.name)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::library_store::{Artist, InMemoryLibraryStore};

    #[test]
    fn empty_strings_are_rejected() {
        let body = CreateUserBody {
            login: "  ".to_string(),
            password: "pw".to_string(),
        };
        assert!(body.validate().is_err());

        let body = ArtistBody {
            name: String::new(),
            grammy: true,
        };
        assert!(body.validate().is_err());
    }

    #[test]
    fn negative_duration_is_rejected() {
        let body = TrackBody {
            name: "Song".to_string(),
            artist_id: None,
            album_id: None,
            duration: -1,
        };
        assert!(body.validate().is_err());

        let body = TrackBody { duration: 0, ..body };
        assert!(body.validate().is_ok());
    }

    #[test]
    fn missing_references_are_optional_in_json() {
        let body: AlbumBody = serde_json::from_str(r#"{"name":"A","year":1999}"#).unwrap();
        assert!(body.artist_id.is_none());

        let body: TrackBody = serde_json::from_str(
            r#"{"name":"T","artistId":null,"albumId":"x","duration":10}"#,
        )
        .unwrap();
        assert!(body.artist_id.is_none());
        assert_eq!(body.album_id.as_deref(), Some("x"));
    }

    #[test]
    fn ids_must_be_uuids() {
        assert!(validate_id("not-a-uuid").is_err());
        assert!(validate_id(&uuid::Uuid::new_v4().to_string()).is_ok());
    }

    #[test]
    fn references_must_exist() {
        let mut store = InMemoryLibraryStore::new();
        let artist_id = uuid::Uuid::new_v4().to_string();
        store.create_artist(Artist {
            id: artist_id.clone(),
            name: "X".to_string(),
            grammy: false,
        });

        assert!(validate_reference(&store, EntityKind::Artist, None).is_ok());
        assert!(validate_reference(&store, EntityKind::Artist, Some(&artist_id)).is_ok());
        assert!(validate_reference(&store, EntityKind::Album, Some(&artist_id)).is_err());
        assert!(validate_reference(&store, EntityKind::Artist, Some("a1")).is_err());
    }
}
