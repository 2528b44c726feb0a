//! Library entity models.
//!
//! Records are plain data: the store owns them and hands out clones, so
//! nothing outside the store can mutate a stored record in place.

use anyhow::Result;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use super::password::StoredPassword;

// =============================================================================
// Entities
// =============================================================================

/// A registered user. `password` holds the credential hash, never the
/// plain text, and is not serializable.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct User {
    pub id: String,
    pub login: String,
    pub password: StoredPassword,
    pub version: u32,
    pub created_at: i64,
    pub updated_at: i64,
}

impl User {
    /// Builds a brand new user with a random id, version 1 and both
    /// timestamps set to now.
    pub fn new(login: &str, plain_password: &str) -> Result<User> {
        let now = now_millis();
        Ok(User {
            id: generate_id(),
            login: login.to_owned(),
            password: StoredPassword::hash(plain_password)?,
            version: 1,
            created_at: now,
            updated_at: now,
        })
    }
}

/// What the outside world gets to see of a [`User`].
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UserView {
    pub id: String,
    pub login: String,
    pub version: u32,
    pub created_at: i64,
    pub updated_at: i64,
}

impl From<&User> for UserView {
    fn from(user: &User) -> Self {
        UserView {
            id: user.id.clone(),
            login: user.login.clone(),
            version: user.version,
            created_at: user.created_at,
            updated_at: user.updated_at,
        }
    }
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Track {
    pub id: String,
    pub name: String,
    pub artist_id: Option<String>,
    pub album_id: Option<String>,
    pub duration: i64,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Artist {
    pub id: String,
    pub name: String,
    pub grammy: bool,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Album {
    pub id: String,
    pub name: String,
    pub year: i32,
    pub artist_id: Option<String>,
}

// =============================================================================
// Update payloads
// =============================================================================

/// A password change request. The new password is hashed up front so that
/// applying the change cannot fail for reasons other than a wrong old
/// password.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct PasswordUpdate {
    pub old_password: String,
    pub new_password: StoredPassword,
}

impl PasswordUpdate {
    pub fn new(old_password: &str, new_password: &str) -> Result<PasswordUpdate> {
        Ok(PasswordUpdate {
            old_password: old_password.to_owned(),
            new_password: StoredPassword::hash(new_password)?,
        })
    }
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct TrackUpdate {
    pub name: String,
    pub artist_id: Option<String>,
    pub album_id: Option<String>,
    pub duration: i64,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ArtistUpdate {
    pub name: String,
    pub grammy: bool,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct AlbumUpdate {
    pub name: String,
    pub year: i32,
    pub artist_id: Option<String>,
}

// =============================================================================
// Favorites
// =============================================================================

/// Favorite ids, kept in insertion order. Duplicates are not filtered.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Favorites {
    pub artists: Vec<String>,
    pub albums: Vec<String>,
    pub tracks: Vec<String>,
}

impl Favorites {
    pub fn ids(&self, kind: FavoriteKind) -> &[String] {
        match kind {
            FavoriteKind::Artist => &self.artists,
            FavoriteKind::Album => &self.albums,
            FavoriteKind::Track => &self.tracks,
        }
    }

    pub fn ids_mut(&mut self, kind: FavoriteKind) -> &mut Vec<String> {
        match kind {
            FavoriteKind::Artist => &mut self.artists,
            FavoriteKind::Album => &mut self.albums,
            FavoriteKind::Track => &mut self.tracks,
        }
    }
}

/// Favorites with every id replaced by the full record it points to.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ResolvedFavorites {
    pub artists: Vec<Artist>,
    pub albums: Vec<Album>,
    pub tracks: Vec<Track>,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum FavoriteKind {
    Artist,
    Album,
    Track,
}

impl FavoriteKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            FavoriteKind::Artist => "artist",
            FavoriteKind::Album => "album",
            FavoriteKind::Track => "track",
        }
    }

    pub fn entity_kind(&self) -> EntityKind {
        match self {
            FavoriteKind::Artist => EntityKind::Artist,
            FavoriteKind::Album => EntityKind::Album,
            FavoriteKind::Track => EntityKind::Track,
        }
    }
}

impl FromStr for FavoriteKind {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self> {
        match s {
            "artist" => Ok(FavoriteKind::Artist),
            "album" => Ok(FavoriteKind::Album),
            "track" => Ok(FavoriteKind::Track),
            _ => anyhow::bail!("Unknown favorite kind {}", s),
        }
    }
}

/// The record returned when something is added to the favorites.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
#[serde(untagged)]
pub enum FavoriteEntity {
    Artist(Artist),
    Album(Album),
    Track(Track),
}

// =============================================================================
// Misc
// =============================================================================

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum EntityKind {
    User,
    Artist,
    Album,
    Track,
}

impl fmt::Display for EntityKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            EntityKind::User => "user",
            EntityKind::Artist => "artist",
            EntityKind::Album => "album",
            EntityKind::Track => "track",
        };
        write!(f, "{}", name)
    }
}

/// Number of records in each collection.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize)]
pub struct LibraryCounts {
    pub users: usize,
    pub artists: usize,
    pub albums: usize,
    pub tracks: usize,
}

pub fn generate_id() -> String {
    uuid::Uuid::new_v4().to_string()
}

/// Milliseconds since the Unix epoch.
pub fn now_millis() -> i64 {
    chrono::Utc::now().timestamp_millis()
}
