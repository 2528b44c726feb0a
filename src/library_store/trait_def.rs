//! LibraryStore trait definition.
//!
//! Abstracts the library's data access so the HTTP layer does not depend on
//! where records live. Reads take `&self`, anything that mutates takes
//! `&mut self`: callers sharing a store must hold a write lock across a whole
//! mutating call, cascade included.

use super::errors::StoreResult;
use super::password::StoredPassword;
use super::models::{
    Album, AlbumUpdate, Artist, ArtistUpdate, FavoriteEntity, FavoriteKind, Favorites,
    LibraryCounts, PasswordUpdate, ResolvedFavorites, Track, TrackUpdate, User,
};

pub trait LibraryStore: Send + Sync {
    // =========================================================================
    // Users
    // =========================================================================

    /// All users in insertion order.
    fn list_users(&self) -> Vec<User>;

    /// Returns None if the user does not exist.
    fn get_user(&self, id: &str) -> Option<User>;

    /// Stores the user as given. Id uniqueness is up to the caller.
    fn create_user(&mut self, user: User) -> User;

    /// Replaces the user's password if `update.old_password` matches the
    /// stored one, bumping the version and the update timestamp.
    fn update_user_password(&mut self, id: &str, update: PasswordUpdate) -> StoreResult<User>;

    /// Sets an already verified password. Fails with Forbidden if the user
    /// is no longer at `expected_version`, i.e. its password changed after
    /// the caller checked the old one.
    fn replace_user_password(
        &mut self,
        id: &str,
        expected_version: u32,
        new_password: StoredPassword,
    ) -> StoreResult<User>;

    fn delete_user(&mut self, id: &str) -> StoreResult<()>;

    // =========================================================================
    // Tracks
    // =========================================================================

    fn list_tracks(&self) -> Vec<Track>;

    fn get_track(&self, id: &str) -> Option<Track>;

    fn create_track(&mut self, track: Track) -> Track;

    fn update_track(&mut self, id: &str, update: TrackUpdate) -> StoreResult<Track>;

    /// Deletes the track and removes it from the favorites.
    fn delete_track(&mut self, id: &str) -> StoreResult<()>;

    // =========================================================================
    // Artists
    // =========================================================================

    fn list_artists(&self) -> Vec<Artist>;

    fn get_artist(&self, id: &str) -> Option<Artist>;

    fn create_artist(&mut self, artist: Artist) -> Artist;

    fn update_artist(&mut self, id: &str, update: ArtistUpdate) -> StoreResult<Artist>;

    /// Deletes the artist, nulls every track and album reference to it and
    /// removes it from the favorites.
    fn delete_artist(&mut self, id: &str) -> StoreResult<()>;

    // =========================================================================
    // Albums
    // =========================================================================

    fn list_albums(&self) -> Vec<Album>;

    fn get_album(&self, id: &str) -> Option<Album>;

    fn create_album(&mut self, album: Album) -> Album;

    fn update_album(&mut self, id: &str, update: AlbumUpdate) -> StoreResult<Album>;

    /// Deletes the album, nulls every track reference to it and removes it
    /// from the favorites.
    fn delete_album(&mut self, id: &str) -> StoreResult<()>;

    // =========================================================================
    // Favorites
    // =========================================================================

    /// Appends the id to the favorites of the given kind and returns the
    /// favorited record. Adding the same id twice stores it twice.
    fn add_favorite(&mut self, kind: FavoriteKind, id: &str) -> StoreResult<FavoriteEntity>;

    /// Removes the id from the favorites of the given kind. Fails if the id
    /// is not currently a favorite.
    fn remove_favorite(&mut self, kind: FavoriteKind, id: &str) -> StoreResult<()>;

    /// Favorites resolved to full records, in insertion order.
    fn get_favorites(&self) -> ResolvedFavorites;

    /// The raw favorite ids.
    fn get_favorite_ids(&self) -> Favorites;

    // =========================================================================
    // Counts
    // =========================================================================

    fn counts(&self) -> LibraryCounts;
}
