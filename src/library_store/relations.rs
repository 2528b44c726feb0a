//! Declarative cascade rules.
//!
//! Deleting a record must not leave anything pointing at it. Instead of
//! hand-writing the cleanup for each entity, every kind declares which
//! foreign reference fields refer to it and which favorites list may hold
//! its id. The store's delete routine walks these rules.

use super::models::{EntityKind, FavoriteKind};

/// A nullable foreign reference field on a stored record.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ReferenceField {
    TrackArtist,
    TrackAlbum,
    AlbumArtist,
}

#[derive(Debug)]
pub struct CascadeRule {
    pub kind: EntityKind,
    pub nulled_references: &'static [ReferenceField],
    pub favorites: Option<FavoriteKind>,
}

static USER_RULE: CascadeRule = CascadeRule {
    kind: EntityKind::User,
    nulled_references: &[],
    favorites: None,
};

static ARTIST_RULE: CascadeRule = CascadeRule {
    kind: EntityKind::Artist,
    nulled_references: &[ReferenceField::TrackArtist, ReferenceField::AlbumArtist],
    favorites: Some(FavoriteKind::Artist),
};

static ALBUM_RULE: CascadeRule = CascadeRule {
    kind: EntityKind::Album,
    nulled_references: &[ReferenceField::TrackAlbum],
    favorites: Some(FavoriteKind::Album),
};

static TRACK_RULE: CascadeRule = CascadeRule {
    kind: EntityKind::Track,
    nulled_references: &[],
    favorites: Some(FavoriteKind::Track),
};

/// Returns the cleanup that follows the deletion of a record of `kind`.
pub fn cascade_rule(kind: EntityKind) -> &'static CascadeRule {
    match kind {
        EntityKind::User => &USER_RULE,
        EntityKind::Artist => &ARTIST_RULE,
        EntityKind::Album => &ALBUM_RULE,
        EntityKind::Track => &TRACK_RULE,
    }
}
