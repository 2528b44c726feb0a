use thiserror::Error;

use super::models::EntityKind;

/// Outcomes a store operation can report instead of a value. These are
/// expected results, the HTTP layer turns them into status codes.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum StoreError {
    #[error("{kind} with id {id} not found")]
    NotFound { kind: EntityKind, id: String },

    #[error("old password does not match")]
    Forbidden,
}

impl StoreError {
    pub fn not_found(kind: EntityKind, id: &str) -> StoreError {
        StoreError::NotFound {
            kind,
            id: id.to_owned(),
        }
    }
}

pub type StoreResult<T> = std::result::Result<T, StoreError>;
