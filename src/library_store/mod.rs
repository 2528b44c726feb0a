mod errors;
mod models;
mod password;
mod relations;
mod store;
mod trait_def;

pub use errors::{StoreError, StoreResult};
pub use models::*;
pub use password::StoredPassword;
pub use relations::{cascade_rule, CascadeRule, ReferenceField};
pub use store::InMemoryLibraryStore;
pub use trait_def::LibraryStore;
