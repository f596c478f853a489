//! Credential account module.
//!
//! Provides the account model, field validation and tenant-scoped storage.

mod model;
mod repository;
mod store;
mod validation;

pub use model::{Account, AccountId};
pub use repository::SqliteAccountStore;
pub use store::{AccountStore, StoreError, StoreResult};
pub use validation::{ValidationError, validate_fields, validate_update};
