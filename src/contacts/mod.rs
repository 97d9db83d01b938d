//! Contact domain subsystem.
//!
//! # Data Flow
//! ```text
//! ContactDraft (raw client fields)
//!     → validation.rs (name → phone → email, first failure wins)
//!     → ValidContact (trimmed, known-good fields)
//!     → store.rs (insert / update, persisted snapshot)
//!     → Contact (id + fields) returned by search
//! ```
//!
//! # Design Decisions
//! - Only a `ValidContact` can reach the store, so a stored contact always
//!   satisfies every validation rule
//! - The store never re-validates
//! - Ids are assigned by the store and never reused

pub mod model;
pub mod store;
pub mod validation;

pub use model::{Contact, ContactDraft, ContactId};
pub use store::{ContactStore, StorageError};
pub use validation::{validate, ValidContact, ValidationError};
