//! Contact record types.

use serde::{Deserialize, Serialize};

/// Server-assigned contact identifier.
pub type ContactId = u64;

/// A persisted contact record.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Contact {
    pub id: ContactId,
    pub nama: String,
    pub telepon: String,
    pub email: String,
}

/// Unvalidated contact fields as supplied by a client.
///
/// Missing fields deserialize to empty strings so that an absent `nama`
/// is reported by the validator rather than by the JSON parser.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ContactDraft {
    pub nama: String,
    pub telepon: String,
    pub email: String,
}

impl ContactDraft {
    pub fn new(
        nama: impl Into<String>,
        telepon: impl Into<String>,
        email: impl Into<String>,
    ) -> Self {
        Self {
            nama: nama.into(),
            telepon: telepon.into(),
            email: email.into(),
        }
    }
}
