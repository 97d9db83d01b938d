//! Contact field validation.
//!
//! Rules are checked in a fixed order and the first violation is returned:
//! 1. `nama` must be non-empty after trimming
//! 2. `telepon` must be one or more ASCII digits
//! 3. `email` must have a well-formed local part and the `@gmail.com` domain

use once_cell::sync::Lazy;
use regex::Regex;
use thiserror::Error;

use crate::contacts::model::ContactDraft;

/// Dot-separated atoms of `A-Z a-z 0-9 % + _ -`, followed by the exact domain.
static GMAIL_ADDRESS: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^[A-Za-z0-9%+_-]+(?:\.[A-Za-z0-9%+_-]+)*@gmail\.com$")
        .expect("Valid regex pattern")
});

/// A single field-level rule violation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum ValidationError {
    #[error("Nama tidak boleh kosong")]
    EmptyName,

    #[error("Nomor Telepon hanya boleh angka")]
    InvalidPhone,

    #[error("Format email tidak valid")]
    InvalidEmail,
}

/// Contact fields that passed every rule. Values are trimmed.
///
/// The only constructor is [`validate`], so holding one proves validity.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ValidContact {
    nama: String,
    telepon: String,
    email: String,
}

impl ValidContact {
    pub fn nama(&self) -> &str {
        &self.nama
    }

    pub fn telepon(&self) -> &str {
        &self.telepon
    }

    pub fn email(&self) -> &str {
        &self.email
    }

    pub(crate) fn into_parts(self) -> (String, String, String) {
        (self.nama, self.telepon, self.email)
    }
}

/// Validate a draft, short-circuiting on the first failing rule.
pub fn validate(draft: &ContactDraft) -> Result<ValidContact, ValidationError> {
    let nama = draft.nama.trim();
    if nama.is_empty() {
        return Err(ValidationError::EmptyName);
    }

    let telepon = draft.telepon.trim();
    if !is_phone_number(telepon) {
        return Err(ValidationError::InvalidPhone);
    }

    let email = draft.email.trim();
    if !GMAIL_ADDRESS.is_match(email) {
        return Err(ValidationError::InvalidEmail);
    }

    Ok(ValidContact {
        nama: nama.to_string(),
        telepon: telepon.to_string(),
        email: email.to_string(),
    })
}

fn is_phone_number(value: &str) -> bool {
    !value.is_empty() && value.bytes().all(|b| b.is_ascii_digit())
}
