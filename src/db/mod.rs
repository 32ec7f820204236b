//! Storage layer (in-memory).

pub mod memory;

pub use memory::MemoryDb;

use std::fmt;

/// User fields that must be unique across all users.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UniqueField {
    Email,
    Username,
    ExternalAuthId,
}

impl UniqueField {
    /// Wire name of the field, as clients see it.
    pub fn as_str(self) -> &'static str {
        match self {
            UniqueField::Email => "email",
            UniqueField::Username => "username",
            UniqueField::ExternalAuthId => "externalAuthId",
        }
    }
}

impl fmt::Display for UniqueField {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Typed failures surfaced by the store.
#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    #[error("Invalid input: {0}")]
    Validation(#[from] validator::ValidationErrors),

    #[error("{0} already exists")]
    Conflict(UniqueField),

    #[error("{0}")]
    NotFound(String),
}
