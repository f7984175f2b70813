//! Error taxonomy for registry operations.
//!
//! Every operation returns [`RegistryError`]. Variants fall into four kinds
//! (see [`ErrorKind`]):
//!
//! - **Validation**: malformed input, detected before touching the store
//! - **NotFound**: an unknown survivor id
//! - **Conflict**: the request is well-formed but current state forbids it
//! - **Persistence**: the store failed; the operation was rolled back
//!
//! Validation and conflict errors never leave side effects behind.

use thiserror::Error;

use crate::types::{ItemType, SurvivorId};

/// Failures raised by a [`crate::store::RecordStore`] implementation.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum StoreError {
    /// The store cannot be reached.
    #[error("record store unavailable: {0}")]
    Unavailable(String),

    /// The transaction was aborted; none of its writes were applied.
    #[error("transaction aborted: {0}")]
    Aborted(String),

    /// A record could not be encoded.
    #[error("record encoding failed: {0}")]
    Encoding(String),
}

/// Coarse classification used by API layers to pick a response.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorKind {
    Validation,
    NotFound,
    Conflict,
    Persistence,
}

/// Error returned by every registry operation.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum RegistryError {
    #[error("invalid {field}: {reason}")]
    Validation { field: &'static str, reason: String },

    #[error("survivor {0} not found")]
    NotFound(SurvivorId),

    #[error("unfair trade: first side offers {offered_by_a} points, second side offers {offered_by_b}")]
    UnfairTrade { offered_by_a: u64, offered_by_b: u64 },

    #[error("survivor {survivor} holds {available} {item}, {requested} required")]
    InsufficientQuantity {
        survivor: SurvivorId,
        item: ItemType,
        requested: u32,
        available: u32,
    },

    #[error("survivor {0} cannot trade with itself")]
    SelfTrade(SurvivorId),

    #[error("survivor {0} is infected")]
    InfectedParticipant(SurvivorId),

    #[error("survivor {0} cannot report itself")]
    SelfReport(SurvivorId),

    #[error(transparent)]
    Persistence(#[from] StoreError),
}

impl RegistryError {
    pub(crate) fn validation(field: &'static str, reason: impl Into<String>) -> Self {
        RegistryError::Validation {
            field,
            reason: reason.into(),
        }
    }

    pub fn kind(&self) -> ErrorKind {
        match self {
            RegistryError::Validation { .. } => ErrorKind::Validation,
            RegistryError::NotFound(_) => ErrorKind::NotFound,
            RegistryError::UnfairTrade { .. }
            | RegistryError::InsufficientQuantity { .. }
            | RegistryError::SelfTrade(_)
            | RegistryError::InfectedParticipant(_)
            | RegistryError::SelfReport(_) => ErrorKind::Conflict,
            RegistryError::Persistence(_) => ErrorKind::Persistence,
        }
    }

    /// Only store failures are worth retrying; everything else would fail
    /// the same way again.
    pub fn is_retryable(&self) -> bool {
        self.kind() == ErrorKind::Persistence
    }
}

// ============================================================================
// Unit Tests
// ============================================================================
