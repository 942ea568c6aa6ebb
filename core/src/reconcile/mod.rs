//! Screen-level state holders that keep local collections in step with the
//! service.
//!
//! # Design
//! Every reconciler owns its collection exclusively and mutates it only from
//! its own `&mut self` methods, after the awaited gateway call resolves. Three
//! synchronisation strategies are used:
//!
//! - full refresh: fetch and replace the whole collection (clear, then refill);
//! - mutate then re-fetch: on the expected status, run the full refresh;
//! - targeted local patch: remove or toggle a single entry without a round trip.
//!
//! A failed background refresh leaves stale data in place; failures of
//! user-triggered actions become an inline message.

mod account;
mod detail;
mod lists;
mod shares;

pub use account::{AccountReconciler, Registration};
pub use detail::{BillDraft, DeleteOutcome, ListDetailReconciler};
pub use lists::{ListDraft, ListsReconciler, DEFAULT_DESCRIPTION, DEFAULT_NAME};
pub use shares::{Alert, SharesReconciler};

use std::fmt;

use crate::client::ApiResponse;
use crate::error::ApiError;
use crate::types::Message;

/// Shown whenever the service could not be reached or answered garbage.
pub const GENERIC_FAILURE: &str = "Failed to query API";

/// Shown when an operation targets a list that was never persisted.
pub const INVALID_LIST: &str = "Invalid shopping list selected";

/// Who asked for a fetch: background refreshes fail silently.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Trigger {
    Appear,
    User,
}

/// Failure of a reconciler operation, displayed verbatim to the user.
#[derive(Debug, Clone, PartialEq)]
pub enum SyncError {
    /// Invalid selection or input caught before any request was sent.
    Invalid(String),
    /// Transport or decoding failure reported by the gateway.
    Transport(ApiError),
    /// The service answered with an unexpected status.
    Rejected { status: u16, message: String },
}

impl fmt::Display for SyncError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SyncError::Invalid(msg) => f.write_str(msg),
            SyncError::Transport(_) => f.write_str(GENERIC_FAILURE),
            SyncError::Rejected { message, .. } => f.write_str(message),
        }
    }
}

impl std::error::Error for SyncError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            SyncError::Transport(err) => Some(err),
            _ => None,
        }
    }
}

impl From<ApiError> for SyncError {
    fn from(err: ApiError) -> Self {
        SyncError::Transport(err)
    }
}

/// Accept a `Message` response only when it carries `expected`; otherwise the
/// server's explanation becomes the error.
pub(crate) fn expect_status(response: ApiResponse<Message>, expected: u16) -> Result<(), SyncError> {
    if response.is_status(expected) {
        return Ok(());
    }
    Err(SyncError::Rejected {
        status: response.status,
        message: response.data.message,
    })
}

/// Accept a fetched collection only when it arrived with 200.
pub(crate) fn expect_ok<T>(response: ApiResponse<Vec<T>>) -> Result<Vec<T>, SyncError> {
    if response.is_status(200) {
        return Ok(response.data);
    }
    Err(SyncError::Rejected {
        status: response.status,
        message: GENERIC_FAILURE.to_string(),
    })
}

/// Replace `local` wholesale with `fetched`.
pub(crate) fn replace_all<T>(local: &mut Vec<T>, fetched: Vec<T>) {
    local.clear();
    local.extend(fetched);
}
