//! Typed API gateway and client-side state reconciliation for ListSplit, a
//! shared shopping-list and expense-splitting service.
//!
//! # Overview
//! Every list, item, bill and sharing operation reaches the remote service
//! through `Gateway`. Screen-level reconcilers in `reconcile` keep their local
//! collections consistent with server state after fetches, mutations and
//! partial failures.
//!
//! # Design
//! - `ApiClient` is pure: it builds `HttpRequest` values and decodes
//!   `HttpResponse` values, so request shapes are testable without I/O.
//! - `Transport` performs the round-trip; `UreqTransport` is the default.
//! - Decoding never looks at the status code. Callers compare the status
//!   against what the endpoint promises and surface the server's `Message`
//!   otherwise.
//! - Records are defined independently from the mock server's; the
//!   integration tests catch schema drift.

pub mod client;
pub mod config;
pub mod date;
pub mod error;
pub mod gateway;
pub mod http;
pub mod reconcile;
pub mod session;
pub mod transport;
pub mod types;

#[cfg(test)]
mod testing;

pub use client::{ApiClient, ApiResponse, ApiResult};
pub use config::Config;
pub use error::ApiError;
pub use gateway::Gateway;
pub use http::{HttpMethod, HttpRequest, HttpResponse, Transport};
pub use reconcile::{
    AccountReconciler, Alert, BillDraft, DeleteOutcome, ListDetailReconciler, ListDraft, ListsReconciler,
    Registration, SharesReconciler, SyncError, Trigger,
};
pub use session::{CurrentUser, Session};
pub use transport::UreqTransport;
pub use types::{
    Bill, BillCreate, BillSummary, ItemUpdate, ListShare, ListShareCreate, LoginData, Message, ShoppingItem,
    ShoppingList, User, DEFAULT_CURRENCY,
};
