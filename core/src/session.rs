//! Identity of the currently authenticated user.
//!
//! # Design
//! `Session` is explicit application state: construct one at startup and hand
//! clones to whichever reconciler needs it. It is backed by a `watch` channel
//! so a UI can subscribe and re-render on change. Only a successful login
//! writes to it.

use std::sync::Arc;

use tokio::sync::watch;

use crate::types::User;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CurrentUser {
    pub id: i64,
    pub name: String,
    pub email: String,
}

impl CurrentUser {
    pub fn is_anonymous(&self) -> bool {
        *self == Self::default()
    }
}

/// The anonymous placeholder shown before anyone logs in.
impl Default for CurrentUser {
    fn default() -> Self {
        Self {
            id: 0,
            name: "user".to_string(),
            email: "user@example.com".to_string(),
        }
    }
}

impl From<&User> for CurrentUser {
    fn from(user: &User) -> Self {
        Self {
            id: user.id.unwrap_or(0),
            name: user.name.clone(),
            email: user.email.clone(),
        }
    }
}

#[derive(Debug, Clone)]
pub struct Session {
    current: Arc<watch::Sender<CurrentUser>>,
}

impl Session {
    pub fn new() -> Self {
        let (current, _) = watch::channel(CurrentUser::default());
        Self {
            current: Arc::new(current),
        }
    }

    pub fn current(&self) -> CurrentUser {
        self.current.borrow().clone()
    }

    pub fn subscribe(&self) -> watch::Receiver<CurrentUser> {
        self.current.subscribe()
    }

    pub(crate) fn sign_in(&self, user: &User) {
        let signed_in = CurrentUser::from(user);
        tracing::info!("signed in as {} <{}>", signed_in.name, signed_in.email);
        self.current.send_replace(signed_in);
    }

    pub fn sign_out(&self) {
        self.current.send_replace(CurrentUser::default());
    }
}

impl Default for Session {
    fn default() -> Self {
        Self::new()
    }
}
