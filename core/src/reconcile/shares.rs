//! Who a list is shared with. Share and unshare answer with acknowledgements
//! only, so each success is followed by a re-fetch of the share list alone.

use crate::gateway::Gateway;
use crate::reconcile::{expect_ok, expect_status, replace_all, SyncError, Trigger, INVALID_LIST};
use crate::types::{ListShareCreate, User};

const SHARE_FAILED: &str = "Error Sharing List";
const UNSHARE_FAILED: &str = "Error Removing User";

/// A titled error shown as a modal alert.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Alert {
    pub title: String,
    pub message: String,
}

pub struct SharesReconciler {
    gateway: Gateway,
    list_id: Option<i64>,
    shared_with: Vec<User>,
    error: Option<String>,
    alert: Option<Alert>,
}

impl SharesReconciler {
    pub fn new(gateway: Gateway, list_id: Option<i64>) -> Self {
        Self {
            gateway,
            list_id,
            shared_with: Vec::new(),
            error: None,
            alert: None,
        }
    }

    pub fn shared_with(&self) -> &[User] {
        &self.shared_with
    }

    pub fn error(&self) -> Option<&str> {
        self.error.as_deref()
    }

    pub fn alert(&self) -> Option<&Alert> {
        self.alert.as_ref()
    }

    pub fn dismiss_alert(&mut self) {
        self.alert = None;
    }

    /// Refresh the users the list is shared with. A list that was never
    /// persisted has no shares and issues no request.
    pub async fn fetch_shares(&mut self, trigger: Trigger) -> Result<(), SyncError> {
        let Some(list_id) = self.list_id else {
            return Ok(());
        };
        let fetched = match self.gateway.fetch_shares(list_id).await {
            Ok(response) => expect_ok(response),
            Err(err) => Err(err.into()),
        };
        match fetched {
            Ok(users) => {
                replace_all(&mut self.shared_with, users);
                self.error = None;
                tracing::debug!("list {list_id} is shared with {} users", self.shared_with.len());
                Ok(())
            }
            Err(err) => {
                if trigger == Trigger::User {
                    self.error = Some(err.to_string());
                }
                tracing::warn!("fetching shares of list {list_id} failed: {err:?}");
                Err(err)
            }
        }
    }

    pub async fn share_with(&mut self, email: &str) -> Result<(), SyncError> {
        let result = match self.list_id {
            None => Err(SyncError::Invalid(INVALID_LIST.to_string())),
            Some(_) if email.trim().is_empty() => Err(SyncError::Invalid("Please enter an email.".to_string())),
            Some(list_id) => {
                let input = ListShareCreate {
                    email: email.trim().to_string(),
                    shopping_list_id: list_id,
                };
                match self.gateway.add_share(&input).await {
                    Ok(response) => expect_status(response, 200),
                    Err(err) => Err(err.into()),
                }
            }
        };
        self.finish(result, SHARE_FAILED).await
    }

    pub async fn unshare(&mut self, user_id: i64) -> Result<(), SyncError> {
        let result = match self.list_id {
            None => Err(SyncError::Invalid(INVALID_LIST.to_string())),
            Some(list_id) => match self.gateway.remove_share(list_id, user_id).await {
                Ok(response) => expect_status(response, 200),
                Err(err) => Err(err.into()),
            },
        };
        self.finish(result, UNSHARE_FAILED).await
    }

    async fn finish(&mut self, result: Result<(), SyncError>, title: &str) -> Result<(), SyncError> {
        match result {
            Ok(()) => {
                let _ = self.fetch_shares(Trigger::Appear).await;
                Ok(())
            }
            Err(err) => {
                tracing::error!("{title}: {err:?}");
                self.alert = Some(Alert {
                    title: title.to_string(),
                    message: err.to_string(),
                });
                Err(err)
            }
        }
    }
}
