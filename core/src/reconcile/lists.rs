//! The user's lists: top-level fetch, create/update with re-fetch, and delete
//! as a local patch.

use crate::gateway::Gateway;
use crate::reconcile::{expect_ok, expect_status, replace_all, SyncError, Trigger, INVALID_LIST};
use crate::types::{ShoppingList, DEFAULT_CURRENCY};

pub const DEFAULT_NAME: &str = "My List";
pub const DEFAULT_DESCRIPTION: &str = "Used to shop at ALDI's";

/// Contents of the list settings form. Blank fields fall back to defaults.
#[derive(Debug, Clone, Default)]
pub struct ListDraft {
    pub name: String,
    pub description: String,
    pub currency: String,
}

impl ListDraft {
    /// Prefill the form from an existing list.
    pub fn from_list(list: &ShoppingList) -> Self {
        Self {
            name: list.name.clone(),
            description: list.description.clone(),
            currency: list.currency.clone(),
        }
    }

    pub fn into_list(self) -> ShoppingList {
        let mut list = ShoppingList::new(&or_default(self.name, DEFAULT_NAME));
        list.description = or_default(self.description, DEFAULT_DESCRIPTION);
        list.currency = or_default(self.currency, DEFAULT_CURRENCY);
        list
    }
}

fn or_default(value: String, default: &str) -> String {
    if value.trim().is_empty() {
        default.to_string()
    } else {
        value
    }
}

pub struct ListsReconciler {
    gateway: Gateway,
    lists: Vec<ShoppingList>,
    error: Option<String>,
}

impl ListsReconciler {
    pub fn new(gateway: Gateway) -> Self {
        Self {
            gateway,
            lists: Vec::new(),
            error: None,
        }
    }

    pub fn lists(&self) -> &[ShoppingList] {
        &self.lists
    }

    pub fn error(&self) -> Option<&str> {
        self.error.as_deref()
    }

    /// Replace the local lists with the server's. On failure the previous
    /// lists stay; only a user-triggered refresh surfaces the error.
    pub async fn fetch_lists(&mut self, trigger: Trigger) -> Result<(), SyncError> {
        let fetched = match self.gateway.fetch_lists().await {
            Ok(response) => expect_ok(response),
            Err(err) => Err(err.into()),
        };
        match fetched {
            Ok(lists) => {
                replace_all(&mut self.lists, lists);
                self.error = None;
                tracing::debug!("fetched {} shopping lists", self.lists.len());
                Ok(())
            }
            Err(err) => {
                match trigger {
                    Trigger::User => {
                        tracing::error!("fetching shopping lists failed: {err:?}");
                        self.error = Some(err.to_string());
                    }
                    Trigger::Appear => tracing::warn!("background list refresh failed: {err:?}"),
                }
                Err(err)
            }
        }
    }

    pub async fn create_list(&mut self, draft: ListDraft) -> Result<(), SyncError> {
        let list = draft.into_list();
        let result = match self.gateway.create_list(&list).await {
            Ok(response) => expect_status(response, 201),
            Err(err) => Err(err.into()),
        };
        self.finish_save(result, "created").await
    }

    /// Overwrite `list` on the server with the draft's fields.
    pub async fn update_list(&mut self, list: &ShoppingList, draft: ListDraft) -> Result<(), SyncError> {
        let Some(id) = list.id else {
            return self.finish_save(Err(SyncError::Invalid(INVALID_LIST.to_string())), "updated").await;
        };
        let mut updated = draft.into_list();
        updated.id = Some(id);
        updated.owner_id = list.owner_id;
        let result = match self.gateway.update_list(id, &updated).await {
            Ok(response) => expect_status(response, 200),
            Err(err) => Err(err.into()),
        };
        self.finish_save(result, "updated").await
    }

    async fn finish_save(&mut self, result: Result<(), SyncError>, verb: &str) -> Result<(), SyncError> {
        match result {
            Ok(()) => {
                tracing::info!("shopping list {verb}");
                self.error = None;
                // the save itself succeeded; a failed refresh only leaves stale rows
                let _ = self.fetch_lists(Trigger::Appear).await;
                Ok(())
            }
            Err(err) => {
                tracing::error!("saving shopping list failed: {err:?}");
                self.error = Some(err.to_string());
                Err(err)
            }
        }
    }

    /// Delete `list` and drop it locally without re-fetching.
    pub async fn delete_list(&mut self, list: &ShoppingList) -> Result<(), SyncError> {
        let result = match list.id {
            None => Err(SyncError::Invalid(INVALID_LIST.to_string())),
            Some(id) => match self.gateway.delete_list(id).await {
                Ok(response) => expect_status(response, 200).map(|()| id),
                Err(err) => Err(err.into()),
            },
        };
        match result {
            Ok(id) => {
                if let Some(index) = self.lists.iter().position(|l| l.id == Some(id)) {
                    self.lists.remove(index);
                }
                self.error = None;
                Ok(())
            }
            Err(err) => {
                tracing::error!("deleting shopping list failed: {err:?}");
                self.error = Some(err.to_string());
                Err(err)
            }
        }
    }
}
