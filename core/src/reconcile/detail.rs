//! A single list's screen: its items (with local check marks) and its
//! expenses (bills and the per-user summary).
//!
//! # Design
//! Independent fetches issued together (`on_appear`, `refresh_expenses`) race
//! with `tokio::join!` and are applied in whatever order they land. Sequenced
//! steps (`add_bill` → optional delete → refresh) are awaited one after the
//! other.
//!
//! `delete_items` is the one concurrent fan-out: one DELETE per item runs on a
//! `JoinSet`, every task may clear a shared success flag, and nothing is
//! decided until the set has drained. On full success the items are removed
//! locally; on any failure the list is re-fetched, since which subset
//! succeeded is not tracked.

use std::collections::HashSet;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use chrono::{DateTime, Utc};
use tokio::task::JoinSet;
use uuid::Uuid;

use crate::client::ApiResult;
use crate::gateway::Gateway;
use crate::reconcile::{expect_ok, expect_status, replace_all, SyncError, INVALID_LIST};
use crate::types::{Bill, BillCreate, BillSummary, ItemUpdate, ShoppingItem};

/// How a `delete_items` call settled.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DeleteOutcome {
    /// Every deletion succeeded; this many items were dropped locally.
    Removed(usize),
    /// At least one deletion failed; the items were re-fetched instead.
    Resynchronized,
}

/// Contents of the "add a bill" form.
#[derive(Debug, Clone)]
pub struct BillDraft {
    pub name: String,
    /// Amount as typed; `,` is accepted as the decimal separator.
    pub amount: String,
    pub date: DateTime<Utc>,
}

impl BillDraft {
    pub fn parse_amount(&self) -> Option<f64> {
        let amount: f64 = self.amount.trim().replace(',', ".").parse().ok()?;
        (amount.is_finite() && amount >= 0.0).then_some(amount)
    }

    fn into_create(self, shopping_list_id: i64) -> Result<BillCreate, SyncError> {
        let amount = self
            .parse_amount()
            .ok_or_else(|| SyncError::Invalid(format!("Invalid amount: {:?}", self.amount)))?;
        Ok(BillCreate {
            name: self.name,
            date: self.date,
            amount,
            shopping_list_id,
        })
    }
}

pub struct ListDetailReconciler {
    gateway: Gateway,
    list_id: Option<i64>,
    items: Vec<ShoppingItem>,
    bills: Vec<Bill>,
    summaries: Vec<BillSummary>,
    error: Option<String>,
}

impl ListDetailReconciler {
    pub fn new(gateway: Gateway, list_id: Option<i64>) -> Self {
        Self {
            gateway,
            list_id,
            items: Vec::new(),
            bills: Vec::new(),
            summaries: Vec::new(),
            error: None,
        }
    }

    pub fn items(&self) -> &[ShoppingItem] {
        &self.items
    }

    /// Bills, newest first.
    pub fn bills(&self) -> &[Bill] {
        &self.bills
    }

    /// Per-user summaries, largest share first.
    pub fn summaries(&self) -> &[BillSummary] {
        &self.summaries
    }

    pub fn error(&self) -> Option<&str> {
        self.error.as_deref()
    }

    fn require_list(&self) -> Result<i64, SyncError> {
        self.list_id.ok_or_else(|| SyncError::Invalid(INVALID_LIST.to_string()))
    }

    fn fail(&mut self, err: SyncError) -> SyncError {
        tracing::error!("list {:?}: {err:?}", self.list_id);
        self.error = Some(err.to_string());
        err
    }

    fn clear_error(&mut self) {
        self.error = None;
    }

    /// Items, bills and summary all at once; failures only get logged.
    pub async fn on_appear(&mut self) {
        let Some(list_id) = self.list_id else {
            return;
        };
        let (items, bills, summary) = tokio::join!(
            self.gateway.fetch_items(list_id),
            self.gateway.fetch_bills(list_id),
            self.gateway.fetch_summary(list_id),
        );
        let _ = self.apply_items(items);
        let _ = self.apply_bills(bills);
        let _ = self.apply_summary(summary);
    }

    // --- items ---

    pub async fn fetch_items(&mut self) -> Result<(), SyncError> {
        let Some(list_id) = self.list_id else {
            return Ok(());
        };
        let fetched = self.gateway.fetch_items(list_id).await;
        self.apply_items(fetched)?;
        self.clear_error();
        Ok(())
    }

    fn apply_items(&mut self, fetched: ApiResult<Vec<ShoppingItem>>) -> Result<(), SyncError> {
        let items = fetched.map_err(SyncError::from).and_then(expect_ok).inspect_err(|err| {
            tracing::warn!("fetching items of list {:?} failed: {err:?}", self.list_id);
        })?;
        replace_all(&mut self.items, items);
        tracing::debug!("fetched {} shopping items", self.items.len());
        Ok(())
    }

    pub async fn add_item(&mut self, name: &str) -> Result<(), SyncError> {
        let list_id = self.require_list().map_err(|e| self.fail(e))?;
        if name.trim().is_empty() {
            return Err(self.fail(SyncError::Invalid("Item name must not be empty".to_string())));
        }
        let item = ShoppingItem::new(name, list_id);
        let result = match self.gateway.create_item(&item).await {
            Ok(response) => expect_status(response, 201),
            Err(err) => Err(err.into()),
        };
        result.map_err(|e| self.fail(e))?;
        self.clear_error();
        let _ = self.fetch_items().await;
        Ok(())
    }

    /// Save the name and description of `item`.
    pub async fn update_item(&mut self, item: &ShoppingItem) -> Result<(), SyncError> {
        let Some(item_id) = item.id else {
            return Err(self.fail(SyncError::Invalid("Invalid item selected".to_string())));
        };
        let result = match self.gateway.update_item(item_id, &ItemUpdate::from(item)).await {
            Ok(response) => expect_status(response, 200),
            Err(err) => Err(err.into()),
        };
        result.map_err(|e| self.fail(e))?;
        self.clear_error();
        let _ = self.fetch_items().await;
        Ok(())
    }

    /// Flip the local check mark. Never sent to the service.
    pub fn toggle_checked(&mut self, local_id: Uuid) {
        if let Some(item) = self.items.iter_mut().find(|i| i.local_id == local_id) {
            item.is_checked = !item.is_checked;
        }
    }

    pub fn set_all_checked(&mut self, checked: bool) {
        for item in &mut self.items {
            item.is_checked = checked;
        }
    }

    pub fn any_checked(&self) -> bool {
        self.items.iter().any(|i| i.is_checked)
    }

    pub fn checked_items(&self) -> Vec<ShoppingItem> {
        self.items.iter().filter(|i| i.is_checked).cloned().collect()
    }

    /// Items whose name contains `query`, ignoring case. An empty query
    /// matches everything.
    pub fn filtered_items(&self, query: &str) -> Vec<&ShoppingItem> {
        let query = query.to_lowercase();
        self.items
            .iter()
            .filter(|i| query.is_empty() || i.name.to_lowercase().contains(&query))
            .collect()
    }

    /// Delete `doomed` on the server, one request per item, all in flight at
    /// once. Items without a server id are only dropped locally.
    pub async fn delete_items(&mut self, doomed: Vec<ShoppingItem>) -> DeleteOutcome {
        let all_succeeded = Arc::new(AtomicBool::new(true));
        let mut pending = JoinSet::new();

        for item_id in doomed.iter().filter_map(|item| item.id) {
            let gateway = self.gateway.clone();
            let all_succeeded = Arc::clone(&all_succeeded);
            pending.spawn(async move {
                match gateway.delete_item(item_id).await {
                    Ok(200) => {}
                    Ok(status) => {
                        tracing::warn!("deleting item {item_id} answered {status}");
                        all_succeeded.store(false, Ordering::SeqCst);
                    }
                    Err(err) => {
                        tracing::warn!("deleting item {item_id} failed: {err}");
                        all_succeeded.store(false, Ordering::SeqCst);
                    }
                }
            });
        }

        while let Some(joined) = pending.join_next().await {
            if let Err(err) = joined {
                tracing::warn!("delete task did not finish: {err}");
                all_succeeded.store(false, Ordering::SeqCst);
            }
        }

        if all_succeeded.load(Ordering::SeqCst) {
            let removed: HashSet<Uuid> = doomed.iter().map(|i| i.local_id).collect();
            let before = self.items.len();
            self.items.retain(|i| !removed.contains(&i.local_id));
            DeleteOutcome::Removed(before - self.items.len())
        } else {
            let _ = self.fetch_items().await;
            DeleteOutcome::Resynchronized
        }
    }

    pub async fn delete_checked(&mut self) -> DeleteOutcome {
        let checked = self.checked_items();
        self.delete_items(checked).await
    }

    // --- expenses ---

    pub async fn fetch_bills(&mut self) -> Result<(), SyncError> {
        let Some(list_id) = self.list_id else {
            return Ok(());
        };
        let fetched = self.gateway.fetch_bills(list_id).await;
        self.apply_bills(fetched)
    }

    fn apply_bills(&mut self, fetched: ApiResult<Vec<Bill>>) -> Result<(), SyncError> {
        let mut bills = fetched.map_err(SyncError::from).and_then(expect_ok).inspect_err(|err| {
            tracing::warn!("fetching bills of list {:?} failed: {err:?}", self.list_id);
        })?;
        bills.sort_by(|a, b| b.date.cmp(&a.date));
        replace_all(&mut self.bills, bills);
        tracing::debug!("fetched {} bills", self.bills.len());
        Ok(())
    }

    pub async fn fetch_summary(&mut self) -> Result<(), SyncError> {
        let Some(list_id) = self.list_id else {
            return Ok(());
        };
        let fetched = self.gateway.fetch_summary(list_id).await;
        self.apply_summary(fetched)
    }

    fn apply_summary(&mut self, fetched: ApiResult<Vec<BillSummary>>) -> Result<(), SyncError> {
        let mut summaries = fetched.map_err(SyncError::from).and_then(expect_ok).inspect_err(|err| {
            tracing::warn!("fetching bill summary of list {:?} failed: {err:?}", self.list_id);
        })?;
        summaries.sort_by(|a, b| b.percent.total_cmp(&a.percent));
        replace_all(&mut self.summaries, summaries);
        Ok(())
    }

    /// Bills and summary together; both requests race.
    pub async fn refresh_expenses(&mut self) {
        let Some(list_id) = self.list_id else {
            return;
        };
        let (bills, summary) = tokio::join!(self.gateway.fetch_bills(list_id), self.gateway.fetch_summary(list_id));
        let _ = self.apply_bills(bills);
        let _ = self.apply_summary(summary);
    }

    /// Sum of what every participant spent on this list.
    pub fn total_owed(&self) -> f64 {
        self.summaries.iter().map(|s| s.amount).sum()
    }

    /// Record a bill. Once the service confirms creation, optionally delete
    /// every checked item, then refresh bills and summary. A rejected bill
    /// skips both follow-ups.
    pub async fn add_bill(&mut self, draft: BillDraft, should_delete_items: bool) -> Result<(), SyncError> {
        let list_id = self.require_list().map_err(|e| self.fail(e))?;
        let bill = draft.into_create(list_id).map_err(|e| self.fail(e))?;

        let result = match self.gateway.create_bill(&bill).await {
            Ok(response) => expect_status(response, 201),
            Err(err) => Err(err.into()),
        };
        result.map_err(|e| self.fail(e))?;
        self.clear_error();
        tracing::info!("bill {:?} of {} recorded on list {list_id}", bill.name, bill.amount);

        if should_delete_items {
            let outcome = self.delete_checked().await;
            tracing::debug!("clearing purchased items: {outcome:?}");
        }
        self.refresh_expenses().await;
        Ok(())
    }
}
