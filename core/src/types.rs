//! Domain records exchanged with the ListSplit service.
//!
//! # Design
//! Records are value snapshots: relationships are plain integer ids and no
//! record owns another. Server-assigned ids are `Option` until persisted and
//! are omitted from request bodies while `None`. Multi-word fields use the
//! service's snake_case keys; where the in-memory name differs from the wire
//! key the field carries an explicit `rename`.
//!
//! Local-only state (`local_id` correlation tokens, the `is_checked` flag) is
//! skipped by the codec entirely, so it is regenerated on every decode.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::date;

/// Currency written when the user leaves the field blank.
pub const DEFAULT_CURRENCY: &str = "$";

/// A registered user. `password` is write-only: it is sent on registration
/// and never decoded from a response.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct User {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub id: Option<i64>,
    pub name: String,
    pub email: String,
    #[serde(skip_deserializing, skip_serializing_if = "Option::is_none")]
    pub password: Option<String>,
}

impl User {
    pub fn registration(name: &str, email: &str, password: &str) -> Self {
        Self {
            id: None,
            name: name.to_string(),
            email: email.to_string(),
            password: Some(password.to_string()),
        }
    }
}

/// Body of `POST login`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoginData {
    pub email: String,
    pub password: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ShoppingList {
    #[serde(skip, default = "Uuid::new_v4")]
    pub local_id: Uuid,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub id: Option<i64>,
    pub name: String,
    pub description: String,
    pub currency: String,
    #[serde(rename = "user_id", skip_serializing_if = "Option::is_none")]
    pub owner_id: Option<i64>,
}

impl ShoppingList {
    pub fn new(name: &str) -> Self {
        Self {
            local_id: Uuid::new_v4(),
            id: None,
            name: name.to_string(),
            description: String::new(),
            currency: String::new(),
            owner_id: None,
        }
    }
}

impl Default for ShoppingList {
    fn default() -> Self {
        Self::new("")
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ShoppingItem {
    #[serde(skip, default = "Uuid::new_v4")]
    pub local_id: Uuid,
    /// Purchase mark; never sent to or received from the service.
    #[serde(skip)]
    pub is_checked: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub id: Option<i64>,
    pub name: String,
    pub description: String,
    pub shopping_list_id: i64,
}

impl ShoppingItem {
    pub fn new(name: &str, shopping_list_id: i64) -> Self {
        Self {
            local_id: Uuid::new_v4(),
            is_checked: false,
            id: None,
            name: name.to_string(),
            description: String::new(),
            shopping_list_id,
        }
    }
}

/// Body of `PUT item/{id}`: only the user-editable fields.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ItemUpdate {
    pub name: String,
    pub description: String,
}

impl From<&ShoppingItem> for ItemUpdate {
    fn from(item: &ShoppingItem) -> Self {
        Self {
            name: item.name.clone(),
            description: item.description.clone(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Bill {
    #[serde(skip, default = "Uuid::new_v4")]
    pub local_id: Uuid,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub id: Option<i64>,
    pub name: String,
    #[serde(with = "date::server")]
    pub date: DateTime<Utc>,
    pub amount: f64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub shopping_list_id: Option<i64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub user_id: Option<i64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub user_name: Option<String>,
}

/// Body of `POST bill`. The date is the one field written with an explicit
/// `+00:00` offset.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BillCreate {
    pub name: String,
    #[serde(with = "date::offset")]
    pub date: DateTime<Utc>,
    pub amount: f64,
    pub shopping_list_id: i64,
}

/// One participant's share of a list's expenses.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BillSummary {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub user_id: Option<i64>,
    #[serde(rename = "user")]
    pub user_name: String,
    pub amount: f64,
    pub percent: f64,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ListShare {
    pub id: i64,
    pub shopping_list_id: i64,
    pub user_id: i64,
}

/// Body of `POST list_share`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ListShareCreate {
    pub email: String,
    pub shopping_list_id: i64,
}

/// Free-text acknowledgement or explanation returned by most mutations.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Message {
    pub message: String,
}
