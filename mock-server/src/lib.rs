use std::{collections::BTreeMap, sync::Arc};

use axum::{
    extract::{Path, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::{delete, get, post, put},
    Json, Router,
};
use chrono::{DateTime, NaiveDateTime, Utc};
use serde::{Deserialize, Serialize, Serializer};
use tokio::{net::TcpListener, sync::RwLock};

/// Pattern the service writes timestamps in.
pub const DATE_FORMAT: &str = "%Y-%m-%dT%H:%M:%S";

#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct User {
    pub id: i64,
    pub name: String,
    pub email: String,
}

#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct ShoppingList {
    pub id: i64,
    pub name: String,
    pub description: String,
    pub currency: String,
    pub user_id: Option<i64>,
}

#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct Item {
    pub id: i64,
    pub name: String,
    pub description: String,
    pub shopping_list_id: i64,
}

#[derive(Clone, Debug, Serialize)]
pub struct Bill {
    pub id: i64,
    pub name: String,
    #[serde(serialize_with = "write_date")]
    pub date: DateTime<Utc>,
    pub amount: f64,
    pub shopping_list_id: i64,
    pub user_id: Option<i64>,
    pub user_name: Option<String>,
}

#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct Summary {
    pub user_id: Option<i64>,
    pub user: String,
    pub amount: f64,
    pub percent: f64,
}

#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct Message {
    pub message: String,
}

#[derive(Deserialize)]
pub struct Login {
    pub email: String,
    pub password: String,
}

#[derive(Deserialize)]
pub struct Register {
    pub name: String,
    pub email: String,
    pub password: String,
}

#[derive(Deserialize)]
pub struct ListInput {
    pub name: String,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub currency: String,
}

#[derive(Deserialize)]
pub struct ShareInput {
    pub email: String,
    pub shopping_list_id: i64,
}

#[derive(Deserialize)]
pub struct ItemInput {
    pub name: String,
    #[serde(default)]
    pub description: String,
    pub shopping_list_id: i64,
}

#[derive(Deserialize)]
pub struct ItemPatch {
    pub name: Option<String>,
    pub description: Option<String>,
}

#[derive(Deserialize)]
pub struct BillInput {
    pub name: String,
    pub date: String,
    pub amount: f64,
    pub shopping_list_id: i64,
}

struct Account {
    user: User,
    password: String,
}

/// Everything the service knows. The last successful login acts as the
/// caller for owner/creator bookkeeping.
#[derive(Default)]
pub struct Store {
    accounts: Vec<Account>,
    lists: BTreeMap<i64, ShoppingList>,
    shares: Vec<(i64, i64)>,
    items: BTreeMap<i64, Item>,
    bills: BTreeMap<i64, Bill>,
    acting_user: Option<i64>,
    next_id: i64,
}

impl Store {
    fn next_id(&mut self) -> i64 {
        self.next_id += 1;
        self.next_id
    }

    fn user(&self, id: i64) -> Option<&User> {
        self.accounts.iter().map(|a| &a.user).find(|u| u.id == id)
    }
}

pub type Db = Arc<RwLock<Store>>;

pub fn app() -> Router {
    let db: Db = Arc::new(RwLock::new(Store::default()));
    Router::new()
        .route("/login", post(login))
        .route("/register", post(register))
        .route("/shopping_lists/all", get(list_lists))
        .route("/shopping_list", post(create_list))
        .route("/shopping_list/{id}", put(update_list).delete(delete_list))
        .route("/list_share", post(add_share))
        .route("/list_share/{list_id}", get(list_shares))
        .route("/list_share/{list_id}/{user_id}", delete(remove_share))
        .route("/items/{list_id}", get(list_items))
        .route("/item", post(create_item))
        .route("/item/{id}", put(update_item).delete(delete_item))
        .route("/bills/{list_id}", get(list_bills))
        .route("/bill", post(create_bill))
        .route("/bill/summary/{list_id}", get(summary))
        .with_state(db)
}

pub async fn run(listener: TcpListener) -> Result<(), std::io::Error> {
    axum::serve(listener, app()).await
}

fn message(status: StatusCode, text: &str) -> Response {
    (
        status,
        Json(Message {
            message: text.to_string(),
        }),
    )
        .into_response()
}

fn write_date<S: Serializer>(date: &DateTime<Utc>, serializer: S) -> Result<S::Ok, S::Error> {
    serializer.serialize_str(&date.format(DATE_FORMAT).to_string())
}

/// Accept ISO-8601 with an explicit numeric offset only; `Z` is refused.
pub fn parse_bill_date(raw: &str) -> Option<DateTime<Utc>> {
    if raw.ends_with('Z') || raw.ends_with('z') {
        return None;
    }
    if let Ok(date) = DateTime::parse_from_rfc3339(raw) {
        return Some(date.with_timezone(&Utc));
    }
    NaiveDateTime::parse_from_str(raw, DATE_FORMAT).ok().map(|d| d.and_utc())
}

async fn login(State(db): State<Db>, Json(input): Json<Login>) -> Response {
    let mut store = db.write().await;
    let found = store
        .accounts
        .iter()
        .find(|a| a.user.email == input.email && a.password == input.password)
        .map(|a| a.user.clone());
    match found {
        Some(user) => {
            store.acting_user = Some(user.id);
            tracing::info!(user = user.id, "login");
            (StatusCode::OK, Json(user)).into_response()
        }
        None => message(StatusCode::UNAUTHORIZED, "Invalid email or password"),
    }
}

async fn register(State(db): State<Db>, Json(input): Json<Register>) -> Response {
    let mut store = db.write().await;
    if store.accounts.iter().any(|a| a.user.email == input.email) {
        return message(StatusCode::CONFLICT, "Email already registered");
    }
    let id = store.next_id();
    store.accounts.push(Account {
        user: User {
            id,
            name: input.name,
            email: input.email,
        },
        password: input.password,
    });
    message(StatusCode::CREATED, "User created")
}

async fn list_lists(State(db): State<Db>) -> Json<Vec<ShoppingList>> {
    let store = db.read().await;
    Json(store.lists.values().cloned().collect())
}

async fn create_list(State(db): State<Db>, Json(input): Json<ListInput>) -> Response {
    if input.name.trim().is_empty() {
        return message(StatusCode::BAD_REQUEST, "Name is required");
    }
    let mut store = db.write().await;
    let id = store.next_id();
    let owner = store.acting_user;
    store.lists.insert(
        id,
        ShoppingList {
            id,
            name: input.name,
            description: input.description,
            currency: input.currency,
            user_id: owner,
        },
    );
    message(StatusCode::CREATED, "Shopping list created")
}

async fn update_list(State(db): State<Db>, Path(id): Path<i64>, Json(input): Json<ListInput>) -> Response {
    let mut store = db.write().await;
    let Some(list) = store.lists.get_mut(&id) else {
        return message(StatusCode::NOT_FOUND, "Shopping list not found");
    };
    list.name = input.name;
    list.description = input.description;
    list.currency = input.currency;
    message(StatusCode::OK, "Shopping list updated")
}

async fn delete_list(State(db): State<Db>, Path(id): Path<i64>) -> Response {
    let mut store = db.write().await;
    if store.lists.remove(&id).is_none() {
        return message(StatusCode::NOT_FOUND, "Shopping list not found");
    }
    store.items.retain(|_, item| item.shopping_list_id != id);
    store.bills.retain(|_, bill| bill.shopping_list_id != id);
    store.shares.retain(|(list_id, _)| *list_id != id);
    message(StatusCode::OK, "Shopping list deleted")
}

async fn list_shares(State(db): State<Db>, Path(list_id): Path<i64>) -> Response {
    let store = db.read().await;
    if !store.lists.contains_key(&list_id) {
        return message(StatusCode::NOT_FOUND, "Shopping list not found");
    }
    let users: Vec<User> = store
        .shares
        .iter()
        .filter(|(l, _)| *l == list_id)
        .filter_map(|(_, user_id)| store.user(*user_id).cloned())
        .collect();
    Json(users).into_response()
}

async fn add_share(State(db): State<Db>, Json(input): Json<ShareInput>) -> Response {
    let mut store = db.write().await;
    if !store.lists.contains_key(&input.shopping_list_id) {
        return message(StatusCode::NOT_FOUND, "Shopping list not found");
    }
    let Some(user_id) = store.accounts.iter().find(|a| a.user.email == input.email).map(|a| a.user.id) else {
        return message(StatusCode::NOT_FOUND, "User not found");
    };
    let share = (input.shopping_list_id, user_id);
    if store.shares.contains(&share) {
        return message(StatusCode::CONFLICT, "List already shared with this user");
    }
    store.shares.push(share);
    message(StatusCode::OK, "List shared")
}

async fn remove_share(State(db): State<Db>, Path((list_id, user_id)): Path<(i64, i64)>) -> Response {
    let mut store = db.write().await;
    let before = store.shares.len();
    store.shares.retain(|share| *share != (list_id, user_id));
    if store.shares.len() == before {
        return message(StatusCode::NOT_FOUND, "Share not found");
    }
    message(StatusCode::OK, "Share removed")
}

async fn list_items(State(db): State<Db>, Path(list_id): Path<i64>) -> Json<Vec<Item>> {
    let store = db.read().await;
    Json(store.items.values().filter(|i| i.shopping_list_id == list_id).cloned().collect())
}

async fn create_item(State(db): State<Db>, Json(input): Json<ItemInput>) -> Response {
    let mut store = db.write().await;
    if !store.lists.contains_key(&input.shopping_list_id) {
        return message(StatusCode::NOT_FOUND, "Shopping list not found");
    }
    let id = store.next_id();
    store.items.insert(
        id,
        Item {
            id,
            name: input.name,
            description: input.description,
            shopping_list_id: input.shopping_list_id,
        },
    );
    message(StatusCode::CREATED, "Item created")
}

async fn update_item(State(db): State<Db>, Path(id): Path<i64>, Json(patch): Json<ItemPatch>) -> Response {
    let mut store = db.write().await;
    let Some(item) = store.items.get_mut(&id) else {
        return message(StatusCode::NOT_FOUND, "Item not found");
    };
    if let Some(name) = patch.name {
        item.name = name;
    }
    if let Some(description) = patch.description {
        item.description = description;
    }
    message(StatusCode::OK, "Item updated")
}

async fn delete_item(State(db): State<Db>, Path(id): Path<i64>) -> Response {
    let mut store = db.write().await;
    match store.items.remove(&id) {
        Some(_) => message(StatusCode::OK, "Item deleted"),
        None => message(StatusCode::NOT_FOUND, "Item not found"),
    }
}

async fn list_bills(State(db): State<Db>, Path(list_id): Path<i64>) -> Json<Vec<Bill>> {
    let store = db.read().await;
    Json(store.bills.values().filter(|b| b.shopping_list_id == list_id).cloned().collect())
}

async fn create_bill(State(db): State<Db>, Json(input): Json<BillInput>) -> Response {
    let Some(date) = parse_bill_date(&input.date) else {
        return message(StatusCode::BAD_REQUEST, "Invalid date format");
    };
    if !input.amount.is_finite() || input.amount < 0.0 {
        return message(StatusCode::BAD_REQUEST, "Invalid amount");
    }
    let mut store = db.write().await;
    if !store.lists.contains_key(&input.shopping_list_id) {
        return message(StatusCode::NOT_FOUND, "Shopping list not found");
    }
    let id = store.next_id();
    let creator = store.acting_user.and_then(|uid| store.user(uid).cloned());
    store.bills.insert(
        id,
        Bill {
            id,
            name: input.name,
            date,
            amount: input.amount,
            shopping_list_id: input.shopping_list_id,
            user_id: creator.as_ref().map(|u| u.id),
            user_name: creator.map(|u| u.name),
        },
    );
    message(StatusCode::CREATED, "Bill created")
}

async fn summary(State(db): State<Db>, Path(list_id): Path<i64>) -> Json<Vec<Summary>> {
    let store = db.read().await;
    let mut per_user: BTreeMap<Option<i64>, Summary> = BTreeMap::new();
    for bill in store.bills.values().filter(|b| b.shopping_list_id == list_id) {
        let entry = per_user.entry(bill.user_id).or_insert_with(|| Summary {
            user_id: bill.user_id,
            user: bill.user_name.clone().unwrap_or_else(|| "Unknown".to_string()),
            amount: 0.0,
            percent: 0.0,
        });
        entry.amount += bill.amount;
    }
    let total: f64 = per_user.values().map(|s| s.amount).sum();
    let summaries = per_user
        .into_values()
        .map(|mut s| {
            s.percent = if total > 0.0 { s.amount / total * 100.0 } else { 0.0 };
            s
        })
        .collect();
    Json(summaries)
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    #[test]
    fn bill_dates_are_written_without_offset() {
        let bill = Bill {
            id: 1,
            name: "Groceries".to_string(),
            date: Utc.with_ymd_and_hms(2025, 1, 9, 10, 0, 0).unwrap(),
            amount: 42.5,
            shopping_list_id: 7,
            user_id: None,
            user_name: None,
        };
        let json = serde_json::to_value(&bill).unwrap();
        assert_eq!(json["date"], "2025-01-09T10:00:00");
    }

    #[test]
    fn explicit_offset_is_accepted() {
        let date = parse_bill_date("2025-01-09T10:00:00+00:00").unwrap();
        assert_eq!(date, Utc.with_ymd_and_hms(2025, 1, 9, 10, 0, 0).unwrap());
    }

    #[test]
    fn other_offsets_are_normalised_to_utc() {
        let date = parse_bill_date("2025-01-09T12:00:00+02:00").unwrap();
        assert_eq!(date, Utc.with_ymd_and_hms(2025, 1, 9, 10, 0, 0).unwrap());
    }

    #[test]
    fn zulu_suffix_is_refused() {
        assert!(parse_bill_date("2025-01-09T10:00:00Z").is_none());
    }

    #[test]
    fn list_input_defaults_optional_fields() {
        let input: ListInput = serde_json::from_str(r#"{"name":"Weekly"}"#).unwrap();
        assert!(input.currency.is_empty());
        assert!(input.description.is_empty());
    }

    #[test]
    fn item_patch_all_fields_optional() {
        let patch: ItemPatch = serde_json::from_str("{}").unwrap();
        assert!(patch.name.is_none());
        assert!(patch.description.is_none());
    }

    #[test]
    fn store_ids_are_unique_across_kinds() {
        let mut store = Store::default();
        assert_eq!(store.next_id(), 1);
        assert_eq!(store.next_id(), 2);
    }
}
