use axum::http::{self, Request, StatusCode};
use axum::routing::RouterIntoService;
use http_body_util::BodyExt;
use mock_server::{app, Item, Message, ShoppingList, Summary, User};
use tower::{Service, ServiceExt};

async fn body_json<T: serde::de::DeserializeOwned>(response: axum::response::Response) -> T {
    let bytes = response.into_body().collect().await.unwrap().to_bytes();
    serde_json::from_slice(&bytes).unwrap()
}

async fn body_bytes(response: axum::response::Response) -> bytes::Bytes {
    response.into_body().collect().await.unwrap().to_bytes()
}

fn json_request(method: &str, uri: &str, body: &str) -> Request<String> {
    Request::builder()
        .method(method)
        .uri(uri)
        .header(http::header::CONTENT_TYPE, "application/json")
        .body(body.to_string())
        .unwrap()
}

fn empty_request(method: &str, uri: &str) -> Request<String> {
    Request::builder().method(method).uri(uri).body(String::new()).unwrap()
}

async fn send(app: &mut RouterIntoService<String>, request: Request<String>) -> axum::response::Response {
    ServiceExt::ready(app).await.unwrap().call(request).await.unwrap()
}

async fn signed_in(app: &mut RouterIntoService<String>) {
    let resp = send(
        app,
        json_request(
            "POST",
            "/register",
            r#"{"name":"Ada","email":"ada@example.com","password":"pw"}"#,
        ),
    )
    .await;
    assert_eq!(resp.status(), StatusCode::CREATED);
    let resp = send(
        app,
        json_request("POST", "/login", r#"{"email":"ada@example.com","password":"pw"}"#),
    )
    .await;
    assert_eq!(resp.status(), StatusCode::OK);
}

// --- accounts ---

#[tokio::test]
async fn login_unknown_user_returns_401() {
    let resp = app()
        .oneshot(json_request("POST", "/login", r#"{"email":"x@example.com","password":"pw"}"#))
        .await
        .unwrap();

    assert_eq!(resp.status(), StatusCode::UNAUTHORIZED);
    let msg: Message = body_json(resp).await;
    assert_eq!(msg.message, "Invalid email or password");
}

#[tokio::test]
async fn register_twice_returns_409() {
    let mut app = app().into_service();
    let body = r#"{"name":"Ada","email":"ada@example.com","password":"pw"}"#;
    assert_eq!(send(&mut app, json_request("POST", "/register", body)).await.status(), StatusCode::CREATED);

    let resp = send(&mut app, json_request("POST", "/register", body)).await;
    assert_eq!(resp.status(), StatusCode::CONFLICT);
}

#[tokio::test]
async fn login_returns_user_without_password() {
    let mut app = app().into_service();
    signed_in(&mut app).await;
    let resp = send(
        &mut app,
        json_request("POST", "/login", r#"{"email":"ada@example.com","password":"pw"}"#),
    )
    .await;
    let json: serde_json::Value = body_json(resp).await;
    assert_eq!(json["name"], "Ada");
    assert!(json.get("password").is_none());
}

#[tokio::test]
async fn register_missing_field_returns_422() {
    let resp = app()
        .oneshot(json_request("POST", "/register", r#"{"name":"Ada"}"#))
        .await
        .unwrap();

    assert_eq!(resp.status(), StatusCode::UNPROCESSABLE_ENTITY);
    assert!(!body_bytes(resp).await.is_empty());
}

// --- lists ---

#[tokio::test]
async fn lists_empty() {
    let resp = app().oneshot(empty_request("GET", "/shopping_lists/all")).await.unwrap();

    assert_eq!(resp.status(), StatusCode::OK);
    let lists: Vec<ShoppingList> = body_json(resp).await;
    assert!(lists.is_empty());
}

#[tokio::test]
async fn update_missing_list_returns_404() {
    let resp = app()
        .oneshot(json_request(
            "PUT",
            "/shopping_list/99",
            r#"{"name":"Nope","description":"","currency":"$"}"#,
        ))
        .await
        .unwrap();

    assert_eq!(resp.status(), StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn created_list_is_owned_by_last_login() {
    let mut app = app().into_service();
    signed_in(&mut app).await;

    let resp = send(
        &mut app,
        json_request("POST", "/shopping_list", r#"{"name":"Weekly","description":"d","currency":"€"}"#),
    )
    .await;
    assert_eq!(resp.status(), StatusCode::CREATED);

    let lists: Vec<ShoppingList> = body_json(send(&mut app, empty_request("GET", "/shopping_lists/all")).await).await;
    assert_eq!(lists.len(), 1);
    assert_eq!(lists[0].currency, "€");
    assert_eq!(lists[0].user_id, Some(1));
}

// --- shares ---

#[tokio::test]
async fn share_with_unknown_email_returns_404() {
    let mut app = app().into_service();
    send(&mut app, json_request("POST", "/shopping_list", r#"{"name":"Weekly"}"#)).await;

    let resp = send(
        &mut app,
        json_request("POST", "/list_share", r#"{"email":"ghost@example.com","shopping_list_id":1}"#),
    )
    .await;
    assert_eq!(resp.status(), StatusCode::NOT_FOUND);
    let msg: Message = body_json(resp).await;
    assert_eq!(msg.message, "User not found");
}

#[tokio::test]
async fn share_and_unshare() {
    let mut app = app().into_service();
    signed_in(&mut app).await;
    send(&mut app, json_request("POST", "/shopping_list", r#"{"name":"Weekly"}"#)).await;
    let share = r#"{"email":"ada@example.com","shopping_list_id":2}"#;

    assert_eq!(send(&mut app, json_request("POST", "/list_share", share)).await.status(), StatusCode::OK);
    assert_eq!(
        send(&mut app, json_request("POST", "/list_share", share)).await.status(),
        StatusCode::CONFLICT
    );

    let users: Vec<User> = body_json(send(&mut app, empty_request("GET", "/list_share/2")).await).await;
    assert_eq!(users.len(), 1);
    assert_eq!(users[0].email, "ada@example.com");

    let resp = send(&mut app, empty_request("DELETE", "/list_share/2/1")).await;
    assert_eq!(resp.status(), StatusCode::OK);
    let users: Vec<User> = body_json(send(&mut app, empty_request("GET", "/list_share/2")).await).await;
    assert!(users.is_empty());
}

// --- items ---

#[tokio::test]
async fn item_lifecycle() {
    let mut app = app().into_service();
    send(&mut app, json_request("POST", "/shopping_list", r#"{"name":"Weekly"}"#)).await;

    let resp = send(
        &mut app,
        json_request("POST", "/item", r#"{"name":"Milk","description":"","shopping_list_id":1}"#),
    )
    .await;
    assert_eq!(resp.status(), StatusCode::CREATED);

    let resp = send(&mut app, json_request("PUT", "/item/2", r#"{"description":"2 litres"}"#)).await;
    assert_eq!(resp.status(), StatusCode::OK);

    let items: Vec<Item> = body_json(send(&mut app, empty_request("GET", "/items/1")).await).await;
    assert_eq!(items.len(), 1);
    assert_eq!(items[0].name, "Milk");
    assert_eq!(items[0].description, "2 litres");

    assert_eq!(send(&mut app, empty_request("DELETE", "/item/2")).await.status(), StatusCode::OK);
    assert_eq!(send(&mut app, empty_request("DELETE", "/item/2")).await.status(), StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn item_for_missing_list_returns_404() {
    let resp = app()
        .oneshot(json_request("POST", "/item", r#"{"name":"Milk","shopping_list_id":9}"#))
        .await
        .unwrap();
    assert_eq!(resp.status(), StatusCode::NOT_FOUND);
}

// --- bills ---

#[tokio::test]
async fn bill_with_zulu_date_returns_400() {
    let mut app = app().into_service();
    send(&mut app, json_request("POST", "/shopping_list", r#"{"name":"Weekly"}"#)).await;

    let resp = send(
        &mut app,
        json_request(
            "POST",
            "/bill",
            r#"{"name":"Shop","date":"2025-01-09T10:00:00Z","amount":10.0,"shopping_list_id":1}"#,
        ),
    )
    .await;
    assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
    let msg: Message = body_json(resp).await;
    assert_eq!(msg.message, "Invalid date format");
}

#[tokio::test]
async fn bills_and_summary() {
    let mut app = app().into_service();
    signed_in(&mut app).await;
    send(&mut app, json_request("POST", "/shopping_list", r#"{"name":"Weekly"}"#)).await;

    for (name, amount) in [("Shop", 30.0), ("Market", 10.0)] {
        let body = format!(
            r#"{{"name":"{name}","date":"2025-01-09T10:00:00+00:00","amount":{amount},"shopping_list_id":2}}"#
        );
        let resp = send(&mut app, json_request("POST", "/bill", &body)).await;
        assert_eq!(resp.status(), StatusCode::CREATED);
    }

    let bills: serde_json::Value = body_json(send(&mut app, empty_request("GET", "/bills/2")).await).await;
    assert_eq!(bills.as_array().unwrap().len(), 2);
    assert_eq!(bills[0]["date"], "2025-01-09T10:00:00");
    assert_eq!(bills[0]["user_name"], "Ada");

    let summary: Vec<Summary> = body_json(send(&mut app, empty_request("GET", "/bill/summary/2")).await).await;
    assert_eq!(summary.len(), 1);
    assert_eq!(summary[0].user, "Ada");
    assert_eq!(summary[0].amount, 40.0);
    assert_eq!(summary[0].percent, 100.0);
}

#[tokio::test]
async fn deleting_list_drops_its_items() {
    let mut app = app().into_service();
    send(&mut app, json_request("POST", "/shopping_list", r#"{"name":"Weekly"}"#)).await;
    send(
        &mut app,
        json_request("POST", "/item", r#"{"name":"Milk","shopping_list_id":1}"#),
    )
    .await;

    assert_eq!(send(&mut app, empty_request("DELETE", "/shopping_list/1")).await.status(), StatusCode::OK);
    let items: Vec<Item> = body_json(send(&mut app, empty_request("GET", "/items/1")).await).await;
    assert!(items.is_empty());
    assert_eq!(
        send(&mut app, empty_request("DELETE", "/shopping_list/1")).await.status(),
        StatusCode::NOT_FOUND
    );
}
