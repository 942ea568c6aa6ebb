//! The single chokepoint between the reconcilers and the remote service.
//!
//! # Design
//! `Gateway` pairs an `ApiClient` (pure build/parse) with a shared
//! `Transport`. It holds no mutable state, so clones are cheap and can be moved
//! into spawned tasks for concurrent fan-out. Each method resolves exactly once
//! with either a decoded value and status, or an `ApiError`; it never retries.

use std::sync::Arc;

use serde::de::DeserializeOwned;

use crate::client::{ApiClient, ApiResult};
use crate::config::Config;
use crate::error::ApiError;
use crate::http::{HttpMethod, HttpRequest, Transport};
use crate::transport::UreqTransport;
use crate::types::{
    Bill, BillCreate, BillSummary, ItemUpdate, ListShareCreate, LoginData, Message, ShoppingItem, ShoppingList, User,
};

#[derive(Clone)]
pub struct Gateway {
    client: ApiClient,
    transport: Arc<dyn Transport>,
}

impl Gateway {
    pub fn new(base_url: &str, transport: Arc<dyn Transport>) -> Self {
        Self {
            client: ApiClient::new(base_url),
            transport,
        }
    }

    /// Gateway over the default `ureq` transport.
    pub fn from_config(config: &Config) -> Self {
        Self::new(&config.base_url, Arc::new(UreqTransport::new()))
    }

    pub fn client(&self) -> &ApiClient {
        &self.client
    }

    /// Issue a request and decode the body as `T`, independent of status.
    pub async fn request<T: DeserializeOwned>(
        &self,
        endpoint: &str,
        method: HttpMethod,
        body: Option<String>,
        headers: &[(String, String)],
    ) -> ApiResult<T> {
        let request = self.client.build(endpoint, method, body, headers)?;
        self.send(request).await
    }

    /// `request` specialised to endpoints answering with a `Message`.
    pub async fn request_message(
        &self,
        endpoint: &str,
        method: HttpMethod,
        body: Option<String>,
        headers: &[(String, String)],
    ) -> ApiResult<Message> {
        self.request(endpoint, method, body, headers).await
    }

    /// Issue a request and report only the status code; the body is ignored.
    pub async fn request_status_only(
        &self,
        endpoint: &str,
        method: HttpMethod,
        body: Option<String>,
        headers: &[(String, String)],
    ) -> Result<u16, ApiError> {
        let request = self.client.build(endpoint, method, body, headers)?;
        self.send_status_only(request).await
    }

    async fn send<T: DeserializeOwned>(&self, request: HttpRequest) -> ApiResult<T> {
        let (method, path) = (request.method, request.path.clone());
        let response = self.transport.execute(request).await.inspect_err(|e| {
            tracing::debug!("{} {path} failed: {e}", method.as_str());
        })?;
        tracing::debug!("{} {path} -> {}", method.as_str(), response.status);
        self.client.parse(response)
    }

    async fn send_status_only(&self, request: HttpRequest) -> Result<u16, ApiError> {
        let (method, path) = (request.method, request.path.clone());
        let response = self.transport.execute(request).await.inspect_err(|e| {
            tracing::debug!("{} {path} failed: {e}", method.as_str());
        })?;
        tracing::debug!("{} {path} -> {}", method.as_str(), response.status);
        Ok(response.status)
    }

    pub async fn login(&self, input: &LoginData) -> ApiResult<User> {
        self.send(self.client.build_login(input)?).await
    }

    pub async fn register(&self, user: &User) -> ApiResult<Message> {
        self.send(self.client.build_register(user)?).await
    }

    pub async fn fetch_lists(&self) -> ApiResult<Vec<ShoppingList>> {
        self.send(self.client.build_fetch_lists()?).await
    }

    pub async fn create_list(&self, list: &ShoppingList) -> ApiResult<Message> {
        self.send(self.client.build_create_list(list)?).await
    }

    pub async fn update_list(&self, id: i64, list: &ShoppingList) -> ApiResult<Message> {
        self.send(self.client.build_update_list(id, list)?).await
    }

    pub async fn delete_list(&self, id: i64) -> ApiResult<Message> {
        self.send(self.client.build_delete_list(id)?).await
    }

    pub async fn fetch_shares(&self, list_id: i64) -> ApiResult<Vec<User>> {
        self.send(self.client.build_fetch_shares(list_id)?).await
    }

    pub async fn add_share(&self, input: &ListShareCreate) -> ApiResult<Message> {
        self.send(self.client.build_add_share(input)?).await
    }

    pub async fn remove_share(&self, list_id: i64, user_id: i64) -> ApiResult<Message> {
        self.send(self.client.build_remove_share(list_id, user_id)?).await
    }

    pub async fn fetch_items(&self, list_id: i64) -> ApiResult<Vec<ShoppingItem>> {
        self.send(self.client.build_fetch_items(list_id)?).await
    }

    pub async fn create_item(&self, item: &ShoppingItem) -> ApiResult<Message> {
        self.send(self.client.build_create_item(item)?).await
    }

    pub async fn update_item(&self, id: i64, input: &ItemUpdate) -> ApiResult<Message> {
        self.send(self.client.build_update_item(id, input)?).await
    }

    /// Status-only: item deletion is classified purely by status code.
    pub async fn delete_item(&self, id: i64) -> Result<u16, ApiError> {
        self.send_status_only(self.client.build_delete_item(id)?).await
    }

    pub async fn fetch_bills(&self, list_id: i64) -> ApiResult<Vec<Bill>> {
        self.send(self.client.build_fetch_bills(list_id)?).await
    }

    pub async fn create_bill(&self, input: &BillCreate) -> ApiResult<Message> {
        self.send(self.client.build_create_bill(input)?).await
    }

    pub async fn fetch_summary(&self, list_id: i64) -> ApiResult<Vec<BillSummary>> {
        self.send(self.client.build_fetch_summary(list_id)?).await
    }
}

impl std::fmt::Debug for Gateway {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Gateway").field("base_url", &self.client.base_url()).finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::client::ApiResponse;
    use crate::testing::{gateway, ScriptedTransport};

    #[tokio::test]
    async fn request_decodes_regardless_of_status() {
        let transport = ScriptedTransport::new();
        transport.respond(HttpMethod::Post, "list_share", 404, r#"{"message":"User not found"}"#);
        let res = gateway(&transport)
            .request_message("list_share", HttpMethod::Post, Some("{}".to_string()), &[])
            .await
            .unwrap();
        assert_eq!(res.status, 404);
        assert_eq!(res.data.message, "User not found");
    }

    #[tokio::test]
    async fn transport_failure_is_unknown() {
        let transport = ScriptedTransport::new();
        transport.fail(HttpMethod::Get, "shopping_lists/all", "connection refused");
        let err = gateway(&transport).fetch_lists().await.unwrap_err();
        assert_eq!(err, ApiError::Unknown("connection refused".to_string()));
    }

    #[tokio::test]
    async fn shape_mismatch_is_decoding_failure() {
        let transport = ScriptedTransport::new();
        transport.respond(HttpMethod::Get, "items/3", 500, r#"{"message":"boom"}"#);
        let err = gateway(&transport).fetch_items(3).await.unwrap_err();
        assert!(matches!(err, ApiError::DecodingFailed(_)));
    }

    #[tokio::test]
    async fn status_only_ignores_body() {
        let transport = ScriptedTransport::new();
        transport.respond(HttpMethod::Delete, "item/8", 200, "not json at all");
        let status = gateway(&transport).delete_item(8).await.unwrap();
        assert_eq!(status, 200);
    }

    #[tokio::test]
    async fn request_status_only_reports_rejection_without_decoding() {
        let transport = ScriptedTransport::new();
        transport.respond(HttpMethod::Delete, "list_share/7/4", 404, "<html>Not Found</html>");
        let status = gateway(&transport)
            .request_status_only("list_share/7/4", HttpMethod::Delete, None, &[])
            .await
            .unwrap();
        assert_eq!(status, 404);
        assert_eq!(transport.calls(), vec!["DELETE list_share/7/4"]);
    }

    #[tokio::test]
    async fn request_status_only_surfaces_transport_failure() {
        let transport = ScriptedTransport::new();
        transport.fail(HttpMethod::Put, "item/2", "connection reset");
        let err = gateway(&transport)
            .request_status_only("item/2", HttpMethod::Put, Some("{}".to_string()), &[])
            .await
            .unwrap_err();
        assert_eq!(err, ApiError::Unknown("connection reset".to_string()));
    }

    #[tokio::test]
    async fn request_status_only_rejects_bad_endpoint_before_sending() {
        let transport = ScriptedTransport::new();
        let err = gateway(&transport)
            .request_status_only("", HttpMethod::Get, None, &[])
            .await
            .unwrap_err();
        assert!(matches!(err, ApiError::InvalidEndpoint(_)));
        assert!(transport.requests().is_empty());
    }

    #[test]
    fn default_config_points_at_production() {
        let gateway = Gateway::from_config(&Config::default());
        assert_eq!(gateway.client().base_url(), "https://listsplit.rsh-cnc.eu");
    }

    #[tokio::test]
    async fn caller_headers_reach_transport() {
        let transport = ScriptedTransport::new();
        transport.respond(HttpMethod::Get, "items/1", 200, "[]");
        let headers = vec![("x-client".to_string(), "test".to_string())];
        let res: ApiResponse<Vec<ShoppingItem>> = gateway(&transport)
            .request("items/1", HttpMethod::Get, None, &headers)
            .await
            .unwrap();
        assert!(res.data.is_empty());
        let sent = transport.requests();
        assert!(sent[0].headers.contains(&headers[0]));
        assert_eq!(sent[0].headers[0].0, "content-type");
    }
}
