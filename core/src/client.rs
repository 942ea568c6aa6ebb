//! Stateless request builder and response decoder for the ListSplit API.
//!
//! # Design
//! `ApiClient` holds only the base address. Each endpoint of the service has a
//! `build_*` method producing an `HttpRequest`; decoding is generic over the
//! expected body type and independent of the status code, which is handed back
//! alongside the value. Executing the request is the job of a `Transport`.

use serde::de::DeserializeOwned;
use serde::Serialize;

use crate::error::ApiError;
use crate::http::{HttpMethod, HttpRequest, HttpResponse};
use crate::types::{BillCreate, ItemUpdate, ListShareCreate, LoginData, ShoppingItem, ShoppingList, User};

/// A decoded body together with the status code it arrived with.
#[derive(Debug, Clone, PartialEq)]
pub struct ApiResponse<T> {
    pub data: T,
    pub status: u16,
}

impl<T> ApiResponse<T> {
    pub fn is_status(&self, expected: u16) -> bool {
        self.status == expected
    }
}

pub type ApiResult<T> = Result<ApiResponse<T>, ApiError>;

#[derive(Debug, Clone)]
pub struct ApiClient {
    base_url: String,
}

impl ApiClient {
    pub fn new(base_url: &str) -> Self {
        Self {
            base_url: base_url.trim_end_matches('/').to_string(),
        }
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// Resolve `endpoint` against the base address.
    pub fn url(&self, endpoint: &str) -> Result<String, ApiError> {
        let has_scheme = self.base_url.starts_with("https://") || self.base_url.starts_with("http://");
        if !has_scheme || self.base_url.chars().any(char::is_whitespace) {
            return Err(ApiError::InvalidEndpoint(self.base_url.clone()));
        }
        let endpoint = endpoint.trim_start_matches('/');
        if endpoint.is_empty() || endpoint.contains("://") || endpoint.chars().any(char::is_whitespace) {
            return Err(ApiError::InvalidEndpoint(endpoint.to_string()));
        }
        Ok(format!("{}/{endpoint}", self.base_url))
    }

    /// Build a request with the JSON content type followed by `headers`.
    pub fn build(
        &self,
        endpoint: &str,
        method: HttpMethod,
        body: Option<String>,
        headers: &[(String, String)],
    ) -> Result<HttpRequest, ApiError> {
        let mut all_headers = vec![("content-type".to_string(), "application/json".to_string())];
        all_headers.extend(headers.iter().cloned());
        Ok(HttpRequest {
            method,
            path: self.url(endpoint)?,
            headers: all_headers,
            body,
        })
    }

    fn build_json<B: Serialize>(&self, endpoint: &str, method: HttpMethod, body: &B) -> Result<HttpRequest, ApiError> {
        let body = encode(body)?;
        self.build(endpoint, method, Some(body), &[])
    }

    pub fn build_login(&self, input: &LoginData) -> Result<HttpRequest, ApiError> {
        self.build_json("login", HttpMethod::Post, input)
    }

    pub fn build_register(&self, user: &User) -> Result<HttpRequest, ApiError> {
        self.build_json("register", HttpMethod::Post, user)
    }

    pub fn build_fetch_lists(&self) -> Result<HttpRequest, ApiError> {
        self.build("shopping_lists/all", HttpMethod::Get, None, &[])
    }

    pub fn build_create_list(&self, list: &ShoppingList) -> Result<HttpRequest, ApiError> {
        self.build_json("shopping_list", HttpMethod::Post, list)
    }

    pub fn build_update_list(&self, id: i64, list: &ShoppingList) -> Result<HttpRequest, ApiError> {
        self.build_json(&format!("shopping_list/{id}"), HttpMethod::Put, list)
    }

    pub fn build_delete_list(&self, id: i64) -> Result<HttpRequest, ApiError> {
        self.build(&format!("shopping_list/{id}"), HttpMethod::Delete, None, &[])
    }

    pub fn build_fetch_shares(&self, list_id: i64) -> Result<HttpRequest, ApiError> {
        self.build(&format!("list_share/{list_id}"), HttpMethod::Get, None, &[])
    }

    pub fn build_add_share(&self, input: &ListShareCreate) -> Result<HttpRequest, ApiError> {
        self.build_json("list_share", HttpMethod::Post, input)
    }

    pub fn build_remove_share(&self, list_id: i64, user_id: i64) -> Result<HttpRequest, ApiError> {
        self.build(&format!("list_share/{list_id}/{user_id}"), HttpMethod::Delete, None, &[])
    }

    pub fn build_fetch_items(&self, list_id: i64) -> Result<HttpRequest, ApiError> {
        self.build(&format!("items/{list_id}"), HttpMethod::Get, None, &[])
    }

    pub fn build_create_item(&self, item: &ShoppingItem) -> Result<HttpRequest, ApiError> {
        self.build_json("item", HttpMethod::Post, item)
    }

    pub fn build_update_item(&self, id: i64, input: &ItemUpdate) -> Result<HttpRequest, ApiError> {
        self.build_json(&format!("item/{id}"), HttpMethod::Put, input)
    }

    pub fn build_delete_item(&self, id: i64) -> Result<HttpRequest, ApiError> {
        self.build(&format!("item/{id}"), HttpMethod::Delete, None, &[])
    }

    pub fn build_fetch_bills(&self, list_id: i64) -> Result<HttpRequest, ApiError> {
        self.build(&format!("bills/{list_id}"), HttpMethod::Get, None, &[])
    }

    pub fn build_create_bill(&self, input: &BillCreate) -> Result<HttpRequest, ApiError> {
        self.build_json("bill", HttpMethod::Post, input)
    }

    pub fn build_fetch_summary(&self, list_id: i64) -> Result<HttpRequest, ApiError> {
        self.build(&format!("bill/summary/{list_id}"), HttpMethod::Get, None, &[])
    }

    /// Decode `response.body` as `T`, whatever the status code.
    pub fn parse<T: DeserializeOwned>(&self, response: HttpResponse) -> ApiResult<T> {
        let data = serde_json::from_str(&response.body).map_err(|e| ApiError::DecodingFailed(e.to_string()))?;
        Ok(ApiResponse {
            data,
            status: response.status,
        })
    }
}

/// Serialize a request body.
pub fn encode<B: Serialize>(body: &B) -> Result<String, ApiError> {
    serde_json::to_string(body).map_err(|e| ApiError::Unknown(format!("serialization failed: {e}")))
}
