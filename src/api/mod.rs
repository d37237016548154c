//! HTTP client for the library backend.
//!
//! Every request carries the persisted credential token as a bearer header
//! when one exists. Non-success responses become `AppError::Request` with the
//! backend's `detail` extracted when present.

pub mod models;

use std::sync::Arc;

use reqwest::{Method, RequestBuilder, Response, Url};
use serde::de::DeserializeOwned;
use serde::Serialize;
use tracing::debug;

use crate::error::{AppError, AppResult};
use crate::identity::TokenStorage;

pub use models::{
    BookDetail, BookSummary, LoginRequest, NewBook, NewOrder, Order, OrderStatus, OrderType, Paged,
    PopularBook, SignupRequest, TokenResponse,
};

#[derive(Clone)]
pub struct ApiClient {
    base: Url,
    client: reqwest::Client,
    tokens: Arc<dyn TokenStorage>,
}

impl std::fmt::Debug for ApiClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ApiClient").field("base", &self.base.as_str()).finish()
    }
}

impl ApiClient {
    pub fn new(base: Url, tokens: Arc<dyn TokenStorage>) -> AppResult<Self> {
        let client = reqwest::Client::builder().build()?;
        Ok(Self { base, client, tokens })
    }

    pub fn base(&self) -> &Url { &self.base }

    fn url(&self, path: &str) -> AppResult<Url> {
        // Keep any path prefix of the base (e.g. http://host/api/)
        let mut base = self.base.clone();
        if !base.path().ends_with('/') {
            let p = format!("{}/", base.path());
            base.set_path(&p);
        }
        base.join(path.trim_start_matches('/'))
            .map_err(|e| AppError::Config { code: "bad_url".into(), message: format!("{}: {}", path, e) })
    }

    fn request(&self, method: Method, path: &str) -> AppResult<RequestBuilder> {
        let url = self.url(path)?;
        let mut rb = self.client.request(method, url);
        // A storage read failure only means no bearer header
        if let Ok(Some(token)) = self.tokens.load() {
            rb = rb.bearer_auth(token);
        }
        Ok(rb)
    }

    async fn send(&self, rb: RequestBuilder) -> AppResult<Response> {
        let resp = rb.send().await?;
        let status = resp.status();
        debug!(target: "libris::api", status = status.as_u16(), url = %resp.url(), "response");
        if status.is_success() {
            return Ok(resp);
        }
        let body: serde_json::Value = resp.json().await.unwrap_or(serde_json::Value::Null);
        Err(AppError::request(status.as_u16(), error_detail(&body)))
    }

    async fn get_json<T: DeserializeOwned>(&self, path: &str, query: &[(&str, String)]) -> AppResult<T> {
        let rb = self.request(Method::GET, path)?.query(query);
        Ok(self.send(rb).await?.json::<T>().await?)
    }

    async fn send_json<B: Serialize>(&self, method: Method, path: &str, body: &B) -> AppResult<Response> {
        let rb = self.request(method, path)?.json(body);
        self.send(rb).await
    }

    // --- accounts ---

    pub async fn signup(&self, req: &SignupRequest) -> AppResult<TokenResponse> {
        Ok(self.send_json(Method::POST, "/users/signup", req).await?.json().await?)
    }

    pub async fn login(&self, req: &LoginRequest) -> AppResult<TokenResponse> {
        Ok(self.send_json(Method::POST, "/users/login", req).await?.json().await?)
    }

    pub async fn logout(&self) -> AppResult<()> {
        let rb = self.request(Method::POST, "/users/logout")?;
        self.send(rb).await?;
        Ok(())
    }

    // --- books ---

    pub async fn books(&self, limit: u32, offset: u32) -> AppResult<Paged<BookSummary>> {
        let page: models::BooksPage = self.get_json("/books", &paging(limit, offset)).await?;
        Ok(Paged { items: page.books, has_next: page.has_next })
    }

    pub async fn most_borrowed(&self) -> AppResult<Vec<PopularBook>> {
        self.get_json("/books/most-borrowed", &[]).await
    }

    pub async fn book(&self, id: &str) -> AppResult<BookDetail> {
        self.get_json(&format!("/books/{}", urlencoding::encode(id)), &[]).await
    }

    pub async fn add_book(&self, book: &NewBook) -> AppResult<()> {
        self.send_json(Method::POST, "/books", book).await?;
        Ok(())
    }

    // --- orders ---

    /// All active orders, or only those of `username` when a filter is given.
    pub async fn orders(&self, username: Option<&str>, limit: u32, offset: u32) -> AppResult<Paged<Order>> {
        let path = match username.map(str::trim).filter(|s| !s.is_empty()) {
            Some(u) => format!("/orders/{}", urlencoding::encode(u)),
            None => "/orders".to_string(),
        };
        let page: models::OrdersPage = self.get_json(&path, &paging(limit, offset)).await?;
        Ok(Paged { items: page.orders, has_next: page.has_next })
    }

    pub async fn my_orders(&self, limit: u32, offset: u32) -> AppResult<Paged<Order>> {
        let page: models::OrdersPage = self.get_json("/orders/my_orders", &paging(limit, offset)).await?;
        Ok(Paged { items: page.orders, has_next: page.has_next })
    }

    pub async fn place_order(&self, order: &NewOrder) -> AppResult<()> {
        self.send_json(Method::POST, "/orders", order).await?;
        Ok(())
    }

    pub async fn complete_order(&self, order_id: &str) -> AppResult<()> {
        let path = format!("/orders/{}", urlencoding::encode(order_id));
        let rb = self.request(Method::PUT, &path)?.query(&[("status", "completed")]);
        self.send(rb).await?;
        Ok(())
    }
}

fn paging(limit: u32, offset: u32) -> [(&'static str, String); 2] {
    [("limit", limit.to_string()), ("offset", offset.to_string())]
}

/// Pull a displayable message out of a backend error body.
///
/// FastAPI sends either `{"detail": "text"}` or, for schema validation,
/// `{"detail": [{"msg": "text", ...}, ...]}`.
pub fn error_detail(body: &serde_json::Value) -> Option<String> {
    match body.get("detail")? {
        serde_json::Value::String(s) => Some(s.clone()),
        serde_json::Value::Array(items) => items
            .first()
            .and_then(|d| d.get("msg"))
            .and_then(|m| m.as_str())
            .map(str::to_string),
        _ => None,
    }
}
