//! In-process stand-in for the library backend, plus token helpers.
#![allow(dead_code)]

use std::collections::HashMap;
use std::net::SocketAddr;
use std::sync::Arc;

use axum::extract::{Path, Query, State};
use axum::http::{header::AUTHORIZATION, HeaderMap, StatusCode};
use axum::routing::{get, post};
use axum::{Json, Router};
use base64::engine::general_purpose::URL_SAFE_NO_PAD;
use base64::Engine;
use parking_lot::Mutex;
use reqwest::Url;
use serde_json::{json, Value};
use uuid::Uuid;

use libris::api::ApiClient;
use libris::config::ClientConfig;
use libris::identity::{SessionStore, TokenStorage};

pub const PASSWORD: &str = "correct-horse";
pub const TOTAL_BOOKS: u128 = 12;

pub fn book_id(n: u128) -> Uuid { Uuid::from_u128(n) }
pub fn order_id(n: u128) -> Uuid { Uuid::from_u128(1000 + n) }

/// Unsigned JWT with the given claims.
pub fn jwt(claims: &Value) -> String {
    let header = URL_SAFE_NO_PAD.encode(br#"{"alg":"HS256","typ":"JWT"}"#);
    let payload = URL_SAFE_NO_PAD.encode(claims.to_string());
    format!("{}.{}.c2ln", header, payload)
}

pub fn token_for(username: &str, role: &str) -> String {
    jwt(&json!({"username": username, "role": role, "exp": 4_102_444_800i64}))
}

fn role_of(username: &str) -> &'static str {
    if username == "amy" { "librarian" } else { "reader" }
}

#[derive(Debug, Clone)]
pub struct Hit {
    pub method: &'static str,
    pub path: String,
    pub bearer: Option<String>,
    pub query: HashMap<String, String>,
    pub body: Value,
}

#[derive(Default)]
pub struct Knobs {
    pub logout_fails: bool,
    pub books_fail: bool,
}

#[derive(Default)]
pub struct Inner {
    pub hits: Mutex<Vec<Hit>>,
    pub knobs: Mutex<Knobs>,
}

impl Inner {
    fn note(&self, method: &'static str, path: String, headers: &HeaderMap, query: HashMap<String, String>, body: Value) {
        let bearer = headers
            .get(AUTHORIZATION)
            .and_then(|v| v.to_str().ok())
            .and_then(|v| v.strip_prefix("Bearer "))
            .map(str::to_string);
        self.hits.lock().push(Hit { method, path, bearer, query, body });
    }
}

type Mock = Arc<Inner>;
type Reply = (StatusCode, Json<Value>);

pub struct MockBackend {
    pub addr: SocketAddr,
    pub inner: Mock,
}

impl MockBackend {
    pub async fn start() -> anyhow::Result<Self> {
        let inner: Mock = Arc::new(Inner::default());
        let app = Router::new()
            .route("/users/login", post(login))
            .route("/users/signup", post(signup))
            .route("/users/logout", post(logout))
            .route("/books", get(list_books).post(add_book))
            .route("/books/most-borrowed", get(most_borrowed))
            .route("/books/{id}", get(book_detail))
            .route("/orders", get(all_orders).post(place_order))
            .route("/orders/my_orders", get(my_orders))
            .route("/orders/{key}", get(user_orders).put(complete_order))
            .with_state(inner.clone());
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await?;
        let addr = listener.local_addr()?;
        tokio::spawn(async move {
            let _ = axum::serve(listener, app).await;
        });
        Ok(Self { addr, inner })
    }

    pub fn url(&self) -> Url {
        Url::parse(&format!("http://{}", self.addr)).expect("mock url")
    }

    pub fn session(&self, tokens: Arc<dyn TokenStorage>) -> SessionStore {
        let api = ApiClient::new(self.url(), tokens.clone()).expect("api client");
        SessionStore::new(api, tokens)
    }

    pub fn config(&self) -> ClientConfig {
        ClientConfig::new(self.url(), std::path::PathBuf::from("unused-token-file"))
    }

    pub fn hits(&self) -> Vec<Hit> { self.inner.hits.lock().clone() }

    pub fn hits_to(&self, method: &str, path: &str) -> Vec<Hit> {
        self.hits().into_iter().filter(|h| h.method == method && h.path == path).collect()
    }

    pub fn set_logout_fails(&self, v: bool) { self.inner.knobs.lock().logout_fails = v; }

    pub fn set_books_fail(&self, v: bool) { self.inner.knobs.lock().books_fail = v; }
}

fn ok(v: Value) -> Reply { (StatusCode::OK, Json(v)) }

fn fail(status: StatusCode, detail: &str) -> Reply { (status, Json(json!({"detail": detail}))) }

async fn login(State(m): State<Mock>, headers: HeaderMap, Json(body): Json<Value>) -> Reply {
    m.note("POST", "/users/login".into(), &headers, HashMap::new(), body.clone());
    let user = body["username"].as_str().unwrap_or_default().to_string();
    if body["password_hash"].as_str() != Some(PASSWORD) {
        return fail(StatusCode::UNAUTHORIZED, "Invalid username or password");
    }
    if user == "broken" {
        return ok(json!({"access_token": "not-a-jwt", "token_type": "bearer"}));
    }
    ok(json!({"access_token": token_for(&user, role_of(&user)), "token_type": "bearer"}))
}

async fn signup(State(m): State<Mock>, headers: HeaderMap, Json(body): Json<Value>) -> Reply {
    m.note("POST", "/users/signup".into(), &headers, HashMap::new(), body.clone());
    let user = body["username"].as_str().unwrap_or_default().to_string();
    if user == "taken" {
        return fail(StatusCode::BAD_REQUEST, "Username already exists");
    }
    let role = body["role"].as_str().unwrap_or("reader").to_string();
    ok(json!({"access_token": token_for(&user, &role), "token_type": "bearer"}))
}

async fn logout(State(m): State<Mock>, headers: HeaderMap) -> Reply {
    m.note("POST", "/users/logout".into(), &headers, HashMap::new(), Value::Null);
    if m.knobs.lock().logout_fails {
        return (StatusCode::INTERNAL_SERVER_ERROR, Json(json!({})));
    }
    ok(json!({"message": "Logged out"}))
}

fn book_json(n: u128) -> Value {
    json!({
        "book_id": book_id(n),
        "title": format!("Book {}", n),
        "author": format!("Author {}", n),
        "isbn": format!("97800000000{:02}", n),
        "publication_year": 1990,
        "description": format!("Description of book {}", n),
    })
}

async fn list_books(State(m): State<Mock>, headers: HeaderMap, Query(q): Query<HashMap<String, String>>) -> Reply {
    m.note("GET", "/books".into(), &headers, q.clone(), Value::Null);
    if m.knobs.lock().books_fail {
        return (StatusCode::INTERNAL_SERVER_ERROR, Json(json!({})));
    }
    let limit: u128 = q.get("limit").and_then(|v| v.parse().ok()).unwrap_or(9);
    let offset: u128 = q.get("offset").and_then(|v| v.parse().ok()).unwrap_or(0);
    let books: Vec<Value> = (offset + 1..=TOTAL_BOOKS).take(limit as usize).map(book_json).collect();
    ok(json!({"books": books, "has_next": offset + limit < TOTAL_BOOKS}))
}

async fn add_book(State(m): State<Mock>, headers: HeaderMap, Json(body): Json<Value>) -> Reply {
    m.note("POST", "/books".into(), &headers, HashMap::new(), body);
    (StatusCode::CREATED, Json(json!({"message": "Book added"})))
}

async fn most_borrowed(State(m): State<Mock>, headers: HeaderMap) -> Reply {
    m.note("GET", "/books/most-borrowed".into(), &headers, HashMap::new(), Value::Null);
    ok(json!([
        {"book_id": book_id(3), "title": "Book 3", "author": "Author 3", "recent_orders": 7},
        {"book_id": book_id(1), "title": "Book 1", "author": "Author 1", "recent_orders": 4},
    ]))
}

async fn book_detail(State(m): State<Mock>, headers: HeaderMap, Path(id): Path<String>) -> Reply {
    m.note("GET", format!("/books/{}", id), &headers, HashMap::new(), Value::Null);
    let n = match Uuid::parse_str(&id) {
        Ok(u) if (1..=TOTAL_BOOKS).contains(&u.as_u128()) => u.as_u128(),
        _ => return fail(StatusCode::NOT_FOUND, "Book not found"),
    };
    let mut v = book_json(n);
    // Book 2 is fully lent out
    v["available_copies"] = json!(if n == 2 { 0 } else { 3 });
    ok(v)
}

fn order_json(n: u128, username: &str) -> Value {
    json!({
        "order_id": order_id(n),
        "username": username,
        "book_title": format!("Book {}", n),
        "order_type": "borrow",
        "order_date": "2024-03-01T10:00:00",
        "due_date": "2024-03-08T10:00:00",
        "status": "pending",
    })
}

async fn all_orders(State(m): State<Mock>, headers: HeaderMap, Query(q): Query<HashMap<String, String>>) -> Reply {
    m.note("GET", "/orders".into(), &headers, q, Value::Null);
    ok(json!({"orders": [order_json(1, "bob"), order_json(2, "carol")], "has_next": false}))
}

async fn place_order(State(m): State<Mock>, headers: HeaderMap, Json(body): Json<Value>) -> Reply {
    m.note("POST", "/orders".into(), &headers, HashMap::new(), body);
    (StatusCode::CREATED, Json(json!({"message": "Order placed"})))
}

async fn my_orders(State(m): State<Mock>, headers: HeaderMap, Query(q): Query<HashMap<String, String>>) -> Reply {
    m.note("GET", "/orders/my_orders".into(), &headers, q, Value::Null);
    ok(json!({"orders": [order_json(3, "bob")], "has_next": false}))
}

async fn user_orders(State(m): State<Mock>, headers: HeaderMap, Path(key): Path<String>, Query(q): Query<HashMap<String, String>>) -> Reply {
    m.note("GET", format!("/orders/{}", key), &headers, q, Value::Null);
    let orders: Vec<Value> = match key.as_str() {
        "bob" => vec![order_json(1, "bob")],
        _ => Vec::new(),
    };
    ok(json!({"orders": orders, "has_next": false}))
}

async fn complete_order(State(m): State<Mock>, headers: HeaderMap, Path(key): Path<String>, Query(q): Query<HashMap<String, String>>) -> Reply {
    m.note("PUT", format!("/orders/{}", key), &headers, q, Value::Null);
    if Uuid::parse_str(&key).is_err() {
        return fail(StatusCode::NOT_FOUND, "Order not found");
    }
    ok(json!({"message": "Order updated"}))
}
