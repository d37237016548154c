//! Static path table. Maps a location (path plus optional query string) to a
//! page and the gate that guards it. Holds no state.

use std::fmt::{Display, Formatter};

use crate::identity::{Gate, Role};

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Route {
    Home,
    Login,
    Signup,
    Books,
    PopularBooks,
    BookDetail { id: String },
    AddBook,
    Orders,
    MyOrders,
    MakeOrder { book_id: Option<String> },
    Missing { path: String },
}

impl Route {
    pub fn resolve(location: &str) -> Route {
        let location = location.trim();
        let (path, query) = match location.split_once('?') {
            Some((p, q)) => (p, Some(q)),
            None => (location, None),
        };
        let segments: Vec<&str> = path.split('/').filter(|s| !s.is_empty()).collect();
        match segments.as_slice() {
            [] | ["home"] => Route::Home,
            ["login"] => Route::Login,
            ["signup"] => Route::Signup,
            ["books"] => Route::Books,
            ["books", "add"] => Route::AddBook,
            ["books", "popular"] => Route::PopularBooks,
            ["books", id] => Route::BookDetail { id: decode(id) },
            ["orders"] => Route::Orders,
            ["orders", "make_order"] => Route::MakeOrder {
                book_id: query.and_then(|q| query_param(q, "book_id")).filter(|s| !s.is_empty()),
            },
            ["my_orders"] => Route::MyOrders,
            _ => Route::Missing { path: location.to_string() },
        }
    }

    /// Gate guarding this route; `None` for public pages.
    pub fn gate(&self) -> Option<Gate> {
        match self {
            Route::Home | Route::Missing { .. } => None,
            Route::Login | Route::Signup => Some(Gate::GuestOnly),
            Route::Books | Route::PopularBooks | Route::BookDetail { .. } => Some(Gate::any_user()),
            Route::AddBook | Route::Orders => Some(Gate::role(Role::Librarian)),
            Route::MyOrders | Route::MakeOrder { .. } => Some(Gate::role(Role::Reader)),
        }
    }

    /// Canonical location for this route.
    pub fn path(&self) -> String {
        match self {
            Route::Home => "/home".into(),
            Route::Login => "/login".into(),
            Route::Signup => "/signup".into(),
            Route::Books => "/books".into(),
            Route::PopularBooks => "/books/popular".into(),
            Route::BookDetail { id } => format!("/books/{}", urlencoding::encode(id)),
            Route::AddBook => "/books/add".into(),
            Route::Orders => "/orders".into(),
            Route::MyOrders => "/my_orders".into(),
            Route::MakeOrder { book_id: Some(b) } => format!("/orders/make_order?book_id={}", urlencoding::encode(b)),
            Route::MakeOrder { book_id: None } => "/orders/make_order".into(),
            Route::Missing { path } => path.clone(),
        }
    }
}

impl Display for Route {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result { f.write_str(&self.path()) }
}

fn decode(s: &str) -> String {
    urlencoding::decode(s).map(|c| c.into_owned()).unwrap_or_else(|_| s.to_string())
}

fn query_param(query: &str, key: &str) -> Option<String> {
    query
        .split('&')
        .filter_map(|pair| pair.split_once('=').or(Some((pair, ""))))
        .find(|(k, _)| *k == key)
        .map(|(_, v)| decode(&v.replace('+', " ")))
}
