//! Page components. Each page reads the session it is handed, fetches its own
//! data through the API client, and produces a `View` for the terminal.
//! Request failures never escape a page; they become an inline error block.

pub mod auth;
pub mod books;
pub mod home;
pub mod missing;
pub mod orders;

use chrono::{DateTime, Utc};
use uuid::Uuid;

use crate::api::ApiClient;
use crate::config::ClientConfig;
use crate::identity::SessionStore;
use crate::router::Route;

/// Everything a page may touch.
pub struct PageContext<'a> {
    pub session: &'a SessionStore,
    pub config: &'a ClientConfig,
}

impl<'a> PageContext<'a> {
    pub fn new(session: &'a SessionStore, config: &'a ClientConfig) -> Self { Self { session, config } }
    pub fn api(&self) -> &ApiClient { self.session.api() }
}

/// Per-visit page state; reset whenever the location changes.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PageState {
    /// 1-based page number for paginated listings.
    pub page: u32,
    /// Username filter on the librarian order list.
    pub search: String,
    /// Orders completed during this visit, hidden without refetching.
    pub dismissed: Vec<Uuid>,
    pub error: Option<String>,
    pub notice: Option<String>,
}

impl Default for PageState {
    fn default() -> Self {
        Self { page: 1, search: String::new(), dismissed: Vec::new(), error: None, notice: None }
    }
}

impl PageState {
    pub fn offset(&self, limit: u32) -> u32 { self.page.saturating_sub(1) * limit }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LinkTarget {
    Path(String),
    Command(String),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Link {
    pub label: String,
    pub target: LinkTarget,
}

impl Link {
    pub fn path<L: Into<String>, P: Into<String>>(label: L, path: P) -> Self { Self { label: label.into(), target: LinkTarget::Path(path.into()) } }
    pub fn command<L: Into<String>, C: Into<String>>(label: L, cmd: C) -> Self { Self { label: label.into(), target: LinkTarget::Command(cmd.into()) } }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Block {
    Text(String),
    Notice(String),
    Error(String),
    /// Field/value pairs (book details).
    Fields(Vec<(String, String)>),
    Table { columns: Vec<String>, rows: Vec<Vec<String>> },
    Links(Vec<Link>),
    Pager { page: u32, has_prev: bool, has_next: bool },
    /// Neutral content while the session is still hydrating.
    Placeholder(String),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct View {
    pub title: String,
    pub blocks: Vec<Block>,
}

impl View {
    pub fn new<S: Into<String>>(title: S) -> Self { Self { title: title.into(), blocks: Vec::new() } }

    pub fn with(mut self, block: Block) -> Self {
        self.blocks.push(block);
        self
    }

    pub fn push(&mut self, block: Block) { self.blocks.push(block); }

    pub fn placeholder() -> Self { View::new("Library Management System").with(Block::Placeholder("Loading...".into())) }

    pub fn is_placeholder(&self) -> bool { self.blocks.iter().any(|b| matches!(b, Block::Placeholder(_))) }

    pub fn error(&self) -> Option<&str> {
        self.blocks.iter().find_map(|b| match b {
            Block::Error(e) => Some(e.as_str()),
            _ => None,
        })
    }

    pub fn text_contains(&self, needle: &str) -> bool {
        self.blocks.iter().any(|b| match b {
            Block::Text(t) | Block::Notice(t) | Block::Error(t) | Block::Placeholder(t) => t.contains(needle),
            Block::Fields(f) => f.iter().any(|(k, v)| k.contains(needle) || v.contains(needle)),
            Block::Table { rows, .. } => rows.iter().flatten().any(|c| c.contains(needle)),
            Block::Links(ls) => ls.iter().any(|l| l.label.contains(needle)),
            Block::Pager { .. } => false,
        })
    }

    pub fn links(&self) -> Vec<&Link> {
        self.blocks
            .iter()
            .filter_map(|b| match b {
                Block::Links(ls) => Some(ls.iter()),
                _ => None,
            })
            .flatten()
            .collect()
    }
}

/// Result of a form submission or row action.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Outcome {
    Navigate(String),
    Stay,
    Failed(String),
}

/// Render the page behind `route`. Gate decisions are made by the caller.
pub async fn render(route: &Route, ctx: &PageContext<'_>, state: &PageState) -> View {
    let mut view = match route {
        Route::Home => home::render(ctx),
        Route::Login => auth::render_login(),
        Route::Signup => auth::render_signup(),
        Route::Books => books::render_catalog(ctx, state).await,
        Route::PopularBooks => books::render_popular(ctx).await,
        Route::BookDetail { id } => books::render_book(ctx, id).await,
        Route::AddBook => books::render_add_book(),
        Route::Orders => orders::render_orders(ctx, state).await,
        Route::MyOrders => orders::render_my_orders(ctx, state).await,
        Route::MakeOrder { book_id } => orders::render_make_order(book_id.as_deref()),
        Route::Missing { path } => missing::render(path),
    };
    // Action feedback goes first, like an inline banner
    let mut banner = Vec::new();
    if let Some(e) = &state.error {
        banner.push(Block::Error(e.clone()));
    }
    if let Some(n) = &state.notice {
        banner.push(Block::Notice(n.clone()));
    }
    view.blocks.splice(0..0, banner);
    view
}

/// "March 1, 2024"; missing dates render as an em dash.
pub fn format_date(d: Option<&DateTime<Utc>>) -> String {
    match d {
        Some(d) => d.format("%B %-d, %Y").to_string(),
        None => "—".to_string(),
    }
}

/// First 150 characters of a description followed by "...".
pub fn excerpt(description: Option<&str>) -> String {
    match description.filter(|d| !d.is_empty()) {
        Some(d) => format!("{}...", d.chars().take(150).collect::<String>()),
        None => "No description.".to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    #[test]
    fn dates_render_long_form() {
        let d = Utc.with_ymd_and_hms(2024, 3, 1, 10, 0, 0).unwrap();
        assert_eq!(format_date(Some(&d)), "March 1, 2024");
        assert_eq!(format_date(None), "—");
    }

    #[test]
    fn excerpt_truncates_at_150_chars() {
        let long = "x".repeat(200);
        let e = excerpt(Some(&long));
        assert_eq!(e.len(), 153);
        assert!(e.ends_with("..."));
        assert_eq!(excerpt(Some("short")), "short...");
        assert_eq!(excerpt(None), "No description.");
        assert_eq!(excerpt(Some("")), "No description.");
    }

    #[test]
    fn offset_is_zero_based() {
        let mut st = PageState::default();
        assert_eq!(st.offset(9), 0);
        st.page = 3;
        assert_eq!(st.offset(10), 20);
    }
}
