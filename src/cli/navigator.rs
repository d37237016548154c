//! Terminal navigator: holds the current location, applies route gates and
//! turns commands into page views.

use tracing::{debug, warn};
use uuid::Uuid;

use super::commands::{Command, HELP};
use crate::config::ClientConfig;
use crate::identity::{GateState, GateWatch, SessionStore};
use crate::pages::books::NewBookForm;
use crate::pages::orders::OrderForm;
use crate::pages::{self, auth, books, orders, Block, Outcome, PageContext, PageState, View};
use crate::router::Route;

const MAX_REDIRECTS: usize = 4;

/// What the REPL should do with a command's result.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Reply {
    Show(View),
    Say(String),
    /// Logout needs a yes/no answer before `confirm_logout`.
    ConfirmLogout,
    Nothing,
    Quit,
}

pub struct Navigator {
    session: SessionStore,
    config: ClientConfig,
    route: Route,
    gate: Option<GateWatch>,
    state: PageState,
    history: Vec<String>,
    mounted: bool,
    has_next: bool,
}

impl Navigator {
    pub fn new(session: SessionStore, config: ClientConfig) -> Self {
        Self {
            session,
            config,
            route: Route::Home,
            gate: None,
            state: PageState::default(),
            history: Vec::new(),
            mounted: false,
            has_next: false,
        }
    }

    pub fn route(&self) -> &Route { &self.route }

    pub fn session(&self) -> &SessionStore { &self.session }

    pub fn page_state(&self) -> &PageState { &self.state }

    /// Open a location, following gate redirects.
    pub async fn open(&mut self, location: &str) -> View { self.enter(location, true).await }

    /// Re-check the current page's gate against the session and re-render.
    pub async fn refresh(&mut self) -> View {
        let snapshot = self.session.snapshot();
        if let Some(w) = self.gate.as_mut() {
            if let GateState::Redirected(to) = w.observe(&snapshot) {
                debug!(target: "libris::gate", from = %self.route, to, "session changed under mounted page");
                return self.enter(to, false).await;
            }
        }
        self.show().await
    }

    pub async fn confirm_logout(&mut self) -> View {
        self.session.logout().await;
        self.refresh().await
    }

    pub async fn execute(&mut self, cmd: Command) -> Reply {
        match cmd {
            Command::Empty => Reply::Nothing,
            Command::Help => Reply::Say(HELP.to_string()),
            Command::Quit => Reply::Quit,
            Command::WhoAmI => Reply::Say(match self.session.identity() {
                Some(id) => format!("{} ({})", id.username, id.role),
                None => "Not logged in.".to_string(),
            }),
            Command::Go(path) => Reply::Show(self.open(&path).await),
            Command::Refresh => Reply::Show(self.refresh().await),
            Command::Back => match self.history.pop() {
                Some(prev) => Reply::Show(self.enter(&prev, false).await),
                None => Reply::Say("No previous page.".into()),
            },
            Command::Next => self.turn_page(true).await,
            Command::Prev => self.turn_page(false).await,
            Command::Login(form) => {
                if let Some(id) = self.session.identity() {
                    return Reply::Say(format!("Already logged in as {}.", id.username));
                }
                if let Some(r) = self.require(|r| matches!(r, Route::Login), "/login").await {
                    return r;
                }
                let outcome = auth::submit_login(&self.ctx(), &form).await;
                self.settle_outcome(outcome).await
            }
            Command::Signup(form) => {
                if let Some(id) = self.session.identity() {
                    return Reply::Say(format!("Already logged in as {}.", id.username));
                }
                if let Some(r) = self.require(|r| matches!(r, Route::Signup), "/signup").await {
                    return r;
                }
                let outcome = auth::submit_signup(&self.ctx(), &form).await;
                self.settle_outcome(outcome).await
            }
            Command::Logout => match self.session.identity() {
                Some(_) => Reply::ConfirmLogout,
                None => Reply::Say("Not logged in.".into()),
            },
            Command::Search(name) => {
                if !matches!(self.route, Route::Orders) {
                    return Reply::Say("'search' is only available on /orders.".into());
                }
                self.state.search = name.trim().to_string();
                self.state.page = 1;
                Reply::Show(self.show().await)
            }
            Command::Complete(id) => {
                if !matches!(self.route, Route::Orders) {
                    return Reply::Say("'complete' is only available on /orders.".into());
                }
                let outcome = orders::complete(&self.ctx(), &id).await;
                match outcome {
                    Outcome::Failed(msg) => self.state.error = Some(msg),
                    _ => {
                        self.state.notice = Some("Order marked as completed.".to_string());
                        // Rows are matched by UUID value, whatever case the id was typed in
                        if let Ok(done) = Uuid::parse_str(id.trim()) {
                            self.state.dismissed.push(done);
                        }
                    }
                }
                Reply::Show(self.show().await)
            }
            Command::Order(kind) => {
                let Route::MakeOrder { book_id } = &self.route else {
                    return Reply::Say("Open a book and follow its Order link first.".into());
                };
                let form = OrderForm { book_id: book_id.clone(), order_type: kind };
                let outcome = orders::submit_order(&self.ctx(), &form).await;
                self.settle_outcome(outcome).await
            }
            Command::AddBook(form) => self.add_book(form).await,
        }
    }

    async fn add_book(&mut self, form: NewBookForm) -> Reply {
        if !matches!(self.route, Route::AddBook) {
            return Reply::Say("'add-book' is only available on /books/add.".into());
        }
        let outcome = books::submit_new_book(&self.ctx(), &form).await;
        self.settle_outcome(outcome).await
    }

    async fn turn_page(&mut self, forward: bool) -> Reply {
        if !matches!(self.route, Route::Books | Route::Orders | Route::MyOrders) {
            return Reply::Say("This page is not paginated.".into());
        }
        if forward {
            if !self.has_next {
                return Reply::Say("Already on the last page.".into());
            }
            self.state.page += 1;
        } else {
            if self.state.page <= 1 {
                return Reply::Say("Already on the first page.".into());
            }
            self.state.page -= 1;
        }
        Reply::Show(self.show().await)
    }

    // Form pages accept their command only once mounted; opening the page may
    // itself redirect.
    async fn require(&mut self, on: fn(&Route) -> bool, path: &str) -> Option<Reply> {
        if on(&self.route) {
            return None;
        }
        let view = self.open(path).await;
        if on(&self.route) { None } else { Some(Reply::Show(view)) }
    }

    async fn settle_outcome(&mut self, outcome: Outcome) -> Reply {
        match outcome {
            Outcome::Navigate(to) => Reply::Show(self.open(&to).await),
            Outcome::Stay => Reply::Show(self.show().await),
            Outcome::Failed(msg) => {
                self.state.error = Some(msg);
                Reply::Show(self.show().await)
            }
        }
    }

    fn ctx(&self) -> PageContext<'_> { PageContext::new(&self.session, &self.config) }

    async fn enter(&mut self, location: &str, record: bool) -> View {
        let mut target = location.trim().to_string();
        for _ in 0..=MAX_REDIRECTS {
            let route = Route::resolve(&target);
            let mut watch = route.gate().map(GateWatch::new);
            if let Some(w) = watch.as_mut() {
                let decided = if self.session.is_hydrating() {
                    let mut rx = self.session.subscribe();
                    w.settle(&mut rx).await
                } else {
                    w.observe(&self.session.snapshot())
                };
                if let GateState::Redirected(to) = decided {
                    debug!(target: "libris::gate", from = %route, to, "redirecting");
                    target = to.to_string();
                    continue;
                }
            }
            if record && self.mounted {
                self.history.push(self.route.path());
            }
            self.route = route;
            self.gate = watch;
            self.state = PageState::default();
            self.mounted = true;
            return self.show().await;
        }
        warn!(target: "libris::gate", location, "too many redirects");
        View::new("Redirect loop").with(Block::Error(format!("Could not open {}.", location)))
    }

    async fn show(&mut self) -> View {
        let view = pages::render(&self.route, &self.ctx(), &self.state).await;
        self.state.error = None;
        self.state.notice = None;
        self.has_next = view.blocks.iter().any(|b| matches!(b, Block::Pager { has_next: true, .. }));
        view
    }
}
