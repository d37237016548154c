use std::sync::Arc;

use tokio::sync::watch;
use tracing::{debug, info, warn};

use super::principal::{Identity, Role};
use super::storage::TokenStorage;
use super::token;
use crate::api::{ApiClient, LoginRequest, SignupRequest};
use crate::error::AppResult;

/// Observable session state. `hydrating` is true only until the first
/// `hydrate` finishes.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SessionState {
    pub identity: Option<Identity>,
    pub hydrating: bool,
}

impl Default for SessionState {
    fn default() -> Self { Self { identity: None, hydrating: true } }
}

/// Process-wide authority for who is logged in.
///
/// Cheap to clone; clones share the same state, token storage and API client.
/// Pages and the navigator receive it explicitly rather than reaching for a
/// global.
#[derive(Clone)]
pub struct SessionStore {
    api: ApiClient,
    tokens: Arc<dyn TokenStorage>,
    state: Arc<watch::Sender<SessionState>>,
}

impl SessionStore {
    pub fn new(api: ApiClient, tokens: Arc<dyn TokenStorage>) -> Self {
        let (tx, _rx) = watch::channel(SessionState::default());
        Self { api, tokens, state: Arc::new(tx) }
    }

    pub fn api(&self) -> &ApiClient { &self.api }

    pub fn snapshot(&self) -> SessionState { self.state.borrow().clone() }

    pub fn identity(&self) -> Option<Identity> { self.state.borrow().identity.clone() }

    pub fn is_hydrating(&self) -> bool { self.state.borrow().hydrating }

    /// Receiver that observes every identity change and the end of hydration.
    pub fn subscribe(&self) -> watch::Receiver<SessionState> { self.state.subscribe() }

    /// Rebuild the identity from the persisted token. No network traffic.
    ///
    /// A token that cannot be decoded is removed from storage; the session is
    /// then simply logged out. Always ends hydration.
    pub fn hydrate(&self) -> Option<Identity> {
        let identity = match self.tokens.load() {
            Ok(None) => None,
            Ok(Some(raw)) => match token::decode_identity(&raw) {
                Ok(id) => Some(id),
                Err(e) => {
                    debug!(target: "libris::session", error = %e, "discarding unusable stored token");
                    if let Err(ce) = self.tokens.clear() {
                        warn!(target: "libris::session", error = %ce, "could not remove stored token");
                    }
                    None
                }
            },
            Err(e) => {
                warn!(target: "libris::session", error = %e, "could not read stored token; starting logged out");
                None
            }
        };
        debug!(target: "libris::session", user = ?identity.as_ref().map(|i| i.username.as_str()), "hydrated");
        self.state.send_replace(SessionState { identity: identity.clone(), hydrating: false });
        identity
    }

    pub async fn signup(&self, username: &str, email: Option<&str>, role: Role, password: &str) -> AppResult<Identity> {
        let req = SignupRequest {
            username: username.to_string(),
            email: email.map(str::trim).filter(|e| !e.is_empty()).map(str::to_string),
            role,
            password: password.to_string(),
        };
        let resp = self.api.signup(&req).await?;
        let id = self.adopt_token(&resp.access_token)?;
        info!(target: "libris::session", user = %id.username, role = %id.role, "signed up");
        Ok(id)
    }

    pub async fn login(&self, username: &str, password: &str) -> AppResult<Identity> {
        let req = LoginRequest { username: username.to_string(), password: password.to_string() };
        let resp = self.api.login(&req).await?;
        let id = self.adopt_token(&resp.access_token)?;
        info!(target: "libris::session", user = %id.username, role = %id.role, "logged in");
        Ok(id)
    }

    /// Tell the backend (best-effort), then drop the local session no matter
    /// what the backend said.
    pub async fn logout(&self) {
        if let Err(e) = self.api.logout().await {
            warn!(target: "libris::session", error = %e, "logout notification failed; clearing local session anyway");
        }
        if let Err(e) = self.tokens.clear() {
            warn!(target: "libris::session", error = %e, "could not remove stored token");
        }
        self.set_identity(None);
        info!(target: "libris::session", "logged out");
    }

    // A freshly issued token becomes the session only if it decodes; otherwise
    // nothing of it is kept and the session ends up logged out.
    fn adopt_token(&self, raw: &str) -> AppResult<Identity> {
        match token::decode_identity(raw) {
            Ok(id) => {
                self.tokens.store(raw)?;
                self.set_identity(Some(id.clone()));
                debug!(target: "libris::session", user = %id.username, role = %id.role, "adopted issued token");
                Ok(id)
            }
            Err(e) => {
                warn!(target: "libris::session", error = %e, "backend issued an unusable token");
                if let Err(ce) = self.tokens.clear() {
                    warn!(target: "libris::session", error = %ce, "could not remove stored token");
                }
                self.set_identity(None);
                Err(e.into())
            }
        }
    }

    fn set_identity(&self, identity: Option<Identity>) {
        self.state.send_modify(|s| s.identity = identity);
    }
}
