//! Client-side session and authorization: who is logged in, where that is
//! persisted, and which pages they may open.
//! Keep the public surface thin and split implementation across sub-modules.

mod principal;
mod session;
mod storage;
pub mod token;
pub mod gate;

pub use principal::{Identity, Role};
pub use session::{SessionState, SessionStore};
pub use storage::{FileTokenStorage, MemoryTokenStorage, TokenStorage};
pub use token::{decode_identity, CredentialToken, TokenError};
pub use gate::{decide, Decision, Gate, GateState, GateWatch, HOME_PATH, LOGIN_PATH};
