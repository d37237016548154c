//! Unified client error model.
//! Every failure a page or the session layer can hit maps onto one `AppError`
//! variant; pages render `user_message` inline and never propagate further.

use serde::{Deserialize, Serialize};
use std::fmt::{Display, Formatter};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum AppError {
    /// Rejected locally before any request was made.
    Validation { code: String, message: String },
    /// The backend answered with a non-success status.
    Request { code: String, status: u16, detail: Option<String> },
    /// Credential token could not be decoded or looks expired.
    Decode { code: String, message: String },
    /// The request never produced a response (connect, TLS, body read).
    Transport { code: String, message: String },
    Storage { code: String, message: String },
    Config { code: String, message: String },
}

impl AppError {
    pub fn code_str(&self) -> &str {
        match self {
            AppError::Validation { code, .. }
            | AppError::Request { code, .. }
            | AppError::Decode { code, .. }
            | AppError::Transport { code, .. }
            | AppError::Storage { code, .. }
            | AppError::Config { code, .. } => code.as_str(),
        }
    }

    pub fn message(&self) -> &str {
        match self {
            AppError::Request { detail, .. } => detail.as_deref().unwrap_or(""),
            AppError::Validation { message, .. }
            | AppError::Decode { message, .. }
            | AppError::Transport { message, .. }
            | AppError::Storage { message, .. }
            | AppError::Config { message, .. } => message.as_str(),
        }
    }

    pub fn validation<C: Into<String>, M: Into<String>>(code: C, msg: M) -> Self { AppError::Validation { code: code.into(), message: msg.into() } }
    pub fn request(status: u16, detail: Option<String>) -> Self { AppError::Request { code: "request_failed".into(), status, detail } }
    pub fn decode<C: Into<String>, M: Into<String>>(code: C, msg: M) -> Self { AppError::Decode { code: code.into(), message: msg.into() } }
    pub fn transport<C: Into<String>, M: Into<String>>(code: C, msg: M) -> Self { AppError::Transport { code: code.into(), message: msg.into() } }
    pub fn storage<C: Into<String>, M: Into<String>>(code: C, msg: M) -> Self { AppError::Storage { code: code.into(), message: msg.into() } }
    pub fn config<C: Into<String>, M: Into<String>>(code: C, msg: M) -> Self { AppError::Config { code: code.into(), message: msg.into() } }

    /// Text shown to the user for a failed action.
    ///
    /// Local validation messages are shown as written. Backend errors show the
    /// backend's `detail` when it sent one; everything else collapses to the
    /// page-specific `fallback`.
    pub fn user_message(&self, fallback: &str) -> String {
        match self {
            AppError::Validation { message, .. } => message.clone(),
            AppError::Request { detail: Some(d), .. } if !d.is_empty() => d.clone(),
            _ => fallback.to_string(),
        }
    }

    pub fn is_validation(&self) -> bool { matches!(self, AppError::Validation { .. }) }

    /// HTTP status of a backend rejection, if this is one.
    pub fn http_status(&self) -> Option<u16> {
        match self {
            AppError::Request { status, .. } => Some(*status),
            _ => None,
        }
    }
}

impl Display for AppError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            AppError::Request { code, status, detail } => match detail {
                Some(d) => write!(f, "{}: HTTP {}: {}", code, status, d),
                None => write!(f, "{}: HTTP {}", code, status),
            },
            _ => write!(f, "{}: {}", self.code_str(), self.message()),
        }
    }
}

impl std::error::Error for AppError {}

pub type AppResult<T> = Result<T, AppError>;

impl From<reqwest::Error> for AppError {
    fn from(err: reqwest::Error) -> Self {
        let code = if err.is_decode() { "bad_response" } else { "unreachable" };
        AppError::transport(code, err.to_string())
    }
}

impl From<std::io::Error> for AppError {
    fn from(err: std::io::Error) -> Self {
        AppError::storage("io_error", err.to_string())
    }
}
