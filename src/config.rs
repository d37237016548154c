//! Client configuration: defaults, then environment, then command-line flags.

use std::path::PathBuf;

use reqwest::Url;

use crate::error::{AppError, AppResult};

pub const DEFAULT_API_URL: &str = "http://127.0.0.1:8000";
pub const BOOKS_PAGE_SIZE: u32 = 9;
pub const ORDERS_PAGE_SIZE: u32 = 10;

#[derive(Debug, Clone, PartialEq)]
pub struct ClientConfig {
    pub api_base: Url,
    /// File holding the raw credential token.
    pub token_file: PathBuf,
    /// Location opened after startup.
    pub start_path: String,
    pub books_page_size: u32,
    pub orders_page_size: u32,
}

/// What the command line asked for beyond configuration.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Invocation {
    Run,
    Help,
}

impl ClientConfig {
    pub fn new(api_base: Url, token_file: PathBuf) -> Self {
        Self {
            api_base,
            token_file,
            start_path: "/home".to_string(),
            books_page_size: BOOKS_PAGE_SIZE,
            orders_page_size: ORDERS_PAGE_SIZE,
        }
    }

    /// Built-in defaults with `LIBRIS_*` environment overrides applied.
    pub fn from_env() -> AppResult<Self> {
        Self::from_lookup(|k| std::env::var(k).ok())
    }

    pub fn from_lookup<F: Fn(&str) -> Option<String>>(lookup: F) -> AppResult<Self> {
        let api = lookup("LIBRIS_API_URL").filter(|s| !s.trim().is_empty()).unwrap_or_else(|| DEFAULT_API_URL.to_string());
        let token_file = lookup("LIBRIS_TOKEN_FILE")
            .filter(|s| !s.trim().is_empty())
            .map(PathBuf::from)
            .unwrap_or_else(|| default_token_file(lookup("HOME")));
        let mut cfg = Self::new(parse_api_url(&api)?, token_file);
        if let Some(p) = lookup("LIBRIS_START_PATH").filter(|s| !s.trim().is_empty()) {
            cfg.start_path = p;
        }
        Ok(cfg)
    }

    /// Apply command-line flags (program name already stripped).
    pub fn apply_args(&mut self, args: &[String]) -> AppResult<Invocation> {
        let mut i = 0;
        while i < args.len() {
            let flag = args[i].as_str();
            match flag {
                "-h" | "--help" => return Ok(Invocation::Help),
                "--api" | "--token-file" | "--path" => {
                    let Some(val) = args.get(i + 1) else {
                        return Err(AppError::config("missing_value", &format!("{} requires a value", flag)));
                    };
                    match flag {
                        "--api" => self.api_base = parse_api_url(val)?,
                        "--token-file" => self.token_file = PathBuf::from(val),
                        _ => self.start_path = val.clone(),
                    }
                    i += 2;
                }
                unk => return Err(AppError::config("unknown_flag", &format!("unrecognized argument: {}", unk))),
            }
        }
        Ok(Invocation::Run)
    }
}

fn parse_api_url(s: &str) -> AppResult<Url> {
    let url = Url::parse(s.trim()).map_err(|e| AppError::config("bad_api_url", &format!("invalid API URL '{}': {}", s, e)))?;
    match url.scheme() {
        "http" | "https" => Ok(url),
        other => Err(AppError::config("bad_api_url", &format!("API URL must be http or https, got '{}'", other))),
    }
}

fn default_token_file(home: Option<String>) -> PathBuf {
    match home.filter(|h| !h.is_empty()) {
        Some(h) => PathBuf::from(h).join(".libris").join("access_token"),
        None => PathBuf::from(".libris_access_token"),
    }
}
