pub mod error;
pub mod config;
pub mod identity;
pub mod api;
pub mod router;
pub mod pages;
pub mod cli;
