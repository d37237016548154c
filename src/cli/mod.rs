//! Interactive terminal front end.

pub mod commands;
pub mod navigator;
pub mod outputformatter;

use std::sync::Arc;

use anyhow::Result;
use rustyline::error::ReadlineError;
use rustyline::DefaultEditor;
use tracing::{debug, info};

use crate::api::ApiClient;
use crate::config::ClientConfig;
use crate::identity::{FileTokenStorage, SessionStore, TokenStorage};
use commands::Command;
use navigator::{Navigator, Reply};
use outputformatter::print_view;

pub fn print_usage(program: &str) {
    eprintln!(
        "Usage:\n  {program} [--api <url>] [--token-file <path>] [--path <location>]\n\nFlags:\n  --api <url>            Library API base URL (env LIBRIS_API_URL, default {default})\n  --token-file <path>    Where the session token is kept (env LIBRIS_TOKEN_FILE, default ~/.libris/access_token)\n  --path <location>      Page opened at startup (env LIBRIS_START_PATH, default /home)\n  -h, --help             Show this help\n\nLogging goes to stderr; set RUST_LOG (e.g. RUST_LOG=libris=debug) for more detail.\n\n{help}",
        default = crate::config::DEFAULT_API_URL,
        help = commands::HELP,
    );
}

/// Build the session from `config`, restore any stored login and run the
/// interpreter until quit or end of input.
pub async fn run(config: ClientConfig) -> Result<()> {
    let tokens: Arc<dyn TokenStorage> = Arc::new(FileTokenStorage::new(config.token_file.clone()));
    let api = ApiClient::new(config.api_base.clone(), tokens.clone())?;
    let session = SessionStore::new(api, tokens);
    info!(target: "libris::cli", api = %session.api().base(), token_file = %config.token_file.display(), "starting");

    // Reading the token file happens off the runtime thread; gated pages wait for it
    let hydrator = session.clone();
    let hydration = tokio::task::spawn_blocking(move || hydrator.hydrate());

    let start = config.start_path.clone();
    let mut nav = Navigator::new(session, config);
    let first = nav.open(&start).await;
    print_view(&first);
    if first.is_placeholder() {
        hydration.await?;
        print_view(&nav.refresh().await);
    }
    repl(&mut nav).await
}

async fn repl(nav: &mut Navigator) -> Result<()> {
    let mut rl = DefaultEditor::new()?;
    loop {
        let line = match rl.readline("libris> ") {
            Ok(l) => l,
            Err(ReadlineError::Interrupted) | Err(ReadlineError::Eof) => break,
            Err(e) => return Err(e.into()),
        };
        if !line.trim().is_empty() {
            let _ = rl.add_history_entry(line.as_str());
        }
        let cmd = match Command::parse(&line) {
            Ok(c) => c,
            Err(e) => {
                println!("{}", e.message());
                continue;
            }
        };
        debug!(target: "libris::cli", command = line.split_whitespace().next().unwrap_or(""), "command");
        match nav.execute(cmd).await {
            Reply::Show(view) => print_view(&view),
            Reply::Say(text) => println!("{}", text),
            Reply::Nothing => {}
            Reply::ConfirmLogout => {
                let answer = rl.readline("Are you sure you want to logout? [y/N] ").unwrap_or_default();
                if matches!(answer.trim().to_ascii_lowercase().as_str(), "y" | "yes") {
                    print_view(&nav.confirm_logout().await);
                } else {
                    println!("Logout cancelled.");
                }
            }
            Reply::Quit => break,
        }
    }
    Ok(())
}
