use tracing_subscriber::{EnvFilter, fmt};
use tracing::info;

use libris::config::{ClientConfig, Invocation};

fn main() -> anyhow::Result<()> {
    // Init logging; stdout belongs to the pages, so logs go to stderr
    let filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new("warn"))?;
    fmt().with_env_filter(filter).with_writer(std::io::stderr).init();

    let args: Vec<String> = std::env::args().collect();
    let program = args.first().map(String::as_str).unwrap_or("libris");
    let mut config = ClientConfig::from_env()?;
    match config.apply_args(args.get(1..).unwrap_or(&[])) {
        Ok(Invocation::Run) => {}
        Ok(Invocation::Help) => {
            libris::cli::print_usage(program);
            return Ok(());
        }
        Err(e) => {
            eprintln!("{}", e.message());
            libris::cli::print_usage(program);
            std::process::exit(2);
        }
    }
    let rust_log = std::env::var("RUST_LOG").unwrap_or_else(|_| "<unset>".to_string());
    info!(target: "libris", "libris starting: RUST_LOG='{}', api='{}'", rust_log, config.api_base);

    let rt = tokio::runtime::Builder::new_current_thread().enable_all().build()?;
    rt.block_on(libris::cli::run(config))
}
