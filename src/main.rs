//! vndr CLI entry point
//!
//! Parses arguments, installs the log subscriber and runs the vendoring
//! pipeline. Any error is printed with its suggestion and the process exits
//! with status 1.

use anyhow::Result;
use clap::Parser;
use tracing_subscriber::EnvFilter;
use vndr::cli;
use vndr::core::user_friendly_error;

#[tokio::main]
async fn main() -> Result<()> {
    let cli = cli::Cli::parse();

    // RUST_LOG overrides the level chosen by --verbose
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(cli.build_config().log_filter()));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .init();

    #[cfg(windows)]
    colored::control::set_virtual_terminal(true).ok();

    match cli.execute().await {
        Ok(()) => Ok(()),
        Err(e) => {
            let error_ctx = user_friendly_error(e);
            error_ctx.display();
            std::process::exit(1);
        }
    }
}
