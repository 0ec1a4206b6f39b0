//! Rust Bank Server binary
//!
//! Loads the account file, binds the listener, and serves client sessions
//! until interrupted.
//!
//! # Usage
//!
//! ```bash
//! cargo run -- accounts.txt
//! cargo run -- --host 0.0.0.0 --port 65432 accounts.txt
//! ```
//!
//! Logging is controlled through `RUST_LOG` (e.g. `RUST_LOG=debug`).
//!
//! # Exit Codes
//!
//! - 0: Clean shutdown (Ctrl-C)
//! - 1: Startup error (account file unreadable, bind failure)

use rust_bank_server::{cli, io, server, ServerState};
use std::process;
use std::sync::Arc;
use tokio::net::TcpListener;
use tracing::{error, info};
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .compact()
        .init();

    let args = cli::parse_args();
    let state = Arc::new(ServerState::new());

    match io::load_accounts(&args.accounts_file, &state.accounts) {
        Ok(count) => {
            info!(count, path = %args.accounts_file.display(), "finished loading account data");
        }
        Err(error) => {
            error!(%error, path = %args.accounts_file.display(), "failed to load account file");
            process::exit(1);
        }
    }

    let listener = match TcpListener::bind((args.host.as_str(), args.port)).await {
        Ok(listener) => listener,
        Err(error) => {
            error!(%error, host = %args.host, port = args.port, "failed to bind listener");
            process::exit(1);
        }
    };
    info!(host = %args.host, port = args.port, "bank server listening");

    if let Err(error) = server::run(listener, state).await {
        error!(%error, "server terminated with error");
        process::exit(1);
    }

    info!("bank server exiting");
}
