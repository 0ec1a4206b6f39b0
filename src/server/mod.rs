//! Server module
//!
//! The listener loop that accepts connections and spawns one task per
//! client, plus the per-connection handler in [`connection`].

pub mod connection;

use crate::core::{AccountStore, SessionRegistry};
use crate::types::{BankError, ConnectionId};
use connection::ConnectionHandler;
use std::sync::Arc;
use tokio::net::TcpListener;
use tracing::{error, info, warn};

/// Process-wide shared state handed to every connection task
///
/// No ambient globals: the store and registry are owned here and passed
/// explicitly.
#[derive(Debug, Default)]
pub struct ServerState {
    /// All account records, loaded at startup
    pub accounts: AccountStore,
    /// Live connection-to-account session bindings, starts empty
    pub sessions: SessionRegistry,
}

impl ServerState {
    /// Create empty server state
    pub fn new() -> Self {
        Self {
            accounts: AccountStore::new(),
            sessions: SessionRegistry::new(),
        }
    }
}

/// The main server loop: accept connections until shutdown
///
/// Each accepted connection gets a fresh `ConnectionId` and its own
/// spawned task; a failure in one connection never affects the listener
/// or other connections. `Ctrl-C` stops the accept loop; in-flight
/// connections are detached tasks that clean their sessions up through
/// the handler's drop guard.
pub async fn run(listener: TcpListener, state: Arc<ServerState>) -> Result<(), BankError> {
    let shutdown = tokio::signal::ctrl_c();
    tokio::pin!(shutdown);

    let mut connection_counter: ConnectionId = 0;
    loop {
        tokio::select! {
            biased;

            _ = &mut shutdown => {
                info!("shutdown signal received, closing listener");
                break;
            }

            result = listener.accept() => {
                match result {
                    Ok((socket, addr)) => {
                        connection_counter = connection_counter.wrapping_add(1);
                        let connection_id = connection_counter;
                        info!(%addr, connection_id, "accepted connection");

                        let state = Arc::clone(&state);
                        tokio::spawn(async move {
                            let mut handler =
                                ConnectionHandler::new(socket, addr, connection_id, state);
                            if let Err(error) = handler.run().await {
                                warn!(%addr, connection_id, %error, "connection terminated with error");
                            }
                        });
                    }
                    Err(error) => {
                        // Transient accept failures must not kill the listener.
                        error!(%error, "failed to accept connection");
                    }
                }
            }
        }
    }

    Ok(())
}
