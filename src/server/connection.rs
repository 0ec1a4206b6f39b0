//! Per-connection handler
//!
//! `ConnectionHandler` owns the full lifecycle of one client connection:
//! it frames the byte stream into lines, parses each frame, and drives the
//! session state machine
//!
//! ```text
//! Unauthenticated -> Authenticated -> Closed
//! ```
//!
//! Before a successful `Validate`, only `Validate` and `END` are accepted;
//! money commands answer result code `3` without touching any state. After
//! validation the handler holds the bound account identifier as its own
//! state and dispatches `Balance`/`Deposit`/`Withdraw` against that
//! account only - an account identifier arriving on the wire is never
//! trusted.
//!
//! A [`SessionGuard`] releases the session binding on every exit path
//! (explicit `END`, protocol error, abrupt disconnect), so a crashed
//! client can never lock its account out of future logins.

use crate::protocol::{parse_frame, Command, Reply};
use crate::server::ServerState;
use crate::types::{AccountId, BankError, ConnectionId};
use futures::{SinkExt, StreamExt};
use rust_decimal::Decimal;
use std::net::SocketAddr;
use std::str::FromStr;
use std::sync::Arc;
use tokio::net::TcpStream;
use tokio_util::codec::{Framed, LinesCodec};
use tracing::{debug, warn};

/// Frames longer than this are a protocol violation and close the
/// connection.
const MAX_FRAME_LENGTH: usize = 1024;

/// The authentication state of the connection
#[derive(Debug, Clone, PartialEq, Eq)]
enum SessionPhase {
    /// No account bound yet; only `Validate` and `END` make progress
    Unauthenticated,
    /// Bound to one validated account for the rest of the connection
    Authenticated(AccountId),
}

/// The next step for the connection's read loop to take
enum NextAction {
    Continue,
    ExitLoop,
}

/// RAII guard releasing the session binding when the handler exits
///
/// Unbinds by `(account, connection)` pair, so a guard that outlives its
/// session can never evict a newer session for the same account.
struct SessionGuard {
    state: Arc<ServerState>,
    connection_id: ConnectionId,
    bound: Option<AccountId>,
}

impl SessionGuard {
    fn new(state: Arc<ServerState>, connection_id: ConnectionId) -> Self {
        Self {
            state,
            connection_id,
            bound: None,
        }
    }

    /// Record the account this connection now owns
    fn bind(&mut self, id: AccountId) {
        self.bound = Some(id);
    }
}

impl Drop for SessionGuard {
    fn drop(&mut self) {
        if let Some(id) = self.bound.take() {
            self.state.sessions.unbind_connection(&id, self.connection_id);
            debug!(
                account = %id,
                connection_id = self.connection_id,
                "released session binding"
            );
        }
    }
}

/// Manages the full lifecycle of one client connection
pub struct ConnectionHandler {
    framed: Framed<TcpStream, LinesCodec>,
    addr: SocketAddr,
    connection_id: ConnectionId,
    state: Arc<ServerState>,
    phase: SessionPhase,
}

impl ConnectionHandler {
    /// Create a handler for a freshly accepted connection
    pub fn new(
        socket: TcpStream,
        addr: SocketAddr,
        connection_id: ConnectionId,
        state: Arc<ServerState>,
    ) -> Self {
        Self {
            framed: Framed::new(
                socket,
                LinesCodec::new_with_max_length(MAX_FRAME_LENGTH),
            ),
            addr,
            connection_id,
            state,
            phase: SessionPhase::Unauthenticated,
        }
    }

    /// The main read loop: one decoded line is one frame
    ///
    /// Returns when the peer disconnects, sends `END`, sends an
    /// unrecognized command, or the transport fails. The session binding
    /// (if any) is released by the guard on every path out of here,
    /// including a panic in the task.
    pub async fn run(&mut self) -> Result<(), BankError> {
        let mut guard = SessionGuard::new(Arc::clone(&self.state), self.connection_id);

        loop {
            match self.framed.next().await {
                Some(Ok(frame)) => {
                    debug!(connection_id = self.connection_id, %frame, "received frame");
                    let action = match parse_frame(&frame) {
                        Ok(command) => self.dispatch(command, &mut guard).await?,
                        Err(error) => {
                            debug!(connection_id = self.connection_id, %error, "malformed frame");
                            self.send(Reply::Malformed).await?;
                            NextAction::Continue
                        }
                    };
                    if matches!(action, NextAction::ExitLoop) {
                        break;
                    }
                }
                Some(Err(error)) => {
                    // Treated like a disconnect: drop the session, keep the
                    // listener and every other connection alive.
                    warn!(addr = %self.addr, %error, "transport error, closing connection");
                    break;
                }
                None => {
                    debug!(addr = %self.addr, "connection closed by peer");
                    break;
                }
            }
        }

        Ok(())
    }

    /// Dispatch one parsed command against the current session phase
    async fn dispatch(
        &mut self,
        command: Command,
        guard: &mut SessionGuard,
    ) -> Result<NextAction, BankError> {
        let bound = match &self.phase {
            SessionPhase::Authenticated(id) => Some(id.clone()),
            SessionPhase::Unauthenticated => None,
        };

        match (command, bound) {
            (Command::End, _) => {
                debug!(addr = %self.addr, "client ended session");
                Ok(NextAction::ExitLoop)
            }

            (Command::Unknown(name), _) => {
                warn!(addr = %self.addr, command = %name, "unrecognized command, closing connection");
                self.send(Reply::Error(format!("unrecognized command '{name}'")))
                    .await?;
                Ok(NextAction::ExitLoop)
            }

            (Command::Validate { account, pin }, None) => {
                let reply = self.handle_validate(&account, &pin, guard);
                self.send(reply).await?;
                Ok(NextAction::Continue)
            }

            // A second Validate on a bound connection is out of protocol.
            (Command::Validate { .. }, Some(_)) => {
                self.send(Reply::Malformed).await?;
                Ok(NextAction::Continue)
            }

            // Money commands require a bound session; never trust an
            // account identifier from the wire instead.
            (Command::Balance | Command::Deposit { .. } | Command::Withdraw { .. }, None) => {
                debug!(addr = %self.addr, "money command before Validate rejected");
                self.send(Reply::Malformed).await?;
                Ok(NextAction::Continue)
            }

            (Command::Balance, Some(id)) => {
                let reply = match self.state.accounts.balance(&id) {
                    Some(balance) => Reply::Balance(balance),
                    None => Reply::Failed,
                };
                self.send(reply).await?;
                Ok(NextAction::Continue)
            }

            (Command::Deposit { amount }, Some(id)) => {
                let reply = match parse_amount(&amount) {
                    Some(amount) => match self.state.accounts.deposit(&id, amount) {
                        Ok(_) => Reply::Ok,
                        Err(error) => reply_for_business_error(&error),
                    },
                    None => Reply::Failed,
                };
                self.send(reply).await?;
                Ok(NextAction::Continue)
            }

            (Command::Withdraw { amount }, Some(id)) => {
                let reply = match parse_amount(&amount) {
                    Some(amount) => match self.state.accounts.withdraw(&id, amount) {
                        Ok(_) => Reply::Ok,
                        Err(error) => reply_for_business_error(&error),
                    },
                    None => Reply::Failed,
                };
                self.send(reply).await?;
                Ok(NextAction::Continue)
            }
        }
    }

    /// Validate a login attempt: PIN check first, then the atomic bind
    ///
    /// A wrong PIN never creates a session, and a lost bind race answers
    /// `2` without disturbing the winner.
    fn handle_validate(&mut self, account: &str, pin: &str, guard: &mut SessionGuard) -> Reply {
        let id = match AccountId::from_str(account) {
            Ok(id) => id,
            // Malformed identifier means no such account.
            Err(_) => return Reply::Failed,
        };

        if !self.state.accounts.verify_pin(&id, pin) {
            return Reply::Failed;
        }

        if !self.state.sessions.try_bind(&id, self.connection_id) {
            debug!(account = %id, "already logged in elsewhere");
            return Reply::Rejected;
        }

        debug!(account = %id, connection_id = self.connection_id, "session bound");
        guard.bind(id.clone());
        self.phase = SessionPhase::Authenticated(id);
        Reply::Ok
    }

    async fn send(&mut self, reply: Reply) -> Result<(), BankError> {
        self.framed.send(reply.encode()).await?;
        Ok(())
    }
}

/// Parse an amount field from the wire
///
/// Unparseable text is a business failure (result code `1`); range and
/// precision checks happen in the account store.
fn parse_amount(text: &str) -> Option<Decimal> {
    Decimal::from_str(text.trim()).ok()
}

/// Map a store error to the wire result code for money commands
fn reply_for_business_error(error: &BankError) -> Reply {
    match error {
        BankError::Overdraft { .. } => Reply::Rejected,
        _ => Reply::Failed,
    }
}
