//! Per-server sessions and their phase functions.
//!
//! A [`Session`] owns the connection handle of one configured server and
//! moves through [`SessionState`]s one phase at a time. Each phase inspects
//! and mutates only its own session, so a failing server never affects
//! another.

mod lifecycle;

pub use lifecycle::{Phase, PhaseOutcome, RoundReport, SessionState};

use std::rc::Rc;
use std::time::Duration;

use tokio::time::Instant;
use tracing::{Span, debug, error, info, warn};

use crate::client::{ClientError, Connection, EventHandler, ProtocolClient, WaitSet};
use crate::config::ServerEntry;
use crate::telemetry::spans;

/// Runtime state of one configured server.
pub struct Session<C> {
    server: Rc<ServerEntry>,
    state: SessionState,
    connection: Option<C>,
    /// Backoff gate; set while waiting to reconnect.
    deadline: Option<Instant>,
    handler: Box<dyn EventHandler>,
    reconnect_delay: Duration,
    span: Span,
}

impl<C: Connection> Session<C> {
    pub fn new(
        index: usize,
        server: Rc<ServerEntry>,
        handler: Box<dyn EventHandler>,
        reconnect_delay: Duration,
    ) -> Self {
        let span = spans::session(&server.name, index);
        Self {
            server,
            state: SessionState::Uninitialized,
            connection: None,
            deadline: None,
            handler,
            reconnect_delay,
            span,
        }
    }

    pub fn state(&self) -> SessionState {
        self.state
    }

    pub fn server(&self) -> &ServerEntry {
        &self.server
    }

    pub fn deadline(&self) -> Option<Instant> {
        self.deadline
    }

    pub fn has_connection(&self) -> bool {
        self.connection.is_some()
    }

    pub fn connection(&self) -> Option<&C> {
        self.connection.as_ref()
    }

    fn advance(&mut self, to: SessionState) -> PhaseOutcome {
        debug!(from = %self.state, to = %to, "State change");
        self.state = to;
        PhaseOutcome::Advanced(to)
    }

    /// `Uninitialized -> Created`: acquire a connection handle.
    pub fn create<P>(&mut self, client: &mut P) -> PhaseOutcome
    where
        P: ProtocolClient<Connection = C>,
    {
        if self.state != SessionState::Uninitialized {
            return PhaseOutcome::Skipped;
        }
        let _enter = self.span.clone().entered();

        info!("Creating session");
        match client.create_session(&self.server) {
            Ok(connection) => {
                self.connection = Some(connection);
                self.advance(SessionState::Created)
            }
            Err(e) => {
                error!(error = %e, "Could not create session");
                PhaseOutcome::Failed(e)
            }
        }
    }

    /// `Created -> Connected`: issue the connection request.
    pub fn connect(&mut self) -> PhaseOutcome {
        if self.state != SessionState::Created {
            return PhaseOutcome::Skipped;
        }
        let _enter = self.span.clone().entered();

        let Some(connection) = self.connection.as_mut() else {
            return PhaseOutcome::Failed(ClientError::NotConnected);
        };
        info!(host = %self.server.ip, port = self.server.port, "Connecting");
        match connection.connect(&self.server) {
            Ok(()) => self.advance(SessionState::Connected),
            Err(e) => {
                error!(error = %e, "Could not connect");
                PhaseOutcome::Failed(e)
            }
        }
    }

    /// `Connected -> ReadyForIO`: add the connection to the round's
    /// wait-set.
    pub fn register<'a>(&'a mut self, waitset: &mut WaitSet<'a>) -> PhaseOutcome {
        if self.state != SessionState::Connected {
            return PhaseOutcome::Skipped;
        }
        let _enter = self.span.clone().entered();

        let Some(connection) = self.connection.as_mut() else {
            return PhaseOutcome::Failed(ClientError::NotConnected);
        };
        match connection.register(waitset) {
            Ok(()) => {
                debug!(from = %self.state, to = %SessionState::ReadyForIO, "State change");
                self.state = SessionState::ReadyForIO;
                PhaseOutcome::Advanced(SessionState::ReadyForIO)
            }
            Err(e) => {
                error!(error = %e, "Could not register for I/O");
                PhaseOutcome::Failed(e)
            }
        }
    }

    /// Any non-terminal state `-> Stopping`.
    pub fn stop(&mut self) -> PhaseOutcome {
        if self.state.is_terminal() {
            return PhaseOutcome::Skipped;
        }
        let _enter = self.span.clone().entered();
        self.advance(SessionState::Stopping)
    }

    /// `ReadyForIO -> Connected`, or `ConnectionError` with a reconnect
    /// deadline of `now` plus the reconnect delay.
    pub fn process(&mut self, now: Instant) -> PhaseOutcome {
        if self.state != SessionState::ReadyForIO {
            return PhaseOutcome::Skipped;
        }
        let _enter = self.span.clone().entered();

        let Some(connection) = self.connection.as_mut() else {
            return PhaseOutcome::Failed(ClientError::NotConnected);
        };
        match connection.process(self.handler.as_mut()) {
            Ok(()) => self.advance(SessionState::Connected),
            Err(e) => {
                warn!(error = %e, "Connection failed");
                self.deadline = Some(now + self.reconnect_delay);
                self.advance(SessionState::ConnectionError);
                PhaseOutcome::Failed(e)
            }
        }
    }

    /// Release the connection of a session that is neither idle-connected
    /// nor already released. A failed connect leaves the session `Created`,
    /// so it lands here too without a deadline: backoff releases it in the
    /// same round and the next round retries with a fresh handle.
    pub fn teardown(&mut self, now: Instant) -> PhaseOutcome {
        match self.state {
            SessionState::Connected
            | SessionState::Uninitialized
            | SessionState::WaitingToReconnect => PhaseOutcome::Skipped,
            SessionState::Stopping => {
                if self.connection.take().is_none() {
                    return PhaseOutcome::Skipped;
                }
                let _enter = self.span.clone().entered();
                info!("Destroyed connection");
                PhaseOutcome::Advanced(SessionState::Stopping)
            }
            SessionState::Created | SessionState::ReadyForIO | SessionState::ConnectionError => {
                let _enter = self.span.clone().entered();
                self.connection = None;
                match self.deadline {
                    Some(deadline) => info!(
                        retry_in = ?deadline.saturating_duration_since(now),
                        "Destroyed connection"
                    ),
                    None => info!("Destroyed connection"),
                }
                self.advance(SessionState::WaitingToReconnect)
            }
        }
    }

    /// `WaitingToReconnect -> Uninitialized` once `now` is strictly past
    /// the deadline.
    pub fn backoff(&mut self, now: Instant) -> PhaseOutcome {
        if self.state != SessionState::WaitingToReconnect {
            return PhaseOutcome::Skipped;
        }
        if let Some(deadline) = self.deadline
            && now <= deadline
        {
            return PhaseOutcome::Skipped;
        }
        let _enter = self.span.clone().entered();
        self.deadline = None;
        self.advance(SessionState::Uninitialized)
    }
}
