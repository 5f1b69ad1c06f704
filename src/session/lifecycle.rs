//! Session lifecycle states and per-phase outcomes.
//!
//! ```text
//! Uninitialized ─create─► Created ─connect─► Connected ─register─► ReadyForIO
//!       ▲                    │                   ▲                     │
//!       │                    │ (connect failed)  └────process ok───────┤
//!       │                    ▼                                         │ process failed
//!  WaitingToReconnect ◄─teardown── Created / ConnectionError ◄─────────┘
//!       (backoff: now > deadline)
//!
//! any non-terminal state ──stop──► Stopping (terminal)
//! ```
//!
//! Every phase has exactly one precondition state. A phase applied to a
//! session in any other state is skipped, never an error.

use std::fmt;

use crate::client::{ClientError, WaitOutcome};

/// Where a session is in its connection lifecycle.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SessionState {
    /// No connection handle.
    Uninitialized,
    /// Handle acquired, not yet connecting.
    Created,
    /// Connect issued; the connection is idle between rounds.
    Connected,
    /// Registered in this round's wait-set.
    ReadyForIO,
    /// Processing failed; waiting for teardown.
    ConnectionError,
    /// Handle released; waiting for the reconnect deadline.
    WaitingToReconnect,
    /// Shutting down. Terminal.
    Stopping,
}

impl SessionState {
    pub fn is_terminal(self) -> bool {
        self == SessionState::Stopping
    }
}

impl fmt::Display for SessionState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            SessionState::Uninitialized => "uninitialized",
            SessionState::Created => "created",
            SessionState::Connected => "connected",
            SessionState::ReadyForIO => "ready-for-io",
            SessionState::ConnectionError => "connection-error",
            SessionState::WaitingToReconnect => "waiting-to-reconnect",
            SessionState::Stopping => "stopping",
        };
        f.write_str(name)
    }
}

/// The round-scoped phases, in execution order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Phase {
    Create,
    Connect,
    Register,
    Stop,
    Process,
    Teardown,
    Backoff,
}

/// What one phase did to one session.
#[derive(Debug)]
pub enum PhaseOutcome {
    /// The session was not in the phase's precondition state.
    Skipped,
    /// The phase ran and left the session in this state.
    Advanced(SessionState),
    /// The phase ran and failed. Connect and register failures leave the
    /// state unchanged; a process failure moves it to
    /// [`SessionState::ConnectionError`].
    Failed(ClientError),
}

impl PhaseOutcome {
    pub fn is_skipped(&self) -> bool {
        matches!(self, PhaseOutcome::Skipped)
    }

    pub fn error(&self) -> Option<&ClientError> {
        match self {
            PhaseOutcome::Failed(e) => Some(e),
            _ => None,
        }
    }
}

/// Per-session outcomes of every phase of one round, indexed like the
/// session list.
#[derive(Debug)]
pub struct RoundReport {
    pub create: Vec<PhaseOutcome>,
    pub connect: Vec<PhaseOutcome>,
    pub register: Vec<PhaseOutcome>,
    pub wait: WaitOutcome,
    /// Empty unless the wait observed the stop token.
    pub stop: Vec<PhaseOutcome>,
    pub process: Vec<PhaseOutcome>,
    pub teardown: Vec<PhaseOutcome>,
    pub backoff: Vec<PhaseOutcome>,
}

impl RoundReport {
    pub fn outcomes(&self, phase: Phase) -> &[PhaseOutcome] {
        match phase {
            Phase::Create => &self.create,
            Phase::Connect => &self.connect,
            Phase::Register => &self.register,
            Phase::Stop => &self.stop,
            Phase::Process => &self.process,
            Phase::Teardown => &self.teardown,
            Phase::Backoff => &self.backoff,
        }
    }

    /// Whether the round ended because of the stop token.
    pub fn stopped(&self) -> bool {
        self.wait == WaitOutcome::Stopped
    }

    /// Every failure of the round as (phase, session index, error).
    pub fn failures(&self) -> impl Iterator<Item = (Phase, usize, &ClientError)> {
        const PHASES: [Phase; 7] = [
            Phase::Create,
            Phase::Connect,
            Phase::Register,
            Phase::Stop,
            Phase::Process,
            Phase::Teardown,
            Phase::Backoff,
        ];
        PHASES.into_iter().flat_map(move |phase| {
            self.outcomes(phase)
                .iter()
                .enumerate()
                .filter_map(move |(i, o)| o.error().map(|e| (phase, i, e)))
        })
    }

    /// Whether no phase failed for any session.
    pub fn is_clean(&self) -> bool {
        self.failures().next().is_none()
    }
}
