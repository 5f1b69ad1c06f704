//! Protocol client capability.
//!
//! The lifecycle manager and the dispatcher only see the traits in this
//! module. [`tcp`] provides the real implementation over TCP; tests plug in
//! scripted ones.
//!
//! ## Shape
//!
//! - [`ProtocolClient`] creates one [`Connection`] per session.
//! - A [`Connection`] is connected once, registered into the round's
//!   [`WaitSet`] and then processed after the shared wait.
//! - Processing decodes server traffic into [`IrcEvent`]s and hands each to
//!   an [`EventHandler`], together with the connection itself as
//!   [`Commands`] so the handler can answer on it.
//! - Destroying a session is dropping its connection.

pub mod tcp;
mod translate;
mod waitset;

pub use tcp::{TcpClient, TcpConnection};
pub use translate::translate;
pub use waitset::{Readiness, WaitError, WaitOutcome, WaitSet};

use std::fmt;
use std::io;

use slircbot_proto::ProtocolError;
use thiserror::Error;

use crate::config::ServerEntry;

// ============================================================================
// Errors
// ============================================================================

/// Session-scoped client failures. None of these cross sessions.
#[derive(Debug, Error)]
pub enum ClientError {
    #[error("could not create session: {0}")]
    Create(String),
    #[error("connection already initiated")]
    AlreadyConnecting,
    #[error("not connected")]
    NotConnected,
    #[error("could not connect: {0}")]
    Connect(#[source] io::Error),
    #[error("connection closed by server")]
    Closed,
    #[error("io error: {0}")]
    Io(#[from] io::Error),
    #[error("protocol error: {0}")]
    Protocol(#[from] ProtocolError),
}

// ============================================================================
// Events
// ============================================================================

/// What kind of server event a callback receives.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum EventKind {
    /// Registration accepted (`001`).
    Connect,
    /// `PRIVMSG` to a channel; params are `[channel, text]`.
    Channel,
    Kick,
    Notice,
    Invite,
    /// Any numeric reply, `001` included.
    Numeric(u16),
    /// Everything else, by command name.
    Unknown(String),
}

impl fmt::Display for EventKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            EventKind::Connect => f.write_str("CONNECT"),
            EventKind::Channel => f.write_str("CHANNEL"),
            EventKind::Kick => f.write_str("KICK"),
            EventKind::Notice => f.write_str("NOTICE"),
            EventKind::Invite => f.write_str("INVITE"),
            EventKind::Numeric(code) => write!(f, "{code:03}"),
            EventKind::Unknown(name) => f.write_str(name),
        }
    }
}

/// A server event as delivered to an [`EventHandler`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct IrcEvent {
    pub kind: EventKind,
    /// Who sent it: a bare nick, a full mask or a server name.
    pub origin: Option<String>,
    pub params: Vec<String>,
}

impl IrcEvent {
    pub fn new(kind: EventKind, origin: Option<String>, params: Vec<String>) -> Self {
        Self {
            kind,
            origin,
            params,
        }
    }

    pub fn param(&self, index: usize) -> Option<&str> {
        self.params.get(index).map(String::as_str)
    }
}

/// `Event "<name>", origin: "<origin>", params: N [a|b]`
impl fmt::Display for IrcEvent {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "Event \"{}\", origin: \"{}\", params: {} [{}]",
            self.kind,
            self.origin.as_deref().unwrap_or("NULL"),
            self.params.len(),
            self.params.join("|")
        )
    }
}

// ============================================================================
// Capability traits
// ============================================================================

/// Outbound actions available to event handlers.
pub trait Commands {
    /// Send `text` to a nick or channel.
    fn send_message(&mut self, target: &str, text: &str) -> Result<(), ClientError>;

    /// Join a channel, with its key if it has one.
    fn join(&mut self, channel: &str, key: Option<&str>) -> Result<(), ClientError>;
}

/// Receives every event a connection decodes while processing.
pub trait EventHandler {
    fn handle(&mut self, client: &mut dyn Commands, event: IrcEvent);
}

/// One live protocol connection, exclusively owned by its session.
pub trait Connection: Commands {
    /// Start connecting and queue the registration. Called at most once
    /// per connection.
    fn connect(&mut self, server: &ServerEntry) -> Result<(), ClientError>;

    /// Add this connection's readiness to the round's wait-set.
    fn register<'a>(&'a mut self, waitset: &mut WaitSet<'a>) -> Result<(), ClientError>;

    /// Handle whatever became ready during the wait, invoking `handler`
    /// for every decoded event. Never blocks.
    fn process(&mut self, handler: &mut dyn EventHandler) -> Result<(), ClientError>;
}

/// Factory for connections.
pub trait ProtocolClient {
    type Connection: Connection;

    fn create_session(&mut self, server: &ServerEntry) -> Result<Self::Connection, ClientError>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_event_dump_format() {
        let event = IrcEvent::new(
            EventKind::Kick,
            Some("op".to_string()),
            vec!["#chan".to_string(), "bot".to_string()],
        );
        assert_eq!(
            event.to_string(),
            r#"Event "KICK", origin: "op", params: 2 [#chan|bot]"#
        );
    }

    #[test]
    fn test_event_dump_without_origin() {
        let event = IrcEvent::new(EventKind::Numeric(5), None, vec![]);
        assert_eq!(
            event.to_string(),
            r#"Event "005", origin: "NULL", params: 0 []"#
        );
    }

    #[test]
    fn test_event_kind_names() {
        assert_eq!(EventKind::Connect.to_string(), "CONNECT");
        assert_eq!(EventKind::Unknown("MODE".to_string()).to_string(), "MODE");
    }
}
