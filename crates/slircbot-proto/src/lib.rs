//! # slircbot-proto
//!
//! The client half of the IRC protocol as slircbot speaks it: an owned
//! [`Message`] model with a nom grammar, a serializer that refuses to split
//! a value across lines, and codecs for `tokio_util::codec`.
//!
//! Only the commands a bot sends or reacts to get typed variants; anything
//! else survives parsing as [`Command::Raw`] so nothing a server sends is
//! lost.
//!
//! ```rust
//! use slircbot_proto::{Command, Message};
//!
//! let msg: Message = ":alice!a@host PRIVMSG #rust :hello there".parse().unwrap();
//! assert_eq!(msg.source_nickname(), Some("alice"));
//! assert!(matches!(msg.command, Command::PRIVMSG(ref target, _) if target == "#rust"));
//!
//! let reply = Message::privmsg("#rust", "hi alice");
//! assert_eq!(reply.to_string(), "PRIVMSG #rust :hi alice\r\n");
//! ```

#![deny(clippy::all)]
#![warn(missing_docs)]

pub mod command;
pub mod error;
#[cfg(feature = "tokio")]
pub mod irc;
#[cfg(feature = "tokio")]
pub mod line;
pub mod message;
pub mod prefix;
pub mod response;
pub mod target;

pub use self::command::Command;
pub use self::error::{MessageParseError, ProtocolError};
#[cfg(feature = "tokio")]
pub use self::irc::IrcCodec;
#[cfg(feature = "tokio")]
pub use self::line::LineCodec;
pub use self::message::Message;
pub use self::prefix::Prefix;
pub use self::response::Response;
pub use self::target::is_channel_name;

/// Longest line accepted from a server: 512 bytes of message plus room for
/// an IRCv3 tag block, which the parser skips.
pub const MAX_IRC_LINE_LEN: usize = 512 + 8191;
