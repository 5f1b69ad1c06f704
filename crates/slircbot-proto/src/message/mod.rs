//! Owned IRC messages.
//!
//! Parsing lives in `parse.rs`, wire formatting in `serialize.rs`.

mod parse;
mod serialize;

use crate::command::Command;
use crate::error::MessageParseError;
use crate::prefix::Prefix;

/// One IRC line: an optional source and a command.
///
/// ```
/// use slircbot_proto::Message;
///
/// let msg: Message = ":nick!user@host PRIVMSG #channel :Hello!".parse().unwrap();
/// assert_eq!(msg.source_nickname(), Some("nick"));
///
/// let join = Message::join_with_key("#secret", "hunter2");
/// assert_eq!(join.to_string(), "JOIN #secret hunter2\r\n");
/// ```
#[derive(Clone, PartialEq, Debug)]
pub struct Message {
    /// Source of the message, absent on lines a client sends.
    pub prefix: Option<Prefix>,
    /// Command and parameters.
    pub command: Command,
}

impl Message {
    /// Build a message from a raw prefix, command name and parameters.
    pub fn new(
        prefix: Option<&str>,
        command: &str,
        args: Vec<&str>,
    ) -> Result<Message, MessageParseError> {
        Ok(Message {
            prefix: prefix.map(Prefix::parse).transpose()?,
            command: Command::new(command, args)?,
        })
    }

    /// Nickname of the sending user, if a user sent it.
    pub fn source_nickname(&self) -> Option<&str> {
        self.prefix.as_ref().and_then(Prefix::nick)
    }

    /// `PRIVMSG target :text`
    pub fn privmsg(target: impl Into<String>, text: impl Into<String>) -> Self {
        Command::PRIVMSG(target.into(), text.into()).into()
    }

    /// `JOIN channel`
    pub fn join(channel: impl Into<String>) -> Self {
        Command::JOIN(channel.into(), None).into()
    }

    /// `JOIN channel key`
    pub fn join_with_key(channel: impl Into<String>, key: impl Into<String>) -> Self {
        Command::JOIN(channel.into(), Some(key.into())).into()
    }

    /// `PONG token`, answering a `PING`.
    pub fn pong(token: impl Into<String>) -> Self {
        Command::PONG(token.into(), None).into()
    }
}

impl From<Command> for Message {
    fn from(command: Command) -> Message {
        Message {
            prefix: None,
            command,
        }
    }
}
