//! Error types for the IRC protocol library.
//!
//! [`ProtocolError`] covers everything that can go wrong between the socket
//! and a parsed [`Message`](crate::Message); [`MessageParseError`] is the
//! cause attached when a line was read fine but is not valid IRC.

use thiserror::Error;

/// Convenience type alias for Results using [`ProtocolError`].
pub type Result<T, E = ProtocolError> = std::result::Result<T, E>;

/// Top-level protocol errors.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum ProtocolError {
    /// I/O error during reading or writing.
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),

    /// Invalid UTF-8 bytes in a line.
    #[error("invalid UTF-8 in message at byte {byte_pos}: {details}")]
    InvalidUtf8 {
        /// Byte position where UTF-8 validation failed.
        byte_pos: usize,
        /// Detailed error message from the UTF-8 decoder.
        details: String,
    },

    /// Line exceeded the maximum allowed length.
    #[error("message too long: {actual} bytes (limit: {limit})")]
    MessageTooLong {
        /// Actual line length.
        actual: usize,
        /// Maximum allowed length.
        limit: usize,
    },

    /// Illegal control character in a line.
    #[error("illegal control character: {0:?}")]
    IllegalControlChar(char),

    /// An outgoing message could not be serialized onto a single line.
    #[error("parameter contains CR, LF or NUL, or cannot be placed on the wire")]
    UnsafeParameter,

    /// Failed to parse an IRC message.
    #[error("invalid message: {string}")]
    InvalidMessage {
        /// The invalid message string.
        string: String,
        /// The underlying parse error.
        #[source]
        cause: MessageParseError,
    },
}

impl ProtocolError {
    /// Whether the stream can keep going after this error.
    ///
    /// A malformed line has already been consumed from the buffer, so the
    /// next line can still be read. Everything else leaves the stream in an
    /// unknown position.
    pub fn is_recoverable(&self) -> bool {
        matches!(
            self,
            ProtocolError::InvalidMessage { .. }
                | ProtocolError::InvalidUtf8 { .. }
                | ProtocolError::IllegalControlChar(_)
        )
    }
}

/// Errors encountered when parsing IRC messages.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[non_exhaustive]
pub enum MessageParseError {
    /// Message was empty.
    #[error("empty message")]
    EmptyMessage,

    /// Not enough arguments for command.
    #[error("not enough arguments for {command}: expected {expected}, got {got}")]
    NotEnoughArguments {
        /// Command name.
        command: &'static str,
        /// Expected number of arguments.
        expected: usize,
        /// Actual number of arguments.
        got: usize,
    },

    /// Invalid message prefix.
    #[error("invalid prefix: {0}")]
    InvalidPrefix(String),

    /// Parsing error with position information.
    #[error("parsing failed at position {position}: {context}")]
    ParseContext {
        /// Byte position where parsing failed.
        position: usize,
        /// Description of what was being parsed.
        context: String,
    },
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display() {
        let err = ProtocolError::MessageTooLong {
            actual: 1024,
            limit: 512,
        };
        assert_eq!(
            format!("{}", err),
            "message too long: 1024 bytes (limit: 512)"
        );

        let err = MessageParseError::NotEnoughArguments {
            command: "JOIN",
            expected: 1,
            got: 0,
        };
        assert_eq!(
            format!("{}", err),
            "not enough arguments for JOIN: expected 1, got 0"
        );
    }

    #[test]
    fn test_protocol_error_chaining() {
        let protocol_err = ProtocolError::InvalidMessage {
            string: "!!!".to_string(),
            cause: MessageParseError::EmptyMessage,
        };

        let source = std::error::Error::source(&protocol_err);
        assert_eq!(source.unwrap().to_string(), "empty message");
    }

    #[test]
    fn test_recoverable_classification() {
        let bad_line = ProtocolError::InvalidMessage {
            string: String::new(),
            cause: MessageParseError::EmptyMessage,
        };
        assert!(bad_line.is_recoverable());

        let too_long = ProtocolError::MessageTooLong {
            actual: 10,
            limit: 5,
        };
        assert!(!too_long.is_recoverable());

        let io = ProtocolError::from(std::io::Error::new(
            std::io::ErrorKind::ConnectionReset,
            "reset",
        ));
        assert!(!io.is_recoverable());
    }
}
