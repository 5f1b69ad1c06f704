use std::fmt::{self, Write};

use super::types::Command;

/// Check if a string needs colon-prefixing as a trailing IRC argument.
fn needs_colon_prefix(s: &str) -> bool {
    s.is_empty() || s.contains(' ') || s.starts_with(':')
}

/// Reject parameters that would let a value smuggle in a second line.
fn validate_param(param: &str) -> fmt::Result {
    if param.bytes().any(|b| b == b'\r' || b == b'\n' || b == 0) {
        return Err(fmt::Error);
    }
    Ok(())
}

impl Command {
    /// Whether the last parameter is free text that is always sent with a
    /// leading colon.
    fn trailing_is_text(&self) -> bool {
        match self {
            Command::PRIVMSG(..) | Command::NOTICE(..) | Command::ERROR(_) | Command::USER(..) => {
                true
            }
            Command::QUIT(msg) | Command::PART(_, msg) | Command::KICK(_, _, msg) => msg.is_some(),
            _ => false,
        }
    }
}

impl fmt::Display for Command {
    /// Fails with [`fmt::Error`] when a parameter contains CR, LF or NUL, or
    /// when a middle parameter could not be represented on the wire.
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.name())?;

        let params = self.params();
        let text = self.trailing_is_text();
        for (i, param) in params.iter().enumerate() {
            validate_param(param)?;
            f.write_char(' ')?;
            if i + 1 == params.len() {
                if text || needs_colon_prefix(param) {
                    f.write_char(':')?;
                }
            } else if needs_colon_prefix(param) {
                return Err(fmt::Error);
            }
            f.write_str(param)?;
        }
        Ok(())
    }
}
