use std::fmt;

use super::Message;

impl fmt::Display for Message {
    /// The wire line, CRLF included. Fails like the command's `Display`.
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if let Some(prefix) = &self.prefix {
            write!(f, ":{prefix} ")?;
        }
        write!(f, "{}\r\n", self.command)
    }
}

#[cfg(test)]
mod tests {
    use crate::message::Message;

    #[test]
    fn test_serialize_with_prefix() {
        let msg = Message::new(Some("bot!b@host"), "PRIVMSG", vec!["#chan", "hello there"]).unwrap();
        assert_eq!(msg.to_string(), ":bot!b@host PRIVMSG #chan :hello there\r\n");
    }

    #[test]
    fn test_parsed_line_reserializes() {
        let msg: Message = "@msgid=1 :alice!a@h JOIN #rust".parse().unwrap();
        assert_eq!(msg.to_string(), ":alice!a@h JOIN #rust\r\n");
    }
}
