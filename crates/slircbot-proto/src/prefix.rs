//! Message sources.
//!
//! A prefix is either a server name or a `nick[!user][@host]` mask. Both
//! share the leading name, so they are kept in one struct and told apart
//! by [`Prefix::is_server`].

use std::fmt;

use crate::error::MessageParseError;

/// Where a message came from.
#[derive(Clone, Eq, PartialEq, Debug, Hash)]
pub struct Prefix {
    /// Nickname or server name.
    pub name: String,
    /// Username after `!`.
    pub user: Option<String>,
    /// Hostname after `@`.
    pub host: Option<String>,
}

impl Prefix {
    /// Validate and split a raw prefix (without the leading `:`).
    pub fn parse(raw: &str) -> Result<Self, MessageParseError> {
        if raw.is_empty() || raw.contains(|c: char| c == ' ' || c.is_control()) {
            return Err(MessageParseError::InvalidPrefix(raw.to_owned()));
        }
        Ok(Self::from(raw))
    }

    /// A bare name containing a dot is a server.
    pub fn is_server(&self) -> bool {
        self.user.is_none() && self.host.is_none() && self.name.contains('.')
    }

    /// The nickname of a user source.
    pub fn nick(&self) -> Option<&str> {
        (!self.is_server() && !self.name.is_empty()).then_some(self.name.as_str())
    }
}

impl From<&str> for Prefix {
    /// Split without validating.
    fn from(raw: &str) -> Self {
        let (rest, host) = match raw.split_once('@') {
            Some((rest, host)) => (rest, Some(host.to_owned())),
            None => (raw, None),
        };
        let (name, user) = match rest.split_once('!') {
            Some((name, user)) => (name, Some(user.to_owned())),
            None => (rest, None),
        };
        Prefix {
            name: name.to_owned(),
            user,
            host,
        }
    }
}

impl fmt::Display for Prefix {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.name)?;
        if let Some(user) = &self.user {
            write!(f, "!{user}")?;
        }
        if let Some(host) = &self.host {
            write!(f, "@{host}")?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_full_user_mask() {
        let prefix = Prefix::from("alice!ali@example.org");
        assert_eq!(prefix.nick(), Some("alice"));
        assert_eq!(prefix.user.as_deref(), Some("ali"));
        assert_eq!(prefix.host.as_deref(), Some("example.org"));
        assert_eq!(prefix.to_string(), "alice!ali@example.org");
    }

    #[test]
    fn test_server_name() {
        let prefix = Prefix::from("irc.example.org");
        assert!(prefix.is_server());
        assert_eq!(prefix.nick(), None);
        assert_eq!(prefix.name, "irc.example.org");
        assert_eq!(prefix.to_string(), "irc.example.org");
    }

    #[test]
    fn test_partial_masks() {
        let prefix = Prefix::from("bob");
        assert_eq!(prefix.nick(), Some("bob"));
        assert_eq!(prefix.to_string(), "bob");

        let prefix = Prefix::from("carol@host.example.org");
        assert!(!prefix.is_server());
        assert_eq!(prefix.nick(), Some("carol"));
        assert_eq!(prefix.to_string(), "carol@host.example.org");
    }

    #[test]
    fn test_parse_rejects_garbage() {
        assert!(Prefix::parse("").is_err());
        assert!(Prefix::parse("a b").is_err());
        assert!(Prefix::parse("nick!user@host").is_ok());
    }
}
