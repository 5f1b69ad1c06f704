use crate::response::Response;

/// IRC command with its parameters.
///
/// Typed variants cover what a bot sends during registration and normal
/// operation plus the server messages it reacts to. Everything else is kept
/// verbatim in [`Command::Raw`].
#[derive(Clone, Debug, PartialEq, Eq)]
#[non_exhaustive]
pub enum Command {
    // === Connection Registration (RFC 2812 Section 3.1) ===
    /// `PASS password`
    PASS(String),
    /// `NICK nickname`
    NICK(String),
    /// `USER username mode realname`
    USER(String, String, String),
    /// `QUIT [message]`
    QUIT(Option<String>),

    // === Channel Operations (RFC 2812 Section 3.2) ===
    /// `JOIN channel [key]`
    JOIN(String, Option<String>),
    /// `PART channel [message]`
    PART(String, Option<String>),
    /// `INVITE nickname channel`
    INVITE(String, String),
    /// `KICK channel user [comment]`
    KICK(String, String, Option<String>),

    // === Messaging (RFC 2812 Section 3.3) ===
    /// `PRIVMSG target text`
    PRIVMSG(String, String),
    /// `NOTICE target text`
    NOTICE(String, String),

    // === Miscellaneous (RFC 2812 Section 3.7) ===
    /// `PING server [server2]`
    PING(String, Option<String>),
    /// `PONG server [server2]`
    PONG(String, Option<String>),
    /// `ERROR message`
    ERROR(String),

    /// Numeric reply with its parameters.
    Response(Response, Vec<String>),
    /// Any command without a typed variant.
    Raw(String, Vec<String>),
}

impl Command {
    /// The command name as it appears on the wire.
    pub fn name(&self) -> String {
        match self {
            Command::PASS(_) => "PASS".to_owned(),
            Command::NICK(_) => "NICK".to_owned(),
            Command::USER(..) => "USER".to_owned(),
            Command::QUIT(_) => "QUIT".to_owned(),
            Command::JOIN(..) => "JOIN".to_owned(),
            Command::PART(..) => "PART".to_owned(),
            Command::INVITE(..) => "INVITE".to_owned(),
            Command::KICK(..) => "KICK".to_owned(),
            Command::PRIVMSG(..) => "PRIVMSG".to_owned(),
            Command::NOTICE(..) => "NOTICE".to_owned(),
            Command::PING(..) => "PING".to_owned(),
            Command::PONG(..) => "PONG".to_owned(),
            Command::ERROR(_) => "ERROR".to_owned(),
            Command::Response(resp, _) => resp.to_string(),
            Command::Raw(name, _) => name.clone(),
        }
    }

    /// The parameters in wire order.
    pub fn params(&self) -> Vec<&str> {
        fn opt(v: &Option<String>) -> Option<&str> {
            v.as_deref()
        }

        match self {
            Command::PASS(a) | Command::NICK(a) | Command::ERROR(a) => vec![a.as_str()],
            Command::USER(user, mode, real) => {
                vec![user.as_str(), mode.as_str(), "*", real.as_str()]
            }
            Command::QUIT(msg) => opt(msg).into_iter().collect(),
            Command::JOIN(chan, key) | Command::PART(chan, key) => {
                std::iter::once(chan.as_str()).chain(opt(key)).collect()
            }
            Command::INVITE(a, b) | Command::PRIVMSG(a, b) | Command::NOTICE(a, b) => {
                vec![a.as_str(), b.as_str()]
            }
            Command::KICK(chan, user, comment) => [chan.as_str(), user.as_str()]
                .into_iter()
                .chain(opt(comment))
                .collect(),
            Command::PING(a, b) | Command::PONG(a, b) => {
                std::iter::once(a.as_str()).chain(opt(b)).collect()
            }
            Command::Response(_, args) | Command::Raw(_, args) => {
                args.iter().map(String::as_str).collect()
            }
        }
    }
}
