//! Line grammar.
//!
//! ```text
//! line    = [ "@" tags SPACE ] [ ":" source SPACE ] command *( SPACE param ) [ SPACE ] [ CRLF ]
//! command = 1*letter / 3digit
//! param   = ":" trailing / middle
//! ```
//!
//! A tag block is accepted and skipped. Runs of spaces count as one
//! separator.

use std::str::FromStr;

use nom::{
    branch::alt,
    bytes::complete::{is_not, take_till},
    character::complete::{alpha1, char, digit1, line_ending, space0, space1},
    combinator::{eof, opt, value, verify},
    multi::many0,
    sequence::{preceded, terminated, tuple},
    IResult,
};

use super::Message;
use crate::error::{MessageParseError, ProtocolError};

struct Parts<'a> {
    source: Option<&'a str>,
    command: &'a str,
    params: Vec<&'a str>,
}

fn tags(input: &str) -> IResult<&str, ()> {
    value((), terminated(preceded(char('@'), is_not(" ")), space1))(input)
}

fn source(input: &str) -> IResult<&str, &str> {
    terminated(preceded(char(':'), is_not(" ")), space1)(input)
}

fn command(input: &str) -> IResult<&str, &str> {
    alt((verify(digit1, |code: &str| code.len() == 3), alpha1))(input)
}

fn param(input: &str) -> IResult<&str, &str> {
    let trailing = preceded(char(':'), take_till(|c| c == '\r' || c == '\n'));
    preceded(space1, alt((trailing, is_not(" \r\n"))))(input)
}

fn line(input: &str) -> IResult<&str, Parts<'_>> {
    let (input, _) = opt(tags)(input)?;
    let (input, source) = opt(source)(input)?;
    let (input, command) = command(input)?;
    let (input, params) = many0(param)(input)?;
    let (input, _) = tuple((space0, opt(line_ending), eof))(input)?;
    Ok((
        input,
        Parts {
            source,
            command,
            params,
        },
    ))
}

fn parse_error(line: &str, err: nom::Err<nom::error::Error<&str>>) -> MessageParseError {
    match err {
        nom::Err::Error(e) | nom::Err::Failure(e) => MessageParseError::ParseContext {
            position: line.len() - e.input.len(),
            context: format!("{:?}", e.code),
        },
        nom::Err::Incomplete(_) => MessageParseError::ParseContext {
            position: line.len(),
            context: "unexpected end of line".to_owned(),
        },
    }
}

impl FromStr for Message {
    type Err = ProtocolError;

    fn from_str(s: &str) -> Result<Message, Self::Err> {
        let invalid = |cause| ProtocolError::InvalidMessage {
            string: s.to_owned(),
            cause,
        };

        if s.trim_end_matches(['\r', '\n']).is_empty() {
            return Err(invalid(MessageParseError::EmptyMessage));
        }
        let (_, parts) = line(s).map_err(|e| invalid(parse_error(s, e)))?;
        Message::new(parts.source, parts.command, parts.params).map_err(invalid)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::command::Command;
    use crate::prefix::Prefix;
    use crate::response::Response;

    fn parts(s: &str) -> Parts<'_> {
        line(s).map(|(_, p)| p).unwrap()
    }

    #[test]
    fn test_grammar() {
        let p = parts("PING");
        assert_eq!((p.source, p.command), (None, "PING"));
        assert!(p.params.is_empty());

        let p = parts(":nick!user@host PRIVMSG #channel :Hello there\r\n");
        assert_eq!(p.source, Some("nick!user@host"));
        assert_eq!(p.params, vec!["#channel", "Hello there"]);

        assert_eq!(parts("PRIVMSG #channel :").params, vec!["#channel", ""]);
        assert_eq!(parts("JOIN   #a    key  ").params, vec!["#a", "key"]);
        assert_eq!(parts("MODE #c :+o").params, vec!["#c", "+o"]);
    }

    #[test]
    fn test_tags_are_skipped() {
        let p = parts("@time=2023-01-01T00:00:00Z;msgid=x :nick PRIVMSG #ch :Hi");
        assert_eq!(p.source, Some("nick"));
        assert_eq!(p.params, vec!["#ch", "Hi"]);
    }

    #[test]
    fn test_command_forms() {
        assert!(line("123").is_ok());
        assert!(line("PING123").is_err());
        assert!(line("12").is_err());
        assert!(line("1234").is_err());
        assert!(line("").is_err());
        assert!(line(":onlyprefix").is_err());
    }

    #[test]
    fn test_error_position() {
        let Err(err) = "PING1 x".parse::<Message>() else {
            panic!("trailing digits must be rejected");
        };
        let ProtocolError::InvalidMessage { cause, .. } = err else {
            panic!("expected an invalid message");
        };
        assert!(matches!(cause, MessageParseError::ParseContext { position: 4, .. }));
    }

    #[test]
    fn test_parse_typed_commands() {
        let msg: Message = "PING :irc.example.org\r\n".parse().unwrap();
        assert_eq!(msg.command, Command::PING("irc.example.org".to_string(), None));

        let msg: Message = ":nick!user@host PRIVMSG #channel :Hello, world!\r\n"
            .parse()
            .unwrap();
        assert_eq!(msg.prefix, Some(Prefix::from("nick!user@host")));
        assert_eq!(
            msg.command,
            Command::PRIVMSG("#channel".to_string(), "Hello, world!".to_string())
        );

        let msg: Message = ":irc.example.org 001 bot :Welcome\r\n".parse().unwrap();
        assert!(matches!(msg.command, Command::Response(r, _) if r == Response::RPL_WELCOME));
    }

    #[test]
    fn test_empty_and_short_lines() {
        assert!("".parse::<Message>().is_err());
        assert!("\r\n".parse::<Message>().is_err());

        let err = "PRIVMSG #only\r\n".parse::<Message>().unwrap_err();
        assert!(err.is_recoverable());
    }
}
