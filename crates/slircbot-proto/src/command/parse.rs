//! IRC command parsing implementation.

use super::types::Command;
use crate::error::MessageParseError;
use crate::response::Response;

fn need(command: &'static str, args: &[&str], expected: usize) -> Result<(), MessageParseError> {
    if args.len() < expected {
        return Err(MessageParseError::NotEnoughArguments {
            command,
            expected,
            got: args.len(),
        });
    }
    Ok(())
}

fn owned(arg: Option<&&str>) -> Option<String> {
    arg.map(|s| (*s).to_owned())
}

impl Command {
    /// Parse a command from its name and arguments.
    ///
    /// Command names are case-insensitive. Three-digit names become
    /// [`Command::Response`]; names without a typed variant become
    /// [`Command::Raw`] with their original spelling.
    #[must_use = "command parsing result should be handled"]
    pub fn new(cmd: &str, args: Vec<&str>) -> Result<Command, MessageParseError> {
        let cmd_upper = cmd.to_ascii_uppercase();

        let command = match cmd_upper.as_str() {
            "PASS" => {
                need("PASS", &args, 1)?;
                Command::PASS(args[0].to_owned())
            }
            "NICK" => {
                need("NICK", &args, 1)?;
                Command::NICK(args[0].to_owned())
            }
            "USER" => {
                need("USER", &args, 4)?;
                Command::USER(args[0].to_owned(), args[1].to_owned(), args[3].to_owned())
            }
            "QUIT" => Command::QUIT(owned(args.first())),
            "JOIN" => {
                need("JOIN", &args, 1)?;
                Command::JOIN(args[0].to_owned(), owned(args.get(1)))
            }
            "PART" => {
                need("PART", &args, 1)?;
                Command::PART(args[0].to_owned(), owned(args.get(1)))
            }
            "INVITE" => {
                need("INVITE", &args, 2)?;
                Command::INVITE(args[0].to_owned(), args[1].to_owned())
            }
            "KICK" => {
                need("KICK", &args, 2)?;
                Command::KICK(args[0].to_owned(), args[1].to_owned(), owned(args.get(2)))
            }
            "PRIVMSG" => {
                need("PRIVMSG", &args, 2)?;
                Command::PRIVMSG(args[0].to_owned(), args[1].to_owned())
            }
            "NOTICE" => {
                need("NOTICE", &args, 2)?;
                Command::NOTICE(args[0].to_owned(), args[1].to_owned())
            }
            "PING" => {
                need("PING", &args, 1)?;
                Command::PING(args[0].to_owned(), owned(args.get(1)))
            }
            "PONG" => {
                need("PONG", &args, 1)?;
                Command::PONG(args[0].to_owned(), owned(args.get(1)))
            }
            "ERROR" => {
                need("ERROR", &args, 1)?;
                Command::ERROR(args[0].to_owned())
            }
            _ => {
                let args = args.into_iter().map(str::to_owned).collect();
                match cmd.parse::<Response>() {
                    Ok(resp) => Command::Response(resp, args),
                    Err(()) => Command::Raw(cmd.to_owned(), args),
                }
            }
        };

        Ok(command)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_privmsg() {
        let cmd = Command::new("privmsg", vec!["#chan", "hello world"]).unwrap();
        assert_eq!(
            cmd,
            Command::PRIVMSG("#chan".to_string(), "hello world".to_string())
        );
    }

    #[test]
    fn test_parse_numeric() {
        let cmd = Command::new("001", vec!["bot", "Welcome"]).unwrap();
        match cmd {
            Command::Response(resp, args) => {
                assert_eq!(resp, Response::RPL_WELCOME);
                assert_eq!(args, vec!["bot", "Welcome"]);
            }
            other => panic!("expected numeric, got {other:?}"),
        }
    }

    #[test]
    fn test_parse_unknown_is_raw() {
        let cmd = Command::new("Mode", vec!["#chan", "+o", "bot"]).unwrap();
        assert_eq!(
            cmd,
            Command::Raw(
                "Mode".to_string(),
                vec!["#chan".to_string(), "+o".to_string(), "bot".to_string()]
            )
        );
    }

    #[test]
    fn test_missing_arguments() {
        let err = Command::new("KICK", vec!["#chan"]).unwrap_err();
        assert_eq!(
            err,
            MessageParseError::NotEnoughArguments {
                command: "KICK",
                expected: 2,
                got: 1
            }
        );
    }

    #[test]
    fn test_user_drops_unused_param() {
        let cmd = Command::new("USER", vec!["bot", "0", "*", "Real Name"]).unwrap();
        assert_eq!(
            cmd,
            Command::USER("bot".to_string(), "0".to_string(), "Real Name".to_string())
        );
    }
}
