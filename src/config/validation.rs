//! Configuration validation.
//!
//! Runs after parsing and reports every problem at once, each with the
//! document path it was found at.

use super::Config;
use thiserror::Error;

/// Validation errors for configuration.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ValidationError {
    #[error("servers must contain at least one entry")]
    NoServers,
    #[error("{path} is required")]
    Missing { path: String },
    #[error("{path} must be between 1 and 65535")]
    InvalidPort { path: String },
    #[error("{path}: unsupported command `{name}`")]
    UnknownCommand { path: String, name: String },
}

impl ValidationError {
    fn missing(path: String) -> Self {
        ValidationError::Missing { path }
    }
}

/// Validate a configuration, returning all errors found.
pub fn validate(config: &Config) -> Result<(), Vec<ValidationError>> {
    let mut errors = Vec::new();

    if config.servers.is_empty() {
        errors.push(ValidationError::NoServers);
    }

    for (si, server) in config.servers.iter().enumerate() {
        let at = |field: &str| format!("servers[{si}].{field}");

        if server.name.is_empty() {
            errors.push(ValidationError::missing(at("name")));
        }
        if server.ip.is_empty() {
            errors.push(ValidationError::missing(at("ip")));
        }
        if server.port == 0 {
            errors.push(ValidationError::InvalidPort { path: at("port") });
        }
        if server.nick.is_empty() {
            errors.push(ValidationError::missing(at("nick")));
        }

        for (ci, channel) in server.channels.iter().enumerate() {
            if channel.name.is_empty() {
                errors.push(ValidationError::missing(at(&format!("channels[{ci}].name"))));
            }
        }

        for (ki, cmd) in server.cmds.iter().enumerate() {
            let cmd_at = |field: &str| at(&format!("cmds[{ki}].{field}"));
            match cmd.name.as_str() {
                "" => errors.push(ValidationError::missing(cmd_at("name"))),
                "msg" => {
                    if cmd.arg1.is_none() {
                        errors.push(ValidationError::missing(cmd_at("arg1")));
                    }
                    if cmd.arg2.is_none() {
                        errors.push(ValidationError::missing(cmd_at("arg2")));
                    }
                }
                other => errors.push(ValidationError::UnknownCommand {
                    path: at(&format!("cmds[{ki}]")),
                    name: other.to_owned(),
                }),
            }
        }
    }

    if errors.is_empty() {
        Ok(())
    } else {
        Err(errors)
    }
}
