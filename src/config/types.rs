//! Core configuration types and loading.

use serde::Deserialize;
use std::path::{Path, PathBuf};
use std::time::Duration;
use thiserror::Error;
use tracing::warn;

use super::defaults;
use super::validation::{ValidationError, validate};
use crate::filter::{self, PatternError};

/// Configuration errors.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read config file {}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("failed to parse config: {0}")]
    Json(#[from] serde_json::Error),
    #[error("failed to parse config: {0}")]
    Toml(#[from] toml::de::Error),
    #[error("invalid config: {}", join_errors(.0))]
    Invalid(Vec<ValidationError>),
}

fn join_errors(errors: &[ValidationError]) -> String {
    errors
        .iter()
        .map(ToString::to_string)
        .collect::<Vec<_>>()
        .join("; ")
}

/// On-disk document format.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Format {
    Json,
    Toml,
}

impl Format {
    /// `.toml` files are TOML; everything else is read as JSON.
    pub fn from_path(path: &Path) -> Self {
        match path.extension().and_then(|ext| ext.to_str()) {
            Some(ext) if ext.eq_ignore_ascii_case("toml") => Format::Toml,
            _ => Format::Json,
        }
    }
}

/// Bot configuration.
#[derive(Debug, Clone, Deserialize)]
pub struct Config {
    /// One entry per network the bot connects to.
    #[serde(default)]
    pub servers: Vec<ServerEntry>,
    /// Loop timing and client behavior.
    #[serde(default)]
    pub settings: Settings,
}

impl Config {
    /// Load, validate and lint a configuration file.
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let content = std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        let config = Self::parse(&content, Format::from_path(path))?;

        for (location, error) in config.lint() {
            warn!(regex = %location, error = %error, "Regex will never match");
        }

        Ok(config)
    }

    /// Parse and validate a document held in memory.
    pub fn parse(content: &str, format: Format) -> Result<Self, ConfigError> {
        let config: Config = match format {
            Format::Json => serde_json::from_str(content)?,
            Format::Toml => toml::from_str(content)?,
        };
        validate(&config).map_err(ConfigError::Invalid)?;
        Ok(config)
    }

    /// A validated one-server configuration joining a single channel.
    pub fn single_server(
        host: &str,
        port: u16,
        nick: &str,
        channel: &str,
    ) -> Result<Self, ConfigError> {
        let config = Config {
            servers: vec![ServerEntry {
                name: host.to_owned(),
                ip: host.to_owned(),
                port,
                passwd: None,
                nick: nick.to_owned(),
                username: None,
                realname: None,
                cmds: Vec::new(),
                channels: vec![ChannelEntry {
                    name: channel.to_owned(),
                    passwd: None,
                    nickfilter: None,
                    filters: Vec::new(),
                }],
            }],
            settings: Settings::default(),
        };
        validate(&config).map_err(ConfigError::Invalid)?;
        Ok(config)
    }

    /// Compile every configured regex and report those that can never match.
    ///
    /// Matching stays fail-closed regardless; this only surfaces mistakes
    /// early.
    pub fn lint(&self) -> Vec<(String, PatternError)> {
        let mut problems = Vec::new();
        for (si, server) in self.servers.iter().enumerate() {
            for (ci, channel) in server.channels.iter().enumerate() {
                for (fi, filter) in channel.filters.iter().enumerate() {
                    for (ri, regex) in filter.regexes.iter().enumerate() {
                        if let Err(e) = filter::compile(regex) {
                            let location = format!(
                                "servers[{si}].channels[{ci}].filters[{fi}].regexes[{ri}]"
                            );
                            problems.push((location, e));
                        }
                    }
                }
            }
        }
        problems
    }

    pub fn servers(&self) -> &[ServerEntry] {
        &self.servers
    }

    /// Server at `index`. Panics when out of range.
    pub fn server(&self, index: usize) -> &ServerEntry {
        &self.servers[index]
    }
}

/// Loop timing and client behavior.
#[derive(Debug, Clone, Deserialize)]
pub struct Settings {
    /// Upper bound on one shared readiness wait.
    #[serde(default = "defaults::default_wait_timeout_ms")]
    pub wait_timeout_ms: u64,
    /// Delay between a connection failure and the next attempt.
    #[serde(default = "defaults::default_reconnect_delay_ms")]
    pub reconnect_delay_ms: u64,
    /// Give up on a TCP connect after this long.
    #[serde(default = "defaults::default_connect_timeout_ms")]
    pub connect_timeout_ms: u64,
    /// Report message origins as the bare nick instead of `nick!user@host`.
    #[serde(default = "defaults::default_true")]
    pub strip_nicks: bool,
}

impl Settings {
    pub fn wait_timeout(&self) -> Duration {
        Duration::from_millis(self.wait_timeout_ms)
    }

    pub fn reconnect_delay(&self) -> Duration {
        Duration::from_millis(self.reconnect_delay_ms)
    }

    pub fn connect_timeout(&self) -> Duration {
        Duration::from_millis(self.connect_timeout_ms)
    }
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            wait_timeout_ms: defaults::default_wait_timeout_ms(),
            reconnect_delay_ms: defaults::default_reconnect_delay_ms(),
            connect_timeout_ms: defaults::default_connect_timeout_ms(),
            strip_nicks: defaults::default_true(),
        }
    }
}

/// One IRC network.
#[derive(Debug, Clone, Deserialize)]
pub struct ServerEntry {
    /// Display name used in logs.
    #[serde(default)]
    pub name: String,
    /// Hostname or address to connect to.
    #[serde(default, alias = "host")]
    pub ip: String,
    pub port: u16,
    /// Server password sent with `PASS`.
    #[serde(default, alias = "password")]
    pub passwd: Option<String>,
    #[serde(default)]
    pub nick: String,
    #[serde(default)]
    pub username: Option<String>,
    #[serde(default)]
    pub realname: Option<String>,
    /// Commands run once registration completes.
    #[serde(default, alias = "commands")]
    pub cmds: Vec<CommandEntry>,
    /// Channels joined after the commands ran, in order.
    #[serde(default)]
    pub channels: Vec<ChannelEntry>,
}

impl ServerEntry {
    pub fn username(&self) -> &str {
        self.username
            .as_deref()
            .unwrap_or(defaults::default_username())
    }

    pub fn realname(&self) -> &str {
        self.realname
            .as_deref()
            .unwrap_or(defaults::default_realname())
    }

    /// Channel at `index`. Panics when out of range.
    pub fn channel(&self, index: usize) -> &ChannelEntry {
        &self.channels[index]
    }

    /// Command at `index`. Panics when out of range.
    pub fn command(&self, index: usize) -> &CommandEntry {
        &self.cmds[index]
    }

    /// The first channel whose name equals `name` exactly.
    pub fn find_channel(&self, name: &str) -> Option<&ChannelEntry> {
        self.channels.iter().find(|c| c.name == name)
    }
}

/// A channel to join and the filters applied to its traffic.
#[derive(Debug, Clone, Deserialize)]
pub struct ChannelEntry {
    #[serde(default)]
    pub name: String,
    /// Channel key.
    #[serde(default, alias = "password")]
    pub passwd: Option<String>,
    /// Only lines from this exact origin are filtered.
    #[serde(default)]
    pub nickfilter: Option<String>,
    #[serde(default)]
    pub filters: Vec<FilterEntry>,
}

impl ChannelEntry {
    /// Filter at `index`. Panics when out of range.
    pub fn filter(&self, index: usize) -> &FilterEntry {
        &self.filters[index]
    }

    /// Whether lines from `origin` go through this channel's filters.
    pub fn accepts_origin(&self, origin: &str) -> bool {
        self.nickfilter.as_deref().is_none_or(|nick| nick == origin)
    }

    /// How many recent lines per origin the longest filter needs.
    pub fn history_depth(&self) -> usize {
        self.filters
            .iter()
            .map(|f| f.regexes.len())
            .max()
            .unwrap_or(0)
    }
}

/// An ordered sequence of patterns matched against consecutive lines.
#[derive(Debug, Clone, Deserialize)]
pub struct FilterEntry {
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub regexes: Vec<RegexEntry>,
}

impl FilterEntry {
    /// Regex at `index`. Panics when out of range.
    pub fn regex(&self, index: usize) -> &RegexEntry {
        &self.regexes[index]
    }
}

/// A case-insensitive pattern and the names bound to its capture groups.
#[derive(Debug, Clone, Deserialize)]
pub struct RegexEntry {
    pub regex: String,
    #[serde(default)]
    pub vars: Vec<String>,
}

/// A command run once a server accepted the registration.
#[derive(Debug, Clone, Deserialize)]
pub struct CommandEntry {
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub arg1: Option<String>,
    #[serde(default)]
    pub arg2: Option<String>,
}

/// A recognized command with its arguments.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CommandAction<'a> {
    /// Send `text` to `target` as a PRIVMSG.
    Msg { target: &'a str, text: &'a str },
}

impl CommandEntry {
    /// The action this entry describes, or `None` for unknown names and
    /// incomplete arguments.
    pub fn action(&self) -> Option<CommandAction<'_>> {
        match (self.name.as_str(), &self.arg1, &self.arg2) {
            ("msg", Some(target), Some(text)) => Some(CommandAction::Msg { target, text }),
            _ => None,
        }
    }
}
