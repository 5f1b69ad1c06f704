//! slircbot - multi-server IRC bot.

use std::path::PathBuf;
use std::process::ExitCode;
use std::str::FromStr;

use anyhow::Context;
use clap::Parser;
use slircbot::client::{TcpClient, WaitError};
use slircbot::config::defaults::default_port;
use slircbot::{Bot, Config, telemetry};
use tokio_util::sync::CancellationToken;
use tracing::{error, info};

#[derive(Parser)]
#[command(name = "slircbot")]
#[command(about = "Multi-server IRC bot with regex channel filters")]
#[command(version)]
struct Cli {
    /// Configuration file (`.toml`, anything else is read as JSON)
    #[arg(default_value = "testIrc.conf", conflicts_with = "server")]
    config: PathBuf,

    /// Connect to a single server instead of reading a configuration file
    #[arg(long, value_name = "HOST[:PORT]", requires_all = ["nick", "channel"])]
    server: Option<ServerAddr>,

    /// Nick for --server
    #[arg(long, requires = "server")]
    nick: Option<String>,

    /// Channel to join with --server
    #[arg(long, requires = "server")]
    channel: Option<String>,
}

#[derive(Debug, Clone)]
struct ServerAddr {
    host: String,
    port: u16,
}

impl FromStr for ServerAddr {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let parse_port = |port: &str| {
            port.parse::<u16>()
                .ok()
                .filter(|&p| p != 0)
                .ok_or_else(|| format!("invalid port `{port}`"))
        };
        let (host, port) = if let Some(rest) = s.strip_prefix('[') {
            // [v6addr] or [v6addr]:port
            let (host, tail) = rest
                .split_once(']')
                .ok_or_else(|| "missing `]` after IPv6 address".to_string())?;
            match tail {
                "" => (host, default_port()),
                _ => match tail.strip_prefix(':') {
                    Some(port) => (host, parse_port(port)?),
                    None => return Err(format!("unexpected `{tail}` after `]`")),
                },
            }
        } else {
            match s.split_once(':') {
                // a bare IPv6 address has more than one colon
                Some((_, rest)) if rest.contains(':') => (s, default_port()),
                Some((host, port)) => (host, parse_port(port)?),
                None => (s, default_port()),
            }
        };
        if host.is_empty() {
            return Err("missing host".to_string());
        }
        Ok(ServerAddr {
            host: host.to_owned(),
            port,
        })
    }
}

impl Cli {
    fn load_config(&self) -> anyhow::Result<Config> {
        match (&self.server, &self.nick, &self.channel) {
            (Some(addr), Some(nick), Some(channel)) => {
                Config::single_server(&addr.host, addr.port, nick, channel)
                    .context("invalid --server arguments")
            }
            _ => Config::load(&self.config)
                .with_context(|| format!("could not load {}", self.config.display())),
        }
    }
}

async fn run(cli: Cli) -> anyhow::Result<()> {
    let config = cli.load_config()?;

    let stop = CancellationToken::new();
    let on_interrupt = stop.clone();
    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            info!("Interrupt received, stopping");
            on_interrupt.cancel();
        }
    });

    let mut bot = Bot::new(&config, TcpClient::new(&config.settings));
    bot.run(&stop).await?;
    Ok(())
}

#[tokio::main(flavor = "current_thread")]
async fn main() -> ExitCode {
    telemetry::init();
    let cli = Cli::parse();

    match run(cli).await {
        Ok(()) => {
            info!("End of program");
            ExitCode::SUCCESS
        }
        Err(e) if e.downcast_ref::<WaitError>().is_some() => {
            error!(error = %e, "Wait failed");
            ExitCode::from(2)
        }
        Err(e) => {
            error!("Startup failed: {e:#}");
            ExitCode::FAILURE
        }
    }
}
