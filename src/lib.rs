//! slircbot - a multi-server IRC bot.
//!
//! Connects to every configured network, runs the configured commands once
//! a server accepts the registration, joins channels and runs channel
//! traffic through per-channel regex filters.

pub mod bot;
pub mod client;
pub mod config;
pub mod dispatch;
pub mod filter;
pub mod session;
pub mod telemetry;

pub use bot::Bot;
pub use config::Config;
