//! Integration test common infrastructure.
//!
//! A scripted in-process protocol client for lifecycle properties, and a
//! tiny IRC server for end-to-end runs of the TCP client.

pub mod mock;
pub mod server;

#[allow(unused_imports)]
pub use mock::{Calls, Faults, MockClient, MockConnection, MockState};
#[allow(unused_imports)]
pub use server::TestServer;

use slircbot::Config;

/// Parse a JSON configuration, panicking on errors.
#[allow(dead_code)]
pub fn config(json: &str) -> Config {
    Config::parse(json, slircbot::config::Format::Json).expect("valid test config")
}
