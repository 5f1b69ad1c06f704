//! IRC command types.
//!
//! # Reference
//! - RFC 2812: Internet Relay Chat: Client Protocol

mod parse;
mod serialize;
mod types;

pub use self::types::Command;
