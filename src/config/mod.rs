//! Configuration loading and management.
//!
//! This module is split into logical submodules:
//! - [`types`]: the document model (Config, ServerEntry, ChannelEntry, ...)
//!   and loading
//! - [`validation`]: structural checks run after parsing
//! - [`defaults`]: serde default functions

pub mod defaults;
mod types;
mod validation;

pub use types::{
    ChannelEntry, CommandAction, CommandEntry, Config, ConfigError, FilterEntry, Format,
    RegexEntry, ServerEntry, Settings,
};
pub use validation::{ValidationError, validate};
