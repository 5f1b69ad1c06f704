//! Default value functions for configuration.
//!
//! Separated into its own module for clarity and reuse.

/// Returns `true` (for serde defaults).
pub fn default_true() -> bool {
    true
}

// =============================================================================
// Loop Timing Defaults
// =============================================================================

/// Upper bound on one shared readiness wait.
pub fn default_wait_timeout_ms() -> u64 {
    1000
}

/// Pause between a connection failure and the next session creation.
pub fn default_reconnect_delay_ms() -> u64 {
    2000
}

pub fn default_connect_timeout_ms() -> u64 {
    30_000
}

// =============================================================================
// Registration Defaults
// =============================================================================

pub fn default_username() -> &'static str {
    "nobody"
}

pub fn default_realname() -> &'static str {
    "noname"
}

pub fn default_port() -> u16 {
    6667
}
