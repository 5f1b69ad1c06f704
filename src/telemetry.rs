//! Logging setup and span constructors.

use tracing_subscriber::EnvFilter;

/// Install the global `fmt` subscriber. `RUST_LOG` overrides the default
/// `info` filter.
pub fn init() {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .with_target(true)
        .init();
}

/// Standardized span constructors.
pub mod spans {
    use tracing::{Span, info_span};

    /// Span for everything one session does.
    pub fn session(server: &str, index: usize) -> Span {
        info_span!("session", server = %server, index = index)
    }

    /// Span for one pass of the phase loop.
    pub fn round(number: u64) -> Span {
        info_span!("round", number = number)
    }
}
