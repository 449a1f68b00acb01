#![forbid(unsafe_code)]

//! Structured logging setup.
//!
//! Every subsystem logs through `tracing` with a dotted target
//! (`tilewm.layout`, `tilewm.focus`, `tilewm.edit`, `tilewm.console`,
//! `tilewm.wm`, `tilewm.config`). Hosts that do not install their own
//! subscriber can call [`try_init`] once at startup.
//!
//! The filter comes from the `TILEWM_LOG` environment variable using
//! `EnvFilter` directive syntax, falling back to the supplied default:
//!
//! ```text
//! TILEWM_LOG=tilewm.layout=debug,tilewm.console=trace
//! ```

use tracing_subscriber::EnvFilter;

pub use tracing::{
    debug, debug_span, error, error_span, info, info_span, trace, trace_span, warn, warn_span,
};

/// Environment variable consulted for filter directives.
pub const LOG_ENV: &str = "TILEWM_LOG";

/// Boxed error returned when a global subscriber is already installed.
pub type InitError = Box<dyn std::error::Error + Send + Sync + 'static>;

/// Build the filter from `TILEWM_LOG`, or from `default` if the variable is
/// unset or unparsable.
#[must_use]
pub fn env_filter(default: &str) -> EnvFilter {
    EnvFilter::try_from_env(LOG_ENV).unwrap_or_else(|_| EnvFilter::new(default))
}

/// Install a human-readable fmt subscriber as the global default.
///
/// Returns an error (and changes nothing) if a subscriber is already set.
pub fn try_init(default: &str) -> Result<(), InitError> {
    tracing_subscriber::fmt()
        .with_env_filter(env_filter(default))
        .with_target(true)
        .try_init()
}

/// [`try_init`] for hosts that do not care whether a subscriber was already
/// installed. Returns whether this call installed one.
pub fn init(default: &str) -> bool {
    try_init(default).is_ok()
}

/// Install a JSON-lines subscriber as the global default.
pub fn try_init_json(default: &str) -> Result<(), InitError> {
    tracing_subscriber::fmt()
        .json()
        .with_env_filter(env_filter(default))
        .with_current_span(true)
        .try_init()
}
