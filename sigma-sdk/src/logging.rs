//! Tracing subscriber initialisation for binaries built on the SDK.
//!
//! The filter can be overridden at runtime with `RUST_LOG`. Otherwise the
//! caller-supplied directive is used, e.g. `"info"` or
//! `"warn,sigma_distribution=debug"`.

use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

/// Error returned when a global subscriber is already installed.
pub type InitError = tracing_subscriber::util::TryInitError;

fn filter(level: &str) -> EnvFilter {
    EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level))
}

/// Install the global fmt subscriber, unless one is already set.
pub fn try_init_tracing(level: &str) -> Result<(), InitError> {
    tracing_subscriber::registry()
        .with(filter(level))
        .with(fmt::layer().with_target(true))
        .try_init()
}

/// Install the global fmt subscriber.
///
/// # Panics
///
/// Panics if a global subscriber has already been set.
pub fn init_tracing(level: &str) {
    tracing_subscriber::registry()
        .with(filter(level))
        .with(fmt::layer().with_target(true))
        .init();
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_second_init_is_reported_not_fatal() {
        let _ = try_init_tracing("debug");
        assert!(try_init_tracing("info").is_err());
    }
}
