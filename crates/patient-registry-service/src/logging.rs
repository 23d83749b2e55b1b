//! Logging initialization for the service.

use tracing_subscriber::{fmt, prelude::*, EnvFilter};

/// Initialize the tracing subscriber.
///
/// Defaults to `info` for the service crates; the `RUST_LOG` environment
/// variable takes precedence when set.
pub fn init_logging() {
    let default_filter = "patient_registry_service=info,patient_registry_core=info";
    let env_filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_filter));

    let subscriber = tracing_subscriber::registry()
        .with(env_filter)
        .with(fmt::layer().with_target(true));

    // Ignore the error if a subscriber is already installed (tests).
    let _ = subscriber.try_init();
}
