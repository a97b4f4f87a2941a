//! # Structured Logging
//!
//! Diagnostics go to stderr through `tracing`; stdout is reserved for the
//! JSON summary so it can be piped straight into other tools.

use serde::{Deserialize, Serialize};
use tracing_subscriber::EnvFilter;

/// Log line format
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize, clap::ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum LogFormat {
    #[default]
    Text,
    Json,
}

/// Create the span that wraps one provisioning run.
///
/// ```rust,ignore
/// let span = provision_span!("create-zone", control_plane = "default", zone = "z1");
/// ```
#[macro_export]
macro_rules! provision_span {
    ($flow:expr) => {
        tracing::info_span!(
            "provision",
            flow = %$flow,
            run_id = %uuid::Uuid::new_v4()
        )
    };
    ($flow:expr, $($field:tt)*) => {
        tracing::info_span!(
            "provision",
            flow = %$flow,
            run_id = %uuid::Uuid::new_v4(),
            $($field)*
        )
    };
}

/// Filter used when `RUST_LOG` is unset
pub fn default_filter(verbose: bool) -> EnvFilter {
    let default_level = if verbose { "debug" } else { "info" };
    EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level))
}

/// Install the global subscriber. Safe to call more than once.
pub fn init_logging(verbose: bool, format: LogFormat) {
    let builder = tracing_subscriber::fmt()
        .with_env_filter(default_filter(verbose))
        .with_writer(std::io::stderr)
        .with_target(verbose);

    // Subscriber already set elsewhere (e.g. integration tests); ignore.
    let _ = match format {
        LogFormat::Text => builder.try_init(),
        LogFormat::Json => builder.json().try_init(),
    };
}
