//! tracing-subscriber setup for binaries and tests embedding folio

use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use crate::config::LogConfig;

/// Install a global subscriber. `RUST_LOG` overrides `config.level`.
///
/// Returns false if a global subscriber was already installed.
pub fn init(config: &LogConfig) -> bool {
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(&config.level));

    let result = match config.format.as_str() {
        "json" => tracing_subscriber::registry()
            .with(filter)
            .with(fmt::layer().json())
            .try_init(),
        _ => tracing_subscriber::registry()
            .with(filter)
            .with(fmt::layer())
            .try_init(),
    };
    result.is_ok()
}
