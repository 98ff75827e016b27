use tracing_subscriber::EnvFilter;

use crate::cli::LogLevel;

/// Installs a stderr subscriber. `RUST_LOG` wins over `fallback`.
pub fn init(fallback: LogLevel) {
    let filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(fallback.as_str()))
        .unwrap_or_else(|_| EnvFilter::new("warn"));
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(true)
        .with_writer(std::io::stderr)
        .try_init();
}
