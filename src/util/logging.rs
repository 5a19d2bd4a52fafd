use tracing_subscriber::{fmt, EnvFilter};

use crate::config::LogFormat;

/// Initializes tracing/logging based on environment variables.
///
/// Logs go to stderr; stdout belongs to the console.
pub fn init_tracing(format: LogFormat) {
    let env_filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));

    let subscriber = fmt()
        .with_env_filter(env_filter)
        .with_writer(std::io::stderr)
        .with_target(true)
        .with_thread_ids(false);

    match format {
        LogFormat::Text => subscriber.init(),
        LogFormat::Json => subscriber.json().init(),
    }
}
