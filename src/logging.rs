use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;
use tracing_subscriber::{fmt, EnvFilter};

use crate::config::{LogConfig, LogFormat};

/// Install the global subscriber. Logs go to stderr.
///
/// `RUST_LOG` wins when set; otherwise `-v` flags raise `default_level`.
pub fn init(config: &LogConfig, default_level: &'static str) {
    let level = max_level(config.verbose, default_level);
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level));
    let registry = tracing_subscriber::registry().with(filter);

    match config.log_format {
        LogFormat::Json => registry
            .with(fmt::layer().json().with_current_span(false).with_writer(std::io::stderr))
            .init(),
        LogFormat::Text => registry
            .with(fmt::layer().with_target(true).with_writer(std::io::stderr))
            .init(),
    }
}

fn max_level(verbosity: u8, default_level: &'static str) -> &'static str {
    match verbosity {
        0 => default_level,
        1 => "debug",
        _ => "trace",
    }
}
