//! Logging setup for the command line
//!
//! Logs go to stderr so stdout only ever carries the resolved version.

use tracing::debug;
use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::EnvFilter;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, clap::ValueEnum)]
pub enum LogFormat {
    #[default]
    Text,
    Json,
}

/// Filter used when `RUST_LOG` is not set
fn default_directive(debug: bool) -> &'static str {
    if debug {
        "tf_version_inspect=debug"
    } else {
        "info"
    }
}

/// Install the global subscriber.
///
/// The returned guard flushes buffered lines on drop and must be held until
/// the program exits.
pub fn init(debug: bool, format: LogFormat) -> WorkerGuard {
    let (writer, guard) = tracing_appender::non_blocking(std::io::stderr());
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_directive(debug)));

    let builder = tracing_subscriber::fmt()
        .with_writer(writer)
        .with_env_filter(filter)
        .with_target(debug);

    let installed = match format {
        LogFormat::Text => builder.try_init(),
        LogFormat::Json => builder.json().try_init(),
    };
    // An earlier subscriber stays in charge and receives this line
    if let Err(e) = installed {
        debug!("Keeping the already installed subscriber: {}", e);
    }

    guard
}
