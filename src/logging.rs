//! Logging subscriber initialisation.

use crate::interfaces::cli::args::{LogFormat, LoggingArgs};
use tracing_subscriber::util::{SubscriberInitExt, TryInitError};
use tracing_subscriber::{EnvFilter, fmt};

/// Installs the global subscriber. Logs go to stderr so stdout stays clean
/// for command output.
pub fn init(args: &LoggingArgs) -> Result<(), TryInitError> {
    let filter = EnvFilter::try_new(&args.log_level).unwrap_or_else(|_| EnvFilter::new("warn"));

    match args.log_format {
        LogFormat::Compact => fmt()
            .compact()
            .with_target(true)
            .with_env_filter(filter)
            .with_writer(std::io::stderr)
            .finish()
            .try_init(),
        LogFormat::Json => fmt()
            .json()
            .with_current_span(true)
            .with_target(true)
            .with_env_filter(filter)
            .with_writer(std::io::stderr)
            .finish()
            .try_init(),
    }
}
