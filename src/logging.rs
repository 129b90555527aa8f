use tracing_subscriber::EnvFilter;

use crate::foundation::error::{FlipbookError, FlipbookResult};

pub const DEFAULT_LOG_LEVEL: &str = "info";

/// Install a stderr `fmt` subscriber.
///
/// `RUST_LOG` wins over `level` when set. Calling this again after a subscriber is installed is a
/// no-op.
pub fn init_logging(level: &str) -> FlipbookResult<()> {
    let filter = match EnvFilter::try_from_default_env() {
        Ok(filter) => filter,
        Err(_) => EnvFilter::try_new(level)
            .map_err(|e| FlipbookError::config(format!("invalid log level '{level}': {e}")))?,
    };
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .try_init();
    Ok(())
}
