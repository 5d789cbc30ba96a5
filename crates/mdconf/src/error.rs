//! CLI error types.

use mdconf_config::ConfigError;
use mdconf_confluence::SyncError;

/// CLI error type.
#[derive(Debug, thiserror::Error)]
pub(crate) enum CliError {
    #[error("Configuration error:\n{0}")]
    Config(#[from] ConfigError),

    #[error("{0}")]
    Sync(#[from] SyncError),

    /// Some documents failed; details were already printed.
    #[error("{0} document(s) failed to sync")]
    Failed(usize),
}
