use cartshelf_import::{DatabaseError, ImportError, SettingsError};
use thiserror::Error;

/// Errors that can occur during CLI command execution.
#[derive(Debug, Error)]
pub(crate) enum CliError {
    /// I/O error
    #[error("{0}")]
    Io(#[from] std::io::Error),

    /// Import failed; the message is shown verbatim
    #[error("{0}")]
    Import(#[from] ImportError),

    /// Release database could not be loaded
    #[error("Database error: {0}")]
    Database(#[from] DatabaseError),

    /// Configuration error
    #[error("Config error: {0}")]
    Config(#[from] SettingsError),

    /// Catch-all for other errors
    #[error("{0}")]
    Other(String),
}

impl CliError {
    pub(crate) fn other(msg: impl Into<String>) -> Self {
        Self::Other(msg.into())
    }
}
