//! Error taxonomy for the screening pipeline.

use thiserror::Error;

/// Errors produced by the screening pipeline and audit ledger.
#[derive(Debug, Error)]
pub enum ScreenError {
    #[error("sqlite error: {0}")]
    Sqlite(#[from] rusqlite::Error),

    #[error("io error: {0}")]
    Io(#[from] std::io::Error),

    /// Caller-supplied arrays disagree in length, are empty, or carry
    /// non-finite values.
    #[error("invalid input: {0}")]
    InvalidInput(String),

    /// A density matrix failed validation (non-square, vanishing trace).
    #[error("invalid quantum state: {0}")]
    InvalidState(String),
}

pub type Result<T> = std::result::Result<T, ScreenError>;
