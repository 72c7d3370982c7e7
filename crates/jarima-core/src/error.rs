use thiserror::Error;

/// Top-level error type for jarima.
#[derive(Debug, Error)]
pub enum JarimaError {
    /// Error from the modem or serial transport.
    #[error("modem error: {0}")]
    Modem(String),

    /// Persistence error.
    #[error("store error: {0}")]
    Store(String),

    /// Configuration error.
    #[error("config error: {0}")]
    Config(String),

    /// I/O error.
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
}
