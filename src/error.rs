use thiserror::Error;

/// Errors that can stop the application before or while the terminal is running
#[derive(Error, Debug)]
pub enum Error {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Invalid translation table: {0}")]
    Translations(#[from] serde_json::Error),

    #[error("Missing language in translation table: {0}")]
    MissingLanguage(String),

    #[error("Translation keys differ between languages: {0}")]
    KeyMismatch(String),

    #[error("Logging setup failed: {0}")]
    Logging(String),
}

/// Result type alias for storenav operations
pub type Result<T> = std::result::Result<T, Error>;
