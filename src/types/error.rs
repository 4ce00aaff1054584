use thiserror::Error;

/// nippo error types
#[derive(Error, Debug)]
pub enum NippoError {
    /// Period could not be resolved (end before start, unparsable offset)
    #[error("invalid period: {0}")]
    InvalidPeriod(String),

    /// Clock time was not a valid `HH:MM` value
    #[error("invalid time: {0}")]
    InvalidTime(String),

    /// Report store or project directory could not be read
    #[error("store error: {0}")]
    Store(String),

    /// Failed to parse JSON/JSONL
    #[error("parse error: {0}")]
    Parse(String),

    /// File I/O error
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),

    /// Configuration error
    #[error("config error: {0}")]
    Config(String),
}

impl NippoError {
    /// Whether the error was caused by the caller's input rather than the server
    pub fn is_client_error(&self) -> bool {
        matches!(self, Self::InvalidPeriod(_) | Self::InvalidTime(_))
    }
}

/// Result type alias for nippo
pub type Result<T> = std::result::Result<T, NippoError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display() {
        let err = NippoError::InvalidPeriod("end 2024-01-01 is before start 2024-02-01".into());
        assert_eq!(
            err.to_string(),
            "invalid period: end 2024-01-01 is before start 2024-02-01"
        );
    }

    #[test]
    fn test_io_error_conversion() {
        let io_err = std::io::Error::new(std::io::ErrorKind::NotFound, "file not found");
        let err: NippoError = io_err.into();
        assert!(err.to_string().contains("io error"));
    }

    #[test]
    fn test_client_error_classification() {
        assert!(NippoError::InvalidPeriod("x".into()).is_client_error());
        assert!(NippoError::InvalidTime("25:00".into()).is_client_error());
        assert!(!NippoError::Store("down".into()).is_client_error());
        assert!(!NippoError::Config("bad".into()).is_client_error());
    }
}
