use thiserror::Error;

#[derive(Error, Debug)]
pub enum PushError {
    #[error("Encoding error: {0}")]
    Encoding(String),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Schema error: {0}")]
    Schema(String),

    #[error("Transport error: {0}")]
    Transport(#[from] reqwest::Error),

    #[error("Timeout error: request took longer than {timeout_ms}ms")]
    Timeout { timeout_ms: u64 },

    #[error("Compression error: {0}")]
    Compression(#[from] snap::Error),

    #[error("Invalid metric snapshot: {0}")]
    Snapshot(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

}

/// Result type alias for remote-write operations
pub type Result<T> = std::result::Result<T, PushError>;

impl PushError {
    /// Creates a new encoding error
    pub fn encoding<S: Into<String>>(msg: S) -> Self {
        Self::Encoding(msg.into())
    }

    /// Creates a new configuration error
    pub fn config<S: Into<String>>(msg: S) -> Self {
        Self::Config(msg.into())
    }

    /// Creates a new schema error
    pub fn schema<S: Into<String>>(msg: S) -> Self {
        Self::Schema(msg.into())
    }

    /// Creates a new snapshot error
    pub fn snapshot<S: Into<String>>(msg: S) -> Self {
        Self::Snapshot(msg.into())
    }

    /// Returns true if retrying the push on a later cycle may succeed
    pub fn is_recoverable(&self) -> bool {
        match self {
            Self::Transport(_) | Self::Timeout { .. } => true,
            Self::Io(_) | Self::Snapshot(_) => true,
            _ => false,
        }
    }

    /// Returns the error category for logging
    pub fn category(&self) -> &'static str {
        match self {
            Self::Encoding(_) => "encoding",
            Self::Config(_) => "config",
            Self::Schema(_) => "schema",
            Self::Transport(_) => "network",
            Self::Timeout { .. } => "timeout",
            Self::Compression(_) => "compression",
            Self::Snapshot(_) => "snapshot",
            Self::Io(_) => "io",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_creation() {
        let err = PushError::encoding("timeseries.0.labels: __name__ label missing");
        assert_eq!(
            err.to_string(),
            "Encoding error: timeseries.0.labels: __name__ label missing"
        );
        assert_eq!(err.category(), "encoding");
    }

    #[test]
    fn test_error_recoverability() {
        assert!(PushError::Timeout { timeout_ms: 5000 }.is_recoverable());
        assert!(!PushError::config("invalid config").is_recoverable());
        assert!(!PushError::encoding("bad payload").is_recoverable());
        assert!(!PushError::schema("missing type").is_recoverable());
    }

    #[test]
    fn test_snapshot_errors() {
        let err = PushError::snapshot("metrics.json: expected value at line 1 column 1");
        assert_eq!(err.category(), "snapshot");
        assert!(err.is_recoverable());

        let err = PushError::from(std::io::Error::from(std::io::ErrorKind::NotFound));
        assert_eq!(err.category(), "io");
        assert!(err.is_recoverable());
    }

    #[test]
    fn test_timeout_error() {
        let err = PushError::Timeout { timeout_ms: 250 };
        assert_eq!(err.to_string(), "Timeout error: request took longer than 250ms");
        assert_eq!(err.category(), "timeout");
    }
}
