//! Error types for the CLI

use thiserror::Error;

/// Result type for CLI operations
pub type CliResult<T> = Result<T, CliError>;

/// Errors that can occur in the CLI
#[derive(Debug, Error)]
pub enum CliError {
    /// Configuration error
    #[error("Configuration error: {message}")]
    Config {
        /// Error message
        message: String,
    },

    /// Journey execution error
    #[error("Journey failed: {message}")]
    Journey {
        /// Error message
        message: String,
    },

    /// Invalid argument
    #[error("Invalid argument: {message}")]
    InvalidArgument {
        /// Error message
        message: String,
    },

    /// IO error
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Verificar library error
    #[error("Verificar error: {0}")]
    Verificar(#[from] verificar::VerificarError),
}

impl CliError {
    /// Create a configuration error
    #[must_use]
    pub fn config(message: impl Into<String>) -> Self {
        Self::Config {
            message: message.into(),
        }
    }

    /// Create a journey execution error
    #[must_use]
    pub fn journey(message: impl Into<String>) -> Self {
        Self::Journey {
            message: message.into(),
        }
    }

    /// Create an invalid argument error
    #[must_use]
    pub fn invalid_argument(message: impl Into<String>) -> Self {
        Self::InvalidArgument {
            message: message.into(),
        }
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display() {
        assert!(CliError::config("missing LOGIN_URL")
            .to_string()
            .contains("missing LOGIN_URL"));
        assert!(CliError::journey("logo never appeared")
            .to_string()
            .starts_with("Journey failed"));
    }

    #[test]
    fn test_library_errors_convert() {
        let err: CliError =
            verificar::VerificarError::teardown("browser already gone").into();
        assert!(err.to_string().contains("Teardown"));
    }
}
