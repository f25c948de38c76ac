//! Result and error types for Verificar.
//!
//! Library-originated faults are caught at the boundary of each helper and
//! converted into one of these variants, a boolean, or a blank value; callers
//! never see the underlying driver's error hierarchy.

use crate::locator::LocatorKind;
use thiserror::Error;

/// Result type for Verificar operations
pub type VerificarResult<T> = Result<T, VerificarError>;

/// Errors that can occur in Verificar
#[derive(Debug, Error)]
pub enum VerificarError {
    /// Locator resolved to no matching element within the wait budget.
    /// The single distinguished "not found" kind; `exists` maps it to `false`.
    #[error("Could not find element {selector} using {kind}")]
    ElementNotFound {
        /// Raw locator pattern that failed to resolve
        selector: String,
        /// Locator strategy that was used
        kind: LocatorKind,
    },

    /// Locator kind has no resolution strategy in the active backend
    #[error("Locator kind {kind} is not supported by this backend")]
    UnsupportedLocator {
        /// The unsupported kind
        kind: LocatorKind,
    },

    /// Locator template rejected at construction or substitution time
    #[error("Invalid locator template {pattern:?}: {reason}")]
    InvalidTemplate {
        /// The offending pattern
        pattern: String,
        /// Why it was rejected
        reason: String,
    },

    /// Browser/session construction fault
    #[error("Failed to create session: {message}")]
    SessionCreation {
        /// Error message
        message: String,
    },

    /// Navigation or URL-wait fault
    #[error("Navigation to {url} failed: {message}")]
    Navigation {
        /// URL that failed
        url: String,
        /// Error message
        message: String,
    },

    /// Wait budget exhausted
    #[error("Operation timed out after {ms}ms")]
    Timeout {
        /// Timeout in milliseconds
        ms: u64,
    },

    /// Fault raised by the underlying driver during an interaction
    #[error("Driver error: {message}")]
    Driver {
        /// Error message
        message: String,
    },

    /// Session-quit fault; logged by the harness, never escalated
    #[error("Teardown failed: {message}")]
    Teardown {
        /// Error message
        message: String,
    },

    /// API endpoint returned a non-success status
    #[error("API error {status}: {body}")]
    Api {
        /// HTTP status code
        status: u16,
        /// Response body
        body: String,
    },

    /// Token response missing or malformed
    #[error("Token response error: {message}")]
    Token {
        /// Error message
        message: String,
    },

    /// HTTP transport error
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// I/O error
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// JSON error
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

impl VerificarError {
    /// Create the distinguished not-found error for a locator
    #[must_use]
    pub fn not_found(selector: impl Into<String>, kind: LocatorKind) -> Self {
        Self::ElementNotFound {
            selector: selector.into(),
            kind,
        }
    }

    /// Create a driver fault
    #[must_use]
    pub fn driver(message: impl Into<String>) -> Self {
        Self::Driver {
            message: message.into(),
        }
    }

    /// Create a session-creation fault
    #[must_use]
    pub fn session_creation(message: impl Into<String>) -> Self {
        Self::SessionCreation {
            message: message.into(),
        }
    }

    /// Create a navigation fault
    #[must_use]
    pub fn navigation(url: impl Into<String>, message: impl Into<String>) -> Self {
        Self::Navigation {
            url: url.into(),
            message: message.into(),
        }
    }

    /// Create a teardown fault
    #[must_use]
    pub fn teardown(message: impl Into<String>) -> Self {
        Self::Teardown {
            message: message.into(),
        }
    }

    /// Whether this error is the distinguished not-found kind
    #[must_use]
    pub const fn is_not_found(&self) -> bool {
        matches!(self, Self::ElementNotFound { .. })
    }
}
