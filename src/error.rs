//! Error handling module for recform.
//!
//! Provides centralized error handling with proper error types using thiserror.
//! Domain-specific errors (navigation, payload, persistence) have their own
//! enums and convert into this one at the API boundary.

use thiserror::Error;

/// Main error type for the wizard engine
#[derive(Error, Debug)]
pub enum RecformError {
    /// Step navigation errors (invalid transition, busy engine)
    #[error("Navigation error: {0}")]
    Navigation(String),

    /// Section-local validation failures reported by an adapter
    #[error("Validation error: {0}")]
    Validation(String),

    /// Cross-section payload construction failures
    #[error("Payload error: {0}")]
    Payload(String),

    /// Persistence/transport failures
    #[error("Persistence error: {0}")]
    Persistence(String),

    /// Hydration failures (unrecognized server record shape)
    #[error("Hydration error: {0}")]
    Hydration(String),

    /// Engine state errors (missing adapter, torn-down session)
    #[error("State error: {0}")]
    State(String),

    /// JSON serialization/deserialization errors
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// General errors (catch-all for edge cases)
    #[error("{0}")]
    General(String),
}

/// Result type alias for wizard operations
pub type Result<T> = std::result::Result<T, RecformError>;

// Convenient error constructors
impl RecformError {
    /// Create a navigation error
    pub fn navigation(msg: impl Into<String>) -> Self {
        Self::Navigation(msg.into())
    }

    /// Create a validation error
    pub fn validation(msg: impl Into<String>) -> Self {
        Self::Validation(msg.into())
    }

    /// Create a payload error
    pub fn payload(msg: impl Into<String>) -> Self {
        Self::Payload(msg.into())
    }

    /// Create a persistence error
    pub fn persistence(msg: impl Into<String>) -> Self {
        Self::Persistence(msg.into())
    }

    /// Create a hydration error
    pub fn hydration(msg: impl Into<String>) -> Self {
        Self::Hydration(msg.into())
    }

    /// Create a state error
    pub fn state(msg: impl Into<String>) -> Self {
        Self::State(msg.into())
    }

    /// Create a general error
    pub fn general(msg: impl Into<String>) -> Self {
        Self::General(msg.into())
    }
}
