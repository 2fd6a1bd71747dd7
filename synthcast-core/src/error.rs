//! Error types for synthcast

use thiserror::Error;

/// Main error type for synthcast operations
#[derive(Error, Debug)]
pub enum SynthcastError {
    /// No catalog theme matches the requested codec filter
    #[error("No video theme matches codec filter '{filter}'")]
    NoMatchingTheme {
        /// Codec filter that was requested
        filter: String,
    },

    /// A resolved resource path is absent from the store
    #[error("Resource not found: {path}")]
    ResourceNotFound {
        /// Logical resource path
        path: String,
    },

    /// A looper could not be built from an otherwise present resource
    #[error("Looper construction failed: {codec} - {reason}")]
    LooperConstruction {
        /// Codec name
        codec: String,
        /// Failure reason
        reason: String,
    },

    /// I/O operation failed
    #[error("I/O error: {source}")]
    Io {
        /// Underlying I/O error
        #[from]
        source: std::io::Error,
    },

    /// Invalid configuration provided
    #[error("Invalid configuration: {message}")]
    InvalidConfiguration {
        /// Error message
        message: String,
    },

    /// Catalog violates its ordering or consistency rules
    #[error("Invalid catalog: {reason}")]
    InvalidCatalog {
        /// Reason the catalog was rejected
        reason: String,
    },
}

/// Result type alias for synthcast operations
pub type SynthcastResult<T> = Result<T, SynthcastError>;

impl SynthcastError {
    /// Check if error is recoverable by the caller retrying the same request
    pub fn is_recoverable(&self) -> bool {
        match self {
            SynthcastError::Io { .. } => true,
            SynthcastError::NoMatchingTheme { .. } => false,
            SynthcastError::ResourceNotFound { .. } => false,
            SynthcastError::LooperConstruction { .. } => false,
            SynthcastError::InvalidConfiguration { .. } => false,
            SynthcastError::InvalidCatalog { .. } => false,
        }
    }

    /// Get error category
    pub fn category(&self) -> ErrorCategory {
        match self {
            SynthcastError::NoMatchingTheme { .. } => ErrorCategory::Selection,
            SynthcastError::ResourceNotFound { .. } => ErrorCategory::Resource,
            SynthcastError::LooperConstruction { .. } => ErrorCategory::Codec,
            SynthcastError::Io { .. } => ErrorCategory::System,
            SynthcastError::InvalidConfiguration { .. } => ErrorCategory::Configuration,
            SynthcastError::InvalidCatalog { .. } => ErrorCategory::Configuration,
        }
    }

    /// Shorthand for a codec-specific construction failure
    pub fn looper(codec: impl Into<String>, reason: impl Into<String>) -> Self {
        SynthcastError::LooperConstruction {
            codec: codec.into(),
            reason: reason.into(),
        }
    }
}

/// Error categories for classification
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorCategory {
    /// Theme or sample selection errors
    Selection,
    /// Missing bundled resources
    Resource,
    /// Container parsing and looper setup errors
    Codec,
    /// Configuration and catalog errors
    Configuration,
    /// System-level errors (I/O)
    System,
}
