//! Error handling for wavmix
//!
//! Only stream, container and format failures are errors. Out-of-range
//! accesses, clipping and save-time invariant violations are tolerated and
//! routed through [`crate::engine::Diagnostics`] instead.

use thiserror::Error;

/// Result type alias for wavmix operations
pub type Result<T> = std::result::Result<T, WavError>;

/// Main error type for wavmix operations
#[derive(Error, Debug)]
pub enum WavError {
    // Stream Errors
    #[error("Stream I/O failed while {context}: {source}")]
    StreamIo {
        context: String,
        #[source]
        source: std::io::Error,
    },

    // Container Errors
    #[error("Malformed container at {field}: {reason}")]
    MalformedContainer { field: String, reason: String },

    // Format Errors
    #[error("Unsupported audio format: {reason}")]
    UnsupportedFormat { reason: String },

    // Configuration Errors
    #[error("Invalid configuration: {reason}")]
    Config { reason: String },

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

impl WavError {
    /// Build a `StreamIo` error with a short description of the failed step
    pub fn stream(context: impl Into<String>, source: std::io::Error) -> Self {
        WavError::StreamIo {
            context: context.into(),
            source,
        }
    }

    /// Build a `MalformedContainer` error for a field or chunk tag
    pub fn malformed(field: impl Into<String>, reason: impl Into<String>) -> Self {
        WavError::MalformedContainer {
            field: field.into(),
            reason: reason.into(),
        }
    }

    /// Build an `UnsupportedFormat` error
    pub fn unsupported(reason: impl Into<String>) -> Self {
        WavError::UnsupportedFormat {
            reason: reason.into(),
        }
    }

    /// Get the error code for this error type
    pub fn error_code(&self) -> &'static str {
        match self {
            WavError::StreamIo { .. } => "STREAM_IO",
            WavError::MalformedContainer { .. } => "MALFORMED_CONTAINER",
            WavError::UnsupportedFormat { .. } => "UNSUPPORTED_FORMAT",
            WavError::Config { .. } => "CONFIG_ERROR",
            WavError::Serialization(_) => "SERIALIZATION_ERROR",
        }
    }

    /// Get recovery suggestions for this error
    pub fn recovery_suggestions(&self) -> Vec<&'static str> {
        match self {
            WavError::StreamIo { .. } => vec![
                "Check the file path is correct",
                "Verify the file is readable and the target directory is writable",
            ],
            WavError::MalformedContainer { .. } => vec![
                "The file may be truncated or not a RIFF/WAVE file",
                "Try re-exporting it as uncompressed PCM WAV",
            ],
            WavError::UnsupportedFormat { .. } => vec![
                "Convert to 8-bit or 16-bit PCM, mono or stereo",
            ],
            _ => vec![],
        }
    }
}
