//! Error types for the tarifa prediction service.
//!
//! Every fallible operation in the crate returns [`Result`]. Errors are
//! converted to HTTP status/message pairs at the request boundary in
//! [`crate::api`]; nothing propagates past a handler uncaught.

use thiserror::Error;

/// Crate-wide error type.
#[derive(Debug, Error)]
pub enum TarifaError {
    /// Uploaded file is not a spreadsheet container (wrong extension).
    #[error("unsupported upload format: {reason}")]
    UnsupportedFormat {
        /// What was wrong with the upload
        reason: String,
    },

    /// Upload bytes could not be decoded into tabular rows.
    #[error("failed to parse spreadsheet: {reason}")]
    Parse {
        /// Decoder failure detail
        reason: String,
    },

    /// The decoded table has no usable tabular structure.
    #[error("unrecognizable table structure: {reason}")]
    DataFormat {
        /// Structural problem detail
        reason: String,
    },

    /// No model artifact is loaded (startup load failed or has not finished).
    #[error("model is not available: {reason}")]
    ModelUnavailable {
        /// Why the model handle is empty
        reason: String,
    },

    /// The model call failed. The reason is logged, never sent to the caller.
    #[error("inference failed: {reason}")]
    Inference {
        /// Internal failure detail (log only)
        reason: String,
    },

    /// The persisted model artifact is malformed.
    #[error("invalid model artifact: {reason}")]
    InvalidArtifact {
        /// Validation failure detail
        reason: String,
    },

    /// Building the response archive failed.
    #[error("failed to build response archive: {reason}")]
    Archive {
        /// Encoder failure detail
        reason: String,
    },

    /// Invalid server configuration (bind address, CORS origin).
    #[error("invalid configuration: {reason}")]
    Config {
        /// Offending configuration detail
        reason: String,
    },

    /// I/O error
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

/// Crate-wide result alias.
pub type Result<T> = std::result::Result<T, TarifaError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display_includes_reason() {
        let err = TarifaError::UnsupportedFormat {
            reason: "expected .xlsx, got report.csv".to_string(),
        };
        assert!(err.to_string().contains("report.csv"));
    }

    #[test]
    fn test_io_error_conversion() {
        let io = std::io::Error::new(std::io::ErrorKind::NotFound, "missing");
        let err: TarifaError = io.into();
        assert!(matches!(err, TarifaError::Io(_)));
    }

    #[test]
    fn test_inference_error_is_distinct_from_parse() {
        let inference = TarifaError::Inference {
            reason: "x".to_string(),
        };
        let parse = TarifaError::Parse {
            reason: "x".to_string(),
        };
        assert_ne!(inference.to_string(), parse.to_string());
    }
}
