//! API response types.

use serde::{Deserialize, Serialize};

/// Health check response
#[derive(Debug, Serialize, Deserialize)]
pub struct HealthResponse {
    /// Service status
    pub status: String,
    /// Service version
    pub version: String,
    /// Whether the model artifact finished loading at startup
    pub model_loaded: bool,
    /// Name of the loaded model, when one is available
    pub model_name: Option<String>,
}

/// Error response
#[derive(Debug, Serialize, Deserialize)]
pub struct ErrorResponse {
    /// Error message
    pub error: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_health_response_serialization() {
        let resp = HealthResponse {
            status: "ok".to_string(),
            version: "0.1.0".to_string(),
            model_loaded: true,
            model_name: Some("flight-fare-linear".to_string()),
        };

        let json = serde_json::to_string(&resp).expect("serialize");
        assert!(json.contains("flight-fare-linear"));

        let parsed: HealthResponse = serde_json::from_str(&json).expect("parse");
        assert!(parsed.model_loaded);
        assert_eq!(parsed.status, "ok");
    }

    #[test]
    fn test_error_response_roundtrip() {
        let resp = ErrorResponse {
            error: "unsupported upload format".to_string(),
        };
        let json = serde_json::to_string(&resp).expect("serialize");
        let parsed: ErrorResponse = serde_json::from_str(&json).expect("parse");
        assert_eq!(parsed.error, resp.error);
    }
}
