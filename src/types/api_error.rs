use serde::{Deserialize, Serialize};

/// The error envelope returned by Google APIs.
///
/// ```json
/// {"error": {"code": 400, "message": "API key not valid.", "status": "INVALID_ARGUMENT"}}
/// ```
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ApiErrorResponse {
    /// The error payload.
    #[serde(default)]
    pub error: Option<ApiErrorObject>,
}

/// The payload of an [`ApiErrorResponse`].
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ApiErrorObject {
    /// HTTP status code echoed by the API.
    #[serde(default)]
    pub code: Option<u16>,

    /// Human-readable message.
    #[serde(default)]
    pub message: Option<String>,

    /// Canonical status, e.g. `RESOURCE_EXHAUSTED`.
    #[serde(default)]
    pub status: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_google_error_body() {
        let body = r#"{"error":{"code":429,"message":"Quota exceeded","status":"RESOURCE_EXHAUSTED"}}"#;
        let parsed: ApiErrorResponse = serde_json::from_str(body).unwrap();
        let error = parsed.error.unwrap();
        assert_eq!(error.code, Some(429));
        assert_eq!(error.message.as_deref(), Some("Quota exceeded"));
        assert_eq!(error.status.as_deref(), Some("RESOURCE_EXHAUSTED"));
    }
}
