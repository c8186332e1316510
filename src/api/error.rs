use thiserror::Error;

pub type Result<T> = std::result::Result<T, ApiError>;

/// Failures surfaced by the backend client.
#[derive(Debug, Error)]
pub enum ApiError {
    /// No response: connection refused, DNS failure, timeout, ...
    #[error("Network error: {0}")]
    Network(#[from] reqwest::Error),

    /// The backend answered with a non-2xx status.
    #[error("HTTP {status}: {message}")]
    Status {
        status: reqwest::StatusCode,
        message: String,
    },

    #[error("Failed to decode response from {path}: {source}")]
    Decode {
        path: String,
        #[source]
        source: serde_json::Error,
    },

    #[error("Invalid URL: {0}")]
    InvalidUrl(String),

    /// Rejected locally before any request was made.
    #[error("{0}")]
    Validation(String),
}

impl ApiError {
    pub fn status(&self) -> Option<reqwest::StatusCode> {
        match self {
            ApiError::Status { status, .. } => Some(*status),
            ApiError::Network(e) => e.status(),
            _ => None,
        }
    }
}

/// Pull a human-readable message out of an error body.
///
/// The backend reports failures as `{"detail": "..."}`; anything else is
/// passed through as text, and an empty body falls back to the status reason.
pub fn error_message(status: reqwest::StatusCode, body: &str) -> String {
    if let Ok(json) = serde_json::from_str::<serde_json::Value>(body) {
        match json.get("detail") {
            Some(serde_json::Value::String(detail)) => return detail.clone(),
            Some(other) if !other.is_null() => return other.to_string(),
            _ => {}
        }
    }

    let trimmed = body.trim();
    if !trimmed.is_empty() {
        return trimmed.to_string();
    }

    status
        .canonical_reason()
        .unwrap_or("Unknown error")
        .to_string()
}

#[cfg(test)]
mod tests {
    use super::*;
    use reqwest::StatusCode;

    #[test]
    fn test_error_message_detail_string() {
        let msg = error_message(StatusCode::NOT_FOUND, r#"{"detail": "Review not found"}"#);
        assert_eq!(msg, "Review not found");
    }

    #[test]
    fn test_error_message_detail_structured() {
        // FastAPI validation errors carry a list under `detail`
        let msg = error_message(
            StatusCode::UNPROCESSABLE_ENTITY,
            r#"{"detail": [{"loc": ["body", "code"], "msg": "field required"}]}"#,
        );
        assert!(msg.contains("field required"));
    }

    #[test]
    fn test_error_message_plain_text() {
        let msg = error_message(StatusCode::BAD_GATEWAY, "  upstream down \n");
        assert_eq!(msg, "upstream down");
    }

    #[test]
    fn test_error_message_empty_body() {
        let msg = error_message(StatusCode::INTERNAL_SERVER_ERROR, "");
        assert_eq!(msg, "Internal Server Error");
    }

    #[test]
    fn test_status_display() {
        let err = ApiError::Status {
            status: StatusCode::NOT_FOUND,
            message: "Review not found".to_string(),
        };
        assert_eq!(err.to_string(), "HTTP 404 Not Found: Review not found");
        assert_eq!(err.status(), Some(StatusCode::NOT_FOUND));
    }
}
