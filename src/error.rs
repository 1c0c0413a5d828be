use std::time::Duration;

use thiserror::Error;

/// Maximum characters to include in error message body for debugging.
pub(crate) const MAX_ERROR_BODY_CHARS: usize = 200;

/// Errors that can occur when using the STS client.
#[derive(Debug, Error)]
pub enum StsError {
    /// HTTP/network layer error from reqwest.
    #[error("HTTP request failed: {0}")]
    HttpClient(#[from] reqwest::Error),

    /// The request did not complete before its deadline.
    #[error("request timed out after {0:?}")]
    Timeout(Duration),

    /// The server answered with a 5xx status.
    #[error("server error: HTTP {status}")]
    Server { status: u16 },

    /// Unexpected HTTP response (non-JSON error body).
    #[error("HTTP error: {0}")]
    Http(String),

    /// The API rejected the request with a structured error envelope.
    #[error(
        "API error (RequestId: {}): [{code}] {message}",
        .request_id.as_deref().unwrap_or("-")
    )]
    Api {
        request_id: Option<String>,
        host_id: Option<String>,
        code: String,
        message: String,
        recommend: Option<String>,
    },

    /// Signature computation error.
    #[error("signature error: {0}")]
    Signature(String),

    /// Request could not be encoded into its canonical form.
    #[error("encoding error: {0}")]
    Encoding(String),

    /// Credential not found or invalid.
    #[error("credential error: {0}")]
    Credential(String),

    /// Response deserialization error.
    #[error("deserialization error: {0}")]
    Deserialize(#[from] serde_json::Error),

    /// Invalid client configuration.
    #[error("config error: {0}")]
    Config(String),

    /// Validation error for request parameters.
    #[error("validation error: {0}")]
    Validation(String),
}

impl StsError {
    /// Returns `true` if the error is potentially recoverable by retrying.
    ///
    /// The client itself never retries; this only tells callers which
    /// failures are worth handing to their own retry policy.
    pub fn is_retryable(&self) -> bool {
        match self {
            StsError::Timeout(_) | StsError::Server { .. } => true,
            StsError::HttpClient(e) => e.is_timeout() || e.is_connect(),
            StsError::Api { code, .. } => {
                code == "Throttling" || code.starts_with("Internal") || code.starts_with("Service")
            }
            StsError::Http(_)
            | StsError::Signature(_)
            | StsError::Encoding(_)
            | StsError::Credential(_)
            | StsError::Deserialize(_)
            | StsError::Config(_)
            | StsError::Validation(_) => false,
        }
    }

    /// Returns `true` if the request was abandoned because its deadline passed.
    pub fn is_timeout(&self) -> bool {
        matches!(self, StsError::Timeout(_))
    }

    /// Returns the request ID if this is an API error that carried one.
    pub fn request_id(&self) -> Option<&str> {
        match self {
            StsError::Api { request_id, .. } => request_id.as_deref(),
            _ => None,
        }
    }

    /// Returns the error code if this is an API error.
    pub fn error_code(&self) -> Option<&str> {
        match self {
            StsError::Api { code, .. } => Some(code),
            _ => None,
        }
    }

    /// Returns the HTTP status for server-side failures.
    pub fn status(&self) -> Option<u16> {
        match self {
            StsError::Server { status } => Some(*status),
            _ => None,
        }
    }
}

/// A specialized Result type for STS operations.
pub type Result<T> = std::result::Result<T, StsError>;

/// Truncates a string to at most `max_chars` characters on a valid UTF-8 boundary.
pub(crate) fn truncate_str(s: &str, max_chars: usize) -> &str {
    match s.char_indices().nth(max_chars) {
        Some((idx, _)) => &s[..idx],
        None => s,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn api_error(code: &str) -> StsError {
        StsError::Api {
            request_id: Some("req-123".to_string()),
            host_id: Some("sts.aliyuncs.com".to_string()),
            code: code.to_string(),
            message: "The specified RoleArn is invalid.".to_string(),
            recommend: None,
        }
    }

    #[test]
    fn api_error_display() {
        let msg = api_error("InvalidParameter").to_string();
        assert!(msg.contains("req-123"));
        assert!(msg.contains("InvalidParameter"));
        assert!(msg.contains("The specified RoleArn is invalid."));
    }

    #[test]
    fn api_error_display_without_request_id() {
        let err = StsError::Api {
            request_id: None,
            host_id: None,
            code: "NoPermission".to_string(),
            message: "denied".to_string(),
            recommend: None,
        };
        assert_eq!(err.to_string(), "API error (RequestId: -): [NoPermission] denied");
        assert!(err.request_id().is_none());
    }

    #[test]
    fn timeout_display_and_classification() {
        let err = StsError::Timeout(Duration::from_millis(250));
        assert_eq!(err.to_string(), "request timed out after 250ms");
        assert!(err.is_timeout());
        assert!(err.is_retryable());
    }

    #[test]
    fn server_error_carries_only_status() {
        let err = StsError::Server { status: 503 };
        assert_eq!(err.to_string(), "server error: HTTP 503");
        assert_eq!(err.status(), Some(503));
        assert!(err.is_retryable());
        assert!(!err.is_timeout());
    }

    #[test]
    fn retryable_api_codes() {
        assert!(api_error("Throttling").is_retryable());
        assert!(api_error("InternalError").is_retryable());
        assert!(api_error("ServiceUnavailable").is_retryable());
        assert!(!api_error("InvalidParameter").is_retryable());
    }

    #[test]
    fn local_errors_are_not_retryable() {
        assert!(!StsError::Validation("bad".into()).is_retryable());
        assert!(!StsError::Encoding("bad".into()).is_retryable());
        assert!(!StsError::Credential("missing".into()).is_retryable());
    }

    #[test]
    fn accessors_on_api_error() {
        let err = api_error("InvalidParameter");
        assert_eq!(err.request_id(), Some("req-123"));
        assert_eq!(err.error_code(), Some("InvalidParameter"));
        assert_eq!(err.status(), None);
    }

    #[test]
    fn encoding_error_display() {
        let err = StsError::Encoding("path must start with '/'".to_string());
        assert_eq!(err.to_string(), "encoding error: path must start with '/'");
    }

    #[test]
    fn truncate_str_long() {
        assert_eq!(truncate_str("hello world", 5), "hello");
        assert_eq!(truncate_str("hello", 10), "hello");
    }

    #[test]
    fn truncate_str_multibyte() {
        let s = "中文测试数据";
        assert_eq!(truncate_str(s, 4), "中文测试");
    }
}
