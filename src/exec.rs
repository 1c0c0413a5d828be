//! Common execution utilities for async and blocking clients.

use std::time::Duration;

use reqwest::StatusCode;
use serde::de::DeserializeOwned;
use tracing::warn;

use crate::error::{MAX_ERROR_BODY_CHARS, Result, StsError, truncate_str};
use crate::response::ApiErrorResponse;

/// Parses a successful response body.
pub(crate) fn parse_success_response<T: DeserializeOwned>(text: &str) -> Result<T> {
    serde_json::from_str(text).map_err(StsError::from)
}

/// Parses an error response body and returns the matching [`StsError`].
///
/// 5xx responses carry no usable detail and only keep their status. 4xx
/// responses are decoded from the JSON envelope when possible.
pub(crate) fn parse_error_response(status: StatusCode, text: &str) -> StsError {
    if status.is_server_error() {
        return StsError::Server {
            status: status.as_u16(),
        };
    }
    match serde_json::from_str::<ApiErrorResponse>(text) {
        Ok(api_err) => StsError::Api {
            request_id: api_err.request_id,
            host_id: api_err.host_id,
            code: api_err.code,
            message: api_err.message,
            recommend: api_err.recommend,
        },
        Err(_) => StsError::Http(format!(
            "HTTP {} with body: {}",
            status,
            truncate_str(text, MAX_ERROR_BODY_CHARS)
        )),
    }
}

/// Handles response parsing for both success and error cases.
pub(crate) fn handle_response<T: DeserializeOwned>(status: StatusCode, text: String) -> Result<T> {
    if status.is_success() {
        parse_success_response(&text)
    } else {
        let err = parse_error_response(status, &text);
        warn!(status = status.as_u16(), error = %err, "STS request failed");
        Err(err)
    }
}

/// Maps a transport failure, separating deadline expiry from everything else.
pub(crate) fn map_transport_error(err: reqwest::Error, timeout: Duration) -> StsError {
    if err.is_timeout() {
        warn!(timeout = ?timeout, "STS request timed out");
        StsError::Timeout(timeout)
    } else {
        StsError::HttpClient(err)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::response::AssumeRoleResponse;

    #[test]
    fn client_error_with_envelope() {
        let body = r#"{
            "RequestId": "req-1",
            "HostId": "sts.aliyuncs.com",
            "Code": "NoPermission",
            "Message": "You are not authorized to do this action.",
            "Recommend": "https://next.api.aliyun.com/troubleshoot"
        }"#;
        match parse_error_response(StatusCode::FORBIDDEN, body) {
            StsError::Api {
                request_id,
                host_id,
                code,
                message,
                recommend,
            } => {
                assert_eq!(request_id.as_deref(), Some("req-1"));
                assert_eq!(host_id.as_deref(), Some("sts.aliyuncs.com"));
                assert_eq!(code, "NoPermission");
                assert_eq!(message, "You are not authorized to do this action.");
                assert!(recommend.is_some());
            }
            other => panic!("expected StsError::Api, got: {:?}", other),
        }
    }

    #[test]
    fn client_error_without_envelope() {
        let err = parse_error_response(StatusCode::NOT_FOUND, "<html>nope</html>");
        match err {
            StsError::Http(msg) => {
                assert!(msg.contains("404"));
                assert!(msg.contains("<html>nope</html>"));
            }
            other => panic!("expected StsError::Http, got: {:?}", other),
        }
    }

    #[test]
    fn server_error_ignores_body() {
        let body = r#"{"Code": "InternalError", "Message": "oops", "RequestId": "r"}"#;
        let err = parse_error_response(StatusCode::INTERNAL_SERVER_ERROR, body);
        assert!(matches!(err, StsError::Server { status: 500 }));
    }

    #[test]
    fn long_bodies_are_truncated() {
        let body = "x".repeat(1000);
        match parse_error_response(StatusCode::BAD_REQUEST, &body) {
            StsError::Http(msg) => assert!(msg.len() < 300),
            other => panic!("expected StsError::Http, got: {:?}", other),
        }
    }

    #[test]
    fn success_body_must_be_json() {
        let result: Result<AssumeRoleResponse> = handle_response(StatusCode::OK, "not json".into());
        assert!(matches!(result, Err(StsError::Deserialize(_))));
    }
}
