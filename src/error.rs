//! Error taxonomy for the ListenFirst API client.

use reqwest::{Method, StatusCode};
use std::fmt;
use std::time::Duration;

pub type Result<T, E = LfError> = std::result::Result<T, E>;

/// Classification of a non-2xx HTTP response.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HttpErrorKind {
    /// HTTP 400
    BadRequest,
    /// HTTP 401
    Unauthorized,
    /// HTTP 404
    RecordNotFound,
    /// HTTP 422
    RequestInvalid,
    /// HTTP 429
    QuotaSurpassed,
    /// HTTP 5xx
    ServerError,
    /// Any other non-2xx status
    Other,
}

impl HttpErrorKind {
    pub fn from_status(status: StatusCode) -> Self {
        match status {
            StatusCode::BAD_REQUEST => HttpErrorKind::BadRequest,
            StatusCode::UNAUTHORIZED => HttpErrorKind::Unauthorized,
            StatusCode::NOT_FOUND => HttpErrorKind::RecordNotFound,
            StatusCode::UNPROCESSABLE_ENTITY => HttpErrorKind::RequestInvalid,
            StatusCode::TOO_MANY_REQUESTS => HttpErrorKind::QuotaSurpassed,
            s if s.is_server_error() => HttpErrorKind::ServerError,
            _ => HttpErrorKind::Other,
        }
    }
}

impl fmt::Display for HttpErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            HttpErrorKind::BadRequest => "bad request",
            HttpErrorKind::Unauthorized => "unauthorized",
            HttpErrorKind::RecordNotFound => "record not found",
            HttpErrorKind::RequestInvalid => "request invalid",
            HttpErrorKind::QuotaSurpassed => "quota surpassed",
            HttpErrorKind::ServerError => "server error",
            HttpErrorKind::Other => "http error",
        };
        f.write_str(name)
    }
}

/// A request that reached the server but came back with a non-2xx status.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
#[error("{method} request to {url} failed with {status} ({kind}): {body}")]
pub struct HttpError {
    pub kind: HttpErrorKind,
    pub status: StatusCode,
    pub method: Method,
    pub url: String,
    pub body: String,
}

impl HttpError {
    pub fn new(status: StatusCode, method: Method, url: impl Into<String>, body: impl Into<String>) -> Self {
        Self {
            kind: HttpErrorKind::from_status(status),
            status,
            method,
            url: url.into(),
            body: body.into(),
        }
    }
}

#[derive(Debug, thiserror::Error)]
pub enum LfError {
    #[error(transparent)]
    Http(#[from] HttpError),

    #[error("network failure: {0}")]
    Network(#[from] reqwest::Error),

    #[error("authentication failed: {0}")]
    Auth(String),

    #[error("failed to decode response from {url}: {source}")]
    Decode {
        url: String,
        #[source]
        source: serde_json::Error,
    },

    #[error("gave up after {attempts} attempt(s) in {elapsed:?} without a final result")]
    RetryExhausted { attempts: u32, elapsed: Duration },

    #[error("fetch job {job_id} failed during execution")]
    JobFailed { job_id: u64 },

    #[error("fetch job {job_id} has not completed")]
    JobNotCompleted { job_id: u64 },

    #[error("fetch job {job_id} completed without page urls")]
    MissingPageUrls { job_id: u64 },

    #[error("cannot concatenate analytic responses with different columns")]
    SchemaMismatch,

    #[error("invalid retry policy: {0}")]
    InvalidPolicy(String),

    #[error("invalid header value for {0}")]
    InvalidHeader(&'static str),
}

impl LfError {
    /// Failures of the transport itself; these are what the retry executor retries.
    pub fn is_transport(&self) -> bool {
        match self {
            LfError::Http(_) => true,
            LfError::Network(e) => !e.is_builder(),
            _ => false,
        }
    }

    pub fn http_kind(&self) -> Option<HttpErrorKind> {
        match self {
            LfError::Http(e) => Some(e.kind),
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_status_mapping() {
        let cases = [
            (400, HttpErrorKind::BadRequest),
            (401, HttpErrorKind::Unauthorized),
            (404, HttpErrorKind::RecordNotFound),
            (422, HttpErrorKind::RequestInvalid),
            (429, HttpErrorKind::QuotaSurpassed),
            (500, HttpErrorKind::ServerError),
            (503, HttpErrorKind::ServerError),
            (403, HttpErrorKind::Other),
            (409, HttpErrorKind::Other),
            (302, HttpErrorKind::Other),
        ];

        for (code, kind) in cases {
            let status = StatusCode::from_u16(code).unwrap();
            assert_eq!(HttpErrorKind::from_status(status), kind, "status {}", code);
        }
    }

    #[test]
    fn test_http_error_display() {
        let err = HttpError::new(
            StatusCode::UNPROCESSABLE_ENTITY,
            Method::POST,
            "https://listenfirst.io/v20200626/analytics/fetch",
            r#"{"message":"group_by is required"}"#,
        );
        let msg = err.to_string();
        assert!(msg.starts_with("POST request to https://listenfirst.io/v20200626/analytics/fetch"));
        assert!(msg.contains("422"));
        assert!(msg.contains("request invalid"));
        assert!(msg.contains("group_by is required"));
    }

    #[test]
    fn test_is_transport() {
        let http = LfError::from(HttpError::new(
            StatusCode::INTERNAL_SERVER_ERROR,
            Method::GET,
            "http://localhost",
            "",
        ));
        assert!(http.is_transport());
        assert_eq!(http.http_kind(), Some(HttpErrorKind::ServerError));

        assert!(!LfError::JobFailed { job_id: 1 }.is_transport());
        assert!(!LfError::Auth("nope".to_string()).is_transport());
        assert_eq!(LfError::SchemaMismatch.http_kind(), None);
    }

    #[test]
    fn test_request_builder_errors_are_not_transport() {
        let err = reqwest::Client::new()
            .get("not a url")
            .build()
            .unwrap_err();
        assert!(err.is_builder());
        assert!(!LfError::from(err).is_transport());
    }

    #[test]
    fn test_job_failed_names_job() {
        let err = LfError::JobFailed { job_id: 4242 };
        assert!(err.to_string().contains("4242"));
    }
}
