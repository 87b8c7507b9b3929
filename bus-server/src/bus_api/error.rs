//! Upstream client error types.

/// Errors from the bus provider HTTP client.
#[derive(Debug, thiserror::Error)]
pub enum BusApiError {
    /// HTTP request failed (network error, timeout, etc.)
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// Response body was not the expected JSON envelope. `body` holds the
    /// first 500 characters for logging.
    #[error("JSON parse error: {message}")]
    Json {
        message: String,
        body: Option<String>,
    },

    /// Provider answered with a non-success `errorCode`
    #[error("upstream error {code}: {message}")]
    Api { code: String, message: String },

    /// Provider answered with a non-2xx HTTP status
    #[error("upstream returned HTTP {status}: {message}")]
    Status { status: u16, message: String },
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn error_display() {
        let err = BusApiError::Api {
            code: "8".into(),
            message: "요청 제한 초과".into(),
        };
        assert_eq!(err.to_string(), "upstream error 8: 요청 제한 초과");

        let err = BusApiError::Status {
            status: 503,
            message: "Service Unavailable".into(),
        };
        assert_eq!(err.to_string(), "upstream returned HTTP 503: Service Unavailable");

        let err = BusApiError::Json {
            message: "expected value".into(),
            body: Some("<html>".into()),
        };
        assert_eq!(err.to_string(), "JSON parse error: expected value");
    }
}
