use actix_web::http::StatusCode;
use actix_web::{HttpResponse, ResponseError};
use std::time::Duration;
use thiserror::Error;

pub type Result<T> = std::result::Result<T, WatchError>;

/// Failures raised by a backing engine adapter.
#[derive(Debug, Error)]
pub enum EngineError {
    #[error("Redis error: {0}")]
    Redis(#[from] redis::RedisError),

    #[error("engine call timed out after {0:?}")]
    Timeout(Duration),

    #[error("unexpected engine reply: {0}")]
    UnexpectedReply(String),

    #[error("engine unavailable: {0}")]
    Unavailable(String),
}

/// Outcome of a failed watch-store operation.
///
/// Handlers branch on the variant; the message text is for logs only and is
/// never written to a response body.
#[derive(Debug, Error)]
pub enum WatchError {
    #[error("stream quota of {limit} reached")]
    QuotaExceeded { limit: usize },

    #[error("invalid {field}: {reason}")]
    InvalidId {
        field: &'static str,
        reason: &'static str,
    },

    #[error("watch store {operation} failed: {source}")]
    Store {
        operation: &'static str,
        #[source]
        source: EngineError,
    },
}

impl WatchError {
    pub(crate) fn store(operation: &'static str) -> impl FnOnce(EngineError) -> Self {
        move |source| WatchError::Store { operation, source }
    }

    /// True for failures the caller can correct by changing the request.
    pub fn is_client_error(&self) -> bool {
        !matches!(self, WatchError::Store { .. })
    }

    /// Metric label for this failure class.
    pub fn outcome(&self) -> &'static str {
        match self {
            WatchError::QuotaExceeded { .. } => "quota_exceeded",
            WatchError::InvalidId { .. } => "invalid_id",
            WatchError::Store { .. } => "store_failure",
        }
    }
}

impl ResponseError for WatchError {
    fn status_code(&self) -> StatusCode {
        match self {
            WatchError::QuotaExceeded { .. } | WatchError::InvalidId { .. } => {
                StatusCode::BAD_REQUEST
            }
            WatchError::Store { .. } => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    fn error_response(&self) -> HttpResponse {
        HttpResponse::build(self.status_code()).finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_status_codes() {
        assert_eq!(
            WatchError::QuotaExceeded { limit: 3 }.status_code(),
            StatusCode::BAD_REQUEST
        );
        assert_eq!(
            WatchError::InvalidId {
                field: "user_id",
                reason: "must not be empty"
            }
            .status_code(),
            StatusCode::BAD_REQUEST
        );
        let err = WatchError::Store {
            operation: "add",
            source: EngineError::Timeout(Duration::from_millis(10)),
        };
        assert_eq!(err.status_code(), StatusCode::INTERNAL_SERVER_ERROR);
        assert!(!err.is_client_error());
    }

    #[actix_web::test]
    async fn test_error_response_has_no_body() {
        let err = WatchError::Store {
            operation: "list",
            source: EngineError::UnexpectedReply("secret internals".into()),
        };
        let resp = err.error_response();
        assert_eq!(resp.status(), StatusCode::INTERNAL_SERVER_ERROR);
        let bytes = actix_web::body::to_bytes(resp.into_body())
            .await
            .expect("body");
        assert!(bytes.is_empty());
    }

    #[test]
    fn test_store_error_keeps_source() {
        let err = WatchError::store("remove")(EngineError::Unavailable("down".into()));
        assert_eq!(err.outcome(), "store_failure");
        assert!(err.to_string().contains("remove"));
        assert!(std::error::Error::source(&err).is_some());
    }
}
