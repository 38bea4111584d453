//! Error types for the two-tier cache
//!
//! Provides unified error handling using thiserror.

use thiserror::Error;

// == Remote Error Enum ==
/// Failure reported by the remote tier.
#[derive(Error, Debug)]
pub enum RemoteError {
    /// Transport or service error from the redis client
    #[error("redis error: {0}")]
    Redis(#[from] redis::RedisError),

    /// Backend could not serve the request
    #[error("remote unavailable: {0}")]
    Unavailable(String),

    /// Operation attempted after the client was closed
    #[error("remote connection closed")]
    Closed,
}

// == Cache Error Enum ==
/// Error type returned by the cached store and the host service.
#[derive(Error, Debug)]
pub enum CacheError {
    /// Remote tier failure, passed through untouched
    #[error(transparent)]
    Remote(#[from] RemoteError),

    /// A collaborator failed to initialize
    #[error("Initialization failed: {0}")]
    Init(String),

    /// Invalid request data
    #[error("Invalid request: {0}")]
    InvalidRequest(String),

    /// Internal server error
    #[error("Internal error: {0}")]
    Internal(String),
}

// == IntoResponse Implementation ==
#[cfg(feature = "server")]
mod http {
    use axum::{
        http::StatusCode,
        response::{IntoResponse, Response},
        Json,
    };

    use super::CacheError;
    use crate::models::ErrorBody;

    impl CacheError {
        /// Status code the host service answers with.
        pub fn status_code(&self) -> StatusCode {
            match self {
                CacheError::Remote(_) => StatusCode::BAD_GATEWAY,
                CacheError::InvalidRequest(_) => StatusCode::BAD_REQUEST,
                CacheError::Init(_) | CacheError::Internal(_) => {
                    StatusCode::INTERNAL_SERVER_ERROR
                }
            }
        }
    }

    impl IntoResponse for CacheError {
        fn into_response(self) -> Response {
            (self.status_code(), Json(ErrorBody::new(self.to_string()))).into_response()
        }
    }
}

// == Result Type Alias ==
/// Convenience Result type for the cache.
pub type Result<T> = std::result::Result<T, CacheError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_remote_error_is_transparent() {
        let err = CacheError::from(RemoteError::Unavailable("connection refused".to_string()));
        assert_eq!(err.to_string(), "remote unavailable: connection refused");
    }

    #[test]
    fn test_redis_error_passes_through() {
        let io = std::io::Error::new(std::io::ErrorKind::ConnectionReset, "reset by peer");
        let err = CacheError::from(RemoteError::Redis(redis::RedisError::from(io)));
        assert!(err.to_string().contains("reset by peer"));
        assert!(matches!(err, CacheError::Remote(RemoteError::Redis(_))));
    }

    #[cfg(feature = "server")]
    #[test]
    fn test_status_mapping() {
        use axum::{http::StatusCode, response::IntoResponse};

        let remote = CacheError::Remote(RemoteError::Closed).into_response();
        assert_eq!(remote.status(), StatusCode::BAD_GATEWAY);

        let invalid = CacheError::InvalidRequest("empty key".to_string()).into_response();
        assert_eq!(invalid.status(), StatusCode::BAD_REQUEST);

        let init = CacheError::Init("capacity".to_string()).into_response();
        assert_eq!(init.status(), StatusCode::INTERNAL_SERVER_ERROR);
    }
}
