use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};

use crate::error::ExchangeError;

/// Message shown when the authorization server could not be reached.
pub(crate) const RETRY_LATER_MESSAGE: &str =
    "The sign-in service is temporarily unavailable. Please try again in a few minutes.";

/// Request-boundary errors for the gate.
#[derive(Debug, thiserror::Error)]
pub enum AuthError {
    /// Missing or invalid configuration.
    #[error("Configuration error: {0}")]
    Config(String),

    /// Session store operation failed.
    #[error("Session store error: {0}")]
    Store(String),

    /// Authorization code could not be exchanged.
    #[error("Token exchange failed: {0}")]
    Exchange(#[from] ExchangeError),
}

impl IntoResponse for AuthError {
    fn into_response(self) -> Response {
        match self {
            Self::Exchange(ref e) => {
                tracing::error!(error = %e, upstream_status = ?e.status(), "Token exchange failed");
                (StatusCode::SERVICE_UNAVAILABLE, RETRY_LATER_MESSAGE).into_response()
            }
            Self::Store(_) | Self::Config(_) => {
                tracing::error!(error = %self, "Auth internal error");
                (StatusCode::INTERNAL_SERVER_ERROR, "Internal error").into_response()
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use axum::body::to_bytes;

    use super::*;

    #[tokio::test]
    async fn exchange_failure_is_503_without_detail() {
        let err = AuthError::from(ExchangeError::UpstreamRejected {
            status: 400,
            detail: "invalid_client: secret mismatch".into(),
        });
        let response = err.into_response();

        assert_eq!(response.status(), StatusCode::SERVICE_UNAVAILABLE);
        let body = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        let body = String::from_utf8(body.to_vec()).unwrap();
        assert_eq!(body, RETRY_LATER_MESSAGE);
        assert!(!body.contains("invalid_client"));
    }

    #[tokio::test]
    async fn store_failure_is_500() {
        let response = AuthError::Store("connection refused".into()).into_response();

        assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
        let body = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        assert_eq!(&body[..], b"Internal error");
    }
}
