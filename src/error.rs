use std::time::Duration;

/// Failure of an authorization-code exchange against the token endpoint.
#[derive(Debug, thiserror::Error)]
#[non_exhaustive]
pub enum ExchangeError {
    /// Network-level failure (connect, timeout, reset).
    #[error("transport error: {0}")]
    Transport(String),

    /// Token endpoint answered `429 Too Many Requests`.
    #[error("rate limited by authorization server")]
    RateLimited { retry_after: Option<Duration> },

    /// Token endpoint answered with a 5xx status.
    #[error("authorization server unavailable ({status}): {detail}")]
    UpstreamUnavailable {
        status: u16,
        detail: String,
        retry_after: Option<Duration>,
    },

    /// Token endpoint rejected the request with a 4xx status other than 429.
    #[error("authorization server rejected exchange ({status}): {detail}")]
    UpstreamRejected { status: u16, detail: String },

    /// 2xx response whose body is not a usable token response.
    #[error("invalid token response: {0}")]
    InvalidResponse(String),

    /// Retry budget consumed; `last` is the error of the final attempt.
    #[error("token exchange gave up after {attempts} attempts: {last}")]
    Exhausted {
        attempts: u32,
        last: Box<ExchangeError>,
    },
}

impl ExchangeError {
    /// Whether another attempt may succeed.
    #[must_use]
    pub fn is_retryable(&self) -> bool {
        matches!(
            self,
            Self::Transport(_) | Self::RateLimited { .. } | Self::UpstreamUnavailable { .. }
        )
    }

    /// Server-requested wait before the next attempt, from `Retry-After`.
    #[must_use]
    pub fn retry_after(&self) -> Option<Duration> {
        match self {
            Self::RateLimited { retry_after } | Self::UpstreamUnavailable { retry_after, .. } => {
                *retry_after
            }
            _ => None,
        }
    }

    /// Upstream HTTP status, when the failure came from a response.
    #[must_use]
    pub fn status(&self) -> Option<u16> {
        match self {
            Self::RateLimited { .. } => Some(429),
            Self::UpstreamUnavailable { status, .. } | Self::UpstreamRejected { status, .. } => {
                Some(*status)
            }
            Self::Exhausted { last, .. } => last.status(),
            Self::Transport(_) | Self::InvalidResponse(_) => None,
        }
    }
}

impl From<reqwest::Error> for ExchangeError {
    fn from(e: reqwest::Error) -> Self {
        if e.is_decode() {
            Self::InvalidResponse(e.to_string())
        } else {
            Self::Transport(e.to_string())
        }
    }
}
