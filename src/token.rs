use serde::{Deserialize, Serialize};
use time::{Duration, OffsetDateTime};

use crate::oauth::TokenResponse;

/// Access/refresh token pair bound to a session.
///
/// Expiry instants are absolute: they are computed once, at exchange time,
/// from the provider's relative `expires_in` / `refresh_token_expires_in`.
/// A record is never mutated; a new exchange produces a new record.
#[derive(Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TokenRecord {
    access_token: String,
    #[serde(default)]
    refresh_token: Option<String>,
    token_type: String,
    #[serde(with = "time::serde::rfc3339")]
    expires_at: OffsetDateTime,
    #[serde(default, with = "time::serde::rfc3339::option")]
    refresh_expires_at: Option<OffsetDateTime>,
}

impl TokenRecord {
    /// Build a record from a token endpoint response received at `now`.
    #[must_use]
    pub fn from_response(response: TokenResponse, now: OffsetDateTime) -> Self {
        Self {
            expires_at: now + seconds_as_millis(response.expires_in),
            refresh_expires_at: response
                .refresh_token_expires_in
                .map(|secs| now + seconds_as_millis(secs)),
            access_token: response.access_token,
            refresh_token: response.refresh_token,
            token_type: response.token_type,
        }
    }

    #[must_use]
    pub fn access_token(&self) -> &str {
        &self.access_token
    }

    #[must_use]
    pub fn refresh_token(&self) -> Option<&str> {
        self.refresh_token.as_deref()
    }

    #[must_use]
    pub fn token_type(&self) -> &str {
        &self.token_type
    }

    /// Instant at which the access token stops being valid.
    #[must_use]
    pub fn expires_at(&self) -> OffsetDateTime {
        self.expires_at
    }

    /// Instant at which the refresh token stops being valid, if one was issued.
    #[must_use]
    pub fn refresh_expires_at(&self) -> Option<OffsetDateTime> {
        self.refresh_expires_at
    }

    #[must_use]
    pub fn is_expired_at(&self, now: OffsetDateTime) -> bool {
        now >= self.expires_at
    }

    /// `Authorization` header value, e.g. `Bearer abc`.
    #[must_use]
    pub fn authorization_header(&self) -> String {
        format!("{} {}", self.token_type, self.access_token)
    }
}

impl std::fmt::Debug for TokenRecord {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TokenRecord")
            .field("access_token", &"<redacted>")
            .field(
                "refresh_token",
                &self.refresh_token.as_ref().map(|_| "<redacted>"),
            )
            .field("token_type", &self.token_type)
            .field("expires_at", &self.expires_at)
            .field("refresh_expires_at", &self.refresh_expires_at)
            .finish()
    }
}

fn seconds_as_millis(secs: u64) -> Duration {
    Duration::milliseconds(i64::try_from(secs.saturating_mul(1000)).unwrap_or(i64::MAX))
}
