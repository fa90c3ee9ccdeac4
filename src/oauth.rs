use std::time::Duration;

use reqwest::header::{ACCEPT, RETRY_AFTER};
use serde::Deserialize;
use time::OffsetDateTime;
use url::Url;

use crate::error::ExchangeError;
use crate::retry::{RetryPolicy, parse_retry_after};
use crate::token::TokenRecord;

/// Authorization server endpoints and client registration.
///
/// Built once at startup and handed to [`AuthClient`]; nothing in this crate
/// reads credentials from the environment after that.
///
/// ```rust,ignore
/// use authcode_gate::OAuthConfig;
///
/// let config = OAuthConfig::new(
///     "my-client-id",
///     "my-client-secret",
///     "https://idp.example.com/oauth/authorize".parse()?,
///     "https://idp.example.com/oauth/token".parse()?,
///     "https://my-app.com/".parse()?,
/// )
/// .with_scope("read write");
/// ```
#[derive(Clone)]
#[non_exhaustive]
pub struct OAuthConfig {
    pub(crate) client_id: String,
    pub(crate) client_secret: String,
    pub(crate) authorize_url: Url,
    pub(crate) token_url: Url,
    pub(crate) redirect_uri: Url,
    pub(crate) scope: String,
    pub(crate) timeout: Duration,
}

impl OAuthConfig {
    /// Create a configuration from the required registration values.
    ///
    /// Scope defaults to empty and the transport timeout to 30 seconds.
    #[must_use]
    pub fn new(
        client_id: impl Into<String>,
        client_secret: impl Into<String>,
        authorize_url: Url,
        token_url: Url,
        redirect_uri: Url,
    ) -> Self {
        Self {
            client_id: client_id.into(),
            client_secret: client_secret.into(),
            authorize_url,
            token_url,
            redirect_uri,
            scope: String::new(),
            timeout: Duration::from_secs(30),
        }
    }

    /// Space-separated scopes, sent verbatim.
    #[must_use]
    pub fn with_scope(mut self, scope: impl Into<String>) -> Self {
        self.scope = scope.into();
        self
    }

    /// Per-request transport timeout for token endpoint calls.
    #[must_use]
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    #[must_use]
    pub fn client_id(&self) -> &str {
        &self.client_id
    }

    #[must_use]
    pub fn authorize_url(&self) -> &Url {
        &self.authorize_url
    }

    #[must_use]
    pub fn token_url(&self) -> &Url {
        &self.token_url
    }

    #[must_use]
    pub fn redirect_uri(&self) -> &Url {
        &self.redirect_uri
    }

    #[must_use]
    pub fn scope(&self) -> &str {
        &self.scope
    }

    #[must_use]
    pub fn timeout(&self) -> Duration {
        self.timeout
    }
}

impl std::fmt::Debug for OAuthConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("OAuthConfig")
            .field("client_id", &self.client_id)
            .field("client_secret", &"<redacted>")
            .field("authorize_url", &self.authorize_url.as_str())
            .field("token_url", &self.token_url.as_str())
            .field("redirect_uri", &self.redirect_uri.as_str())
            .field("scope", &self.scope)
            .field("timeout", &self.timeout)
            .finish()
    }
}

/// Token endpoint response body.
#[derive(Clone, Deserialize)]
#[non_exhaustive]
pub struct TokenResponse {
    pub access_token: String,
    #[serde(default = "default_token_type")]
    pub token_type: String,
    pub expires_in: u64,
    #[serde(default)]
    pub refresh_token: Option<String>,
    #[serde(default)]
    pub refresh_token_expires_in: Option<u64>,
}

fn default_token_type() -> String {
    "Bearer".into()
}

/// Authorization-code client: builds the login redirect and exchanges codes.
pub struct AuthClient {
    config: OAuthConfig,
    http: reqwest::Client,
    retry: RetryPolicy,
}

impl AuthClient {
    #[must_use]
    pub fn new(config: OAuthConfig) -> Self {
        Self {
            config,
            http: reqwest::Client::new(),
            retry: RetryPolicy::default(),
        }
    }

    /// Use a custom HTTP client (for connection pool reuse or testing).
    #[must_use]
    pub fn with_http_client(mut self, client: reqwest::Client) -> Self {
        self.http = client;
        self
    }

    /// Replace the default retry policy (3 retries, exponential backoff).
    #[must_use]
    pub fn with_retry_policy(mut self, policy: RetryPolicy) -> Self {
        self.retry = policy;
        self
    }

    #[must_use]
    pub fn config(&self) -> &OAuthConfig {
        &self.config
    }

    /// Provider-facing login URL carrying `state` through unmodified.
    ///
    /// Each query value is percent-encoded on its own. The client secret is
    /// never part of the URL.
    #[must_use]
    pub fn login_url(&self, state: &str) -> Url {
        let params = [
            ("client_id", self.config.client_id.as_str()),
            ("response_type", "code"),
            ("redirect_uri", self.config.redirect_uri.as_str()),
            ("scope", self.config.scope.as_str()),
            ("state", state),
        ];

        let query = params
            .iter()
            .map(|(k, v)| format!("{k}={}", urlencoding::encode(v)))
            .collect::<Vec<_>>()
            .join("&");

        let mut url = self.config.authorize_url.clone();
        let query = match url.query() {
            Some(existing) if !existing.is_empty() => format!("{existing}&{query}"),
            _ => query,
        };
        url.set_query(Some(&query));
        url
    }

    /// Exchange a one-time authorization code for a [`TokenRecord`].
    ///
    /// Transport failures, 5xx and 429 responses are retried under the
    /// client's [`RetryPolicy`].
    ///
    /// # Errors
    ///
    /// Returns [`ExchangeError::UpstreamRejected`] for 4xx responses other than
    /// 429, [`ExchangeError::InvalidResponse`] for unusable 2xx bodies, and
    /// [`ExchangeError::Exhausted`] once the retry budget is spent.
    pub async fn exchange_code(&self, code: &str) -> Result<TokenRecord, ExchangeError> {
        let params = [
            ("grant_type", "authorization_code"),
            ("client_id", self.config.client_id.as_str()),
            ("client_secret", self.config.client_secret.as_str()),
            ("code", code),
            ("redirect_uri", self.config.redirect_uri.as_str()),
        ];
        let params = &params;

        self.retry
            .run(|attempt| async move {
                tracing::debug!(attempt = attempt + 1, "Requesting token exchange");
                self.token_request(params).await
            })
            .await
    }

    /// Single POST to the token endpoint.
    async fn token_request(&self, params: &[(&str, &str)]) -> Result<TokenRecord, ExchangeError> {
        let response = self
            .http
            .post(self.config.token_url.clone())
            .header(ACCEPT, "application/json")
            .timeout(self.config.timeout)
            .form(params)
            .send()
            .await?;

        let response = Self::ensure_success(response).await?;
        let body = response.text().await?;

        let parsed: TokenResponse = serde_json::from_str(&body)
            .map_err(|e| ExchangeError::InvalidResponse(e.to_string()))?;
        let now = OffsetDateTime::now_utc();
        Ok(TokenRecord::from_response(parsed, now))
    }

    /// Checks HTTP response status; returns the response on success or a classified error.
    async fn ensure_success(response: reqwest::Response) -> Result<reqwest::Response, ExchangeError> {
        let status = response.status();
        if status.is_success() {
            return Ok(response);
        }

        let retry_after = response
            .headers()
            .get(RETRY_AFTER)
            .and_then(|v| v.to_str().ok())
            .and_then(parse_retry_after);

        if status == reqwest::StatusCode::TOO_MANY_REQUESTS {
            return Err(ExchangeError::RateLimited { retry_after });
        }

        let status = status.as_u16();
        let detail = response.text().await.unwrap_or_default();
        if (500..600).contains(&status) {
            Err(ExchangeError::UpstreamUnavailable {
                status,
                detail,
                retry_after,
            })
        } else {
            Err(ExchangeError::UpstreamRejected { status, detail })
        }
    }
}
