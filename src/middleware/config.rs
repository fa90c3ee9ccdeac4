use std::net::{IpAddr, Ipv4Addr, SocketAddr};
use std::time::Duration;

use axum_extra::extract::cookie::Key;
use url::Url;

use super::error::AuthError;
use crate::oauth::{AuthClient, OAuthConfig};

/// Shared gate settings used by both config and runtime state.
#[derive(Clone)]
pub(crate) struct GateSettings {
    pub(crate) cookie_key: Key,
    pub(crate) session_cookie_name: String,
    pub(crate) session_ttl: Duration,
    pub(crate) secure_cookies: bool,
    pub(crate) entry_path: String,
    pub(crate) protected_path: String,
}

impl GateSettings {
    fn defaults() -> Self {
        Self {
            cookie_key: Key::generate(),
            session_cookie_name: "__authcode_session".into(),
            session_ttl: Duration::from_secs(24 * 60 * 60),
            secure_cookies: false,
            entry_path: "/".into(),
            protected_path: "/home".into(),
        }
    }
}

/// Gate configuration: OAuth client plus session and listener settings.
///
/// Required field (`client`) is a constructor parameter; everything else has
/// a default. Use [`from_env()`](GateConfig::from_env) at process startup.
pub struct GateConfig {
    pub(super) client: AuthClient,
    pub(super) settings: GateSettings,
    pub(super) listen_addr: SocketAddr,
}

impl GateConfig {
    #[must_use]
    pub fn new(client: AuthClient) -> Self {
        Self {
            client,
            settings: GateSettings::defaults(),
            listen_addr: SocketAddr::new(IpAddr::V4(Ipv4Addr::UNSPECIFIED), 10000),
        }
    }

    /// Create config from the process environment.
    ///
    /// # Required env vars
    /// - `CLIENT_ID`, `CLIENT_SECRET`: client registration
    /// - `AUTH_AUTHORIZE_URL`, `AUTH_ACCESS_TOKEN_URL`: provider endpoints
    /// - `REDIRECT_URI`: where the provider sends the browser back with `code`
    ///
    /// # Optional env vars
    /// - `SCOPE`: space-separated scopes (default: empty)
    /// - `SESSION_SECRET`: cookie encryption secret, at least 32 bytes
    ///   (default: random per process, sessions do not survive restarts)
    /// - `HOST` / `PORT`: listener address (default `0.0.0.0:10000`)
    /// - `HTTP_TIMEOUT_SECS`: token endpoint timeout (default 30)
    /// - `SESSION_TTL_SECS`: session lifetime (default 86400)
    /// - `SECURE_COOKIES`: `"1"` or `"true"` to mark the cookie `Secure`
    ///
    /// # Errors
    ///
    /// Returns [`AuthError::Config`] if a required variable is missing or any
    /// value fails to parse.
    pub fn from_env() -> Result<Self, AuthError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Same as [`from_env`](Self::from_env) with a caller-supplied lookup.
    ///
    /// # Errors
    ///
    /// See [`from_env`](Self::from_env).
    pub fn from_lookup<F>(lookup: F) -> Result<Self, AuthError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let required = |key: &str| {
            lookup(key)
                .filter(|v| !v.trim().is_empty())
                .ok_or_else(|| AuthError::Config(format!("{key} is required")))
        };
        let url = |key: &str| -> Result<Url, AuthError> {
            required(key)?
                .parse()
                .map_err(|e| AuthError::Config(format!("{key}: {e}")))
        };
        let number = |key: &str, default: u64| -> Result<u64, AuthError> {
            lookup(key).map_or(Ok(default), |v| {
                v.trim()
                    .parse()
                    .map_err(|e| AuthError::Config(format!("{key}: {e}")))
            })
        };

        let client_id = required("CLIENT_ID")?;
        let client_secret = required("CLIENT_SECRET")?;
        let authorize_url = url("AUTH_AUTHORIZE_URL")?;
        let token_url = url("AUTH_ACCESS_TOKEN_URL")?;
        let redirect_uri = url("REDIRECT_URI")?;

        let oauth = OAuthConfig::new(client_id, client_secret, authorize_url, token_url, redirect_uri)
            .with_scope(lookup("SCOPE").unwrap_or_default())
            .with_timeout(Duration::from_secs(number("HTTP_TIMEOUT_SECS", 30)?));

        let host: IpAddr = match lookup("HOST") {
            Some(h) => h
                .trim()
                .parse()
                .map_err(|e| AuthError::Config(format!("HOST: {e}")))?,
            None => IpAddr::V4(Ipv4Addr::UNSPECIFIED),
        };
        let port = u16::try_from(number("PORT", 10000)?)
            .map_err(|e| AuthError::Config(format!("PORT: {e}")))?;

        let cookie_key = match lookup("SESSION_SECRET") {
            Some(secret) if secret.len() >= 32 => Key::derive_from(secret.as_bytes()),
            Some(_) => {
                return Err(AuthError::Config(
                    "SESSION_SECRET is set but too short (must be at least 32 bytes). \
                     Remove the env var to use an ephemeral key, or provide a longer secret."
                        .into(),
                ));
            }
            None => Key::generate(),
        };

        let secure = matches!(lookup("SECURE_COOKIES").as_deref(), Some("1") | Some("true"));

        Ok(Self::new(AuthClient::new(oauth))
            .with_cookie_key(cookie_key)
            .with_session_ttl(Duration::from_secs(number("SESSION_TTL_SECS", 86400)?))
            .with_secure_cookies(secure)
            .with_listen_addr(SocketAddr::new(host, port)))
    }

    #[must_use]
    pub fn with_cookie_key(mut self, key: Key) -> Self {
        self.settings.cookie_key = key;
        self
    }

    #[must_use]
    pub fn with_session_cookie_name(mut self, name: impl Into<String>) -> Self {
        self.settings.session_cookie_name = name.into();
        self
    }

    #[must_use]
    pub fn with_session_ttl(mut self, ttl: Duration) -> Self {
        self.settings.session_ttl = ttl;
        self
    }

    #[must_use]
    pub fn with_secure_cookies(mut self, secure: bool) -> Self {
        self.settings.secure_cookies = secure;
        self
    }

    #[must_use]
    pub fn with_listen_addr(mut self, addr: SocketAddr) -> Self {
        self.listen_addr = addr;
        self
    }

    /// Address the server should bind.
    #[must_use]
    pub fn listen_addr(&self) -> SocketAddr {
        self.listen_addr
    }

    /// Lifetime of a session and its token.
    #[must_use]
    pub fn session_ttl(&self) -> Duration {
        self.settings.session_ttl
    }

    #[must_use]
    pub fn client(&self) -> &AuthClient {
        &self.client
    }
}
