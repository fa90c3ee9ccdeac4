#![allow(dead_code)]

use std::time::Duration;

use authcode_gate::{AuthClient, OAuthConfig, RetryPolicy};
use axum::body::{Body, to_bytes};
use axum::http::header::{COOKIE, SET_COOKIE};
use axum::http::{Request, Response};

pub const CLIENT_ID: &str = "test-client";
pub const CLIENT_SECRET: &str = "test-secret";
pub const REDIRECT_URI: &str = "http://localhost:10000/";
pub const SCOPE: &str = "data.records:read user.email:read";

/// OAuth config pointing the token endpoint at `token_base` (e.g. a wiremock URI).
pub fn oauth_config(token_base: &str) -> OAuthConfig {
    OAuthConfig::new(
        CLIENT_ID,
        CLIENT_SECRET,
        "https://idp.example.com/oauth2/v1/authorize".parse().unwrap(),
        format!("{token_base}/oauth2/v1/token").parse().unwrap(),
        REDIRECT_URI.parse().unwrap(),
    )
    .with_scope(SCOPE)
    .with_timeout(Duration::from_secs(5))
}

/// Client with millisecond backoff so retry tests stay fast.
pub fn fast_client(token_base: &str) -> AuthClient {
    AuthClient::new(oauth_config(token_base)).with_retry_policy(
        RetryPolicy::new()
            .with_initial_backoff(Duration::from_millis(1))
            .with_max_backoff(Duration::from_millis(5)),
    )
}

pub fn token_json() -> serde_json::Value {
    serde_json::json!({
        "access_token": "tok",
        "expires_in": 3600,
        "refresh_token": "rt",
        "refresh_token_expires_in": 86400
    })
}

pub fn get(uri: &str, cookie: Option<&str>) -> Request<Body> {
    let mut builder = Request::builder().method("GET").uri(uri);
    if let Some(cookie) = cookie {
        builder = builder.header(COOKIE, cookie);
    }
    builder.body(Body::empty()).unwrap()
}

/// `name=value` part of the first `Set-Cookie` header, if any.
pub fn session_cookie(response: &Response<Body>) -> Option<String> {
    response
        .headers()
        .get(SET_COOKIE)
        .and_then(|v| v.to_str().ok())
        .and_then(|v| v.split(';').next())
        .map(|s| s.trim().to_string())
}

pub fn location(response: &Response<Body>) -> Option<String> {
    response
        .headers()
        .get("location")
        .and_then(|v| v.to_str().ok())
        .map(str::to_string)
}

pub async fn body_string(response: Response<Body>) -> String {
    let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
    String::from_utf8(bytes.to_vec()).unwrap()
}

/// The `href` of the first link in an HTML page, unescaped.
pub fn first_href(html: &str) -> String {
    let start = html.find("href=\"").expect("page has a link") + "href=\"".len();
    let end = start + html[start..].find('"').unwrap();
    html[start..end].replace("&amp;", "&")
}
