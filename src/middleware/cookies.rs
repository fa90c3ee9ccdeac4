use std::time::Duration;

use axum_extra::extract::PrivateCookieJar;
use axum_extra::extract::cookie::{Cookie, SameSite};

use super::config::GateSettings;
use crate::types::SessionId;

/// Create the encrypted session-id cookie.
pub(super) fn session_cookie(
    name: &str,
    session_id: &SessionId,
    ttl: Duration,
    secure: bool,
) -> Cookie<'static> {
    let max_age = time::Duration::try_from(ttl).unwrap_or(time::Duration::MAX);
    Cookie::build((name.to_string(), session_id.to_string()))
        .http_only(true)
        .secure(secure)
        .same_site(SameSite::Lax)
        .path("/".to_string())
        .max_age(max_age)
        .build()
}

/// Create removal cookie for session.
pub(super) fn clear_session_cookie(name: &str) -> Cookie<'static> {
    Cookie::build((name.to_string(), ""))
        .path("/".to_string())
        .max_age(time::Duration::ZERO)
        .build()
}

/// Get the session id from cookies.
pub(super) fn get_session_id(jar: &PrivateCookieJar, name: &str) -> Option<SessionId> {
    jar.get(name)
        .map(|c| c.value().to_string())
        .filter(|v| !v.is_empty())
        .map(SessionId)
}

/// Session id for this client, minting one (and its cookie) on first contact.
pub(super) fn ensure_session(
    jar: PrivateCookieJar,
    settings: &GateSettings,
) -> (PrivateCookieJar, SessionId) {
    if let Some(id) = get_session_id(&jar, &settings.session_cookie_name) {
        return (jar, id);
    }

    let id = SessionId::generate();
    let cookie = session_cookie(
        &settings.session_cookie_name,
        &id,
        settings.session_ttl,
        settings.secure_cookies,
    );
    tracing::debug!(session_id = %id, "New session");
    (jar.add(cookie), id)
}
