use axum::extract::{Request, State};
use axum::middleware::Next;
use axum::response::{IntoResponse, Redirect, Response};
use axum_extra::extract::PrivateCookieJar;

use super::cookies;
use super::error::AuthError;
use super::state::GateState;
use super::traits::SessionStore;

/// Only let requests through whose session holds a token.
///
/// Without a token the visitor is redirected to the entry point and the
/// guarded handler never runs. With a token the handler runs unconditionally
/// and finds the [`TokenRecord`](crate::TokenRecord) in request extensions.
/// Token expiry is not checked here; sessions expire in the store.
pub(super) async fn require_token<S: SessionStore>(
    State(state): State<GateState<S>>,
    jar: PrivateCookieJar,
    mut request: Request,
    next: Next,
) -> Result<Response, AuthError> {
    let Some(session_id) = cookies::get_session_id(&jar, &state.settings.session_cookie_name)
    else {
        return Ok(Redirect::to(&state.settings.entry_path).into_response());
    };

    let token = state
        .store
        .get(&session_id)
        .await
        .map_err(|e| AuthError::Store(e.to_string()))?;

    match token {
        Some(token) => {
            request.extensions_mut().insert(token);
            Ok(next.run(request).await)
        }
        None => {
            tracing::debug!(session_id = %session_id, "No token for session, redirecting to entry point");
            Ok(Redirect::to(&state.settings.entry_path).into_response())
        }
    }
}
