use std::sync::Arc;

use axum::Router;
use axum::extract::{Extension, Query, State};
use axum::middleware::from_fn_with_state;
use axum::response::{Html, IntoResponse, Redirect, Response};
use axum::routing::get;
use axum_extra::extract::PrivateCookieJar;
use serde::Deserialize;

use super::config::GateConfig;
use super::cookies;
use super::error::AuthError;
use super::gate::AuthPhase;
use super::guard::require_token;
use super::pages;
use super::state::GateState;
use super::traits::SessionStore;
use crate::token::TokenRecord;

/// Login gate bound to a session store.
///
/// ```rust,ignore
/// let gate = Gate::new(GateConfig::from_env()?, Arc::new(MemorySessionStore::new(ttl)));
/// let app = gate
///     .router()
///     .merge(gate.protect(Router::new().route("/reports", get(reports))));
/// ```
pub struct Gate<S> {
    state: GateState<S>,
}

impl<S: SessionStore> Gate<S> {
    #[must_use]
    pub fn new(config: GateConfig, store: Arc<S>) -> Self {
        Self {
            state: GateState {
                client: Arc::new(config.client),
                store,
                settings: config.settings,
            },
        }
    }

    /// Entry point (`/`), the protected example page (`/home`) and `/logout`.
    pub fn router(&self) -> Router {
        let settings = &self.state.settings;
        let guarded_home =
            get(home).route_layer(from_fn_with_state(self.state.clone(), require_token::<S>));

        Router::new()
            .route(&settings.entry_path, get(landing::<S>))
            .route(&settings.protected_path, guarded_home)
            .route("/logout", get(logout::<S>).post(logout::<S>))
            .with_state(self.state.clone())
    }

    /// Put every route of `routes` behind the session-token guard.
    pub fn protect(&self, routes: Router) -> Router {
        routes.route_layer(from_fn_with_state(self.state.clone(), require_token::<S>))
    }
}

/// Create the gate router for `config` and `store`.
pub fn gate_routes<S: SessionStore>(config: GateConfig, store: Arc<S>) -> Router {
    Gate::new(config, store).router()
}

// ── Landing ────────────────────────────────────────────────────────

#[derive(Deserialize)]
struct LandingParams {
    code: Option<String>,
    error: Option<String>,
    error_description: Option<String>,
}

async fn landing<S: SessionStore>(
    State(state): State<GateState<S>>,
    jar: PrivateCookieJar,
    Query(params): Query<LandingParams>,
) -> Result<Response, AuthError> {
    let (jar, session_id) = cookies::ensure_session(jar, &state.settings);

    let token = state
        .store
        .get(&session_id)
        .await
        .map_err(|e| AuthError::Store(e.to_string()))?;

    match AuthPhase::classify(token, params.code.as_deref()) {
        AuthPhase::Authenticated(_) => {
            Ok((jar, Redirect::to(&state.settings.protected_path)).into_response())
        }
        AuthPhase::Anonymous => {
            if let Some(error) = &params.error {
                let desc = params.error_description.as_deref().unwrap_or("Unknown error");
                tracing::warn!(error = %error, description = %desc, "Authorization denied by provider");
            }
            let login_url = state.client.login_url(&state.settings.protected_path);
            let page = pages::login_page(&login_url, params.error.is_some());
            Ok((jar, Html(page)).into_response())
        }
        AuthPhase::Authenticating { code } => {
            let token = state.client.exchange_code(code).await?;

            state
                .store
                .set(&session_id, token)
                .await
                .map_err(|e| AuthError::Store(e.to_string()))?;

            // Cookie lifetime restarts with the token's.
            let jar = jar.add(cookies::session_cookie(
                &state.settings.session_cookie_name,
                &session_id,
                state.settings.session_ttl,
                state.settings.secure_cookies,
            ));

            tracing::info!(session_id = %session_id, "Authorization code exchanged");
            Ok((jar, Redirect::to(&state.settings.protected_path)).into_response())
        }
    }
}

// ── Home ───────────────────────────────────────────────────────────

async fn home(Extension(token): Extension<TokenRecord>) -> Html<String> {
    Html(pages::home_page(&token))
}

// ── Logout ─────────────────────────────────────────────────────────

async fn logout<S: SessionStore>(
    State(state): State<GateState<S>>,
    jar: PrivateCookieJar,
) -> (PrivateCookieJar, Redirect) {
    if let Some(session_id) = cookies::get_session_id(&jar, &state.settings.session_cookie_name) {
        if let Err(e) = state.store.remove(&session_id).await {
            tracing::warn!(error = %e, "Session removal failed during logout");
        } else {
            tracing::info!(session_id = %session_id, "Signed out");
        }
    }

    let clear_cookie = cookies::clear_session_cookie(&state.settings.session_cookie_name);
    (jar.remove(clear_cookie), Redirect::to(&state.settings.entry_path))
}
