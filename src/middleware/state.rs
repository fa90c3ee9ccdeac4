use std::sync::Arc;

use axum::extract::FromRef;
use axum_extra::extract::cookie::Key;

use super::config::GateSettings;
use super::traits::SessionStore;
use crate::oauth::AuthClient;

/// Shared state for gate handlers and the guard middleware.
pub(super) struct GateState<S> {
    pub(super) client: Arc<AuthClient>,
    pub(super) store: Arc<S>,
    pub(super) settings: GateSettings,
}

// Manual Clone: avoid derive adding an `S: Clone` bound.
impl<S> Clone for GateState<S> {
    fn clone(&self) -> Self {
        Self {
            client: self.client.clone(),
            store: self.store.clone(),
            settings: self.settings.clone(),
        }
    }
}

// PrivateCookieJar requires Key to be extractable from state
impl<S: SessionStore> FromRef<GateState<S>> for Key {
    fn from_ref(state: &GateState<S>) -> Self {
        state.settings.cookie_key.clone()
    }
}
