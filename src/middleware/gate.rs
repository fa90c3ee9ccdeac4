use crate::token::TokenRecord;

/// Per-request authentication phase of the landing endpoint.
///
/// Derived from the session's token and the inbound `code` parameter on every
/// request; never stored.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AuthPhase<'a> {
    /// No token and no code: show the login entry point.
    Anonymous,
    /// No token, but the provider sent the browser back with a code.
    Authenticating { code: &'a str },
    /// The session already holds a token.
    Authenticated(TokenRecord),
}

impl<'a> AuthPhase<'a> {
    /// Classify a request. A token wins over a code; an empty code counts as absent.
    #[must_use]
    pub fn classify(token: Option<TokenRecord>, code: Option<&'a str>) -> Self {
        match (token, code) {
            (Some(token), _) => Self::Authenticated(token),
            (None, Some(code)) if !code.is_empty() => Self::Authenticating { code },
            (None, _) => Self::Anonymous,
        }
    }

    #[must_use]
    pub fn is_authenticated(&self) -> bool {
        matches!(self, Self::Authenticated(_))
    }
}
