use std::future::Future;

use crate::token::TokenRecord;
use crate::types::SessionId;

/// Boxed error returned by store implementations.
pub type StoreError = Box<dyn std::error::Error + Send + Sync>;

/// Session-to-token binding.
///
/// Each session owns at most one [`TokenRecord`]. Implementations must allow
/// concurrent access from independent sessions; writes for a single session
/// come only from that session's own login flow, so last-writer-wins on one
/// key is acceptable. Expiry of sessions is the store's own business.
///
/// # Example
///
/// ```rust,ignore
/// impl SessionStore for RedisSessions {
///     async fn get(&self, session_id: &SessionId) -> Result<Option<TokenRecord>, StoreError> {
///         let raw: Option<String> = self.conn.get(session_id.as_str()).await?;
///         Ok(raw.map(|json| serde_json::from_str(&json)).transpose()?)
///     }
///
///     async fn set(&self, session_id: &SessionId, token: TokenRecord) -> Result<(), StoreError> {
///         let json = serde_json::to_string(&token)?;
///         self.conn.set_ex(session_id.as_str(), json, self.ttl).await?;
///         Ok(())
///     }
///
///     async fn remove(&self, session_id: &SessionId) -> Result<(), StoreError> {
///         self.conn.del(session_id.as_str()).await?;
///         Ok(())
///     }
/// }
/// ```
pub trait SessionStore: Send + Sync + 'static {
    /// Token bound to the session, if any.
    fn get(
        &self,
        session_id: &SessionId,
    ) -> impl Future<Output = Result<Option<TokenRecord>, StoreError>> + Send;

    /// Bind `token` to the session, replacing any previous one.
    fn set(
        &self,
        session_id: &SessionId,
        token: TokenRecord,
    ) -> impl Future<Output = Result<(), StoreError>> + Send;

    /// Drop the session's token (logout).
    fn remove(&self, session_id: &SessionId) -> impl Future<Output = Result<(), StoreError>> + Send;
}
