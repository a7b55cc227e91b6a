//! Recaller channels: where the recaller string lives on the client/server
//! boundary.

pub mod cookie;
pub mod session;

use async_trait::async_trait;

use crate::error::StorageError;
use crate::models::session_token::SessionToken;
use crate::repositories::token_store::{find_by_recaller, TokenStore};

pub use cookie::CookieRecaller;
pub use session::{MemorySessionStore, SessionRecaller, SessionStore, SharedSession};

/// A storage medium capable of carrying a single recaller string under a
/// fixed key.
///
/// Channels are request-scoped. Immediate channels (session) apply writes as
/// they happen; deferred channels (cookie) queue mutations which the caller
/// emits with the response, later calls overriding earlier ones.
#[async_trait]
pub trait RecallerChannel: Send + Sync {
    /// Overwrite any existing value with the given recaller string.
    fn store_data(&mut self, recaller: &str);

    /// Pure check: does this channel currently hold data?
    fn has_data(&self) -> bool;

    /// The raw stored recaller string, if any.
    fn retrieve_data(&self) -> Option<String>;

    /// Unconditionally remove the stored value (queued for deferred
    /// channels).
    fn clear_data(&mut self);

    /// Whether data stored here outlives the request session ("remember
    /// me" semantics).
    fn persistent(&self) -> bool {
        false
    }

    /// Deferred Set-Cookie header values to emit with the response. Empty
    /// for immediate channels.
    fn pending_writes(&self) -> Vec<String> {
        Vec::new()
    }

    /// Decode the channel's stored string and look up a live session token.
    ///
    /// Absent or invalid data yields `Ok(None)`; only storage failures are
    /// errors.
    async fn retrieve_session_token(
        &self,
        store: &dyn TokenStore,
    ) -> Result<Option<SessionToken>, StorageError> {
        match self.retrieve_data() {
            Some(raw) => find_by_recaller(store, &raw).await,
            None => Ok(None),
        }
    }
}
