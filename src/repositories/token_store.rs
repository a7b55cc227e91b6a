//! The token store contract.
//!
//! The store exclusively owns token persistence. Individual row mutations
//! are atomic, but cross-request races on metadata are tolerated as
//! last-write-wins; "last seen" staleness has no security consequence.

use async_trait::async_trait;
use chrono::{DateTime, Utc};

use crate::error::StorageError;
use crate::models::session_token::{parse_recaller, SessionToken};
use crate::utils::secret::constant_time_eq;

/// Durable storage for session tokens, with soft-delete (revoke) and
/// hard-delete (purge) semantics.
///
/// Implementations never retry; failures of the underlying medium surface
/// as [`StorageError`] to the caller.
#[async_trait]
pub trait TokenStore: Send + Sync {
    /// Persist a new token for `subject_id` with a freshly generated secret
    /// and the observed client metadata.
    async fn create(
        &self,
        subject_id: i64,
        ip_address: Option<&str>,
        user_agent: Option<&str>,
    ) -> Result<SessionToken, StorageError>;

    /// Look up a token by id, excluding revoked rows.
    async fn find_live_by_id(&self, id: i64) -> Result<Option<SessionToken>, StorageError>;

    /// Look up a token by id, including revoked rows. Used by hard-delete
    /// paths.
    async fn find_any_by_id(&self, id: i64) -> Result<Option<SessionToken>, StorageError>;

    /// Persist mutations made to an existing token (touch).
    async fn save(&self, token: &SessionToken) -> Result<(), StorageError>;

    /// Soft-delete: mark the token revoked. The row stays until purged.
    async fn revoke(&self, token: &SessionToken) -> Result<(), StorageError>;

    /// Hard-delete: remove the row permanently. Irreversible.
    async fn purge(&self, token: &SessionToken) -> Result<(), StorageError>;

    /// All tokens with `updated_at <= cutoff`, optionally restricted to the
    /// given subjects. Revoked rows are included only when `include_revoked`
    /// is set. Ordering is unspecified.
    async fn find_stale(
        &self,
        cutoff: DateTime<Utc>,
        subject_ids: &[i64],
        include_revoked: bool,
    ) -> Result<Vec<SessionToken>, StorageError>;
}

/// Decode a recaller string and look up the live token it references.
///
/// Returns `Ok(None)` for malformed strings, unknown or revoked ids, and
/// secret mismatches. The secret comparison is constant-time.
pub async fn find_by_recaller(
    store: &dyn TokenStore,
    raw: &str,
) -> Result<Option<SessionToken>, StorageError> {
    let Some((id, secret)) = parse_recaller(raw) else {
        return Ok(None);
    };

    let Some(token) = store.find_live_by_id(id).await? else {
        return Ok(None);
    };

    if constant_time_eq(token.secret.as_bytes(), secret.as_bytes()) {
        Ok(Some(token))
    } else {
        Ok(None)
    }
}
