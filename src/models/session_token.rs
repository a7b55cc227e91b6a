//! The session token entity and the recaller string codec.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;

/// Separator between the token id and its secret in a recaller string.
pub const RECALLER_SEPARATOR: char = '|';

#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
/// One authenticated client session binding, as persisted by a
/// [`TokenStore`](crate::repositories::TokenStore).
pub struct SessionToken {
    /// Surrogate key, assigned at creation.
    pub id: i64,
    /// Random 60-char alphanumeric secret. Comparison-only: never included
    /// in serialized output.
    #[serde(skip_serializing)]
    pub secret: String,
    /// Identifier of the authenticated principal. Owned by the external
    /// user provider, not by this crate.
    pub subject_id: i64,
    /// Last-observed client IP. Advisory only.
    pub ip_address: Option<String>,
    /// Last-observed User-Agent header. Advisory only.
    pub user_agent: Option<String>,
    pub created_at: DateTime<Utc>,
    /// Liveness signal: bumped by touch, consulted by the retention sweeper.
    pub updated_at: DateTime<Utc>,
    /// Non-null means revoked (soft-deleted). The row survives until purged.
    pub deleted_at: Option<DateTime<Utc>>,
}

impl SessionToken {
    /// The canonical external representation: `"{id}|{secret}"`.
    pub fn recaller(&self) -> String {
        format!("{}{}{}", self.id, RECALLER_SEPARATOR, self.secret)
    }

    pub fn is_revoked(&self) -> bool {
        self.deleted_at.is_some()
    }
}

/// Split a recaller string into its `(id, secret)` parts.
///
/// Rejects anything that does not contain exactly one separator with a
/// numeric id and a non-empty secret. Malformed input is absence, never an
/// error.
pub fn parse_recaller(raw: &str) -> Option<(i64, &str)> {
    if raw.chars().filter(|c| *c == RECALLER_SEPARATOR).count() != 1 {
        return None;
    }

    let (id, secret) = raw.split_once(RECALLER_SEPARATOR)?;

    if secret.is_empty() {
        return None;
    }

    id.parse::<i64>().ok().map(|id| (id, secret))
}
