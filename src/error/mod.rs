//! Error taxonomy for the session-token core.
//!
//! Authentication failures (bad credentials, malformed or stale recallers)
//! are *not* errors: they surface as `Ok(false)` / `Ok(None)` so callers can
//! branch directly. Only infrastructure-level failures raise.

use thiserror::Error;

/// Failure of the underlying token persistence medium.
#[derive(Debug, Error)]
pub enum StorageError {
    #[error("database error: {0}")]
    Database(#[from] sqlx::Error),

    /// The `(secret, subject_id)` uniqueness guarantee was violated.
    #[error("unique constraint violated: {0}")]
    Constraint(String),
}

/// Failure of the external credential/principal provider.
///
/// Note: a credential mismatch is not a `ProviderError` — providers return
/// `Ok(None)` or `Ok(false)` for that. This type carries actual backend
/// failures (connectivity, corrupt records) which propagate uncaught.
#[derive(Debug, Error)]
#[error(transparent)]
pub struct ProviderError(#[from] anyhow::Error);

impl ProviderError {
    pub fn new<E: Into<anyhow::Error>>(err: E) -> Self {
        Self(err.into())
    }
}

/// Errors surfaced by guard operations. Never retried internally.
#[derive(Debug, Error)]
pub enum AuthError {
    #[error(transparent)]
    Storage(#[from] StorageError),

    #[error(transparent)]
    Provider(#[from] ProviderError),

    /// No configured recaller channel can satisfy the requested login mode.
    #[error("no {0} recaller channel configured")]
    ChannelUnavailable(&'static str),
}

/// Errors from the retention sweeper.
#[derive(Debug, Error)]
pub enum FlushError {
    /// Safety-gate violations, collected together before aborting.
    /// No deletion is performed when this is returned.
    #[error("invalid flush options: {}", .0.join("; "))]
    Config(Vec<String>),

    #[error(transparent)]
    Storage(#[from] StorageError),
}
