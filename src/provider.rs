//! The external credential/principal provider contract.
//!
//! Principal identity is owned by the application; the guard only holds an
//! opaque handle plus the numeric identifier it binds tokens to.

use async_trait::async_trait;

use crate::error::ProviderError;

/// A principal that can be bound to a session token.
pub trait Authenticatable {
    /// The identifier stored as the token's `subject_id`.
    fn auth_id(&self) -> i64;
}

/// Retrieval and validation of principals.
///
/// Credential mismatches are `Ok(None)` / `Ok(false)`; a [`ProviderError`]
/// means the provider backend itself failed and propagates uncaught.
#[async_trait]
pub trait UserProvider: Send + Sync {
    type User: Authenticatable + Clone + Send + Sync;
    type Credentials: Send + Sync;

    async fn retrieve_by_id(&self, id: i64) -> Result<Option<Self::User>, ProviderError>;

    async fn retrieve_by_credentials(
        &self,
        credentials: &Self::Credentials,
    ) -> Result<Option<Self::User>, ProviderError>;

    async fn validate_credentials(
        &self,
        user: &Self::User,
        credentials: &Self::Credentials,
    ) -> Result<bool, ProviderError>;
}
