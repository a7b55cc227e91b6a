//! In-process token store.
//!
//! Backs the test suite and embedders that do not want a database. Mirrors
//! the Postgres store's semantics, including the `(secret, subject_id)`
//! uniqueness guarantee and soft-delete visibility rules.

use std::collections::BTreeMap;
use std::sync::Mutex;

use async_trait::async_trait;
use chrono::{DateTime, Utc};

use crate::error::StorageError;
use crate::models::session_token::SessionToken;
use crate::repositories::token_store::TokenStore;
use crate::utils::secret::generate_secret;

#[derive(Default)]
struct Inner {
    next_id: i64,
    rows: BTreeMap<i64, SessionToken>,
}

#[derive(Default)]
pub struct MemoryTokenStore {
    inner: Mutex<Inner>,
}

impl MemoryTokenStore {
    pub fn new() -> Self {
        Self::default()
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, Inner> {
        self.inner.lock().expect("token store mutex poisoned")
    }
}

#[async_trait]
impl TokenStore for MemoryTokenStore {
    async fn create(
        &self,
        subject_id: i64,
        ip_address: Option<&str>,
        user_agent: Option<&str>,
    ) -> Result<SessionToken, StorageError> {
        let secret = generate_secret();
        let now = Utc::now();
        let mut inner = self.lock();

        if inner
            .rows
            .values()
            .any(|row| row.subject_id == subject_id && row.secret == secret)
        {
            return Err(StorageError::Constraint(
                "duplicate (secret, subject_id)".to_string(),
            ));
        }

        inner.next_id += 1;
        let token = SessionToken {
            id: inner.next_id,
            secret,
            subject_id,
            ip_address: ip_address.map(str::to_string),
            user_agent: user_agent.map(str::to_string),
            created_at: now,
            updated_at: now,
            deleted_at: None,
        };
        inner.rows.insert(token.id, token.clone());

        Ok(token)
    }

    async fn find_live_by_id(&self, id: i64) -> Result<Option<SessionToken>, StorageError> {
        let inner = self.lock();
        Ok(inner
            .rows
            .get(&id)
            .filter(|row| row.deleted_at.is_none())
            .cloned())
    }

    async fn find_any_by_id(&self, id: i64) -> Result<Option<SessionToken>, StorageError> {
        let inner = self.lock();
        Ok(inner.rows.get(&id).cloned())
    }

    async fn save(&self, token: &SessionToken) -> Result<(), StorageError> {
        let mut inner = self.lock();
        if let Some(row) = inner.rows.get_mut(&token.id) {
            *row = token.clone();
        }
        Ok(())
    }

    async fn revoke(&self, token: &SessionToken) -> Result<(), StorageError> {
        let mut inner = self.lock();
        if let Some(row) = inner.rows.get_mut(&token.id) {
            row.deleted_at = Some(Utc::now());
        }
        Ok(())
    }

    async fn purge(&self, token: &SessionToken) -> Result<(), StorageError> {
        let mut inner = self.lock();
        inner.rows.remove(&token.id);
        Ok(())
    }

    async fn find_stale(
        &self,
        cutoff: DateTime<Utc>,
        subject_ids: &[i64],
        include_revoked: bool,
    ) -> Result<Vec<SessionToken>, StorageError> {
        let inner = self.lock();
        Ok(inner
            .rows
            .values()
            .filter(|row| row.updated_at <= cutoff)
            .filter(|row| include_revoked || row.deleted_at.is_none())
            .filter(|row| subject_ids.is_empty() || subject_ids.contains(&row.subject_id))
            .cloned()
            .collect())
    }
}
