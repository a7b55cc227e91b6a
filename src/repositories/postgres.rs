//! PostgreSQL-backed token store.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::PgPool;

use crate::error::StorageError;
use crate::models::session_token::SessionToken;
use crate::repositories::token_store::TokenStore;
use crate::utils::secret::generate_secret;

const COLUMNS: &str =
    "id, secret, subject_id, ip_address, user_agent, created_at, updated_at, deleted_at";

#[derive(Clone)]
pub struct PgTokenStore {
    pool: PgPool,
}

impl PgTokenStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Connect to the database and run pending migrations.
    pub async fn connect(database_url: &str) -> Result<Self, StorageError> {
        let pool = PgPool::connect(database_url).await?;
        sqlx::migrate!("./migrations")
            .run(&pool)
            .await
            .map_err(|err| StorageError::Database(err.into()))?;
        Ok(Self::new(pool))
    }

    pub fn pool(&self) -> &PgPool {
        &self.pool
    }
}

#[async_trait]
impl TokenStore for PgTokenStore {
    async fn create(
        &self,
        subject_id: i64,
        ip_address: Option<&str>,
        user_agent: Option<&str>,
    ) -> Result<SessionToken, StorageError> {
        let secret = generate_secret();
        let now = Utc::now();

        let token = sqlx::query_as::<_, SessionToken>(
            r#"
            INSERT INTO session_tokens
                (secret, subject_id, ip_address, user_agent, created_at, updated_at)
            VALUES ($1, $2, $3, $4, $5, $5)
            RETURNING id, secret, subject_id, ip_address, user_agent, created_at, updated_at, deleted_at
            "#,
        )
        .bind(&secret)
        .bind(subject_id)
        .bind(ip_address)
        .bind(user_agent)
        .bind(now)
        .fetch_one(&self.pool)
        .await
        .map_err(map_constraint)?;

        Ok(token)
    }

    async fn find_live_by_id(&self, id: i64) -> Result<Option<SessionToken>, StorageError> {
        let token = sqlx::query_as::<_, SessionToken>(&format!(
            "SELECT {COLUMNS} FROM session_tokens WHERE id = $1 AND deleted_at IS NULL",
        ))
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(token)
    }

    async fn find_any_by_id(&self, id: i64) -> Result<Option<SessionToken>, StorageError> {
        let token = sqlx::query_as::<_, SessionToken>(&format!(
            "SELECT {COLUMNS} FROM session_tokens WHERE id = $1",
        ))
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(token)
    }

    async fn save(&self, token: &SessionToken) -> Result<(), StorageError> {
        sqlx::query(
            r#"
            UPDATE session_tokens
            SET ip_address = $1,
                user_agent = $2,
                updated_at = $3,
                deleted_at = $4
            WHERE id = $5
            "#,
        )
        .bind(token.ip_address.as_deref())
        .bind(token.user_agent.as_deref())
        .bind(token.updated_at)
        .bind(token.deleted_at)
        .bind(token.id)
        .execute(&self.pool)
        .await?;

        Ok(())
    }

    async fn revoke(&self, token: &SessionToken) -> Result<(), StorageError> {
        sqlx::query("UPDATE session_tokens SET deleted_at = $1 WHERE id = $2")
            .bind(Utc::now())
            .bind(token.id)
            .execute(&self.pool)
            .await?;

        Ok(())
    }

    async fn purge(&self, token: &SessionToken) -> Result<(), StorageError> {
        sqlx::query("DELETE FROM session_tokens WHERE id = $1")
            .bind(token.id)
            .execute(&self.pool)
            .await?;

        Ok(())
    }

    async fn find_stale(
        &self,
        cutoff: DateTime<Utc>,
        subject_ids: &[i64],
        include_revoked: bool,
    ) -> Result<Vec<SessionToken>, StorageError> {
        let mut sql = format!("SELECT {COLUMNS} FROM session_tokens WHERE updated_at <= $1");
        if !include_revoked {
            sql.push_str(" AND deleted_at IS NULL");
        }
        if !subject_ids.is_empty() {
            sql.push_str(" AND subject_id = ANY($2)");
        }

        let mut query = sqlx::query_as::<_, SessionToken>(&sql).bind(cutoff);
        if !subject_ids.is_empty() {
            query = query.bind(subject_ids.to_vec());
        }

        let tokens = query.fetch_all(&self.pool).await?;
        Ok(tokens)
    }
}

/// Surface Postgres unique violations as the dedicated constraint variant.
fn map_constraint(err: sqlx::Error) -> StorageError {
    if let sqlx::Error::Database(db_err) = &err {
        if db_err.code().as_deref() == Some("23505") {
            return StorageError::Constraint(db_err.message().to_string());
        }
    }
    StorageError::Database(err)
}
