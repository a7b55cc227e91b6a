//! The retention sweeper: batch revocation or purging of tokens untouched
//! past a configurable age.
//!
//! Destructive modes are gated: hard deletion and floor-violating ages both
//! require an explicit `force`, and every applicable violation is reported
//! together before anything is deleted.

use chrono::{DateTime, Duration, Utc};

use crate::error::FlushError;
use crate::repositories::token_store::TokenStore;

pub const DEFAULT_FLUSH_DAYS: u32 = 30;
pub const DEFAULT_SAFETY_FLOOR_DAYS: u32 = 5;

#[derive(Debug, Clone)]
pub struct FlushOptions {
    /// Tokens untouched for at least this many days are flushed.
    pub days: u32,
    /// Restrict the sweep to these subjects. Empty means all.
    pub subject_ids: Vec<i64>,
    /// Hard-delete (purge) instead of soft-delete (revoke). Hard mode also
    /// sweeps previously revoked rows.
    pub hard: bool,
    /// Confirm destructive or floor-violating operations.
    pub force: bool,
}

impl Default for FlushOptions {
    fn default() -> Self {
        Self {
            days: DEFAULT_FLUSH_DAYS,
            subject_ids: Vec::new(),
            hard: false,
            force: false,
        }
    }
}

#[derive(Debug)]
pub struct FlushOutcome {
    /// Number of tokens revoked or purged. Zero is a successful no-op.
    pub affected: u64,
    pub cutoff: DateTime<Utc>,
    pub hard: bool,
}

fn validate(options: &FlushOptions, floor_days: u32) -> Vec<String> {
    let mut errors = Vec::new();

    if options.hard && !options.force {
        errors.push("--hard will permanently delete records. Use --force to confirm.".to_string());
    }

    if options.days < floor_days && !options.force {
        errors.push(format!(
            "--days cannot be less than {floor_days}. (force using --force)"
        ));
    }

    errors
}

/// Revoke or purge every token with `updated_at` at or before
/// `now - options.days`. Performs no deletion at all when validation fails.
pub async fn flush_tokens(
    store: &dyn TokenStore,
    options: &FlushOptions,
    floor_days: u32,
) -> Result<FlushOutcome, FlushError> {
    let errors = validate(options, floor_days);
    if !errors.is_empty() {
        return Err(FlushError::Config(errors));
    }

    let cutoff = Utc::now() - Duration::days(i64::from(options.days));
    let stale = store
        .find_stale(cutoff, &options.subject_ids, options.hard)
        .await?;

    let mut affected = 0u64;
    for token in &stale {
        if options.hard {
            store.purge(token).await?;
        } else {
            store.revoke(token).await?;
        }
        affected += 1;
    }

    tracing::info!(
        affected,
        hard = options.hard,
        cutoff = %cutoff,
        "flushed stale session tokens"
    );

    Ok(FlushOutcome {
        affected,
        cutoff,
        hard: options.hard,
    })
}
