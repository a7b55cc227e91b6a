use serde::{Deserialize, Serialize};
use std::env;

use anyhow::anyhow;

use crate::utils::cookies::{CookiePolicy, SameSite};

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    pub database_url: String,
    /// Guard identity; determines the recaller channel key.
    pub guard_name: String,
    /// Minimum seconds between touch-driven `updated_at` bumps.
    pub refresh_rate_secs: u64,
    /// Minimum `--days` the flush sweeper accepts without `--force`.
    pub safety_floor_days: u32,
    /// Cookie attributes for the persistent recaller channel, matching the
    /// application's session cookie policy.
    pub cookie: CookiePolicy,
}

impl Config {
    pub fn load() -> anyhow::Result<Self> {
        dotenvy::dotenv().ok();

        let database_url = env::var("DATABASE_URL")
            .unwrap_or_else(|_| "postgres://localhost/session_tokens".to_string());

        let guard_name = env::var("AUTH_GUARD_NAME").unwrap_or_else(|_| "web".to_string());

        let refresh_rate_secs = env::var("AUTH_REFRESH_RATE_SECS")
            .unwrap_or_else(|_| "60".to_string())
            .parse()
            .unwrap_or(60);

        let safety_floor_days = env::var("AUTH_FLUSH_FLOOR_DAYS")
            .unwrap_or_else(|_| "5".to_string())
            .parse()
            .unwrap_or(5);

        let same_site_name =
            env::var("SESSION_COOKIE_SAME_SITE").unwrap_or_else(|_| "lax".to_string());
        let same_site = SameSite::parse(&same_site_name)
            .ok_or_else(|| anyhow!("Invalid SESSION_COOKIE_SAME_SITE value: {}", same_site_name))?;

        let cookie = CookiePolicy {
            path: env::var("SESSION_COOKIE_PATH").unwrap_or_else(|_| "/".to_string()),
            domain: env::var("SESSION_COOKIE_DOMAIN").ok(),
            secure: env::var("SESSION_COOKIE_SECURE")
                .map(|v| v == "true" || v == "1")
                .unwrap_or(false),
            http_only: env::var("SESSION_COOKIE_HTTP_ONLY")
                .map(|v| v != "false" && v != "0")
                .unwrap_or(true),
            same_site,
        };

        Ok(Config {
            database_url,
            guard_name,
            refresh_rate_secs,
            safety_floor_days,
            cookie,
        })
    }
}
