//! Set-Cookie construction for the persistent recaller channel.

use serde::{Deserialize, Serialize};

/// Max-Age for "forever" recaller cookies: five years, in seconds.
pub const FOREVER_MAX_AGE_SECS: u64 = 5 * 365 * 24 * 60 * 60;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum SameSite {
    Lax,
    Strict,
    None,
}

impl SameSite {
    pub fn parse(value: &str) -> Option<Self> {
        match value.to_ascii_lowercase().as_str() {
            "lax" => Some(SameSite::Lax),
            "strict" => Some(SameSite::Strict),
            "none" => Some(SameSite::None),
            _ => None,
        }
    }
}

/// Cookie attributes shared with the application's session configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CookiePolicy {
    pub path: String,
    pub domain: Option<String>,
    pub secure: bool,
    pub http_only: bool,
    pub same_site: SameSite,
}

impl Default for CookiePolicy {
    fn default() -> Self {
        Self {
            path: "/".to_string(),
            domain: None,
            secure: false,
            http_only: true,
            same_site: SameSite::Lax,
        }
    }
}

/// Build a long-lived Set-Cookie header value for a recaller.
pub fn build_forever_cookie(name: &str, value: &str, policy: &CookiePolicy) -> String {
    build_cookie(name, value, FOREVER_MAX_AGE_SECS, policy)
}

/// Build a Set-Cookie header value that removes the cookie.
pub fn build_clear_cookie(name: &str, policy: &CookiePolicy) -> String {
    build_cookie(name, "", 0, policy)
}

fn build_cookie(name: &str, value: &str, max_age_secs: u64, policy: &CookiePolicy) -> String {
    let mut cookie = format!(
        "{}={}; Path={}; Max-Age={}; SameSite={}",
        name,
        value,
        policy.path,
        max_age_secs,
        same_site_value(policy.same_site)
    );
    if let Some(domain) = &policy.domain {
        cookie.push_str("; Domain=");
        cookie.push_str(domain);
    }
    if policy.http_only {
        cookie.push_str("; HttpOnly");
    }
    if policy.secure {
        cookie.push_str("; Secure");
    }
    cookie
}

/// Find the value of a named cookie inside a Cookie request header.
pub fn extract_cookie_value(header: &str, name: &str) -> Option<String> {
    header.split(';').map(str::trim).find_map(|pair| {
        let mut parts = pair.splitn(2, '=');
        let key = parts.next()?.trim();
        let value = parts.next()?.trim();
        if key == name {
            Some(value.to_string())
        } else {
            None
        }
    })
}

fn same_site_value(same_site: SameSite) -> &'static str {
    match same_site {
        SameSite::Lax => "Lax",
        SameSite::Strict => "Strict",
        SameSite::None => "None",
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn forever_cookie_includes_policy_attributes() {
        let policy = CookiePolicy {
            path: "/app".to_string(),
            domain: Some("example.test".to_string()),
            secure: true,
            http_only: true,
            same_site: SameSite::Strict,
        };
        let cookie = build_forever_cookie("recaller", "1|abc", &policy);
        assert!(cookie.starts_with("recaller=1|abc"));
        assert!(cookie.contains("Path=/app"));
        assert!(cookie.contains(&format!("Max-Age={}", FOREVER_MAX_AGE_SECS)));
        assert!(cookie.contains("Domain=example.test"));
        assert!(cookie.contains("HttpOnly"));
        assert!(cookie.contains("Secure"));
        assert!(cookie.contains("SameSite=Strict"));
    }

    #[test]
    fn clear_cookie_sets_max_age_zero() {
        let cookie = build_clear_cookie("recaller", &CookiePolicy::default());
        assert!(cookie.starts_with("recaller=;"));
        assert!(cookie.contains("Max-Age=0"));
        assert!(cookie.contains("HttpOnly"));
        assert!(!cookie.contains("Secure"));
    }

    #[test]
    fn extract_cookie_value_finds_matching_name() {
        let header = "a=1; recaller=5|secret-value; b=2";
        assert_eq!(
            extract_cookie_value(header, "recaller").as_deref(),
            Some("5|secret-value")
        );
        assert!(extract_cookie_value(header, "missing").is_none());
    }

    #[test]
    fn same_site_parse_is_case_insensitive() {
        assert_eq!(SameSite::parse("LAX"), Some(SameSite::Lax));
        assert_eq!(SameSite::parse("strict"), Some(SameSite::Strict));
        assert_eq!(SameSite::parse("None"), Some(SameSite::None));
        assert_eq!(SameSite::parse("bogus"), None);
    }
}
