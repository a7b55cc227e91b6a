//! Cookie-backed recaller channel.
//!
//! Reads the inbound request's cookie value; writes are queued as outgoing
//! Set-Cookie mutations and only become durable when the caller emits them
//! with the response. A later store/clear overrides an earlier one. The
//! queued state also overlays reads, so `has_data` reflects the value the
//! client will hold after this response.

use crate::recallers::RecallerChannel;
use crate::utils::cookies::{
    build_clear_cookie, build_forever_cookie, extract_cookie_value, CookiePolicy,
};

#[derive(Debug, Clone, PartialEq, Eq)]
enum Pending {
    Store(String),
    Clear,
}

pub struct CookieRecaller {
    recaller_name: String,
    policy: CookiePolicy,
    request_value: Option<String>,
    pending: Option<Pending>,
}

impl CookieRecaller {
    pub fn new(recaller_name: impl Into<String>, policy: CookiePolicy) -> Self {
        Self {
            recaller_name: recaller_name.into(),
            policy,
            request_value: None,
            pending: None,
        }
    }

    /// Build a channel from the inbound request's Cookie header, if any.
    pub fn from_request(
        recaller_name: impl Into<String>,
        policy: CookiePolicy,
        cookie_header: Option<&str>,
    ) -> Self {
        let recaller_name = recaller_name.into();
        let request_value =
            cookie_header.and_then(|header| extract_cookie_value(header, &recaller_name));
        Self {
            recaller_name,
            policy,
            request_value,
            pending: None,
        }
    }
}

impl RecallerChannel for CookieRecaller {
    fn store_data(&mut self, recaller: &str) {
        self.pending = Some(Pending::Store(recaller.to_string()));
    }

    fn has_data(&self) -> bool {
        match &self.pending {
            Some(Pending::Store(_)) => true,
            Some(Pending::Clear) => false,
            None => self.request_value.is_some(),
        }
    }

    fn retrieve_data(&self) -> Option<String> {
        match &self.pending {
            Some(Pending::Store(value)) => Some(value.clone()),
            Some(Pending::Clear) => None,
            None => self.request_value.clone(),
        }
    }

    fn clear_data(&mut self) {
        self.pending = Some(Pending::Clear);
    }

    fn persistent(&self) -> bool {
        true
    }

    fn pending_writes(&self) -> Vec<String> {
        match &self.pending {
            Some(Pending::Store(value)) => {
                vec![build_forever_cookie(&self.recaller_name, value, &self.policy)]
            }
            Some(Pending::Clear) => vec![build_clear_cookie(&self.recaller_name, &self.policy)],
            None => Vec::new(),
        }
    }
}
