//! Session-backed recaller channel.
//!
//! Writes the recaller into the per-client request session store; lifetime
//! is tied to that store's own lifecycle. The session store itself is an
//! external collaborator, abstracted behind [`SessionStore`].

use std::collections::HashMap;
use std::sync::{Arc, Mutex};

use crate::recallers::RecallerChannel;

/// Key-value view of the application's request session.
pub trait SessionStore: Send {
    fn get(&self, key: &str) -> Option<String>;
    fn put(&mut self, key: &str, value: String);
    fn remove(&mut self, key: &str);

    fn has(&self, key: &str) -> bool {
        self.get(key).is_some()
    }
}

/// Handle shared between the application and the recaller channel.
pub type SharedSession = Arc<Mutex<dyn SessionStore>>;

/// Plain in-memory session store for tests and embedders without a
/// framework session.
#[derive(Default)]
pub struct MemorySessionStore {
    values: HashMap<String, String>,
}

impl MemorySessionStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn shared() -> SharedSession {
        Arc::new(Mutex::new(Self::new()))
    }
}

impl SessionStore for MemorySessionStore {
    fn get(&self, key: &str) -> Option<String> {
        self.values.get(key).cloned()
    }

    fn put(&mut self, key: &str, value: String) {
        self.values.insert(key.to_string(), value);
    }

    fn remove(&mut self, key: &str) {
        self.values.remove(key);
    }
}

/// Recaller channel writing into the request session under a fixed key.
/// Writes apply immediately.
pub struct SessionRecaller {
    recaller_name: String,
    session: SharedSession,
}

impl SessionRecaller {
    pub fn new(recaller_name: impl Into<String>, session: SharedSession) -> Self {
        Self {
            recaller_name: recaller_name.into(),
            session,
        }
    }

    fn session(&self) -> std::sync::MutexGuard<'_, dyn SessionStore + 'static> {
        self.session.lock().expect("session mutex poisoned")
    }
}

impl RecallerChannel for SessionRecaller {
    fn store_data(&mut self, recaller: &str) {
        self.session()
            .put(&self.recaller_name, recaller.to_string());
    }

    fn has_data(&self) -> bool {
        self.session().has(&self.recaller_name)
    }

    fn retrieve_data(&self) -> Option<String> {
        self.session().get(&self.recaller_name)
    }

    fn clear_data(&mut self) {
        self.session().remove(&self.recaller_name);
    }
}
