#![allow(dead_code)]

use std::sync::{Arc, Mutex};

use session_tokens::error::ProviderError;
use session_tokens::events::{AuthEvent, EventSink};
use session_tokens::guard::{recaller_name, ClientInfo, SessionTokenGuard};
use session_tokens::provider::{Authenticatable, UserProvider};
use session_tokens::recallers::{
    CookieRecaller, MemorySessionStore, RecallerChannel, SessionRecaller, SharedSession,
};
use session_tokens::repositories::{MemoryTokenStore, TokenStore};
use session_tokens::utils::cookies::CookiePolicy;

pub const GUARD_NAME: &str = "web";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TestUser {
    pub id: i64,
    pub username: String,
    pub password: String,
}

impl Authenticatable for TestUser {
    fn auth_id(&self) -> i64 {
        self.id
    }
}

#[derive(Debug, Clone)]
pub struct Credentials {
    pub username: String,
    pub password: String,
}

impl Credentials {
    pub fn new(username: &str, password: &str) -> Self {
        Self {
            username: username.to_string(),
            password: password.to_string(),
        }
    }
}

/// Scripted provider over a fixed set of users.
pub struct TestProvider {
    users: Mutex<Vec<TestUser>>,
}

impl TestProvider {
    pub fn new(users: Vec<TestUser>) -> Self {
        Self {
            users: Mutex::new(users),
        }
    }

    /// Simulate principal deletion.
    pub fn remove_user(&self, id: i64) {
        self.users
            .lock()
            .expect("lock users")
            .retain(|user| user.id != id);
    }

    fn users(&self) -> Vec<TestUser> {
        self.users.lock().expect("lock users").clone()
    }
}

#[async_trait::async_trait]
impl UserProvider for TestProvider {
    type User = TestUser;
    type Credentials = Credentials;

    async fn retrieve_by_id(&self, id: i64) -> Result<Option<TestUser>, ProviderError> {
        Ok(self.users().into_iter().find(|user| user.id == id))
    }

    async fn retrieve_by_credentials(
        &self,
        credentials: &Credentials,
    ) -> Result<Option<TestUser>, ProviderError> {
        Ok(self
            .users()
            .into_iter()
            .find(|user| user.username == credentials.username))
    }

    async fn validate_credentials(
        &self,
        user: &TestUser,
        credentials: &Credentials,
    ) -> Result<bool, ProviderError> {
        Ok(user.password == credentials.password)
    }
}

/// Event sink that records everything it sees.
#[derive(Default)]
pub struct RecordingEventSink {
    events: Mutex<Vec<AuthEvent>>,
}

impl RecordingEventSink {
    pub fn events(&self) -> Vec<AuthEvent> {
        self.events.lock().expect("lock events").clone()
    }
}

impl EventSink for RecordingEventSink {
    fn dispatch(&self, event: &AuthEvent) {
        self.events.lock().expect("lock events").push(event.clone());
    }
}

pub fn alice() -> TestUser {
    TestUser {
        id: 1,
        username: "alice".to_string(),
        password: "correct horse".to_string(),
    }
}

pub fn bob() -> TestUser {
    TestUser {
        id: 2,
        username: "bob".to_string(),
        password: "hunter2".to_string(),
    }
}

pub fn default_client() -> ClientInfo {
    ClientInfo {
        ip_address: Some("192.0.2.10".to_string()),
        user_agent: Some("integration-tests/1.0".to_string()),
    }
}

/// Shared collaborators for a sequence of simulated requests.
pub struct TestApp {
    pub provider: Arc<TestProvider>,
    pub store: Arc<MemoryTokenStore>,
    pub session: SharedSession,
    pub events: Arc<RecordingEventSink>,
}

impl TestApp {
    pub fn new() -> Self {
        Self {
            provider: Arc::new(TestProvider::new(vec![alice(), bob()])),
            store: Arc::new(MemoryTokenStore::new()),
            session: MemorySessionStore::shared(),
            events: Arc::new(RecordingEventSink::default()),
        }
    }

    pub fn recaller_name(&self) -> String {
        recaller_name(GUARD_NAME)
    }

    pub fn token_store(&self) -> &dyn TokenStore {
        self.store.as_ref()
    }

    /// Simulate an inbound request: a fresh guard over the shared session
    /// store and whatever Cookie header the client would send.
    pub fn request(&self, cookie_header: Option<&str>) -> SessionTokenGuard<TestProvider> {
        self.request_from(cookie_header, default_client())
    }

    pub fn request_from(
        &self,
        cookie_header: Option<&str>,
        client: ClientInfo,
    ) -> SessionTokenGuard<TestProvider> {
        let name = self.recaller_name();
        let channels: Vec<Box<dyn RecallerChannel>> = vec![
            Box::new(SessionRecaller::new(
                name.clone(),
                Arc::clone(&self.session),
            )),
            Box::new(CookieRecaller::from_request(
                name,
                CookiePolicy::default(),
                cookie_header,
            )),
        ];
        SessionTokenGuard::new(
            GUARD_NAME,
            Arc::clone(&self.provider),
            Arc::clone(&self.store) as Arc<dyn TokenStore>,
            channels,
            client,
        )
        .with_events(Arc::clone(&self.events) as Arc<dyn EventSink>)
    }

    /// The recaller currently stored in the session channel, if any.
    pub fn session_recaller(&self) -> Option<String> {
        use session_tokens::recallers::SessionStore;
        self.session
            .lock()
            .expect("lock session")
            .get(&self.recaller_name())
    }

    /// Build a Cookie header carrying the given recaller.
    pub fn cookie_header(&self, recaller: &str) -> String {
        format!("{}={}", self.recaller_name(), recaller)
    }
}

/// Pull the recaller value out of a queued Set-Cookie header.
pub fn set_cookie_value(set_cookie: &str) -> String {
    let pair = set_cookie.split(';').next().expect("cookie pair");
    let (_, value) = pair.split_once('=').expect("cookie value");
    value.to_string()
}
