//! The authentication guard: a request-scoped state machine tying
//! credential validation, token issuance, and per-request identity
//! resolution together.
//!
//! One guard is constructed per inbound request and discarded with it; the
//! memoized resolution never outlives the request, so no locking is needed
//! here. The durable token store is the only shared resource.

use std::sync::Arc;
use std::time::Duration;

use chrono::Utc;
use sha2::{Digest, Sha256};

use crate::error::{AuthError, StorageError};
use crate::events::{AuthEvent, EventSink, NullEventSink};
use crate::models::session_token::SessionToken;
use crate::provider::{Authenticatable, UserProvider};
use crate::recallers::RecallerChannel;
use crate::repositories::token_store::TokenStore;

/// Default minimum interval between touch-driven `updated_at` bumps.
pub const DEFAULT_REFRESH_RATE: Duration = Duration::from_secs(60);

/// Tag mixed into the recaller channel key so distinct guard configurations
/// never collide.
const RECALLER_NAME_TAG: &str = "session_token_guard";

/// Derive the channel key for a guard name: the name plus a stable
/// truncated SHA-256 tag.
pub fn recaller_name(guard_name: &str) -> String {
    let digest = Sha256::digest(RECALLER_NAME_TAG.as_bytes());
    format!("{}_{}", guard_name, &hex::encode(digest)[..32])
}

/// Connection metadata observed on the current request. Advisory only;
/// never used for authorization decisions.
#[derive(Debug, Clone, Default)]
pub struct ClientInfo {
    pub ip_address: Option<String>,
    pub user_agent: Option<String>,
}

enum Resolution<U> {
    Guest,
    Authenticated {
        user: U,
        token: Option<SessionToken>,
        via_remember: bool,
    },
}

/// Request-scoped authentication guard.
///
/// Channels are queried in construction order during resolution; by
/// convention the session channel comes first, the cookie channel second.
pub struct SessionTokenGuard<P: UserProvider> {
    name: String,
    recaller_name: String,
    provider: Arc<P>,
    store: Arc<dyn TokenStore>,
    events: Arc<dyn EventSink>,
    channels: Vec<Box<dyn RecallerChannel>>,
    client: ClientInfo,
    refresh_rate: Duration,
    resolution: Option<Resolution<P::User>>,
}

impl<P: UserProvider> SessionTokenGuard<P> {
    pub fn new(
        name: impl Into<String>,
        provider: Arc<P>,
        store: Arc<dyn TokenStore>,
        channels: Vec<Box<dyn RecallerChannel>>,
        client: ClientInfo,
    ) -> Self {
        let name = name.into();
        let recaller_name = recaller_name(&name);
        Self {
            name,
            recaller_name,
            provider,
            store,
            events: Arc::new(NullEventSink),
            channels,
            client,
            refresh_rate: DEFAULT_REFRESH_RATE,
            resolution: None,
        }
    }

    pub fn with_events(mut self, events: Arc<dyn EventSink>) -> Self {
        self.events = events;
        self
    }

    pub fn with_refresh_rate(mut self, refresh_rate: Duration) -> Self {
        self.refresh_rate = refresh_rate;
        self
    }

    /// The channel key this guard stores recallers under.
    pub fn recaller_name(&self) -> &str {
        &self.recaller_name
    }

    pub fn provider(&self) -> &P {
        &self.provider
    }

    /// Validate credentials without mutating any state or issuing a token.
    pub async fn validate(&self, credentials: &P::Credentials) -> Result<bool, AuthError> {
        match self.provider.retrieve_by_credentials(credentials).await? {
            Some(user) => Ok(self.provider.validate_credentials(&user, credentials).await?),
            None => Ok(false),
        }
    }

    /// Attempt to authenticate with the given credentials, logging the user
    /// in on success. Exactly one of {login performed, failed event emitted}
    /// happens per call.
    pub async fn attempt(
        &mut self,
        credentials: &P::Credentials,
        remember: bool,
    ) -> Result<bool, AuthError> {
        self.events.dispatch(&AuthEvent::Attempting {
            guard: self.name.clone(),
            remember,
        });

        let user = self.provider.retrieve_by_credentials(credentials).await?;

        if let Some(user) = user {
            if self.provider.validate_credentials(&user, credentials).await? {
                self.login(user, remember).await?;
                return Ok(true);
            }
            self.events.dispatch(&AuthEvent::Failed {
                guard: self.name.clone(),
                subject_id: Some(user.auth_id()),
            });
            return Ok(false);
        }

        self.events.dispatch(&AuthEvent::Failed {
            guard: self.name.clone(),
            subject_id: None,
        });
        Ok(false)
    }

    /// Log the user in: issue a session token bound to the current client
    /// metadata and store its recaller in exactly one channel — the
    /// persistent one when `remember` is set, the session one otherwise.
    /// The other channel is left untouched.
    pub async fn login(&mut self, user: P::User, remember: bool) -> Result<(), AuthError> {
        let token = self
            .store
            .create(
                user.auth_id(),
                self.client.ip_address.as_deref(),
                self.client.user_agent.as_deref(),
            )
            .await?;

        let channel = self
            .channels
            .iter_mut()
            .find(|channel| channel.persistent() == remember)
            .ok_or(AuthError::ChannelUnavailable(if remember {
                "persistent"
            } else {
                "session"
            }))?;
        channel.store_data(&token.recaller());

        tracing::debug!(
            guard = %self.name,
            subject_id = user.auth_id(),
            token_id = token.id,
            remember,
            "issued session token"
        );

        self.events.dispatch(&AuthEvent::Login {
            guard: self.name.clone(),
            subject_id: user.auth_id(),
            remember,
        });

        self.remember_resolution(user, Some(token), remember);
        Ok(())
    }

    /// Log the principal with the given id in, if it exists.
    pub async fn login_using_id(
        &mut self,
        id: i64,
        remember: bool,
    ) -> Result<Option<P::User>, AuthError> {
        match self.provider.retrieve_by_id(id).await? {
            Some(user) => {
                self.login(user.clone(), remember).await?;
                Ok(Some(user))
            }
            None => Ok(None),
        }
    }

    /// Authenticate for the current request only: no token is created and
    /// no channel is touched.
    pub async fn once(&mut self, credentials: &P::Credentials) -> Result<bool, AuthError> {
        self.events.dispatch(&AuthEvent::Attempting {
            guard: self.name.clone(),
            remember: false,
        });

        let user = self.provider.retrieve_by_credentials(credentials).await?;

        match user {
            Some(user) if self.provider.validate_credentials(&user, credentials).await? => {
                self.set_user(user);
                Ok(true)
            }
            _ => Ok(false),
        }
    }

    /// Authenticate the principal with the given id for this request only.
    pub async fn once_using_id(&mut self, id: i64) -> Result<Option<P::User>, AuthError> {
        match self.provider.retrieve_by_id(id).await? {
            Some(user) => {
                self.set_user(user.clone());
                Ok(Some(user))
            }
            None => Ok(None),
        }
    }

    /// Set the resolved user directly, without a backing token.
    pub fn set_user(&mut self, user: P::User) {
        self.remember_resolution(user, None, false);
    }

    /// The currently authenticated user, resolving from the recaller
    /// channels on first call. Guests resolve to `None`.
    pub async fn user(&mut self) -> Result<Option<P::User>, AuthError> {
        self.resolve().await?;
        match &self.resolution {
            Some(Resolution::Authenticated { user, .. }) => Ok(Some(user.clone())),
            _ => Ok(None),
        }
    }

    /// Whether the current request is authenticated.
    pub async fn check(&mut self) -> Result<bool, AuthError> {
        Ok(self.user().await?.is_some())
    }

    /// The authenticated principal's identifier, if any.
    pub async fn id(&mut self) -> Result<Option<i64>, AuthError> {
        Ok(self.user().await?.map(|user| user.auth_id()))
    }

    /// The session token backing the current authentication, if any.
    /// `None` for guests and for `once`-style logins.
    pub async fn session_token(&mut self) -> Result<Option<SessionToken>, AuthError> {
        self.resolve().await?;
        match &self.resolution {
            Some(Resolution::Authenticated { token, .. }) => Ok(token.clone()),
            _ => Ok(None),
        }
    }

    /// Whether the resolved token arrived via the persistent (cookie)
    /// channel.
    pub fn via_remember(&self) -> bool {
        matches!(
            self.resolution,
            Some(Resolution::Authenticated {
                via_remember: true,
                ..
            })
        )
    }

    /// End the session: clear every channel, revoke the backing token, and
    /// leave the request resolved as guest.
    pub async fn logout(&mut self) -> Result<(), AuthError> {
        self.resolve().await?;

        let (subject_id, token) = match self.resolution.take() {
            Some(Resolution::Authenticated { user, token, .. }) => {
                (Some(user.auth_id()), token)
            }
            _ => (None, None),
        };

        for channel in &mut self.channels {
            channel.clear_data();
        }

        if let Some(token) = &token {
            self.store.revoke(token).await?;
            tracing::debug!(guard = %self.name, token_id = token.id, "revoked session token");
        }

        self.events.dispatch(&AuthEvent::Logout {
            guard: self.name.clone(),
            subject_id,
        });

        self.resolution = Some(Resolution::Guest);
        Ok(())
    }

    /// Deferred Set-Cookie header values queued by the channels during this
    /// request, in call order with later calls overriding earlier ones.
    pub fn queued_cookies(&self) -> Vec<String> {
        self.channels
            .iter()
            .flat_map(|channel| channel.pending_writes())
            .collect()
    }

    /// Per-request resolution, memoized. Channels are queried in order; the
    /// first one holding data that decodes to a live token wins. A channel
    /// whose data fails to resolve is cleared (self-healing against stale,
    /// forged, or revoked recallers); channels after the winner are never
    /// queried and never cleared.
    async fn resolve(&mut self) -> Result<(), AuthError> {
        if self.resolution.is_some() {
            return Ok(());
        }

        let mut resolved: Option<(P::User, SessionToken, bool)> = None;

        for idx in 0..self.channels.len() {
            if !self.channels[idx].has_data() {
                continue;
            }

            let found = self.channels[idx]
                .retrieve_session_token(self.store.as_ref())
                .await?;

            let Some(token) = found else {
                tracing::debug!(guard = %self.name, "clearing channel with unresolvable recaller");
                self.channels[idx].clear_data();
                continue;
            };

            match self.provider.retrieve_by_id(token.subject_id).await? {
                Some(user) => {
                    let via_remember = self.channels[idx].persistent();
                    resolved = Some((user, token, via_remember));
                    break;
                }
                None => {
                    // Token outlived its principal; treat like a stale
                    // recaller.
                    tracing::debug!(guard = %self.name, token_id = token.id, "token subject no longer exists");
                    self.channels[idx].clear_data();
                }
            }
        }

        match resolved {
            Some((user, mut token, via_remember)) => {
                self.events.dispatch(&AuthEvent::Authenticated {
                    guard: self.name.clone(),
                    subject_id: user.auth_id(),
                });
                self.touch(&mut token).await?;
                self.resolution = Some(Resolution::Authenticated {
                    user,
                    token: Some(token),
                    via_remember,
                });
            }
            None => {
                self.resolution = Some(Resolution::Guest);
            }
        }

        Ok(())
    }

    /// Refresh the token's liveness metadata. `updated_at` is bumped at
    /// most once per refresh interval; ip/user-agent changes are persisted
    /// regardless of the throttle. Writes only when something changed.
    async fn touch(&self, token: &mut SessionToken) -> Result<(), StorageError> {
        let now = Utc::now();
        let mut changed = false;

        let elapsed = now.signed_duration_since(token.updated_at);
        if elapsed.num_seconds() >= self.refresh_rate.as_secs() as i64 {
            token.updated_at = now;
            changed = true;
        }

        if token.ip_address != self.client.ip_address {
            token.ip_address = self.client.ip_address.clone();
            changed = true;
        }

        if token.user_agent != self.client.user_agent {
            token.user_agent = self.client.user_agent.clone();
            changed = true;
        }

        if changed {
            self.store.save(token).await?;
        }

        Ok(())
    }

    fn remember_resolution(&mut self, user: P::User, token: Option<SessionToken>, via_remember: bool) {
        self.events.dispatch(&AuthEvent::Authenticated {
            guard: self.name.clone(),
            subject_id: user.auth_id(),
        });
        self.resolution = Some(Resolution::Authenticated {
            user,
            token,
            via_remember,
        });
    }
}
