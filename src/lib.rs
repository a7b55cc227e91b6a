//! Persistent, revocable "remember me" authentication built on opaque
//! server-side session tokens.
//!
//! A client holds only a *recaller string* (`"{id}|{secret}"`). Each request
//! constructs a [`guard::SessionTokenGuard`] which resolves the recaller
//! through an ordered set of [`recallers::RecallerChannel`]s, verifies the
//! secret against the [`repositories::TokenStore`] in constant time, and
//! refreshes the token's liveness metadata. Stale tokens are retired by the
//! [`flush`] sweeper, exposed operationally as the `flush_tokens` binary.

pub mod config;
pub mod error;
pub mod events;
pub mod flush;
pub mod guard;
pub mod models;
pub mod provider;
pub mod recallers;
pub mod repositories;
pub mod utils;

pub use config::Config;
pub use error::{AuthError, FlushError, ProviderError, StorageError};
pub use events::{AuthEvent, EventSink, NullEventSink};
pub use flush::{flush_tokens, FlushOptions, FlushOutcome};
pub use guard::{ClientInfo, SessionTokenGuard};
pub use models::session_token::SessionToken;
pub use provider::{Authenticatable, UserProvider};
pub use recallers::{CookieRecaller, RecallerChannel, SessionRecaller};
pub use repositories::{MemoryTokenStore, PgTokenStore, TokenStore};
