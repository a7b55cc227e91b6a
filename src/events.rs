//! Authentication lifecycle events.
//!
//! The sink is supplied at guard construction; [`NullEventSink`] stands in
//! when the application does not care about events.

/// Events emitted by the guard, in the order the state machine produces
/// them.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AuthEvent {
    /// A credential attempt is starting.
    Attempting { guard: String, remember: bool },
    /// Credentials did not match. `subject_id` is set when the principal
    /// existed but the credentials were wrong.
    Failed {
        guard: String,
        subject_id: Option<i64>,
    },
    /// A session token was issued.
    Login {
        guard: String,
        subject_id: i64,
        remember: bool,
    },
    /// A user was resolved for the current request.
    Authenticated { guard: String, subject_id: i64 },
    /// The current session ended.
    Logout {
        guard: String,
        subject_id: Option<i64>,
    },
}

pub trait EventSink: Send + Sync {
    fn dispatch(&self, event: &AuthEvent);
}

/// No-op sink.
#[derive(Debug, Default, Clone, Copy)]
pub struct NullEventSink;

impl EventSink for NullEventSink {
    fn dispatch(&self, _event: &AuthEvent) {}
}
