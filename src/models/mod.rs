//! Data models shared across storage access and the guard.

pub mod session_token;

pub use session_token::SessionToken;
