pub mod cookies;
pub mod secret;
