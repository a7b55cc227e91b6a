//! Token persistence: the store contract and its implementations.

pub mod memory;
pub mod postgres;
pub mod token_store;

pub use memory::MemoryTokenStore;
pub use postgres::PgTokenStore;
pub use token_store::{find_by_recaller, TokenStore};
