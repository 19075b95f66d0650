//! Storage implementations of the `Base*Store` traits.
//!
//! `PostgresStore` backs the server; `MemoryStore` backs tests and local runs
//! without a database. Both enforce the one-live-swap-per-pair rule atomically.

pub mod memory;
pub mod postgres;

pub use memory::MemoryStore;
pub use postgres::PostgresStore;
