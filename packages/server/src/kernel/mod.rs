//! Kernel module - server infrastructure and dependencies.

pub mod deps;
pub mod scheduled_tasks;
pub mod stores;
pub mod test_dependencies;
pub mod traits;

pub use deps::ServerDeps;
pub use stores::{MemoryStore, PostgresStore};
pub use test_dependencies::TestDependencies;
pub use traits::*;
