// Common test utilities

pub mod fixtures;
pub mod harness;
pub mod scripted_store;

pub use fixtures::*;
pub use harness::*;
pub use scripted_store::ScriptedStore;
