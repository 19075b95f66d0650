// StorySwap - API Core
//
// Swap-gated story unlocks: members publish short location-tagged stories and
// unlock someone else's locked story by submitting a qualifying one of their own.
//
// Each domain keeps its SQL in domains/*/models and its pipelines in domains/*/activities.

pub mod common;
pub mod config;
pub mod domains;
pub mod kernel;
pub mod server;

pub use config::*;
