//! Swaps domain - submit a story of your own to unlock someone else's
//!
//! Lifecycle: `pending → {completed, rejected}`, `rejected → pending` on an
//! admin retry, `pending | rejected → expired` by the reaper. At most one
//! non-expired swap exists per (member, story) pair.

pub mod activities;
pub mod data;
pub mod errors;
pub mod machine;
pub mod models;
pub mod moderation;
pub mod validation;

pub use data::{SwapData, SwapStatsData, UnlockResponse, UnlockStatus};
pub use errors::{SwapError, SwapResult};
pub use models::{Swap, SwapStatus};
