//! Swap activities - the unlock pipeline and its queries
//!
//! ```text
//! request_unlock ─▶ insert pending ─▶ validate_swap ─▶ run_automated_checks
//!                                          │                  │
//!                                       rejected      pass: materialize + completed
//!                                                     fail: rejected, review_required
//! ```

pub mod cancel;
pub mod process;
pub mod queries;
pub mod reap;
pub mod request_unlock;
pub mod retry;

pub use cancel::cancel_swap;
pub use process::{process_swap, run_automated_checks, validate_swap};
pub use queries::{get_swap, list_user_swaps, review_queue, swap_stats, Timeframe};
pub use reap::reap_expired_swaps;
pub use request_unlock::request_unlock;
pub use retry::retry_swap;
