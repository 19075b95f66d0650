pub mod swap;

pub use swap::{
    ModerationResults, Swap, SwapCounts, SwapStatus, SwapTiming, ValidationSnapshot,
    DEFAULT_SWAP_TTL_HOURS,
};
