pub mod swap_data;

pub use swap_data::{SwapData, SwapStatsData, UnlockResponse, UnlockStatus};
