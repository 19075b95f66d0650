// HTTP routes
pub mod error;
pub mod health;
pub mod stories;
pub mod swaps;

pub use error::*;
pub use health::*;
pub use stories::*;
pub use swaps::*;
