pub mod content;
pub mod geo;

pub use content::*;
pub use geo::*;
