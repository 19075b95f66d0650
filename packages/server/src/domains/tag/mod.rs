pub mod models;

// Re-export commonly used types
pub use models::{Tag, TagScores, MAX_TAGS_PER_STORY};
