pub mod tag;

pub use tag::{Tag, TagScores, MAX_TAGS_PER_STORY};
