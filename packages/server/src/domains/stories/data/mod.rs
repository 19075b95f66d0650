pub mod story_data;

pub use story_data::StoryView;
