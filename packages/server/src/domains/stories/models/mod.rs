pub mod content;
pub mod story;
pub mod submission;

pub use content::{ContentType, MediaItem, MediaKind, StoryContent, TextBody};
pub use story::{
    Engagement, EngagementCounter, NewStory, Story, StoryStatus, SwapRequirements, SwapSettings,
    DEFAULT_MIN_CONTENT_LENGTH,
};
pub use submission::{StorySubmission, SubmittedLocation};
