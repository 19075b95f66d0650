//! Stories domain - content model, unlock decisions and publishing
//!
//! A story is created `published`, either by direct authoring or when a swap
//! completes. Full content is shown only when the viewer may see it; everyone
//! else gets the snippet.

pub mod activities;
pub mod data;
pub mod errors;
pub mod models;

pub use errors::StoryError;
pub use models::{
    ContentType, Engagement, EngagementCounter, MediaItem, MediaKind, NewStory, Story,
    StoryContent, StoryStatus, StorySubmission, SubmittedLocation, SwapRequirements, SwapSettings,
    TextBody,
};
