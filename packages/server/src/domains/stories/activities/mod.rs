pub mod get_story;
pub mod materialize;
pub mod publish;
pub mod unlock;

pub use get_story::get_story;
pub use materialize::{materialize_submission, publish_submission};
pub use publish::publish_story;
pub use unlock::{can_view, decide, redact, UnlockDecision, UnlockReason};
