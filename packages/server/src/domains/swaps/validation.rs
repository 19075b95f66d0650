//! Content validation against a story's swap requirements.
//!
//! Pure: no storage, no moderation. A submission with violations is rejected
//! before any automated check runs.

use crate::domains::stories::{ContentType, StorySubmission, SwapRequirements};

/// Length credited to a submission that carries media
pub const MEDIA_CONTENT_CREDIT: u32 = 100;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ValidationReport {
    pub content_length: u32,
    pub has_location: bool,
    pub has_media: bool,
    /// Human-readable rule failures, in evaluation order
    pub violations: Vec<String>,
}

impl ValidationReport {
    pub fn is_valid(&self) -> bool {
        self.violations.is_empty()
    }
}

/// Trimmed text length in characters, raised to the media credit when media is present
pub fn content_length(submission: &StorySubmission) -> u32 {
    let text_len = submission
        .trimmed_text()
        .map(|t| t.chars().count() as u32)
        .unwrap_or(0);
    if submission.has_media() {
        text_len.max(MEDIA_CONTENT_CREDIT)
    } else {
        text_len
    }
}

/// Whether any submitted content type is in `allowed`; an empty list allows nothing
fn content_type_allowed(submission: &StorySubmission, allowed: &[ContentType]) -> bool {
    let present = submission.content_types();
    if present.iter().any(|t| allowed.contains(t)) {
        return true;
    }
    allowed.contains(&ContentType::Mixed) && submission.to_content().content_type == ContentType::Mixed
}

pub fn validate_submission(
    submission: &StorySubmission,
    requirements: &SwapRequirements,
) -> ValidationReport {
    let content_length = content_length(submission);
    let has_location = submission.coordinates().is_some();
    let has_media = submission.has_media();

    let mut violations = Vec::new();

    if content_length < requirements.min_content_length {
        violations.push(format!(
            "Content must be at least {} characters (got {})",
            requirements.min_content_length, content_length
        ));
    }

    if requirements.location_required && !has_location {
        violations.push("A location with valid coordinates is required".to_string());
    }

    if !content_type_allowed(submission, &requirements.allowed_content_types) {
        let allowed: Vec<String> = requirements
            .allowed_content_types
            .iter()
            .map(ToString::to_string)
            .collect();
        if allowed.is_empty() {
            violations.push("This story accepts no content types".to_string());
        } else {
            violations.push(format!("Content type must be one of: {}", allowed.join(", ")));
        }
    }

    ValidationReport {
        content_length,
        has_location,
        has_media,
        violations,
    }
}
