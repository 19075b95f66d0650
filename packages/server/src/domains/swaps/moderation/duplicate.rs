use anyhow::Result;
use async_trait::async_trait;

use super::{CheckOutcome, ContentCheck};
use crate::domains::stories::StorySubmission;
use crate::kernel::traits::StoryCorpus;

pub const DEFAULT_MIN_LENGTH: usize = 50;
pub const DEFAULT_PREFIX_LENGTH: usize = 100;

/// Flags text whose leading prefix already appears in a published story
///
/// Short texts pass without a lookup.
pub struct DuplicateCheck {
    min_length: usize,
    prefix_length: usize,
}

impl DuplicateCheck {
    pub fn new(min_length: usize, prefix_length: usize) -> Self {
        Self {
            min_length,
            prefix_length,
        }
    }

    /// Leading characters probed in the corpus, None when too short to check
    pub fn probe<'a>(&self, text: &'a str) -> Option<&'a str> {
        let text = text.trim();
        if text.chars().count() < self.min_length {
            return None;
        }
        let end = text
            .char_indices()
            .nth(self.prefix_length)
            .map(|(idx, _)| idx)
            .unwrap_or(text.len());
        Some(&text[..end])
    }
}

impl Default for DuplicateCheck {
    fn default() -> Self {
        Self::new(DEFAULT_MIN_LENGTH, DEFAULT_PREFIX_LENGTH)
    }
}

#[async_trait]
impl ContentCheck for DuplicateCheck {
    fn name(&self) -> &'static str {
        "duplicate"
    }

    async fn run(&self, submission: &StorySubmission, corpus: &dyn StoryCorpus) -> Result<CheckOutcome> {
        let Some(probe) = submission.trimmed_text().and_then(|t| self.probe(t)) else {
            return Ok(CheckOutcome::pass());
        };

        if corpus.published_text_contains(probe).await? {
            Ok(CheckOutcome::fail(
                vec!["Content duplicates an existing published story".to_string()],
                Some(0.9),
            ))
        } else {
            Ok(CheckOutcome::pass())
        }
    }
}
