use anyhow::Result;
use async_trait::async_trait;

use super::{scan_text, CheckOutcome, ContentCheck};
use crate::common::utils::normalize_for_comparison;
use crate::domains::stories::StorySubmission;
use crate::kernel::traits::StoryCorpus;

pub fn default_blocklist() -> Vec<String> {
    ["spam", "scam", "clickbait", "fake news"]
        .into_iter()
        .map(String::from)
        .collect()
}

/// Case-insensitive keyword match over title and text
pub struct ProfanityCheck {
    blocklist: Vec<String>,
}

impl ProfanityCheck {
    pub fn new(blocklist: Vec<String>) -> Self {
        let blocklist = blocklist
            .iter()
            .map(|term| normalize_for_comparison(term))
            .filter(|term| !term.is_empty())
            .collect();
        Self { blocklist }
    }

    /// Blocked terms found in `text`, in blocklist order
    pub fn matches(&self, text: &str) -> Vec<&str> {
        let haystack = normalize_for_comparison(text);
        self.blocklist
            .iter()
            .filter(|term| haystack.contains(term.as_str()))
            .map(String::as_str)
            .collect()
    }
}

#[async_trait]
impl ContentCheck for ProfanityCheck {
    fn name(&self) -> &'static str {
        "profanity"
    }

    async fn run(&self, submission: &StorySubmission, _corpus: &dyn StoryCorpus) -> Result<CheckOutcome> {
        let hits = self.matches(&scan_text(submission));
        if hits.is_empty() {
            return Ok(CheckOutcome::pass());
        }
        let reasons = hits
            .into_iter()
            .map(|term| format!("Contains blocked term: {}", term))
            .collect();
        Ok(CheckOutcome::fail(reasons, Some(1.0)))
    }
}
