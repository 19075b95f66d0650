//! Automated moderation for swap submissions.
//!
//! Three independent checks run on every submission: a keyword blocklist, a
//! duplicate-content probe against published stories, and rule-based
//! disallowed-topic patterns. All three always run; the submission passes
//! only if every check passes.

pub mod duplicate;
pub mod patterns;
pub mod profanity;

use std::sync::Arc;

use anyhow::{Context, Result};
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use tracing::warn;

use crate::domains::stories::StorySubmission;
use crate::kernel::traits::StoryCorpus;

pub use duplicate::DuplicateCheck;
pub use patterns::{PatternCheck, PatternRule};
pub use profanity::ProfanityCheck;

/// Result of a single check
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CheckOutcome {
    pub passed: bool,
    pub reasons: Vec<String>,
    pub confidence: Option<f64>,
}

impl CheckOutcome {
    pub fn pass() -> Self {
        Self {
            passed: true,
            reasons: Vec::new(),
            confidence: None,
        }
    }

    pub fn fail(reasons: Vec<String>, confidence: Option<f64>) -> Self {
        Self {
            passed: false,
            reasons,
            confidence,
        }
    }
}

/// One replaceable moderation check
#[async_trait]
pub trait ContentCheck: Send + Sync {
    fn name(&self) -> &'static str;

    async fn run(&self, submission: &StorySubmission, corpus: &dyn StoryCorpus)
        -> Result<CheckOutcome>;
}

/// Outcomes of all three checks
#[derive(Debug, Clone, PartialEq)]
pub struct ModerationReport {
    pub profanity: CheckOutcome,
    pub duplicate: CheckOutcome,
    pub patterns: CheckOutcome,
}

impl ModerationReport {
    pub fn passed(&self) -> bool {
        self.profanity.passed && self.duplicate.passed && self.patterns.passed
    }

    /// Reasons from every failed check, in check order
    pub fn reasons(&self) -> Vec<String> {
        [&self.profanity, &self.duplicate, &self.patterns]
            .into_iter()
            .flat_map(|outcome| outcome.reasons.iter().cloned())
            .collect()
    }

    /// Highest confidence reported by a failed check
    pub fn confidence(&self) -> Option<f64> {
        [&self.profanity, &self.duplicate, &self.patterns]
            .into_iter()
            .filter(|outcome| !outcome.passed)
            .filter_map(|outcome| outcome.confidence)
            .reduce(f64::max)
    }
}

/// Tunables for the built-in checks
#[derive(Debug, Clone)]
pub struct ModerationConfig {
    pub blocklist: Vec<String>,
    pub patterns: Vec<PatternRule>,
    pub pattern_confidence: f64,
    /// Texts shorter than this skip the duplicate probe
    pub duplicate_min_length: usize,
    /// Leading characters of the text searched for in the corpus
    pub duplicate_prefix_length: usize,
}

impl Default for ModerationConfig {
    fn default() -> Self {
        Self {
            blocklist: profanity::default_blocklist(),
            patterns: patterns::default_rules(),
            pattern_confidence: patterns::DEFAULT_CONFIDENCE,
            duplicate_min_length: duplicate::DEFAULT_MIN_LENGTH,
            duplicate_prefix_length: duplicate::DEFAULT_PREFIX_LENGTH,
        }
    }
}

/// The three checks, each swappable
#[derive(Clone)]
pub struct ModerationPipeline {
    profanity: Arc<dyn ContentCheck>,
    duplicate: Arc<dyn ContentCheck>,
    patterns: Arc<dyn ContentCheck>,
}

impl ModerationPipeline {
    pub fn new(
        profanity: Arc<dyn ContentCheck>,
        duplicate: Arc<dyn ContentCheck>,
        patterns: Arc<dyn ContentCheck>,
    ) -> Self {
        Self {
            profanity,
            duplicate,
            patterns,
        }
    }

    pub fn from_config(config: &ModerationConfig) -> Self {
        Self::new(
            Arc::new(ProfanityCheck::new(config.blocklist.clone())),
            Arc::new(DuplicateCheck::new(
                config.duplicate_min_length,
                config.duplicate_prefix_length,
            )),
            Arc::new(PatternCheck::new(
                config.patterns.clone(),
                config.pattern_confidence,
            )),
        )
    }

    pub fn with_profanity(mut self, check: Arc<dyn ContentCheck>) -> Self {
        self.profanity = check;
        self
    }

    pub fn with_duplicate(mut self, check: Arc<dyn ContentCheck>) -> Self {
        self.duplicate = check;
        self
    }

    pub fn with_patterns(mut self, check: Arc<dyn ContentCheck>) -> Self {
        self.patterns = check;
        self
    }

    /// Run all three checks; an error from any check is a processing fault
    pub async fn run(
        &self,
        submission: &StorySubmission,
        corpus: &dyn StoryCorpus,
    ) -> Result<ModerationReport> {
        let (profanity, duplicate, patterns) = futures::join!(
            self.profanity.run(submission, corpus),
            self.duplicate.run(submission, corpus),
            self.patterns.run(submission, corpus),
        );

        let report = ModerationReport {
            profanity: profanity.with_context(|| format!("{} check failed", self.profanity.name()))?,
            duplicate: duplicate.with_context(|| format!("{} check failed", self.duplicate.name()))?,
            patterns: patterns.with_context(|| format!("{} check failed", self.patterns.name()))?,
        };

        if !report.passed() {
            warn!(
                profanity = report.profanity.passed,
                duplicate = report.duplicate.passed,
                patterns = report.patterns.passed,
                "Submission flagged by moderation"
            );
        }

        Ok(report)
    }
}

impl Default for ModerationPipeline {
    fn default() -> Self {
        Self::from_config(&ModerationConfig::default())
    }
}

/// `title` and `text` joined for keyword and pattern scans
pub(crate) fn scan_text(submission: &StorySubmission) -> String {
    match submission.trimmed_text() {
        Some(text) => format!("{} {}", submission.title, text),
        None => submission.title.clone(),
    }
}
