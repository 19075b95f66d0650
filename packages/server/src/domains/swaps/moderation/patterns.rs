use anyhow::{Context, Result};
use async_trait::async_trait;
use lazy_static::lazy_static;
use regex::Regex;

use super::{scan_text, CheckOutcome, ContentCheck};
use crate::domains::stories::StorySubmission;
use crate::kernel::traits::StoryCorpus;

pub const DEFAULT_CONFIDENCE: f64 = 0.8;

/// A disallowed-topic pattern and the reason recorded when it matches
#[derive(Debug, Clone)]
pub struct PatternRule {
    pub regex: Regex,
    pub reason: String,
}

impl PatternRule {
    /// Compile a case-insensitive rule
    pub fn new(pattern: &str, reason: impl Into<String>) -> Result<Self> {
        let regex = Regex::new(&format!("(?i){}", pattern))
            .with_context(|| format!("Invalid moderation pattern: {}", pattern))?;
        Ok(Self {
            regex,
            reason: reason.into(),
        })
    }
}

lazy_static! {
    static ref DEFAULT_RULES: Vec<PatternRule> = vec![
        PatternRule {
            regex: Regex::new(r"(?i)\b(i('| wi)ll|gonna|going to)\s+(kill|hurt|shoot|stab)\s+(you|him|her|them)\b").unwrap(),
            reason: "Violent threat".to_string(),
        },
        PatternRule {
            regex: Regex::new(r"(?i)\b(kill|hurt)\s+myself\b|\bsuicide\s+(method|plan)s?\b").unwrap(),
            reason: "Self-harm".to_string(),
        },
        PatternRule {
            regex: Regex::new(r"(?i)\b(buy|selling|sell|order)\s+(cocaine|heroin|meth|fentanyl|mdma)\b").unwrap(),
            reason: "Illegal drug sales".to_string(),
        },
        PatternRule {
            regex: Regex::new(r"\b\d{3}-\d{2}-\d{4}\b").unwrap(),
            reason: "Personal identifier (SSN)".to_string(),
        },
    ];
}

pub fn default_rules() -> Vec<PatternRule> {
    DEFAULT_RULES.clone()
}

/// Flags title or text matching any configured rule
pub struct PatternCheck {
    rules: Vec<PatternRule>,
    confidence: f64,
}

impl PatternCheck {
    pub fn new(rules: Vec<PatternRule>, confidence: f64) -> Self {
        Self { rules, confidence }
    }

    /// Reasons of every rule matching `text`
    pub fn matches(&self, text: &str) -> Vec<String> {
        self.rules
            .iter()
            .filter(|rule| rule.regex.is_match(text))
            .map(|rule| rule.reason.clone())
            .collect()
    }
}

impl Default for PatternCheck {
    fn default() -> Self {
        Self::new(default_rules(), DEFAULT_CONFIDENCE)
    }
}

#[async_trait]
impl ContentCheck for PatternCheck {
    fn name(&self) -> &'static str {
        "moderation"
    }

    async fn run(&self, submission: &StorySubmission, _corpus: &dyn StoryCorpus) -> Result<CheckOutcome> {
        let reasons = self.matches(&scan_text(submission));
        if reasons.is_empty() {
            Ok(CheckOutcome::pass())
        } else {
            Ok(CheckOutcome::fail(reasons, Some(self.confidence)))
        }
    }
}
