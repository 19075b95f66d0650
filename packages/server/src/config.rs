use anyhow::{Context, Result};
use dotenvy::dotenv;
use std::env;

use crate::domains::swaps::models::DEFAULT_SWAP_TTL_HOURS;
use crate::domains::swaps::moderation::{ModerationConfig, PatternRule};

/// Every five minutes, on the minute
pub const DEFAULT_REAPER_CRON: &str = "0 */5 * * * *";

/// Application configuration loaded from environment variables
#[derive(Debug, Clone)]
pub struct Config {
    pub database_url: String,
    pub port: u16,
    pub jwt_secret: String,
    pub jwt_issuer: String,
    pub allowed_origins: Vec<String>,
    pub swap_expiry_hours: i64,
    pub moderation: ModerationConfig,
    pub reaper_cron: String,
}

fn split_list(raw: &str) -> Vec<String> {
    raw.split(',')
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(String::from)
        .collect()
}

impl Config {
    /// Load configuration from environment variables
    pub fn from_env() -> Result<Self> {
        // Load .env file if present (development)
        let _ = dotenv();
        Self::from_vars(|key| env::var(key).ok())
    }

    /// Build from any key lookup
    pub fn from_vars(get: impl Fn(&str) -> Option<String>) -> Result<Self> {
        let mut moderation = ModerationConfig::default();
        if let Some(raw) = get("MODERATION_BLOCKLIST") {
            moderation.blocklist = split_list(&raw);
        }
        if let Some(raw) = get("MODERATION_PATTERNS") {
            moderation.patterns = split_list(&raw)
                .iter()
                .map(|pattern| PatternRule::new(pattern, format!("Matches disallowed pattern: {}", pattern)))
                .collect::<Result<Vec<_>>>()
                .context("MODERATION_PATTERNS must be valid regular expressions")?;
        }

        let swap_expiry_hours: i64 = get("SWAP_EXPIRY_HOURS")
            .unwrap_or_else(|| DEFAULT_SWAP_TTL_HOURS.to_string())
            .parse()
            .context("SWAP_EXPIRY_HOURS must be a valid number")?;
        if swap_expiry_hours <= 0 {
            anyhow::bail!("SWAP_EXPIRY_HOURS must be positive");
        }

        Ok(Self {
            database_url: get("DATABASE_URL").context("DATABASE_URL must be set")?,
            port: get("PORT")
                .unwrap_or_else(|| "8080".to_string())
                .parse()
                .context("PORT must be a valid number")?,
            jwt_secret: get("JWT_SECRET").context("JWT_SECRET must be set")?,
            jwt_issuer: get("JWT_ISSUER").unwrap_or_else(|| "storyswap".to_string()),
            allowed_origins: get("ALLOWED_ORIGINS")
                .map(|raw| split_list(&raw))
                .unwrap_or_default(),
            swap_expiry_hours,
            moderation,
            reaper_cron: get("REAPER_CRON").unwrap_or_else(|| DEFAULT_REAPER_CRON.to_string()),
        })
    }
}
