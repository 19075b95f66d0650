//! Server dependencies for activities (using traits for testability)
//!
//! This module provides the central dependency container used by every
//! swap and story activity. Storage sits behind the `Base*Store` traits so
//! tests can run against the in-memory store.

use std::sync::Arc;

use chrono::Duration;

use crate::domains::auth::JwtService;
use crate::domains::swaps::models::DEFAULT_SWAP_TTL_HOURS;
use crate::domains::swaps::moderation::ModerationPipeline;
use crate::kernel::traits::BaseStore;

/// Dependencies shared by all request handlers and scheduled tasks
#[derive(Clone)]
pub struct ServerDeps {
    pub store: Arc<dyn BaseStore>,
    pub moderation: ModerationPipeline,
    /// Lifetime of a new swap before it can be reaped
    pub swap_ttl: Duration,
    /// JWT service for verifying bearer tokens
    pub jwt_service: Arc<JwtService>,
}

impl ServerDeps {
    pub fn new(
        store: Arc<dyn BaseStore>,
        moderation: ModerationPipeline,
        swap_ttl: Duration,
        jwt_service: Arc<JwtService>,
    ) -> Self {
        Self {
            store,
            moderation,
            swap_ttl,
            jwt_service,
        }
    }

    /// Default moderation and swap lifetime
    pub fn with_defaults(store: Arc<dyn BaseStore>, jwt_service: Arc<JwtService>) -> Self {
        Self::new(
            store,
            ModerationPipeline::default(),
            Duration::hours(DEFAULT_SWAP_TTL_HOURS),
            jwt_service,
        )
    }
}
