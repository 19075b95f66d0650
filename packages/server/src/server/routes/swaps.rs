//! Swap routes: inspection, cancellation, retry and staff views.

use axum::{
    extract::{Extension, Path, Query},
    http::StatusCode,
    Json,
};
use serde::Deserialize;

use super::error::ApiResult;
use crate::common::{MemberId, PageArgs, SwapId};
use crate::domains::swaps::activities::{
    cancel_swap, get_swap, list_user_swaps, retry_swap, review_queue, swap_stats, Timeframe,
};
use crate::domains::swaps::{SwapData, SwapStatsData, SwapStatus, UnlockResponse};
use crate::server::app::AppState;
use crate::server::middleware::{require_auth, AuthUser};

#[derive(Debug, Default, Deserialize)]
pub struct PageQuery {
    pub page: Option<u32>,
    pub limit: Option<u32>,
}

impl PageQuery {
    fn page_args(&self) -> PageArgs {
        PageArgs::new(self.page, self.limit).validate()
    }
}

#[derive(Debug, Default, Deserialize)]
pub struct ListSwapsQuery {
    pub status: Option<SwapStatus>,
    pub page: Option<u32>,
    pub limit: Option<u32>,
}

#[derive(Debug, Default, Deserialize)]
pub struct StatsQuery {
    #[serde(default)]
    pub timeframe: Timeframe,
}

/// GET /api/swaps/:id
pub async fn get_swap_handler(
    Extension(state): Extension<AppState>,
    user: Option<Extension<AuthUser>>,
    Path(swap_id): Path<SwapId>,
) -> ApiResult<Json<SwapData>> {
    let user = require_auth(user.map(|Extension(u)| u))?;
    Ok(Json(get_swap(swap_id, user.actor(), &state.deps).await?))
}

/// DELETE /api/swaps/:id
pub async fn cancel_swap_handler(
    Extension(state): Extension<AppState>,
    user: Option<Extension<AuthUser>>,
    Path(swap_id): Path<SwapId>,
) -> ApiResult<StatusCode> {
    let user = require_auth(user.map(|Extension(u)| u))?;
    cancel_swap(swap_id, user.actor(), &state.deps).await?;
    Ok(StatusCode::NO_CONTENT)
}

/// POST /api/swaps/:id/retry
pub async fn retry_swap_handler(
    Extension(state): Extension<AppState>,
    user: Option<Extension<AuthUser>>,
    Path(swap_id): Path<SwapId>,
) -> ApiResult<Json<UnlockResponse>> {
    let user = require_auth(user.map(|Extension(u)| u))?;
    Ok(Json(retry_swap(swap_id, user.actor(), &state.deps).await?))
}

/// GET /api/members/:id/swaps?status=&page=&limit=
pub async fn list_member_swaps_handler(
    Extension(state): Extension<AppState>,
    user: Option<Extension<AuthUser>>,
    Path(member_id): Path<MemberId>,
    Query(query): Query<ListSwapsQuery>,
) -> ApiResult<Json<Vec<SwapData>>> {
    let user = require_auth(user.map(|Extension(u)| u))?;
    let page = PageArgs::new(query.page, query.limit).validate();
    let swaps = list_user_swaps(member_id, query.status, page, user.actor(), &state.deps).await?;
    Ok(Json(swaps))
}

/// GET /api/swaps/stats?timeframe=24h|7d|30d|all
pub async fn swap_stats_handler(
    Extension(state): Extension<AppState>,
    user: Option<Extension<AuthUser>>,
    Query(query): Query<StatsQuery>,
) -> ApiResult<Json<SwapStatsData>> {
    let user = require_auth(user.map(|Extension(u)| u))?;
    Ok(Json(swap_stats(query.timeframe, user.actor(), &state.deps).await?))
}

/// GET /api/swaps/review-queue
pub async fn review_queue_handler(
    Extension(state): Extension<AppState>,
    user: Option<Extension<AuthUser>>,
    Query(query): Query<PageQuery>,
) -> ApiResult<Json<Vec<SwapData>>> {
    let user = require_auth(user.map(|Extension(u)| u))?;
    Ok(Json(review_queue(query.page_args(), user.actor(), &state.deps).await?))
}
