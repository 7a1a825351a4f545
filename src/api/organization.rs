//! Organization chart endpoints.

use std::collections::HashSet;

use axum::{
    extract::{Path, State},
    Extension,
};
use serde::{Deserialize, Serialize};

use super::{success, ApiResult, QueryParams};
use crate::context::RequestContext;
use crate::errors::AppError;
use crate::models::{OrganizationChart, OrganizationStats, Record};
use crate::AppState;

#[derive(Debug, Default, Deserialize)]
pub struct ChartQuery {
    /// Comma-separated node IDs to expand.
    #[serde(default)]
    pub expanded: Option<String>,
    #[serde(default)]
    pub depth: Option<usize>,
}

/// Chart together with its statistics.
#[derive(Debug, Serialize)]
pub struct ChartResponse {
    #[serde(flatten)]
    pub chart: Record<OrganizationChart>,
    pub stats: OrganizationStats,
}

/// GET /api/organization-chart - The active chart, optionally collapsed.
pub async fn get_organization_chart(
    State(state): State<AppState>,
    Extension(ctx): Extension<RequestContext>,
    QueryParams(query): QueryParams<ChartQuery>,
) -> ApiResult<ChartResponse> {
    let mut chart = state.repo.active_chart(&ctx.tenant).await?;
    let stats = chart.data.stats();

    if query.expanded.is_some() || query.depth.is_some() {
        let expanded: HashSet<String> = query
            .expanded
            .as_deref()
            .unwrap_or_default()
            .split(',')
            .map(str::trim)
            .filter(|id| !id.is_empty())
            .map(str::to_string)
            .collect();
        chart.data.root = chart.data.root.collapsed_view(&expanded, query.depth);
    }

    success(ChartResponse { chart, stats })
}

/// GET /api/organization-chart/stats
pub async fn get_organization_stats(
    State(state): State<AppState>,
    Extension(ctx): Extension<RequestContext>,
) -> ApiResult<OrganizationStats> {
    let chart = state.repo.active_chart(&ctx.tenant).await?;
    success(chart.data.stats())
}

/// GET /api/organization-chart/path/:node_id - Node IDs from the root to a node.
pub async fn get_organization_path(
    State(state): State<AppState>,
    Extension(ctx): Extension<RequestContext>,
    Path(node_id): Path<String>,
) -> ApiResult<Vec<String>> {
    let chart = state.repo.active_chart(&ctx.tenant).await?;
    match chart.data.root.path_to(&node_id) {
        Some(path) => success(path),
        None => Err(AppError::NotFound(format!(
            "Node {} is not in the organization chart",
            node_id
        ))),
    }
}

/// POST /api/organization-chart/rebuild
pub async fn rebuild_organization_chart(
    State(state): State<AppState>,
    Extension(ctx): Extension<RequestContext>,
) -> ApiResult<ChartResponse> {
    let chart = state
        .repo
        .rebuild_chart(&ctx.tenant, &ctx.actor, &state.config.company_name)
        .await?;
    let stats = chart.data.stats();
    success(ChartResponse { chart, stats })
}
