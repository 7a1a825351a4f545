//! Demo data seeding endpoints.

use axum::{extract::State, Extension};

use super::{success, ApiResult};
use crate::context::RequestContext;
use crate::seed::{self, SeedCounts, SeedStatus, WipeCounts};
use crate::AppState;

/// POST /api/seed/egyptian-all - Replace the organization with the demo data.
pub async fn seed_egyptian_all(
    State(state): State<AppState>,
    Extension(ctx): Extension<RequestContext>,
) -> ApiResult<SeedCounts> {
    let counts = seed::seed_all(
        &state.repo,
        &ctx.tenant,
        &ctx.actor,
        &state.config.company_name,
    )
    .await?;
    success(counts)
}

/// GET /api/seed/egyptian-all - Per-collection record counts.
pub async fn seed_egyptian_status(
    State(state): State<AppState>,
    Extension(ctx): Extension<RequestContext>,
) -> ApiResult<SeedStatus> {
    success(seed::seed_status(&state.repo, &ctx.tenant).await?)
}

/// DELETE /api/seed/egyptian-all - Remove the seeded collections.
pub async fn wipe_egyptian_all(
    State(state): State<AppState>,
    Extension(ctx): Extension<RequestContext>,
) -> ApiResult<WipeCounts> {
    success(seed::wipe_all(&state.repo, &ctx.tenant).await?)
}
