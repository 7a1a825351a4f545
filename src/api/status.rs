//! Status badge lookup.

use axum::extract::Path;

use super::{success, ApiResult};
use crate::models::{status_badge, StatusBadge, StatusKind};

/// GET /api/status-badges/:kind/:status
pub async fn get_status_badge(
    Path((kind, status)): Path<(String, String)>,
) -> ApiResult<StatusBadge> {
    let kind = StatusKind::parse(&kind)?;
    success(status_badge(kind, &status))
}
