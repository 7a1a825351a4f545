//! Leave request and balance endpoints.

use std::collections::HashMap;

use axum::{
    body::Bytes,
    extract::{Path, State},
    Extension,
};

use super::resources::list_filter;
use super::{optional_body, success, ApiResult, JsonBody, QueryParams};
use crate::context::RequestContext;
use crate::models::{
    CreateLeaveRequest, LeaveAction, LeaveBalance, LeaveBalanceSummary, LeaveRequest, Record,
    ReviewLeaveRequest,
};
use crate::AppState;

/// POST /api/leave-requests - Submit a leave request.
pub async fn create_leave_request(
    State(state): State<AppState>,
    Extension(ctx): Extension<RequestContext>,
    JsonBody(request): JsonBody<CreateLeaveRequest>,
) -> ApiResult<Record<LeaveRequest>> {
    let record = state
        .repo
        .submit_leave_request(&ctx.tenant, &ctx.actor, request)
        .await?;
    success(record)
}

/// POST /api/leave-requests/:id/approve
pub async fn approve_leave_request(
    state: State<AppState>,
    ctx: Extension<RequestContext>,
    id: Path<String>,
    body: Bytes,
) -> ApiResult<Record<LeaveRequest>> {
    review(state, ctx, id, body, LeaveAction::Approve).await
}

/// POST /api/leave-requests/:id/reject
pub async fn reject_leave_request(
    state: State<AppState>,
    ctx: Extension<RequestContext>,
    id: Path<String>,
    body: Bytes,
) -> ApiResult<Record<LeaveRequest>> {
    review(state, ctx, id, body, LeaveAction::Reject).await
}

/// POST /api/leave-requests/:id/cancel
pub async fn cancel_leave_request(
    state: State<AppState>,
    ctx: Extension<RequestContext>,
    id: Path<String>,
    body: Bytes,
) -> ApiResult<Record<LeaveRequest>> {
    review(state, ctx, id, body, LeaveAction::Cancel).await
}

async fn review(
    State(state): State<AppState>,
    Extension(ctx): Extension<RequestContext>,
    Path(id): Path<String>,
    body: Bytes,
    action: LeaveAction,
) -> ApiResult<Record<LeaveRequest>> {
    let review: ReviewLeaveRequest = optional_body(&body)?;
    let record = state
        .repo
        .review_leave_request(&ctx.tenant, &ctx.actor, &id, action, review.comment)
        .await?;
    success(record)
}

/// GET /api/leave-balances/summary - Balances with their derived figures.
///
/// Accepts the leave balance filters (`employeeId`, `leaveTypeId`, `year`).
pub async fn leave_balance_summary(
    State(state): State<AppState>,
    Extension(ctx): Extension<RequestContext>,
    QueryParams(params): QueryParams<HashMap<String, String>>,
) -> ApiResult<Vec<LeaveBalanceSummary>> {
    let mut filter = list_filter::<LeaveBalance>(&state, &params)?;
    if !params.contains_key("limit") {
        filter.limit = None;
    }
    let page = state.repo.list::<LeaveBalance>(&ctx.tenant, &filter).await?;
    success(page.items.into_iter().map(LeaveBalanceSummary::from).collect())
}
