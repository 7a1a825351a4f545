//! Payroll batch processing endpoints.

use axum::{
    extract::{Path, State},
    Extension,
};

use super::{success, ApiResult};
use crate::context::RequestContext;
use crate::db::PayrollGeneration;
use crate::models::{PayrollBatch, Payslip, Record};
use crate::AppState;

/// POST /api/payroll-batches/:id/generate - Add a line per active employee.
pub async fn generate_payroll(
    State(state): State<AppState>,
    Extension(ctx): Extension<RequestContext>,
    Path(id): Path<String>,
) -> ApiResult<PayrollGeneration> {
    success(
        state
            .repo
            .generate_payroll(&ctx.tenant, &ctx.actor, &id)
            .await?,
    )
}

/// POST /api/payroll-batches/:id/recalculate - Recompute the batch totals.
pub async fn recalculate_payroll(
    State(state): State<AppState>,
    Extension(ctx): Extension<RequestContext>,
    Path(id): Path<String>,
) -> ApiResult<Record<PayrollBatch>> {
    success(
        state
            .repo
            .recalculate_payroll(&ctx.tenant, &ctx.actor, &id)
            .await?,
    )
}

/// POST /api/payroll-batches/:id/payslips - Issue payslips for an approved batch.
pub async fn issue_payslips(
    State(state): State<AppState>,
    Extension(ctx): Extension<RequestContext>,
    Path(id): Path<String>,
) -> ApiResult<Vec<Record<Payslip>>> {
    success(
        state
            .repo
            .issue_payslips(&ctx.tenant, &ctx.actor, &id)
            .await?,
    )
}
