//! Employee self-service portal.

use axum::{
    extract::{Path, State},
    Extension,
};
use chrono::Utc;
use serde::Serialize;

use super::{success, ApiResult};
use crate::context::RequestContext;
use crate::db::ListFilter;
use crate::errors::AppError;
use crate::models::{
    Announcement, Employee, LeaveBalance, LeaveBalanceSummary, Payslip, Record, ServiceRequest,
};
use crate::AppState;

/// Number of payslips shown on the portal.
const RECENT_PAYSLIPS: usize = 6;

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PortalOverview {
    pub profile: Record<Employee>,
    pub leave_balances: Vec<LeaveBalanceSummary>,
    pub recent_payslips: Vec<Record<Payslip>>,
    pub open_service_requests: Vec<Record<ServiceRequest>>,
    pub announcements: Vec<Record<Announcement>>,
}

/// GET /api/portal/:employee_id - Everything the employee home page shows.
pub async fn get_portal(
    State(state): State<AppState>,
    Extension(ctx): Extension<RequestContext>,
    Path(employee_id): Path<String>,
) -> ApiResult<PortalOverview> {
    let tenant = ctx.tenant.as_str();
    let repo = &state.repo;
    let own = ListFilter::all().and("employeeId", &employee_id);
    let everyone = ListFilter::all();

    let (profile, balances, payslips, requests, announcements) = tokio::try_join!(
        repo.get::<Employee>(tenant, &employee_id),
        repo.list::<LeaveBalance>(tenant, &own),
        repo.list::<Payslip>(tenant, &own),
        repo.list::<ServiceRequest>(tenant, &own),
        repo.list::<Announcement>(tenant, &everyone),
    )?;

    let profile = profile
        .ok_or_else(|| AppError::missing("Employee", &employee_id))?;

    let mut recent_payslips = payslips.items;
    recent_payslips.sort_by(|a, b| b.data.period.cmp(&a.data.period));
    recent_payslips.truncate(RECENT_PAYSLIPS);

    let now = Utc::now();
    let mut announcements: Vec<_> = announcements
        .items
        .into_iter()
        .filter(|a| a.data.visible_to(&profile.data.department_id, now))
        .collect();
    announcements.sort_by(|a, b| {
        b.data
            .priority
            .cmp(&a.data.priority)
            .then_with(|| b.data.published_at.cmp(&a.data.published_at))
    });

    success(PortalOverview {
        leave_balances: balances
            .items
            .into_iter()
            .map(LeaveBalanceSummary::from)
            .collect(),
        recent_payslips,
        open_service_requests: requests
            .items
            .into_iter()
            .filter(|r| r.data.status.is_open())
            .collect(),
        announcements,
        profile,
    })
}
