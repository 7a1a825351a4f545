//! Leave types, balances and requests.

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};

use super::{require_non_empty, require_non_negative, Record, Resource};
use crate::errors::AppError;

/// A category of leave (annual, sick, ...).
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct LeaveType {
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name_ar: Option<String>,
    pub days_per_year: f64,
    #[serde(default = "default_true")]
    pub paid: bool,
    #[serde(default)]
    pub carry_forward: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub max_carry_forward: Option<f64>,
    #[serde(default = "default_true")]
    pub requires_approval: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub color: Option<String>,
}

fn default_true() -> bool {
    true
}

impl Resource for LeaveType {
    const COLLECTION: &'static str = "leave_types";
    const ID_PREFIX: &'static str = "LT";
    const LABEL: &'static str = "Leave type";
    const FILTER_FIELDS: &'static [&'static str] = &["paid", "carryForward"];

    fn validate(&self) -> Result<(), AppError> {
        require_non_empty(&self.name, "Leave type name")?;
        require_non_negative(self.days_per_year, "Days per year")?;
        if let Some(max) = self.max_carry_forward {
            require_non_negative(max, "Max carry forward")?;
            if !self.carry_forward && max > 0.0 {
                return Err(AppError::validation(
                    "Max carry forward requires carryForward to be enabled",
                ));
            }
        }
        Ok(())
    }
}

/// An employee's entitlement for one leave type in one year.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct LeaveBalance {
    pub employee_id: String,
    pub leave_type_id: String,
    pub year: i32,
    pub allocated: f64,
    #[serde(default)]
    pub used: f64,
    #[serde(default)]
    pub pending: f64,
    #[serde(default)]
    pub carried_forward: f64,
}

impl LeaveBalance {
    /// Entitlement for the year including carried-forward days.
    pub fn total(&self) -> f64 {
        self.allocated + self.carried_forward
    }

    /// Days still available for new requests.
    pub fn available(&self) -> f64 {
        self.total() - self.used - self.pending
    }

    /// Share of the entitlement that is used or pending, in whole percent.
    ///
    /// The raw value may exceed 100 when a balance was over-drawn; callers
    /// rendering a progress bar should use [`LeaveBalance::display_percent`].
    pub fn utilization_percent(&self) -> i64 {
        let total = self.total();
        if total <= 0.0 {
            return 0;
        }
        ((self.used + self.pending) / total * 100.0).round() as i64
    }

    pub fn display_percent(&self) -> i64 {
        self.utilization_percent().min(100)
    }
}

impl Resource for LeaveBalance {
    const COLLECTION: &'static str = "leave_balances";
    const ID_PREFIX: &'static str = "LB";
    const LABEL: &'static str = "Leave balance";
    const FILTER_FIELDS: &'static [&'static str] = &["employeeId", "leaveTypeId", "year"];

    fn unique_key(&self) -> Vec<(&'static str, String)> {
        vec![
            ("employeeId", self.employee_id.clone()),
            ("leaveTypeId", self.leave_type_id.clone()),
            ("year", self.year.to_string()),
        ]
    }

    fn validate(&self) -> Result<(), AppError> {
        require_non_empty(&self.employee_id, "Employee")?;
        require_non_empty(&self.leave_type_id, "Leave type")?;
        require_non_negative(self.allocated, "Allocated days")?;
        require_non_negative(self.used, "Used days")?;
        require_non_negative(self.pending, "Pending days")?;
        require_non_negative(self.carried_forward, "Carried forward days")?;
        Ok(())
    }
}

/// A balance together with its derived figures.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct LeaveBalanceSummary {
    #[serde(flatten)]
    pub balance: Record<LeaveBalance>,
    pub total: f64,
    pub available: f64,
    pub utilization_percent: i64,
    pub display_percent: i64,
}

impl From<Record<LeaveBalance>> for LeaveBalanceSummary {
    fn from(balance: Record<LeaveBalance>) -> Self {
        Self {
            total: balance.data.total(),
            available: balance.data.available(),
            utilization_percent: balance.data.utilization_percent(),
            display_percent: balance.data.display_percent(),
            balance,
        }
    }
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum LeaveStatus {
    Pending,
    Approved,
    Rejected,
    Cancelled,
}

impl LeaveStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            LeaveStatus::Pending => "pending",
            LeaveStatus::Approved => "approved",
            LeaveStatus::Rejected => "rejected",
            LeaveStatus::Cancelled => "cancelled",
        }
    }
}

/// A request by an employee to take leave.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct LeaveRequest {
    pub employee_id: String,
    pub leave_type_id: String,
    pub start_date: NaiveDate,
    pub end_date: NaiveDate,
    pub days: f64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub reason: Option<String>,
    pub status: LeaveStatus,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub reviewed_by: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub reviewed_at: Option<DateTime<Utc>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub review_comment: Option<String>,
}

impl Resource for LeaveRequest {
    const COLLECTION: &'static str = "leave_requests";
    const ID_PREFIX: &'static str = "LR";
    const LABEL: &'static str = "Leave request";
    const FILTER_FIELDS: &'static [&'static str] = &["employeeId", "leaveTypeId", "status"];

    fn validate(&self) -> Result<(), AppError> {
        require_non_empty(&self.employee_id, "Employee")?;
        require_non_empty(&self.leave_type_id, "Leave type")?;
        if self.end_date < self.start_date {
            return Err(AppError::validation("End date must not be before start date"));
        }
        if !self.days.is_finite() || self.days <= 0.0 {
            return Err(AppError::validation("Days must be greater than zero"));
        }
        Ok(())
    }
}

/// Request body for submitting a leave request.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateLeaveRequest {
    pub employee_id: String,
    pub leave_type_id: String,
    pub start_date: NaiveDate,
    pub end_date: NaiveDate,
    #[serde(default)]
    pub days: Option<f64>,
    #[serde(default)]
    pub reason: Option<String>,
}

impl CreateLeaveRequest {
    /// Build the pending request, defaulting `days` to the inclusive calendar span.
    pub fn into_request(self) -> Result<LeaveRequest, AppError> {
        if self.end_date < self.start_date {
            return Err(AppError::validation("End date must not be before start date"));
        }
        let days = self
            .days
            .unwrap_or_else(|| inclusive_days(self.start_date, self.end_date));
        let request = LeaveRequest {
            employee_id: self.employee_id,
            leave_type_id: self.leave_type_id,
            start_date: self.start_date,
            end_date: self.end_date,
            days,
            reason: self.reason,
            status: LeaveStatus::Pending,
            reviewed_by: None,
            reviewed_at: None,
            review_comment: None,
        };
        request.validate()?;
        Ok(request)
    }
}

/// Number of calendar days from `start` to `end`, both included.
pub fn inclusive_days(start: NaiveDate, end: NaiveDate) -> f64 {
    ((end - start).num_days() + 1) as f64
}

/// Review action applied to a leave request.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LeaveAction {
    Approve,
    Reject,
    Cancel,
}

/// Request body for approve/reject/cancel.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ReviewLeaveRequest {
    #[serde(default)]
    pub comment: Option<String>,
}

/// Apply a review action to a request and its balance.
///
/// Both values are mutated in place; nothing is written on error.
pub fn apply_leave_action(
    action: LeaveAction,
    request: &mut LeaveRequest,
    balance: &mut LeaveBalance,
) -> Result<(), AppError> {
    let days = request.days;
    match (action, request.status) {
        (LeaveAction::Approve, LeaveStatus::Pending) => {
            balance.pending = (balance.pending - days).max(0.0);
            balance.used += days;
            request.status = LeaveStatus::Approved;
        }
        (LeaveAction::Reject, LeaveStatus::Pending) => {
            balance.pending = (balance.pending - days).max(0.0);
            request.status = LeaveStatus::Rejected;
        }
        (LeaveAction::Cancel, LeaveStatus::Pending) => {
            balance.pending = (balance.pending - days).max(0.0);
            request.status = LeaveStatus::Cancelled;
        }
        (LeaveAction::Cancel, LeaveStatus::Approved) => {
            balance.used = (balance.used - days).max(0.0);
            request.status = LeaveStatus::Cancelled;
        }
        (action, status) => {
            return Err(AppError::validation(format!(
                "Cannot {:?} a leave request that is {}",
                action,
                status.as_str()
            )
            .to_lowercase()));
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn balance(allocated: f64, carried: f64, used: f64, pending: f64) -> LeaveBalance {
        LeaveBalance {
            employee_id: "EMP001".to_string(),
            leave_type_id: "LT001".to_string(),
            year: 2024,
            allocated,
            used,
            pending,
            carried_forward: carried,
        }
    }

    fn request(days: f64, status: LeaveStatus) -> LeaveRequest {
        let start = NaiveDate::from_ymd_opt(2024, 5, 5).unwrap();
        LeaveRequest {
            employee_id: "EMP001".to_string(),
            leave_type_id: "LT001".to_string(),
            start_date: start,
            end_date: start,
            days,
            reason: None,
            status,
            reviewed_by: None,
            reviewed_at: None,
            review_comment: None,
        }
    }

    #[test]
    fn test_utilization_rounds() {
        // (5 + 2) / (21 + 3) = 29.17%
        let b = balance(21.0, 3.0, 5.0, 2.0);
        assert_eq!(b.total(), 24.0);
        assert_eq!(b.available(), 17.0);
        assert_eq!(b.utilization_percent(), 29);
        assert_eq!(b.display_percent(), 29);
    }

    #[test]
    fn test_utilization_display_is_clamped() {
        let b = balance(10.0, 0.0, 12.0, 3.0);
        assert_eq!(b.utilization_percent(), 150);
        assert_eq!(b.display_percent(), 100);
        assert!(b.available() < 0.0);
    }

    #[test]
    fn test_utilization_of_empty_entitlement_is_zero() {
        let b = balance(0.0, 0.0, 0.0, 0.0);
        assert_eq!(b.utilization_percent(), 0);
    }

    #[test]
    fn test_inclusive_days() {
        let start = NaiveDate::from_ymd_opt(2024, 1, 30).unwrap();
        let end = NaiveDate::from_ymd_opt(2024, 2, 2).unwrap();
        assert_eq!(inclusive_days(start, end), 4.0);
        assert_eq!(inclusive_days(start, start), 1.0);
    }

    #[test]
    fn test_create_rejects_reversed_dates() {
        let body = CreateLeaveRequest {
            employee_id: "EMP001".to_string(),
            leave_type_id: "LT001".to_string(),
            start_date: NaiveDate::from_ymd_opt(2024, 2, 2).unwrap(),
            end_date: NaiveDate::from_ymd_opt(2024, 2, 1).unwrap(),
            days: None,
            reason: None,
        };
        assert!(body.into_request().is_err());
    }

    #[test]
    fn test_approve_moves_pending_to_used() {
        let mut b = balance(21.0, 0.0, 0.0, 3.0);
        let mut r = request(3.0, LeaveStatus::Pending);
        apply_leave_action(LeaveAction::Approve, &mut r, &mut b).unwrap();
        assert_eq!(r.status, LeaveStatus::Approved);
        assert_eq!(b.pending, 0.0);
        assert_eq!(b.used, 3.0);
    }

    #[test]
    fn test_cancel_approved_returns_days() {
        let mut b = balance(21.0, 0.0, 3.0, 0.0);
        let mut r = request(3.0, LeaveStatus::Approved);
        apply_leave_action(LeaveAction::Cancel, &mut r, &mut b).unwrap();
        assert_eq!(r.status, LeaveStatus::Cancelled);
        assert_eq!(b.used, 0.0);
    }

    #[test]
    fn test_invalid_transition_is_rejected() {
        let mut b = balance(21.0, 0.0, 0.0, 0.0);
        let mut r = request(2.0, LeaveStatus::Rejected);
        let err = apply_leave_action(LeaveAction::Approve, &mut r, &mut b).unwrap_err();
        assert_eq!(err.error_code(), "VALIDATION_ERROR");
        assert_eq!(r.status, LeaveStatus::Rejected);
    }

    #[test]
    fn test_unknown_status_is_rejected_at_deserialization() {
        let value = serde_json::json!("on_hold");
        assert!(serde_json::from_value::<LeaveStatus>(value).is_err());
    }
}
