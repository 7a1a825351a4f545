//! Leave request workflow.
//!
//! A request and its balance are always written in the same transaction so
//! `pending` and `used` never drift from the requests that produced them.

use chrono::{Datelike, Utc};
use sqlx::SqliteConnection;

use super::{find_one, insert_record, require_record, save_record, ListFilter, Repository};
use crate::errors::AppError;
use crate::models::{
    apply_leave_action, CreateLeaveRequest, Employee, LeaveAction, LeaveBalance, LeaveRequest,
    LeaveType, Record,
};

impl Repository {
    /// Submit a leave request and reserve its days on the matching balance.
    pub async fn submit_leave_request(
        &self,
        tenant: &str,
        actor: &str,
        request: CreateLeaveRequest,
    ) -> Result<Record<LeaveRequest>, AppError> {
        let leave = request.into_request()?;
        let mut tx = self.begin().await?;

        require_record::<Employee>(&mut tx, tenant, &leave.employee_id).await?;
        require_record::<LeaveType>(&mut tx, tenant, &leave.leave_type_id).await?;

        let mut balance = balance_for(&mut tx, tenant, &leave).await?;
        let available = balance.data.available();
        if available < leave.days {
            return Err(AppError::validation(format!(
                "Insufficient leave balance: {} days available, {} requested",
                available, leave.days
            )));
        }
        balance.data.pending += leave.days;
        save_record(&mut tx, tenant, actor, &mut balance).await?;

        let record = insert_record(&mut tx, tenant, actor, None, leave).await?;
        tx.commit().await?;

        tracing::info!(
            tenant = %tenant,
            id = %record.id,
            employee = %record.data.employee_id,
            days = record.data.days,
            "Leave request submitted"
        );
        Ok(record)
    }

    /// Approve, reject or cancel a leave request, settling its balance.
    pub async fn review_leave_request(
        &self,
        tenant: &str,
        actor: &str,
        id: &str,
        action: LeaveAction,
        comment: Option<String>,
    ) -> Result<Record<LeaveRequest>, AppError> {
        let mut tx = self.begin().await?;

        let mut request = require_record::<LeaveRequest>(&mut tx, tenant, id).await?;
        let mut balance = balance_for(&mut tx, tenant, &request.data).await?;

        apply_leave_action(action, &mut request.data, &mut balance.data)?;
        request.data.reviewed_by = Some(actor.to_string());
        request.data.reviewed_at = Some(Utc::now());
        request.data.review_comment = comment;

        save_record(&mut tx, tenant, actor, &mut balance).await?;
        save_record(&mut tx, tenant, actor, &mut request).await?;
        tx.commit().await?;

        tracing::info!(
            tenant = %tenant,
            id = %id,
            status = request.data.status.as_str(),
            "Leave request reviewed"
        );
        Ok(request)
    }
}

/// The balance a request draws from: same employee, leave type and start year.
async fn balance_for(
    conn: &mut SqliteConnection,
    tenant: &str,
    request: &LeaveRequest,
) -> Result<Record<LeaveBalance>, AppError> {
    let year = request.start_date.year();
    let filter = ListFilter::all()
        .and("employeeId", &request.employee_id)
        .and("leaveTypeId", &request.leave_type_id)
        .and("year", year.to_string());

    find_one::<LeaveBalance>(conn, tenant, filter)
        .await?
        .ok_or_else(|| {
            AppError::validation(format!(
                "No {} balance for employee {} in {}",
                request.leave_type_id, request.employee_id, year
            ))
        })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::init_database;
    use crate::models::LeaveStatus;
    use chrono::NaiveDate;
    use tempfile::TempDir;

    struct Setup {
        repo: Repository,
        _dir: TempDir,
    }

    async fn setup(allocated: f64) -> Setup {
        let dir = TempDir::new().expect("Failed to create temp dir");
        let pool = init_database(&dir.path().join("leave.sqlite"))
            .await
            .expect("Failed to init DB");
        let repo = Repository::new(pool);

        let employee: Employee = serde_json::from_value(serde_json::json!({
            "firstName": "Sara",
            "lastName": "Ali",
            "email": "sara.ali@example.com",
            "departmentId": "DEP001",
            "position": "Engineer",
            "hireDate": "2021-01-17",
            "basicSalary": 28000
        }))
        .unwrap();
        repo.create("t1", "hr", None, employee).await.unwrap();

        let leave_type: LeaveType = serde_json::from_value(serde_json::json!({
            "name": "Annual",
            "daysPerYear": 21
        }))
        .unwrap();
        repo.create("t1", "hr", None, leave_type).await.unwrap();

        let balance = LeaveBalance {
            employee_id: "EMP001".to_string(),
            leave_type_id: "LT001".to_string(),
            year: 2024,
            allocated,
            used: 0.0,
            pending: 0.0,
            carried_forward: 0.0,
        };
        repo.create("t1", "hr", None, balance).await.unwrap();

        Setup { repo, _dir: dir }
    }

    fn create_request(start: (u32, u32), end: (u32, u32)) -> CreateLeaveRequest {
        CreateLeaveRequest {
            employee_id: "EMP001".to_string(),
            leave_type_id: "LT001".to_string(),
            start_date: NaiveDate::from_ymd_opt(2024, start.0, start.1).unwrap(),
            end_date: NaiveDate::from_ymd_opt(2024, end.0, end.1).unwrap(),
            days: None,
            reason: Some("Family trip".to_string()),
        }
    }

    async fn balance(repo: &Repository) -> LeaveBalance {
        repo.get::<LeaveBalance>("t1", "LB001")
            .await
            .unwrap()
            .unwrap()
            .data
    }

    #[tokio::test]
    async fn test_submit_then_approve_moves_days_to_used() {
        let Setup { repo, _dir } = setup(21.0).await;

        let request = repo
            .submit_leave_request("t1", "sara", create_request((5, 5), (5, 9)))
            .await
            .unwrap();
        assert_eq!(request.id, "LR001");
        assert_eq!(request.data.days, 5.0);
        assert_eq!(request.data.status, LeaveStatus::Pending);
        assert_eq!(balance(&repo).await.pending, 5.0);

        let approved = repo
            .review_leave_request("t1", "mona", "LR001", LeaveAction::Approve, None)
            .await
            .unwrap();
        assert_eq!(approved.data.status, LeaveStatus::Approved);
        assert_eq!(approved.data.reviewed_by.as_deref(), Some("mona"));
        let after = balance(&repo).await;
        assert_eq!(after.pending, 0.0);
        assert_eq!(after.used, 5.0);

        let cancelled = repo
            .review_leave_request(
                "t1",
                "sara",
                "LR001",
                LeaveAction::Cancel,
                Some("Plans changed".to_string()),
            )
            .await
            .unwrap();
        assert_eq!(cancelled.data.status, LeaveStatus::Cancelled);
        assert_eq!(balance(&repo).await.used, 0.0);
    }

    #[tokio::test]
    async fn test_insufficient_balance_writes_nothing() {
        let Setup { repo, _dir } = setup(3.0).await;

        let err = repo
            .submit_leave_request("t1", "sara", create_request((5, 5), (5, 9)))
            .await
            .unwrap_err();
        assert_eq!(err.error_code(), "VALIDATION_ERROR");
        assert_eq!(balance(&repo).await.pending, 0.0);
        assert_eq!(repo.count_active::<LeaveRequest>("t1").await.unwrap(), 0);
    }

    #[tokio::test]
    async fn test_missing_balance_year_is_rejected() {
        let Setup { repo, _dir } = setup(21.0).await;
        let mut request = create_request((5, 5), (5, 6));
        request.start_date = NaiveDate::from_ymd_opt(2025, 1, 2).unwrap();
        request.end_date = NaiveDate::from_ymd_opt(2025, 1, 3).unwrap();

        let err = repo
            .submit_leave_request("t1", "sara", request)
            .await
            .unwrap_err();
        assert_eq!(err.error_code(), "VALIDATION_ERROR");
    }

    #[tokio::test]
    async fn test_reject_twice_is_invalid_transition() {
        let Setup { repo, _dir } = setup(21.0).await;
        repo.submit_leave_request("t1", "sara", create_request((6, 1), (6, 2)))
            .await
            .unwrap();
        repo.review_leave_request("t1", "mona", "LR001", LeaveAction::Reject, None)
            .await
            .unwrap();
        assert_eq!(balance(&repo).await.pending, 0.0);

        let err = repo
            .review_leave_request("t1", "mona", "LR001", LeaveAction::Approve, None)
            .await
            .unwrap_err();
        assert_eq!(err.error_code(), "VALIDATION_ERROR");
    }

    #[tokio::test]
    async fn test_second_balance_for_same_year_is_rejected() {
        let Setup { repo, _dir } = setup(21.0).await;
        let mut duplicate = balance(&repo).await;
        duplicate.allocated = 30.0;

        let err = repo
            .create("t1", "hr", None, duplicate.clone())
            .await
            .unwrap_err();
        assert_eq!(err.error_code(), "CONFLICT");

        duplicate.year = 2025;
        let next_year = repo.create("t1", "hr", None, duplicate).await.unwrap();
        assert_eq!(next_year.id, "LB002");

        let err = repo
            .update::<LeaveBalance>(
                "t1",
                "hr",
                &next_year.id,
                &serde_json::json!({ "year": 2024 }),
                None,
            )
            .await
            .unwrap_err();
        assert_eq!(err.error_code(), "CONFLICT");

        let unchanged = repo
            .update::<LeaveBalance>(
                "t1",
                "hr",
                "LB001",
                &serde_json::json!({ "allocated": 25 }),
                None,
            )
            .await
            .unwrap();
        assert_eq!(unchanged.data.allocated, 25.0);
    }
}
