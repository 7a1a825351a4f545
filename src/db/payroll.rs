//! Payroll batch processing.

use std::collections::HashSet;

use serde::Serialize;
use sqlx::SqliteConnection;

use super::{insert_record, require_record, save_record, select_records, ListFilter, Repository};
use crate::errors::AppError;
use crate::models::{
    Employee, EmployeePayroll, PayrollBatch, PayrollBatchStatus, Payslip, Record,
};

/// Outcome of generating the lines of a batch.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PayrollGeneration {
    pub batch: Record<PayrollBatch>,
    pub lines_created: usize,
}

impl Repository {
    /// Create a payroll line for every active employee not yet in the batch.
    ///
    /// Only draft batches accept new lines. Totals are recalculated afterwards.
    pub async fn generate_payroll(
        &self,
        tenant: &str,
        actor: &str,
        batch_id: &str,
    ) -> Result<PayrollGeneration, AppError> {
        let mut tx = self.begin().await?;
        let mut batch = require_record::<PayrollBatch>(&mut tx, tenant, batch_id).await?;
        if batch.data.status != PayrollBatchStatus::Draft {
            return Err(AppError::validation(format!(
                "Payroll batch {} is not a draft",
                batch_id
            )));
        }

        let mut lines = batch_lines(&mut tx, tenant, batch_id).await?;
        let covered: HashSet<String> = lines
            .iter()
            .map(|line| line.data.employee_id.clone())
            .collect();
        let employees = select_records::<Employee>(&mut tx, tenant, &ListFilter::all()).await?;

        let mut lines_created = 0;
        for employee in employees.items {
            if covered.contains(&employee.id) {
                continue;
            }
            let line =
                EmployeePayroll::for_employee(batch_id, &employee.id, employee.data.basic_salary);
            lines.push(insert_record(&mut tx, tenant, actor, None, line).await?);
            lines_created += 1;
        }

        batch.data.apply_totals(lines.iter().map(|line| &line.data));
        save_record(&mut tx, tenant, actor, &mut batch).await?;
        tx.commit().await?;

        tracing::info!(
            tenant = %tenant,
            batch = %batch_id,
            lines_created,
            total_net = batch.data.total_net,
            "Generated payroll lines"
        );
        Ok(PayrollGeneration {
            batch,
            lines_created,
        })
    }

    /// Recompute a batch's totals and employee count from its active lines.
    pub async fn recalculate_payroll(
        &self,
        tenant: &str,
        actor: &str,
        batch_id: &str,
    ) -> Result<Record<PayrollBatch>, AppError> {
        let mut tx = self.begin().await?;
        let mut batch = require_record::<PayrollBatch>(&mut tx, tenant, batch_id).await?;
        let lines = batch_lines(&mut tx, tenant, batch_id).await?;

        batch.data.apply_totals(lines.iter().map(|line| &line.data));
        save_record(&mut tx, tenant, actor, &mut batch).await?;
        tx.commit().await?;

        tracing::debug!(
            batch = %batch_id,
            employees = batch.data.employee_count,
            "Recalculated payroll batch"
        );
        Ok(batch)
    }

    /// Issue a payslip for every line of an approved batch that has none for its period.
    pub async fn issue_payslips(
        &self,
        tenant: &str,
        actor: &str,
        batch_id: &str,
    ) -> Result<Vec<Record<Payslip>>, AppError> {
        let mut tx = self.begin().await?;
        let batch = require_record::<PayrollBatch>(&mut tx, tenant, batch_id).await?;
        if batch.data.status != PayrollBatchStatus::Approved {
            return Err(AppError::validation(format!(
                "Payslips can only be issued for approved batches; {} is not approved",
                batch_id
            )));
        }

        let period = &batch.data.period;
        let existing = select_records::<Payslip>(
            &mut tx,
            tenant,
            &ListFilter::all().and("period", period),
        )
        .await?;
        let issued: HashSet<String> = existing
            .items
            .into_iter()
            .map(|slip| slip.data.employee_id)
            .collect();

        let mut created = Vec::new();
        for line in batch_lines(&mut tx, tenant, batch_id).await? {
            if issued.contains(&line.data.employee_id) {
                continue;
            }
            let payslip = line.data.to_payslip(period, &batch.data.currency);
            created.push(insert_record(&mut tx, tenant, actor, None, payslip).await?);
        }
        tx.commit().await?;

        tracing::info!(
            tenant = %tenant,
            batch = %batch_id,
            issued = created.len(),
            "Issued payslips"
        );
        Ok(created)
    }
}

async fn batch_lines(
    conn: &mut SqliteConnection,
    tenant: &str,
    batch_id: &str,
) -> Result<Vec<Record<EmployeePayroll>>, AppError> {
    let page = select_records::<EmployeePayroll>(
        conn,
        tenant,
        &ListFilter::all().and("batchId", batch_id),
    )
    .await?;
    Ok(page.items)
}
