//! Organization chart storage.

use super::{deactivate_record, insert_record, select_records, ListFilter, Repository};
use crate::errors::AppError;
use crate::models::{Department, Employee, OrganizationChart, Record};

impl Repository {
    /// The tenant's current chart; the most recently created one wins.
    pub async fn active_chart(&self, tenant: &str) -> Result<Record<OrganizationChart>, AppError> {
        let charts = self
            .list::<OrganizationChart>(tenant, &ListFilter::all())
            .await?;
        charts
            .items
            .into_iter()
            .max_by(|a, b| a.system_info.created_at.cmp(&b.system_info.created_at))
            .ok_or_else(|| AppError::NotFound("No organization chart has been built".to_string()))
    }

    /// Build a new chart from the active departments and employees.
    ///
    /// Previous charts are deactivated in the same transaction.
    pub async fn rebuild_chart(
        &self,
        tenant: &str,
        actor: &str,
        company_name: &str,
    ) -> Result<Record<OrganizationChart>, AppError> {
        let mut tx = self.begin().await?;

        let departments = select_records::<Department>(&mut tx, tenant, &ListFilter::all()).await?;
        let employees = select_records::<Employee>(&mut tx, tenant, &ListFilter::all()).await?;
        let previous =
            select_records::<OrganizationChart>(&mut tx, tenant, &ListFilter::all()).await?;
        for chart in &previous.items {
            deactivate_record::<OrganizationChart>(&mut tx, tenant, actor, &chart.id).await?;
        }

        let chart = OrganizationChart::build(company_name, &departments.items, &employees.items);
        let record = insert_record(&mut tx, tenant, actor, None, chart).await?;
        tx.commit().await?;

        tracing::info!(
            tenant = %tenant,
            id = %record.id,
            departments = departments.total,
            employees = employees.total,
            replaced = previous.total,
            "Rebuilt organization chart"
        );
        Ok(record)
    }
}
