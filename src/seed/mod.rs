//! Demo data seeding.
//!
//! Seeding and wiping each run in a single transaction, so a failure leaves
//! the previous data in place and repeating a seed is always safe.

mod fixtures;

use std::collections::HashMap;

use chrono::NaiveDate;
use serde::Serialize;
use sqlx::SqliteConnection;

use crate::db::{insert_record, purge_collection, reset_sequence, Repository};
use crate::errors::AppError;
use crate::models::{format_code, Department, Employee, OrganizationChart, Resource};

pub use fixtures::{DEPARTMENTS, EMPLOYEES};

const EMAIL_DOMAIN: &str = "nilegroup.com.eg";

/// Records to insert, with their final IDs and resolved references.
#[derive(Debug, Clone)]
pub struct SeedPlan {
    pub departments: Vec<(String, Department)>,
    pub employees: Vec<(String, Employee)>,
}

/// Number of records inserted per collection.
#[derive(Debug, Clone, Serialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct SeedCounts {
    pub departments: usize,
    pub employees: usize,
    pub organization_chart: usize,
}

#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct CollectionStatus {
    pub count: i64,
    pub status: &'static str,
}

impl CollectionStatus {
    fn from_count(count: i64) -> Self {
        Self {
            count,
            status: if count > 0 { "seeded" } else { "empty" },
        }
    }
}

#[derive(Debug, Clone, Serialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct SeedStatus {
    pub departments: CollectionStatus,
    pub employees: CollectionStatus,
    pub organization_chart: CollectionStatus,
}

#[derive(Debug, Clone, Serialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct WipeCounts {
    pub departments: u64,
    pub employees: u64,
    pub organization_chart: u64,
    pub total_deleted: u64,
}

/// Assign IDs to the fixtures and rewrite their cross-references.
pub fn plan_seed() -> Result<SeedPlan, AppError> {
    let department_ids: HashMap<&str, String> = DEPARTMENTS
        .iter()
        .enumerate()
        .map(|(i, d)| (d.code, format_code(Department::ID_PREFIX, i as i64 + 1)))
        .collect();
    let employee_id = |index: usize| {
        if index < EMPLOYEES.len() {
            Some(format_code(Employee::ID_PREFIX, index as i64 + 1))
        } else {
            tracing::warn!("Seed fixture references unknown employee #{}", index);
            None
        }
    };

    let departments = DEPARTMENTS
        .iter()
        .map(|fixture| {
            let id = department_ids[fixture.code].clone();
            let department = Department {
                name: fixture.name.to_string(),
                name_ar: Some(fixture.name_ar.to_string()),
                description: None,
                parent_department_id: fixture
                    .parent
                    .and_then(|code| resolve_department(&department_ids, code)),
                manager_id: fixture.head.and_then(employee_id),
                location: Some(fixture.location.to_string()),
                budget: None,
            };
            (id, department)
        })
        .collect();

    let mut employees = Vec::with_capacity(EMPLOYEES.len());
    for (index, fixture) in EMPLOYEES.iter().enumerate() {
        let hire_date = NaiveDate::parse_from_str(fixture.hire_date, "%Y-%m-%d").map_err(|e| {
            AppError::Internal(format!(
                "Invalid hire date in seed fixture {}: {}",
                fixture.hire_date, e
            ))
        })?;
        // An unknown department code stays as is; the chart then places the
        // employee under the company node.
        let department_id = resolve_department(&department_ids, fixture.department)
            .unwrap_or_else(|| fixture.department.to_string());

        let employee = Employee {
            first_name: fixture.first_name.to_string(),
            last_name: fixture.last_name.to_string(),
            full_name_ar: Some(fixture.full_name_ar.to_string()),
            email: format!(
                "{}.{}@{}",
                fixture.first_name.to_lowercase(),
                fixture.last_name.to_lowercase(),
                EMAIL_DOMAIN
            ),
            phone: None,
            department_id,
            position: fixture.position.to_string(),
            manager_id: fixture.manager.and_then(employee_id),
            hire_date,
            employment_type: fixture.employment_type,
            gender: Some(fixture.gender),
            national_id: None,
            basic_salary: fixture.basic_salary,
            currency: "EGP".to_string(),
        };
        employees.push((format_code(Employee::ID_PREFIX, index as i64 + 1), employee));
    }

    Ok(SeedPlan {
        departments,
        employees,
    })
}

fn resolve_department(ids: &HashMap<&str, String>, code: &str) -> Option<String> {
    let resolved = ids.get(code).cloned();
    if resolved.is_none() {
        tracing::warn!("Seed fixture references unknown department code {}", code);
    }
    resolved
}

/// Replace the tenant's departments, employees and organization chart with the demo organization.
pub async fn seed_all(
    repo: &Repository,
    tenant: &str,
    actor: &str,
    company_name: &str,
) -> Result<SeedCounts, AppError> {
    let plan = plan_seed()?;
    let mut tx = repo.begin().await?;

    let cleared = clear_collections(&mut tx, tenant).await?;
    tracing::debug!("Cleared {} records before seeding", cleared.total_deleted);

    let mut departments = Vec::with_capacity(plan.departments.len());
    for (id, department) in plan.departments {
        departments.push(insert_record(&mut tx, tenant, actor, Some(id), department).await?);
    }
    let mut employees = Vec::with_capacity(plan.employees.len());
    for (id, employee) in plan.employees {
        employees.push(insert_record(&mut tx, tenant, actor, Some(id), employee).await?);
    }

    reset_sequence(&mut tx, tenant, Department::COLLECTION, departments.len() as i64).await?;
    reset_sequence(&mut tx, tenant, Employee::COLLECTION, employees.len() as i64).await?;

    let chart = OrganizationChart::build(company_name, &departments, &employees);
    insert_record(&mut tx, tenant, actor, None, chart).await?;

    tx.commit().await?;

    tracing::info!(
        tenant = %tenant,
        departments = departments.len(),
        employees = employees.len(),
        "Seeded demo organization"
    );

    Ok(SeedCounts {
        departments: departments.len(),
        employees: employees.len(),
        organization_chart: 1,
    })
}

/// Active record counts of the seeded collections.
pub async fn seed_status(repo: &Repository, tenant: &str) -> Result<SeedStatus, AppError> {
    let (departments, employees, charts) = tokio::try_join!(
        repo.count_active::<Department>(tenant),
        repo.count_active::<Employee>(tenant),
        repo.count_active::<OrganizationChart>(tenant),
    )?;

    Ok(SeedStatus {
        departments: CollectionStatus::from_count(departments),
        employees: CollectionStatus::from_count(employees),
        organization_chart: CollectionStatus::from_count(charts),
    })
}

/// Hard-delete the seeded collections.
pub async fn wipe_all(repo: &Repository, tenant: &str) -> Result<WipeCounts, AppError> {
    let mut tx = repo.begin().await?;
    let counts = clear_collections(&mut tx, tenant).await?;
    tx.commit().await?;

    tracing::info!(tenant = %tenant, total = counts.total_deleted, "Wiped demo organization");
    Ok(counts)
}

async fn clear_collections(
    conn: &mut SqliteConnection,
    tenant: &str,
) -> Result<WipeCounts, AppError> {
    let mut deleted = [0u64; 3];
    let collections = [
        Department::COLLECTION,
        Employee::COLLECTION,
        OrganizationChart::COLLECTION,
    ];
    for (slot, collection) in deleted.iter_mut().zip(collections) {
        *slot = purge_collection(conn, tenant, collection).await?;
        reset_sequence(conn, tenant, collection, 0).await?;
    }

    Ok(WipeCounts {
        departments: deleted[0],
        employees: deleted[1],
        organization_chart: deleted[2],
        total_deleted: deleted.iter().sum(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::{init_database, ListFilter};
    use crate::models::Record;
    use std::collections::HashSet;
    use tempfile::TempDir;

    async fn repo() -> (Repository, TempDir) {
        let temp_dir = TempDir::new().expect("Failed to create temp dir");
        let pool = init_database(&temp_dir.path().join("seed.sqlite"))
            .await
            .expect("Failed to init DB");
        (Repository::new(pool), temp_dir)
    }

    #[test]
    fn test_plan_assigns_sequential_ids() {
        let plan = plan_seed().unwrap();
        assert_eq!(plan.departments.len(), 17);
        assert_eq!(plan.employees.len(), 20);
        assert_eq!(plan.departments[0].0, "DEP001");
        assert_eq!(plan.departments[16].0, "DEP017");
        assert_eq!(plan.employees[19].0, "EMP020");
    }

    #[test]
    fn test_plan_references_resolve_within_batch() {
        let plan = plan_seed().unwrap();
        let department_ids: HashSet<&str> =
            plan.departments.iter().map(|(id, _)| id.as_str()).collect();
        let employee_ids: HashSet<&str> =
            plan.employees.iter().map(|(id, _)| id.as_str()).collect();

        for (_, dept) in &plan.departments {
            if let Some(parent) = &dept.parent_department_id {
                assert!(department_ids.contains(parent.as_str()), "{}", parent);
            }
            if let Some(manager) = &dept.manager_id {
                assert!(employee_ids.contains(manager.as_str()), "{}", manager);
            }
        }
        for (_, emp) in &plan.employees {
            assert!(department_ids.contains(emp.department_id.as_str()));
            if let Some(manager) = &emp.manager_id {
                assert!(employee_ids.contains(manager.as_str()));
            }
            assert!(emp.validate().is_ok(), "{}", emp.email);
        }

        // Only the top-level department has no parent
        let roots = plan
            .departments
            .iter()
            .filter(|(_, d)| d.parent_department_id.is_none())
            .count();
        assert_eq!(roots, 1);
        assert_eq!(
            plan.departments[1].1.parent_department_id.as_deref(),
            Some("DEP001")
        );
    }

    #[test]
    fn test_unknown_department_code_is_dropped() {
        let ids: HashMap<&str, String> = [("GM", "DEP001".to_string())].into_iter().collect();
        assert_eq!(resolve_department(&ids, "GM").as_deref(), Some("DEP001"));
        assert_eq!(resolve_department(&ids, "NOPE"), None);
    }

    #[tokio::test]
    async fn test_seed_status_and_wipe() {
        let (repo, _dir) = repo().await;

        let empty = seed_status(&repo, "t1").await.unwrap();
        assert_eq!(empty.departments.status, "empty");

        let counts = seed_all(&repo, "t1", "tester", "Nile Group").await.unwrap();
        assert_eq!(
            counts,
            SeedCounts {
                departments: 17,
                employees: 20,
                organization_chart: 1
            }
        );

        let status = seed_status(&repo, "t1").await.unwrap();
        assert_eq!(status.departments, CollectionStatus::from_count(17));
        assert_eq!(status.employees.count, 20);
        assert_eq!(status.organization_chart.count, 1);
        assert_eq!(status.organization_chart.status, "seeded");

        let wiped = wipe_all(&repo, "t1").await.unwrap();
        assert_eq!(wiped.departments, 17);
        assert_eq!(wiped.employees, 20);
        assert_eq!(wiped.organization_chart, 1);
        assert_eq!(wiped.total_deleted, 38);
        assert_eq!(seed_status(&repo, "t1").await.unwrap().employees.count, 0);
    }

    #[tokio::test]
    async fn test_reseeding_is_idempotent() {
        let (repo, _dir) = repo().await;
        seed_all(&repo, "t1", "tester", "Nile Group").await.unwrap();
        seed_all(&repo, "t1", "tester", "Nile Group").await.unwrap();

        let status = seed_status(&repo, "t1").await.unwrap();
        assert_eq!(status.departments.count, 17);
        assert_eq!(status.organization_chart.count, 1);

        // Sequences continue after the seeded codes
        let next = repo
            .create(
                "t1",
                "tester",
                None,
                Department {
                    name: "Legal".to_string(),
                    name_ar: None,
                    description: None,
                    parent_department_id: Some("DEP001".to_string()),
                    manager_id: None,
                    location: None,
                    budget: None,
                },
            )
            .await
            .unwrap();
        assert_eq!(next.id, "DEP018");
    }

    #[tokio::test]
    async fn test_seeded_chart_covers_everyone() {
        let (repo, _dir) = repo().await;
        seed_all(&repo, "t1", "tester", "Nile Group").await.unwrap();

        let charts = repo
            .list::<OrganizationChart>("t1", &ListFilter::all())
            .await
            .unwrap();
        let chart: &Record<OrganizationChart> = &charts.items[0];
        assert_eq!(chart.id, "ORG001");

        let stats = chart.data.stats();
        assert_eq!(stats.departments, 17);
        assert_eq!(stats.employees, 20);
        assert_eq!(stats.headcount_by_department.get("DEP001"), Some(&20));
    }
}
