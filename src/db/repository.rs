//! Database repository for CRUD operations.
//!
//! All record types share one generic implementation. The `Repository`
//! methods each run in their own transaction; the free functions take a
//! connection so workflows can combine several writes in one transaction.

use chrono::Utc;
use serde_json::Value;
use sqlx::sqlite::SqliteRow;
use sqlx::{QueryBuilder, Row, Sqlite, SqliteConnection, SqlitePool, Transaction};

use super::{ListFilter, Page};
use crate::errors::AppError;
use crate::models::{format_code, Record, Resource, SystemInfo};

const COLUMNS: &str =
    "id, body, is_active, created_by, created_at, updated_by, updated_at, version";

/// Database repository for all data operations.
#[derive(Clone)]
pub struct Repository {
    pool: SqlitePool,
}

impl Repository {
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }

    /// Start a transaction for a multi-record workflow.
    pub async fn begin(&self) -> Result<Transaction<'static, Sqlite>, AppError> {
        Ok(self.pool.begin().await?)
    }

    /// List records matching `filter`.
    pub async fn list<R: Resource>(
        &self,
        tenant: &str,
        filter: &ListFilter,
    ) -> Result<Page<Record<R>>, AppError> {
        let mut conn = self.pool.acquire().await?;
        select_records::<R>(&mut conn, tenant, filter).await
    }

    /// Get an active record by ID.
    pub async fn get<R: Resource>(
        &self,
        tenant: &str,
        id: &str,
    ) -> Result<Option<Record<R>>, AppError> {
        let mut conn = self.pool.acquire().await?;
        fetch_record::<R>(&mut conn, tenant, id).await
    }

    /// Create a new record.
    pub async fn create<R: Resource>(
        &self,
        tenant: &str,
        actor: &str,
        id: Option<String>,
        data: R,
    ) -> Result<Record<R>, AppError> {
        let mut tx = self.pool.begin().await?;
        let record = insert_record(&mut tx, tenant, actor, id, data).await?;
        tx.commit().await?;
        Ok(record)
    }

    /// Apply a JSON merge patch to a record with optimistic concurrency control.
    pub async fn update<R: Resource>(
        &self,
        tenant: &str,
        actor: &str,
        id: &str,
        patch: &Value,
        expected_version: Option<i64>,
    ) -> Result<Record<R>, AppError> {
        let mut tx = self.pool.begin().await?;
        let mut record = require_record::<R>(&mut tx, tenant, id).await?;

        // Check version for optimistic concurrency
        if let Some(expected) = expected_version {
            if record.system_info.version != expected {
                return Err(AppError::stale(
                    format!(
                        "Version mismatch: expected {}, current {}",
                        expected, record.system_info.version
                    ),
                    record.system_info.version,
                ));
            }
        }

        let mut body = to_document(&record.data)?;
        json_patch::merge(&mut body, patch);
        record.data = serde_json::from_value(body)?;

        save_record(&mut tx, tenant, actor, &mut record).await?;
        tx.commit().await?;
        Ok(record)
    }

    /// Soft-delete a record.
    pub async fn deactivate<R: Resource>(
        &self,
        tenant: &str,
        actor: &str,
        id: &str,
    ) -> Result<(), AppError> {
        let mut conn = self.pool.acquire().await?;
        deactivate_record::<R>(&mut conn, tenant, actor, id).await
    }

    /// Number of active records in the collection of `R`.
    pub async fn count_active<R: Resource>(&self, tenant: &str) -> Result<i64, AppError> {
        let row = sqlx::query(
            "SELECT COUNT(*) AS total FROM documents WHERE tenant_id = ? AND collection = ? AND is_active = 1",
        )
        .bind(tenant)
        .bind(R::COLLECTION)
        .fetch_one(&self.pool)
        .await?;
        Ok(row.get("total"))
    }
}

// ==================== CONNECTION-LEVEL OPERATIONS ====================

/// List records matching `filter`, ordered by ID.
pub async fn select_records<R: Resource>(
    conn: &mut SqliteConnection,
    tenant: &str,
    filter: &ListFilter,
) -> Result<Page<Record<R>>, AppError> {
    let mut count_query = QueryBuilder::<Sqlite>::new("SELECT COUNT(*) AS total FROM documents");
    push_conditions::<R>(&mut count_query, tenant, filter);
    let total: i64 = count_query
        .build()
        .fetch_one(&mut *conn)
        .await?
        .get("total");

    let mut query = QueryBuilder::<Sqlite>::new(format!("SELECT {} FROM documents", COLUMNS));
    push_conditions::<R>(&mut query, tenant, filter);
    query.push(" ORDER BY id");
    match filter.limit {
        Some(limit) => {
            query.push(" LIMIT ").push_bind(limit);
        }
        // SQLite only accepts OFFSET after a LIMIT
        None => {
            query.push(" LIMIT -1");
        }
    }
    query.push(" OFFSET ").push_bind(filter.offset);

    let rows = query.build().fetch_all(&mut *conn).await?;
    let items = rows
        .iter()
        .map(record_from_row::<R>)
        .collect::<Result<Vec<_>, _>>()?;

    Ok(Page {
        items,
        total,
        limit: filter.limit,
        offset: filter.offset,
    })
}

/// First active record matching `filter`, if any.
pub async fn find_one<R: Resource>(
    conn: &mut SqliteConnection,
    tenant: &str,
    filter: ListFilter,
) -> Result<Option<Record<R>>, AppError> {
    let filter = ListFilter {
        limit: Some(1),
        offset: 0,
        ..filter
    };
    let page = select_records::<R>(conn, tenant, &filter).await?;
    Ok(page.items.into_iter().next())
}

/// Get an active record by ID.
pub async fn fetch_record<R: Resource>(
    conn: &mut SqliteConnection,
    tenant: &str,
    id: &str,
) -> Result<Option<Record<R>>, AppError> {
    let row = sqlx::query(&format!(
        "SELECT {} FROM documents WHERE tenant_id = ? AND collection = ? AND id = ? AND is_active = 1",
        COLUMNS
    ))
    .bind(tenant)
    .bind(R::COLLECTION)
    .bind(id)
    .fetch_optional(&mut *conn)
    .await?;

    row.as_ref().map(record_from_row::<R>).transpose()
}

/// Get an active record by ID or fail with `NotFound`.
pub async fn require_record<R: Resource>(
    conn: &mut SqliteConnection,
    tenant: &str,
    id: &str,
) -> Result<Record<R>, AppError> {
    fetch_record::<R>(conn, tenant, id)
        .await?
        .ok_or_else(|| AppError::missing(R::LABEL, id))
}

/// Insert a new record, generating its code when `id` is `None`.
pub async fn insert_record<R: Resource>(
    conn: &mut SqliteConnection,
    tenant: &str,
    actor: &str,
    id: Option<String>,
    mut data: R,
) -> Result<Record<R>, AppError> {
    data.normalize();
    data.validate()?;
    ensure_unique(conn, tenant, None, &data).await?;

    let id = match id {
        Some(id) => {
            let id = id.trim().to_string();
            if id.is_empty() || id.chars().any(char::is_whitespace) {
                return Err(AppError::validation(format!(
                    "Invalid {} ID '{}'",
                    R::LABEL,
                    id
                )));
            }
            if id_exists(conn, tenant, R::COLLECTION, &id).await? {
                return Err(AppError::AlreadyExists(format!(
                    "{} {} already exists",
                    R::LABEL,
                    id
                )));
            }
            id
        }
        None => next_free_code::<R>(conn, tenant).await?,
    };

    let now = Utc::now().to_rfc3339();
    let body = serde_json::to_string(&data)
        .map_err(|e| AppError::Internal(format!("Failed to encode {}: {}", R::LABEL, e)))?;

    sqlx::query(
        "INSERT INTO documents (tenant_id, collection, id, body, is_active, created_by, created_at, updated_by, updated_at, version) VALUES (?, ?, ?, ?, 1, ?, ?, ?, ?, 1)"
    )
    .bind(tenant)
    .bind(R::COLLECTION)
    .bind(&id)
    .bind(&body)
    .bind(actor)
    .bind(&now)
    .bind(actor)
    .bind(&now)
    .execute(&mut *conn)
    .await?;

    Ok(Record {
        id,
        data,
        system_info: SystemInfo {
            created_by: actor.to_string(),
            created_at: now.clone(),
            updated_by: actor.to_string(),
            updated_at: now,
            is_active: true,
            version: 1,
        },
    })
}

/// Write back a modified record, guarded by its version.
///
/// On success the record's audit block reflects the new version.
pub async fn save_record<R: Resource>(
    conn: &mut SqliteConnection,
    tenant: &str,
    actor: &str,
    record: &mut Record<R>,
) -> Result<(), AppError> {
    record.data.normalize();
    record.data.validate()?;
    ensure_unique(conn, tenant, Some(&record.id), &record.data).await?;

    let now = Utc::now().to_rfc3339();
    let body = serde_json::to_string(&record.data)
        .map_err(|e| AppError::Internal(format!("Failed to encode {}: {}", R::LABEL, e)))?;

    // Conditional UPDATE with version check to prevent lost updates
    let result = sqlx::query(
        "UPDATE documents SET body = ?, updated_by = ?, updated_at = ?, version = version + 1 WHERE tenant_id = ? AND collection = ? AND id = ? AND version = ? AND is_active = 1"
    )
    .bind(&body)
    .bind(actor)
    .bind(&now)
    .bind(tenant)
    .bind(R::COLLECTION)
    .bind(&record.id)
    .bind(record.system_info.version)
    .execute(&mut *conn)
    .await?;

    if result.rows_affected() == 0 {
        let current = fetch_record::<R>(conn, tenant, &record.id).await?;
        return Err(match current {
            Some(current) => {
                AppError::stale("Concurrent modification detected", current.system_info.version)
            }
            None => AppError::missing(R::LABEL, &record.id),
        });
    }

    record.system_info.version += 1;
    record.system_info.updated_by = actor.to_string();
    record.system_info.updated_at = now;
    Ok(())
}

/// Soft-delete a record.
pub async fn deactivate_record<R: Resource>(
    conn: &mut SqliteConnection,
    tenant: &str,
    actor: &str,
    id: &str,
) -> Result<(), AppError> {
    let now = Utc::now().to_rfc3339();
    let result = sqlx::query(
        "UPDATE documents SET is_active = 0, updated_by = ?, updated_at = ?, version = version + 1 WHERE tenant_id = ? AND collection = ? AND id = ? AND is_active = 1"
    )
    .bind(actor)
    .bind(&now)
    .bind(tenant)
    .bind(R::COLLECTION)
    .bind(id)
    .execute(&mut *conn)
    .await?;

    if result.rows_affected() == 0 {
        return Err(AppError::missing(R::LABEL, id));
    }
    Ok(())
}

/// Hard-delete every record of a collection, active or not.
pub async fn purge_collection(
    conn: &mut SqliteConnection,
    tenant: &str,
    collection: &str,
) -> Result<u64, AppError> {
    let result = sqlx::query("DELETE FROM documents WHERE tenant_id = ? AND collection = ?")
        .bind(tenant)
        .bind(collection)
        .execute(&mut *conn)
        .await?;
    Ok(result.rows_affected())
}

/// Set the last generated sequence value of a collection.
pub async fn reset_sequence(
    conn: &mut SqliteConnection,
    tenant: &str,
    collection: &str,
    last_value: i64,
) -> Result<(), AppError> {
    sqlx::query(
        "INSERT INTO id_sequences (tenant_id, collection, last_value) VALUES (?, ?, ?) ON CONFLICT(tenant_id, collection) DO UPDATE SET last_value = excluded.last_value"
    )
    .bind(tenant)
    .bind(collection)
    .bind(last_value)
    .execute(&mut *conn)
    .await?;
    Ok(())
}

/// Advance the collection's sequence until it yields an unused code.
///
/// Caller-assigned IDs may already occupy a generated code, so those are skipped.
async fn next_free_code<R: Resource>(
    conn: &mut SqliteConnection,
    tenant: &str,
) -> Result<String, AppError> {
    loop {
        let row = sqlx::query(
            "INSERT INTO id_sequences (tenant_id, collection, last_value) VALUES (?, ?, 1) ON CONFLICT(tenant_id, collection) DO UPDATE SET last_value = last_value + 1 RETURNING last_value"
        )
        .bind(tenant)
        .bind(R::COLLECTION)
        .fetch_one(&mut *conn)
        .await?;
        let code = format_code(R::ID_PREFIX, row.get("last_value"));
        if !id_exists(conn, tenant, R::COLLECTION, &code).await? {
            return Ok(code);
        }
        tracing::debug!("Skipping occupied {} code {}", R::LABEL, code);
    }
}

async fn ensure_unique<R: Resource>(
    conn: &mut SqliteConnection,
    tenant: &str,
    own_id: Option<&str>,
    data: &R,
) -> Result<(), AppError> {
    let key = data.unique_key();
    if key.is_empty() {
        return Ok(());
    }

    let filter = key
        .iter()
        .fold(ListFilter::all(), |filter, (field, value)| {
            filter.and(field, value.as_str())
        });
    let page = select_records::<R>(conn, tenant, &filter).await?;
    match page.items.iter().find(|r| Some(r.id.as_str()) != own_id) {
        Some(existing) => {
            let described: Vec<String> = key
                .iter()
                .map(|(field, value)| format!("{}={}", field, value))
                .collect();
            Err(AppError::AlreadyExists(format!(
                "{} with {} already exists as {}",
                R::LABEL,
                described.join(", "),
                existing.id
            )))
        }
        None => Ok(()),
    }
}

async fn id_exists(
    conn: &mut SqliteConnection,
    tenant: &str,
    collection: &str,
    id: &str,
) -> Result<bool, AppError> {
    let row = sqlx::query(
        "SELECT 1 AS present FROM documents WHERE tenant_id = ? AND collection = ? AND id = ?",
    )
    .bind(tenant)
    .bind(collection)
    .bind(id)
    .fetch_optional(&mut *conn)
    .await?;
    Ok(row.is_some())
}

fn push_conditions<R: Resource>(
    query: &mut QueryBuilder<'_, Sqlite>,
    tenant: &str,
    filter: &ListFilter,
) {
    query
        .push(" WHERE tenant_id = ")
        .push_bind(tenant.to_string())
        .push(" AND collection = ")
        .push_bind(R::COLLECTION.to_string());
    if !filter.include_inactive {
        query.push(" AND is_active = 1");
    }
    for (field, value) in &filter.fields {
        query
            .push(" AND CAST(json_extract(body, ")
            .push_bind(format!("$.{}", field))
            .push(") AS TEXT) = ")
            .push_bind(value.clone());
    }
    if let Some(search) = &filter.search {
        // Scalar values only: key names and private fields never match.
        query.push(
            " AND EXISTS (SELECT 1 FROM json_tree(documents.body) AS node \
             WHERE node.atom IS NOT NULL",
        );
        for field in R::PRIVATE_FIELDS {
            query
                .push(" AND node.fullkey <> ")
                .push_bind(format!("$.{}", field));
        }
        query
            .push(" AND CAST(node.atom AS TEXT) LIKE ")
            .push_bind(format!("%{}%", escape_like(search)))
            .push(" ESCAPE '\\')");
    }
}

fn escape_like(s: &str) -> String {
    s.replace('\\', "\\\\")
        .replace('%', "\\%")
        .replace('_', "\\_")
}

fn to_document<R: Resource>(data: &R) -> Result<Value, AppError> {
    serde_json::to_value(data)
        .map_err(|e| AppError::Internal(format!("Failed to encode {}: {}", R::LABEL, e)))
}

// Helper functions for row conversion

fn record_from_row<R: Resource>(row: &SqliteRow) -> Result<Record<R>, AppError> {
    let id: String = row.get("id");
    let body: String = row.get("body");
    let is_active: i32 = row.get("is_active");
    let data = serde_json::from_str(&body).map_err(|e| {
        tracing::error!("Stored {} {} is unreadable: {}", R::LABEL, id, e);
        AppError::Internal(format!("Stored {} {} is unreadable", R::LABEL, id))
    })?;

    Ok(Record {
        id,
        data,
        system_info: SystemInfo {
            created_by: row.get("created_by"),
            created_at: row.get("created_at"),
            updated_by: row.get("updated_by"),
            updated_at: row.get("updated_at"),
            is_active: is_active != 0,
            version: row.get("version"),
        },
    })
}
