//! Generic list/get/create/update/delete endpoints shared by every collection.

use std::collections::HashMap;

use axum::{
    extract::{Path, State},
    routing::get,
    Extension, Router,
};
use serde_json::{Map, Value};

use super::{success, success_page, ApiResult, JsonBody, QueryParams};
use crate::context::RequestContext;
use crate::db::ListFilter;
use crate::errors::AppError;
use crate::models::{Record, Resource};
use crate::AppState;

/// Mount the full CRUD surface of `R` at `path`.
pub fn crud_routes<R: Resource>(router: Router<AppState>, path: &str) -> Router<AppState> {
    router
        .route(path, get(list_records::<R>).post(create_record::<R>))
        .route(
            &format!("{}/{{id}}", path),
            get(get_record::<R>)
                .put(update_record::<R>)
                .delete(delete_record::<R>),
        )
}

/// Mount only the read endpoints of `R` at `path`.
pub fn read_routes<R: Resource>(router: Router<AppState>, path: &str) -> Router<AppState> {
    router
        .route(path, get(list_records::<R>))
        .route(&format!("{}/{{id}}", path), get(get_record::<R>))
}

/// Parse list query parameters with the configured page sizes.
pub(crate) fn list_filter<R: Resource>(
    state: &AppState,
    params: &HashMap<String, String>,
) -> Result<ListFilter, AppError> {
    ListFilter::from_params::<R>(
        params,
        state.config.default_page_size,
        state.config.max_page_size,
    )
}

/// GET /api/<resource> - List active records.
pub async fn list_records<R: Resource>(
    State(state): State<AppState>,
    Extension(ctx): Extension<RequestContext>,
    QueryParams(params): QueryParams<HashMap<String, String>>,
) -> ApiResult<Vec<Record<R>>> {
    let filter = list_filter::<R>(&state, &params)?;
    let page = state.repo.list::<R>(&ctx.tenant, &filter).await?;
    success_page(page)
}

/// GET /api/<resource>/:id - Get a single record.
pub async fn get_record<R: Resource>(
    State(state): State<AppState>,
    Extension(ctx): Extension<RequestContext>,
    Path(id): Path<String>,
) -> ApiResult<Record<R>> {
    match state.repo.get::<R>(&ctx.tenant, &id).await? {
        Some(record) => success(record),
        None => Err(AppError::missing(R::LABEL, &id)),
    }
}

/// POST /api/<resource> - Create a record, with an optional caller-chosen `id`.
pub async fn create_record<R: Resource>(
    State(state): State<AppState>,
    Extension(ctx): Extension<RequestContext>,
    JsonBody(body): JsonBody<Map<String, Value>>,
) -> ApiResult<Record<R>> {
    let mut body = body;
    body.remove("systemInfo");
    let id = match body.remove("id") {
        None | Some(Value::Null) => None,
        Some(Value::String(id)) => Some(id),
        Some(_) => return Err(AppError::validation("id must be a string")),
    };
    let data: R = serde_json::from_value(Value::Object(body))?;

    let record = state
        .repo
        .create(&ctx.tenant, &ctx.actor, id, data)
        .await?;
    tracing::info!(
        tenant = %ctx.tenant,
        collection = R::COLLECTION,
        id = %record.id,
        "Created record"
    );
    success(record)
}

/// PUT /api/<resource>/:id - Merge-patch a record.
///
/// `expectedVersion` in the body enables the optimistic concurrency check.
pub async fn update_record<R: Resource>(
    State(state): State<AppState>,
    Extension(ctx): Extension<RequestContext>,
    Path(id): Path<String>,
    JsonBody(body): JsonBody<Map<String, Value>>,
) -> ApiResult<Record<R>> {
    let mut patch = body;
    let expected_version = match patch.remove("expectedVersion") {
        None | Some(Value::Null) => None,
        Some(value) => Some(
            value
                .as_i64()
                .ok_or_else(|| AppError::validation("expectedVersion must be an integer"))?,
        ),
    };
    patch.remove("id");
    patch.remove("systemInfo");

    let record = state
        .repo
        .update::<R>(
            &ctx.tenant,
            &ctx.actor,
            &id,
            &Value::Object(patch),
            expected_version,
        )
        .await?;
    tracing::info!(
        tenant = %ctx.tenant,
        collection = R::COLLECTION,
        id = %record.id,
        version = record.system_info.version,
        "Updated record"
    );
    success(record)
}

/// DELETE /api/<resource>/:id - Soft-delete a record.
pub async fn delete_record<R: Resource>(
    State(state): State<AppState>,
    Extension(ctx): Extension<RequestContext>,
    Path(id): Path<String>,
) -> ApiResult<()> {
    state
        .repo
        .deactivate::<R>(&ctx.tenant, &ctx.actor, &id)
        .await?;
    tracing::info!(
        tenant = %ctx.tenant,
        collection = R::COLLECTION,
        id = %id,
        "Deactivated record"
    );
    success(())
}
