//! Per-request tenant and actor resolution.
//!
//! Runs as middleware in front of the API routes and stores a
//! [`RequestContext`] in the request extensions for handlers to extract.

use axum::{
    extract::Request,
    middleware::Next,
    response::{IntoResponse, Response},
};

use crate::errors::AppError;

/// Header selecting the tenant a request operates on.
pub const TENANT_HEADER: &str = "x-tenant-id";
/// Header naming the acting user recorded in audit fields.
pub const USER_HEADER: &str = "x-user-id";
pub const DEFAULT_ACTOR: &str = "system";

const MAX_TENANT_LEN: usize = 64;
const MAX_ACTOR_LEN: usize = 128;

/// Tenant and acting user of the current request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RequestContext {
    pub tenant: String,
    pub actor: String,
}

/// Middleware resolving the [`RequestContext`] from request headers.
pub async fn request_context_layer(
    default_tenant: String,
    mut request: Request,
    next: Next,
) -> Response {
    let tenant = header_value(&request, TENANT_HEADER).unwrap_or(default_tenant);
    if !is_valid_tenant(&tenant) {
        return AppError::BadRequest(format!(
            "Invalid {} header: expected 1-{} characters of letters, digits, '-' or '_'",
            TENANT_HEADER, MAX_TENANT_LEN
        ))
        .into_response();
    }

    let actor = match header_value(&request, USER_HEADER) {
        Some(actor) if actor.chars().count() > MAX_ACTOR_LEN => {
            return AppError::BadRequest(format!(
                "{} header must not exceed {} characters",
                USER_HEADER, MAX_ACTOR_LEN
            ))
            .into_response();
        }
        Some(actor) => actor,
        None => DEFAULT_ACTOR.to_string(),
    };

    tracing::trace!(tenant = %tenant, actor = %actor, "Resolved request context");
    request
        .extensions_mut()
        .insert(RequestContext { tenant, actor });
    next.run(request).await
}

/// Trimmed, non-empty header value.
fn header_value(request: &Request, name: &str) -> Option<String> {
    request
        .headers()
        .get(name)
        .and_then(|v| v.to_str().ok())
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(str::to_string)
}

fn is_valid_tenant(tenant: &str) -> bool {
    !tenant.is_empty()
        && tenant.len() <= MAX_TENANT_LEN
        && tenant
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || c == '-' || c == '_')
}
