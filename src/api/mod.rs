//! REST API module.
//!
//! Contains all API routes and handlers. Every response uses the
//! `{ success, data, meta? }` envelope; errors are rendered by [`AppError`].

mod invitations;
mod leave;
mod organization;
mod payroll;
mod portal;
mod pricing;
mod resources;
mod seed;
mod status;

pub use invitations::*;
pub use leave::*;
pub use organization::*;
pub use payroll::*;
pub use portal::*;
pub use pricing::*;
pub use resources::*;
pub use seed::*;
pub use status::*;

use axum::{
    extract::{FromRequest, FromRequestParts, Query, Request},
    http::{request::Parts, StatusCode},
    response::{IntoResponse, Response},
    Json,
};
use serde::{de::DeserializeOwned, Serialize};
use serde_json::Value;

use crate::db::{Page, PageMeta};
use crate::errors::AppError;

/// Success response envelope.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ApiResponse<T: Serialize> {
    pub success: bool,
    pub data: T,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub meta: Option<PageMeta>,
}

impl<T: Serialize> ApiResponse<T> {
    pub fn new(data: T) -> Self {
        Self {
            success: true,
            data,
            meta: None,
        }
    }
}

impl<T: Serialize> IntoResponse for ApiResponse<T> {
    fn into_response(self) -> Response {
        (StatusCode::OK, Json(self)).into_response()
    }
}

/// Response type that can be either success or error.
pub type ApiResult<T> = Result<ApiResponse<T>, AppError>;

/// Create a successful API response.
pub fn success<T: Serialize>(data: T) -> ApiResult<T> {
    Ok(ApiResponse::new(data))
}

/// Create a successful list response carrying pagination metadata.
pub fn success_page<T: Serialize>(page: Page<T>) -> ApiResult<Vec<T>> {
    let meta = page.meta();
    Ok(ApiResponse {
        success: true,
        data: page.items,
        meta: Some(meta),
    })
}

/// JSON request body whose rejections use the error envelope.
///
/// Bodies are parsed as JSON first and then converted, so a malformed body
/// and a body with wrongly typed fields both surface as `BAD_REQUEST`.
pub struct JsonBody<T>(pub T);

impl<S, T> FromRequest<S> for JsonBody<T>
where
    S: Send + Sync,
    T: DeserializeOwned,
{
    type Rejection = AppError;

    async fn from_request(req: Request, state: &S) -> Result<Self, Self::Rejection> {
        let Json(value) = Json::<Value>::from_request(req, state)
            .await
            .map_err(|e| AppError::BadRequest(e.body_text()))?;
        Ok(JsonBody(serde_json::from_value(value)?))
    }
}

/// Query string parameters whose rejections use the error envelope.
pub struct QueryParams<T>(pub T);

impl<S, T> FromRequestParts<S> for QueryParams<T>
where
    S: Send + Sync,
    T: DeserializeOwned,
{
    type Rejection = AppError;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        let Query(params) = Query::<T>::from_request_parts(parts, state)
            .await
            .map_err(|e| AppError::BadRequest(e.body_text()))?;
        Ok(QueryParams(params))
    }
}

/// Parse an optional JSON body; an empty body yields the default value.
pub fn optional_body<T: DeserializeOwned + Default>(body: &[u8]) -> Result<T, AppError> {
    if body.iter().all(u8::is_ascii_whitespace) {
        return Ok(T::default());
    }
    Ok(serde_json::from_slice(body)?)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::ReviewLeaveRequest;

    #[test]
    fn test_optional_body() {
        let empty: ReviewLeaveRequest = optional_body(b"").unwrap();
        assert!(empty.comment.is_none());
        let blank: ReviewLeaveRequest = optional_body(b" \n").unwrap();
        assert!(blank.comment.is_none());
        let given: ReviewLeaveRequest = optional_body(br#"{"comment":"ok"}"#).unwrap();
        assert_eq!(given.comment.as_deref(), Some("ok"));
        assert!(optional_body::<ReviewLeaveRequest>(b"{oops").is_err());
    }
}
