//! Invitation endpoints.
//!
//! Stored invitations carry a secret, so listing and reads return
//! [`InvitationView`] rather than the raw record.

use std::collections::HashMap;

use axum::{
    extract::{Path, State},
    Extension,
};
use chrono::{Duration, Utc};
use serde::Deserialize;

use super::resources::list_filter;
use super::{success, success_page, ApiResult, JsonBody, QueryParams};
use crate::context::RequestContext;
use crate::db::Page;
use crate::errors::AppError;
use crate::models::{
    CreateInvitationRequest, Invitation, InvitationVerification, InvitationView, Record,
    TokenRequest,
};
use crate::AppState;

#[derive(Debug, Deserialize)]
pub struct VerifyQuery {
    pub token: String,
}

/// POST /api/invitations - Issue an invitation; the response holds the token.
pub async fn create_invitation(
    State(state): State<AppState>,
    Extension(ctx): Extension<RequestContext>,
    JsonBody(request): JsonBody<CreateInvitationRequest>,
) -> ApiResult<Record<InvitationView>> {
    let ttl = Duration::hours(state.config.invitation_ttl_hours);
    let view = state
        .repo
        .issue_invitation(&ctx.tenant, &ctx.actor, request, ttl)
        .await?;
    success(view)
}

/// GET /api/invitations
pub async fn list_invitations(
    State(state): State<AppState>,
    Extension(ctx): Extension<RequestContext>,
    QueryParams(params): QueryParams<HashMap<String, String>>,
) -> ApiResult<Vec<Record<InvitationView>>> {
    let filter = list_filter::<Invitation>(&state, &params)?;
    let page = state.repo.list::<Invitation>(&ctx.tenant, &filter).await?;
    let now = Utc::now();
    success_page(Page {
        items: page
            .items
            .into_iter()
            .map(|record| InvitationView::from_record(record, now))
            .collect(),
        total: page.total,
        limit: page.limit,
        offset: page.offset,
    })
}

/// GET /api/invitations/:id
pub async fn get_invitation(
    State(state): State<AppState>,
    Extension(ctx): Extension<RequestContext>,
    Path(id): Path<String>,
) -> ApiResult<Record<InvitationView>> {
    match state.repo.get::<Invitation>(&ctx.tenant, &id).await? {
        Some(record) => success(InvitationView::from_record(record, Utc::now())),
        None => Err(AppError::missing("Invitation", &id)),
    }
}

/// GET /api/invitations/verify?token=
pub async fn verify_invitation(
    State(state): State<AppState>,
    Extension(ctx): Extension<RequestContext>,
    QueryParams(query): QueryParams<VerifyQuery>,
) -> ApiResult<InvitationVerification> {
    success(state.repo.verify_invitation(&ctx.tenant, &query.token).await?)
}

/// POST /api/invitations/accept
pub async fn accept_invitation(
    State(state): State<AppState>,
    Extension(ctx): Extension<RequestContext>,
    JsonBody(request): JsonBody<TokenRequest>,
) -> ApiResult<Record<InvitationView>> {
    success(
        state
            .repo
            .accept_invitation(&ctx.tenant, &ctx.actor, &request.token)
            .await?,
    )
}

/// POST /api/invitations/:id/revoke
pub async fn revoke_invitation(
    State(state): State<AppState>,
    Extension(ctx): Extension<RequestContext>,
    Path(id): Path<String>,
) -> ApiResult<Record<InvitationView>> {
    success(
        state
            .repo
            .revoke_invitation(&ctx.tenant, &ctx.actor, &id)
            .await?,
    )
}
