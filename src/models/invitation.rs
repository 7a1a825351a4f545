//! User invitations with expiring one-time tokens.

use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};
use subtle::ConstantTimeEq;

use super::{require_email, require_non_empty, Record, Resource};
use crate::errors::AppError;

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum InvitationStatus {
    Pending,
    Accepted,
    Revoked,
}

/// Effective state of an invitation at a point in time.
#[derive(Debug, Clone, Copy, Serialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum InvitationState {
    Valid,
    Expired,
    Accepted,
    Revoked,
}

/// The stored invitation, including its secret.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct Invitation {
    pub email: String,
    pub role: String,
    pub invited_by: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
    pub secret: String,
    pub expires_at: DateTime<Utc>,
    pub status: InvitationStatus,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub accepted_at: Option<DateTime<Utc>>,
}

impl Invitation {
    pub fn new(request: CreateInvitationRequest, invited_by: &str, ttl: Duration) -> Self {
        Self {
            email: request.email.trim().to_lowercase(),
            role: request.role,
            invited_by: invited_by.to_string(),
            message: request.message,
            secret: uuid::Uuid::new_v4().simple().to_string(),
            expires_at: Utc::now() + ttl,
            status: InvitationStatus::Pending,
            accepted_at: None,
        }
    }

    pub fn state_at(&self, now: DateTime<Utc>) -> InvitationState {
        match self.status {
            InvitationStatus::Accepted => InvitationState::Accepted,
            InvitationStatus::Revoked => InvitationState::Revoked,
            InvitationStatus::Pending if now >= self.expires_at => InvitationState::Expired,
            InvitationStatus::Pending => InvitationState::Valid,
        }
    }

    /// Constant-time check of a presented secret.
    pub fn secret_matches(&self, presented: &str) -> bool {
        self.secret.as_bytes().ct_eq(presented.as_bytes()).into()
    }
}

impl Resource for Invitation {
    const COLLECTION: &'static str = "invitations";
    const ID_PREFIX: &'static str = "INV";
    const LABEL: &'static str = "Invitation";
    const FILTER_FIELDS: &'static [&'static str] = &["email", "role", "status"];
    const PRIVATE_FIELDS: &'static [&'static str] = &["secret"];

    fn validate(&self) -> Result<(), AppError> {
        require_email(&self.email, "Email")?;
        require_non_empty(&self.role, "Role")?;
        Ok(())
    }
}

/// Token handed to the invitee: `<invitationId>.<secret>`.
pub fn compose_token(invitation_id: &str, secret: &str) -> String {
    format!("{}.{}", invitation_id, secret)
}

/// Split a token into invitation ID and secret.
pub fn parse_token(token: &str) -> Option<(&str, &str)> {
    let (id, secret) = token.trim().split_once('.')?;
    if id.is_empty() || secret.is_empty() {
        return None;
    }
    Some((id, secret))
}

/// Request body for creating an invitation.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateInvitationRequest {
    pub email: String,
    pub role: String,
    #[serde(default)]
    pub message: Option<String>,
}

/// Request body carrying a token.
#[derive(Debug, Clone, Deserialize)]
pub struct TokenRequest {
    pub token: String,
}

/// Invitation as returned by the API: everything but the secret.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct InvitationView {
    pub email: String,
    pub role: String,
    pub invited_by: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
    pub expires_at: DateTime<Utc>,
    pub status: InvitationStatus,
    pub state: InvitationState,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub accepted_at: Option<DateTime<Utc>>,
    /// Only present in the response that creates the invitation.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub token: Option<String>,
}

impl InvitationView {
    pub fn from_record(record: Record<Invitation>, now: DateTime<Utc>) -> Record<InvitationView> {
        record.map(|inv| InvitationView {
            state: inv.state_at(now),
            email: inv.email,
            role: inv.role,
            invited_by: inv.invited_by,
            message: inv.message,
            expires_at: inv.expires_at,
            status: inv.status,
            accepted_at: inv.accepted_at,
            token: None,
        })
    }
}

/// Result of verifying a token.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct InvitationVerification {
    pub invitation_id: String,
    pub email: String,
    pub role: String,
    pub state: InvitationState,
    pub expires_at: DateTime<Utc>,
}
