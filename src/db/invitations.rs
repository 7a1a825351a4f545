//! Invitation issuing, verification and acceptance.

use chrono::{Duration, Utc};

use super::{require_record, save_record, Repository};
use crate::errors::AppError;
use crate::models::{
    compose_token, parse_token, CreateInvitationRequest, Invitation, InvitationState,
    InvitationStatus, InvitationVerification, InvitationView, Record,
};

impl Repository {
    /// Store a new invitation and return its view with the one-time token.
    pub async fn issue_invitation(
        &self,
        tenant: &str,
        actor: &str,
        request: CreateInvitationRequest,
        ttl: Duration,
    ) -> Result<Record<InvitationView>, AppError> {
        let invitation = Invitation::new(request, actor, ttl);
        let secret = invitation.secret.clone();
        let record = self.create(tenant, actor, None, invitation).await?;

        tracing::info!(tenant = %tenant, id = %record.id, "Invitation issued");
        let token = compose_token(&record.id, &secret);
        let mut view = InvitationView::from_record(record, Utc::now());
        view.data.token = Some(token);
        Ok(view)
    }

    /// Look up the invitation a token refers to.
    pub async fn verify_invitation(
        &self,
        tenant: &str,
        token: &str,
    ) -> Result<InvitationVerification, AppError> {
        let record = self.invitation_for_token(tenant, token).await?;
        Ok(InvitationVerification {
            state: record.data.state_at(Utc::now()),
            invitation_id: record.id,
            email: record.data.email,
            role: record.data.role,
            expires_at: record.data.expires_at,
        })
    }

    /// Accept a valid invitation.
    pub async fn accept_invitation(
        &self,
        tenant: &str,
        actor: &str,
        token: &str,
    ) -> Result<Record<InvitationView>, AppError> {
        let (id, secret) = parse_token(token).ok_or_else(invalid_token)?;
        let mut tx = self.begin().await?;
        let mut record = require_record::<Invitation>(&mut tx, tenant, id)
            .await
            .map_err(|_| invalid_token())?;
        if !record.data.secret_matches(secret) {
            return Err(invalid_token());
        }

        let now = Utc::now();
        match record.data.state_at(now) {
            InvitationState::Valid => {}
            state => {
                return Err(AppError::validation(format!(
                    "Invitation {} cannot be accepted: {}",
                    id,
                    state_name(state)
                )))
            }
        }
        record.data.status = InvitationStatus::Accepted;
        record.data.accepted_at = Some(now);
        save_record(&mut tx, tenant, actor, &mut record).await?;
        tx.commit().await?;

        tracing::info!(tenant = %tenant, id = %record.id, "Invitation accepted");
        Ok(InvitationView::from_record(record, now))
    }

    /// Revoke a pending invitation.
    pub async fn revoke_invitation(
        &self,
        tenant: &str,
        actor: &str,
        id: &str,
    ) -> Result<Record<InvitationView>, AppError> {
        let mut tx = self.begin().await?;
        let mut record = require_record::<Invitation>(&mut tx, tenant, id).await?;
        if record.data.status != InvitationStatus::Pending {
            return Err(AppError::validation(format!(
                "Only pending invitations can be revoked; {} is {}",
                id,
                state_name(record.data.state_at(Utc::now()))
            )));
        }
        record.data.status = InvitationStatus::Revoked;
        save_record(&mut tx, tenant, actor, &mut record).await?;
        tx.commit().await?;

        tracing::info!(tenant = %tenant, id = %id, "Invitation revoked");
        Ok(InvitationView::from_record(record, Utc::now()))
    }

    async fn invitation_for_token(
        &self,
        tenant: &str,
        token: &str,
    ) -> Result<Record<Invitation>, AppError> {
        let (id, secret) = parse_token(token).ok_or_else(invalid_token)?;
        match self.get::<Invitation>(tenant, id).await? {
            Some(record) if record.data.secret_matches(secret) => Ok(record),
            _ => Err(invalid_token()),
        }
    }
}

fn invalid_token() -> AppError {
    AppError::NotFound("Invitation not found for token".to_string())
}

fn state_name(state: InvitationState) -> &'static str {
    match state {
        InvitationState::Valid => "valid",
        InvitationState::Expired => "expired",
        InvitationState::Accepted => "accepted",
        InvitationState::Revoked => "revoked",
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::{init_database, ListFilter};
    use tempfile::TempDir;

    async fn repo() -> (Repository, TempDir) {
        let dir = TempDir::new().expect("Failed to create temp dir");
        let pool = init_database(&dir.path().join("inv.sqlite"))
            .await
            .expect("Failed to init DB");
        (Repository::new(pool), dir)
    }

    fn request() -> CreateInvitationRequest {
        CreateInvitationRequest {
            email: "nour@example.com".to_string(),
            role: "employee".to_string(),
            message: None,
        }
    }

    #[tokio::test]
    async fn test_issue_verify_accept() {
        let (repo, _dir) = repo().await;
        let issued = repo
            .issue_invitation("t1", "mona", request(), Duration::hours(24))
            .await
            .unwrap();
        let token = issued.data.token.clone().unwrap();
        assert!(token.starts_with("INV001."));

        let verified = repo.verify_invitation("t1", &token).await.unwrap();
        assert_eq!(verified.state, InvitationState::Valid);
        assert_eq!(verified.email, "nour@example.com");

        let accepted = repo.accept_invitation("t1", "nour", &token).await.unwrap();
        assert_eq!(accepted.data.state, InvitationState::Accepted);
        assert!(accepted.data.token.is_none());

        let again = repo.accept_invitation("t1", "nour", &token).await.unwrap_err();
        assert_eq!(again.error_code(), "VALIDATION_ERROR");
    }

    #[tokio::test]
    async fn test_wrong_secret_and_other_tenant_are_not_found() {
        let (repo, _dir) = repo().await;
        let issued = repo
            .issue_invitation("t1", "mona", request(), Duration::hours(24))
            .await
            .unwrap();
        let token = issued.data.token.unwrap();

        let err = repo
            .verify_invitation("t1", "INV001.not-the-secret")
            .await
            .unwrap_err();
        assert_eq!(err.error_code(), "NOT_FOUND");
        let err = repo.verify_invitation("t2", &token).await.unwrap_err();
        assert_eq!(err.error_code(), "NOT_FOUND");
        let err = repo.verify_invitation("t1", "garbage").await.unwrap_err();
        assert_eq!(err.error_code(), "NOT_FOUND");
    }

    #[tokio::test]
    async fn test_expired_and_revoked_cannot_be_accepted() {
        let (repo, _dir) = repo().await;
        let expired = repo
            .issue_invitation("t1", "mona", request(), Duration::hours(-1))
            .await
            .unwrap();
        let token = expired.data.token.unwrap();
        assert_eq!(
            repo.verify_invitation("t1", &token).await.unwrap().state,
            InvitationState::Expired
        );
        assert!(repo.accept_invitation("t1", "nour", &token).await.is_err());

        let revocable = repo
            .issue_invitation("t1", "mona", request(), Duration::hours(24))
            .await
            .unwrap();
        let revoked = repo
            .revoke_invitation("t1", "mona", &revocable.id)
            .await
            .unwrap();
        assert_eq!(revoked.data.state, InvitationState::Revoked);
        assert!(repo
            .revoke_invitation("t1", "mona", &revocable.id)
            .await
            .is_err());
    }

    #[tokio::test]
    async fn test_search_never_matches_secret() {
        let (repo, _dir) = repo().await;
        let issued = repo
            .issue_invitation("t1", "mona", request(), Duration::hours(24))
            .await
            .unwrap();
        let token = issued.data.token.unwrap();
        let (_, secret) = parse_token(&token).unwrap();

        let search = |q: &str| ListFilter {
            search: Some(q.to_string()),
            ..ListFilter::all()
        };
        let by_email = repo.list::<Invitation>("t1", &search("nour@")).await.unwrap();
        assert_eq!(by_email.total, 1);

        for q in [&secret[..12], secret, "secret\":\""] {
            let page = repo.list::<Invitation>("t1", &search(q)).await.unwrap();
            assert_eq!(page.total, 0, "search {:?} matched", q);
        }
    }
}
