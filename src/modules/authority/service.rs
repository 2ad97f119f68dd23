use anyhow::anyhow;
use campusdesk_core::AppError;
use sqlx::PgPool;
use tracing::instrument;
use uuid::Uuid;

use crate::modules::domains::DomainService;
use crate::modules::problems::ProblemService;

use super::model::{AuthorityStats, DomainMember, ProblemStatus};

pub struct AuthorityService;

/// Validates a status update body, returning the parsed status and trimmed comment.
pub fn parse_status_update(
    status: Option<&str>,
    comment: Option<&str>,
) -> Result<(ProblemStatus, String), AppError> {
    let status = status
        .and_then(|s| s.parse::<ProblemStatus>().ok())
        .ok_or_else(|| AppError::bad_request(anyhow!("Invalid status")))?;

    let comment = comment
        .map(str::trim)
        .filter(|c| !c.is_empty())
        .ok_or_else(|| AppError::bad_request(anyhow!("Comment is required")))?;

    Ok((status, comment.to_string()))
}

impl AuthorityService {
    /// The caller's domain as stored now; authorities without one cannot work complaints.
    #[instrument(skip(db))]
    pub async fn require_domain(db: &PgPool, authority_id: Uuid) -> Result<Uuid, AppError> {
        DomainService::current_domain_of(db, authority_id)
            .await?
            .ok_or_else(|| AppError::bad_request(anyhow!("You are not assigned to any domain")))
    }

    #[instrument(skip(db))]
    pub async fn require_membership(
        db: &PgPool,
        authority_id: Uuid,
        domain_id: Uuid,
    ) -> Result<(), AppError> {
        DomainService::get_domain(db, domain_id).await?;
        match DomainService::current_domain_of(db, authority_id).await? {
            Some(current) if current == domain_id => Ok(()),
            _ => Err(AppError::forbidden("You are not a member of this domain")),
        }
    }

    #[instrument(skip(db))]
    pub async fn stats(db: &PgPool, authority_id: Uuid) -> Result<AuthorityStats, AppError> {
        let domain_id = Self::require_domain(db, authority_id).await?;
        let domain = ProblemService::domain_counts(db, domain_id).await?;
        let personal = ProblemService::personal_counts(db, authority_id).await?;
        Ok(AuthorityStats {
            domain_id,
            domain,
            personal,
        })
    }

    #[instrument(skip(db))]
    pub async fn colleagues(db: &PgPool, authority_id: Uuid) -> Result<Vec<DomainMember>, AppError> {
        let domain_id = Self::require_domain(db, authority_id).await?;
        let members = DomainService::members(db, domain_id)
            .await?
            .into_iter()
            .filter(|member| member.id != authority_id)
            .collect();
        Ok(members)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::http::StatusCode;

    #[test]
    fn test_parse_status_update_accepts_known_status() {
        let (status, comment) = parse_status_update(Some("resolved"), Some(" Fixed ")).unwrap();
        assert_eq!(status, ProblemStatus::Resolved);
        assert_eq!(comment, "Fixed");
    }

    #[test]
    fn test_parse_status_update_rejects_unknown_status() {
        let err = parse_status_update(Some("closed"), Some("done")).unwrap_err();
        assert_eq!(err.status, StatusCode::BAD_REQUEST);
        assert_eq!(err.error.to_string(), "Invalid status");
    }

    #[test]
    fn test_parse_status_update_requires_comment() {
        let err = parse_status_update(Some("progress"), Some("  ")).unwrap_err();
        assert_eq!(err.error.to_string(), "Comment is required");
        assert!(parse_status_update(Some("progress"), None).is_err());
    }
}
