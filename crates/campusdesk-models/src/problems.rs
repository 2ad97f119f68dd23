//! Complaint ("problem") models.

use std::str::FromStr;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use utoipa::ToSchema;
use uuid::Uuid;
use validator::Validate;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, sqlx::Type, ToSchema)]
#[sqlx(type_name = "problem_status", rename_all = "lowercase")]
#[serde(rename_all = "lowercase")]
pub enum ProblemStatus {
    New,
    Progress,
    Resolved,
}

impl FromStr for ProblemStatus {
    type Err = ();

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "new" => Ok(Self::New),
            "progress" => Ok(Self::Progress),
            "resolved" => Ok(Self::Resolved),
            _ => Err(()),
        }
    }
}

#[derive(
    Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize, sqlx::Type, ToSchema,
)]
#[sqlx(type_name = "problem_priority", rename_all = "lowercase")]
#[serde(rename_all = "lowercase")]
pub enum ProblemPriority {
    High,
    #[default]
    Medium,
    Low,
}

impl FromStr for ProblemPriority {
    type Err = ();

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "high" => Ok(Self::High),
            "medium" => Ok(Self::Medium),
            "low" => Ok(Self::Low),
            _ => Err(()),
        }
    }
}

/// A complaint joined with its domain, student and acceptor.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow, ToSchema)]
pub struct Problem {
    pub id: Uuid,
    pub title: String,
    pub description: String,
    pub image: String,
    pub department: String,
    pub domain_id: Uuid,
    pub domain_name: String,
    pub status: ProblemStatus,
    pub priority: ProblemPriority,
    pub student_id: Uuid,
    pub student_name: Option<String>,
    pub student_email: String,
    pub accepted_by: Option<Uuid>,
    pub accepted_by_name: Option<String>,
    pub accepted_by_email: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, Deserialize, FromRow, ToSchema)]
pub struct ProblemComment {
    pub id: Uuid,
    pub problem_id: Uuid,
    pub authority_id: Option<Uuid>,
    pub authority_name: Option<String>,
    pub text: String,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct ProblemWithComments {
    #[serde(flatten)]
    pub problem: Problem,
    pub comments: Vec<ProblemComment>,
}

/// Validated complaint input assembled from the multipart form.
#[derive(Debug, Clone)]
pub struct NewProblem {
    pub title: String,
    pub description: String,
    pub department: String,
    pub domain_id: Uuid,
    pub priority: ProblemPriority,
    pub image: String,
}

#[derive(Debug, Deserialize, Validate, ToSchema)]
pub struct UpdateProblemDto {
    #[validate(length(min = 1, max = 200))]
    pub title: Option<String>,
    #[validate(length(min = 1))]
    pub description: Option<String>,
    #[validate(length(min = 1, max = 100))]
    pub department: Option<String>,
    pub priority: Option<ProblemPriority>,
}

#[derive(Debug, Deserialize, ToSchema)]
pub struct TransferProblemDto {
    pub authority_id: Uuid,
}

/// `status` is kept as text so that an unknown value yields a clear 400.
#[derive(Debug, Deserialize, ToSchema)]
pub struct UpdateProblemStatusDto {
    pub status: Option<String>,
    pub comment: Option<String>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, FromRow, ToSchema)]
pub struct DomainProblemCounts {
    pub total: i64,
    pub pending: i64,
    pub in_progress: i64,
    pub resolved: i64,
    pub high_priority: i64,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, FromRow, ToSchema)]
pub struct PersonalProblemCounts {
    pub total: i64,
    pub in_progress: i64,
    pub resolved: i64,
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct AuthorityStats {
    pub domain_id: Uuid,
    pub domain: DomainProblemCounts,
    pub personal: PersonalProblemCounts,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_status_parse() {
        assert_eq!("new".parse(), Ok(ProblemStatus::New));
        assert_eq!("Progress".parse(), Ok(ProblemStatus::Progress));
        assert_eq!(" resolved ".parse(), Ok(ProblemStatus::Resolved));
        assert!("closed".parse::<ProblemStatus>().is_err());
    }

    #[test]
    fn test_priority_defaults_to_medium() {
        assert_eq!(ProblemPriority::default(), ProblemPriority::Medium);
        assert_eq!("HIGH".parse(), Ok(ProblemPriority::High));
    }

    #[test]
    fn test_status_serializes_lowercase() {
        assert_eq!(
            serde_json::to_string(&ProblemStatus::Progress).unwrap(),
            "\"progress\""
        );
    }
}
