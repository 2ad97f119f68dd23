//! Account models.
//!
//! Password hashes are only ever read into [`AccountCredentials`], which is not
//! serializable, so no response type can leak them.

use campusdesk_auth::Role;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use utoipa::ToSchema;
use uuid::Uuid;
use validator::Validate;

#[derive(Debug, Clone, Serialize, Deserialize, FromRow, ToSchema)]
pub struct Admin {
    pub id: Uuid,
    pub name: String,
    pub email: String,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, Deserialize, FromRow, ToSchema)]
pub struct Faculty {
    pub id: Uuid,
    pub name: String,
    pub email: String,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, Deserialize, FromRow, ToSchema)]
pub struct Student {
    pub id: Uuid,
    pub name: Option<String>,
    pub enrollment_no: Option<String>,
    pub email: String,
    pub class_id: Option<Uuid>,
    pub domain_id: Option<Uuid>,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, Deserialize, FromRow, ToSchema)]
pub struct StudentProfile {
    pub id: Uuid,
    pub name: Option<String>,
    pub enrollment_no: Option<String>,
    pub email: String,
    pub class_id: Option<Uuid>,
    pub class_name: Option<String>,
    pub domain_id: Option<Uuid>,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, Deserialize, FromRow, ToSchema)]
pub struct Authority {
    pub id: Uuid,
    pub name: String,
    pub email: String,
    pub department: Option<String>,
    pub domain_id: Option<Uuid>,
    pub domain_name: Option<String>,
    pub created_at: DateTime<Utc>,
}

/// Row used only for sign-in. Never serialized.
#[derive(Debug, FromRow)]
pub struct AccountCredentials {
    pub id: Uuid,
    pub name: Option<String>,
    pub email: String,
    pub password: String,
    pub domain_id: Option<Uuid>,
}

/// The signed-in account as returned by every login route.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct AccountSummary {
    pub id: Uuid,
    pub name: Option<String>,
    pub email: String,
    pub role: Role,
    pub domain: Option<Uuid>,
}

#[derive(Debug, Deserialize, Validate, ToSchema)]
pub struct LoginRequest {
    #[validate(length(min = 1, message = "email is required"))]
    pub email: String,
    #[validate(length(min = 1, message = "password is required"))]
    pub password: String,
}

#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct LoginResponse {
    pub token: String,
    pub user: AccountSummary,
}

#[derive(Debug, Deserialize, Validate, ToSchema)]
pub struct RegisterAdminDto {
    #[validate(length(min = 1, max = 100, message = "name is required"))]
    pub name: String,
    #[validate(email(message = "A valid email is required"))]
    pub email: String,
    #[validate(length(min = 1, message = "password is required"))]
    pub password: String,
}

#[derive(Debug, Deserialize, Validate, ToSchema)]
pub struct CreateFacultyDto {
    #[validate(length(min = 1, max = 100, message = "name is required"))]
    pub name: String,
    #[validate(email(message = "A valid email is required"))]
    pub email: String,
}

#[derive(Debug, Deserialize, Validate, ToSchema)]
pub struct CreateStudentDto {
    #[validate(length(min = 1, max = 100))]
    pub name: Option<String>,
    #[validate(email(message = "A valid email is required"))]
    pub email: String,
    pub enrollment_no: Option<String>,
    pub class_id: Option<Uuid>,
}

#[derive(Debug, Deserialize, Validate, ToSchema)]
pub struct CreateAuthorityDto {
    #[validate(length(min = 1, max = 100, message = "name is required"))]
    pub name: String,
    #[validate(email(message = "A valid email is required"))]
    pub email: String,
    #[validate(length(min = 1, message = "password is required"))]
    pub password: String,
    pub department: Option<String>,
    pub domain_id: Option<Uuid>,
}

#[derive(Debug, Deserialize, Validate, ToSchema)]
pub struct UpdateStudentProfileDto {
    #[validate(length(min = 1, max = 100))]
    pub name: Option<String>,
    #[validate(length(min = 1, max = 50))]
    pub enrollment_no: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_login_request_requires_both_fields() {
        let ok = LoginRequest {
            email: "a@b.co".to_string(),
            password: "x".to_string(),
        };
        assert!(ok.validate().is_ok());

        let missing = LoginRequest {
            email: "".to_string(),
            password: "x".to_string(),
        };
        let errors = missing.validate().unwrap_err();
        assert!(errors.field_errors().contains_key("email"));
    }

    #[test]
    fn test_create_student_dto_validation() {
        let ok = CreateStudentDto {
            name: None,
            email: "new@campus.edu".to_string(),
            enrollment_no: None,
            class_id: None,
        };
        assert!(ok.validate().is_ok());

        let bad_email = CreateStudentDto {
            name: Some("New".to_string()),
            email: "not-an-email".to_string(),
            enrollment_no: None,
            class_id: None,
        };
        assert!(bad_email.validate().is_err());
    }

    #[test]
    fn test_account_summary_serializes_role_name() {
        let summary = AccountSummary {
            id: Uuid::nil(),
            name: Some("Ops".to_string()),
            email: "ops@campus.edu".to_string(),
            role: Role::Authority,
            domain: None,
        };
        let json = serde_json::to_value(&summary).unwrap();
        assert_eq!(json["role"], "Authority");
    }
}
