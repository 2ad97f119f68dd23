use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use utoipa::ToSchema;
use uuid::Uuid;
use validator::Validate;

#[derive(Debug, Clone, Serialize, Deserialize, FromRow, ToSchema)]
pub struct AuthorityDomain {
    pub id: Uuid,
    pub name: String,
    pub description: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, Deserialize, FromRow, ToSchema)]
pub struct DomainWithStats {
    pub id: Uuid,
    pub name: String,
    pub description: Option<String>,
    pub authority_count: i64,
    pub created_at: DateTime<Utc>,
}

/// Public projection shown to students picking a complaint domain.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow, ToSchema)]
pub struct DomainSummary {
    pub id: Uuid,
    pub name: String,
    pub description: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize, FromRow, ToSchema)]
pub struct DomainMember {
    pub id: Uuid,
    pub name: String,
    pub email: String,
    pub department: Option<String>,
}

/// A domain with its members, derived from `authorities.domain_id`.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct DomainDetail {
    #[serde(flatten)]
    pub domain: AuthorityDomain,
    pub authorities: Vec<DomainMember>,
}

#[derive(Debug, Deserialize, Validate, ToSchema)]
pub struct CreateDomainDto {
    #[validate(length(min = 1, max = 100, message = "name is required"))]
    pub name: String,
    pub description: Option<String>,
}

#[derive(Debug, Deserialize, Validate, ToSchema)]
pub struct UpdateDomainDto {
    #[validate(length(min = 1, max = 100))]
    pub name: Option<String>,
    pub description: Option<String>,
}

#[derive(Debug, Deserialize, Validate, ToSchema)]
pub struct AddAuthorityToDomainDto {
    pub authority_id: Uuid,
    pub domain_id: Uuid,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_create_domain_dto_validation() {
        let ok = CreateDomainDto {
            name: "Hostel".to_string(),
            description: None,
        };
        assert!(ok.validate().is_ok());

        let empty = CreateDomainDto {
            name: "".to_string(),
            description: None,
        };
        assert!(empty.validate().is_err());
    }

    #[test]
    fn test_domain_detail_flattens_domain() {
        let detail = DomainDetail {
            domain: AuthorityDomain {
                id: Uuid::nil(),
                name: "IT".to_string(),
                description: None,
                created_at: Utc::now(),
                updated_at: Utc::now(),
            },
            authorities: vec![],
        };
        let json = serde_json::to_value(&detail).unwrap();
        assert_eq!(json["name"], "IT");
        assert!(json["authorities"].as_array().unwrap().is_empty());
    }
}
