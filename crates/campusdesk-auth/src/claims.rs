//! JWT claim structure for access tokens.

use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use uuid::Uuid;

use crate::role::{Role, UnknownRole};

/// Claims embedded in every access token.
///
/// `domain` is only set for authorities and reflects their domain at sign-in
/// time. Domain-scoped handlers re-read the current domain from the store.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct Claims {
    /// Account ID (subject claim)
    pub sub: String,
    pub name: String,
    pub email: String,
    /// One of `Admin`, `Student`, `Faculty`, `Authority`
    pub role: String,
    pub domain: Option<Uuid>,
    /// Expiration (Unix timestamp)
    pub exp: usize,
    /// Issued-at (Unix timestamp)
    pub iat: usize,
}

impl Claims {
    pub fn role(&self) -> Result<Role, UnknownRole> {
        self.role.parse()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_claims_serialize() {
        let claims = Claims {
            sub: "user-id-123".to_string(),
            name: "Ada".to_string(),
            email: "ada@campus.edu".to_string(),
            role: "Student".to_string(),
            domain: None,
            exp: 1234567890,
            iat: 1234567800,
        };
        let serialized = serde_json::to_string(&claims).unwrap();
        assert!(serialized.contains(r#""sub":"user-id-123""#));
        assert!(serialized.contains(r#""role":"Student""#));
        assert!(serialized.contains(r#""domain":null"#));
    }

    #[test]
    fn test_claims_deserialize_authority_domain() {
        let domain = Uuid::new_v4();
        let json = format!(
            r#"{{"sub":"a-1","name":"Ops","email":"ops@campus.edu","role":"authority","domain":"{}","exp":9999999999,"iat":9999999900}}"#,
            domain
        );
        let claims: Claims = serde_json::from_str(&json).unwrap();
        assert_eq!(claims.domain, Some(domain));
        assert_eq!(claims.role(), Ok(Role::Authority));
    }
}
