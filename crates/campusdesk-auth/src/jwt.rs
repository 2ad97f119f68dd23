//! Token creation and verification (HS256, fixed lifetime, no refresh).

use chrono::Utc;
use jsonwebtoken::{DecodingKey, EncodingKey, Header, Validation, decode, encode};
use uuid::Uuid;

use campusdesk_config::JwtConfig;
use campusdesk_core::AppError;

use crate::claims::Claims;
use crate::role::Role;

/// Creates an access token valid for `jwt_config.expiry` seconds.
pub fn create_access_token(
    user_id: Uuid,
    name: &str,
    email: &str,
    role: Role,
    domain: Option<Uuid>,
    jwt_config: &JwtConfig,
) -> Result<String, AppError> {
    let now = Utc::now().timestamp();
    let exp = (now + jwt_config.expiry).max(0);

    let claims = Claims {
        sub: user_id.to_string(),
        name: name.to_string(),
        email: email.to_string(),
        role: role.as_str().to_string(),
        domain,
        exp: exp as usize,
        iat: now as usize,
    };

    encode(
        &Header::default(),
        &claims,
        &EncodingKey::from_secret(jwt_config.secret.as_bytes()),
    )
    .map_err(|e| AppError::internal_error(format!("Failed to create token: {}", e)))
}

/// Verifies signature and expiry.
pub fn verify_token(token: &str, jwt_config: &JwtConfig) -> Result<Claims, AppError> {
    decode::<Claims>(
        token,
        &DecodingKey::from_secret(jwt_config.secret.as_bytes()),
        &Validation::default(),
    )
    .map(|data| data.claims)
    .map_err(|_| AppError::unauthorized("Invalid Access Token"))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn get_test_jwt_config() -> JwtConfig {
        JwtConfig {
            secret: "test-secret-key-at-least-32-characters-long".to_string(),
            expiry: 3600,
        }
    }

    #[test]
    fn test_create_and_verify_token() {
        let config = get_test_jwt_config();
        let user_id = Uuid::new_v4();
        let domain = Uuid::new_v4();

        let token = create_access_token(
            user_id,
            "Grace",
            "grace@campus.edu",
            Role::Authority,
            Some(domain),
            &config,
        )
        .unwrap();
        let claims = verify_token(&token, &config).unwrap();

        assert_eq!(claims.sub, user_id.to_string());
        assert_eq!(claims.name, "Grace");
        assert_eq!(claims.email, "grace@campus.edu");
        assert_eq!(claims.role, "Authority");
        assert_eq!(claims.domain, Some(domain));
        assert_eq!(claims.exp - claims.iat, 3600);
    }

    #[test]
    fn test_verify_with_wrong_secret_fails() {
        let config = get_test_jwt_config();
        let token = create_access_token(
            Uuid::new_v4(),
            "A",
            "a@b.c",
            Role::Student,
            None,
            &config,
        )
        .unwrap();

        let other = JwtConfig {
            secret: "another-secret-key-at-least-32-characters".to_string(),
            expiry: 3600,
        };
        let err = verify_token(&token, &other).unwrap_err();
        assert_eq!(err.status.as_u16(), 401);
        assert_eq!(err.error.to_string(), "Invalid Access Token");
    }

    #[test]
    fn test_expired_token_is_rejected() {
        let config = JwtConfig {
            secret: "test-secret-key-at-least-32-characters-long".to_string(),
            // Past the default 60s leeway.
            expiry: -120,
        };
        let token =
            create_access_token(Uuid::new_v4(), "A", "a@b.c", Role::Faculty, None, &config)
                .unwrap();
        assert!(verify_token(&token, &config).is_err());
    }

    #[test]
    fn test_garbage_token_is_rejected() {
        assert!(verify_token("not.a.token", &get_test_jwt_config()).is_err());
    }
}
