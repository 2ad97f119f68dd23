//! Role gates.
//!
//! Routes are gated in one of two ways:
//! 1. `route_layer(from_fn_with_state(state, require_admin))` on a whole router
//! 2. a `RequireAdmin(auth_user)`-style extractor on a single handler
//!
//! Roles are compared case-insensitively through [`Role`]'s `FromStr`.

use axum::{
    extract::{FromRequestParts, Request, State},
    http::request::Parts,
    middleware::Next,
    response::{IntoResponse, Response},
};
use campusdesk_auth::Role;
use campusdesk_core::AppError;

use crate::middleware::auth::AuthUser;
use crate::state::AppState;

const FORBIDDEN: &str = "Forbidden: Insufficient privileges";

pub fn check_role(auth_user: &AuthUser, role: Role) -> Result<(), AppError> {
    check_any_role(auth_user, &[role])
}

pub fn check_any_role(auth_user: &AuthUser, allowed: &[Role]) -> Result<(), AppError> {
    let role = auth_user
        .role()
        .map_err(|_| AppError::forbidden(FORBIDDEN))?;

    if allowed.contains(&role) {
        Ok(())
    } else {
        Err(AppError::forbidden(FORBIDDEN))
    }
}

/// Authenticates the request and rejects callers outside `allowed`. The
/// verified user is stored in the request extensions for the handler.
pub async fn require_roles(
    State(state): State<AppState>,
    req: Request,
    next: Next,
    allowed: &[Role],
) -> Result<Response, AppError> {
    let (mut parts, body) = req.into_parts();

    let auth_user = AuthUser::from_request_parts(&mut parts, &state).await?;
    check_any_role(&auth_user, allowed)?;

    parts.extensions.insert(auth_user);
    Ok(next.run(Request::from_parts(parts, body)).await)
}

macro_rules! role_layer {
    ($(#[$meta:meta])* $name:ident, $role:expr) => {
        $(#[$meta])*
        pub async fn $name(state: State<AppState>, req: Request, next: Next) -> Response {
            match require_roles(state, req, next, &[$role]).await {
                Ok(response) => response,
                Err(err) => err.into_response(),
            }
        }
    };
}

role_layer!(require_admin, Role::Admin);
role_layer!(require_faculty, Role::Faculty);
role_layer!(require_student, Role::Student);
role_layer!(require_authority, Role::Authority);

macro_rules! role_extractor {
    ($(#[$meta:meta])* $name:ident, $role:expr) => {
        $(#[$meta])*
        #[derive(Debug, Clone)]
        pub struct $name(pub AuthUser);

        impl FromRequestParts<AppState> for $name {
            type Rejection = AppError;

            async fn from_request_parts(
                parts: &mut Parts,
                state: &AppState,
            ) -> Result<Self, Self::Rejection> {
                let auth_user = AuthUser::from_request_parts(parts, state).await?;
                check_role(&auth_user, $role)?;
                Ok($name(auth_user))
            }
        }
    };
}

role_extractor!(RequireAdmin, Role::Admin);
role_extractor!(RequireFaculty, Role::Faculty);
role_extractor!(RequireStudent, Role::Student);
role_extractor!(RequireAuthority, Role::Authority);

#[cfg(test)]
mod tests {
    use super::*;
    use axum::http::StatusCode;
    use campusdesk_auth::Claims;

    fn user_with_role(role: &str) -> AuthUser {
        AuthUser(Claims {
            sub: uuid::Uuid::new_v4().to_string(),
            name: "Test".to_string(),
            email: "test@campus.edu".to_string(),
            role: role.to_string(),
            domain: None,
            exp: usize::MAX,
            iat: 0,
        })
    }

    #[test]
    fn test_check_role_is_case_insensitive() {
        assert!(check_role(&user_with_role("faculty"), Role::Faculty).is_ok());
        assert!(check_role(&user_with_role("FACULTY"), Role::Faculty).is_ok());
    }

    #[test]
    fn test_check_role_rejects_other_roles() {
        let err = check_role(&user_with_role("Student"), Role::Admin).unwrap_err();
        assert_eq!(err.status, StatusCode::FORBIDDEN);
        assert_eq!(err.error.to_string(), FORBIDDEN);
    }

    #[test]
    fn test_check_any_role() {
        let allowed = [Role::Admin, Role::Faculty, Role::Authority];
        assert!(check_any_role(&user_with_role("Authority"), &allowed).is_ok());
        assert!(check_any_role(&user_with_role("Student"), &allowed).is_err());
        assert!(check_any_role(&user_with_role("Janitor"), &allowed).is_err());
    }
}
