use campusdesk::campusdesk_auth::{Claims, Role};
use campusdesk::middleware::auth::AuthUser;
use campusdesk::middleware::role::{check_any_role, check_role};

fn create_test_auth_user(role: &str) -> AuthUser {
    let claims = Claims {
        sub: "00000000-0000-0000-0000-000000000000".to_string(),
        name: "Test".to_string(),
        email: "test@example.com".to_string(),
        role: role.to_string(),
        domain: None,
        exp: 9999999999,
        iat: 1234567890,
    };
    AuthUser(claims)
}

#[test]
fn test_check_role_exact_match() {
    for role in Role::ALL {
        let auth_user = create_test_auth_user(role.as_str());
        assert!(check_role(&auth_user, role).is_ok());
    }
}

#[test]
fn test_check_role_is_case_insensitive() {
    let auth_user = create_test_auth_user("faculty");
    assert!(check_role(&auth_user, Role::Faculty).is_ok());
}

#[test]
fn test_check_role_no_match() {
    let auth_user = create_test_auth_user("Student");
    assert!(check_role(&auth_user, Role::Admin).is_err());

    let auth_user = create_test_auth_user("Faculty");
    assert!(check_role(&auth_user, Role::Authority).is_err());
}

#[test]
fn test_check_any_role_multiple_match() {
    let allowed = [Role::Admin, Role::Faculty, Role::Authority];

    for role in allowed {
        let auth_user = create_test_auth_user(role.as_str());
        assert!(check_any_role(&auth_user, &allowed).is_ok());
    }

    let auth_user = create_test_auth_user("Student");
    assert!(check_any_role(&auth_user, &allowed).is_err());
}

#[test]
fn test_check_any_role_empty_list() {
    let auth_user = create_test_auth_user("Admin");
    assert!(check_any_role(&auth_user, &[]).is_err());
}

#[test]
fn test_unknown_role_is_forbidden() {
    let auth_user = create_test_auth_user("system_admin");
    let err = check_role(&auth_user, Role::Admin).unwrap_err();
    assert_eq!(err.status, axum::http::StatusCode::FORBIDDEN);
}
