mod common;

use axum::http::StatusCode;
use campusdesk::campusdesk_auth::{Role, verify_token};
use campusdesk::campusdesk_config::{JwtConfig, ServerConfig};
use campusdesk::modules::auth::service::AuthService;
use common::{create_test_account, create_test_domain, generate_unique_email, send};
use serde_json::json;
use sqlx::PgPool;

#[sqlx::test(migrations = "./migrations")]
async fn test_login_success_returns_role_token(pool: PgPool) {
    let mut tx = pool.begin().await.unwrap();
    let faculty = create_test_account(&mut tx, Role::Faculty, "testpass123", None).await;
    tx.commit().await.unwrap();

    let (status, body) = send(
        &pool,
        "POST",
        "/api/v1/faculty/login",
        None,
        Some(json!({ "email": faculty.email, "password": "testpass123" })),
    )
    .await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"]["success"], true);

    let data = &body["data"]["data"];
    assert_eq!(data["user"]["email"], faculty.email);
    assert_eq!(data["user"]["role"], "Faculty");

    let token = data["token"].as_str().unwrap();
    let claims = verify_token(token, &JwtConfig::from_env()).unwrap();
    assert_eq!(claims.sub, faculty.id.to_string());
    assert_eq!(claims.role().unwrap(), Role::Faculty);
}

#[sqlx::test(migrations = "./migrations")]
async fn test_login_email_is_case_insensitive(pool: PgPool) {
    let mut tx = pool.begin().await.unwrap();
    let student = create_test_account(&mut tx, Role::Student, "testpass123", None).await;
    tx.commit().await.unwrap();

    let (status, _) = send(
        &pool,
        "POST",
        "/api/v1/student/login",
        None,
        Some(json!({ "email": student.email.to_uppercase(), "password": "testpass123" })),
    )
    .await;

    assert_eq!(status, StatusCode::OK);
}

#[sqlx::test(migrations = "./migrations")]
async fn test_authority_token_carries_domain(pool: PgPool) {
    let mut tx = pool.begin().await.unwrap();
    let domain_id = create_test_domain(&mut tx).await;
    let authority =
        create_test_account(&mut tx, Role::Authority, "testpass123", Some(domain_id)).await;
    tx.commit().await.unwrap();

    let (status, body) = send(
        &pool,
        "POST",
        "/api/v1/authority/login",
        None,
        Some(json!({ "email": authority.email, "password": "testpass123" })),
    )
    .await;

    assert_eq!(status, StatusCode::OK);
    let token = body["data"]["data"]["token"].as_str().unwrap();
    let claims = verify_token(token, &JwtConfig::from_env()).unwrap();
    assert_eq!(claims.domain, Some(domain_id));
}

#[sqlx::test(migrations = "./migrations")]
async fn test_login_unknown_email_is_not_found(pool: PgPool) {
    let (status, body) = send(
        &pool,
        "POST",
        "/api/v1/admin/login",
        None,
        Some(json!({ "email": generate_unique_email(), "password": "whatever" })),
    )
    .await;

    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body["data"]["success"], false);
}

#[sqlx::test(migrations = "./migrations")]
async fn test_login_wrong_password_is_unauthorized(pool: PgPool) {
    let mut tx = pool.begin().await.unwrap();
    let admin = create_test_account(&mut tx, Role::Admin, "correctpass", None).await;
    tx.commit().await.unwrap();

    let (status, body) = send(
        &pool,
        "POST",
        "/api/v1/admin/login",
        None,
        Some(json!({ "email": admin.email, "password": "wrongpass" })),
    )
    .await;

    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert_eq!(body["message"], "Invalid credentials");
}

#[sqlx::test(migrations = "./migrations")]
async fn test_login_does_not_cross_account_tables(pool: PgPool) {
    let mut tx = pool.begin().await.unwrap();
    let student = create_test_account(&mut tx, Role::Student, "testpass123", None).await;
    tx.commit().await.unwrap();

    let (status, _) = send(
        &pool,
        "POST",
        "/api/v1/faculty/login",
        None,
        Some(json!({ "email": student.email, "password": "testpass123" })),
    )
    .await;

    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[sqlx::test(migrations = "./migrations")]
async fn test_login_missing_password(pool: PgPool) {
    let (status, _) = send(
        &pool,
        "POST",
        "/api/v1/student/login",
        None,
        Some(json!({ "email": "test@test.com" })),
    )
    .await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
}

#[sqlx::test(migrations = "./migrations")]
async fn test_default_admin_created_once(pool: PgPool) {
    let mut config = ServerConfig::from_env();
    config.default_admin_email = generate_unique_email();
    config.default_admin_password = "bootstrap".to_string();

    assert!(AuthService::ensure_default_admin(&pool, &config).await.unwrap());
    assert!(!AuthService::ensure_default_admin(&pool, &config).await.unwrap());

    let (status, _) = send(
        &pool,
        "POST",
        "/api/v1/admin/login",
        None,
        Some(json!({ "email": config.default_admin_email, "password": "bootstrap" })),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
}

#[sqlx::test(migrations = "./migrations")]
async fn test_default_admin_skipped_when_name_taken(pool: PgPool) {
    sqlx::query("INSERT INTO admins (name, email, password) VALUES ('Admin', $1, 'x')")
        .bind(generate_unique_email())
        .execute(&pool)
        .await
        .unwrap();

    let mut config = ServerConfig::from_env();
    config.default_admin_email = generate_unique_email();

    let created = AuthService::ensure_default_admin(&pool, &config).await.unwrap();
    assert!(!created);

    let count = sqlx::query_scalar::<_, i64>("SELECT COUNT(*) FROM admins")
        .fetch_one(&pool)
        .await
        .unwrap();
    assert_eq!(count, 1);
}
