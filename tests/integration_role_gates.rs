mod common;

use axum::http::StatusCode;
use campusdesk::campusdesk_auth::Role;
use common::{create_test_account, create_test_domain, send, send_multipart, setup_test_app};
use sqlx::PgPool;

#[sqlx::test(migrations = "./migrations")]
async fn test_missing_token_is_unauthorized(pool: PgPool) {
    for uri in [
        "/api/v1/admin/get-classes",
        "/api/v1/faculty/my-classes",
        "/api/v1/student/profile",
        "/api/v1/authority/complaints",
    ] {
        let (status, body) = send(&pool, "GET", uri, None, None).await;
        assert_eq!(status, StatusCode::UNAUTHORIZED, "{}", uri);
        assert_eq!(body["message"], "Unauthorized request");
    }
}

#[sqlx::test(migrations = "./migrations")]
async fn test_garbage_token_is_unauthorized(pool: PgPool) {
    let (status, body) = send(
        &pool,
        "GET",
        "/api/v1/admin/get-classes",
        Some("not-a-jwt"),
        None,
    )
    .await;

    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert_eq!(body["message"], "Invalid Access Token");
}

#[sqlx::test(migrations = "./migrations")]
async fn test_wrong_role_is_forbidden(pool: PgPool) {
    let mut tx = pool.begin().await.unwrap();
    let domain = create_test_domain(&mut tx).await;
    let student = create_test_account(&mut tx, Role::Student, "studentpass", None).await;
    let faculty = create_test_account(&mut tx, Role::Faculty, "facultypass", None).await;
    let authority = create_test_account(&mut tx, Role::Authority, "authpass", Some(domain)).await;
    tx.commit().await.unwrap();

    let cases = [
        ("/api/v1/admin/get-classes", student.token()),
        ("/api/v1/admin/get-students", faculty.token()),
        ("/api/v1/faculty/my-classes", authority.token()),
        ("/api/v1/student/profile", faculty.token()),
        ("/api/v1/authority/complaints", student.token()),
    ];

    for (uri, token) in cases {
        let (status, body) = send(&pool, "GET", uri, Some(&token), None).await;
        assert_eq!(status, StatusCode::FORBIDDEN, "{}", uri);
        assert_eq!(body["message"], "Forbidden: Insufficient privileges");
    }
}

#[sqlx::test(migrations = "./migrations")]
async fn test_matching_role_passes_gate(pool: PgPool) {
    let mut tx = pool.begin().await.unwrap();
    let admin = create_test_account(&mut tx, Role::Admin, "adminpass", None).await;
    let faculty = create_test_account(&mut tx, Role::Faculty, "facultypass", None).await;
    tx.commit().await.unwrap();

    let (status, _) = send(
        &pool,
        "GET",
        "/api/v1/admin/get-classes",
        Some(&admin.token()),
        None,
    )
    .await;
    assert_eq!(status, StatusCode::OK);

    let (status, body) = send(
        &pool,
        "GET",
        "/api/v1/faculty/my-classes",
        Some(&faculty.token()),
        None,
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert!(body["data"]["data"].as_array().unwrap().is_empty());
}

#[sqlx::test(migrations = "./migrations")]
async fn test_event_admin_listing_rejects_students(pool: PgPool) {
    let mut tx = pool.begin().await.unwrap();
    let student = create_test_account(&mut tx, Role::Student, "studentpass", None).await;
    tx.commit().await.unwrap();

    let (status, _) = send(
        &pool,
        "GET",
        "/api/v1/event/all",
        Some(&student.token()),
        None,
    )
    .await;
    assert_eq!(status, StatusCode::FORBIDDEN);
}

#[sqlx::test(migrations = "./migrations")]
async fn test_only_students_file_complaints(pool: PgPool) {
    let mut tx = pool.begin().await.unwrap();
    let domain = create_test_domain(&mut tx).await;
    let faculty = create_test_account(&mut tx, Role::Faculty, "facultypass", None).await;
    let authority = create_test_account(&mut tx, Role::Authority, "authpass", Some(domain)).await;
    tx.commit().await.unwrap();

    let domain_id = domain.to_string();
    for token in [faculty.token(), authority.token()] {
        let (status, body) = send_multipart(
            setup_test_app(pool.clone()).await,
            "POST",
            "/api/v1/problem/create",
            Some(&token),
            &[
                ("title", "Broken projector"),
                ("description", "Room 204"),
                ("department", "CSE"),
                ("domain_id", domain_id.as_str()),
                ("image", "https://img.test/p.png"),
            ],
            None,
        )
        .await;
        assert_eq!(status, StatusCode::FORBIDDEN);
        assert_eq!(body["message"], "Forbidden: Insufficient privileges");
    }
}
