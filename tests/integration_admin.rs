mod common;

use axum::http::StatusCode;
use campusdesk::campusdesk_auth::Role;
use campusdesk::campusdesk_core::default_password_for;
use campusdesk::campusdesk_models::admin::ImportRow;
use campusdesk::modules::admin::service::AdminService;
use common::{create_test_account, generate_unique_email, send};
use serde_json::json;
use sqlx::PgPool;
use uuid::Uuid;

#[sqlx::test(migrations = "./migrations")]
async fn test_create_class_with_existing_teacher(pool: PgPool) {
    let mut tx = pool.begin().await.unwrap();
    let admin = create_test_account(&mut tx, Role::Admin, "adminpass", None).await;
    let faculty = create_test_account(&mut tx, Role::Faculty, "facultypass", None).await;
    tx.commit().await.unwrap();

    let (status, body) = send(
        &pool,
        "POST",
        "/api/v1/admin/create-class",
        Some(&admin.token()),
        Some(json!({ "name": "Operating Systems", "teacher_id": faculty.id })),
    )
    .await;

    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(body["data"]["data"]["name"], "Operating Systems");
    assert_eq!(body["data"]["data"]["teacher_id"], faculty.id.to_string());
}

#[sqlx::test(migrations = "./migrations")]
async fn test_create_class_with_unknown_teacher_is_not_found(pool: PgPool) {
    let mut tx = pool.begin().await.unwrap();
    let admin = create_test_account(&mut tx, Role::Admin, "adminpass", None).await;
    tx.commit().await.unwrap();

    let (status, body) = send(
        &pool,
        "POST",
        "/api/v1/admin/create-class",
        Some(&admin.token()),
        Some(json!({ "name": "Compilers", "teacher_id": Uuid::new_v4() })),
    )
    .await;

    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body["message"], "Teacher not found");

    let count = sqlx::query_scalar::<_, i64>("SELECT COUNT(*) FROM classes")
        .fetch_one(&pool)
        .await
        .unwrap();
    assert_eq!(count, 0);
}

#[sqlx::test(migrations = "./migrations")]
async fn test_create_student_gets_default_password(pool: PgPool) {
    let mut tx = pool.begin().await.unwrap();
    let admin = create_test_account(&mut tx, Role::Admin, "adminpass", None).await;
    tx.commit().await.unwrap();

    let email = generate_unique_email();
    let (status, _) = send(
        &pool,
        "POST",
        "/api/v1/admin/create-student",
        Some(&admin.token()),
        Some(json!({ "name": "New Student", "email": email })),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);

    let (status, _) = send(
        &pool,
        "POST",
        "/api/v1/student/login",
        None,
        Some(json!({ "email": email, "password": default_password_for(&email) })),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
}

#[sqlx::test(migrations = "./migrations")]
async fn test_default_password_keeps_email_case(pool: PgPool) {
    let mut tx = pool.begin().await.unwrap();
    let admin = create_test_account(&mut tx, Role::Admin, "adminpass", None).await;
    tx.commit().await.unwrap();

    let email = format!("Ada.{}@Campus.edu", Uuid::new_v4());
    let (status, body) = send(
        &pool,
        "POST",
        "/api/v1/admin/create-student",
        Some(&admin.token()),
        Some(json!({ "name": "Ada", "email": email })),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(body["data"]["data"]["email"], email.to_lowercase());

    let (status, _) = send(
        &pool,
        "POST",
        "/api/v1/student/login",
        None,
        Some(json!({ "email": email.to_lowercase(), "password": "Ada@123" })),
    )
    .await;
    assert_eq!(status, StatusCode::OK);

    let (status, _) = send(
        &pool,
        "POST",
        "/api/v1/student/login",
        None,
        Some(json!({ "email": email, "password": "ada@123" })),
    )
    .await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
}

#[sqlx::test(migrations = "./migrations")]
async fn test_faculty_default_password_keeps_email_case(pool: PgPool) {
    let mut tx = pool.begin().await.unwrap();
    let admin = create_test_account(&mut tx, Role::Admin, "adminpass", None).await;
    tx.commit().await.unwrap();

    let email = format!("GRace.{}@Campus.edu", Uuid::new_v4());
    let (status, _) = send(
        &pool,
        "POST",
        "/api/v1/admin/create-faculty",
        Some(&admin.token()),
        Some(json!({ "name": "Grace", "email": email })),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);

    let (status, _) = send(
        &pool,
        "POST",
        "/api/v1/faculty/login",
        None,
        Some(json!({ "email": email, "password": "GRa@123" })),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
}

#[sqlx::test(migrations = "./migrations")]
async fn test_bulk_import_default_password_keeps_email_case(pool: PgPool) {
    let email = format!("Linus.{}@Campus.edu", Uuid::new_v4());
    let rows = vec![ImportRow {
        name: None,
        email: format!("  {}", email),
    }];

    let result = AdminService::bulk_create_students(&pool, rows).await.unwrap();
    assert_eq!(result.created_count, 1);

    let stored = sqlx::query_scalar::<_, String>("SELECT email FROM students WHERE email = $1")
        .bind(email.to_lowercase())
        .fetch_one(&pool)
        .await
        .unwrap();
    assert_eq!(stored, email.to_lowercase());

    let (status, _) = send(
        &pool,
        "POST",
        "/api/v1/student/login",
        None,
        Some(json!({ "email": email, "password": "Lin@123" })),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
}

#[sqlx::test(migrations = "./migrations")]
async fn test_bulk_import_skips_existing_and_repeated_emails(pool: PgPool) {
    let mut tx = pool.begin().await.unwrap();
    let existing = create_test_account(&mut tx, Role::Student, "studentpass", None).await;
    tx.commit().await.unwrap();

    let fresh = generate_unique_email();
    let rows = vec![
        ImportRow {
            name: Some("Fresh Student".to_string()),
            email: fresh.clone(),
        },
        ImportRow {
            name: None,
            email: existing.email.clone(),
        },
        ImportRow {
            name: Some("Repeat".to_string()),
            email: fresh.to_uppercase(),
        },
    ];

    let result = AdminService::bulk_create_students(&pool, rows).await.unwrap();

    assert_eq!(result.created_count, 1);
    assert_eq!(result.errors.len(), 2);
    assert!(
        result
            .errors
            .iter()
            .any(|e| e.email == existing.email && e.error == "Student already exists")
    );
    assert!(
        result
            .errors
            .iter()
            .any(|e| e.email == fresh && e.error == "Duplicate email in file")
    );

    let name = sqlx::query_scalar::<_, Option<String>>("SELECT name FROM students WHERE email = $1")
        .bind(&fresh)
        .fetch_one(&pool)
        .await
        .unwrap();
    assert_eq!(name.as_deref(), Some("Fresh Student"));
}

#[sqlx::test(migrations = "./migrations")]
async fn test_bulk_import_without_file_is_rejected(pool: PgPool) {
    let mut tx = pool.begin().await.unwrap();
    let admin = create_test_account(&mut tx, Role::Admin, "adminpass", None).await;
    tx.commit().await.unwrap();

    let (status, _) = send(
        &pool,
        "POST",
        "/api/v1/admin/bulk-create-students",
        Some(&admin.token()),
        None,
    )
    .await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
}
