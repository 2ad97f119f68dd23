mod common;

use axum::http::StatusCode;
use campusdesk::campusdesk_auth::Role;
use common::{TestAccount, create_test_account, send};
use serde_json::json;
use sqlx::{PgPool, Postgres, Transaction};
use uuid::Uuid;

async fn create_test_club(
    tx: &mut Transaction<'_, Postgres>,
    leader: &TestAccount,
    advisor: &TestAccount,
) -> Uuid {
    let club = sqlx::query_scalar::<_, Uuid>(
        r#"
        INSERT INTO clubs (name, description, advisor_id, leader_id)
        VALUES ($1, 'Weekend hikes', $2, $3)
        RETURNING id
        "#,
    )
    .bind(format!("Hiking {}", Uuid::new_v4()))
    .bind(advisor.id)
    .bind(leader.id)
    .fetch_one(&mut **tx)
    .await
    .unwrap();

    sqlx::query(
        "INSERT INTO club_memberships (club_id, student_id, status) VALUES ($1, $2, 'approved')",
    )
    .bind(club)
    .bind(leader.id)
    .execute(&mut **tx)
    .await
    .unwrap();

    club
}

async fn membership(pool: &PgPool, club: Uuid, student: Uuid) -> Option<String> {
    sqlx::query_scalar::<_, String>(
        "SELECT status::text FROM club_memberships WHERE club_id = $1 AND student_id = $2",
    )
    .bind(club)
    .bind(student)
    .fetch_optional(pool)
    .await
    .unwrap()
}

#[sqlx::test(migrations = "./migrations")]
async fn test_join_request_approved_by_leader(pool: PgPool) {
    let mut tx = pool.begin().await.unwrap();
    let leader = create_test_account(&mut tx, Role::Student, "studentpass", None).await;
    let advisor = create_test_account(&mut tx, Role::Faculty, "facultypass", None).await;
    let applicant = create_test_account(&mut tx, Role::Student, "studentpass", None).await;
    let bystander = create_test_account(&mut tx, Role::Student, "studentpass", None).await;
    let club = create_test_club(&mut tx, &leader, &advisor).await;
    tx.commit().await.unwrap();

    let join = format!("/api/v1/campus/clubs/{}/join", club);
    let (status, _) = send(&pool, "POST", &join, Some(&applicant.token()), None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(membership(&pool, club, applicant.id).await.as_deref(), Some("pending"));

    let (status, body) = send(&pool, "POST", &join, Some(&applicant.token()), None).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["message"], "Join request already pending");

    let (status, body) = send(
        &pool,
        "GET",
        &format!("/api/v1/campus/clubs/{}/requests", club),
        Some(&leader.token()),
        None,
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    let pending = body["data"]["data"].as_array().unwrap();
    assert_eq!(pending.len(), 1);
    assert_eq!(pending[0]["student_id"], applicant.id.to_string());

    let approve = format!("/api/v1/campus/clubs/{}/approve/{}", club, applicant.id);
    let (status, body) = send(&pool, "POST", &approve, Some(&bystander.token()), None).await;
    assert_eq!(status, StatusCode::FORBIDDEN);
    assert_eq!(
        body["message"],
        "Only the club leader or advisor can perform this action"
    );

    let (status, _) = send(&pool, "POST", &approve, Some(&leader.token()), None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(membership(&pool, club, applicant.id).await.as_deref(), Some("approved"));

    let (status, body) = send(&pool, "POST", &join, Some(&applicant.token()), None).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["message"], "Already a member");
}

#[sqlx::test(migrations = "./migrations")]
async fn test_join_request_rejected_by_advisor(pool: PgPool) {
    let mut tx = pool.begin().await.unwrap();
    let leader = create_test_account(&mut tx, Role::Student, "studentpass", None).await;
    let advisor = create_test_account(&mut tx, Role::Faculty, "facultypass", None).await;
    let applicant = create_test_account(&mut tx, Role::Student, "studentpass", None).await;
    let club = create_test_club(&mut tx, &leader, &advisor).await;
    tx.commit().await.unwrap();

    let (status, _) = send(
        &pool,
        "POST",
        &format!("/api/v1/campus/clubs/{}/join", club),
        Some(&applicant.token()),
        None,
    )
    .await;
    assert_eq!(status, StatusCode::OK);

    let reject = format!("/api/v1/campus/clubs/{}/reject/{}", club, applicant.id);
    let (status, _) = send(&pool, "POST", &reject, Some(&advisor.token()), None).await;
    assert_eq!(status, StatusCode::OK);
    assert!(membership(&pool, club, applicant.id).await.is_none());

    let (status, body) = send(&pool, "POST", &reject, Some(&advisor.token()), None).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body["message"], "No pending request found");

    // Approving is only possible while a request is pending
    let (status, _) = send(
        &pool,
        "POST",
        &format!("/api/v1/campus/clubs/{}/approve/{}", club, applicant.id),
        Some(&leader.token()),
        None,
    )
    .await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[sqlx::test(migrations = "./migrations")]
async fn test_closed_alert_cannot_be_cancelled(pool: PgPool) {
    let mut tx = pool.begin().await.unwrap();
    let student = create_test_account(&mut tx, Role::Student, "studentpass", None).await;
    let faculty = create_test_account(&mut tx, Role::Faculty, "facultypass", None).await;
    tx.commit().await.unwrap();

    let (status, body) = send(
        &pool,
        "POST",
        "/api/v1/campus/emergency",
        Some(&student.token()),
        Some(json!({ "emergency_type": "medical", "description": "Fainted in the lab" })),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);
    let alert: Uuid = body["data"]["data"]["id"].as_str().unwrap().parse().unwrap();

    let (status, _) = send(
        &pool,
        "PUT",
        &format!("/api/v1/campus/emergency/{}/status", alert),
        Some(&faculty.token()),
        Some(json!({ "status": "resolved" })),
    )
    .await;
    assert_eq!(status, StatusCode::OK);

    let cancel = format!("/api/v1/campus/emergency/{}/cancel", alert);
    let (status, body) = send(&pool, "PUT", &cancel, Some(&student.token()), None).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["message"], "Alert is already closed");

    let stored = sqlx::query_scalar::<_, String>(
        "SELECT status::text FROM emergency_alerts WHERE id = $1",
    )
    .bind(alert)
    .fetch_one(&pool)
    .await
    .unwrap();
    assert_eq!(stored, "resolved");
}

#[sqlx::test(migrations = "./migrations")]
async fn test_only_reporter_can_cancel_alert(pool: PgPool) {
    let mut tx = pool.begin().await.unwrap();
    let reporter = create_test_account(&mut tx, Role::Student, "studentpass", None).await;
    let other = create_test_account(&mut tx, Role::Student, "studentpass", None).await;
    tx.commit().await.unwrap();

    let (_, body) = send(
        &pool,
        "POST",
        "/api/v1/campus/emergency",
        Some(&reporter.token()),
        Some(json!({ "emergency_type": "fire", "description": "Smoke on floor 2" })),
    )
    .await;
    let alert = body["data"]["data"]["id"].as_str().unwrap().to_string();
    let cancel = format!("/api/v1/campus/emergency/{}/cancel", alert);

    let (status, _) = send(&pool, "PUT", &cancel, Some(&other.token()), None).await;
    assert_eq!(status, StatusCode::FORBIDDEN);

    let (status, body) = send(&pool, "PUT", &cancel, Some(&reporter.token()), None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"]["data"]["status"], "cancelled");
}
