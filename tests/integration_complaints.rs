mod common;

use axum::http::StatusCode;
use campusdesk::campusdesk_auth::Role;
use common::{
    FilePart, TINY_PNG, create_test_account, create_test_domain, create_test_problem, send,
    send_multipart, setup_test_app_with_uploads, stored_files, temp_upload_dir,
};
use serde_json::json;
use sqlx::PgPool;
use uuid::Uuid;

fn ids(body: &serde_json::Value) -> Vec<String> {
    body["data"]["data"]
        .as_array()
        .unwrap()
        .iter()
        .map(|p| p["id"].as_str().unwrap().to_string())
        .collect()
}

async fn accept_as(pool: &PgPool, problem: Uuid, authority: Uuid) {
    sqlx::query("UPDATE problems SET accepted_by = $2, status = 'progress' WHERE id = $1")
        .bind(problem)
        .bind(authority)
        .execute(pool)
        .await
        .unwrap();
}

#[sqlx::test(migrations = "./migrations")]
async fn test_authority_only_sees_own_domain(pool: PgPool) {
    let mut tx = pool.begin().await.unwrap();
    let hostel = create_test_domain(&mut tx).await;
    let library = create_test_domain(&mut tx).await;
    let student = create_test_account(&mut tx, Role::Student, "studentpass", None).await;
    let warden = create_test_account(&mut tx, Role::Authority, "authpass", Some(hostel)).await;
    let hostel_problem = create_test_problem(&mut tx, student.id, hostel, "Broken fan").await;
    let library_problem = create_test_problem(&mut tx, student.id, library, "No wifi").await;
    tx.commit().await.unwrap();

    let (status, body) = send(
        &pool,
        "GET",
        "/api/v1/authority/complaints",
        Some(&warden.token()),
        None,
    )
    .await;

    assert_eq!(status, StatusCode::OK);
    let listed = ids(&body);
    assert!(listed.contains(&hostel_problem.to_string()));
    assert!(!listed.contains(&library_problem.to_string()));

    let (status, _) = send(
        &pool,
        "POST",
        &format!("/api/v1/authority/complaints/{}/accept", library_problem),
        Some(&warden.token()),
        None,
    )
    .await;
    assert_eq!(status, StatusCode::FORBIDDEN);
}

#[sqlx::test(migrations = "./migrations")]
async fn test_authority_without_domain_is_rejected(pool: PgPool) {
    let mut tx = pool.begin().await.unwrap();
    let authority = create_test_account(&mut tx, Role::Authority, "authpass", None).await;
    tx.commit().await.unwrap();

    let (status, _) = send(
        &pool,
        "GET",
        "/api/v1/authority/complaints",
        Some(&authority.token()),
        None,
    )
    .await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
}

#[sqlx::test(migrations = "./migrations")]
async fn test_accept_is_exclusive(pool: PgPool) {
    let mut tx = pool.begin().await.unwrap();
    let domain = create_test_domain(&mut tx).await;
    let student = create_test_account(&mut tx, Role::Student, "studentpass", None).await;
    let first = create_test_account(&mut tx, Role::Authority, "authpass", Some(domain)).await;
    let second = create_test_account(&mut tx, Role::Authority, "authpass", Some(domain)).await;
    let problem = create_test_problem(&mut tx, student.id, domain, "Leaking tap").await;
    tx.commit().await.unwrap();

    let uri = format!("/api/v1/authority/complaints/{}/accept", problem);

    let (status, body) = send(&pool, "POST", &uri, Some(&first.token()), None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"]["data"]["status"], "progress");
    assert_eq!(body["data"]["data"]["accepted_by"], first.id.to_string());

    // Accepting again is a no-op for the acceptor
    let (status, _) = send(&pool, "POST", &uri, Some(&first.token()), None).await;
    assert_eq!(status, StatusCode::OK);

    let (status, body) = send(&pool, "POST", &uri, Some(&second.token()), None).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["message"], "Complaint already accepted by someone else");

    // Accepted complaints drop out of other authorities' lists
    let (_, body) = send(
        &pool,
        "GET",
        "/api/v1/authority/complaints",
        Some(&second.token()),
        None,
    )
    .await;
    assert!(!ids(&body).contains(&problem.to_string()));
}

#[sqlx::test(migrations = "./migrations")]
async fn test_accept_unknown_complaint(pool: PgPool) {
    let mut tx = pool.begin().await.unwrap();
    let domain = create_test_domain(&mut tx).await;
    let authority = create_test_account(&mut tx, Role::Authority, "authpass", Some(domain)).await;
    tx.commit().await.unwrap();

    let (status, _) = send(
        &pool,
        "POST",
        &format!("/api/v1/authority/complaints/{}/accept", Uuid::new_v4()),
        Some(&authority.token()),
        None,
    )
    .await;

    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[sqlx::test(migrations = "./migrations")]
async fn test_public_domain_listing(pool: PgPool) {
    let mut tx = pool.begin().await.unwrap();
    let domain = create_test_domain(&mut tx).await;
    let other = create_test_domain(&mut tx).await;
    let student = create_test_account(&mut tx, Role::Student, "studentpass", None).await;
    let problem = create_test_problem(&mut tx, student.id, domain, "Broken door").await;
    create_test_problem(&mut tx, student.id, other, "Broken chair").await;
    tx.commit().await.unwrap();

    let (status, body) = send(
        &pool,
        "GET",
        &format!("/api/v1/problem/domain/{}/problems", domain),
        None,
        None,
    )
    .await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(ids(&body), vec![problem.to_string()]);
}

#[sqlx::test(migrations = "./migrations")]
async fn test_create_problem_stores_image_and_sets_domain(pool: PgPool) {
    let mut tx = pool.begin().await.unwrap();
    let domain = create_test_domain(&mut tx).await;
    let student = create_test_account(&mut tx, Role::Student, "studentpass", None).await;
    tx.commit().await.unwrap();

    let uploads = temp_upload_dir();
    let domain_id = domain.to_string();
    let (status, body) = send_multipart(
        setup_test_app_with_uploads(pool.clone(), &uploads).await,
        "POST",
        "/api/v1/problem/create",
        Some(&student.token()),
        &[
            ("title", "Broken projector"),
            ("description", "Room 204 projector does not turn on"),
            ("department", "CSE"),
            ("domain_id", domain_id.as_str()),
            ("priority", "high"),
        ],
        Some(FilePart {
            field: "image",
            file_name: "projector.png",
            content_type: "image/png",
            bytes: TINY_PNG,
        }),
    )
    .await;

    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(body["data"]["data"]["domain_id"], domain_id);
    assert_eq!(body["data"]["data"]["priority"], "high");
    assert_eq!(body["data"]["data"]["status"], "new");
    assert_eq!(stored_files(&uploads).len(), 1);

    let student_domain = sqlx::query_scalar::<_, Option<Uuid>>(
        "SELECT domain_id FROM students WHERE id = $1",
    )
    .bind(student.id)
    .fetch_one(&pool)
    .await
    .unwrap();
    assert_eq!(student_domain, Some(domain));
}

#[sqlx::test(migrations = "./migrations")]
async fn test_create_problem_unknown_domain_stores_nothing(pool: PgPool) {
    let mut tx = pool.begin().await.unwrap();
    let student = create_test_account(&mut tx, Role::Student, "studentpass", None).await;
    tx.commit().await.unwrap();

    let uploads = temp_upload_dir();
    let missing = Uuid::new_v4().to_string();
    let (status, body) = send_multipart(
        setup_test_app_with_uploads(pool.clone(), &uploads).await,
        "POST",
        "/api/v1/problem/create",
        Some(&student.token()),
        &[
            ("title", "Broken projector"),
            ("description", "Room 204"),
            ("department", "CSE"),
            ("domain_id", missing.as_str()),
        ],
        Some(FilePart {
            field: "image",
            file_name: "projector.png",
            content_type: "image/png",
            bytes: TINY_PNG,
        }),
    )
    .await;

    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body["message"], "Domain not found");
    assert!(stored_files(&uploads).is_empty());
}

#[sqlx::test(migrations = "./migrations")]
async fn test_create_problem_rejects_incomplete_forms(pool: PgPool) {
    let mut tx = pool.begin().await.unwrap();
    let domain = create_test_domain(&mut tx).await;
    let student = create_test_account(&mut tx, Role::Student, "studentpass", None).await;
    tx.commit().await.unwrap();

    let uploads = temp_upload_dir();
    let domain_id = domain.to_string();

    let (status, body) = send_multipart(
        setup_test_app_with_uploads(pool.clone(), &uploads).await,
        "POST",
        "/api/v1/problem/create",
        Some(&student.token()),
        &[("title", "Broken projector"), ("domain_id", domain_id.as_str())],
        Some(FilePart {
            field: "image",
            file_name: "projector.png",
            content_type: "image/png",
            bytes: TINY_PNG,
        }),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["message"], "All fields are required");

    let (status, body) = send_multipart(
        setup_test_app_with_uploads(pool.clone(), &uploads).await,
        "POST",
        "/api/v1/problem/create",
        Some(&student.token()),
        &[
            ("title", "Broken projector"),
            ("description", "Room 204"),
            ("department", "CSE"),
            ("domain_id", domain_id.as_str()),
        ],
        None,
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["message"], "Image is required");

    assert!(stored_files(&uploads).is_empty());
    let count = sqlx::query_scalar::<_, i64>("SELECT COUNT(*) FROM problems")
        .fetch_one(&pool)
        .await
        .unwrap();
    assert_eq!(count, 0);
}

#[sqlx::test(migrations = "./migrations")]
async fn test_only_acceptor_can_transfer(pool: PgPool) {
    let mut tx = pool.begin().await.unwrap();
    let domain = create_test_domain(&mut tx).await;
    let elsewhere = create_test_domain(&mut tx).await;
    let student = create_test_account(&mut tx, Role::Student, "studentpass", None).await;
    let acceptor = create_test_account(&mut tx, Role::Authority, "authpass", Some(domain)).await;
    let colleague = create_test_account(&mut tx, Role::Authority, "authpass", Some(domain)).await;
    let outsider = create_test_account(&mut tx, Role::Authority, "authpass", Some(elsewhere)).await;
    let problem = create_test_problem(&mut tx, student.id, domain, "Flooded corridor").await;
    tx.commit().await.unwrap();
    accept_as(&pool, problem, acceptor.id).await;

    let uri = format!("/api/v1/authority/complaints/{}/transfer", problem);

    let (status, body) = send(
        &pool,
        "POST",
        &uri,
        Some(&colleague.token()),
        Some(json!({ "authority_id": colleague.id })),
    )
    .await;
    assert_eq!(status, StatusCode::FORBIDDEN);
    assert_eq!(
        body["message"],
        "Only the accepting authority can transfer this complaint"
    );

    let (status, body) = send(
        &pool,
        "POST",
        &uri,
        Some(&acceptor.token()),
        Some(json!({ "authority_id": outsider.id })),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["message"], "Target authority is not in the same domain");

    let (status, _) = send(
        &pool,
        "POST",
        &uri,
        Some(&acceptor.token()),
        Some(json!({ "authority_id": Uuid::new_v4() })),
    )
    .await;
    assert_eq!(status, StatusCode::NOT_FOUND);

    let (status, body) = send(
        &pool,
        "POST",
        &uri,
        Some(&acceptor.token()),
        Some(json!({ "authority_id": colleague.id })),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"]["data"]["accepted_by"], colleague.id.to_string());
}

#[sqlx::test(migrations = "./migrations")]
async fn test_status_update_requires_acceptor_and_comment(pool: PgPool) {
    let mut tx = pool.begin().await.unwrap();
    let domain = create_test_domain(&mut tx).await;
    let student = create_test_account(&mut tx, Role::Student, "studentpass", None).await;
    let acceptor = create_test_account(&mut tx, Role::Authority, "authpass", Some(domain)).await;
    let colleague = create_test_account(&mut tx, Role::Authority, "authpass", Some(domain)).await;
    let problem = create_test_problem(&mut tx, student.id, domain, "Broken lift").await;
    tx.commit().await.unwrap();
    accept_as(&pool, problem, acceptor.id).await;

    let uri = format!("/api/v1/authority/complaints/{}/status", problem);
    let token = acceptor.token();

    let (status, body) = send(
        &pool,
        "PUT",
        &uri,
        Some(&token),
        Some(json!({ "status": "closed", "comment": "Done" })),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["message"], "Invalid status");

    let (status, body) = send(
        &pool,
        "PUT",
        &uri,
        Some(&token),
        Some(json!({ "status": "resolved" })),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["message"], "Comment is required");

    let (status, body) = send(
        &pool,
        "PUT",
        &uri,
        Some(&colleague.token()),
        Some(json!({ "status": "resolved", "comment": "Fixed it" })),
    )
    .await;
    assert_eq!(status, StatusCode::FORBIDDEN);
    assert_eq!(
        body["message"],
        "Only the accepting authority can update this complaint"
    );

    let comments_before = sqlx::query_scalar::<_, i64>(
        "SELECT COUNT(*) FROM problem_comments WHERE problem_id = $1",
    )
    .bind(problem)
    .fetch_one(&pool)
    .await
    .unwrap();
    assert_eq!(comments_before, 0);

    let (status, body) = send(
        &pool,
        "PUT",
        &uri,
        Some(&token),
        Some(json!({ "status": "resolved", "comment": "Lift repaired" })),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"]["data"]["status"], "resolved");
    assert_eq!(body["data"]["data"]["comments"][0]["text"], "Lift repaired");

    let (text, author) = sqlx::query_as::<_, (String, Option<Uuid>)>(
        "SELECT text, authority_id FROM problem_comments WHERE problem_id = $1",
    )
    .bind(problem)
    .fetch_one(&pool)
    .await
    .unwrap();
    assert_eq!(text, "Lift repaired");
    assert_eq!(author, Some(acceptor.id));
}

#[sqlx::test(migrations = "./migrations")]
async fn test_domain_with_complaints_cannot_be_deleted(pool: PgPool) {
    let mut tx = pool.begin().await.unwrap();
    let domain = create_test_domain(&mut tx).await;
    let empty = create_test_domain(&mut tx).await;
    let student = create_test_account(&mut tx, Role::Student, "studentpass", None).await;
    let member = create_test_account(&mut tx, Role::Authority, "authpass", Some(domain)).await;
    let empty_member = create_test_account(&mut tx, Role::Authority, "authpass", Some(empty)).await;
    create_test_problem(&mut tx, student.id, domain, "Cracked window").await;
    create_test_problem(&mut tx, student.id, domain, "Dripping tap").await;
    tx.commit().await.unwrap();

    let (status, body) = send(
        &pool,
        "DELETE",
        &format!("/api/v1/authority/domain/{}/delete", domain),
        Some(&member.token()),
        None,
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["message"], "Domain still has complaints");

    let remaining = sqlx::query_scalar::<_, i64>("SELECT COUNT(*) FROM problems WHERE domain_id = $1")
        .bind(domain)
        .fetch_one(&pool)
        .await
        .unwrap();
    assert_eq!(remaining, 2);

    let (status, _) = send(
        &pool,
        "DELETE",
        &format!("/api/v1/authority/domain/{}/delete", empty),
        Some(&empty_member.token()),
        None,
    )
    .await;
    assert_eq!(status, StatusCode::OK);

    let member_domain = sqlx::query_scalar::<_, Option<Uuid>>(
        "SELECT domain_id FROM authorities WHERE id = $1",
    )
    .bind(empty_member.id)
    .fetch_one(&pool)
    .await
    .unwrap();
    assert!(member_domain.is_none());
}
