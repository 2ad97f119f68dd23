mod common;

use axum::http::StatusCode;
use campusdesk::campusdesk_auth::Role;
use common::{
    FilePart, TINY_PNG, create_test_account, create_test_event, create_test_forum_post,
    create_test_lost_item, send, send_multipart, setup_test_app_with_uploads, stored_files,
    temp_upload_dir,
};
use sqlx::PgPool;

#[sqlx::test(migrations = "./migrations")]
async fn test_vote_toggles_and_switches(pool: PgPool) {
    let mut tx = pool.begin().await.unwrap();
    let author = create_test_account(&mut tx, Role::Student, "studentpass", None).await;
    let voter = create_test_account(&mut tx, Role::Student, "studentpass", None).await;
    let post = create_test_forum_post(&mut tx, author.id).await;
    tx.commit().await.unwrap();

    let token = voter.token();
    let upvote = format!("/api/v1/student/forum/{}/upvote", post);
    let downvote = format!("/api/v1/student/forum/{}/downvote", post);

    let (status, body) = send(&pool, "PUT", &upvote, Some(&token), None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"]["data"]["outcome"], "added");
    assert_eq!(body["data"]["data"]["upvotes"], 1);

    let (_, body) = send(&pool, "PUT", &downvote, Some(&token), None).await;
    assert_eq!(body["data"]["data"]["outcome"], "switched");
    assert_eq!(body["data"]["data"]["upvotes"], 0);
    assert_eq!(body["data"]["data"]["downvotes"], 1);

    let (_, body) = send(&pool, "PUT", &downvote, Some(&token), None).await;
    assert_eq!(body["data"]["data"]["outcome"], "removed");
    assert_eq!(body["data"]["data"]["downvotes"], 0);

    let votes = sqlx::query_scalar::<_, i64>(
        "SELECT COUNT(*) FROM forum_post_votes WHERE post_id = $1",
    )
    .bind(post)
    .fetch_one(&pool)
    .await
    .unwrap();
    assert_eq!(votes, 0);
}

#[sqlx::test(migrations = "./migrations")]
async fn test_forum_reads_are_public(pool: PgPool) {
    let mut tx = pool.begin().await.unwrap();
    let author = create_test_account(&mut tx, Role::Student, "studentpass", None).await;
    let post = create_test_forum_post(&mut tx, author.id).await;
    tx.commit().await.unwrap();

    let (status, _) = send(&pool, "GET", "/api/v1/student/forum", None, None).await;
    assert_eq!(status, StatusCode::OK);

    let (status, _) = send(
        &pool,
        "GET",
        &format!("/api/v1/student/forum/{}", post),
        None,
        None,
    )
    .await;
    assert_eq!(status, StatusCode::OK);

    let (status, _) = send(
        &pool,
        "PUT",
        &format!("/api/v1/student/forum/{}/upvote", post),
        None,
        None,
    )
    .await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
}

#[sqlx::test(migrations = "./migrations")]
async fn test_item_can_only_be_claimed_once(pool: PgPool) {
    let mut tx = pool.begin().await.unwrap();
    let finder = create_test_account(&mut tx, Role::Student, "studentpass", None).await;
    let owner = create_test_account(&mut tx, Role::Student, "studentpass", None).await;
    let other = create_test_account(&mut tx, Role::Student, "studentpass", None).await;
    let item = create_test_lost_item(&mut tx, finder.id).await;
    tx.commit().await.unwrap();

    let uri = format!("/api/v1/student/lost-found/{}/claim", item);

    let (status, body) = send(&pool, "PUT", &uri, Some(&owner.token()), None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"]["data"]["status"], "claimed");
    assert_eq!(body["data"]["data"]["claimed_by"], owner.id.to_string());

    let (status, body) = send(&pool, "PUT", &uri, Some(&other.token()), None).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["message"], "Item is not available for claiming");

    let claimed_by = sqlx::query_scalar::<_, Option<uuid::Uuid>>(
        "SELECT claimed_by FROM lost_found_items WHERE id = $1",
    )
    .bind(item)
    .fetch_one(&pool)
    .await
    .unwrap();
    assert_eq!(claimed_by, Some(owner.id));
}

#[sqlx::test(migrations = "./migrations")]
async fn test_event_capacity_is_enforced(pool: PgPool) {
    let mut tx = pool.begin().await.unwrap();
    let faculty = create_test_account(&mut tx, Role::Faculty, "facultypass", None).await;
    let first = create_test_account(&mut tx, Role::Student, "studentpass", None).await;
    let second = create_test_account(&mut tx, Role::Student, "studentpass", None).await;
    let event = create_test_event(&mut tx, faculty.id, Some(1)).await;
    tx.commit().await.unwrap();

    let uri = format!("/api/v1/event/register/{}", event);

    let (status, _) = send(&pool, "POST", &uri, Some(&first.token()), None).await;
    assert_eq!(status, StatusCode::OK);

    let (status, body) = send(&pool, "POST", &uri, Some(&first.token()), None).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["message"], "Already registered");

    let (status, body) = send(&pool, "POST", &uri, Some(&second.token()), None).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["message"], "Event is full");

    // A freed seat can be taken
    let (status, _) = send(
        &pool,
        "POST",
        &format!("/api/v1/event/unregister/{}", event),
        Some(&first.token()),
        None,
    )
    .await;
    assert_eq!(status, StatusCode::OK);

    let (status, _) = send(&pool, "POST", &uri, Some(&second.token()), None).await;
    assert_eq!(status, StatusCode::OK);
}

#[sqlx::test(migrations = "./migrations")]
async fn test_cancelled_event_rejects_registration(pool: PgPool) {
    let mut tx = pool.begin().await.unwrap();
    let faculty = create_test_account(&mut tx, Role::Faculty, "facultypass", None).await;
    let student = create_test_account(&mut tx, Role::Student, "studentpass", None).await;
    let event = create_test_event(&mut tx, faculty.id, None).await;
    sqlx::query("UPDATE events SET status = 'cancelled' WHERE id = $1")
        .bind(event)
        .execute(&mut *tx)
        .await
        .unwrap();
    tx.commit().await.unwrap();

    let (status, body) = send(
        &pool,
        "POST",
        &format!("/api/v1/event/register/{}", event),
        Some(&student.token()),
        None,
    )
    .await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["message"], "Event is not open for registration");
}

#[sqlx::test(migrations = "./migrations")]
async fn test_event_update_accepts_form_with_image(pool: PgPool) {
    let mut tx = pool.begin().await.unwrap();
    let faculty = create_test_account(&mut tx, Role::Faculty, "facultypass", None).await;
    let event = create_test_event(&mut tx, faculty.id, Some(10)).await;
    tx.commit().await.unwrap();

    let uploads = temp_upload_dir();
    let (status, body) = send_multipart(
        setup_test_app_with_uploads(pool.clone(), &uploads).await,
        "PATCH",
        &format!("/api/v1/event/update/{}", event),
        Some(&faculty.token()),
        &[("title", "Rust workshop"), ("max_participants", "25")],
        Some(FilePart {
            field: "image",
            file_name: "poster.png",
            content_type: "image/png",
            bytes: TINY_PNG,
        }),
    )
    .await;

    assert_eq!(status, StatusCode::OK);
    let updated = &body["data"]["data"];
    assert_eq!(updated["title"], "Rust workshop");
    assert_eq!(updated["max_participants"], 25);
    assert_eq!(updated["location"], "Hall A");
    assert!(
        updated["image"]
            .as_str()
            .unwrap()
            .starts_with("http://localhost:8000/uploads/events/")
    );
    assert_eq!(stored_files(&uploads).len(), 1);
}

#[sqlx::test(migrations = "./migrations")]
async fn test_event_update_by_other_faculty_stores_nothing(pool: PgPool) {
    let mut tx = pool.begin().await.unwrap();
    let organizer = create_test_account(&mut tx, Role::Faculty, "facultypass", None).await;
    let other = create_test_account(&mut tx, Role::Faculty, "facultypass", None).await;
    let event = create_test_event(&mut tx, organizer.id, None).await;
    tx.commit().await.unwrap();

    let uploads = temp_upload_dir();
    let (status, _) = send_multipart(
        setup_test_app_with_uploads(pool.clone(), &uploads).await,
        "PATCH",
        &format!("/api/v1/event/update/{}", event),
        Some(&other.token()),
        &[("title", "Hijacked")],
        Some(FilePart {
            field: "image",
            file_name: "poster.png",
            content_type: "image/png",
            bytes: TINY_PNG,
        }),
    )
    .await;
    assert_eq!(status, StatusCode::FORBIDDEN);
    assert!(stored_files(&uploads).is_empty());

    let (status, body) = send_multipart(
        setup_test_app_with_uploads(pool.clone(), &uploads).await,
        "PATCH",
        &format!("/api/v1/event/update/{}", event),
        Some(&organizer.token()),
        &[("end_date", "2000-01-01T00:00:00Z")],
        None,
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["message"], "End date must be after start date");

    let title = sqlx::query_scalar::<_, String>("SELECT title FROM events WHERE id = $1")
        .bind(event)
        .fetch_one(&pool)
        .await
        .unwrap();
    assert_eq!(title, "Test event");
}
