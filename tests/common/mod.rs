use std::path::{Path, PathBuf};
use std::sync::Arc;

use axum::Router;
use axum::body::Body;
use axum::http::{Request, StatusCode};
use campusdesk::campusdesk_auth::{Role, create_access_token};
use campusdesk::campusdesk_config::JwtConfig;
use campusdesk::campusdesk_core::{LocalFileStorage, hash_password};
use campusdesk::router::init_router;
use campusdesk::state::AppState;
use http_body_util::BodyExt;
#[allow(unused_imports)]
use sqlx::{PgPool, Postgres, Transaction};
use tower::ServiceExt;
use uuid::Uuid;

#[allow(dead_code)]
pub struct TestAccount {
    pub id: Uuid,
    pub name: String,
    pub email: String,
    pub password: String,
    pub role: Role,
    pub domain_id: Option<Uuid>,
}

impl TestAccount {
    /// Signs a token the same way the login routes do.
    #[allow(dead_code)]
    pub fn token(&self) -> String {
        create_access_token(
            self.id,
            &self.name,
            &self.email,
            self.role,
            self.domain_id,
            &JwtConfig::from_env(),
        )
        .unwrap()
    }
}

pub fn generate_unique_email() -> String {
    format!("test-{}@test.com", Uuid::new_v4())
}

#[allow(dead_code)]
pub fn generate_unique_name(prefix: &str) -> String {
    format!("{} {}", prefix, Uuid::new_v4())
}

pub async fn setup_test_app(pool: PgPool) -> Router {
    dotenvy::dotenv().ok();
    init_router(AppState::from_pool(pool))
}

/// Inserts into the account table for `role`. Authorities get `domain_id`.
pub async fn create_test_account(
    tx: &mut Transaction<'_, Postgres>,
    role: Role,
    password: &str,
    domain_id: Option<Uuid>,
) -> TestAccount {
    let hashed = hash_password(password).unwrap();
    let email = generate_unique_email();
    let name = generate_unique_name(role.as_str());

    let id = match role {
        Role::Admin => sqlx::query_scalar::<_, Uuid>(
            "INSERT INTO admins (name, email, password) VALUES ($1, $2, $3) RETURNING id",
        )
        .bind(&name)
        .bind(&email)
        .bind(&hashed)
        .fetch_one(&mut **tx)
        .await
        .unwrap(),
        Role::Faculty => sqlx::query_scalar::<_, Uuid>(
            "INSERT INTO faculty (name, email, password) VALUES ($1, $2, $3) RETURNING id",
        )
        .bind(&name)
        .bind(&email)
        .bind(&hashed)
        .fetch_one(&mut **tx)
        .await
        .unwrap(),
        Role::Student => sqlx::query_scalar::<_, Uuid>(
            "INSERT INTO students (name, email, password) VALUES ($1, $2, $3) RETURNING id",
        )
        .bind(&name)
        .bind(&email)
        .bind(&hashed)
        .fetch_one(&mut **tx)
        .await
        .unwrap(),
        Role::Authority => sqlx::query_scalar::<_, Uuid>(
            "INSERT INTO authorities (name, email, password, domain_id) VALUES ($1, $2, $3, $4) RETURNING id",
        )
        .bind(&name)
        .bind(&email)
        .bind(&hashed)
        .bind(domain_id)
        .fetch_one(&mut **tx)
        .await
        .unwrap(),
    };

    TestAccount {
        id,
        name,
        email,
        password: password.to_string(),
        role,
        domain_id: if role == Role::Authority { domain_id } else { None },
    }
}

#[allow(dead_code)]
pub async fn create_test_domain(tx: &mut Transaction<'_, Postgres>) -> Uuid {
    sqlx::query_scalar::<_, Uuid>(
        "INSERT INTO authority_domains (name, description) VALUES ($1, $2) RETURNING id",
    )
    .bind(generate_unique_name("Domain"))
    .bind("Test domain")
    .fetch_one(&mut **tx)
    .await
    .unwrap()
}

#[allow(dead_code)]
pub async fn create_test_problem(
    tx: &mut Transaction<'_, Postgres>,
    student_id: Uuid,
    domain_id: Uuid,
    title: &str,
) -> Uuid {
    sqlx::query_scalar::<_, Uuid>(
        r#"
        INSERT INTO problems (title, description, image, department, domain_id, student_id)
        VALUES ($1, 'Test description', 'https://img.test/p.png', 'CSE', $2, $3)
        RETURNING id
        "#,
    )
    .bind(title)
    .bind(domain_id)
    .bind(student_id)
    .fetch_one(&mut **tx)
    .await
    .unwrap()
}

#[allow(dead_code)]
pub async fn create_test_event(
    tx: &mut Transaction<'_, Postgres>,
    faculty_id: Uuid,
    max_participants: Option<i32>,
) -> Uuid {
    sqlx::query_scalar::<_, Uuid>(
        r#"
        INSERT INTO events
            (title, description, event_type, faculty_id, organizer_type,
             start_date, end_date, location, max_participants)
        VALUES ('Test event', 'Test description', 'workshop', $1, 'faculty',
                NOW() + INTERVAL '1 day', NOW() + INTERVAL '2 days', 'Hall A', $2)
        RETURNING id
        "#,
    )
    .bind(faculty_id)
    .bind(max_participants)
    .fetch_one(&mut **tx)
    .await
    .unwrap()
}

#[allow(dead_code)]
pub async fn create_test_forum_post(tx: &mut Transaction<'_, Postgres>, author_id: Uuid) -> Uuid {
    sqlx::query_scalar::<_, Uuid>(
        r#"
        INSERT INTO forum_posts (title, content, category, author_id)
        VALUES ('Test post', 'Test content', 'General', $1)
        RETURNING id
        "#,
    )
    .bind(author_id)
    .fetch_one(&mut **tx)
    .await
    .unwrap()
}

#[allow(dead_code)]
pub async fn create_test_lost_item(tx: &mut Transaction<'_, Postgres>, student_id: Uuid) -> Uuid {
    sqlx::query_scalar::<_, Uuid>(
        r#"
        INSERT INTO lost_found_items (title, description, category, item_type, location, student_id)
        VALUES ('Blue umbrella', 'Left in the library', 'found', 'accessory', 'Library', $1)
        RETURNING id
        "#,
    )
    .bind(student_id)
    .fetch_one(&mut **tx)
    .await
    .unwrap()
}

/// Sends one request through a fresh router and returns the status and JSON body.
#[allow(dead_code)]
pub async fn send(
    pool: &PgPool,
    method: &str,
    uri: &str,
    token: Option<&str>,
    body: Option<serde_json::Value>,
) -> (StatusCode, serde_json::Value) {
    let app = setup_test_app(pool.clone()).await;

    let mut builder = Request::builder().method(method).uri(uri);
    if let Some(token) = token {
        builder = builder.header("authorization", format!("Bearer {}", token));
    }
    let request = match body {
        Some(body) => builder
            .header("content-type", "application/json")
            .body(Body::from(serde_json::to_string(&body).unwrap()))
            .unwrap(),
        None => builder.body(Body::empty()).unwrap(),
    };

    let response = app.oneshot(request).await.unwrap();
    let status = response.status();
    let bytes = response.into_body().collect().await.unwrap().to_bytes();
    let json = if bytes.is_empty() {
        serde_json::Value::Null
    } else {
        serde_json::from_slice(&bytes).unwrap_or(serde_json::Value::Null)
    };
    (status, json)
}

/// A router whose uploads land in `upload_dir` on the local disk.
#[allow(dead_code)]
pub async fn setup_test_app_with_uploads(pool: PgPool, upload_dir: &Path) -> Router {
    dotenvy::dotenv().ok();
    let mut state = AppState::from_pool(pool);
    state.storage = Arc::new(LocalFileStorage::new(
        upload_dir.to_path_buf(),
        "http://localhost:8000/uploads".to_string(),
    ));
    init_router(state)
}

/// A fresh, empty upload directory for one test.
#[allow(dead_code)]
pub fn temp_upload_dir() -> PathBuf {
    let dir = std::env::temp_dir().join(format!("campusdesk-uploads-{}", Uuid::new_v4()));
    std::fs::create_dir_all(&dir).unwrap();
    dir
}

/// Every file stored below `dir`, at any depth.
#[allow(dead_code)]
pub fn stored_files(dir: &Path) -> Vec<PathBuf> {
    let mut files = Vec::new();
    let mut pending = vec![dir.to_path_buf()];
    while let Some(current) = pending.pop() {
        for entry in std::fs::read_dir(&current).unwrap() {
            let path = entry.unwrap().path();
            if path.is_dir() {
                pending.push(path);
            } else {
                files.push(path);
            }
        }
    }
    files
}

/// One file part of a multipart body.
#[allow(dead_code)]
pub struct FilePart<'a> {
    pub field: &'a str,
    pub file_name: &'a str,
    pub content_type: &'a str,
    pub bytes: &'a [u8],
}

/// A 1x1 PNG.
#[allow(dead_code)]
pub const TINY_PNG: &[u8] = &[
    0x89, 0x50, 0x4E, 0x47, 0x0D, 0x0A, 0x1A, 0x0A, 0x00, 0x00, 0x00, 0x0D, 0x49, 0x48, 0x44,
    0x52, 0x00, 0x00, 0x00, 0x01, 0x00, 0x00, 0x00, 0x01, 0x08, 0x06, 0x00, 0x00, 0x00, 0x1F,
    0x15, 0xC4, 0x89, 0x00, 0x00, 0x00, 0x0D, 0x49, 0x44, 0x41, 0x54, 0x78, 0x9C, 0x63, 0x00,
    0x01, 0x00, 0x00, 0x05, 0x00, 0x01, 0x0D, 0x0A, 0x2D, 0xB4, 0x00, 0x00, 0x00, 0x00, 0x49,
    0x45, 0x4E, 0x44, 0xAE, 0x42, 0x60, 0x82,
];

/// Sends a `multipart/form-data` request through `app`.
#[allow(dead_code)]
pub async fn send_multipart(
    app: Router,
    method: &str,
    uri: &str,
    token: Option<&str>,
    fields: &[(&str, &str)],
    file: Option<FilePart<'_>>,
) -> (StatusCode, serde_json::Value) {
    let boundary = format!("campusdesk-{}", Uuid::new_v4().simple());
    let mut body: Vec<u8> = Vec::new();

    for (name, value) in fields {
        body.extend_from_slice(
            format!(
                "--{}\r\nContent-Disposition: form-data; name=\"{}\"\r\n\r\n{}\r\n",
                boundary, name, value
            )
            .as_bytes(),
        );
    }
    if let Some(file) = file {
        body.extend_from_slice(
            format!(
                "--{}\r\nContent-Disposition: form-data; name=\"{}\"; filename=\"{}\"\r\nContent-Type: {}\r\n\r\n",
                boundary, file.field, file.file_name, file.content_type
            )
            .as_bytes(),
        );
        body.extend_from_slice(file.bytes);
        body.extend_from_slice(b"\r\n");
    }
    body.extend_from_slice(format!("--{}--\r\n", boundary).as_bytes());

    let mut builder = Request::builder()
        .method(method)
        .uri(uri)
        .header(
            "content-type",
            format!("multipart/form-data; boundary={}", boundary),
        );
    if let Some(token) = token {
        builder = builder.header("authorization", format!("Bearer {}", token));
    }

    let response = app
        .oneshot(builder.body(Body::from(body)).unwrap())
        .await
        .unwrap();
    let status = response.status();
    let bytes = response.into_body().collect().await.unwrap().to_bytes();
    let json = serde_json::from_slice(&bytes).unwrap_or(serde_json::Value::Null);
    (status, json)
}
