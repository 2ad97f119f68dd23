use anyhow::anyhow;
use campusdesk_core::AppError;
use sqlx::{PgPool, Postgres, Transaction};
use tracing::{info, instrument, warn};
use uuid::Uuid;

use super::model::{
    CreateForumPostDto, ForumComment, ForumFilter, ForumPost, ForumPostDetail, VoteKind,
    VoteOutcome, VoteResult,
};

const POST_SELECT: &str = r#"
    SELECT p.id, p.title, p.content, p.category, p.author_id,
           s.name AS author_name, s.email AS author_email, p.flagged,
           (SELECT COUNT(*) FROM forum_post_votes v WHERE v.post_id = p.id AND v.vote = 'up') AS upvotes,
           (SELECT COUNT(*) FROM forum_post_votes v WHERE v.post_id = p.id AND v.vote = 'down') AS downvotes,
           (SELECT COUNT(*) FROM forum_comments c WHERE c.post_id = p.id) AS comment_count,
           p.created_at, p.updated_at
    FROM forum_posts p
    JOIN students s ON s.id = p.author_id
"#;

fn post_not_found() -> AppError {
    AppError::not_found(anyhow!("Post not found"))
}

/// Same direction again removes the vote; the other direction switches it.
pub fn vote_transition(existing: Option<VoteKind>, requested: VoteKind) -> VoteOutcome {
    match existing {
        None => VoteOutcome::Added,
        Some(current) if current == requested => VoteOutcome::Removed,
        Some(_) => VoteOutcome::Switched,
    }
}

pub struct ForumService;

impl ForumService {
    #[instrument(skip(db, dto), fields(db.operation = "INSERT", db.table = "forum_posts"))]
    pub async fn create_post(
        db: &PgPool,
        author_id: Uuid,
        dto: CreateForumPostDto,
    ) -> Result<ForumPost, AppError> {
        let id = sqlx::query_scalar::<_, Uuid>(
            r#"
            INSERT INTO forum_posts (title, content, category, author_id)
            VALUES ($1, $2, $3, $4)
            RETURNING id
            "#,
        )
        .bind(dto.title.trim())
        .bind(dto.content.trim())
        .bind(dto.category)
        .bind(author_id)
        .fetch_one(db)
        .await?;

        info!(post.id = %id, "Forum post created");
        Self::get_post(db, id).await
    }

    #[instrument(skip(db))]
    pub async fn get_post(db: &PgPool, post_id: Uuid) -> Result<ForumPost, AppError> {
        sqlx::query_as::<_, ForumPost>(&format!("{POST_SELECT} WHERE p.id = $1"))
            .bind(post_id)
            .fetch_optional(db)
            .await?
            .ok_or_else(post_not_found)
    }

    /// Unflagged posts, newest first. `search` matches title or content.
    #[instrument(skip(db))]
    pub async fn list_posts(db: &PgPool, filter: ForumFilter) -> Result<Vec<ForumPost>, AppError> {
        let search = filter.search.map(|term| format!("%{}%", term.trim()));
        let posts = sqlx::query_as::<_, ForumPost>(&format!(
            r#"{POST_SELECT}
            WHERE p.flagged = FALSE
              AND ($1::forum_category IS NULL OR p.category = $1)
              AND ($2::text IS NULL OR p.title ILIKE $2 OR p.content ILIKE $2)
            ORDER BY p.created_at DESC"#
        ))
        .bind(filter.category)
        .bind(search)
        .fetch_all(db)
        .await?;
        Ok(posts)
    }

    #[instrument(skip(db))]
    pub async fn get_post_detail(db: &PgPool, post_id: Uuid) -> Result<ForumPostDetail, AppError> {
        let post = Self::get_post(db, post_id).await?;
        let comments = sqlx::query_as::<_, ForumComment>(
            r#"
            SELECT c.id, c.post_id, c.author_id, s.name AS author_name,
                   c.content, c.flagged, c.created_at
            FROM forum_comments c
            JOIN students s ON s.id = c.author_id
            WHERE c.post_id = $1
            ORDER BY c.created_at
            "#,
        )
        .bind(post_id)
        .fetch_all(db)
        .await?;
        Ok(ForumPostDetail { post, comments })
    }

    #[instrument(skip(db), fields(db.operation = "DELETE", db.table = "forum_posts"))]
    pub async fn delete_post(db: &PgPool, post_id: Uuid, student_id: Uuid) -> Result<(), AppError> {
        let author = sqlx::query_scalar::<_, Uuid>("SELECT author_id FROM forum_posts WHERE id = $1")
            .bind(post_id)
            .fetch_optional(db)
            .await?
            .ok_or_else(post_not_found)?;

        if author != student_id {
            warn!(post.id = %post_id, student.id = %student_id, "Forum delete by non-author");
            return Err(AppError::forbidden("Forbidden"));
        }

        sqlx::query("DELETE FROM forum_posts WHERE id = $1")
            .bind(post_id)
            .execute(db)
            .await?;

        info!(post.id = %post_id, "Forum post deleted");
        Ok(())
    }

    /// Applies a vote inside one transaction with the voter's row locked.
    #[instrument(skip(db), fields(db.operation = "UPSERT", db.table = "forum_post_votes"))]
    pub async fn vote(
        db: &PgPool,
        post_id: Uuid,
        student_id: Uuid,
        requested: VoteKind,
    ) -> Result<VoteResult, AppError> {
        let mut tx: Transaction<'_, Postgres> = db.begin().await?;

        let post_exists = sqlx::query_scalar::<_, bool>(
            "SELECT EXISTS(SELECT 1 FROM forum_posts WHERE id = $1)",
        )
        .bind(post_id)
        .fetch_one(&mut *tx)
        .await?;
        if !post_exists {
            return Err(post_not_found());
        }

        let existing = sqlx::query_scalar::<_, VoteKind>(
            "SELECT vote FROM forum_post_votes WHERE post_id = $1 AND student_id = $2 FOR UPDATE",
        )
        .bind(post_id)
        .bind(student_id)
        .fetch_optional(&mut *tx)
        .await?;

        let outcome = vote_transition(existing, requested);
        match outcome {
            VoteOutcome::Removed => {
                sqlx::query("DELETE FROM forum_post_votes WHERE post_id = $1 AND student_id = $2")
                    .bind(post_id)
                    .bind(student_id)
                    .execute(&mut *tx)
                    .await?;
            }
            VoteOutcome::Added | VoteOutcome::Switched => {
                sqlx::query(
                    r#"
                    INSERT INTO forum_post_votes (post_id, student_id, vote)
                    VALUES ($1, $2, $3)
                    ON CONFLICT (post_id, student_id) DO UPDATE SET vote = EXCLUDED.vote
                    "#,
                )
                .bind(post_id)
                .bind(student_id)
                .bind(requested)
                .execute(&mut *tx)
                .await?;
            }
        }

        let (upvotes, downvotes) = sqlx::query_as::<_, (i64, i64)>(
            r#"
            SELECT COUNT(*) FILTER (WHERE vote = 'up'),
                   COUNT(*) FILTER (WHERE vote = 'down')
            FROM forum_post_votes
            WHERE post_id = $1
            "#,
        )
        .bind(post_id)
        .fetch_one(&mut *tx)
        .await?;

        tx.commit().await?;

        Ok(VoteResult {
            outcome,
            upvotes,
            downvotes,
        })
    }

    #[instrument(skip(db, content), fields(db.operation = "INSERT", db.table = "forum_comments"))]
    pub async fn add_comment(
        db: &PgPool,
        post_id: Uuid,
        author_id: Uuid,
        content: &str,
    ) -> Result<ForumComment, AppError> {
        sqlx::query_as::<_, ForumComment>(
            r#"
            WITH inserted AS (
                INSERT INTO forum_comments (post_id, author_id, content)
                VALUES ($1, $2, $3)
                RETURNING *
            )
            SELECT c.id, c.post_id, c.author_id, s.name AS author_name,
                   c.content, c.flagged, c.created_at
            FROM inserted c
            JOIN students s ON s.id = c.author_id
            "#,
        )
        .bind(post_id)
        .bind(author_id)
        .bind(content.trim())
        .fetch_one(db)
        .await
        .map_err(|e| {
            if let sqlx::Error::Database(db_err) = &e
                && db_err.is_foreign_key_violation()
            {
                return post_not_found();
            }
            AppError::from(e)
        })
    }

    /// Hides the post from listings and records why.
    #[instrument(skip(db, reason))]
    pub async fn flag_post(db: &PgPool, post_id: Uuid, reason: &str) -> Result<ForumPost, AppError> {
        let result = sqlx::query(
            r#"
            UPDATE forum_posts
            SET flagged = TRUE, flag_reasons = array_append(flag_reasons, $2), updated_at = NOW()
            WHERE id = $1
            "#,
        )
        .bind(post_id)
        .bind(reason)
        .execute(db)
        .await?;

        if result.rows_affected() == 0 {
            return Err(post_not_found());
        }

        warn!(post.id = %post_id, "Forum post flagged");
        Self::get_post(db, post_id).await
    }
}
