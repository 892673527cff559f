use chrono::{DateTime, Utc};
use sqlx::{FromRow, SqlitePool};

use crate::error::AppResult;

use super::{PostId, UserId};

pub type CommentId = i64;

#[derive(Debug, Clone, PartialEq, FromRow)]
pub struct Comment {
    pub id: CommentId,
    pub post_id: PostId,
    pub author_id: UserId,
    pub author_username: String,
    pub text: String,
    pub created: DateTime<Utc>,
}

pub async fn create_comment(
    pool: &SqlitePool,
    post_id: PostId,
    author_id: UserId,
    text: &str,
) -> AppResult<CommentId> {
    let comment_id = sqlx::query_scalar::<_, CommentId>(
        r#"
        INSERT INTO comments (post_id, author_id, text, created)
        VALUES (?1, ?2, ?3, ?4)
        RETURNING id
        "#,
    )
    .bind(post_id)
    .bind(author_id)
    .bind(text)
    .bind(Utc::now())
    .fetch_one(pool)
    .await?;

    Ok(comment_id)
}

/// Oldest first, so a thread reads top to bottom.
pub async fn list_comments(pool: &SqlitePool, post_id: PostId) -> AppResult<Vec<Comment>> {
    let comments = sqlx::query_as::<_, Comment>(
        r#"
        SELECT
            comments.id,
            comments.post_id,
            comments.author_id,
            users.username AS author_username,
            comments.text,
            comments.created
        FROM comments
        INNER JOIN users ON users.id = comments.author_id
        WHERE comments.post_id = ?1
        ORDER BY comments.created, comments.id
        "#,
    )
    .bind(post_id)
    .fetch_all(pool)
    .await?;

    Ok(comments)
}

pub async fn count_comments(pool: &SqlitePool) -> AppResult<i64> {
    let count = sqlx::query_scalar::<_, i64>("SELECT COUNT(*) FROM comments")
        .fetch_one(pool)
        .await?;

    Ok(count)
}
