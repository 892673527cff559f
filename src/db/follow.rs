use sqlx::SqlitePool;

use crate::error::{AppResult, DBError};

use super::UserId;

/// Get-or-create. Returns whether a new subscription was stored.
///
/// Self-follows are refused here; the `user_not_author` check constraint
/// rejects any that slip past.
pub async fn follow(pool: &SqlitePool, user_id: UserId, author_id: UserId) -> AppResult<bool> {
    if user_id == author_id {
        return Err(DBError::SelfFollow.into());
    }

    let inserted = sqlx::query(
        r#"
        INSERT INTO follows (user_id, author_id)
        VALUES (?1, ?2)
        ON CONFLICT (user_id, author_id) DO NOTHING
        "#,
    )
    .bind(user_id)
    .bind(author_id)
    .execute(pool)
    .await?;

    Ok(inserted.rows_affected() > 0)
}

pub async fn unfollow(pool: &SqlitePool, user_id: UserId, author_id: UserId) -> AppResult<bool> {
    let deleted = sqlx::query("DELETE FROM follows WHERE user_id = ?1 AND author_id = ?2")
        .bind(user_id)
        .bind(author_id)
        .execute(pool)
        .await?;

    Ok(deleted.rows_affected() > 0)
}

pub async fn is_following(pool: &SqlitePool, user_id: UserId, author_id: UserId) -> AppResult<bool> {
    let following = sqlx::query_scalar::<_, bool>(
        "SELECT EXISTS (SELECT 1 FROM follows WHERE user_id = ?1 AND author_id = ?2)",
    )
    .bind(user_id)
    .bind(author_id)
    .fetch_one(pool)
    .await?;

    Ok(following)
}
