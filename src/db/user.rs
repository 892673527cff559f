use chrono::{DateTime, Utc};
use sqlx::{FromRow, SqlitePool};

use crate::error::{AppError, AppResult, DBError};

pub type UserId = i64;

#[derive(Debug, Clone, PartialEq, FromRow)]
pub struct User {
    pub id: UserId,
    pub username: String,
    pub email: String,
    pub created_at: DateTime<Utc>,
}

/// Credentials row, only loaded for sign-in.
#[derive(Debug, FromRow)]
pub struct UserAuth {
    pub id: UserId,
    pub username: String,
    pub hash: String,
}

pub async fn create_user(
    pool: &SqlitePool,
    username: &str,
    email: &str,
    hash: &str,
) -> AppResult<User> {
    let user = sqlx::query_as::<_, User>(
        r#"
        INSERT INTO users (username, email, hash, created_at)
        VALUES (?1, ?2, ?3, ?4)
        RETURNING id, username, email, created_at
        "#,
    )
    .bind(username)
    .bind(email)
    .bind(hash)
    .bind(Utc::now())
    .fetch_one(pool)
    .await;

    match user {
        Ok(user) => Ok(user),
        Err(sqlx::Error::Database(err)) if err.is_unique_violation() => {
            Err(DBError::AlreadyRegistered.into())
        }
        Err(err) => Err(err.into()),
    }
}

pub async fn find_user(pool: &SqlitePool, user_id: UserId) -> AppResult<Option<User>> {
    let user = sqlx::query_as::<_, User>(
        "SELECT id, username, email, created_at FROM users WHERE id = ?1",
    )
    .bind(user_id)
    .fetch_optional(pool)
    .await?;

    Ok(user)
}

pub async fn find_user_by_username(pool: &SqlitePool, username: &str) -> AppResult<Option<User>> {
    let user = sqlx::query_as::<_, User>(
        "SELECT id, username, email, created_at FROM users WHERE username = ?1",
    )
    .bind(username)
    .fetch_optional(pool)
    .await?;

    Ok(user)
}

pub async fn get_user_by_username(pool: &SqlitePool, username: &str) -> AppResult<User> {
    find_user_by_username(pool, username)
        .await?
        .ok_or(AppError::DBError(DBError::NotFound))
}

pub async fn find_user_auth(pool: &SqlitePool, username: &str) -> AppResult<Option<UserAuth>> {
    let user = sqlx::query_as::<_, UserAuth>(
        "SELECT id, username, hash FROM users WHERE username = ?1",
    )
    .bind(username)
    .fetch_optional(pool)
    .await?;

    Ok(user)
}
