use sqlx::{FromRow, SqlitePool};

use crate::error::{AppError, AppResult, DBError};

pub type GroupId = i64;

#[derive(Debug, Clone, PartialEq, FromRow)]
pub struct Group {
    pub id: GroupId,
    pub title: String,
    pub slug: String,
    pub description: String,
}

pub async fn create_group(
    pool: &SqlitePool,
    title: &str,
    slug: &str,
    description: &str,
) -> AppResult<Group> {
    let group = sqlx::query_as::<_, Group>(
        r#"
        INSERT INTO post_groups (title, slug, description)
        VALUES (?1, ?2, ?3)
        RETURNING id, title, slug, description
        "#,
    )
    .bind(title)
    .bind(slug)
    .bind(description)
    .fetch_one(pool)
    .await?;

    Ok(group)
}

pub async fn get_group_by_slug(pool: &SqlitePool, slug: &str) -> AppResult<Group> {
    let group = sqlx::query_as::<_, Group>(
        "SELECT id, title, slug, description FROM post_groups WHERE slug = ?1",
    )
    .bind(slug)
    .fetch_optional(pool)
    .await?;

    group.ok_or(AppError::DBError(DBError::NotFound))
}

pub async fn list_groups(pool: &SqlitePool) -> AppResult<Vec<Group>> {
    let groups = sqlx::query_as::<_, Group>(
        "SELECT id, title, slug, description FROM post_groups ORDER BY title",
    )
    .fetch_all(pool)
    .await?;

    Ok(groups)
}
