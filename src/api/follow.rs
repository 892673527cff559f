use axum::{
    extract::{Path, Query, State},
    response::{Html, Response},
};
use sqlx::SqlitePool;

use crate::{
    api::{render, PageQuery},
    db::{self, PostFilter},
    error::AppResult,
    templates::FollowTemplate,
    utils::{auth::AuthUser, redirect},
};

// GET /follow/
pub async fn follow_index(
    State(pool): State<SqlitePool>,
    AuthUser(user): AuthUser,
    Query(query): Query<PageQuery>,
) -> AppResult<Html<String>> {
    let page = db::paginate_posts(&pool, PostFilter::FollowedBy(user.id), query.page.as_deref()).await?;

    render(FollowTemplate {
        current_user: Some(user.username),
        page,
    })
}

// POST /profile/:username/follow/
pub async fn profile_follow(
    State(pool): State<SqlitePool>,
    AuthUser(user): AuthUser,
    Path(username): Path<String>,
) -> AppResult<Response> {
    let author = db::get_user_by_username(&pool, &username).await?;

    if author.id == user.id {
        tracing::debug!(user = %user.username, "ignoring self-follow");
    } else if db::follow(&pool, user.id, author.id).await? {
        tracing::info!(user = %user.username, author = %author.username, "followed author");
    }

    Ok(redirect::found(&redirect::profile_url(&author.username)))
}

// POST /profile/:username/unfollow/
pub async fn profile_unfollow(
    State(pool): State<SqlitePool>,
    AuthUser(user): AuthUser,
    Path(username): Path<String>,
) -> AppResult<Response> {
    let author = db::get_user_by_username(&pool, &username).await?;

    if db::unfollow(&pool, user.id, author.id).await? {
        tracing::info!(user = %user.username, author = %author.username, "unfollowed author");
    }

    Ok(redirect::found(&redirect::profile_url(&author.username)))
}
