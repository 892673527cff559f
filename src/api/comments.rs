use axum::{
    extract::{Path, State},
    response::Response,
    Form,
};
use serde::Deserialize;
use sqlx::SqlitePool;
use validator::Validate;

use crate::{
    api::{parse_id, validation_messages},
    db,
    error::AppResult,
    utils::{auth::AuthUser, redirect},
};

#[derive(Debug, Deserialize, Validate)]
pub struct AddComment {
    #[serde(default)]
    #[validate(length(min = 1, message = "Comment text is required."))]
    text: String,
}

// POST /posts/:post_id/comment/
pub async fn add_comment(
    State(pool): State<SqlitePool>,
    AuthUser(user): AuthUser,
    Path(post_id): Path<String>,
    Form(comment): Form<AddComment>,
) -> AppResult<Response> {
    let post = db::get_post(&pool, parse_id(&post_id)?).await?;

    let comment = AddComment {
        text: comment.text.trim().to_string(),
    };

    match comment.validate() {
        Ok(()) => {
            let comment_id = db::create_comment(&pool, post.id, user.id, &comment.text).await?;
            tracing::info!(comment_id, post_id = post.id, author = %user.username, "comment added");
        }
        Err(errors) => {
            tracing::debug!(post_id = post.id, errors = ?validation_messages(&errors), "comment rejected");
        }
    }

    Ok(redirect::found(&redirect::post_url(post.id)))
}
