pub mod auth;
pub mod comments;
pub mod follow;
pub mod posts;

use askama::Template;
use axum::response::Html;
use serde::Deserialize;
use validator::ValidationErrors;

use crate::error::{AppError, AppResult};

#[derive(Debug, Default, Deserialize)]
pub struct PageQuery {
    #[serde(default)]
    pub page: Option<String>,
}

pub fn render(template: impl Template) -> AppResult<Html<String>> {
    Ok(Html(template.render()?))
}

/// Numeric ids in paths; anything else is a missing page rather than a
/// bad request.
pub fn parse_id(raw: &str) -> AppResult<i64> {
    raw.parse::<i64>()
        .ok()
        .filter(|id| *id > 0)
        .ok_or_else(AppError::not_found)
}

/// Flattens validator output into display messages, in a stable order.
pub fn validation_messages(errors: &ValidationErrors) -> Vec<String> {
    let mut messages: Vec<String> = errors
        .field_errors()
        .into_iter()
        .flat_map(|(field, errs)| {
            errs.iter().map(move |err| match &err.message {
                Some(message) => message.to_string(),
                None => format!("{field}: invalid value"),
            })
        })
        .collect();
    messages.sort();
    messages
}
