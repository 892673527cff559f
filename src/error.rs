use askama::Template;
use axum::{
    extract::{multipart::MultipartError, Request, State},
    http::StatusCode,
    middleware::Next,
    response::{Html, IntoResponse, Response},
};

use crate::{
    templates::NotFoundTemplate,
    utils::{auth, redirect},
    AppState,
};

pub type AppResult<T> = std::result::Result<T, AppError>;

const SERVER_ERROR_PAGE: &str =
    "<!doctype html><title>Server error</title><h1>Server error</h1><p>Something went wrong.</p>";

#[derive(thiserror::Error, Debug)]
pub enum DBError {
    #[error("A user with that username already exists")]
    AlreadyRegistered,

    #[error("Not Found")]
    NotFound,

    #[error("Users can't follow themselves")]
    SelfFollow,
}

#[derive(thiserror::Error, Debug)]
pub enum AppError {
    #[error("Any error: {0:?}")]
    Anyhow(#[from] anyhow::Error),

    #[error("DB Error: {0:?}")]
    DBError(#[from] DBError),

    #[error("Login required for {next}")]
    LoginRequired { next: String },

    #[error("Redirect to {0}")]
    Redirect(String),

    #[error("SQL failed: {0:?}")]
    Sqlx(#[from] sqlx::Error),

    #[error("Migration failed: {0:?}")]
    Migrate(#[from] sqlx::migrate::MigrateError),

    #[error("JWT error: {0:?}")]
    JwtError(#[from] jsonwebtoken::errors::Error),

    #[error("Template error: {0:?}")]
    Template(#[from] askama::Error),

    #[error("Invalid upload: {0:?}")]
    Multipart(#[from] MultipartError),

    #[error("IO error: {0:?}")]
    Io(#[from] std::io::Error),
}

impl AppError {
    pub fn not_found() -> Self {
        AppError::DBError(DBError::NotFound)
    }
}

/// Marks a 404 produced by the application, as opposed to a missing
/// static or media file.
#[derive(Clone, Copy, Debug)]
pub struct MissingPage;

/// Renders the 404 page; `path` is shown to the visitor when known.
pub fn not_found_page(path: &str, current_user: Option<String>) -> Response {
    let page = NotFoundTemplate {
        current_user,
        path: path.to_string(),
    };

    match page.render() {
        Ok(body) => (StatusCode::NOT_FOUND, Html(body)).into_response(),
        Err(err) => {
            tracing::error!(error = ?err, "failed to render 404 page");
            (StatusCode::NOT_FOUND, "Not Found").into_response()
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        match self {
            AppError::LoginRequired { next } => redirect::found(&redirect::login_url(&next)),
            AppError::Redirect(to) => redirect::found(&to),
            AppError::DBError(DBError::NotFound) => {
                let mut response = not_found_page("", None);
                response.extensions_mut().insert(MissingPage);
                response
            }
            AppError::Multipart(err) => {
                tracing::warn!(error = ?err, "rejected multipart body");
                (err.status(), err.body_text()).into_response()
            }
            other => {
                tracing::error!(error = ?other, "request failed");
                (StatusCode::INTERNAL_SERVER_ERROR, Html(SERVER_ERROR_PAGE)).into_response()
            }
        }
    }
}

/// Re-renders application 404s with the requested path and the visitor's
/// navigation, which the error itself does not carry.
pub async fn render_missing_page(
    State(state): State<AppState>,
    request: Request,
    next: Next,
) -> Response {
    let path = request.uri().path().to_string();
    let headers = request.headers().clone();

    let response = next.run(request).await;
    if response.extensions().get::<MissingPage>().is_none() {
        return response;
    }

    let current_user = match auth::session_user(&headers, &state.pool, &state.decoding_key).await {
        Ok(user) => user.map(|user| user.username),
        Err(err) => {
            tracing::warn!(error = ?err, "could not resolve visitor for 404 page");
            None
        }
    };
    not_found_page(&path, current_user)
}
