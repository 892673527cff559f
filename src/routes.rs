use axum::{
    extract::DefaultBodyLimit,
    middleware,
    routing::{get, post},
    Router,
};
use tower_http::{compression::CompressionLayer, services::ServeDir, trace::TraceLayer};

use crate::{
    api,
    error::{self, AppError},
    AppState,
};

/// Uploaded images can be larger than the default 2 MB body limit.
const MAX_UPLOAD_BYTES: usize = 10 * 1024 * 1024;

pub fn generate_routes(state: AppState) -> Router {
    let media = ServeDir::new(&state.config.media.root);
    let assets = ServeDir::new(&state.config.media.static_root);

    Router::new()
        // ==== POSTS ==== //
        .route("/", get(api::posts::index))
        .route("/group/:slug/", get(api::posts::group_posts))
        .route("/profile/:username/", get(api::posts::profile))
        .route("/posts/:post_id/", get(api::posts::post_detail))
        .route(
            "/posts/:post_id/edit/",
            get(api::posts::post_edit_form).post(api::posts::post_edit),
        )
        .route(
            "/create/",
            get(api::posts::post_create_form).post(api::posts::post_create),
        )
        // ==== COMMENTS ==== //
        .route("/posts/:post_id/comment/", post(api::comments::add_comment))
        // ==== FOLLOW ==== //
        .route("/follow/", get(api::follow::follow_index))
        .route("/profile/:username/follow/", post(api::follow::profile_follow))
        .route("/profile/:username/follow", post(api::follow::profile_follow))
        .route("/profile/:username/unfollow/", post(api::follow::profile_unfollow))
        .route("/profile/:username/unfollow", post(api::follow::profile_unfollow))
        // ==== USERS ==== //
        .route(
            "/auth/signup/",
            get(api::auth::signup_form).post(api::auth::signup),
        )
        .route(
            "/auth/login/",
            get(api::auth::login_form).post(api::auth::login),
        )
        .route("/auth/logout/", get(api::auth::logout))
        // ==== FILES ==== //
        .nest_service("/media", media)
        .nest_service("/static", assets)
        .fallback(handler_404)
        .layer(middleware::from_fn_with_state(
            state.clone(),
            error::render_missing_page,
        ))
        .with_state(state)
        .layer(DefaultBodyLimit::max(MAX_UPLOAD_BYTES))
        .layer(CompressionLayer::new())
        .layer(TraceLayer::new_for_http())
}

async fn handler_404() -> AppError {
    AppError::not_found()
}
