use axum::{
    async_trait,
    extract::{FromRef, FromRequestParts},
    http::{request::Parts, HeaderMap},
};
use axum_extra::extract::cookie::{Cookie, CookieJar, SameSite};
use jsonwebtoken::DecodingKey;
use sqlx::SqlitePool;

use crate::{
    db::{self, User, UserId},
    error::{AppError, AppResult},
    utils::jwt,
};

/// Cookie holding the session JWT.
pub const AUTH_COOKIE: &str = "yatube_token";

pub fn session_cookie(token: String) -> Cookie<'static> {
    Cookie::build((AUTH_COOKIE, token))
        .path("/")
        .http_only(true)
        .same_site(SameSite::Lax)
        .build()
}

pub fn expired_session_cookie() -> Cookie<'static> {
    Cookie::build(AUTH_COOKIE).path("/").build()
}

/// Resolves the session cookie in `headers` to a user. A missing, expired
/// or forged cookie gives `None`.
pub async fn session_user(
    headers: &HeaderMap,
    pool: &SqlitePool,
    key: &DecodingKey,
) -> AppResult<Option<User>> {
    let jar = CookieJar::from_headers(headers);
    let Some(cookie) = jar.get(AUTH_COOKIE) else {
        return Ok(None);
    };

    let user_id = match jwt::verify_token(cookie.value(), key) {
        Ok(user_id) => user_id,
        Err(err) => {
            tracing::debug!(error = ?err, "ignoring invalid session cookie");
            return Ok(None);
        }
    };

    db::find_user(pool, user_id).await
}

async fn user_from_cookie<S>(parts: &Parts, state: &S) -> AppResult<Option<User>>
where
    SqlitePool: FromRef<S>,
    DecodingKey: FromRef<S>,
{
    let pool = SqlitePool::from_ref(state);
    let key = DecodingKey::from_ref(state);
    session_user(&parts.headers, &pool, &key).await
}

/// The signed-in user, if any. A missing, expired or forged cookie is
/// treated as an anonymous visitor.
#[derive(Debug, Clone)]
pub struct MaybeUser(pub Option<User>);

impl MaybeUser {
    pub fn id(&self) -> Option<UserId> {
        self.0.as_ref().map(|user| user.id)
    }

    pub fn username(&self) -> Option<String> {
        self.0.as_ref().map(|user| user.username.clone())
    }
}

#[async_trait]
impl<S> FromRequestParts<S> for MaybeUser
where
    S: Send + Sync,
    SqlitePool: FromRef<S>,
    DecodingKey: FromRef<S>,
{
    type Rejection = AppError;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        Ok(MaybeUser(user_from_cookie(parts, state).await?))
    }
}

/// A signed-in user. Anonymous visitors are sent to the login page with
/// the requested path in `next`.
#[derive(Debug, Clone)]
pub struct AuthUser(pub User);

#[async_trait]
impl<S> FromRequestParts<S> for AuthUser
where
    S: Send + Sync,
    SqlitePool: FromRef<S>,
    DecodingKey: FromRef<S>,
{
    type Rejection = AppError;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        match user_from_cookie(parts, state).await? {
            Some(user) => Ok(AuthUser(user)),
            None => {
                let next = parts
                    .uri
                    .path_and_query()
                    .map(|path| path.as_str().to_string())
                    .unwrap_or_else(|| parts.uri.path().to_string());
                Err(AppError::LoginRequired { next })
            }
        }
    }
}
