use std::sync::Arc;

use axum::{
    extract::{Query, State},
    response::{Html, IntoResponse, Response},
    Form,
};
use axum_extra::extract::cookie::CookieJar;
use jsonwebtoken::EncodingKey;
use serde::Deserialize;
use sqlx::SqlitePool;
use validator::Validate;

use crate::{
    api::{render, validation_messages},
    config::Config,
    db::{self, UserId},
    error::{AppError, AppResult, DBError},
    templates::{LoggedOutTemplate, LoginTemplate, SignupTemplate},
    utils::{
        auth::{expired_session_cookie, session_cookie, MaybeUser},
        hasher, jwt, redirect,
    },
};

const BAD_CREDENTIALS: &str =
    "Please enter a correct username and password. Note that both fields may be case-sensitive.";
const PASSWORD_MISMATCH: &str = "The two password fields didn't match.";
const BAD_USERNAME: &str =
    "Enter a valid username. It may contain only letters, numbers, and @/./+/-/_ characters.";

fn sign_in(
    jar: CookieJar,
    user_id: UserId,
    key: &EncodingKey,
    config: &Config,
    to: &str,
) -> AppResult<Response> {
    let token = jwt::generate_jwt(user_id, config.auth.token_ttl_days, key)?;
    Ok((jar.add(session_cookie(token)), redirect::found(to)).into_response())
}

// ================================================= LOGIN ================================================= //

#[derive(Debug, Default, Deserialize)]
pub struct LoginQuery {
    #[serde(default)]
    next: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct LoginForm {
    #[serde(default)]
    username: String,
    #[serde(default)]
    password: String,
    #[serde(default)]
    next: Option<String>,
}

// GET /auth/login/
pub async fn login_form(viewer: MaybeUser, Query(query): Query<LoginQuery>) -> AppResult<Html<String>> {
    render(LoginTemplate {
        current_user: viewer.username(),
        next: query.next.unwrap_or_default(),
        username: String::new(),
        errors: Vec::new(),
    })
}

// POST /auth/login/
pub async fn login(
    State(pool): State<SqlitePool>,
    State(key): State<EncodingKey>,
    State(config): State<Arc<Config>>,
    jar: CookieJar,
    Form(form): Form<LoginForm>,
) -> AppResult<Response> {
    let user_auth = db::find_user_auth(&pool, form.username.trim()).await?;

    let verified = match &user_auth {
        Some(user_auth) => hasher::verify_password(&user_auth.hash, &form.password)?,
        None => false,
    };

    let Some(user_auth) = user_auth.filter(|_| verified) else {
        tracing::debug!(username = %form.username, "login failed");
        let page = render(LoginTemplate {
            current_user: None,
            next: form.next.unwrap_or_default(),
            username: form.username,
            errors: vec![BAD_CREDENTIALS.to_string()],
        })?;
        return Ok(page.into_response());
    };

    tracing::info!(user = %user_auth.username, "user logged in");
    let to = redirect::safe_next(form.next.as_deref()).unwrap_or("/");
    sign_in(jar, user_auth.id, &key, &config, to)
}

// GET /auth/logout/
pub async fn logout(jar: CookieJar) -> AppResult<Response> {
    let page = render(LoggedOutTemplate { current_user: None })?;
    Ok((jar.remove(expired_session_cookie()), page).into_response())
}

// ================================================= REGISTRATION ================================================= //

#[derive(Debug, Deserialize)]
pub struct SignupForm {
    #[serde(default)]
    username: String,
    #[serde(default)]
    email: String,
    #[serde(default)]
    password1: String,
    #[serde(default)]
    password2: String,
}

#[derive(Debug, Validate)]
struct Registration {
    #[validate(length(min = 1, max = 150, message = "Username must be 1 to 150 characters long."))]
    username: String,

    #[validate(email(message = "Enter a valid email address."))]
    email: Option<String>,

    #[validate(length(min = 8, max = 128, message = "Password must be at least 8 characters long."))]
    password: String,
}

fn valid_username(username: &str) -> bool {
    username
        .chars()
        .all(|c| c.is_alphanumeric() || matches!(c, '@' | '.' | '+' | '-' | '_'))
}

impl SignupForm {
    fn registration(&self) -> Result<Registration, Vec<String>> {
        let email = self.email.trim();
        let registration = Registration {
            username: self.username.trim().to_string(),
            email: (!email.is_empty()).then(|| email.to_string()),
            password: self.password1.clone(),
        };

        let mut errors = match registration.validate() {
            Ok(()) => Vec::new(),
            Err(errs) => validation_messages(&errs),
        };
        if !valid_username(&registration.username) {
            errors.push(BAD_USERNAME.to_string());
        }
        if self.password1 != self.password2 {
            errors.push(PASSWORD_MISMATCH.to_string());
        }

        if errors.is_empty() {
            Ok(registration)
        } else {
            Err(errors)
        }
    }

    fn page(&self, errors: Vec<String>) -> AppResult<Response> {
        Ok(render(SignupTemplate {
            current_user: None,
            username: self.username.clone(),
            email: self.email.clone(),
            errors,
        })?
        .into_response())
    }
}

// GET /auth/signup/
pub async fn signup_form(viewer: MaybeUser) -> AppResult<Html<String>> {
    render(SignupTemplate {
        current_user: viewer.username(),
        username: String::new(),
        email: String::new(),
        errors: Vec::new(),
    })
}

// POST /auth/signup/
pub async fn signup(
    State(pool): State<SqlitePool>,
    State(key): State<EncodingKey>,
    State(config): State<Arc<Config>>,
    jar: CookieJar,
    Form(form): Form<SignupForm>,
) -> AppResult<Response> {
    let registration = match form.registration() {
        Ok(registration) => registration,
        Err(errors) => return form.page(errors),
    };

    let hash = hasher::hash_password(&registration.password)?;
    let email = registration.email.as_deref().unwrap_or_default();

    let user = match db::create_user(&pool, &registration.username, email, &hash).await {
        Ok(user) => user,
        Err(AppError::DBError(err @ DBError::AlreadyRegistered)) => {
            return form.page(vec![err.to_string()]);
        }
        Err(err) => return Err(err),
    };

    tracing::info!(user = %user.username, "user registered");
    sign_in(jar, user.id, &key, &config, "/")
}
