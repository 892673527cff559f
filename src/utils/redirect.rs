use axum::{
    http::{header, StatusCode},
    response::{IntoResponse, Response},
};
use percent_encoding::{utf8_percent_encode, AsciiSet, CONTROLS};

pub const LOGIN_URL: &str = "/auth/login/";

/// Characters escaped inside a path segment.
const SEGMENT: &AsciiSet = &CONTROLS
    .add(b' ')
    .add(b'"')
    .add(b'#')
    .add(b'%')
    .add(b'/')
    .add(b'<')
    .add(b'>')
    .add(b'?')
    .add(b'`')
    .add(b'{')
    .add(b'}');

/// Characters escaped in the `next` query value; `/` is left readable.
const NEXT_VALUE: &AsciiSet = &CONTROLS
    .add(b' ')
    .add(b'"')
    .add(b'#')
    .add(b'%')
    .add(b'&')
    .add(b'+')
    .add(b'<')
    .add(b'=')
    .add(b'>')
    .add(b'?')
    .add(b'`')
    .add(b'{')
    .add(b'}');

/// A plain `302 Found`.
pub fn found(location: &str) -> Response {
    (StatusCode::FOUND, [(header::LOCATION, location.to_string())]).into_response()
}

pub fn login_url(next: &str) -> String {
    format!("{LOGIN_URL}?next={}", utf8_percent_encode(next, NEXT_VALUE))
}

pub fn profile_url(username: &str) -> String {
    format!("/profile/{}/", utf8_percent_encode(username, SEGMENT))
}

pub fn post_url(post_id: i64) -> String {
    format!("/posts/{post_id}/")
}

/// Only same-site absolute paths are accepted as a post-login target.
pub fn safe_next(next: Option<&str>) -> Option<&str> {
    next.filter(|n| n.starts_with('/') && !n.starts_with("//") && !n.contains('\\'))
}
