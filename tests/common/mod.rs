#![allow(dead_code)]

use axum::{
    body::Body,
    http::{header, Request},
    response::Response,
    Router,
};
use percent_encoding::{utf8_percent_encode, NON_ALPHANUMERIC};
use sqlx::SqlitePool;
use tower::ServiceExt;
use yatube::{
    build_state,
    config::Config,
    db::{self, Group, NewPost, PostId, User},
    routes,
    utils::{auth::AUTH_COOKIE, hasher, jwt},
    AppState,
};

pub const PASSWORD: &str = "s3cret-password";

const BOUNDARY: &str = "yatube-test-boundary";

/// 1x2 transparent GIF.
pub const SMALL_GIF: &[u8] = &[
    0x47, 0x49, 0x46, 0x38, 0x39, 0x61, 0x02, 0x00, 0x01, 0x00, 0x80, 0x00, 0x00, 0x00, 0x00, 0x00,
    0xFF, 0xFF, 0xFF, 0x21, 0xF9, 0x04, 0x00, 0x00, 0x00, 0x00, 0x00, 0x2C, 0x00, 0x00, 0x00, 0x00,
    0x02, 0x00, 0x01, 0x00, 0x00, 0x02, 0x02, 0x0C, 0x0A, 0x00, 0x3B,
];

pub struct TestApp {
    pub router: Router,
    pub state: AppState,
    _media: tempfile::TempDir,
}

pub struct Upload<'a> {
    pub field: &'a str,
    pub file_name: &'a str,
    pub content_type: &'a str,
    pub bytes: &'a [u8],
}

impl TestApp {
    pub async fn new() -> Self {
        let media = tempfile::tempdir().expect("temp media dir");
        let config = Config::for_tests(media.path().to_path_buf());
        let state = build_state(config).await.expect("app state");
        let router = routes::generate_routes(state.clone());

        Self {
            router,
            state,
            _media: media,
        }
    }

    pub fn pool(&self) -> &SqlitePool {
        &self.state.pool
    }

    pub async fn create_user(&self, username: &str) -> User {
        let hash = hasher::hash_password(PASSWORD).expect("hash");
        db::create_user(self.pool(), username, "", &hash)
            .await
            .expect("create user")
    }

    pub async fn create_group(&self, title: &str, slug: &str) -> Group {
        db::create_group(self.pool(), title, slug, "Test description")
            .await
            .expect("create group")
    }

    pub async fn create_post(&self, author: &User, text: &str, group: Option<&Group>) -> PostId {
        db::create_post(
            self.pool(),
            NewPost {
                text,
                author_id: author.id,
                group_id: group.map(|group| group.id),
                image: None,
            },
        )
        .await
        .expect("create post")
    }

    /// Session cookie for `user`, the equivalent of a forced login.
    pub fn cookie_for(&self, user: &User) -> String {
        let token = jwt::generate_jwt(user.id, 1, &self.state.encoding_key).expect("token");
        format!("{AUTH_COOKIE}={token}")
    }

    async fn send(&self, request: Request<Body>) -> Response {
        self.router
            .clone()
            .oneshot(request)
            .await
            .expect("infallible router")
    }

    pub async fn get(&self, uri: &str, cookie: Option<&str>) -> Response {
        let mut request = Request::get(uri);
        if let Some(cookie) = cookie {
            request = request.header(header::COOKIE, cookie);
        }
        self.send(request.body(Body::empty()).unwrap()).await
    }

    pub async fn post_form(&self, uri: &str, cookie: Option<&str>, fields: &[(&str, &str)]) -> Response {
        let body = fields
            .iter()
            .map(|(name, value)| {
                format!(
                    "{}={}",
                    utf8_percent_encode(name, NON_ALPHANUMERIC),
                    utf8_percent_encode(value, NON_ALPHANUMERIC)
                )
            })
            .collect::<Vec<_>>()
            .join("&");

        let mut request = Request::post(uri).header(header::CONTENT_TYPE, "application/x-www-form-urlencoded");
        if let Some(cookie) = cookie {
            request = request.header(header::COOKIE, cookie);
        }
        self.send(request.body(Body::from(body)).unwrap()).await
    }

    pub async fn post_multipart(
        &self,
        uri: &str,
        cookie: Option<&str>,
        fields: &[(&str, &str)],
        upload: Option<Upload<'_>>,
    ) -> Response {
        let mut body = Vec::new();
        for (name, value) in fields {
            body.extend_from_slice(
                format!(
                    "--{BOUNDARY}\r\nContent-Disposition: form-data; name=\"{name}\"\r\n\r\n{value}\r\n"
                )
                .as_bytes(),
            );
        }
        if let Some(upload) = upload {
            body.extend_from_slice(
                format!(
                    "--{BOUNDARY}\r\nContent-Disposition: form-data; name=\"{}\"; filename=\"{}\"\r\nContent-Type: {}\r\n\r\n",
                    upload.field, upload.file_name, upload.content_type
                )
                .as_bytes(),
            );
            body.extend_from_slice(upload.bytes);
            body.extend_from_slice(b"\r\n");
        }
        body.extend_from_slice(format!("--{BOUNDARY}--\r\n").as_bytes());

        let mut request = Request::post(uri).header(
            header::CONTENT_TYPE,
            format!("multipart/form-data; boundary={BOUNDARY}"),
        );
        if let Some(cookie) = cookie {
            request = request.header(header::COOKIE, cookie);
        }
        self.send(request.body(Body::from(body)).unwrap()).await
    }

    pub async fn post_count(&self) -> i64 {
        db::count_posts(self.pool(), db::PostFilter::All)
            .await
            .expect("count posts")
    }
}

pub async fn body_text(response: Response) -> String {
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .expect("read body");
    String::from_utf8(bytes.to_vec()).expect("utf-8 body")
}

pub fn location(response: &Response) -> &str {
    response
        .headers()
        .get(header::LOCATION)
        .expect("location header")
        .to_str()
        .expect("ascii location")
}

/// Number of post cards rendered on a listing page.
pub fn posts_on_page(html: &str) -> usize {
    html.matches("<article class=\"post\">").count()
}
