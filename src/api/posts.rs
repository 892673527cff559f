use std::sync::Arc;

use axum::{
    extract::{Multipart, OriginalUri, Path, Query, State},
    response::{Html, IntoResponse, Response},
};
use sqlx::SqlitePool;
use validator::Validate;

use crate::{
    api::{parse_id, render, validation_messages, PageQuery},
    cache::{PageCache, PageKey},
    config::Config,
    db::{self, Group, GroupId, NewPost, Post, PostFilter, User},
    error::{AppError, AppResult},
    templates::{
        GroupListTemplate, GroupOption, IndexTemplate, PostDetailTemplate, PostFormTemplate,
        ProfileTemplate,
    },
    utils::{
        auth::{AuthUser, MaybeUser},
        redirect,
        upload::{self, ImageUpload, INVALID_IMAGE},
    },
};

const INVALID_GROUP: &str = "Select a valid choice. That choice is not one of the available choices.";

// GET /
pub async fn index(
    State(pool): State<SqlitePool>,
    State(cache): State<PageCache>,
    viewer: MaybeUser,
    OriginalUri(uri): OriginalUri,
    Query(query): Query<PageQuery>,
) -> AppResult<Html<String>> {
    let key = PageKey {
        uri: uri.to_string(),
        viewer: viewer.id(),
    };

    if let Some(body) = cache.get(&key).await {
        return Ok(Html(body));
    }

    let page = db::paginate_posts(&pool, PostFilter::All, query.page.as_deref()).await?;
    let Html(body) = render(IndexTemplate {
        current_user: viewer.username(),
        page,
    })?;

    cache.insert(key, body.clone()).await;
    Ok(Html(body))
}

// GET /group/:slug/
pub async fn group_posts(
    State(pool): State<SqlitePool>,
    viewer: MaybeUser,
    Path(slug): Path<String>,
    Query(query): Query<PageQuery>,
) -> AppResult<Html<String>> {
    let group = db::get_group_by_slug(&pool, &slug).await?;
    let page = db::paginate_posts(&pool, PostFilter::Group(group.id), query.page.as_deref()).await?;

    render(GroupListTemplate {
        current_user: viewer.username(),
        group,
        page,
    })
}

// GET /profile/:username/
pub async fn profile(
    State(pool): State<SqlitePool>,
    viewer: MaybeUser,
    Path(username): Path<String>,
    Query(query): Query<PageQuery>,
) -> AppResult<Html<String>> {
    let author = db::get_user_by_username(&pool, &username).await?;
    let page = db::paginate_posts(&pool, PostFilter::Author(author.id), query.page.as_deref()).await?;

    let (following, can_follow) = match viewer.id() {
        Some(viewer_id) if viewer_id != author.id => {
            (db::is_following(&pool, viewer_id, author.id).await?, true)
        }
        _ => (false, false),
    };

    render(ProfileTemplate {
        current_user: viewer.username(),
        posts_count: page.total as i64,
        author,
        following,
        can_follow,
        page,
    })
}

// GET /posts/:post_id/
pub async fn post_detail(
    State(pool): State<SqlitePool>,
    viewer: MaybeUser,
    Path(post_id): Path<String>,
) -> AppResult<Html<String>> {
    let post = db::get_post(&pool, parse_id(&post_id)?).await?;
    let author_posts_count = db::count_posts(&pool, PostFilter::Author(post.author_id)).await?;
    let comments = db::list_comments(&pool, post.id).await?;
    let can_edit = viewer.id().is_some_and(|id| post.is_authored_by(id));

    render(PostDetailTemplate {
        current_user: viewer.username(),
        post,
        author_posts_count,
        comments,
        can_edit,
    })
}

/// Raw values of the create/edit form, kept so an invalid submission can
/// be shown again.
#[derive(Debug, Default, Validate)]
struct PostForm {
    #[validate(length(min = 1, message = "Post text is required."))]
    text: String,
    group: Option<String>,
    image: Option<ImageUpload>,
}

struct CleanedPost {
    text: String,
    group_id: Option<GroupId>,
    image: Option<(ImageUpload, &'static str)>,
}

impl PostForm {
    fn from_post(post: &Post) -> Self {
        Self {
            text: post.text.clone(),
            group: post.group_id.map(|id| id.to_string()),
            image: None,
        }
    }

    async fn from_multipart(mut multipart: Multipart) -> AppResult<Self> {
        let mut form = PostForm::default();

        while let Some(field) = multipart.next_field().await? {
            let name = field.name().map(str::to_string);
            match name.as_deref() {
                Some("text") => form.text = field.text().await?.trim().to_string(),
                Some("group") => {
                    let value = field.text().await?;
                    form.group = Some(value.trim().to_string()).filter(|v| !v.is_empty());
                }
                Some("image") => {
                    let file_name = field.file_name().unwrap_or_default().to_string();
                    let content_type = field.content_type().map(str::to_string);
                    let bytes = field.bytes().await?;

                    let upload = ImageUpload {
                        file_name,
                        content_type,
                        bytes,
                    };
                    if !upload.is_empty() {
                        form.image = Some(upload);
                    }
                }
                _ => {}
            }
        }

        Ok(form)
    }

    fn selected_group(&self) -> Option<GroupId> {
        self.group.as_deref().and_then(|raw| raw.parse().ok())
    }

    /// Field errors come back in the inner `Err` so the form can be shown
    /// again.
    async fn clean(&self, groups: &[Group]) -> AppResult<Result<CleanedPost, Vec<String>>> {
        let mut errors = match self.validate() {
            Ok(()) => Vec::new(),
            Err(errs) => validation_messages(&errs),
        };

        let group_id = match self.group.as_deref() {
            None => None,
            Some(_) => match self
                .selected_group()
                .filter(|id| groups.iter().any(|group| group.id == *id))
            {
                Some(id) => Some(id),
                None => {
                    errors.push(INVALID_GROUP.to_string());
                    None
                }
            },
        };

        let image = match &self.image {
            None => None,
            Some(upload) => match upload::check_image(upload.clone()).await? {
                Some(extension) => Some((upload.clone(), extension)),
                None => {
                    errors.push(INVALID_IMAGE.to_string());
                    None
                }
            },
        };

        if !errors.is_empty() {
            return Ok(Err(errors));
        }

        Ok(Ok(CleanedPost {
            text: self.text.clone(),
            group_id,
            image,
        }))
    }
}

fn post_form_page(
    user: &User,
    groups: &[Group],
    form: &PostForm,
    editing: Option<&Post>,
    errors: Vec<String>,
) -> AppResult<Html<String>> {
    let action = match editing {
        Some(post) => format!("/posts/{}/edit/", post.id),
        None => "/create/".to_string(),
    };

    render(PostFormTemplate {
        current_user: Some(user.username.clone()),
        is_edit: editing.is_some(),
        post_id: editing.map(|post| post.id),
        action,
        text: form.text.clone(),
        groups: GroupOption::list(groups, form.selected_group()),
        image_url: editing.and_then(Post::image_url),
        errors,
    })
}

async fn save_image(config: &Config, cleaned: &CleanedPost) -> AppResult<Option<String>> {
    match &cleaned.image {
        Some((image, extension)) => Ok(Some(
            upload::store_image(&config.media.root, image, extension).await?,
        )),
        None => Ok(None),
    }
}

/// A freshly stored image is deleted again when the row pointing at it
/// could not be written.
async fn discard_image_on_error<T>(
    config: &Config,
    image: Option<&str>,
    result: AppResult<T>,
) -> AppResult<T> {
    if result.is_err() {
        if let Some(image) = image {
            upload::remove_image(&config.media.root, image).await;
        }
    }
    result
}

// GET /create/
pub async fn post_create_form(
    State(pool): State<SqlitePool>,
    AuthUser(user): AuthUser,
) -> AppResult<Html<String>> {
    let groups = db::list_groups(&pool).await?;
    post_form_page(&user, &groups, &PostForm::default(), None, Vec::new())
}

// POST /create/
pub async fn post_create(
    State(pool): State<SqlitePool>,
    State(config): State<Arc<Config>>,
    AuthUser(user): AuthUser,
    multipart: Multipart,
) -> AppResult<Response> {
    let form = PostForm::from_multipart(multipart).await?;
    let groups = db::list_groups(&pool).await?;

    let cleaned = match form.clean(&groups).await? {
        Ok(cleaned) => cleaned,
        Err(errors) => {
            return Ok(post_form_page(&user, &groups, &form, None, errors)?.into_response());
        }
    };

    let image = save_image(&config, &cleaned).await?;
    let created = db::create_post(
        &pool,
        NewPost {
            text: &cleaned.text,
            author_id: user.id,
            group_id: cleaned.group_id,
            image: image.as_deref(),
        },
    )
    .await;
    let post_id = discard_image_on_error(&config, image.as_deref(), created).await?;

    tracing::info!(post_id, author = %user.username, "post created");
    Ok(redirect::found(&redirect::profile_url(&user.username)))
}

/// Loads the post and turns a non-author away to the post page.
async fn editable_post(pool: &SqlitePool, raw_id: &str, user: &User) -> AppResult<Post> {
    let post = db::get_post(pool, parse_id(raw_id)?).await?;
    if !post.is_authored_by(user.id) {
        tracing::debug!(post_id = post.id, user = %user.username, "edit refused for non-author");
        return Err(AppError::Redirect(redirect::post_url(post.id)));
    }
    Ok(post)
}

// GET /posts/:post_id/edit/
pub async fn post_edit_form(
    State(pool): State<SqlitePool>,
    AuthUser(user): AuthUser,
    Path(post_id): Path<String>,
) -> AppResult<Html<String>> {
    let post = editable_post(&pool, &post_id, &user).await?;
    let groups = db::list_groups(&pool).await?;

    post_form_page(&user, &groups, &PostForm::from_post(&post), Some(&post), Vec::new())
}

// POST /posts/:post_id/edit/
pub async fn post_edit(
    State(pool): State<SqlitePool>,
    State(config): State<Arc<Config>>,
    AuthUser(user): AuthUser,
    Path(post_id): Path<String>,
    multipart: Multipart,
) -> AppResult<Response> {
    let post = editable_post(&pool, &post_id, &user).await?;
    let form = PostForm::from_multipart(multipart).await?;
    let groups = db::list_groups(&pool).await?;

    let cleaned = match form.clean(&groups).await? {
        Ok(cleaned) => cleaned,
        Err(errors) => {
            return Ok(post_form_page(&user, &groups, &form, Some(&post), errors)?.into_response());
        }
    };

    let image = save_image(&config, &cleaned).await?;
    let updated = db::update_post(
        &pool,
        post.id,
        user.id,
        &cleaned.text,
        cleaned.group_id,
        image.as_deref(),
    )
    .await;
    discard_image_on_error(&config, image.as_deref(), updated).await?;

    if let (Some(_), Some(replaced)) = (&image, &post.image) {
        upload::remove_image(&config.media.root, replaced).await;
    }

    tracing::info!(post_id = post.id, author = %user.username, "post edited");
    Ok(redirect::found(&redirect::post_url(post.id)))
}
