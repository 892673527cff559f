use chrono::{DateTime, Utc};
use sqlx::{FromRow, QueryBuilder, Sqlite, SqlitePool};

use crate::{
    error::{AppError, AppResult, DBError},
    utils::paginator::{Page, Paginator, PAGE_SIZE},
};

use super::{GroupId, UserId};

pub type PostId = i64;

const POST_COLUMNS: &str = r#"
    SELECT
        posts.id,
        posts.text,
        posts.pub_date,
        posts.image,
        posts.author_id,
        users.username AS author_username,
        posts.group_id,
        post_groups.slug AS group_slug,
        post_groups.title AS group_title
    FROM posts
    INNER JOIN users ON users.id = posts.author_id
    LEFT JOIN post_groups ON post_groups.id = posts.group_id
"#;

#[derive(Debug, Clone, PartialEq, FromRow)]
pub struct Post {
    pub id: PostId,
    pub text: String,
    pub pub_date: DateTime<Utc>,
    /// Relative to the media root, e.g. `posts/<name>.gif`.
    pub image: Option<String>,
    pub author_id: UserId,
    pub author_username: String,
    pub group_id: Option<GroupId>,
    pub group_slug: Option<String>,
    pub group_title: Option<String>,
}

impl Post {
    pub fn image_url(&self) -> Option<String> {
        self.image.as_ref().map(|image| format!("/media/{image}"))
    }

    pub fn is_authored_by(&self, user_id: UserId) -> bool {
        self.author_id == user_id
    }

    /// First words of the text, used as a page title.
    pub fn headline(&self) -> String {
        self.text.chars().take(30).collect()
    }
}

/// Which posts a listing shows.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PostFilter {
    All,
    Group(GroupId),
    Author(UserId),
    /// Posts by every author the given user follows.
    FollowedBy(UserId),
}

fn push_filter(builder: &mut QueryBuilder<'_, Sqlite>, filter: PostFilter) {
    match filter {
        PostFilter::All => {}
        PostFilter::Group(group_id) => {
            builder.push(" WHERE posts.group_id = ").push_bind(group_id);
        }
        PostFilter::Author(author_id) => {
            builder.push(" WHERE posts.author_id = ").push_bind(author_id);
        }
        PostFilter::FollowedBy(user_id) => {
            builder
                .push(" WHERE posts.author_id IN (SELECT author_id FROM follows WHERE user_id = ")
                .push_bind(user_id)
                .push(")");
        }
    }
}

pub async fn count_posts(pool: &SqlitePool, filter: PostFilter) -> AppResult<i64> {
    let mut builder = QueryBuilder::<Sqlite>::new("SELECT COUNT(*) FROM posts");
    push_filter(&mut builder, filter);

    let count = builder.build_query_scalar::<i64>().fetch_one(pool).await?;
    Ok(count)
}

/// Newest first; posts sharing a timestamp fall back to insertion order.
pub async fn list_posts(
    pool: &SqlitePool,
    filter: PostFilter,
    limit: u32,
    offset: u32,
) -> AppResult<Vec<Post>> {
    let mut builder = QueryBuilder::<Sqlite>::new(POST_COLUMNS);
    push_filter(&mut builder, filter);
    builder
        .push(" ORDER BY posts.pub_date DESC, posts.id DESC LIMIT ")
        .push_bind(limit as i64)
        .push(" OFFSET ")
        .push_bind(offset as i64);

    let posts = builder.build_query_as::<Post>().fetch_all(pool).await?;
    Ok(posts)
}

pub async fn paginate_posts(
    pool: &SqlitePool,
    filter: PostFilter,
    raw_page: Option<&str>,
) -> AppResult<Page<Post>> {
    let total = count_posts(pool, filter).await?;
    let paginator = Paginator::new(total.max(0) as u64, PAGE_SIZE);
    let number = paginator.page_number(raw_page);

    let posts = list_posts(pool, filter, paginator.per_page(), paginator.offset(number)).await?;
    Ok(paginator.page(number, posts))
}

pub async fn find_post(pool: &SqlitePool, post_id: PostId) -> AppResult<Option<Post>> {
    let mut builder = QueryBuilder::<Sqlite>::new(POST_COLUMNS);
    builder.push(" WHERE posts.id = ").push_bind(post_id);

    let post = builder.build_query_as::<Post>().fetch_optional(pool).await?;
    Ok(post)
}

pub async fn get_post(pool: &SqlitePool, post_id: PostId) -> AppResult<Post> {
    find_post(pool, post_id)
        .await?
        .ok_or(AppError::DBError(DBError::NotFound))
}

pub struct NewPost<'a> {
    pub text: &'a str,
    pub author_id: UserId,
    pub group_id: Option<GroupId>,
    pub image: Option<&'a str>,
}

pub async fn create_post(pool: &SqlitePool, post: NewPost<'_>) -> AppResult<PostId> {
    let post_id = sqlx::query_scalar::<_, PostId>(
        r#"
        INSERT INTO posts (text, pub_date, author_id, group_id, image)
        VALUES (?1, ?2, ?3, ?4, ?5)
        RETURNING id
        "#,
    )
    .bind(post.text)
    .bind(Utc::now())
    .bind(post.author_id)
    .bind(post.group_id)
    .bind(post.image)
    .fetch_one(pool)
    .await?;

    Ok(post_id)
}

/// Only the author's own post is touched. A `None` image keeps the
/// current one.
pub async fn update_post(
    pool: &SqlitePool,
    post_id: PostId,
    author_id: UserId,
    text: &str,
    group_id: Option<GroupId>,
    image: Option<&str>,
) -> AppResult<()> {
    let updated = sqlx::query(
        r#"
        UPDATE posts
        SET text = ?1,
            group_id = ?2,
            image = COALESCE(?3, image)
        WHERE id = ?4 AND author_id = ?5
        "#,
    )
    .bind(text)
    .bind(group_id)
    .bind(image)
    .bind(post_id)
    .bind(author_id)
    .execute(pool)
    .await?;

    if updated.rows_affected() == 0 {
        return Err(DBError::NotFound.into());
    }
    Ok(())
}

pub async fn delete_post(pool: &SqlitePool, post_id: PostId) -> AppResult<bool> {
    let deleted = sqlx::query("DELETE FROM posts WHERE id = ?1")
        .bind(post_id)
        .execute(pool)
        .await?;

    Ok(deleted.rows_affected() > 0)
}
