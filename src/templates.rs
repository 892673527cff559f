use askama::Template;

use crate::{
    db::{Comment, Group, GroupId, Post, PostId, User},
    utils::paginator::Page,
};

#[derive(Template)]
#[template(path = "posts/index.html")]
pub struct IndexTemplate {
    pub current_user: Option<String>,
    pub page: Page<Post>,
}

#[derive(Template)]
#[template(path = "posts/group_list.html")]
pub struct GroupListTemplate {
    pub current_user: Option<String>,
    pub group: Group,
    pub page: Page<Post>,
}

#[derive(Template)]
#[template(path = "posts/profile.html")]
pub struct ProfileTemplate {
    pub current_user: Option<String>,
    pub author: User,
    pub posts_count: i64,
    pub following: bool,
    /// Signed in and looking at someone else's profile.
    pub can_follow: bool,
    pub page: Page<Post>,
}

#[derive(Template)]
#[template(path = "posts/post_detail.html")]
pub struct PostDetailTemplate {
    pub current_user: Option<String>,
    pub post: Post,
    pub author_posts_count: i64,
    pub comments: Vec<Comment>,
    pub can_edit: bool,
}

#[derive(Template)]
#[template(path = "posts/follow.html")]
pub struct FollowTemplate {
    pub current_user: Option<String>,
    pub page: Page<Post>,
}

pub struct GroupOption {
    pub id: GroupId,
    pub title: String,
    pub selected: bool,
}

impl GroupOption {
    pub fn list(groups: &[Group], selected: Option<GroupId>) -> Vec<Self> {
        groups
            .iter()
            .map(|group| GroupOption {
                id: group.id,
                title: group.title.clone(),
                selected: selected == Some(group.id),
            })
            .collect()
    }
}

#[derive(Template)]
#[template(path = "posts/create_post.html")]
pub struct PostFormTemplate {
    pub current_user: Option<String>,
    pub is_edit: bool,
    pub post_id: Option<PostId>,
    pub action: String,
    pub text: String,
    pub groups: Vec<GroupOption>,
    pub image_url: Option<String>,
    pub errors: Vec<String>,
}

#[derive(Template)]
#[template(path = "users/login.html")]
pub struct LoginTemplate {
    pub current_user: Option<String>,
    pub next: String,
    pub username: String,
    pub errors: Vec<String>,
}

#[derive(Template)]
#[template(path = "users/signup.html")]
pub struct SignupTemplate {
    pub current_user: Option<String>,
    pub username: String,
    pub email: String,
    pub errors: Vec<String>,
}

#[derive(Template)]
#[template(path = "users/logged_out.html")]
pub struct LoggedOutTemplate {
    pub current_user: Option<String>,
}

#[derive(Template)]
#[template(path = "core/404.html")]
pub struct NotFoundTemplate {
    pub current_user: Option<String>,
    pub path: String,
}
