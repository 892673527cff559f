mod common;

use axum::http::StatusCode;
use common::{body_text, location, posts_on_page, TestApp};
use yatube::{
    db,
    error::{AppError, DBError},
};

const PAGINATED_POSTS: usize = 13;

#[tokio::test]
async fn listing_pages_show_the_post() {
    let app = TestApp::new().await;
    let author = app.create_user("auth").await;
    let group = app.create_group("Test group", "test-slug").await;
    let post_id = app.create_post(&author, "Visible everywhere", Some(&group)).await;

    for uri in ["/", "/group/test-slug/", "/profile/auth/"] {
        let body = body_text(app.get(uri, None).await).await;
        assert_eq!(posts_on_page(&body), 1, "{uri}");
        assert!(body.contains("Visible everywhere"), "{uri}");
        assert!(body.contains(&format!("/posts/{post_id}/")), "{uri}");
        assert!(body.contains("<img"), "{uri}");
    }
}

#[tokio::test]
async fn group_page_lists_only_its_own_posts() {
    let app = TestApp::new().await;
    let author = app.create_user("auth").await;
    let group = app.create_group("Test group", "test-slug").await;
    let other_group = app.create_group("Other group", "other-slug").await;
    app.create_post(&author, "In the test group", Some(&group)).await;

    let body = body_text(app.get("/group/other-slug/", None).await).await;
    assert!(body.contains("<h1>Other group</h1>"));
    assert_eq!(posts_on_page(&body), 0);
    assert!(body.contains("No posts yet."));
    assert!(!body.contains("In the test group"));

    let body = body_text(app.get("/group/test-slug/", None).await).await;
    assert_eq!(posts_on_page(&body), 1);
    assert!(body.contains("In the test group"));
    assert!(other_group.id != group.id);
}

#[tokio::test]
async fn profile_page_counts_the_author_posts() {
    let app = TestApp::new().await;
    let author = app.create_user("auth").await;
    let other = app.create_user("other").await;
    app.create_post(&author, "First", None).await;
    app.create_post(&author, "Second", None).await;
    app.create_post(&other, "Not on this profile", None).await;

    let body = body_text(app.get("/profile/auth/", None).await).await;
    assert!(body.contains("All posts by auth"));
    assert!(body.contains("<span class=\"posts-count\">2</span>"));
    assert_eq!(posts_on_page(&body), 2);
    assert!(!body.contains("Not on this profile"));
}

#[tokio::test]
async fn post_detail_shows_post_and_comments() {
    let app = TestApp::new().await;
    let author = app.create_user("auth").await;
    let reader = app.create_user("reader").await;
    let group = app.create_group("Test group", "test-slug").await;
    let post_id = app.create_post(&author, "Detailed post", Some(&group)).await;
    db::create_comment(app.pool(), post_id, reader.id, "First comment")
        .await
        .unwrap();
    db::create_comment(app.pool(), post_id, author.id, "Second comment")
        .await
        .unwrap();

    let body = body_text(app.get(&format!("/posts/{post_id}/"), None).await).await;
    assert!(body.contains("Detailed post"));
    assert!(body.contains("Test group"));
    assert!(body.contains("Posts by this author: <span>1</span>"));

    let first = body.find("First comment").expect("first comment shown");
    let second = body.find("Second comment").expect("second comment shown");
    assert!(first < second, "comments are listed oldest first");

    // The comment form and the edit link need a signed-in author.
    assert!(!body.contains("/comment/"));
    assert!(!body.contains("Edit post"));

    let body = body_text(
        app.get(&format!("/posts/{post_id}/"), Some(&app.cookie_for(&author)))
            .await,
    )
    .await;
    assert!(body.contains(&format!("action=\"/posts/{post_id}/comment/\"")));
    assert!(body.contains("Edit post"));
}

#[tokio::test]
async fn create_form_has_the_expected_fields() {
    let app = TestApp::new().await;
    let author = app.create_user("auth").await;
    app.create_group("Test group", "test-slug").await;

    let body = body_text(app.get("/create/", Some(&app.cookie_for(&author))).await).await;
    assert!(body.contains("enctype=\"multipart/form-data\""));
    assert!(body.contains("name=\"text\""));
    assert!(body.contains("name=\"group\""));
    assert!(body.contains("type=\"file\" name=\"image\""));
    assert!(body.contains("Test group"));
    assert!(body.contains("New post"));
}

#[tokio::test]
async fn edit_form_is_prefilled() {
    let app = TestApp::new().await;
    let author = app.create_user("auth").await;
    let group = app.create_group("Test group", "test-slug").await;
    let post_id = app.create_post(&author, "Text to change", Some(&group)).await;

    let body = body_text(
        app.get(&format!("/posts/{post_id}/edit/"), Some(&app.cookie_for(&author)))
            .await,
    )
    .await;
    assert!(body.contains("Edit post"));
    assert!(body.contains(&format!("action=\"/posts/{post_id}/edit/\"")));
    assert!(body.contains("Text to change"));
    assert!(body.contains(&format!("value=\"{}\" selected", group.id)));
}

#[tokio::test]
async fn pagination_splits_listings_by_ten() {
    let app = TestApp::new().await;
    let author = app.create_user("auth").await;
    let group = app.create_group("Test group", "test-slug").await;
    for i in 0..PAGINATED_POSTS {
        app.create_post(&author, &format!("Post number {i}"), Some(&group))
            .await;
    }

    for uri in ["/", "/group/test-slug/", "/profile/auth/"] {
        let first = body_text(app.get(uri, None).await).await;
        assert_eq!(posts_on_page(&first), 10, "first page of {uri}");

        let second = body_text(app.get(&format!("{uri}?page=2"), None).await).await;
        assert_eq!(posts_on_page(&second), 3, "second page of {uri}");
    }
}

#[tokio::test]
async fn pagination_tolerates_bad_page_numbers() {
    let app = TestApp::new().await;
    let author = app.create_user("auth").await;
    for i in 0..PAGINATED_POSTS {
        app.create_post(&author, &format!("Post number {i}"), None).await;
    }

    let garbage = body_text(app.get("/profile/auth/?page=abc", None).await).await;
    assert_eq!(posts_on_page(&garbage), 10);

    let past_the_end = body_text(app.get("/profile/auth/?page=99", None).await).await;
    assert_eq!(posts_on_page(&past_the_end), 3);

    let negative = body_text(app.get("/profile/auth/?page=-1", None).await).await;
    assert_eq!(posts_on_page(&negative), 3);
}

#[tokio::test]
async fn index_page_is_cached_until_cleared() {
    let app = TestApp::new().await;
    let author = app.create_user("auth").await;
    let post_id = app.create_post(&author, "Cached post", None).await;

    let before = body_text(app.get("/", None).await).await;
    assert!(before.contains("Cached post"));

    assert!(db::delete_post(app.pool(), post_id).await.unwrap());
    let cached = body_text(app.get("/", None).await).await;
    assert_eq!(cached, before);

    app.state.page_cache.clear();
    let fresh = body_text(app.get("/", None).await).await;
    assert_ne!(fresh, before);
    assert!(!fresh.contains("Cached post"));
}

#[tokio::test]
async fn index_cache_is_kept_per_viewer() {
    let app = TestApp::new().await;
    let author = app.create_user("auth").await;
    app.create_post(&author, "Shared post", None).await;

    let guest = body_text(app.get("/", None).await).await;
    let signed_in = body_text(app.get("/", Some(&app.cookie_for(&author))).await).await;

    assert!(!guest.contains("/auth/logout/"));
    assert!(signed_in.contains("/auth/logout/"));
}

#[tokio::test]
async fn follower_sees_followed_author_posts() {
    let app = TestApp::new().await;
    let author = app.create_user("author").await;
    let follower = app.create_user("follower").await;
    let stranger = app.create_user("stranger").await;
    let follower_cookie = app.cookie_for(&follower);
    let stranger_cookie = app.cookie_for(&stranger);

    let feed = body_text(app.get("/follow/", Some(&follower_cookie)).await).await;
    assert_eq!(posts_on_page(&feed), 0);

    let response = app
        .post_form("/profile/author/follow/", Some(&follower_cookie), &[])
        .await;
    assert_eq!(response.status(), StatusCode::FOUND);
    assert_eq!(location(&response), "/profile/author/");
    assert!(db::is_following(app.pool(), follower.id, author.id).await.unwrap());

    app.create_post(&author, "For the followers", None).await;

    let feed = body_text(app.get("/follow/", Some(&follower_cookie)).await).await;
    assert_eq!(posts_on_page(&feed), 1);
    assert!(feed.contains("For the followers"));

    let feed = body_text(app.get("/follow/", Some(&stranger_cookie)).await).await;
    assert_eq!(posts_on_page(&feed), 0);
    assert!(!feed.contains("For the followers"));
}

#[tokio::test]
async fn following_twice_keeps_one_subscription() {
    let app = TestApp::new().await;
    let author = app.create_user("author").await;
    let follower = app.create_user("follower").await;
    let cookie = app.cookie_for(&follower);

    app.post_form("/profile/author/follow/", Some(&cookie), &[]).await;
    app.post_form("/profile/author/follow", Some(&cookie), &[]).await;

    let subscriptions: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM follows")
        .fetch_one(app.pool())
        .await
        .unwrap();
    assert_eq!(subscriptions, 1);
    assert!(!db::follow(app.pool(), follower.id, author.id).await.unwrap());
}

#[tokio::test]
async fn unfollow_removes_the_subscription() {
    let app = TestApp::new().await;
    let author = app.create_user("author").await;
    let follower = app.create_user("follower").await;
    let cookie = app.cookie_for(&follower);
    app.create_post(&author, "For the followers", None).await;
    db::follow(app.pool(), follower.id, author.id).await.unwrap();

    let profile = body_text(app.get("/profile/author/", Some(&cookie)).await).await;
    assert!(profile.contains("Unsubscribe"));

    let response = app
        .post_form("/profile/author/unfollow/", Some(&cookie), &[])
        .await;
    assert_eq!(response.status(), StatusCode::FOUND);
    assert_eq!(location(&response), "/profile/author/");
    assert!(!db::is_following(app.pool(), follower.id, author.id).await.unwrap());

    let feed = body_text(app.get("/follow/", Some(&cookie)).await).await;
    assert_eq!(posts_on_page(&feed), 0);

    let profile = body_text(app.get("/profile/author/", Some(&cookie)).await).await;
    assert!(profile.contains("Subscribe"));
    assert!(!profile.contains("Unsubscribe"));
}

#[tokio::test]
async fn self_follow_is_ignored() {
    let app = TestApp::new().await;
    let author = app.create_user("author").await;
    let cookie = app.cookie_for(&author);

    let response = app
        .post_form("/profile/author/follow/", Some(&cookie), &[])
        .await;
    assert_eq!(response.status(), StatusCode::FOUND);
    assert!(!db::is_following(app.pool(), author.id, author.id).await.unwrap());

    let profile = body_text(app.get("/profile/author/", Some(&cookie)).await).await;
    assert!(!profile.contains("Subscribe"));
}

#[tokio::test]
async fn self_follow_is_refused_by_the_database() {
    let app = TestApp::new().await;
    let author = app.create_user("author").await;

    let result = db::follow(app.pool(), author.id, author.id).await;
    assert!(matches!(result, Err(AppError::DBError(DBError::SelfFollow))));

    let raw = sqlx::query("INSERT INTO follows (user_id, author_id) VALUES (?1, ?1)")
        .bind(author.id)
        .execute(app.pool())
        .await;
    let err = raw.expect_err("check constraint");
    let db_err = err.as_database_error().expect("database error");
    assert!(db_err.message().contains("user_not_author"));
}

#[tokio::test]
async fn guest_cannot_follow() {
    let app = TestApp::new().await;
    app.create_user("author").await;

    let response = app.post_form("/profile/author/follow/", None, &[]).await;
    assert_eq!(response.status(), StatusCode::FOUND);
    assert_eq!(location(&response), "/auth/login/?next=/profile/author/follow/");

    let subscriptions: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM follows")
        .fetch_one(app.pool())
        .await
        .unwrap();
    assert_eq!(subscriptions, 0);
}
