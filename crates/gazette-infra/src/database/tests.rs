use std::sync::Arc;

use chrono::{TimeDelta, Utc};
use sea_orm::{DatabaseBackend, MockDatabase, QueryTrait};
use uuid::Uuid;

use gazette_core::domain::Post;
use gazette_core::ports::{PostFilter, PostRepository, UserRepository};

use super::entity::{post, user};
use super::post_query;
use super::repos::{PostgresPostRepository, PostgresUserRepository};

#[tokio::test]
async fn find_post_by_id_maps_to_domain() {
    let post_id = Uuid::new_v4();
    let author_id = Uuid::new_v4();
    let now = Utc::now();

    let db = MockDatabase::new(DatabaseBackend::Postgres)
        .append_query_results(vec![vec![post::Model {
            id: post_id,
            author_id,
            category_id: None,
            location_id: None,
            title: "Test Post".to_owned(),
            text: "Content".to_owned(),
            image_url: None,
            pub_date: now.into(),
            is_published: true,
            created_at: now.into(),
        }]])
        .into_connection();

    let repo = PostgresPostRepository::new(Arc::new(db));

    let result: Option<Post> = repo.find_by_id(post_id).await.unwrap();

    let found = result.unwrap();
    assert_eq!(found.title, "Test Post");
    assert_eq!(found.id, post_id);
    assert_eq!(found.author_id, author_id);
    assert!(found.category_id.is_none());
}

#[tokio::test]
async fn find_user_by_username_filters_on_username() {
    let db = MockDatabase::new(DatabaseBackend::Postgres)
        .append_query_results(vec![Vec::<user::Model>::new()])
        .into_connection();

    let repo = PostgresUserRepository::new(Arc::new(db));
    let result = repo.find_by_username("tourist").await.unwrap();
    assert!(result.is_none());
}

#[tokio::test]
async fn repositories_share_one_connection_handle() {
    let db = Arc::new(
        MockDatabase::new(DatabaseBackend::Postgres)
            .append_query_results(vec![Vec::<user::Model>::new()])
            .append_query_results(vec![Vec::<post::Model>::new()])
            .into_connection(),
    );

    let users = PostgresUserRepository::new(db.clone());
    let posts = PostgresPostRepository::new(db);

    assert!(users.find_by_username("tourist").await.unwrap().is_none());
    assert!(posts.find_by_id(Uuid::new_v4()).await.unwrap().is_none());
}

#[test]
fn feed_select_renders_visibility_predicate() {
    let now = Utc::now();
    let sql = post_query::feed_select(&PostFilter::public_feed(now))
        .build(DatabaseBackend::Postgres)
        .to_string();

    assert!(sql.contains(r#""posts"."is_published" = TRUE"#), "{sql}");
    assert!(sql.contains(r#""posts"."pub_date" <="#), "{sql}");
    assert!(sql.contains(r#""posts"."category_id" IS NULL"#), "{sql}");
    assert!(sql.contains(r#""categories"."is_published" = TRUE"#), "{sql}");
    assert!(sql.contains(r#"ORDER BY "posts"."pub_date" DESC"#), "{sql}");
}

#[test]
fn unfiltered_owner_select_skips_the_predicate() {
    let now = Utc::now();
    let author = Uuid::new_v4();
    let filter = PostFilter::public_feed(now).by_author(author).unfiltered();
    let sql = post_query::feed_select(&filter)
        .build(DatabaseBackend::Postgres)
        .to_string();

    // The column still appears in the SELECT list; only the predicate
    // must be gone.
    assert!(!sql.contains(r#""posts"."is_published" = TRUE"#), "{sql}");
    assert!(!sql.contains(r#""posts"."pub_date" <="#), "{sql}");
    assert!(sql.contains(r#""posts"."author_id" ="#), "{sql}");
}

#[test]
fn category_restriction_is_applied() {
    let now = Utc::now() - TimeDelta::minutes(1);
    let category = Uuid::new_v4();
    let sql = post_query::feed_select(&PostFilter::public_feed(now).in_category(category))
        .build(DatabaseBackend::Postgres)
        .to_string();

    assert!(sql.contains(r#""posts"."category_id" ="#), "{sql}");
}

#[tokio::test]
async fn comment_counts_short_circuits_on_empty_page() {
    let db = MockDatabase::new(DatabaseBackend::Postgres).into_connection();

    let counts = post_query::comment_counts(&db, &[]).await.unwrap();
    assert!(counts.is_empty());
    // No query must have been issued.
    assert!(db.into_transaction_log().is_empty());
}
