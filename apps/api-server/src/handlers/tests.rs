//! Handler flow tests over in-memory repositories.

use std::sync::{Arc, Mutex};

use actix_web::dev::{Service, ServiceResponse};
use actix_web::http::{StatusCode, header};
use actix_web::{App, test, web};
use async_trait::async_trait;
use chrono::{TimeDelta, Utc};
use uuid::Uuid;

use gazette_core::domain::{
    Category, Comment, CommentEntry, FeedEntry, Location, Post, User,
};
use gazette_core::ports::{
    CategoryRepository, CommentRepository, LocationRepository, PasswordService, PostFilter,
    PostRepository, TokenService, UserRepository,
};
use gazette_core::visibility;
use gazette_core::RepoError;
use gazette_infra::auth::{JwtConfig, JwtTokenService};
use gazette_infra::Argon2PasswordService;
use gazette_shared::dto::{
    CategoryPageResponse, PageResponse, PostDetailResponse, PostResponse, ProfileResponse,
};
use gazette_shared::ApiResponse;

use crate::state::AppState;

#[derive(Default)]
struct World {
    users: Mutex<Vec<User>>,
    posts: Mutex<Vec<Post>>,
    comments: Mutex<Vec<Comment>>,
    categories: Mutex<Vec<Category>>,
    locations: Mutex<Vec<Location>>,
}

impl World {
    fn category_published(&self, post: &Post) -> Option<bool> {
        let category_id = post.category_id?;
        self.categories
            .lock()
            .unwrap()
            .iter()
            .find(|c| c.id == category_id)
            .map(|c| c.is_published)
    }

    fn matches(&self, post: &Post, filter: &PostFilter) -> bool {
        if let Some(author_id) = filter.author_id {
            if post.author_id != author_id {
                return false;
            }
        }
        if let Some(category_id) = filter.category_id {
            if post.category_id != Some(category_id) {
                return false;
            }
        }
        if filter.visible_only {
            return visibility::post_is_visible(post, self.category_published(post), filter.now);
        }
        true
    }

    fn entry(&self, post: Post) -> FeedEntry {
        let author_username = self
            .users
            .lock()
            .unwrap()
            .iter()
            .find(|u| u.id == post.author_id)
            .map(|u| u.username.clone())
            .unwrap_or_default();
        let category = post.category_id.and_then(|id| {
            self.categories
                .lock()
                .unwrap()
                .iter()
                .find(|c| c.id == id)
                .map(|c| gazette_core::domain::CategoryTag {
                    title: c.title.clone(),
                    slug: c.slug.clone(),
                    is_published: c.is_published,
                })
        });
        let location_name = post.location_id.and_then(|id| {
            self.locations
                .lock()
                .unwrap()
                .iter()
                .find(|l| l.id == id)
                .map(|l| l.name.clone())
        });
        let comment_count = self
            .comments
            .lock()
            .unwrap()
            .iter()
            .filter(|c| c.post_id == post.id)
            .count() as u64;

        FeedEntry {
            post,
            author_username,
            category,
            location_name,
            comment_count,
        }
    }
}

struct MemUsers(Arc<World>);

#[async_trait]
impl UserRepository for MemUsers {
    async fn find_by_id(&self, id: Uuid) -> Result<Option<User>, RepoError> {
        Ok(self.0.users.lock().unwrap().iter().find(|u| u.id == id).cloned())
    }

    async fn find_by_username(&self, username: &str) -> Result<Option<User>, RepoError> {
        Ok(self
            .0
            .users
            .lock()
            .unwrap()
            .iter()
            .find(|u| u.username == username)
            .cloned())
    }

    async fn find_by_email(&self, email: &str) -> Result<Option<User>, RepoError> {
        Ok(self
            .0
            .users
            .lock()
            .unwrap()
            .iter()
            .find(|u| u.email == email)
            .cloned())
    }

    async fn insert(&self, user: User) -> Result<User, RepoError> {
        self.0.users.lock().unwrap().push(user.clone());
        Ok(user)
    }

    async fn update(&self, user: User) -> Result<User, RepoError> {
        let mut users = self.0.users.lock().unwrap();
        let existing = users
            .iter_mut()
            .find(|u| u.id == user.id)
            .ok_or(RepoError::NotFound)?;
        *existing = user.clone();
        Ok(user)
    }
}

struct MemPosts(Arc<World>);

#[async_trait]
impl PostRepository for MemPosts {
    async fn find_by_id(&self, id: Uuid) -> Result<Option<Post>, RepoError> {
        Ok(self.0.posts.lock().unwrap().iter().find(|p| p.id == id).cloned())
    }

    async fn find_detail(&self, id: Uuid) -> Result<Option<FeedEntry>, RepoError> {
        let post = self.0.posts.lock().unwrap().iter().find(|p| p.id == id).cloned();
        Ok(post.map(|p| self.0.entry(p)))
    }

    async fn count(&self, filter: &PostFilter) -> Result<u64, RepoError> {
        Ok(self
            .0
            .posts
            .lock()
            .unwrap()
            .iter()
            .filter(|p| self.0.matches(p, filter))
            .count() as u64)
    }

    async fn list(
        &self,
        filter: &PostFilter,
        offset: u64,
        limit: u64,
    ) -> Result<Vec<FeedEntry>, RepoError> {
        let mut matching: Vec<Post> = self
            .0
            .posts
            .lock()
            .unwrap()
            .iter()
            .filter(|p| self.0.matches(p, filter))
            .cloned()
            .collect();
        matching.sort_by(|a, b| b.pub_date.cmp(&a.pub_date));

        Ok(matching
            .into_iter()
            .skip(offset as usize)
            .take(limit as usize)
            .map(|p| self.0.entry(p))
            .collect())
    }

    async fn insert(&self, post: Post) -> Result<Post, RepoError> {
        self.0.posts.lock().unwrap().push(post.clone());
        Ok(post)
    }

    async fn update(&self, post: Post) -> Result<Post, RepoError> {
        let mut posts = self.0.posts.lock().unwrap();
        let existing = posts
            .iter_mut()
            .find(|p| p.id == post.id)
            .ok_or(RepoError::NotFound)?;
        *existing = post.clone();
        Ok(post)
    }

    async fn delete(&self, id: Uuid) -> Result<(), RepoError> {
        let mut posts = self.0.posts.lock().unwrap();
        let before = posts.len();
        posts.retain(|p| p.id != id);
        if posts.len() == before {
            return Err(RepoError::NotFound);
        }
        self.0.comments.lock().unwrap().retain(|c| c.post_id != id);
        Ok(())
    }
}

struct MemComments(Arc<World>);

#[async_trait]
impl CommentRepository for MemComments {
    async fn find_in_post(&self, post_id: Uuid, id: Uuid) -> Result<Option<Comment>, RepoError> {
        Ok(self
            .0
            .comments
            .lock()
            .unwrap()
            .iter()
            .find(|c| c.id == id && c.post_id == post_id)
            .cloned())
    }

    async fn list_for_post(&self, post_id: Uuid) -> Result<Vec<CommentEntry>, RepoError> {
        let mut comments: Vec<Comment> = self
            .0
            .comments
            .lock()
            .unwrap()
            .iter()
            .filter(|c| c.post_id == post_id)
            .cloned()
            .collect();
        comments.sort_by_key(|c| c.created_at);

        Ok(comments
            .into_iter()
            .map(|comment| {
                let author_username = self
                    .0
                    .users
                    .lock()
                    .unwrap()
                    .iter()
                    .find(|u| u.id == comment.author_id)
                    .map(|u| u.username.clone())
                    .unwrap_or_default();
                CommentEntry {
                    comment,
                    author_username,
                }
            })
            .collect())
    }

    async fn insert(&self, comment: Comment) -> Result<Comment, RepoError> {
        self.0.comments.lock().unwrap().push(comment.clone());
        Ok(comment)
    }

    async fn update(&self, comment: Comment) -> Result<Comment, RepoError> {
        let mut comments = self.0.comments.lock().unwrap();
        let existing = comments
            .iter_mut()
            .find(|c| c.id == comment.id)
            .ok_or(RepoError::NotFound)?;
        *existing = comment.clone();
        Ok(comment)
    }

    async fn delete(&self, id: Uuid) -> Result<(), RepoError> {
        let mut comments = self.0.comments.lock().unwrap();
        let before = comments.len();
        comments.retain(|c| c.id != id);
        if comments.len() == before {
            return Err(RepoError::NotFound);
        }
        Ok(())
    }
}

struct MemCategories(Arc<World>);

#[async_trait]
impl CategoryRepository for MemCategories {
    async fn find_by_id(&self, id: Uuid) -> Result<Option<Category>, RepoError> {
        Ok(self
            .0
            .categories
            .lock()
            .unwrap()
            .iter()
            .find(|c| c.id == id)
            .cloned())
    }

    async fn find_by_slug(&self, slug: &str) -> Result<Option<Category>, RepoError> {
        Ok(self
            .0
            .categories
            .lock()
            .unwrap()
            .iter()
            .find(|c| c.slug == slug)
            .cloned())
    }

    async fn list(&self) -> Result<Vec<Category>, RepoError> {
        Ok(self.0.categories.lock().unwrap().clone())
    }

    async fn insert(&self, category: Category) -> Result<Category, RepoError> {
        self.0.categories.lock().unwrap().push(category.clone());
        Ok(category)
    }

    async fn update(&self, category: Category) -> Result<Category, RepoError> {
        let mut categories = self.0.categories.lock().unwrap();
        let existing = categories
            .iter_mut()
            .find(|c| c.id == category.id)
            .ok_or(RepoError::NotFound)?;
        *existing = category.clone();
        Ok(category)
    }
}

struct MemLocations(Arc<World>);

#[async_trait]
impl LocationRepository for MemLocations {
    async fn find_by_id(&self, id: Uuid) -> Result<Option<Location>, RepoError> {
        Ok(self
            .0
            .locations
            .lock()
            .unwrap()
            .iter()
            .find(|l| l.id == id)
            .cloned())
    }

    async fn list(&self) -> Result<Vec<Location>, RepoError> {
        Ok(self.0.locations.lock().unwrap().clone())
    }

    async fn insert(&self, location: Location) -> Result<Location, RepoError> {
        self.0.locations.lock().unwrap().push(location.clone());
        Ok(location)
    }

    async fn update(&self, location: Location) -> Result<Location, RepoError> {
        let mut locations = self.0.locations.lock().unwrap();
        let existing = locations
            .iter_mut()
            .find(|l| l.id == location.id)
            .ok_or(RepoError::NotFound)?;
        *existing = location.clone();
        Ok(location)
    }
}

const TEST_PAGE_SIZE: u64 = 10;

fn jwt_config() -> JwtConfig {
    JwtConfig {
        secret: "handler-test-secret".to_string(),
        expiration_hours: 1,
        issuer: "gazette-test".to_string(),
    }
}

fn token_for(user: &User) -> String {
    JwtTokenService::new(jwt_config())
        .generate_token(user.id, &user.username, user.roles())
        .unwrap()
}

fn bearer(user: &User) -> (header::HeaderName, String) {
    (header::AUTHORIZATION, format!("Bearer {}", token_for(user)))
}

async fn init_app(
    world: Arc<World>,
) -> impl Service<actix_http::Request, Response = ServiceResponse, Error = actix_web::Error> {
    let state = AppState {
        users: Arc::new(MemUsers(world.clone())),
        posts: Arc::new(MemPosts(world.clone())),
        comments: Arc::new(MemComments(world.clone())),
        categories: Arc::new(MemCategories(world.clone())),
        locations: Arc::new(MemLocations(world)),
        page_size: TEST_PAGE_SIZE,
    };
    let token_service: web::Data<Arc<dyn TokenService>> =
        web::Data::new(Arc::new(JwtTokenService::new(jwt_config())));
    let password_service: web::Data<Arc<dyn PasswordService>> =
        web::Data::new(Arc::new(Argon2PasswordService::new()));

    test::init_service(
        App::new()
            .app_data(web::Data::new(state))
            .app_data(token_service)
            .app_data(password_service)
            .app_data(crate::not_found_path_config())
            .configure(super::configure_routes)
            .default_service(web::route().to(super::not_found)),
    )
    .await
}

fn seed_user(world: &World, username: &str) -> User {
    let user = User::new(
        username.to_string(),
        format!("{username}@example.com"),
        "x".to_string(),
    );
    world.users.lock().unwrap().push(user.clone());
    user
}

fn seed_staff(world: &World, username: &str) -> User {
    let mut user = User::new(
        username.to_string(),
        format!("{username}@example.com"),
        "x".to_string(),
    );
    user.is_staff = true;
    world.users.lock().unwrap().push(user.clone());
    user
}

fn seed_category(world: &World, slug: &str, is_published: bool) -> Category {
    let mut category = Category::new(slug.to_string(), "about it".to_string(), slug.to_string());
    category.is_published = is_published;
    world.categories.lock().unwrap().push(category.clone());
    category
}

fn seed_post(world: &World, author: &User, title: &str, hours_ago: i64) -> Post {
    let post = Post::new(
        author.id,
        title.to_string(),
        "text".to_string(),
        Some(Utc::now() - TimeDelta::hours(hours_ago)),
    );
    world.posts.lock().unwrap().push(post.clone());
    post
}

fn seed_comment(world: &World, post: &Post, author: &User, text: &str) -> Comment {
    let comment = Comment::new(post.id, author.id, text.to_string());
    world.comments.lock().unwrap().push(comment.clone());
    comment
}

async fn feed_titles(
    app: &impl Service<actix_http::Request, Response = ServiceResponse, Error = actix_web::Error>,
    uri: &str,
) -> Vec<String> {
    let req = test::TestRequest::get().uri(uri).to_request();
    let body: ApiResponse<PageResponse<PostResponse>> =
        test::read_body_json(test::call_service(app, req).await).await;
    body.data
        .unwrap()
        .items
        .into_iter()
        .map(|p| p.title)
        .collect()
}

#[actix_rt::test]
async fn index_shows_only_visible_posts() {
    let world = Arc::new(World::default());
    let alice = seed_user(&world, "alice");
    let hidden_cat = seed_category(&world, "drafts", false);

    seed_post(&world, &alice, "visible", 1);

    let future = Post::new(
        alice.id,
        "future".to_string(),
        "text".to_string(),
        Some(Utc::now() + TimeDelta::hours(1)),
    );
    let mut unpublished = Post::new(alice.id, "unpublished".to_string(), "text".to_string(), None);
    unpublished.is_published = false;
    let mut categorized = Post::new(
        alice.id,
        "hidden-category".to_string(),
        "text".to_string(),
        None,
    );
    categorized.category_id = Some(hidden_cat.id);
    world
        .posts
        .lock()
        .unwrap()
        .extend([future, unpublished, categorized]);

    let app = init_app(world).await;
    let titles = feed_titles(&app, "/").await;
    assert_eq!(titles, vec!["visible".to_string()]);
}

#[actix_rt::test]
async fn unpublishing_category_hides_posts_except_on_own_profile() {
    let world = Arc::new(World::default());
    let alice = seed_user(&world, "alice");
    let category = seed_category(&world, "travel", true);

    let mut post = seed_post(&world, &alice, "trip", 1);
    post.category_id = Some(category.id);
    world.posts.lock().unwrap().retain(|p| p.id != post.id);
    world.posts.lock().unwrap().push(post);

    let app = init_app(world.clone()).await;

    assert_eq!(feed_titles(&app, "/").await, vec!["trip".to_string()]);

    let req = test::TestRequest::get()
        .uri("/category/travel/")
        .to_request();
    let body: ApiResponse<CategoryPageResponse> =
        test::read_body_json(test::call_service(&app, req).await).await;
    let page = body.data.unwrap();
    assert_eq!(page.category.slug, "travel");
    assert_eq!(page.posts.items.len(), 1);

    // The back office unpublishes the category.
    world.categories.lock().unwrap()[0].is_published = false;

    assert!(feed_titles(&app, "/").await.is_empty());

    let req = test::TestRequest::get()
        .uri("/category/travel/")
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::NOT_FOUND);

    // The author still sees it on their own profile.
    let req = test::TestRequest::get()
        .uri("/profile/alice/")
        .insert_header(bearer(&alice))
        .to_request();
    let body: ApiResponse<ProfileResponse> =
        test::read_body_json(test::call_service(&app, req).await).await;
    assert_eq!(body.data.unwrap().posts.items.len(), 1);

    // Anonymous viewers do not.
    let req = test::TestRequest::get().uri("/profile/alice/").to_request();
    let body: ApiResponse<ProfileResponse> =
        test::read_body_json(test::call_service(&app, req).await).await;
    assert!(body.data.unwrap().posts.items.is_empty());
}

#[actix_rt::test]
async fn own_profile_shows_everything() {
    let world = Arc::new(World::default());
    let alice = seed_user(&world, "alice");
    let bob = seed_user(&world, "bob");

    seed_post(&world, &alice, "old", 5);
    let future = Post::new(
        alice.id,
        "scheduled".to_string(),
        "text".to_string(),
        Some(Utc::now() + TimeDelta::days(1)),
    );
    world.posts.lock().unwrap().push(future);

    let app = init_app(world).await;

    let req = test::TestRequest::get()
        .uri("/profile/alice/")
        .insert_header(bearer(&alice))
        .to_request();
    let body: ApiResponse<ProfileResponse> =
        test::read_body_json(test::call_service(&app, req).await).await;
    assert_eq!(body.data.unwrap().posts.items.len(), 2);

    let req = test::TestRequest::get()
        .uri("/profile/alice/")
        .insert_header(bearer(&bob))
        .to_request();
    let body: ApiResponse<ProfileResponse> =
        test::read_body_json(test::call_service(&app, req).await).await;
    let items = body.data.unwrap().posts.items;
    assert_eq!(items.len(), 1);
    assert_eq!(items[0].title, "old");
}

#[actix_rt::test]
async fn pagination_windows_and_clamping() {
    let world = Arc::new(World::default());
    let alice = seed_user(&world, "alice");
    for i in 0..25 {
        seed_post(&world, &alice, &format!("post-{i}"), i);
    }

    let app = init_app(world).await;

    let req = test::TestRequest::get().uri("/?page=2").to_request();
    let body: ApiResponse<PageResponse<PostResponse>> =
        test::read_body_json(test::call_service(&app, req).await).await;
    let page = body.data.unwrap();
    assert_eq!(page.page, 2);
    assert_eq!(page.items.len(), 10);
    assert_eq!(page.total_pages, 3);
    assert_eq!(page.total_items, 25);
    assert!(page.has_next);
    assert!(page.has_previous);
    // Newest first: page 2 starts after the ten most recent posts.
    assert_eq!(page.items[0].title, "post-10");

    // Out-of-range pages clamp to the last page, never an error.
    let req = test::TestRequest::get().uri("/?page=99").to_request();
    let body: ApiResponse<PageResponse<PostResponse>> =
        test::read_body_json(test::call_service(&app, req).await).await;
    let page = body.data.unwrap();
    assert_eq!(page.page, 3);
    assert_eq!(page.items.len(), 5);
    assert!(!page.has_next);

    // Junk page parameters mean page 1.
    let req = test::TestRequest::get().uri("/?page=abc").to_request();
    let body: ApiResponse<PageResponse<PostResponse>> =
        test::read_body_json(test::call_service(&app, req).await).await;
    assert_eq!(body.data.unwrap().page, 1);
}

#[actix_rt::test]
async fn detail_applies_owner_override() {
    let world = Arc::new(World::default());
    let alice = seed_user(&world, "alice");
    let bob = seed_user(&world, "bob");
    let scheduled = Post::new(
        alice.id,
        "scheduled".to_string(),
        "text".to_string(),
        Some(Utc::now() + TimeDelta::days(1)),
    );
    world.posts.lock().unwrap().push(scheduled.clone());

    let app = init_app(world).await;
    let uri = format!("/posts/{}/", scheduled.id);

    // The author sees their scheduled post.
    let req = test::TestRequest::get()
        .uri(&uri)
        .insert_header(bearer(&alice))
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::OK);
    let body: ApiResponse<PostDetailResponse> = test::read_body_json(resp).await;
    assert_eq!(body.data.unwrap().post.title, "scheduled");

    // Everyone else gets a 404.
    let req = test::TestRequest::get()
        .uri(&uri)
        .insert_header(bearer(&bob))
        .to_request();
    assert_eq!(
        test::call_service(&app, req).await.status(),
        StatusCode::NOT_FOUND
    );

    let req = test::TestRequest::get().uri(&uri).to_request();
    assert_eq!(
        test::call_service(&app, req).await.status(),
        StatusCode::NOT_FOUND
    );
}

#[actix_rt::test]
async fn create_post_defaults_pub_date_to_now() {
    let world = Arc::new(World::default());
    let alice = seed_user(&world, "alice");
    let app = init_app(world.clone()).await;

    let req = test::TestRequest::post()
        .uri("/posts/create/")
        .insert_header(bearer(&alice))
        .set_json(serde_json::json!({"title": "fresh", "text": "hello"}))
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::CREATED);

    let body: ApiResponse<PostResponse> = test::read_body_json(resp).await;
    let created = body.data.unwrap();
    assert_eq!(created.author, "alice");
    let age = Utc::now() - created.pub_date;
    assert!(age >= TimeDelta::zero() && age < TimeDelta::seconds(5));

    assert_eq!(world.posts.lock().unwrap().len(), 1);
}

#[actix_rt::test]
async fn unauthenticated_mutation_redirects_to_login() {
    let world = Arc::new(World::default());
    let app = init_app(world).await;

    let req = test::TestRequest::post()
        .uri("/posts/create/")
        .set_json(serde_json::json!({"title": "t", "text": "x"}))
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::FOUND);
    assert_eq!(
        resp.headers().get(header::LOCATION).unwrap(),
        "/auth/login/"
    );
}

#[actix_rt::test]
async fn non_author_edit_redirects_without_mutation() {
    let world = Arc::new(World::default());
    let alice = seed_user(&world, "alice");
    let bob = seed_user(&world, "bob");
    let post = seed_post(&world, &alice, "original", 1);

    let app = init_app(world.clone()).await;

    let req = test::TestRequest::post()
        .uri(&format!("/posts/{}/edit/", post.id))
        .insert_header(bearer(&bob))
        .set_json(serde_json::json!({"title": "hijacked", "text": "x"}))
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::FOUND);
    assert_eq!(
        resp.headers().get(header::LOCATION).unwrap().to_str().unwrap(),
        format!("/posts/{}/", post.id)
    );

    assert_eq!(world.posts.lock().unwrap()[0].title, "original");
}

#[actix_rt::test]
async fn non_author_comment_delete_redirects_and_keeps_comment() {
    let world = Arc::new(World::default());
    let alice = seed_user(&world, "alice");
    let bob = seed_user(&world, "bob");
    let post = seed_post(&world, &alice, "post", 1);
    let comment = seed_comment(&world, &post, &alice, "mine");

    let app = init_app(world.clone()).await;

    let req = test::TestRequest::post()
        .uri(&format!("/posts/{}/delete_comment/{}/", post.id, comment.id))
        .insert_header(bearer(&bob))
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::FOUND);
    assert_eq!(
        resp.headers().get(header::LOCATION).unwrap().to_str().unwrap(),
        format!("/posts/{}/", post.id)
    );

    assert_eq!(world.comments.lock().unwrap().len(), 1);
}

#[actix_rt::test]
async fn owner_can_delete_their_post() {
    let world = Arc::new(World::default());
    let alice = seed_user(&world, "alice");
    let post = seed_post(&world, &alice, "bye", 1);
    seed_comment(&world, &post, &alice, "gone too");

    let app = init_app(world.clone()).await;

    let req = test::TestRequest::post()
        .uri(&format!("/posts/{}/delete/", post.id))
        .insert_header(bearer(&alice))
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::OK);

    assert!(world.posts.lock().unwrap().is_empty());
    assert!(world.comments.lock().unwrap().is_empty());
}

#[actix_rt::test]
async fn comments_appear_on_detail_in_order() {
    let world = Arc::new(World::default());
    let alice = seed_user(&world, "alice");
    let bob = seed_user(&world, "bob");
    let post = seed_post(&world, &alice, "post", 1);
    seed_comment(&world, &post, &alice, "first");
    seed_comment(&world, &post, &bob, "second");

    let app = init_app(world).await;

    let req = test::TestRequest::get()
        .uri(&format!("/posts/{}/", post.id))
        .to_request();
    let body: ApiResponse<PostDetailResponse> =
        test::read_body_json(test::call_service(&app, req).await).await;
    let detail = body.data.unwrap();
    assert_eq!(detail.post.comment_count, 2);
    let texts: Vec<_> = detail.comments.iter().map(|c| c.text.as_str()).collect();
    assert_eq!(texts, vec!["first", "second"]);
    assert_eq!(detail.comments[1].author, "bob");
}

#[actix_rt::test]
async fn admin_routes_require_the_staff_role() {
    let world = Arc::new(World::default());
    let alice = seed_user(&world, "alice");
    let root = seed_staff(&world, "root");

    let app = init_app(world.clone()).await;

    let req = test::TestRequest::get()
        .uri("/admin/categories/")
        .insert_header(bearer(&alice))
        .to_request();
    assert_eq!(
        test::call_service(&app, req).await.status(),
        StatusCode::FORBIDDEN
    );

    let req = test::TestRequest::post()
        .uri("/admin/categories/")
        .insert_header(bearer(&root))
        .set_json(serde_json::json!({
            "title": "Travel",
            "description": "On the road",
            "slug": "travel"
        }))
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::CREATED);
    assert_eq!(world.categories.lock().unwrap().len(), 1);

    // Slugs are unique.
    let req = test::TestRequest::post()
        .uri("/admin/categories/")
        .insert_header(bearer(&root))
        .set_json(serde_json::json!({
            "title": "Travel again",
            "description": "dup",
            "slug": "travel"
        }))
        .to_request();
    assert_eq!(
        test::call_service(&app, req).await.status(),
        StatusCode::CONFLICT
    );
}

#[actix_rt::test]
async fn malformed_post_id_is_a_404() {
    let world = Arc::new(World::default());
    let app = init_app(world).await;

    let req = test::TestRequest::get()
        .uri("/posts/not-a-uuid/")
        .to_request();
    assert_eq!(
        test::call_service(&app, req).await.status(),
        StatusCode::NOT_FOUND
    );
}

#[actix_rt::test]
async fn short_multibyte_password_is_rejected() {
    let world = Arc::new(World::default());
    let app = init_app(world.clone()).await;

    // Five characters, ten bytes: the length rule counts characters.
    let req = test::TestRequest::post()
        .uri("/auth/registration/")
        .set_json(serde_json::json!({
            "username": "carol",
            "email": "carol@example.com",
            "password": "ééééé"
        }))
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::UNPROCESSABLE_ENTITY);
    assert!(world.users.lock().unwrap().is_empty());
}

#[actix_rt::test]
async fn registration_and_login_round_trip() {
    let world = Arc::new(World::default());
    let app = init_app(world.clone()).await;

    let req = test::TestRequest::post()
        .uri("/auth/registration/")
        .set_json(serde_json::json!({
            "username": "carol",
            "email": "carol@example.com",
            "password": "correct-horse"
        }))
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::CREATED);
    assert_eq!(world.users.lock().unwrap().len(), 1);

    let req = test::TestRequest::post()
        .uri("/auth/login/")
        .set_json(serde_json::json!({
            "username": "carol",
            "password": "correct-horse"
        }))
        .to_request();
    assert_eq!(test::call_service(&app, req).await.status(), StatusCode::OK);

    let req = test::TestRequest::post()
        .uri("/auth/login/")
        .set_json(serde_json::json!({
            "username": "carol",
            "password": "wrong"
        }))
        .to_request();
    assert_eq!(
        test::call_service(&app, req).await.status(),
        StatusCode::UNAUTHORIZED
    );
}
