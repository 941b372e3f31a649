//! Storage ports over the domain types.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use uuid::Uuid;

use crate::domain::{Category, Comment, CommentEntry, FeedEntry, Location, Post, User};
use crate::error::RepoError;

#[async_trait]
pub trait UserRepository: Send + Sync {
    async fn find_by_id(&self, id: Uuid) -> Result<Option<User>, RepoError>;
    async fn find_by_username(&self, username: &str) -> Result<Option<User>, RepoError>;
    async fn find_by_email(&self, email: &str) -> Result<Option<User>, RepoError>;
    async fn insert(&self, user: User) -> Result<User, RepoError>;
    async fn update(&self, user: User) -> Result<User, RepoError>;
}

/// Selection options for post listings.
///
/// `visible_only` applies the public visibility predicate; it is turned
/// off only when an owner views their own content. `with_comment_count`
/// toggles the non-persisted comment-count annotation. `now` is passed
/// in so callers (and tests) control the clock.
#[derive(Debug, Clone)]
pub struct PostFilter {
    pub visible_only: bool,
    pub category_id: Option<Uuid>,
    pub author_id: Option<Uuid>,
    pub with_comment_count: bool,
    pub now: DateTime<Utc>,
}

impl PostFilter {
    /// The public feed: everything visible, comment-counted.
    pub fn public_feed(now: DateTime<Utc>) -> Self {
        Self {
            visible_only: true,
            category_id: None,
            author_id: None,
            with_comment_count: true,
            now,
        }
    }

    pub fn in_category(mut self, category_id: Uuid) -> Self {
        self.category_id = Some(category_id);
        self
    }

    pub fn by_author(mut self, author_id: Uuid) -> Self {
        self.author_id = Some(author_id);
        self
    }

    /// Owner view: no visibility filtering.
    pub fn unfiltered(mut self) -> Self {
        self.visible_only = false;
        self
    }
}

#[async_trait]
pub trait PostRepository: Send + Sync {
    async fn find_by_id(&self, id: Uuid) -> Result<Option<Post>, RepoError>;

    /// A single post joined with display names and comment count,
    /// without visibility filtering. Callers apply the policy.
    async fn find_detail(&self, id: Uuid) -> Result<Option<FeedEntry>, RepoError>;

    /// Number of posts matching the filter.
    async fn count(&self, filter: &PostFilter) -> Result<u64, RepoError>;

    /// A window of matching posts ordered by pub_date descending.
    async fn list(
        &self,
        filter: &PostFilter,
        offset: u64,
        limit: u64,
    ) -> Result<Vec<FeedEntry>, RepoError>;

    async fn insert(&self, post: Post) -> Result<Post, RepoError>;
    async fn update(&self, post: Post) -> Result<Post, RepoError>;
    async fn delete(&self, id: Uuid) -> Result<(), RepoError>;
}

#[async_trait]
pub trait CommentRepository: Send + Sync {
    /// Look up a comment scoped to its post; a matching id under a
    /// different post is not found.
    async fn find_in_post(&self, post_id: Uuid, id: Uuid) -> Result<Option<Comment>, RepoError>;

    /// All comments of a post, oldest first, with author usernames.
    async fn list_for_post(&self, post_id: Uuid) -> Result<Vec<CommentEntry>, RepoError>;

    async fn insert(&self, comment: Comment) -> Result<Comment, RepoError>;
    async fn update(&self, comment: Comment) -> Result<Comment, RepoError>;
    async fn delete(&self, id: Uuid) -> Result<(), RepoError>;
}

#[async_trait]
pub trait CategoryRepository: Send + Sync {
    async fn find_by_id(&self, id: Uuid) -> Result<Option<Category>, RepoError>;
    async fn find_by_slug(&self, slug: &str) -> Result<Option<Category>, RepoError>;
    /// All categories, including unpublished ones (back-office view).
    async fn list(&self) -> Result<Vec<Category>, RepoError>;
    async fn insert(&self, category: Category) -> Result<Category, RepoError>;
    async fn update(&self, category: Category) -> Result<Category, RepoError>;
}

#[async_trait]
pub trait LocationRepository: Send + Sync {
    async fn find_by_id(&self, id: Uuid) -> Result<Option<Location>, RepoError>;
    async fn list(&self) -> Result<Vec<Location>, RepoError>;
    async fn insert(&self, location: Location) -> Result<Location, RepoError>;
    async fn update(&self, location: Location) -> Result<Location, RepoError>;
}
