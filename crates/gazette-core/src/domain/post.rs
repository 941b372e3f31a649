use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Post entity - a dated publication owned by an author.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Post {
    pub id: Uuid,
    pub author_id: Uuid,
    pub category_id: Option<Uuid>,
    pub location_id: Option<Uuid>,
    pub title: String,
    pub text: String,
    pub image_url: Option<String>,
    /// May be in the future for scheduled publications.
    pub pub_date: DateTime<Utc>,
    pub is_published: bool,
    pub created_at: DateTime<Utc>,
}

impl Post {
    /// Create a new post. A missing publication timestamp defaults to
    /// the current time.
    pub fn new(author_id: Uuid, title: String, text: String, pub_date: Option<DateTime<Utc>>) -> Self {
        let now = Utc::now();
        Self {
            id: Uuid::new_v4(),
            author_id,
            category_id: None,
            location_id: None,
            title,
            text,
            image_url: None,
            pub_date: pub_date.unwrap_or(now),
            is_published: true,
            created_at: now,
        }
    }
}

/// A category as seen from a post listing: enough to render a link and
/// to evaluate the visibility predicate.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CategoryTag {
    pub title: String,
    pub slug: String,
    pub is_published: bool,
}

/// One row of a post listing: the post joined with its display names and
/// the non-persisted comment-count annotation.
#[derive(Debug, Clone)]
pub struct FeedEntry {
    pub post: Post,
    pub author_username: String,
    pub category: Option<CategoryTag>,
    pub location_name: Option<String>,
    pub comment_count: u64,
}

impl FeedEntry {
    /// Published flag of the attached category, if any. Feeds the
    /// visibility predicate for detail views.
    pub fn category_is_published(&self) -> Option<bool> {
        self.category.as_ref().map(|c| c.is_published)
    }
}
