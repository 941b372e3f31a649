//! The post visibility policy.
//!
//! A post is publicly visible when it is published, its publication
//! timestamp is not in the future, and its category (if it has one) is
//! itself published. Owners bypass the policy for their own posts.
//!
//! Set queries render the same predicate in SQL next to the post
//! queries in `gazette-infra`; this module is the single-row form used
//! for detail views and in tests.

use chrono::{DateTime, Utc};
use uuid::Uuid;

use crate::domain::Post;

/// Public visibility predicate.
///
/// `category_is_published` is `None` when the post has no category,
/// which never hides the post.
pub fn post_is_visible(post: &Post, category_is_published: Option<bool>, now: DateTime<Utc>) -> bool {
    post.is_published && post.pub_date <= now && category_is_published.unwrap_or(true)
}

/// Owner-override combinator: the author always sees their own post,
/// everyone else goes through [`post_is_visible`].
pub fn viewer_can_see(
    post: &Post,
    viewer: Option<Uuid>,
    category_is_published: Option<bool>,
    now: DateTime<Utc>,
) -> bool {
    viewer == Some(post.author_id) || post_is_visible(post, category_is_published, now)
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeDelta;

    fn post_published_at(pub_date: DateTime<Utc>) -> Post {
        Post::new(Uuid::new_v4(), "title".into(), "text".into(), Some(pub_date))
    }

    #[test]
    fn published_past_post_without_category_is_visible() {
        let now = Utc::now();
        let post = post_published_at(now - TimeDelta::hours(1));
        assert!(post_is_visible(&post, None, now));
    }

    #[test]
    fn future_dated_post_is_hidden() {
        let now = Utc::now();
        let post = post_published_at(now + TimeDelta::hours(1));
        assert!(!post_is_visible(&post, None, now));
    }

    #[test]
    fn pub_date_equal_to_now_is_visible() {
        let now = Utc::now();
        let post = post_published_at(now);
        assert!(post_is_visible(&post, None, now));
    }

    #[test]
    fn unpublished_post_is_hidden() {
        let now = Utc::now();
        let mut post = post_published_at(now - TimeDelta::hours(1));
        post.is_published = false;
        assert!(!post_is_visible(&post, None, now));
    }

    #[test]
    fn unpublished_category_hides_the_post() {
        let now = Utc::now();
        let post = post_published_at(now - TimeDelta::hours(1));
        assert!(post_is_visible(&post, Some(true), now));
        assert!(!post_is_visible(&post, Some(false), now));
    }

    #[test]
    fn author_sees_their_hidden_post() {
        let now = Utc::now();
        let mut post = post_published_at(now + TimeDelta::days(3));
        post.is_published = false;
        let author = post.author_id;

        assert!(viewer_can_see(&post, Some(author), Some(false), now));
        assert!(!viewer_can_see(&post, Some(Uuid::new_v4()), Some(false), now));
        assert!(!viewer_can_see(&post, None, Some(false), now));
    }
}
