//! Post listing queries.
//!
//! The SQL rendition of the visibility policy from
//! `gazette_core::visibility`, plus the joins that pull in author,
//! category and location display names and the comment-count
//! annotation.

use std::collections::HashMap;

use chrono::{DateTime, Utc};
use sea_orm::prelude::DateTimeWithTimeZone;
use sea_orm::{
    ColumnTrait, Condition, DbConn, DbErr, EntityTrait, FromQueryResult, JoinType, QueryFilter,
    QueryOrder, QuerySelect, RelationTrait, Select,
};
use uuid::Uuid;

use gazette_core::domain::{CategoryTag, FeedEntry, Post};
use gazette_core::ports::PostFilter;

use super::entity::{category, comment, location, post, user};

/// Public visibility: published, not future-dated, and either
/// uncategorized or filed under a published category.
pub(crate) fn visible_condition(now: DateTime<Utc>) -> Condition {
    let now: DateTimeWithTimeZone = now.into();
    Condition::all()
        .add(post::Column::IsPublished.eq(true))
        .add(post::Column::PubDate.lte(now))
        .add(
            Condition::any()
                .add(post::Column::CategoryId.is_null())
                .add(category::Column::IsPublished.eq(true)),
        )
}

/// Posts joined with their author, category and location rows.
pub(crate) fn joined_select() -> Select<post::Entity> {
    post::Entity::find()
        .join(JoinType::InnerJoin, post::Relation::Author.def())
        .join(JoinType::LeftJoin, post::Relation::Category.def())
        .join(JoinType::LeftJoin, post::Relation::Location.def())
}

/// The filtered, ordered feed selection.
pub(crate) fn feed_select(filter: &PostFilter) -> Select<post::Entity> {
    let mut select = joined_select();

    if filter.visible_only {
        select = select.filter(visible_condition(filter.now));
    }
    if let Some(category_id) = filter.category_id {
        select = select.filter(post::Column::CategoryId.eq(category_id));
    }
    if let Some(author_id) = filter.author_id {
        select = select.filter(post::Column::AuthorId.eq(author_id));
    }

    select.order_by_desc(post::Column::PubDate)
}

/// Select the joined display columns alongside the post columns.
pub(crate) fn with_display_columns(select: Select<post::Entity>) -> Select<post::Entity> {
    select
        .column_as(user::Column::Username, "author_username")
        .column_as(category::Column::Title, "category_title")
        .column_as(category::Column::Slug, "category_slug")
        .column_as(category::Column::IsPublished, "category_is_published")
        .column_as(location::Column::Name, "location_name")
}

/// One joined row of a post listing.
#[derive(Debug, FromQueryResult)]
pub(crate) struct PostRow {
    pub id: Uuid,
    pub author_id: Uuid,
    pub category_id: Option<Uuid>,
    pub location_id: Option<Uuid>,
    pub title: String,
    pub text: String,
    pub image_url: Option<String>,
    pub pub_date: DateTimeWithTimeZone,
    pub is_published: bool,
    pub created_at: DateTimeWithTimeZone,
    pub author_username: String,
    pub category_title: Option<String>,
    pub category_slug: Option<String>,
    pub category_is_published: Option<bool>,
    pub location_name: Option<String>,
}

impl PostRow {
    pub(crate) fn into_feed_entry(self, comment_count: u64) -> FeedEntry {
        let category = match (
            self.category_title,
            self.category_slug,
            self.category_is_published,
        ) {
            (Some(title), Some(slug), Some(is_published)) => Some(CategoryTag {
                title,
                slug,
                is_published,
            }),
            _ => None,
        };

        FeedEntry {
            post: Post {
                id: self.id,
                author_id: self.author_id,
                category_id: self.category_id,
                location_id: self.location_id,
                title: self.title,
                text: self.text,
                image_url: self.image_url,
                pub_date: self.pub_date.into(),
                is_published: self.is_published,
                created_at: self.created_at.into(),
            },
            author_username: self.author_username,
            category,
            location_name: self.location_name,
            comment_count,
        }
    }
}

#[derive(Debug, FromQueryResult)]
struct CommentCountRow {
    post_id: Uuid,
    count: i64,
}

/// Comment counts grouped per post, for the given page of post ids.
pub(crate) async fn comment_counts(
    db: &DbConn,
    post_ids: &[Uuid],
) -> Result<HashMap<Uuid, u64>, DbErr> {
    if post_ids.is_empty() {
        return Ok(HashMap::new());
    }

    let rows = comment::Entity::find()
        .select_only()
        .column(comment::Column::PostId)
        .column_as(comment::Column::Id.count(), "count")
        .filter(comment::Column::PostId.is_in(post_ids.to_vec()))
        .group_by(comment::Column::PostId)
        .into_model::<CommentCountRow>()
        .all(db)
        .await?;

    Ok(rows
        .into_iter()
        .map(|row| (row.post_id, row.count as u64))
        .collect())
}
