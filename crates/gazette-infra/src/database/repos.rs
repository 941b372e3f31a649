//! PostgreSQL repository implementations.

use std::sync::Arc;

use async_trait::async_trait;
use sea_orm::prelude::DateTimeWithTimeZone;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, DbConn, DbErr, EntityTrait, FromQueryResult, JoinType,
    PaginatorTrait, QueryFilter, QueryOrder, QuerySelect, RelationTrait,
};
use uuid::Uuid;

use gazette_core::domain::{Category, Comment, CommentEntry, FeedEntry, Location, Post, User};
use gazette_core::error::RepoError;
use gazette_core::ports::{
    CategoryRepository, CommentRepository, LocationRepository, PostFilter, PostRepository,
    UserRepository,
};

use super::entity::{category, comment, location, post, user};
use super::post_query;

fn to_repo_err(e: DbErr) -> RepoError {
    let msg = e.to_string();
    if msg.contains("duplicate") || msg.contains("unique") {
        RepoError::Constraint(msg)
    } else {
        RepoError::Query(msg)
    }
}

fn update_err(e: DbErr) -> RepoError {
    match e {
        DbErr::RecordNotUpdated => RepoError::NotFound,
        other => to_repo_err(other),
    }
}

/// PostgreSQL user repository.
pub struct PostgresUserRepository {
    db: Arc<DbConn>,
}

impl PostgresUserRepository {
    pub fn new(db: Arc<DbConn>) -> Self {
        Self { db }
    }
}

#[async_trait]
impl UserRepository for PostgresUserRepository {
    async fn find_by_id(&self, id: Uuid) -> Result<Option<User>, RepoError> {
        let result = user::Entity::find_by_id(id)
            .one(self.db.as_ref())
            .await
            .map_err(to_repo_err)?;

        Ok(result.map(Into::into))
    }

    async fn find_by_username(&self, username: &str) -> Result<Option<User>, RepoError> {
        tracing::debug!(%username, "Finding user by username");

        let result = user::Entity::find()
            .filter(user::Column::Username.eq(username))
            .one(self.db.as_ref())
            .await
            .map_err(to_repo_err)?;

        Ok(result.map(Into::into))
    }

    async fn find_by_email(&self, email: &str) -> Result<Option<User>, RepoError> {
        let result = user::Entity::find()
            .filter(user::Column::Email.eq(email))
            .one(self.db.as_ref())
            .await
            .map_err(to_repo_err)?;

        Ok(result.map(Into::into))
    }

    async fn insert(&self, entity: User) -> Result<User, RepoError> {
        let model: user::ActiveModel = entity.into();
        let saved = model.insert(self.db.as_ref()).await.map_err(to_repo_err)?;
        Ok(saved.into())
    }

    async fn update(&self, entity: User) -> Result<User, RepoError> {
        let model: user::ActiveModel = entity.into();
        let saved = model.update(self.db.as_ref()).await.map_err(update_err)?;
        Ok(saved.into())
    }
}

/// PostgreSQL post repository.
pub struct PostgresPostRepository {
    db: Arc<DbConn>,
}

impl PostgresPostRepository {
    pub fn new(db: Arc<DbConn>) -> Self {
        Self { db }
    }
}

#[async_trait]
impl PostRepository for PostgresPostRepository {
    async fn find_by_id(&self, id: Uuid) -> Result<Option<Post>, RepoError> {
        let result = post::Entity::find_by_id(id)
            .one(self.db.as_ref())
            .await
            .map_err(to_repo_err)?;

        Ok(result.map(Into::into))
    }

    async fn find_detail(&self, id: Uuid) -> Result<Option<FeedEntry>, RepoError> {
        let row = post_query::with_display_columns(post_query::joined_select())
            .filter(post::Column::Id.eq(id))
            .into_model::<post_query::PostRow>()
            .one(self.db.as_ref())
            .await
            .map_err(to_repo_err)?;

        let Some(row) = row else {
            return Ok(None);
        };

        let counts = post_query::comment_counts(self.db.as_ref(), &[id])
            .await
            .map_err(to_repo_err)?;

        Ok(Some(
            row.into_feed_entry(counts.get(&id).copied().unwrap_or(0)),
        ))
    }

    async fn count(&self, filter: &PostFilter) -> Result<u64, RepoError> {
        post_query::feed_select(filter)
            .count(self.db.as_ref())
            .await
            .map_err(to_repo_err)
    }

    async fn list(
        &self,
        filter: &PostFilter,
        offset: u64,
        limit: u64,
    ) -> Result<Vec<FeedEntry>, RepoError> {
        let rows = post_query::with_display_columns(post_query::feed_select(filter))
            .offset(offset)
            .limit(limit)
            .into_model::<post_query::PostRow>()
            .all(self.db.as_ref())
            .await
            .map_err(to_repo_err)?;

        let counts = if filter.with_comment_count {
            let ids: Vec<Uuid> = rows.iter().map(|r| r.id).collect();
            post_query::comment_counts(self.db.as_ref(), &ids)
                .await
                .map_err(to_repo_err)?
        } else {
            Default::default()
        };

        Ok(rows
            .into_iter()
            .map(|row| {
                let count = counts.get(&row.id).copied().unwrap_or(0);
                row.into_feed_entry(count)
            })
            .collect())
    }

    async fn insert(&self, entity: Post) -> Result<Post, RepoError> {
        tracing::debug!(post_id = %entity.id, author_id = %entity.author_id, "Inserting post");

        let model: post::ActiveModel = entity.into();
        let saved = model.insert(self.db.as_ref()).await.map_err(to_repo_err)?;
        Ok(saved.into())
    }

    async fn update(&self, entity: Post) -> Result<Post, RepoError> {
        let model: post::ActiveModel = entity.into();
        let saved = model.update(self.db.as_ref()).await.map_err(update_err)?;
        Ok(saved.into())
    }

    async fn delete(&self, id: Uuid) -> Result<(), RepoError> {
        let result = post::Entity::delete_by_id(id)
            .exec(self.db.as_ref())
            .await
            .map_err(to_repo_err)?;

        if result.rows_affected == 0 {
            return Err(RepoError::NotFound);
        }

        Ok(())
    }
}

/// One joined row of a comment thread.
#[derive(Debug, FromQueryResult)]
struct CommentRow {
    id: Uuid,
    post_id: Uuid,
    author_id: Uuid,
    text: String,
    created_at: DateTimeWithTimeZone,
    author_username: String,
}

impl From<CommentRow> for CommentEntry {
    fn from(row: CommentRow) -> Self {
        Self {
            comment: Comment {
                id: row.id,
                post_id: row.post_id,
                author_id: row.author_id,
                text: row.text,
                created_at: row.created_at.into(),
            },
            author_username: row.author_username,
        }
    }
}

/// PostgreSQL comment repository.
pub struct PostgresCommentRepository {
    db: Arc<DbConn>,
}

impl PostgresCommentRepository {
    pub fn new(db: Arc<DbConn>) -> Self {
        Self { db }
    }
}

#[async_trait]
impl CommentRepository for PostgresCommentRepository {
    async fn find_in_post(&self, post_id: Uuid, id: Uuid) -> Result<Option<Comment>, RepoError> {
        let result = comment::Entity::find_by_id(id)
            .filter(comment::Column::PostId.eq(post_id))
            .one(self.db.as_ref())
            .await
            .map_err(to_repo_err)?;

        Ok(result.map(Into::into))
    }

    async fn list_for_post(&self, post_id: Uuid) -> Result<Vec<CommentEntry>, RepoError> {
        let rows = comment::Entity::find()
            .join(JoinType::InnerJoin, comment::Relation::Author.def())
            .column_as(user::Column::Username, "author_username")
            .filter(comment::Column::PostId.eq(post_id))
            .order_by_asc(comment::Column::CreatedAt)
            .into_model::<CommentRow>()
            .all(self.db.as_ref())
            .await
            .map_err(to_repo_err)?;

        Ok(rows.into_iter().map(Into::into).collect())
    }

    async fn insert(&self, entity: Comment) -> Result<Comment, RepoError> {
        let model: comment::ActiveModel = entity.into();
        let saved = model.insert(self.db.as_ref()).await.map_err(to_repo_err)?;
        Ok(saved.into())
    }

    async fn update(&self, entity: Comment) -> Result<Comment, RepoError> {
        let model: comment::ActiveModel = entity.into();
        let saved = model.update(self.db.as_ref()).await.map_err(update_err)?;
        Ok(saved.into())
    }

    async fn delete(&self, id: Uuid) -> Result<(), RepoError> {
        let result = comment::Entity::delete_by_id(id)
            .exec(self.db.as_ref())
            .await
            .map_err(to_repo_err)?;

        if result.rows_affected == 0 {
            return Err(RepoError::NotFound);
        }

        Ok(())
    }
}

/// PostgreSQL category repository.
pub struct PostgresCategoryRepository {
    db: Arc<DbConn>,
}

impl PostgresCategoryRepository {
    pub fn new(db: Arc<DbConn>) -> Self {
        Self { db }
    }
}

#[async_trait]
impl CategoryRepository for PostgresCategoryRepository {
    async fn find_by_id(&self, id: Uuid) -> Result<Option<Category>, RepoError> {
        let result = category::Entity::find_by_id(id)
            .one(self.db.as_ref())
            .await
            .map_err(to_repo_err)?;

        Ok(result.map(Into::into))
    }

    async fn find_by_slug(&self, slug: &str) -> Result<Option<Category>, RepoError> {
        let result = category::Entity::find()
            .filter(category::Column::Slug.eq(slug))
            .one(self.db.as_ref())
            .await
            .map_err(to_repo_err)?;

        Ok(result.map(Into::into))
    }

    async fn list(&self) -> Result<Vec<Category>, RepoError> {
        let result = category::Entity::find()
            .order_by_asc(category::Column::Title)
            .all(self.db.as_ref())
            .await
            .map_err(to_repo_err)?;

        Ok(result.into_iter().map(Into::into).collect())
    }

    async fn insert(&self, entity: Category) -> Result<Category, RepoError> {
        let model: category::ActiveModel = entity.into();
        let saved = model.insert(self.db.as_ref()).await.map_err(to_repo_err)?;
        Ok(saved.into())
    }

    async fn update(&self, entity: Category) -> Result<Category, RepoError> {
        let model: category::ActiveModel = entity.into();
        let saved = model.update(self.db.as_ref()).await.map_err(update_err)?;
        Ok(saved.into())
    }
}

/// PostgreSQL location repository.
pub struct PostgresLocationRepository {
    db: Arc<DbConn>,
}

impl PostgresLocationRepository {
    pub fn new(db: Arc<DbConn>) -> Self {
        Self { db }
    }
}

#[async_trait]
impl LocationRepository for PostgresLocationRepository {
    async fn find_by_id(&self, id: Uuid) -> Result<Option<Location>, RepoError> {
        let result = location::Entity::find_by_id(id)
            .one(self.db.as_ref())
            .await
            .map_err(to_repo_err)?;

        Ok(result.map(Into::into))
    }

    async fn list(&self) -> Result<Vec<Location>, RepoError> {
        let result = location::Entity::find()
            .order_by_asc(location::Column::Name)
            .all(self.db.as_ref())
            .await
            .map_err(to_repo_err)?;

        Ok(result.into_iter().map(Into::into).collect())
    }

    async fn insert(&self, entity: Location) -> Result<Location, RepoError> {
        let model: location::ActiveModel = entity.into();
        let saved = model.insert(self.db.as_ref()).await.map_err(to_repo_err)?;
        Ok(saved.into())
    }

    async fn update(&self, entity: Location) -> Result<Location, RepoError> {
        let model: location::ActiveModel = entity.into();
        let saved = model.update(self.db.as_ref()).await.map_err(update_err)?;
        Ok(saved.into())
    }
}
