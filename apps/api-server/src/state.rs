//! Application state - shared across all handlers.

use std::sync::Arc;

use sea_orm::DbConn;

use gazette_core::ports::{
    CategoryRepository, CommentRepository, LocationRepository, PostRepository, UserRepository,
};
use gazette_infra::{
    PostgresCategoryRepository, PostgresCommentRepository, PostgresLocationRepository,
    PostgresPostRepository, PostgresUserRepository,
};

/// Shared application state.
#[derive(Clone)]
pub struct AppState {
    pub users: Arc<dyn UserRepository>,
    pub posts: Arc<dyn PostRepository>,
    pub comments: Arc<dyn CommentRepository>,
    pub categories: Arc<dyn CategoryRepository>,
    pub locations: Arc<dyn LocationRepository>,
    /// Listing page size (posts per page).
    pub page_size: u64,
}

impl AppState {
    /// Build the application state over a database connection. The
    /// repositories share the one connection pool.
    pub fn new(db: DbConn, page_size: u64) -> Self {
        let db = Arc::new(db);
        let state = Self {
            users: Arc::new(PostgresUserRepository::new(db.clone())),
            posts: Arc::new(PostgresPostRepository::new(db.clone())),
            comments: Arc::new(PostgresCommentRepository::new(db.clone())),
            categories: Arc::new(PostgresCategoryRepository::new(db.clone())),
            locations: Arc::new(PostgresLocationRepository::new(db)),
            page_size,
        };

        tracing::info!("Application state initialized");
        state
    }
}
