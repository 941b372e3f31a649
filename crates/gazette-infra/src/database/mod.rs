//! Database connection management and SeaORM-backed repositories.

mod connections;
pub mod entity;
mod post_query;
mod repos;

pub use connections::{DatabaseConfig, connect};
pub use repos::{
    PostgresCategoryRepository, PostgresCommentRepository, PostgresLocationRepository,
    PostgresPostRepository, PostgresUserRepository,
};

#[cfg(test)]
mod tests;
