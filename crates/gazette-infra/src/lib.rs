//! # Gazette Infrastructure
//!
//! Concrete implementations of the ports defined in `gazette-core`:
//! PostgreSQL storage via SeaORM, JWT tokens and Argon2 password
//! hashing.

pub mod auth;
pub mod database;

pub use auth::{Argon2PasswordService, JwtTokenService};
pub use database::{
    DatabaseConfig, PostgresCategoryRepository, PostgresCommentRepository,
    PostgresLocationRepository, PostgresPostRepository, PostgresUserRepository,
};
