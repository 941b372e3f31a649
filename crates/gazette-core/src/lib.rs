//! # Gazette Core
//!
//! The domain layer of the Gazette publishing backend.
//! This crate contains pure business logic with zero infrastructure
//! dependencies: entities, the post visibility policy, pagination math,
//! and the ports that infrastructure implements.

pub mod domain;
pub mod error;
pub mod pagination;
pub mod ports;
pub mod visibility;

pub use error::RepoError;
