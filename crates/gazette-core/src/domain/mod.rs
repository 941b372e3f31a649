//! Domain entities - the core business objects.

mod category;
mod comment;
mod location;
mod post;
mod user;

pub use category::{Category, slug_is_valid};
pub use comment::{Comment, CommentEntry};
pub use location::Location;
pub use post::{CategoryTag, FeedEntry, Post};
pub use user::User;

/// Upper bound shared by post titles, category titles and location names.
pub const MAX_TITLE_LEN: usize = 256;

/// Username length limit.
pub const MAX_USERNAME_LEN: usize = 150;
