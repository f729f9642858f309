//! Core domain entities
//!
//! All business entities are defined here. These are pure data structures
//! with validation logic - no I/O or external dependencies.

mod book;
pub mod rating;
pub mod result;
pub mod review;
mod user;

pub use book::{Book, NewBook};
pub use rating::{BookApiRecord, BookDetail, RemoteRating};
pub use review::{Review, ReviewWithAuthor};
pub use user::{CurrentUser, User};
