//! Wire types for the bookshelf API.
//!
//! Field names follow the backend's camelCase JSON.

pub mod book;
pub mod user;

pub use book::{Book, BookPage};
pub use user::{Identity, UserProfile};
