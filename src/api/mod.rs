//! HTTP client for the bookshelf API.
//!
//! All requests go through one shared `ApiClient`. Authenticated requests
//! carry the bearer token from the injected `AuthStore`; a 401 response
//! clears that store as a side effect and still fails the call.

pub mod client;
pub mod error;

pub use client::{ApiClient, BookQuery};
pub use error::ApiError;
