//! Authentication state for the client.
//!
//! `AuthStore` holds the current session (bearer token plus user profile),
//! persists it through the storage adapter, and exposes the derived
//! `is_authenticated` flag consulted by the API client and the router guard.

pub mod session;

pub use session::AuthStore;
