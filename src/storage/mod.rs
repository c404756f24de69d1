//! Key-value storage behind the `Storage` trait.
//!
//! The auth and theme stores read and write through this trait so the
//! backend can be swapped: `FileStorage` for the real client,
//! `MemoryStorage` for tests. Storage failures never surface to callers;
//! a broken backend degrades to the in-memory map.

pub mod file;
pub mod memory;

pub use file::FileStorage;
pub use memory::MemoryStorage;

/// String key-value storage that survives (at best-effort) across runs.
///
/// All methods are infallible by contract: an unavailable backend behaves
/// like an empty store for reads and keeps values in memory for writes.
pub trait Storage: Send + Sync {
    fn get(&self, key: &str) -> Option<String>;
    fn set(&self, key: &str, value: &str);
    fn remove(&self, key: &str);
}
