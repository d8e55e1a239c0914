//! Persisted client state (key-value).

pub mod file;
pub mod memory;
pub mod session;

pub use file::FileStore;
pub use memory::MemoryStore;
pub use session::Session;

use crate::error::Result;

/// Storage keys as constants.
pub mod keys {
    /// Bearer token issued by `POST /jwt`
    pub const TOKEN: &str = "habit-tracker-token";
    /// Signed-in user profile (JSON)
    pub const USER: &str = "habit-tracker-user";
}

/// Minimal string key-value store backing the session.
pub trait KeyValueStore: Send + Sync {
    fn get(&self, key: &str) -> Result<Option<String>>;
    fn set(&self, key: &str, value: &str) -> Result<()>;
    /// Removing a missing key is not an error.
    fn remove(&self, key: &str) -> Result<()>;
}
