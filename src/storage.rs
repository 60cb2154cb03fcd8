//! Durable and session-scoped key-value storage
//!
//! The coordinator never talks to a concrete store directly. It goes through
//! [`PersistentCache`] for translation bundles and session flags, and through
//! [`LocalePreference`] for the user's locale choice.

mod cache;
mod preference;
mod store;

use thiserror::Error;

pub use cache::{
    CacheEntry,
    EntrySource,
    PersistentCache,
    now_millis,
};
pub use preference::LocalePreference;
pub use store::{
    FileStore,
    MemoryStore,
};

#[derive(Error, Debug)]
pub enum StorageError {
    #[error("Storage I/O failed: {0}")]
    Io(#[from] std::io::Error),

    #[error("Failed to encode or decode stored value: {0}")]
    Serialize(#[from] serde_json::Error),
}

/// A string key-value store.
///
/// Implementations must be safe to share between the coordinator and the
/// background revalidation task.
pub trait KeyValueStore: Send + Sync {
    /// # Errors
    /// Returns an error when the backing store cannot be read.
    fn get(&self, key: &str) -> Result<Option<String>, StorageError>;

    /// # Errors
    /// Returns an error when the backing store cannot be written.
    fn set(&self, key: &str, value: &str) -> Result<(), StorageError>;

    /// Removes `key`. Removing a missing key is not an error.
    ///
    /// # Errors
    /// Returns an error when the backing store cannot be written.
    fn remove(&self, key: &str) -> Result<(), StorageError>;
}
