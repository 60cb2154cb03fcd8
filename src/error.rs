use thiserror::Error;

use crate::config::ConfigError;
use crate::fetch::FetchError;
use crate::storage::StorageError;

/// Errors raised while constructing or retrieving the coordinator
#[derive(Error, Debug)]
pub enum I18nError {
    /// `I18n::install` was called more than once in this process
    #[error("I18n instance already exists. Only one instance is allowed")]
    AlreadyInitialized,
    /// `I18n::global` was called before `I18n::install`
    #[error("I18n has not been initialized. Install an instance before calling global()")]
    NotInitialized,
    /// The coordinator was built outside of a tokio runtime
    #[error("I18n must be built from within a tokio runtime")]
    NoRuntime,
    #[error(transparent)]
    Config(#[from] ConfigError),
    /// A default fetcher could not be created from the configured location
    #[error("Failed to create translation fetcher: {0}")]
    Fetcher(#[from] FetchError),
    /// The durable store under `cacheDir` could not be opened
    #[error("Failed to open translation cache: {0}")]
    Storage(#[from] StorageError),
}

/// Errors surfaced to callers of `load_namespace`
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum LoadError {
    /// Namespace contains characters other than word characters and hyphens
    #[error("Invalid namespace '{0}': only letters, digits, '_' and '-' are allowed")]
    InvalidNamespace(String),
}
