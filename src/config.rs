//! Runtime configuration
/// Config file loader
mod loader;
/// Configuration types and validation
mod types;

pub use loader::{
    CONFIG_FILE_NAME,
    load_from_dir,
    parse_config,
};
pub use types::{
    ConfigError,
    DEFAULT_CACHE_TTL_MS,
    DEFAULT_LOCALE_BASE_PATH,
    DEFAULT_NAMESPACE,
    DEFAULT_STORAGE_PREFIX,
    I18nConfig,
    ValidationError,
};
