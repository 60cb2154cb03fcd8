use std::time::Duration;

use serde::{
    Deserialize,
    Serialize,
};
use thiserror::Error;

use crate::types::is_valid_namespace;

/// Seven days, in milliseconds.
pub const DEFAULT_CACHE_TTL_MS: u64 = 7 * 24 * 60 * 60 * 1000;
pub const DEFAULT_VERSION_CHECK_DELAY_MS: u64 = 5000;
pub const DEFAULT_NAMESPACE: &str = "common";
pub const DEFAULT_STORAGE_PREFIX: &str = "edge-i18n:";
pub const DEFAULT_LOCALE_PREFERENCE_KEY: &str = "locale";
pub const DEFAULT_PREFERENCE_MAX_AGE_DAYS: u64 = 7;
pub const DEFAULT_LOCALE_BASE_PATH: &str = "/locales";

#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[error("Configuration error in '{field_path}': {message}")]
pub struct ValidationError {
    /// JSON path to the field (e.g., "supportedLocales[0]")
    pub field_path: String,
    pub message: String,
}

impl ValidationError {
    #[must_use]
    pub fn new(field_path: impl Into<String>, message: impl Into<String>) -> Self {
        Self { field_path: field_path.into(), message: message.into() }
    }
}

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Configuration validation failed:\n{}", format_validation_errors(.0))]
    ValidationErrors(Vec<ValidationError>),

    #[error("Failed to load configuration file: {0}")]
    IoError(#[from] std::io::Error),

    #[error("Failed to parse configuration: {0}")]
    ParseError(#[from] serde_json::Error),

    #[error("Failed to parse configuration: {0}")]
    SyntaxError(String),
}

fn format_validation_errors(errors: &[ValidationError]) -> String {
    errors
        .iter()
        .enumerate()
        .map(|(i, err)| format!("  {}. {} - {}", i + 1, err.field_path, err.message))
        .collect::<Vec<_>>()
        .join("\n")
}

#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(rename_all = "camelCase", default)]
pub struct I18nConfig {
    /// Remote endpoint serving `version.json` and `<locale>/<ns>.json`.
    /// Background revalidation is disabled when unset.
    pub cdn_endpoint: Option<String>,

    /// Used when no locale detector yields a supported locale.
    pub default_locale: String,
    pub supported_locales: Vec<String>,
    /// Locale consulted when a namespace is missing for the current one.
    pub fallback_locale: Option<String>,

    /// How long persisted bundles stay valid, in milliseconds.
    pub cache_ttl: u64,
    /// Delay before the background version check, in milliseconds.
    pub version_check_delay: u64,
    pub enable_background_updates: bool,

    /// Durable key holding the user's selected locale.
    pub locale_preference_key: String,
    pub preference_max_age_days: u64,

    /// Directory for the durable store. Persisted data stays in memory and
    /// is lost at exit when unset.
    pub cache_dir: Option<String>,

    /// Prefix for every key written to the persistent and session stores.
    pub storage_prefix: String,
    /// Where bundled translations live: an `http(s)://` URL or a directory.
    pub locale_base_path: String,
    /// Namespace used by `t()`.
    pub default_namespace: String,
}

impl Default for I18nConfig {
    fn default() -> Self {
        Self {
            cdn_endpoint: None,
            default_locale: "en".to_string(),
            supported_locales: vec!["en".to_string()],
            fallback_locale: None,
            cache_ttl: DEFAULT_CACHE_TTL_MS,
            version_check_delay: DEFAULT_VERSION_CHECK_DELAY_MS,
            enable_background_updates: true,
            locale_preference_key: DEFAULT_LOCALE_PREFERENCE_KEY.to_string(),
            preference_max_age_days: DEFAULT_PREFERENCE_MAX_AGE_DAYS,
            cache_dir: None,
            storage_prefix: DEFAULT_STORAGE_PREFIX.to_string(),
            locale_base_path: DEFAULT_LOCALE_BASE_PATH.to_string(),
            default_namespace: DEFAULT_NAMESPACE.to_string(),
        }
    }
}

impl I18nConfig {
    /// Creates a config with the given locales and defaults elsewhere.
    #[must_use]
    pub fn new(default_locale: impl Into<String>, supported_locales: &[&str]) -> Self {
        Self {
            default_locale: default_locale.into(),
            supported_locales: supported_locales.iter().map(|l| (*l).to_string()).collect(),
            ..Self::default()
        }
    }

    #[must_use]
    pub fn is_supported(&self, locale: &str) -> bool {
        self.supported_locales.iter().any(|l| l == locale)
    }

    #[must_use]
    pub const fn cache_ttl(&self) -> Duration {
        Duration::from_millis(self.cache_ttl)
    }

    #[must_use]
    pub const fn version_check_delay(&self) -> Duration {
        Duration::from_millis(self.version_check_delay)
    }

    #[must_use]
    pub const fn preference_max_age(&self) -> Duration {
        Duration::from_secs(self.preference_max_age_days.saturating_mul(24 * 60 * 60))
    }

    /// # Errors
    /// - Required field is empty
    /// - Default or fallback locale is not supported
    /// - Invalid default namespace
    pub fn validate(&self) -> Result<(), Vec<ValidationError>> {
        let mut errors = Vec::new();

        if self.supported_locales.is_empty() {
            errors.push(ValidationError::new(
                "supportedLocales",
                "At least one locale is required. Example: [\"en\"]",
            ));
        }

        for (index, locale) in self.supported_locales.iter().enumerate() {
            if locale.is_empty() || locale.contains([':', '/']) {
                errors.push(ValidationError::new(
                    format!("supportedLocales[{index}]"),
                    format!("Invalid locale code '{locale}'"),
                ));
            }
        }

        if !self.is_supported(&self.default_locale) {
            errors.push(ValidationError::new(
                "defaultLocale",
                format!("'{}' must be listed in supportedLocales", self.default_locale),
            ));
        }

        if let Some(fallback) = &self.fallback_locale
            && !self.is_supported(fallback)
        {
            errors.push(ValidationError::new(
                "fallbackLocale",
                format!("'{fallback}' must be listed in supportedLocales, or remove this field"),
            ));
        }

        if self.cache_ttl == 0 {
            errors.push(ValidationError::new("cacheTtl", "The TTL must be greater than zero"));
        }

        if self.storage_prefix.is_empty() {
            errors.push(ValidationError::new(
                "storagePrefix",
                "The prefix cannot be empty. Example: \"edge-i18n:\"",
            ));
        }

        if self.locale_preference_key.is_empty() {
            errors.push(ValidationError::new(
                "localePreferenceKey",
                "The key cannot be empty. Example: \"locale\"",
            ));
        }

        if self.locale_base_path.is_empty() {
            errors.push(ValidationError::new(
                "localeBasePath",
                "The path cannot be empty. Example: \"/locales\"",
            ));
        }

        if !is_valid_namespace(&self.default_namespace) {
            errors.push(ValidationError::new(
                "defaultNamespace",
                format!(
                    "Invalid namespace '{}': only letters, digits, '_' and '-' are allowed",
                    self.default_namespace
                ),
            ));
        }

        if let Some(dir) = &self.cache_dir
            && dir.is_empty()
        {
            errors.push(ValidationError::new(
                "cacheDir",
                "The directory cannot be empty. Please specify a path, or remove this field",
            ));
        }

        if let Some(endpoint) = &self.cdn_endpoint
            && endpoint.is_empty()
        {
            errors.push(ValidationError::new(
                "cdnEndpoint",
                "The endpoint cannot be empty. Please specify a URL, or remove this field",
            ));
        }

        if errors.is_empty() { Ok(()) } else { Err(errors) }
    }
}
