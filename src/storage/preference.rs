//! Durable record of the user's chosen locale.

use std::sync::Arc;
use std::time::Duration;

use serde::{
    Deserialize,
    Serialize,
};

use super::{
    KeyValueStore,
    now_millis,
};
use crate::types::Locale;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
struct PreferenceRecord {
    locale: Locale,
    /// Milliseconds since the Unix epoch.
    expires_at: u64,
}

/// Stores the selected locale under a configurable key with a max age.
#[derive(Clone)]
pub struct LocalePreference {
    store: Arc<dyn KeyValueStore>,
    key: String,
    max_age: Duration,
}

impl std::fmt::Debug for LocalePreference {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("LocalePreference")
            .field("store", &"<dyn KeyValueStore>")
            .field("key", &self.key)
            .field("max_age", &self.max_age)
            .finish()
    }
}

impl LocalePreference {
    #[must_use]
    pub fn new(store: Arc<dyn KeyValueStore>, key: impl Into<String>, max_age: Duration) -> Self {
        Self { store, key: key.into(), max_age }
    }

    /// Returns the stored locale unless it is missing, expired or unreadable.
    #[must_use]
    pub fn load(&self) -> Option<Locale> {
        let raw = self
            .store
            .get(&self.key)
            .inspect_err(|error| tracing::debug!(key = %self.key, %error, "Failed to read locale preference"))
            .ok()
            .flatten()?;

        let record: PreferenceRecord = serde_json::from_str(&raw).ok()?;
        if record.expires_at < now_millis() {
            return None;
        }
        Some(record.locale)
    }

    pub fn save(&self, locale: &str) {
        let max_age = u64::try_from(self.max_age.as_millis()).unwrap_or(u64::MAX);
        let record = PreferenceRecord {
            locale: locale.to_string(),
            expires_at: now_millis().saturating_add(max_age),
        };

        let result = serde_json::to_string(&record)
            .map_err(super::StorageError::from)
            .and_then(|raw| self.store.set(&self.key, &raw));
        if let Err(error) = result {
            tracing::debug!(key = %self.key, %error, "Failed to write locale preference");
        }
    }
}
