//! Timestamped bundle cache over a durable store, plus session flags.

use std::sync::Arc;
use std::time::{
    Duration,
    SystemTime,
    UNIX_EPOCH,
};

use serde::{
    Deserialize,
    Serialize,
};

use super::KeyValueStore;
use crate::translation::Bundle;
use crate::types::cache_key;

/// Session flag value meaning "set".
const FLAG_SET: &str = "1";
const CONTENT_VERSION_KEY: &str = "content-version";

/// Where a persisted bundle came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum EntrySource {
    /// Loaded through the regular bundle tier.
    Bundled,
    /// Written by background revalidation.
    Cdn,
}

/// Serialized form of a persisted bundle.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CacheEntry {
    pub data: Bundle,
    /// Milliseconds since the Unix epoch.
    pub timestamp: u64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub version: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub source: Option<EntrySource>,
}

impl CacheEntry {
    /// An entry is expired once it is strictly older than `ttl`.
    #[must_use]
    pub fn is_expired(&self, ttl: Duration, now: u64) -> bool {
        let ttl = u64::try_from(ttl.as_millis()).unwrap_or(u64::MAX);
        now.saturating_sub(self.timestamp) > ttl
    }
}

/// Milliseconds since the Unix epoch.
#[must_use]
pub fn now_millis() -> u64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map_or(0, |d| u64::try_from(d.as_millis()).unwrap_or(u64::MAX))
}

/// Persistent tier of the translation cache.
///
/// Every failure is reported as a miss: a broken or full store degrades to
/// fetching from the network, it never breaks a load.
#[derive(Clone)]
pub struct PersistentCache {
    /// Durable store holding bundles and the content-version marker
    durable: Arc<dyn KeyValueStore>,
    /// Session-scoped store holding flags
    session: Arc<dyn KeyValueStore>,
    prefix: String,
    ttl: Duration,
}

impl std::fmt::Debug for PersistentCache {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PersistentCache")
            .field("durable", &"<dyn KeyValueStore>")
            .field("session", &"<dyn KeyValueStore>")
            .field("prefix", &self.prefix)
            .field("ttl", &self.ttl)
            .finish()
    }
}

impl PersistentCache {
    #[must_use]
    pub fn new(
        durable: Arc<dyn KeyValueStore>,
        session: Arc<dyn KeyValueStore>,
        prefix: impl Into<String>,
        ttl: Duration,
    ) -> Self {
        Self { durable, session, prefix: prefix.into(), ttl }
    }

    fn entry_key(&self, locale: &str, namespace: &str) -> String {
        format!("{}{}", self.prefix, cache_key(locale, namespace))
    }

    /// Reads a bundle, purging it when older than the TTL.
    #[must_use]
    pub fn get(&self, locale: &str, namespace: &str) -> Option<Bundle> {
        self.entry(locale, namespace).map(|entry| entry.data)
    }

    /// Reads a full entry, purging it when older than the TTL.
    #[must_use]
    pub fn entry(&self, locale: &str, namespace: &str) -> Option<CacheEntry> {
        let key = self.entry_key(locale, namespace);

        let raw = match self.durable.get(&key) {
            Ok(Some(raw)) => raw,
            Ok(None) => return None,
            Err(error) => {
                tracing::debug!(%key, %error, "Failed to read cache entry");
                return None;
            }
        };

        let entry: CacheEntry = match serde_json::from_str(&raw) {
            Ok(entry) => entry,
            Err(error) => {
                tracing::debug!(%key, %error, "Discarding unreadable cache entry");
                return None;
            }
        };

        if entry.is_expired(self.ttl, now_millis()) {
            tracing::debug!(%key, timestamp = entry.timestamp, "Cache entry expired");
            if let Err(error) = self.durable.remove(&key) {
                tracing::debug!(%key, %error, "Failed to purge expired cache entry");
            }
            return None;
        }

        Some(entry)
    }

    /// Persists a bundle stamped with the current time.
    pub fn set(
        &self,
        locale: &str,
        namespace: &str,
        data: &Bundle,
        version: &str,
        source: EntrySource,
    ) {
        let key = self.entry_key(locale, namespace);
        let entry = CacheEntry {
            data: data.clone(),
            timestamp: now_millis(),
            version: Some(version.to_string()),
            source: Some(source),
        };

        let result = serde_json::to_string(&entry)
            .map_err(super::StorageError::from)
            .and_then(|raw| self.durable.set(&key, &raw));
        if let Err(error) = result {
            // 容量超過などは黙ってスキップ
            tracing::debug!(%key, %error, "Failed to write cache entry");
        }
    }

    #[must_use]
    pub fn session_flag(&self, name: &str) -> bool {
        match self.session.get(&format!("{}{name}", self.prefix)) {
            Ok(value) => value.as_deref() == Some(FLAG_SET),
            Err(error) => {
                tracing::debug!(flag = name, %error, "Failed to read session flag");
                false
            }
        }
    }

    pub fn set_session_flag(&self, name: &str) {
        if let Err(error) = self.session.set(&format!("{}{name}", self.prefix), FLAG_SET) {
            tracing::debug!(flag = name, %error, "Failed to write session flag");
        }
    }

    /// The locally recorded content version, if any.
    #[must_use]
    pub fn content_version(&self) -> Option<String> {
        self.durable
            .get(&format!("{}{CONTENT_VERSION_KEY}", self.prefix))
            .inspect_err(|error| tracing::debug!(%error, "Failed to read content version"))
            .ok()
            .flatten()
    }

    pub fn set_content_version(&self, version: &str) {
        if let Err(error) = self.durable.set(&format!("{}{CONTENT_VERSION_KEY}", self.prefix), version)
        {
            tracing::debug!(%error, "Failed to write content version");
        }
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use googletest::prelude::*;
    use rstest::*;
    use serde_json::json;

    use super::*;
    use crate::storage::MemoryStore;

    const HOUR: Duration = Duration::from_secs(3600);

    fn bundle() -> Bundle {
        serde_json::from_value(json!({"title": "Profile", "settings": {"theme": "Light"}}))
            .unwrap()
    }

    struct Fixture {
        durable: MemoryStore,
        session: MemoryStore,
        cache: PersistentCache,
    }

    #[fixture]
    fn fixture() -> Fixture {
        let durable = MemoryStore::new();
        let session = MemoryStore::new();
        let cache = PersistentCache::new(
            Arc::new(durable.clone()),
            Arc::new(session.clone()),
            "edge-i18n:",
            HOUR,
        );
        Fixture { durable, session, cache }
    }

    #[rstest]
    fn stored_bundle_reads_back_identical(fixture: Fixture) {
        fixture.cache.set("en", "profile", &bundle(), "1.0.0", EntrySource::Bundled);

        assert_that!(fixture.cache.get("en", "profile"), some(eq(&bundle())));

        let entry = fixture.cache.entry("en", "profile").unwrap();
        assert_that!(entry.version, some(eq("1.0.0")));
        assert_that!(entry.source, some(eq(EntrySource::Bundled)));
    }

    #[rstest]
    fn entry_is_keyed_with_prefix(fixture: Fixture) {
        fixture.cache.set("cs", "common", &bundle(), "2.0.0", EntrySource::Cdn);

        let raw = fixture.durable.get("edge-i18n:cs:common").unwrap().unwrap();
        let value: serde_json::Value = serde_json::from_str(&raw).unwrap();

        assert_that!(value["source"], eq(&json!("cdn")));
        assert_that!(value["data"]["title"], eq(&json!("Profile")));
    }

    #[rstest]
    fn expired_entry_is_purged(fixture: Fixture) {
        let stale = CacheEntry {
            data: bundle(),
            timestamp: now_millis() - 2 * 3_600_000,
            version: None,
            source: None,
        };
        fixture
            .durable
            .set("edge-i18n:en:profile", &serde_json::to_string(&stale).unwrap())
            .unwrap();

        assert_that!(fixture.cache.get("en", "profile"), none());
        assert_that!(fixture.durable.get("edge-i18n:en:profile").unwrap(), none());
    }

    #[rstest]
    fn entry_without_optional_fields_is_accepted(fixture: Fixture) {
        let raw = json!({"data": {"a": "A"}, "timestamp": now_millis()}).to_string();
        fixture.durable.set("edge-i18n:en:common", &raw).unwrap();

        let bundle = fixture.cache.get("en", "common").unwrap();

        assert_that!(bundle.resolve("a"), some(eq("A")));
    }

    #[rstest]
    fn corrupted_entry_is_a_miss(fixture: Fixture) {
        fixture.durable.set("edge-i18n:en:common", "{not json").unwrap();

        assert_that!(fixture.cache.get("en", "common"), none());
    }

    #[rstest]
    #[case(0, false)]
    #[case(3_600_000, false)]
    #[case(3_600_001, true)]
    fn is_expired_boundary(#[case] age: u64, #[case] expired: bool) {
        let entry = CacheEntry { data: Bundle::new(), timestamp: 10_000_000, version: None, source: None };

        assert_that!(entry.is_expired(HOUR, 10_000_000 + age), eq(expired));
    }

    #[rstest]
    fn session_flags_live_in_session_store(fixture: Fixture) {
        assert_that!(fixture.cache.session_flag("version-checked"), eq(false));

        fixture.cache.set_session_flag("version-checked");

        assert_that!(fixture.cache.session_flag("version-checked"), eq(true));
        assert_that!(fixture.session.get("edge-i18n:version-checked").unwrap(), some(eq("1")));
        assert_that!(fixture.durable.is_empty(), eq(true));
    }

    #[rstest]
    fn content_version_round_trip(fixture: Fixture) {
        assert_that!(fixture.cache.content_version(), none());

        fixture.cache.set_content_version("1.2.0");

        assert_that!(fixture.cache.content_version(), some(eq("1.2.0")));
    }
}
