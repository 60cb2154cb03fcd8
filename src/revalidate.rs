//! Background revalidation against the remote version manifest
//!
//! Runs at most once per session. When the remote content is newer than the
//! locally recorded version, the namespaces that are both listed as updated
//! and active in this session are re-fetched and written to the persistent
//! tier only. In-memory translations are left alone, so visible text never
//! changes mid-session; fresh data is picked up by the next session.
//!
//! The local version marker only advances once every updated namespace is
//! persisted at the remote version. Until then later sessions keep comparing
//! against the older version and fetch what is still missing.

use std::cmp::Ordering;
use std::collections::HashSet;
use std::sync::Arc;
use std::time::Duration;

use crate::fetch::RemoteFetcher;
use crate::storage::{
    EntrySource,
    PersistentCache,
};
use crate::types::{
    Locale,
    Namespace,
};

/// Session flag marking that the check already ran.
pub const SESSION_FLAG: &str = "version-checked";

/// What a revalidation pass did.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RevalidationOutcome {
    /// Another pass already ran in this session.
    AlreadyChecked,
    /// The remote manifest was unreachable or malformed.
    ManifestUnavailable,
    /// The local content is as new as the remote one.
    UpToDate,
    /// Remote content is newer; lists the namespaces written to the cache.
    Refreshed(Vec<Namespace>),
}

#[derive(Clone)]
pub struct Revalidator {
    cache: PersistentCache,
    /// Source of fresh content and the remote manifest
    remote: Arc<dyn RemoteFetcher>,
    /// Source of the bundled manifest, used when no version was recorded yet
    bundled: Arc<dyn RemoteFetcher>,
}

impl std::fmt::Debug for Revalidator {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Revalidator")
            .field("cache", &self.cache)
            .field("remote", &"<dyn RemoteFetcher>")
            .field("bundled", &"<dyn RemoteFetcher>")
            .finish()
    }
}

impl Revalidator {
    #[must_use]
    pub fn new(
        cache: PersistentCache,
        remote: Arc<dyn RemoteFetcher>,
        bundled: Arc<dyn RemoteFetcher>,
    ) -> Self {
        Self { cache, remote, bundled }
    }

    #[must_use]
    pub fn already_checked(&self) -> bool {
        self.cache.session_flag(SESSION_FLAG)
    }

    /// Runs one pass for `locale`, refreshing only `active` namespaces.
    pub async fn run(&self, locale: &str, active: &HashSet<Namespace>) -> RevalidationOutcome {
        if self.already_checked() {
            return RevalidationOutcome::AlreadyChecked;
        }
        self.cache.set_session_flag(SESSION_FLAG);

        let local_version = self.local_version().await;

        let manifest = match self.remote.fetch_manifest().await {
            Ok(manifest) => manifest,
            Err(error) => {
                tracing::debug!(%error, "Remote version manifest unavailable");
                return RevalidationOutcome::ManifestUnavailable;
            }
        };

        if !is_newer(&manifest.version, local_version.as_deref()) {
            tracing::debug!(
                remote = %manifest.version,
                local = ?local_version,
                "Translations are up to date"
            );
            return RevalidationOutcome::UpToDate;
        }

        let mut refreshed = Vec::new();
        let mut pending = Vec::new();
        for namespace in &manifest.updated_namespaces {
            if self.is_current(locale, namespace, &manifest.version) {
                continue;
            }
            if !active.contains(namespace) {
                pending.push(namespace.clone());
                continue;
            }
            match self.remote.fetch_bundle(locale, namespace).await {
                Ok(bundle) => {
                    self.cache.set(locale, namespace, &bundle, &manifest.version, EntrySource::Cdn);
                    refreshed.push(namespace.clone());
                }
                Err(error) => {
                    tracing::debug!(%locale, %namespace, %error, "Skipping namespace refresh");
                    pending.push(namespace.clone());
                }
            }
        }

        // 未取得の名前空間が残っている間はマーカーを進めない（次のセッションで再取得する）
        if pending.is_empty() {
            self.cache.set_content_version(&manifest.version);
        }
        tracing::info!(
            version = %manifest.version,
            namespaces = ?refreshed,
            pending = ?pending,
            "Refreshed persisted translations for the next session"
        );
        RevalidationOutcome::Refreshed(refreshed)
    }

    /// Whether `namespace` is already persisted at `version`.
    fn is_current(&self, locale: &str, namespace: &str, version: &str) -> bool {
        self.cache
            .entry(locale, namespace)
            .is_some_and(|entry| entry.version.as_deref() == Some(version))
    }

    /// Spawns a pass after `delay`.
    ///
    /// `snapshot` is called when the delay elapses and returns the active
    /// locale and namespaces, or `None` to cancel (e.g. the owner is gone).
    /// Nothing is spawned when this session was already checked.
    pub fn schedule<F>(
        self,
        runtime: &tokio::runtime::Handle,
        delay: Duration,
        snapshot: F,
    ) -> Option<tokio::task::JoinHandle<RevalidationOutcome>>
    where
        F: FnOnce() -> Option<(Locale, HashSet<Namespace>)> + Send + 'static,
    {
        if self.already_checked() {
            tracing::debug!("Version check already ran this session");
            return None;
        }

        Some(runtime.spawn(async move {
            tokio::time::sleep(delay).await;
            let Some((locale, active)) = snapshot() else {
                return RevalidationOutcome::AlreadyChecked;
            };
            self.run(&locale, &active).await
        }))
    }

    async fn local_version(&self) -> Option<String> {
        if let Some(version) = self.cache.content_version() {
            return Some(version);
        }
        match self.bundled.fetch_manifest().await {
            Ok(manifest) => Some(manifest.version),
            Err(error) => {
                tracing::debug!(%error, "Bundled version manifest unavailable");
                None
            }
        }
    }
}

/// Whether `remote` is strictly newer than `local`.
///
/// Semantic versions are compared as such; anything else falls back to string
/// order. A missing local version is always older.
#[must_use]
pub fn is_newer(remote: &str, local: Option<&str>) -> bool {
    let Some(local) = local else {
        return true;
    };
    compare_versions(remote, local) == Ordering::Greater
}

fn compare_versions(a: &str, b: &str) -> Ordering {
    match (semver::Version::parse(a), semver::Version::parse(b)) {
        (Ok(a), Ok(b)) => a.cmp(&b),
        _ => a.cmp(b),
    }
}
