//! Namespace cache and load coordination.

use std::collections::HashSet;
use std::sync::{
    Arc,
    Mutex,
    MutexGuard,
    OnceLock,
    PoisonError,
    Weak,
};

use futures::future::JoinAll;

use super::handle::{
    LoadHandle,
    LoadOutcome,
    Tier,
};
use super::state::State;
use crate::config::I18nConfig;
use crate::error::{
    I18nError,
    LoadError,
};
use crate::fetch::RemoteFetcher;
use crate::interpolation::{
    Interpolator,
    Params,
};
use crate::revalidate::{
    RevalidationOutcome,
    Revalidator,
};
use crate::storage::{
    EntrySource,
    LocalePreference,
    PersistentCache,
};
use crate::translation::Bundle;
use crate::types::{
    Locale,
    Namespace,
    cache_key,
    is_valid_namespace,
};

/// Version tag written with bundles that came from the regular bundle tier.
pub const CONTENT_VERSION: &str = "1.0.0";

/// プロセス全体で共有されるインスタンス
static GLOBAL: OnceLock<I18n> = OnceLock::new();

/// Coordinates translation loading for one process.
///
/// Lookups are synchronous and only read the in-memory tier. Loads go through
/// the persistent cache, the bundle fetcher and the fallback locale, in that
/// order, with at most one load per `(locale, namespace)` in flight.
///
/// Cloning is cheap; clones share all state.
#[derive(Clone)]
pub struct I18n {
    pub(super) inner: Arc<Inner>,
}

/// Shared coordinator internals.
pub(super) struct Inner {
    pub(super) config: I18nConfig,
    pub(super) state: Mutex<State>,
    /// Source of `<locale>/<namespace>` bundles
    pub(super) bundles: Arc<dyn RemoteFetcher>,
    pub(super) cache: PersistentCache,
    pub(super) preference: LocalePreference,
    pub(super) interpolator: Box<dyn Interpolator>,
    pub(super) runtime: tokio::runtime::Handle,
    /// Present when a CDN endpoint is configured and updates are enabled
    pub(super) revalidator: Option<Revalidator>,
}

impl std::fmt::Debug for I18n {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("I18n")
            .field("config", &self.inner.config)
            .field("state", &*self.inner.lock())
            .field("revalidator", &self.inner.revalidator)
            .finish_non_exhaustive()
    }
}

/// Registration returned by [`I18n::subscribe`].
///
/// Dropping it keeps the listener registered; call
/// [`Subscription::unsubscribe`] to remove it.
pub struct Subscription {
    inner: Weak<Inner>,
    id: u64,
}

impl std::fmt::Debug for Subscription {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Subscription").field("id", &self.id).finish_non_exhaustive()
    }
}

impl Subscription {
    /// Removes the listener. Does nothing if the coordinator is gone.
    pub fn unsubscribe(self) {
        if let Some(inner) = self.inner.upgrade() {
            inner.lock().listeners.remove(&self.id);
        }
    }
}

impl Inner {
    pub(super) fn lock(&self) -> MutexGuard<'_, State> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// 変更をリスナーに通知する（ロックの外で呼び出す）
    fn notify(&self) {
        let listeners = self.lock().listeners();
        for listener in listeners {
            listener();
        }
    }

    /// Stores `bundle` under `key` and notifies listeners.
    fn adopt(&self, key: &str, namespace: &str, bundle: Arc<Bundle>) {
        self.lock().adopt(key, namespace, bundle);
        self.notify();
    }

    /// Runs the tiers for one key, strictly in order.
    async fn resolve(&self, locale: &str, namespace: &str, key: &str) -> LoadOutcome {
        if let Some(bundle) = self.cache.get(locale, namespace) {
            tracing::debug!(%locale, %namespace, tier = "persistent-cache", "Namespace loaded");
            self.adopt(key, namespace, Arc::new(bundle));
            return LoadOutcome::Loaded(Tier::PersistentCache);
        }

        match self.bundles.fetch_bundle(locale, namespace).await {
            Ok(bundle) => {
                tracing::debug!(%locale, %namespace, tier = "remote", "Namespace loaded");
                self.cache.set(locale, namespace, &bundle, CONTENT_VERSION, EntrySource::Bundled);
                self.adopt(key, namespace, Arc::new(bundle));
                return LoadOutcome::Loaded(Tier::Remote);
            }
            Err(error) => {
                tracing::debug!(%locale, %namespace, %error, "Bundle fetch failed");
            }
        }

        if let Some(fallback) = self.config.fallback_locale.as_deref().filter(|f| *f != locale)
            && let Some(bundle) = self.fallback_bundle(fallback, namespace).await
        {
            tracing::debug!(%locale, %namespace, %fallback, tier = "fallback", "Namespace loaded");
            self.adopt(key, namespace, bundle);
            return LoadOutcome::Loaded(Tier::Fallback);
        }

        tracing::warn!(%locale, %namespace, "No translations available");
        self.lock().failed.insert(key.to_string());
        LoadOutcome::Unavailable
    }

    /// Data for `namespace` in the fallback locale, shared with its own key.
    async fn fallback_bundle(&self, fallback: &str, namespace: &str) -> Option<Arc<Bundle>> {
        let fallback_key = cache_key(fallback, namespace);
        let resident = self.lock().memory.get(&fallback_key).cloned();
        if resident.is_some() {
            return resident;
        }

        match self.bundles.fetch_bundle(fallback, namespace).await {
            Ok(bundle) => {
                self.cache.set(fallback, namespace, &bundle, CONTENT_VERSION, EntrySource::Bundled);
                let bundle = Arc::new(bundle);
                self.lock().memory.insert(fallback_key, Arc::clone(&bundle));
                Some(bundle)
            }
            Err(error) => {
                tracing::debug!(%fallback, %namespace, %error, "Fallback bundle fetch failed");
                None
            }
        }
    }
}

/// Starts (or joins) the load for `namespace` in the current locale.
///
/// Called with the state lock held so that checking and registering the
/// in-flight handle is atomic.
fn start_load(inner: &Arc<Inner>, state: &mut State, namespace: &str) -> LoadHandle {
    let key = state.current_key(namespace);

    if state.memory.contains_key(&key) {
        state.loaded.insert(namespace.to_string());
        return LoadHandle::ready(Ok(LoadOutcome::Resident));
    }
    if let Some(handle) = state.in_flight.get(&key) {
        return handle.clone();
    }

    let task_inner = Arc::clone(inner);
    let locale = state.locale.clone();
    let task_namespace = namespace.to_string();
    let task_key = key.clone();
    let handle = LoadHandle::new(async move {
        let outcome = task_inner.resolve(&locale, &task_namespace, &task_key).await;
        task_inner.lock().in_flight.remove(&task_key);
        Ok(outcome)
    });

    state.in_flight.insert(key, handle.clone());
    // spawn はその場で poll しないため、ロック中でも安全
    inner.runtime.spawn(handle.clone());
    handle
}

impl I18n {
    /// Installs `self` as the process-wide instance.
    ///
    /// # Errors
    /// Returns [`I18nError::AlreadyInitialized`] when an instance was already
    /// installed.
    pub fn install(self) -> Result<&'static Self, I18nError> {
        GLOBAL.set(self).map_err(|_| I18nError::AlreadyInitialized)?;
        Self::global()
    }

    /// The process-wide instance.
    ///
    /// # Errors
    /// Returns [`I18nError::NotInitialized`] before [`I18n::install`].
    pub fn global() -> Result<&'static Self, I18nError> {
        GLOBAL.get().ok_or(I18nError::NotInitialized)
    }

    #[must_use]
    pub fn config(&self) -> &I18nConfig {
        &self.inner.config
    }

    #[must_use]
    pub fn current_locale(&self) -> Locale {
        self.inner.lock().locale.clone()
    }

    /// Switches the active locale.
    ///
    /// Unsupported or unchanged locales are ignored. Otherwise the choice is
    /// persisted, every active namespace is reloaded in the background, and
    /// listeners are notified once without waiting for the reloads.
    pub fn set_locale(&self, locale: &str) {
        if !self.inner.config.is_supported(locale) {
            tracing::debug!(%locale, "Ignoring unsupported locale");
            return;
        }

        let namespaces: Vec<Namespace> = {
            let mut state = self.inner.lock();
            if state.locale == locale {
                return;
            }
            state.locale = locale.to_string();
            state.suspense.clear();
            state.failed.clear();
            state.loaded.iter().cloned().collect()
        };

        tracing::info!(%locale, namespaces = namespaces.len(), "Locale changed");
        self.inner.preference.save(locale);

        for namespace in &namespaces {
            // 完了はリスナー経由で通知される
            drop(self.load_namespace(namespace));
        }
        self.inner.notify();
    }

    /// Loads `namespace` for the current locale.
    ///
    /// Concurrent calls for the same locale and namespace share one load. The
    /// load is spawned immediately, so dropping the handle does not cancel it.
    pub fn load_namespace(&self, namespace: &str) -> LoadHandle {
        if !is_valid_namespace(namespace) {
            return LoadHandle::ready(Err(LoadError::InvalidNamespace(namespace.to_string())));
        }
        let mut state = self.inner.lock();
        start_load(&self.inner, &mut state, namespace)
    }

    /// Loads every namespace; settles once all of them have settled.
    ///
    /// Results are in input order. One failure does not affect the others.
    pub fn load_namespaces<I, S>(&self, namespaces: I) -> JoinAll<LoadHandle>
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        futures::future::join_all(namespaces.into_iter().map(|ns| self.load_namespace(ns.as_ref())))
    }

    /// Translates `key` from `namespace` in the current locale.
    ///
    /// Never fails: missing data, missing keys and non-string values all
    /// return `key` unchanged. Dots in `key` descend into nested bundles.
    #[must_use]
    pub fn lookup(&self, key: &str, namespace: &str, params: Option<&Params>) -> String {
        let bundle = {
            let state = self.inner.lock();
            state.memory.get(&state.current_key(namespace)).cloned()
        };

        bundle
            .as_deref()
            .and_then(|bundle| bundle.resolve(key))
            .map_or_else(|| key.to_string(), |text| self.inner.interpolator.interpolate(text, params))
    }

    /// [`I18n::lookup`] in the default namespace.
    #[must_use]
    pub fn t(&self, key: &str, params: Option<&Params>) -> String {
        self.lookup(key, &self.inner.config.default_namespace, params)
    }

    /// Whether `namespace` has data in memory for the current locale.
    #[must_use]
    pub fn is_loaded(&self, namespace: &str) -> bool {
        let state = self.inner.lock();
        state.memory.contains_key(&state.current_key(namespace))
    }

    #[must_use]
    pub fn get_translation(&self, namespace: &str) -> Option<Arc<Bundle>> {
        let state = self.inner.lock();
        state.memory.get(&state.current_key(namespace)).cloned()
    }

    /// Namespaces in use this session, sorted.
    #[must_use]
    pub fn loaded_namespaces(&self) -> Vec<Namespace> {
        let mut namespaces: Vec<Namespace> = self.inner.lock().loaded.iter().cloned().collect();
        namespaces.sort();
        namespaces
    }

    /// Registers a listener called after every successful load and locale
    /// change. Background revalidation does not notify.
    pub fn subscribe(&self, listener: impl Fn() + Send + Sync + 'static) -> Subscription {
        let mut state = self.inner.lock();
        let id = state.next_id();
        state.listeners.insert(id, Arc::new(listener));
        Subscription { inner: Arc::downgrade(&self.inner), id }
    }

    /// A pending handle to wait on before rendering `namespace`.
    ///
    /// Returns `None` when the data is already resident or an earlier load
    /// for this locale failed. While a load is outstanding, every call returns
    /// the same handle. A failed load marks the key so later calls return
    /// `None` instead of retrying.
    #[must_use]
    pub fn suspension_handle(&self, namespace: &str) -> Option<LoadHandle> {
        if !is_valid_namespace(namespace) {
            return None;
        }

        let mut state = self.inner.lock();
        let key = state.current_key(namespace);
        if state.memory.contains_key(&key) || state.failed.contains(&key) {
            return None;
        }
        if let Some((_, handle)) = state.suspense.get(&key) {
            return Some(handle.clone());
        }

        let id = state.next_id();
        let load = start_load(&self.inner, &mut state, namespace);
        let inner = Arc::clone(&self.inner);
        let task_key = key.clone();
        let handle = LoadHandle::new(async move {
            let result = load.await;

            let mut state = inner.lock();
            if state.suspense.get(&task_key).is_some_and(|(current, _)| *current == id) {
                state.suspense.remove(&task_key);
            }
            if !result.as_ref().is_ok_and(|outcome| outcome.is_available()) {
                state.failed.insert(task_key);
            }
            drop(state);

            result
        });

        state.suspense.insert(key, (id, handle.clone()));
        self.inner.runtime.spawn(handle.clone());
        Some(handle)
    }

    /// Runs the background version check now instead of waiting for the
    /// scheduled pass. Returns `None` when revalidation is not configured.
    pub async fn revalidate(&self) -> Option<RevalidationOutcome> {
        let revalidator = self.inner.revalidator.clone()?;
        let (locale, active) = {
            let state = self.inner.lock();
            (state.locale.clone(), state.loaded.clone())
        };
        Some(revalidator.run(&locale, &active).await)
    }

    /// Snapshot for the scheduled revalidation pass.
    pub(super) fn active_snapshot(inner: &Weak<Inner>) -> Option<(Locale, HashSet<Namespace>)> {
        let inner = inner.upgrade()?;
        let state = inner.lock();
        Some((state.locale.clone(), state.loaded.clone()))
    }
}
