//! Coordinator construction.

use std::path::PathBuf;
use std::sync::{
    Arc,
    LazyLock,
    Mutex,
};

use super::coordinator::{
    I18n,
    Inner,
};
use super::state::State;
use crate::config::{
    ConfigError,
    I18nConfig,
};
use crate::error::I18nError;
use crate::fetch::{
    RemoteFetcher,
    fetcher_for,
};
use crate::hydration::HydrationPayload;
use crate::interpolation::{
    DoubleBraceInterpolator,
    Interpolator,
};
use crate::locale::{
    LocaleDetector,
    built_in_detectors,
    resolve_locale,
};
use crate::revalidate::Revalidator;
use crate::storage::{
    FileStore,
    KeyValueStore,
    LocalePreference,
    MemoryStore,
    PersistentCache,
};

/// セッションストアの既定値。プロセス内のすべての構築で共有する
static SESSION_STORE: LazyLock<MemoryStore> = LazyLock::new(MemoryStore::new);

/// Builder for [`I18n`].
///
/// Every collaborator has a default: fetchers are derived from the config,
/// detectors are [`built_in_detectors`] and interpolation uses `{{name}}`
/// placeholders. The durable store is a [`FileStore`] under `cacheDir` when
/// set, otherwise an in-memory store that does not outlive the process. The
/// session store is shared by every coordinator built in this process, so the
/// background check runs once per process.
#[must_use]
pub struct I18nBuilder {
    config: I18nConfig,
    bundle_fetcher: Option<Arc<dyn RemoteFetcher>>,
    cdn_fetcher: Option<Arc<dyn RemoteFetcher>>,
    durable_store: Option<Arc<dyn KeyValueStore>>,
    session_store: Option<Arc<dyn KeyValueStore>>,
    detectors: Option<Vec<Box<dyn LocaleDetector>>>,
    interpolator: Option<Box<dyn Interpolator>>,
    hydration: Option<HydrationPayload>,
}

impl std::fmt::Debug for I18nBuilder {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("I18nBuilder")
            .field("config", &self.config)
            .field("hydration", &self.hydration)
            .finish_non_exhaustive()
    }
}

impl I18n {
    pub fn builder(config: I18nConfig) -> I18nBuilder {
        I18nBuilder {
            config,
            bundle_fetcher: None,
            cdn_fetcher: None,
            durable_store: None,
            session_store: None,
            detectors: None,
            interpolator: None,
            hydration: None,
        }
    }
}

impl I18nBuilder {
    /// Source of bundled translations. Defaults to `localeBasePath`.
    pub fn bundle_fetcher(mut self, fetcher: Arc<dyn RemoteFetcher>) -> Self {
        self.bundle_fetcher = Some(fetcher);
        self
    }

    /// Source used by background revalidation. Defaults to `cdnEndpoint`.
    pub fn cdn_fetcher(mut self, fetcher: Arc<dyn RemoteFetcher>) -> Self {
        self.cdn_fetcher = Some(fetcher);
        self
    }

    /// Store that outlives the session: bundles, content version, preference.
    /// Takes precedence over `cacheDir`.
    pub fn durable_store(mut self, store: Arc<dyn KeyValueStore>) -> Self {
        self.durable_store = Some(store);
        self
    }

    /// Store scoped to the session: the revalidation flag. Defaults to a store
    /// shared by the whole process.
    pub fn session_store(mut self, store: Arc<dyn KeyValueStore>) -> Self {
        self.session_store = Some(store);
        self
    }

    /// Replaces the detector chain. An empty chain always picks
    /// `defaultLocale`.
    pub fn detectors(mut self, detectors: Vec<Box<dyn LocaleDetector>>) -> Self {
        self.detectors = Some(detectors);
        self
    }

    pub fn interpolator(mut self, interpolator: impl Interpolator + 'static) -> Self {
        self.interpolator = Some(Box::new(interpolator));
        self
    }

    /// Translations injected by a server render.
    pub fn hydration(mut self, payload: HydrationPayload) -> Self {
        self.hydration = Some(payload);
        self
    }

    /// Builds the coordinator and schedules background revalidation.
    ///
    /// # Errors
    /// - [`I18nError::Config`] when the configuration is invalid
    /// - [`I18nError::NoRuntime`] outside of a tokio runtime
    /// - [`I18nError::Fetcher`] when a default fetcher cannot be created
    /// - [`I18nError::Storage`] when `cacheDir` cannot be created
    pub fn build(self) -> Result<I18n, I18nError> {
        let Self {
            config,
            bundle_fetcher,
            cdn_fetcher,
            durable_store,
            session_store,
            detectors,
            interpolator,
            hydration,
        } = self;

        config.validate().map_err(ConfigError::ValidationErrors)?;
        let runtime = tokio::runtime::Handle::try_current().map_err(|_| I18nError::NoRuntime)?;

        let bundles = match bundle_fetcher {
            Some(fetcher) => fetcher,
            None => fetcher_for(&config.locale_base_path)?,
        };
        let durable: Arc<dyn KeyValueStore> = match (durable_store, &config.cache_dir) {
            (Some(store), _) => store,
            (None, Some(dir)) => Arc::new(FileStore::open(PathBuf::from(dir))?),
            (None, None) => Arc::new(MemoryStore::new()),
        };
        let session: Arc<dyn KeyValueStore> =
            session_store.unwrap_or_else(|| Arc::new(SESSION_STORE.clone()));

        let cache = PersistentCache::new(
            Arc::clone(&durable),
            session,
            config.storage_prefix.clone(),
            config.cache_ttl(),
        );
        let preference = LocalePreference::new(
            durable,
            config.locale_preference_key.clone(),
            config.preference_max_age(),
        );

        let detectors = detectors.unwrap_or_else(|| {
            built_in_detectors(hydration.as_ref().map(|p| p.locale.clone()), preference.clone())
        });
        let locale = resolve_locale(&detectors, &config.supported_locales, &config.default_locale);
        tracing::info!(%locale, "Locale resolved");

        let mut state = State::new(locale);
        if let Some(payload) = &hydration {
            state.hydrate(payload);
        }

        let revalidator = match config.cdn_endpoint.as_deref() {
            Some(endpoint) if config.enable_background_updates => {
                let remote = match cdn_fetcher {
                    Some(fetcher) => fetcher,
                    None => fetcher_for(endpoint)?,
                };
                Some(Revalidator::new(cache.clone(), remote, Arc::clone(&bundles)))
            }
            _ => None,
        };

        let delay = config.version_check_delay();
        let inner = Arc::new(Inner {
            config,
            state: Mutex::new(state),
            bundles,
            cache,
            preference,
            interpolator: interpolator.unwrap_or_else(|| Box::new(DoubleBraceInterpolator)),
            runtime,
            revalidator,
        });

        if let Some(revalidator) = inner.revalidator.clone() {
            let weak = Arc::downgrade(&inner);
            // バックグラウンド更新はリスナーに通知しない
            let _scheduled =
                revalidator.schedule(&inner.runtime, delay, move || I18n::active_snapshot(&weak));
        }

        Ok(I18n { inner })
    }
}
