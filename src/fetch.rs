//! Remote fetchers for namespace bundles and the version manifest
//!
//! Both documents share one layout under a base location:
//! - `<base>/<locale>/<namespace>.json`: a [`Bundle`]
//! - `<base>/version.json`: a [`VersionManifest`]

mod directory;
mod http;

use std::sync::Arc;

use async_trait::async_trait;
use serde::{
    Deserialize,
    Serialize,
};
use thiserror::Error;

pub use directory::DirectoryFetcher;
pub use http::HttpFetcher;

use crate::translation::Bundle;

pub const VERSION_MANIFEST_FILE: &str = "version.json";

#[derive(Error, Debug)]
pub enum FetchError {
    #[error("Request failed: {0}")]
    Http(#[from] reqwest::Error),

    #[error("HTTP {status}: {url}")]
    Status { status: u16, url: String },

    #[error("Failed to read {path}: {source}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("Malformed document: {0}")]
    Parse(#[from] serde_json::Error),
}

/// Content version published alongside the translations.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct VersionManifest {
    pub version: String,
    /// Publication time, milliseconds since the Unix epoch.
    #[serde(default)]
    pub timestamp: u64,
    #[serde(default)]
    pub updated_namespaces: Vec<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub locales: Option<Vec<String>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub namespaces: Option<Vec<String>>,
}

/// Source of translation documents. One request per call, no retries.
#[async_trait]
pub trait RemoteFetcher: Send + Sync {
    /// # Errors
    /// Network, status or decode failure.
    async fn fetch_bundle(&self, locale: &str, namespace: &str) -> Result<Bundle, FetchError>;

    /// # Errors
    /// Network, status or decode failure.
    async fn fetch_manifest(&self) -> Result<VersionManifest, FetchError>;
}

/// Picks the fetcher matching a base location.
///
/// `http://` and `https://` bases are fetched over the network, anything else
/// is read from the local filesystem.
///
/// # Errors
/// Returns an error when the HTTP client cannot be built.
pub fn fetcher_for(base: &str) -> Result<Arc<dyn RemoteFetcher>, FetchError> {
    if base.starts_with("http://") || base.starts_with("https://") {
        Ok(Arc::new(HttpFetcher::new(base)?))
    } else {
        Ok(Arc::new(DirectoryFetcher::new(base)))
    }
}
