//! Filesystem fetcher for bundled translations.

use std::path::{
    Path,
    PathBuf,
};

use async_trait::async_trait;
use serde::de::DeserializeOwned;

use super::{
    FetchError,
    RemoteFetcher,
    VERSION_MANIFEST_FILE,
    VersionManifest,
};
use crate::translation::Bundle;

/// Reads `<root>/<locale>/<namespace>.json` and `<root>/version.json`.
#[derive(Debug, Clone)]
pub struct DirectoryFetcher {
    root: PathBuf,
}

impl DirectoryFetcher {
    #[must_use]
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    #[must_use]
    pub fn root(&self) -> &Path {
        &self.root
    }

    async fn read_json<T: DeserializeOwned>(&self, path: PathBuf) -> Result<T, FetchError> {
        let content = tokio::fs::read_to_string(&path).await.map_err(|source| FetchError::Io {
            path: path.display().to_string(),
            source,
        })?;
        Ok(serde_json::from_str(&content)?)
    }
}

#[async_trait]
impl RemoteFetcher for DirectoryFetcher {
    async fn fetch_bundle(&self, locale: &str, namespace: &str) -> Result<Bundle, FetchError> {
        self.read_json(self.root.join(locale).join(format!("{namespace}.json"))).await
    }

    async fn fetch_manifest(&self) -> Result<VersionManifest, FetchError> {
        self.read_json(self.root.join(VERSION_MANIFEST_FILE)).await
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use std::fs;

    use googletest::prelude::*;
    use tempfile::TempDir;

    use super::*;

    fn locales_dir() -> TempDir {
        let temp_dir = TempDir::new().unwrap();
        fs::create_dir_all(temp_dir.path().join("en")).unwrap();
        fs::write(
            temp_dir.path().join("en").join("common.json"),
            r#"{"nav": {"home": "Home"}}"#,
        )
        .unwrap();
        fs::write(
            temp_dir.path().join("version.json"),
            r#"{"version": "1.0.0", "timestamp": 0, "updatedNamespaces": []}"#,
        )
        .unwrap();
        temp_dir
    }

    #[tokio::test]
    async fn reads_bundle_from_locale_directory() {
        let temp_dir = locales_dir();
        let fetcher = DirectoryFetcher::new(temp_dir.path());

        let bundle = fetcher.fetch_bundle("en", "common").await.unwrap();

        assert_that!(bundle.resolve("nav.home"), some(eq("Home")));
    }

    #[tokio::test]
    async fn reads_version_manifest() {
        let temp_dir = locales_dir();
        let fetcher = DirectoryFetcher::new(temp_dir.path());

        let manifest = fetcher.fetch_manifest().await.unwrap();

        assert_that!(manifest.version, eq("1.0.0"));
    }

    #[tokio::test]
    async fn missing_file_is_io_error() {
        let temp_dir = locales_dir();
        let fetcher = DirectoryFetcher::new(temp_dir.path());

        let result = fetcher.fetch_bundle("cs", "common").await;

        assert!(matches!(result, Err(FetchError::Io { .. })));
    }
}
