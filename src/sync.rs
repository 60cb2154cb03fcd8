//! Build-time mirroring of remote translations
//!
//! Copies the version manifest and every `(locale, namespace)` document from
//! a remote source into a local directory, so that the next build ships the
//! latest content as its bundled translations. Nothing here is fatal: when the
//! source is unreachable the existing files are kept as they are.

use std::path::{
    Path,
    PathBuf,
};

use serde::Serialize;

use crate::fetch::{
    RemoteFetcher,
    VERSION_MANIFEST_FILE,
};
use crate::types::{
    Locale,
    Namespace,
    is_valid_namespace,
};

/// Why a sync wrote nothing.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SkipReason {
    /// `version.json` could not be fetched or parsed.
    ManifestUnavailable,
    /// Neither the caller nor the manifest named any locale.
    NoLocales,
    /// Neither the caller nor the manifest named any namespace.
    NoNamespaces,
}

/// Result of one [`mirror`] run.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SyncReport {
    /// Version of the mirrored manifest
    pub version: Option<String>,
    /// Files written, relative to the output directory
    pub written: Vec<String>,
    /// Files that could not be fetched or written
    pub failed: Vec<String>,
    pub skipped: Option<SkipReason>,
}

impl SyncReport {
    const fn skipped(reason: SkipReason) -> Self {
        Self { version: None, written: Vec::new(), failed: Vec::new(), skipped: Some(reason) }
    }
}

/// Mirrors remote translations into `out_dir`.
///
/// `locales` and `namespaces` override the lists published in the manifest.
/// Files are written as pretty-printed JSON to `<out_dir>/version.json` and
/// `<out_dir>/<locale>/<namespace>.json`.
pub async fn mirror(
    fetcher: &dyn RemoteFetcher,
    out_dir: &Path,
    locales: Option<Vec<Locale>>,
    namespaces: Option<Vec<Namespace>>,
) -> SyncReport {
    let manifest = match fetcher.fetch_manifest().await {
        Ok(manifest) => manifest,
        Err(error) => {
            tracing::warn!(%error, "Failed to fetch {VERSION_MANIFEST_FILE}");
            return SyncReport::skipped(SkipReason::ManifestUnavailable);
        }
    };

    let locales = locales.or_else(|| manifest.locales.clone()).unwrap_or_default();
    if locales.is_empty() {
        tracing::warn!("No locales to fetch: set them explicitly or publish them in the manifest");
        return SyncReport::skipped(SkipReason::NoLocales);
    }
    let namespaces = namespaces.or_else(|| manifest.namespaces.clone()).unwrap_or_default();
    if namespaces.is_empty() {
        tracing::warn!("No namespaces to fetch: set them explicitly or publish them in the manifest");
        return SyncReport::skipped(SkipReason::NoNamespaces);
    }

    tracing::info!(locales = ?locales, namespaces = ?namespaces, "Mirroring translations");

    let mut report = SyncReport { version: Some(manifest.version.clone()), ..SyncReport::default() };

    match write_json(&out_dir.join(VERSION_MANIFEST_FILE), &manifest).await {
        Ok(()) => {
            tracing::info!(version = %manifest.version, "Updated {VERSION_MANIFEST_FILE}");
            report.written.push(VERSION_MANIFEST_FILE.to_string());
        }
        Err(error) => {
            tracing::warn!(%error, "Failed to write {VERSION_MANIFEST_FILE}");
            report.failed.push(VERSION_MANIFEST_FILE.to_string());
        }
    }

    for locale in &locales {
        for namespace in &namespaces {
            let relative = format!("{locale}/{namespace}.json");

            // ロケールと namespace はそのままパスになる
            if !is_valid_namespace(locale) || !is_valid_namespace(namespace) {
                tracing::warn!(file = %relative, "Skipping unsafe path");
                report.failed.push(relative);
                continue;
            }

            let bundle = match fetcher.fetch_bundle(locale, namespace).await {
                Ok(bundle) => bundle,
                Err(error) => {
                    tracing::warn!(file = %relative, %error, "Failed to fetch");
                    report.failed.push(relative);
                    continue;
                }
            };

            let path: PathBuf = out_dir.join(locale).join(format!("{namespace}.json"));
            match write_json(&path, &bundle).await {
                Ok(()) => {
                    tracing::info!(file = %relative, "Updated");
                    report.written.push(relative);
                }
                Err(error) => {
                    tracing::warn!(file = %relative, %error, "Failed to write");
                    report.failed.push(relative);
                }
            }
        }
    }

    tracing::info!(
        written = report.written.len(),
        failed = report.failed.len(),
        "Translation fetch complete"
    );
    report
}

/// `value` を整形済み JSON として書き込む（親ディレクトリも作成する）
async fn write_json<T: Serialize + Sync>(path: &Path, value: &T) -> std::io::Result<()> {
    if let Some(parent) = path.parent() {
        tokio::fs::create_dir_all(parent).await?;
    }
    let content = serde_json::to_string_pretty(value)?;
    tokio::fs::write(path, content).await
}
