//! テスト用ユーティリティ
//!
//! 複数のテストモジュールで使用される共通のヘルパーを提供します。
#![cfg(test)]
#![allow(clippy::unwrap_used)]

use std::collections::HashMap;
use std::sync::Mutex;

use async_trait::async_trait;
use serde_json::Value;

use crate::fetch::{
    FetchError,
    RemoteFetcher,
    VersionManifest,
};
use crate::translation::Bundle;

/// In-memory [`RemoteFetcher`] that records every request.
///
/// Request paths are recorded as `"<locale>/<namespace>"` or `"version.json"`.
#[derive(Debug, Default)]
pub(crate) struct MockFetcher {
    bundles: Mutex<HashMap<String, Bundle>>,
    manifest: Mutex<Option<VersionManifest>>,
    calls: Mutex<Vec<String>>,
}

impl MockFetcher {
    pub(crate) fn new() -> Self {
        Self::default()
    }

    /// 翻訳データを登録する
    pub(crate) fn with_bundle(self, locale: &str, namespace: &str, json: Value) -> Self {
        self.set_bundle(locale, namespace, json);
        self
    }

    /// バージョンマニフェストを登録する
    pub(crate) fn with_manifest(self, version: &str, updated: &[&str]) -> Self {
        *self.manifest.lock().unwrap() = Some(VersionManifest {
            version: version.to_string(),
            timestamp: 0,
            updated_namespaces: updated.iter().map(ToString::to_string).collect(),
            locales: None,
            namespaces: None,
        });
        self
    }

    pub(crate) fn set_bundle(&self, locale: &str, namespace: &str, json: Value) {
        let bundle: Bundle = serde_json::from_value(json).unwrap();
        self.bundles.lock().unwrap().insert(format!("{locale}/{namespace}"), bundle);
    }

    pub(crate) fn calls(&self) -> Vec<String> {
        self.calls.lock().unwrap().clone()
    }

    pub(crate) fn call_count(&self, path: &str) -> usize {
        self.calls.lock().unwrap().iter().filter(|c| *c == path).count()
    }
}

#[async_trait]
impl RemoteFetcher for MockFetcher {
    async fn fetch_bundle(&self, locale: &str, namespace: &str) -> Result<Bundle, FetchError> {
        let path = format!("{locale}/{namespace}");
        self.calls.lock().unwrap().push(path.clone());
        // ネットワーク往復の代わりに一度制御を返す
        tokio::task::yield_now().await;

        let bundle = self.bundles.lock().unwrap().get(&path).cloned();
        bundle.ok_or(FetchError::Status { status: 404, url: path })
    }

    async fn fetch_manifest(&self) -> Result<VersionManifest, FetchError> {
        self.calls.lock().unwrap().push("version.json".to_string());
        tokio::task::yield_now().await;

        let manifest = self.manifest.lock().unwrap().clone();
        manifest.ok_or_else(|| FetchError::Status { status: 404, url: "version.json".to_string() })
    }
}
