//! コーディネーターの可変状態

use std::collections::{
    BTreeMap,
    HashMap,
    HashSet,
};
use std::sync::Arc;

use super::handle::LoadHandle;
use crate::hydration::HydrationPayload;
use crate::translation::Bundle;
use crate::types::{
    Locale,
    Namespace,
    cache_key,
};

/// Change listener. Invoked with no arguments.
pub type Listener = Arc<dyn Fn() + Send + Sync>;

/// コーディネーターの可変状態
///
/// 1 つの `Mutex` の中にまとめて保持する。ロックを保持したまま `await`
/// したり、リスナーを呼び出したりしてはならない。
#[derive(Default)]
pub(crate) struct State {
    /// 現在のロケール
    pub(crate) locale: Locale,
    /// `"<locale>:<namespace>"` → 翻訳データ（同期 lookup の唯一の参照先）
    pub(crate) memory: HashMap<String, Arc<Bundle>>,
    /// 現在のセッションで使用中の namespace
    pub(crate) loaded: HashSet<Namespace>,
    /// 読み込み中のキー → ハンドル（キーごとに最大 1 つ）
    pub(crate) in_flight: HashMap<String, LoadHandle>,
    /// suspension 用にメモ化したハンドル（世代 ID 付き）
    pub(crate) suspense: HashMap<String, (u64, LoadHandle)>,
    /// 全ティアで取得できなかったキー
    pub(crate) failed: HashSet<String>,
    /// 登録 ID → リスナー
    pub(crate) listeners: BTreeMap<u64, Listener>,
    /// リスナーと suspension ハンドルの ID 採番用
    next_id: u64,
}

impl State {
    pub(crate) fn new(locale: Locale) -> Self {
        Self { locale, ..Self::default() }
    }

    /// サーバーから注入された翻訳でメモリキャッシュを埋める
    pub(crate) fn hydrate(&mut self, payload: &HydrationPayload) {
        for (key, namespace, bundle) in payload.entries() {
            self.memory.insert(key.to_string(), Arc::new(bundle.clone()));
            self.loaded.insert(namespace.to_string());
        }
    }

    pub(crate) fn current_key(&self, namespace: &str) -> String {
        cache_key(&self.locale, namespace)
    }

    pub(crate) const fn next_id(&mut self) -> u64 {
        self.next_id += 1;
        self.next_id
    }

    /// Stores data under `key` and marks the namespace active.
    pub(crate) fn adopt(&mut self, key: &str, namespace: &str, bundle: Arc<Bundle>) {
        self.memory.insert(key.to_string(), bundle);
        self.loaded.insert(namespace.to_string());
        self.failed.remove(key);
    }

    pub(crate) fn listeners(&self) -> Vec<Listener> {
        self.listeners.values().cloned().collect()
    }
}

impl std::fmt::Debug for State {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("State")
            .field("locale", &self.locale)
            .field("memory", &self.memory.keys().collect::<Vec<_>>())
            .field("loaded", &self.loaded)
            .field("in_flight", &self.in_flight.keys().collect::<Vec<_>>())
            .field("suspense", &self.suspense.keys().collect::<Vec<_>>())
            .field("failed", &self.failed)
            .field("listeners", &self.listeners.len())
            .finish()
    }
}
