//! HTTP 経由の読み込みとバックグラウンド再検証のテスト

#![allow(clippy::unwrap_used)]
#![allow(missing_docs)]

use std::sync::Arc;

use edge_i18n::config::I18nConfig;
use edge_i18n::revalidate::RevalidationOutcome;
use edge_i18n::storage::{
    MemoryStore,
    PersistentCache,
};
use edge_i18n::{
    I18n,
    LoadOutcome,
    Tier,
};
use googletest::prelude::*;
use serde_json::json;
use wiremock::matchers::{
    method,
    path,
};
use wiremock::{
    Mock,
    MockServer,
    ResponseTemplate,
};

async fn mount_json(server: &MockServer, route: &str, body: serde_json::Value) {
    Mock::given(method("GET"))
        .and(path(route))
        .respond_with(ResponseTemplate::new(200).set_body_json(body))
        .mount(server)
        .await;
}

#[tokio::test]
async fn concurrent_loads_issue_one_request() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/locales/en/common.json"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"hello": "Hello"})))
        .expect(1)
        .mount(&server)
        .await;

    let mut config = I18nConfig::new("en", &["en"]);
    config.locale_base_path = format!("{}/locales", server.uri());
    let i18n = I18n::builder(config).detectors(Vec::new()).build().unwrap();

    let handles: Vec<_> = (0..5).map(|_| i18n.load_namespace("common")).collect();
    let results = futures::future::join_all(handles).await;

    assert_that!(results, each(ok(eq(&LoadOutcome::Loaded(Tier::Remote)))));
    assert_that!(i18n.t("hello", None), eq("Hello"));
    // `expect(1)` は MockServer の drop 時に検証される
}

#[tokio::test]
async fn revalidation_writes_persistent_tier_only() {
    let bundled = MockServer::start().await;
    mount_json(&bundled, "/locales/version.json", json!({"version": "1.0.0"})).await;
    mount_json(&bundled, "/locales/en/common.json", json!({"hello": "Hello"})).await;

    let cdn = MockServer::start().await;
    mount_json(
        &cdn,
        "/version.json",
        json!({"version": "1.1.0", "timestamp": 1, "updatedNamespaces": ["common", "unused"]}),
    )
    .await;
    mount_json(&cdn, "/en/common.json", json!({"hello": "Hello from the CDN"})).await;

    let durable = MemoryStore::new();
    let mut config = I18nConfig::new("en", &["en"]);
    config.locale_base_path = format!("{}/locales", bundled.uri());
    config.cdn_endpoint = Some(cdn.uri());
    // 手動で実行するため、スケジュールされた実行は十分に遅らせる
    config.version_check_delay = 60 * 60 * 1000;

    let i18n = I18n::builder(config.clone())
        .durable_store(Arc::new(durable.clone()))
        .session_store(Arc::new(MemoryStore::new()))
        .detectors(Vec::new())
        .build()
        .unwrap();
    let _ = i18n.load_namespace("common").await;

    let outcome = i18n.revalidate().await;

    assert_that!(outcome, some(eq(&RevalidationOutcome::Refreshed(vec!["common".to_string()]))));
    assert_that!(i18n.t("hello", None), eq("Hello"));

    let cache = PersistentCache::new(
        Arc::new(durable),
        Arc::new(MemoryStore::new()),
        config.storage_prefix.clone(),
        config.cache_ttl(),
    );
    let refreshed = cache.get("en", "common").unwrap();
    assert_that!(refreshed.resolve("hello"), some(eq("Hello from the CDN")));
    // "unused" はまだ取得していないため、バージョンは記録しない
    assert_that!(cache.content_version(), none());
}

#[tokio::test]
async fn unreachable_cdn_is_silent() {
    let bundled = MockServer::start().await;
    mount_json(&bundled, "/en/common.json", json!({"hello": "Hello"})).await;
    let cdn = MockServer::start().await;

    let mut config = I18nConfig::new("en", &["en"]);
    config.locale_base_path = bundled.uri();
    config.cdn_endpoint = Some(cdn.uri());
    config.version_check_delay = 60 * 60 * 1000;

    let i18n = I18n::builder(config)
        .session_store(Arc::new(MemoryStore::new()))
        .detectors(Vec::new())
        .build()
        .unwrap();
    let _ = i18n.load_namespace("common").await;

    assert_that!(i18n.revalidate().await, some(eq(&RevalidationOutcome::ManifestUnavailable)));
    assert_that!(i18n.t("hello", None), eq("Hello"));
}
