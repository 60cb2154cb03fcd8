//! HTTP fetcher backed by `reqwest`.

use std::time::Duration;

use async_trait::async_trait;
use serde::de::DeserializeOwned;

use super::{
    FetchError,
    RemoteFetcher,
    VERSION_MANIFEST_FILE,
    VersionManifest,
};
use crate::translation::Bundle;

const REQUEST_TIMEOUT: Duration = Duration::from_secs(30);

/// Fetches documents from `<base>/...` with plain GET requests.
#[derive(Debug, Clone)]
pub struct HttpFetcher {
    base: String,
    client: reqwest::Client,
}

impl HttpFetcher {
    /// # Errors
    /// Returns an error when the HTTP client cannot be built.
    pub fn new(base: impl Into<String>) -> Result<Self, FetchError> {
        let client = reqwest::Client::builder().timeout(REQUEST_TIMEOUT).build()?;
        Ok(Self::with_client(base, client))
    }

    #[must_use]
    pub fn with_client(base: impl Into<String>, client: reqwest::Client) -> Self {
        let base = base.into().trim_end_matches('/').to_string();
        Self { base, client }
    }

    fn url(&self, path: &str) -> String {
        format!("{}/{path}", self.base)
    }

    async fn get_json<T: DeserializeOwned>(&self, url: String) -> Result<T, FetchError> {
        tracing::debug!(%url, "GET");
        let response = self.client.get(&url).send().await?;

        let status = response.status();
        if !status.is_success() {
            return Err(FetchError::Status { status: status.as_u16(), url });
        }

        let body = response.bytes().await?;
        Ok(serde_json::from_slice(&body)?)
    }
}

#[async_trait]
impl RemoteFetcher for HttpFetcher {
    async fn fetch_bundle(&self, locale: &str, namespace: &str) -> Result<Bundle, FetchError> {
        self.get_json(self.url(&format!("{locale}/{namespace}.json"))).await
    }

    async fn fetch_manifest(&self) -> Result<VersionManifest, FetchError> {
        self.get_json(self.url(VERSION_MANIFEST_FILE)).await
    }
}
