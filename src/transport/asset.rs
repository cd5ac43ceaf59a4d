//! Asset fetching
//!
//! Images, scripts and other resources go through their own client so they
//! never replace the current document or touch navigation metadata.

use crate::config::Config;
use crate::transport::{request_error, AssetFetcher};
use crate::NavigatorError;
use async_trait::async_trait;
use bytes::Bytes;
use reqwest::{redirect::Policy, Client, Method};
use std::time::Duration;
use url::Url;

/// Builds the HTTP client used for asset fetches
///
/// Same identity and timeouts as the navigation client, but redirects are
/// left to reqwest since asset redirect chains are not reported.
pub fn build_asset_client(config: &Config) -> Result<Client, reqwest::Error> {
    Client::builder()
        .user_agent(config.user_agent.header_value())
        .timeout(Duration::from_secs(config.navigator.request_timeout))
        .connect_timeout(Duration::from_secs(config.navigator.connect_timeout))
        .redirect(Policy::limited(config.navigator.max_redirects))
        .https_only(config.navigator.https_only)
        .gzip(true)
        .brotli(true)
        .build()
}

/// reqwest-backed [`AssetFetcher`]
#[derive(Debug, Clone)]
pub struct HttpFetcher {
    client: Client,
}

impl HttpFetcher {
    pub fn new(client: Client) -> Self {
        Self { client }
    }

    pub fn from_config(config: &Config) -> crate::Result<Self> {
        let client = build_asset_client(config).map_err(NavigatorError::ClientBuild)?;
        Ok(Self::new(client))
    }
}

#[async_trait]
impl AssetFetcher for HttpFetcher {
    async fn fetch(&self, method: Method, url: &Url) -> crate::Result<Bytes> {
        tracing::debug!("Fetching asset {} {}", method, url);

        let response = self
            .client
            .request(method, url.clone())
            .send()
            .await
            .map_err(|e| request_error(url, e))?;

        let status = response.status();
        if !status.is_success() {
            return Err(NavigatorError::AssetStatus {
                url: url.to_string(),
                status: status.as_u16(),
            });
        }

        response.bytes().await.map_err(|e| request_error(url, e))
    }
}
