use async_trait::async_trait;
use bytes::Bytes;
use reqwest::{Client, Url};

use crate::error::{Result, UpdateError};

/// Abstraction over downloading asset bytes from the release host.
///
/// The engine only needs the fully resolved payload; retry, timeout, and
/// cancellation policy belong to the implementation or its caller.
#[async_trait]
pub trait AssetFetcher: Send + Sync {
    /// Fetch the complete byte payload behind `url`.
    async fn fetch_bytes(&self, url: &str) -> Result<Bytes>;
}

/// Builder for [`HttpAssetFetcher`].
#[derive(Default)]
pub struct HttpAssetFetcherBuilder {
    client: Option<Client>,
}

impl HttpAssetFetcherBuilder {
    /// Provide a custom reqwest client instance.
    pub fn client(mut self, client: Client) -> Self {
        self.client = Some(client);
        self
    }

    /// Build the fetcher.
    pub fn build(self) -> HttpAssetFetcher {
        HttpAssetFetcher {
            client: self.client.unwrap_or_else(Client::new),
        }
    }
}

/// HTTP fetcher for release-host download URLs.
#[derive(Clone)]
pub struct HttpAssetFetcher {
    client: Client,
}

impl HttpAssetFetcher {
    /// Create a new builder.
    pub fn builder() -> HttpAssetFetcherBuilder {
        HttpAssetFetcherBuilder::default()
    }
}

#[async_trait]
impl AssetFetcher for HttpAssetFetcher {
    async fn fetch_bytes(&self, url: &str) -> Result<Bytes> {
        let url = Url::parse(url)
            .map_err(|err| UpdateError::validation(format!("invalid asset URL: {err}")))?;
        let response = self.client.get(url).send().await?.error_for_status()?;
        Ok(response.bytes().await?)
    }
}
