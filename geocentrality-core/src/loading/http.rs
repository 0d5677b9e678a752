//! Blocking HTTP access to the map services, optionally cached on disk

use log::{debug, info};
use reqwest::blocking::{Client, RequestBuilder};

use super::cache::ResponseCache;
use super::config::ProviderConfig;
use crate::Error;

#[derive(Debug, Clone)]
pub(crate) struct HttpFetcher {
    client: Client,
    cache: Option<ResponseCache>,
}

impl HttpFetcher {
    pub(crate) fn new(config: &ProviderConfig) -> Result<Self, Error> {
        let client = Client::builder()
            .user_agent(config.user_agent.clone())
            .timeout(config.timeout())
            .build()?;
        let cache = config.cache_dir().map(ResponseCache::new);
        Ok(Self { client, cache })
    }

    pub(crate) fn client(&self) -> &Client {
        &self.client
    }

    /// Body of the response to `request`, read from the cache when an entry
    /// for (`kind`, `key`) exists and stored there otherwise.
    pub(crate) fn fetch(
        &self,
        kind: &str,
        key: &str,
        request: RequestBuilder,
    ) -> Result<String, Error> {
        if let Some(body) = self.cache.as_ref().and_then(|cache| cache.get(kind, key)) {
            return Ok(body);
        }

        info!("Requesting {kind} data for '{key}'");
        let body = request.send()?.error_for_status()?.text()?;
        debug!("Received {} bytes from {kind}", body.len());

        if let Some(cache) = &self.cache {
            cache.put(kind, key, &body)?;
        }
        Ok(body)
    }
}
