//! HTTP reachability probe for the datastore REST endpoint.

use std::time::Duration;

use async_trait::async_trait;
use reqwest::Client;

use crate::config::{Config, SecretString};
use crate::error::ProbeFailure;
use crate::health::DependencyProbe;

/// Name reported for the datastore probe.
pub const DATASTORE_PROBE_NAME: &str = "datastore";

/// Header carrying the datastore API key.
const API_KEY_HEADER: &str = "apikey";

/// Probes a URL with `GET`.
///
/// A 2xx response is up. Any other status is a reachable but unhealthy
/// dependency (`Ok(Some(false))`). Transport failures are
/// [`ProbeFailure::Error`].
#[derive(Debug)]
pub struct HttpProbe {
    name: String,
    url: String,
    api_key: Option<SecretString>,
    client: Client,
}

impl HttpProbe {
    /// Create a probe for `url`.
    ///
    /// `request_timeout` bounds the HTTP exchange itself; the aggregator's
    /// probe timeout still applies on top.
    ///
    /// # Errors
    ///
    /// Returns [`ProbeFailure::Error`] if the HTTP client cannot be built.
    pub fn new(
        name: impl Into<String>,
        url: impl Into<String>,
        api_key: Option<SecretString>,
        request_timeout: Duration,
    ) -> Result<Self, ProbeFailure> {
        let client = Client::builder()
            .timeout(request_timeout)
            .build()
            .map_err(|e| ProbeFailure::error(format!("Failed to create HTTP client: {e}")))?;

        Ok(Self {
            name: name.into(),
            url: url.into(),
            api_key,
            client,
        })
    }

    /// Build the datastore probe from configuration, if a URL is configured.
    ///
    /// # Errors
    ///
    /// Returns [`ProbeFailure::Error`] if the HTTP client cannot be built.
    pub fn from_config(config: &Config) -> Result<Option<Self>, ProbeFailure> {
        config
            .datastore_url
            .as_ref()
            .map(|url| {
                Self::new(
                    DATASTORE_PROBE_NAME,
                    url.clone(),
                    config.datastore_api_key.clone(),
                    Duration::from_millis(config.probe_timeout_ms),
                )
            })
            .transpose()
    }

    /// The probed URL.
    #[must_use]
    pub fn url(&self) -> &str {
        &self.url
    }
}

#[async_trait]
impl DependencyProbe for HttpProbe {
    fn name(&self) -> &str {
        &self.name
    }

    async fn check(&self) -> Result<Option<bool>, ProbeFailure> {
        let mut request = self.client.get(&self.url);
        if let Some(key) = self.api_key.as_ref().filter(|key| !key.is_empty()) {
            request = request.header(API_KEY_HEADER, key.header_value()?);
        }

        let response = request.send().await?;
        let status = response.status();
        tracing::debug!(probe = %self.name, url = %self.url, status = status.as_u16(), "Datastore responded");
        Ok(Some(status.is_success()))
    }
}
