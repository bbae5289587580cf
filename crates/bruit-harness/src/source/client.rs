//! HTTP client for the ActiveData query service.

use serde_json::Value;
use std::time::Duration;
use tracing::{info, instrument, warn};

use super::{build_query, parse_response, ResponseCache, RunRecord};
use crate::config::{QueryConfig, SourceConfig};
use crate::error::SourceError;

/// Default ActiveData query endpoint.
pub const DEFAULT_ENDPOINT: &str = "http://activedata.allizom.org/query";

/// Posts queries to the measurement store, consulting the response cache
/// first.
///
/// # Example
///
/// ```no_run
/// use bruit_harness::config::Config;
/// use bruit_harness::source::ActiveDataClient;
///
/// # async fn example() -> anyhow::Result<()> {
/// let config = Config::default();
/// let client = ActiveDataClient::new(&config.source)?;
/// let records = client.fetch_records(&config.query).await?;
/// println!("{} records", records.len());
/// # Ok(())
/// # }
/// ```
pub struct ActiveDataClient {
    http: reqwest::Client,
    endpoint: String,
    cache: Option<ResponseCache>,
    refresh: bool,
}

impl ActiveDataClient {
    /// Create a client from the `[source]` configuration section.
    pub fn new(config: &SourceConfig) -> Result<Self, SourceError> {
        let http = reqwest::Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()?;

        Ok(Self {
            http,
            endpoint: config.endpoint.clone(),
            cache: config.cache_dir.as_ref().map(ResponseCache::new),
            refresh: false,
        })
    }

    /// Ignore cached entries (fresh responses are still written back).
    pub fn with_refresh(mut self, refresh: bool) -> Self {
        self.refresh = refresh;
        self
    }

    pub fn endpoint(&self) -> &str {
        &self.endpoint
    }

    /// Run a raw query and return the decoded response body.
    #[instrument(skip(self, query), fields(endpoint = %self.endpoint))]
    pub async fn query(&self, query: &Value) -> Result<Value, SourceError> {
        if let Some(cache) = self.cache.as_ref().filter(|_| !self.refresh) {
            if let Some(body) = cache.get(query)? {
                info!("Using cached response from {}", cache.dir().display());
                return Ok(body);
            }
        }

        info!("Querying ActiveData...");
        let response = self.http.post(&self.endpoint).json(query).send().await?;
        let status = response.status();
        info!("Status: {}", status.as_u16());

        if !status.is_success() {
            return Err(SourceError::Status(status.as_u16()));
        }

        let body = response.text().await?;
        let value: Value = serde_json::from_str(&body)?;

        if let Some(cache) = &self.cache {
            if let Err(e) = cache.put(query, &body) {
                warn!("Failed to cache response: {}", e);
            }
        }

        Ok(value)
    }

    /// Build the query for `config`, run it and decode the run records.
    pub async fn fetch_records(&self, config: &QueryConfig) -> Result<Vec<RunRecord>, SourceError> {
        let query = build_query(config);
        let body = self.query(&query).await?;
        let records = parse_response(&body)?;
        info!("Fetched {} run records", records.len());
        Ok(records)
    }
}
