use crate::error::{ExploreError, Result, ZoneFetchError};
use crate::service::ZoneService;
use async_trait::async_trait;
use reqwest::Client;
use rezoning_filters::FilterSchema;
use rezoning_protocol::{ApiConfig, ZonePayload, ZoneRequestParams};
use std::time::Duration;

/// HTTP client for the REZoning API.
#[derive(Debug, Clone)]
pub struct ApiClient {
    client: Client,
    config: ApiConfig,
}

impl ApiClient {
    pub fn new(config: ApiConfig) -> Result<Self> {
        let client = Client::builder()
            .timeout(Duration::from_millis(config.request_timeout_ms))
            .build()
            .map_err(|e| ExploreError::Other(format!("failed to build HTTP client: {e}")))?;
        Ok(Self { client, config })
    }

    #[must_use]
    pub fn config(&self) -> &ApiConfig {
        &self.config
    }

    #[must_use]
    pub fn schema_url(&self) -> String {
        format!("{}/filter/schema", self.config.endpoint())
    }

    /// `GET /filter/schema`. Any failure here is fatal to session start-up.
    pub async fn fetch_filter_schema(&self) -> Result<FilterSchema> {
        let url = self.schema_url();
        log::debug!("GET {url}");
        let body = self
            .client
            .get(&url)
            .send()
            .await
            .and_then(reqwest::Response::error_for_status)
            .map_err(|e| ExploreError::SchemaLoad(format!("GET {url}: {e}")))?
            .bytes()
            .await
            .map_err(|e| ExploreError::SchemaLoad(format!("GET {url}: {e}")))?;
        let schema = FilterSchema::from_slice(&body)
            .map_err(|e| ExploreError::SchemaLoad(e.to_string()))?;
        log::info!("Loaded filter schema with {} filters", schema.len());
        Ok(schema)
    }
}

/// Zones endpoint for `params`: per-zone by default, a regular grid of
/// `size_km2` cells when grid mode is on.
#[must_use]
pub fn zones_url(config: &ApiConfig, params: &ZoneRequestParams) -> String {
    let base = format!(
        "{}/zones/{}/{}",
        config.endpoint(),
        params.area_id,
        params.resource.api_name()
    );
    match params.grid {
        Some(grid) => format!("{base}/grid/{}?{}", grid.size_km2, params.filters),
        None => format!("{base}?{}", params.filters),
    }
}

#[async_trait]
impl ZoneService for ApiClient {
    async fn generate_zones(
        &self,
        params: &ZoneRequestParams,
    ) -> std::result::Result<ZonePayload, ZoneFetchError> {
        let url = zones_url(&self.config, params);
        log::debug!("POST {url}");
        let response = self.client.post(&url).json(&params.body()).send().await?;
        let status = response.status();
        if !status.is_success() {
            return Err(ZoneFetchError::Status {
                status: status.as_u16(),
                url,
            });
        }
        let body = response.bytes().await?;
        let zones: ZonePayload = serde_json::from_slice(&body)?;
        log::info!("Received {} zones for {}", zones.len(), params.area_id);
        Ok(zones)
    }
}
