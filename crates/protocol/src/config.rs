use serde::{Deserialize, Serialize};

pub const DEFAULT_API_ENDPOINT: &str = "http://localhost:8000";
pub const API_ENDPOINT_ENV: &str = "REZONING_API_ENDPOINT";
pub const DEFAULT_REQUEST_TIMEOUT_MS: u64 = 120_000;

/// Where the REZoning API lives and how long to wait for it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ApiConfig {
    pub api_endpoint: String,
    pub request_timeout_ms: u64,
}

impl Default for ApiConfig {
    fn default() -> Self {
        Self {
            api_endpoint: DEFAULT_API_ENDPOINT.to_string(),
            request_timeout_ms: DEFAULT_REQUEST_TIMEOUT_MS,
        }
    }
}

impl ApiConfig {
    /// Defaults, with the endpoint overridden by `REZONING_API_ENDPOINT` when set.
    #[must_use]
    pub fn from_env() -> Self {
        let mut config = Self::default();
        config.apply_env();
        config
    }

    pub fn apply_env(&mut self) {
        if let Ok(endpoint) = std::env::var(API_ENDPOINT_ENV) {
            if !endpoint.trim().is_empty() {
                self.api_endpoint = endpoint.trim().to_string();
            }
        }
    }

    #[must_use]
    pub fn with_endpoint(mut self, endpoint: impl Into<String>) -> Self {
        self.api_endpoint = endpoint.into();
        self
    }

    /// Endpoint without a trailing slash, ready for `format!("{}/path", ..)`.
    #[must_use]
    pub fn endpoint(&self) -> &str {
        self.api_endpoint.trim_end_matches('/')
    }
}
