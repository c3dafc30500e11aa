use reqwest::StatusCode;
use serde::de::DeserializeOwned;
use serde_json::Value;
use url::Url;

use crate::constants::ApiConfig;
use crate::endpoint::{endpoint_url, Endpoint};
use crate::error::{CryptApiError, Result};
use crate::response::{error_message, ApiResponse};

/// Query parameters for a single call, in the order they are sent.
pub type Params = Vec<(&'static str, String)>;

/// HTTP session against the CryptAPI gateway.
///
/// Wraps one `reqwest::Client` (and therefore one connection pool). All
/// gateway calls are GET requests decoded into a typed payload; failures
/// are never retried.
#[derive(Debug, Clone)]
pub struct ApiClient {
    http: reqwest::Client,
    base: Url,
    config: ApiConfig,
}

impl ApiClient {
    /// Client for the public gateway with default settings.
    pub fn new() -> Result<Self> {
        Self::with_config(ApiConfig::default())
    }

    pub fn with_config(config: ApiConfig) -> Result<Self> {
        let http = reqwest::Client::builder()
            .timeout(config.timeout)
            .pool_max_idle_per_host(config.pool_max_idle_per_host)
            .user_agent(concat!("cryptapi-rs/", env!("CARGO_PKG_VERSION")))
            .build()
            .map_err(|e| CryptApiError::Config(format!("failed to build HTTP client: {e}")))?;
        Self::with_http_client(config, http)
    }

    /// Create a client with a custom reqwest::Client.
    pub fn with_http_client(config: ApiConfig, http: reqwest::Client) -> Result<Self> {
        let base = config.base()?;
        Ok(Self { http, base, config })
    }

    pub fn config(&self) -> &ApiConfig {
        &self.config
    }

    /// URL a call to `endpoint` for `coin` would hit, without query.
    pub fn url_for(&self, coin: Option<&str>, endpoint: Endpoint) -> Result<Url> {
        endpoint_url(&self.base, coin, endpoint)
    }

    /// Issue `GET {base}{coin}/{endpoint}/?{params}` and decode the body.
    pub async fn get<T: DeserializeOwned>(
        &self,
        coin: Option<&str>,
        endpoint: Endpoint,
        params: &[(&'static str, String)],
    ) -> Result<T> {
        let url = self.url_for(coin, endpoint)?;
        tracing::debug!(%url, %endpoint, "cryptapi request");

        let resp = self
            .http
            .get(url)
            .query(params)
            .send()
            .await
            .map_err(|e| CryptApiError::Http(format!("{endpoint} request failed: {e}")))?;

        let status = resp.status();
        let body = resp
            .text()
            .await
            .map_err(|e| CryptApiError::Http(format!("failed to read {endpoint} response: {e}")))?;

        let result = decode_body(status, &body);
        if let Err(ref e) = result {
            tracing::warn!(%endpoint, status = status.as_u16(), error = %e, "cryptapi call failed");
        }
        result
    }
}

/// Turn a raw response into a typed payload or an error.
///
/// Non-2xx statuses are backend failures, carrying the body's `error` text
/// when it has one. 2xx bodies go through the status envelope.
pub(crate) fn decode_body<T: DeserializeOwned>(status: StatusCode, body: &str) -> Result<T> {
    let parsed = serde_json::from_str::<Value>(body);

    if !status.is_success() {
        let message = parsed
            .ok()
            .as_ref()
            .and_then(error_message)
            .unwrap_or_else(|| status.to_string());
        return Err(CryptApiError::Api {
            status: Some(status.as_u16()),
            message,
        });
    }

    let value = parsed.map_err(|e| CryptApiError::Decode(format!("response is not JSON: {e}")))?;
    ApiResponse::<T>::from_value(value)?.into_result(Some(status.as_u16()))
}
