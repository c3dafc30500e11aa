use std::time::Duration;

use crate::error::CryptApiError;

/// Base URL of the CryptAPI REST API. Always ends with a slash.
pub const CRYPTAPI_URL: &str = "https://api.cryptapi.io/";

/// Host name of the CryptAPI REST API.
pub const CRYPTAPI_HOST: &str = "api.cryptapi.io";

/// Public page listing every coin and token the gateway supports.
pub const SUPPORTED_COINS_DISPLAY_PAGE: &str = "https://cryptapi.io/cryptocurrencies";

/// Total request timeout used by helper sessions.
pub const DEFAULT_TIMEOUT_SECS: u64 = 180;

/// Idle connections kept per host by a helper session.
pub const DEFAULT_POOL_MAX_IDLE: usize = 32;

/// Forwarding priority understood by every blockchain.
pub const DEFAULT_PRIORITY: &str = "default";

/// Default QR code edge length in pixels.
pub const DEFAULT_QR_SIZE: u32 = 512;

/// Smallest QR code the gateway will render.
pub const MIN_QR_SIZE: u32 = 64;

/// Largest QR code the gateway will render.
pub const MAX_QR_SIZE: u32 = 1024;

/// Runtime API configuration. Lets callers point the client at another
/// deployment (or a local mock) without touching compile-time constants.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ApiConfig {
    pub base_url: String,
    pub timeout: Duration,
    pub pool_max_idle_per_host: usize,
}

impl Default for ApiConfig {
    /// Defaults to the public CryptAPI endpoint.
    fn default() -> Self {
        Self {
            base_url: CRYPTAPI_URL.to_string(),
            timeout: Duration::from_secs(DEFAULT_TIMEOUT_SECS),
            pool_max_idle_per_host: DEFAULT_POOL_MAX_IDLE,
        }
    }
}

impl ApiConfig {
    /// Configuration pointing at `base_url`, other settings default.
    pub fn with_base_url(base_url: impl Into<String>) -> Self {
        Self {
            base_url: base_url.into(),
            ..Self::default()
        }
    }

    /// Read overrides from `CRYPTAPI_BASE_URL` and `CRYPTAPI_TIMEOUT_SECS`.
    ///
    /// Unset or empty variables keep the defaults; an unparsable timeout is
    /// a configuration error rather than a silent fallback.
    pub fn from_env() -> Result<Self, CryptApiError> {
        Self::from_lookup(|name| std::env::var(name).ok())
    }

    /// Same as [`from_env`](Self::from_env), reading variables through `lookup`.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, CryptApiError> {
        let mut config = Self::default();
        let var = |name: &str| lookup(name).filter(|s| !s.trim().is_empty());

        if let Some(base_url) = var("CRYPTAPI_BASE_URL") {
            config.base_url = base_url.trim().to_string();
        }

        if let Some(raw) = var("CRYPTAPI_TIMEOUT_SECS") {
            let secs: u64 = raw.trim().parse().map_err(|e| {
                CryptApiError::Config(format!("invalid CRYPTAPI_TIMEOUT_SECS {raw:?}: {e}"))
            })?;
            config.timeout = Duration::from_secs(secs);
        }

        Ok(config)
    }

    /// Parsed base URL with a guaranteed trailing slash.
    pub fn base(&self) -> Result<url::Url, CryptApiError> {
        let mut raw = self.base_url.trim().to_string();
        if !raw.ends_with('/') {
            raw.push('/');
        }
        url::Url::parse(&raw)
            .map_err(|e| CryptApiError::Config(format!("invalid base url {raw:?}: {e}")))
    }
}
