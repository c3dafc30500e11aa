//! Gateway endpoints and URL construction.
//!
//! Every call is `GET {base}{coin}/{endpoint}/` with query parameters. The
//! coin segment is omitted for service-wide endpoints.

use std::fmt;

use url::Url;

use crate::error::{CryptApiError, Result};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Endpoint {
    Info,
    Estimate,
    Create,
    Logs,
    QrCode,
    Convert,
}

impl Endpoint {
    pub fn path(self) -> &'static str {
        match self {
            Self::Info => "info",
            Self::Estimate => "estimate",
            Self::Create => "create",
            Self::Logs => "logs",
            Self::QrCode => "qrcode",
            Self::Convert => "convert",
        }
    }
}

impl fmt::Display for Endpoint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.path())
    }
}

/// Normalize a ticker to its URL path form: `trc20_usdt` becomes `trc20/usdt`.
///
/// Only ASCII letters, digits, `-`, `_` and `/` are accepted, and every
/// segment must be non-empty.
pub fn coin_path(coin: &str) -> Result<String> {
    let coin = coin.trim().trim_matches('/');
    if coin.is_empty() {
        return Err(CryptApiError::Validation("coin is missing".to_string()));
    }
    let path = coin.replace('_', "/");
    let well_formed = coin
        .chars()
        .all(|c| c.is_ascii_alphanumeric() || matches!(c, '-' | '_' | '/'))
        && path.split('/').all(|segment| !segment.is_empty());
    if !well_formed {
        return Err(CryptApiError::Validation(format!("invalid coin ticker {coin:?}")));
    }
    Ok(path)
}

/// Build the full URL for `endpoint`, optionally scoped to `coin`.
///
/// Segments are appended to the base path one by one, so the result always
/// stays on the base host.
pub fn endpoint_url(base: &Url, coin: Option<&str>, endpoint: Endpoint) -> Result<Url> {
    let coin = coin.map(coin_path).transpose()?;
    let mut url = base.clone();
    {
        let mut segments = url
            .path_segments_mut()
            .map_err(|_| CryptApiError::Config(format!("base url {base} cannot carry a path")))?;
        segments.pop_if_empty();
        if let Some(coin) = &coin {
            segments.extend(coin.split('/'));
        }
        segments.push(endpoint.path()).push("");
    }
    Ok(url)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn base() -> Url {
        Url::parse("https://api.cryptapi.io/").unwrap()
    }

    #[test]
    fn test_service_wide_url() {
        let url = endpoint_url(&base(), None, Endpoint::Info).unwrap();
        assert_eq!(url.as_str(), "https://api.cryptapi.io/info/");
    }

    #[test]
    fn test_underscore_ticker_becomes_path() {
        let url = endpoint_url(&base(), Some("trc20_usdt"), Endpoint::Estimate).unwrap();
        assert_eq!(url.as_str(), "https://api.cryptapi.io/trc20/usdt/estimate/");
    }

    #[test]
    fn test_slash_ticker_kept() {
        let url = endpoint_url(&base(), Some("polygon/usdt"), Endpoint::QrCode).unwrap();
        assert_eq!(url.as_str(), "https://api.cryptapi.io/polygon/usdt/qrcode/");
    }

    #[test]
    fn test_base_with_path_prefix() {
        let base = Url::parse("http://127.0.0.1:9000/mock/").unwrap();
        let url = endpoint_url(&base, Some("btc"), Endpoint::Create).unwrap();
        assert_eq!(url.as_str(), "http://127.0.0.1:9000/mock/btc/create/");
    }

    #[test]
    fn test_rejects_empty_and_malformed_tickers() {
        assert!(matches!(coin_path("  "), Err(CryptApiError::Validation(_))));
        assert!(matches!(coin_path("btc?x=1"), Err(CryptApiError::Validation(_))));
        assert!(matches!(coin_path("../admin"), Err(CryptApiError::Validation(_))));
        assert!(matches!(coin_path("trc20__usdt"), Err(CryptApiError::Validation(_))));
    }

    #[test]
    fn test_crafted_tickers_cannot_leave_base() {
        for coin in [r"\\evil.example", "%2e%2e/%2e%2e/admin", "http:evil.example", "//evil.example/x"] {
            let err = endpoint_url(&base(), Some(coin), Endpoint::Info).unwrap_err();
            assert!(matches!(err, CryptApiError::Validation(_)), "{coin}: {err:?}");
        }
    }

    #[test]
    fn test_dash_ticker_accepted() {
        let url = endpoint_url(&base(), Some("arb-nova_usdc"), Endpoint::Info).unwrap();
        assert_eq!(url.host_str(), Some("api.cryptapi.io"));
        assert_eq!(url.path(), "/arb-nova/usdc/info/");
    }

    #[test]
    fn test_endpoint_display() {
        assert_eq!(Endpoint::QrCode.to_string(), "qrcode");
        assert_eq!(Endpoint::Logs.to_string(), "logs");
    }
}
