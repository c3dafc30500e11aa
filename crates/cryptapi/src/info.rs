//! Stateless info queries: service listing, supported coins, coin info and fee estimates.
//!
//! The free functions open a one-shot session configured from the
//! environment (see [`ApiConfig::from_env`]); the same calls are available
//! as [`ApiClient`] methods for callers that manage their own session.

use std::collections::BTreeMap;

use crate::api_client::ApiClient;
use crate::constants::{ApiConfig, DEFAULT_PRIORITY};
use crate::endpoint::{coin_path, Endpoint};
use crate::error::Result;
use crate::response::{CoinInfo, FeeEstimate, InfoEntry, ServiceInfo};

impl ApiClient {
    /// Every supported blockchain, coin and token.
    pub async fn info(&self) -> Result<ServiceInfo> {
        self.get(None, Endpoint::Info, &[("prices", "0".to_string())])
            .await
    }

    /// Supported coins and tokens as `ticker -> display name`.
    pub async fn supported_coins(&self) -> Result<BTreeMap<String, String>> {
        let info = self.info().await?;
        Ok(supported_coins_from(&info))
    }

    pub async fn coin_info(&self, coin: &str) -> Result<CoinInfo> {
        require_coin(coin)?;
        self.get(Some(coin), Endpoint::Info, &[("prices", "0".to_string())])
            .await
    }

    /// Estimated blockchain fees for forwarding to `addresses` outputs.
    ///
    /// Fees grow with the number of addresses. `priority` is only honoured
    /// on Bitcoin, Ethereum/ERC-20 and Litecoin.
    pub async fn estimate_fees(
        &self,
        coin: &str,
        addresses: u32,
        priority: &str,
    ) -> Result<FeeEstimate> {
        require_coin(coin)?;
        let priority = if priority.trim().is_empty() {
            DEFAULT_PRIORITY
        } else {
            priority
        };
        let params = [
            ("addresses", addresses.to_string()),
            ("priority", priority.to_string()),
        ];
        self.get(Some(coin), Endpoint::Estimate, &params).await
    }
}

fn require_coin(coin: &str) -> Result<()> {
    coin_path(coin).map(|_| ())
}

fn one_shot() -> Result<ApiClient> {
    ApiClient::with_config(ApiConfig::from_env()?)
}

/// Flatten the service listing into `ticker -> display name`.
///
/// Native coins map directly. Tokens are keyed `{chain}_{token}` and named
/// `{coin} ({CHAIN})`, e.g. `trc20_usdt -> "USDT (TRC20)"`.
pub fn supported_coins_from(info: &ServiceInfo) -> BTreeMap<String, String> {
    let mut coins = BTreeMap::new();
    for (ticker, entry) in &info.entries {
        match entry {
            InfoEntry::Coin(coin) => {
                coins.insert(ticker.clone(), coin.coin.clone());
            }
            InfoEntry::Network(tokens) => {
                for (token, token_info) in tokens {
                    coins.insert(
                        format!("{ticker}_{token}"),
                        format!("{} ({})", token_info.coin, ticker.to_uppercase()),
                    );
                }
            }
            InfoEntry::Other(_) => {
                tracing::debug!(%ticker, "skipping unrecognised info entry");
            }
        }
    }
    coins
}

/// Information regarding the CryptAPI service.
pub async fn get_info() -> Result<ServiceInfo> {
    one_shot()?.info().await
}

pub async fn get_supported_coins() -> Result<BTreeMap<String, String>> {
    one_shot()?.supported_coins().await
}

/// Information regarding a specific coin or token, e.g. `btc` or `trc20_usdt`.
pub async fn get_coin_info(coin: &str) -> Result<CoinInfo> {
    // ticker is checked before the environment is read
    require_coin(coin)?;
    one_shot()?.coin_info(coin).await
}

pub async fn get_estimate_fees(coin: &str, addresses: u32, priority: &str) -> Result<FeeEstimate> {
    // ticker is checked before the environment is read
    require_coin(coin)?;
    one_shot()?.estimate_fees(coin, addresses, priority).await
}
