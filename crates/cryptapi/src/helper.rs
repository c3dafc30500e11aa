use crate::api_client::{ApiClient, Params};
use crate::constants::{ApiConfig, DEFAULT_PRIORITY, MAX_QR_SIZE, MIN_QR_SIZE};
use crate::endpoint::{coin_path, Endpoint};
use crate::error::{CryptApiError, Result};
use crate::response::{Conversion, PaymentAddress, PaymentLogs, QrCode};

/// Default amount passed to [`CryptApiHelper::get_conversion`].
pub const DEFAULT_CONVERSION_VALUE: f64 = 10.0;

/// Caller-tunable options for payment address generation.
///
/// Defaults match what the gateway recommends for JSON callbacks:
/// GET callbacks with a JSON body, no pending notifications, no fiat
/// conversion, `default` forwarding priority.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AddressOptions {
    /// Also notify for transactions not yet confirmed on chain.
    pub notify_pending: bool,
    /// Address for payment notification e-mails. Must be confirmed with
    /// CryptAPI before it receives anything.
    pub email: Option<String>,
    /// Forwarding priority, e.g. `default`, `fast`, `economic`. Only
    /// Bitcoin, Ethereum/ERC-20 and Litecoin honour it.
    pub priority: String,
    /// Send callbacks as POST instead of GET.
    pub post: bool,
    /// Send the callback body as JSON.
    pub json: bool,
    /// Include the value converted to fiat in callbacks.
    pub convert: bool,
}

impl Default for AddressOptions {
    fn default() -> Self {
        Self {
            notify_pending: false,
            email: None,
            priority: DEFAULT_PRIORITY.to_string(),
            post: false,
            json: true,
            convert: false,
        }
    }
}

impl AddressOptions {
    pub fn notify_pending(mut self, enabled: bool) -> Self {
        self.notify_pending = enabled;
        self
    }

    pub fn email(mut self, email: impl Into<String>) -> Self {
        self.email = Some(email.into());
        self
    }

    pub fn priority(mut self, priority: impl Into<String>) -> Self {
        self.priority = priority.into();
        self
    }

    pub fn post(mut self, enabled: bool) -> Self {
        self.post = enabled;
        self
    }

    pub fn json(mut self, enabled: bool) -> Self {
        self.json = enabled;
        self
    }

    pub fn convert(mut self, enabled: bool) -> Self {
        self.convert = enabled;
        self
    }

    /// Query parameters contributed by these options. Empty e-mail is omitted.
    pub fn query(&self) -> Params {
        let mut params: Params = vec![("pending", flag(self.notify_pending))];
        if let Some(email) = self.email.as_deref().filter(|e| !e.trim().is_empty()) {
            params.push(("email", email.to_string()));
        }
        let priority = if self.priority.trim().is_empty() {
            DEFAULT_PRIORITY
        } else {
            self.priority.as_str()
        };
        params.push(("post", flag(self.post)));
        params.push(("json", flag(self.json)));
        params.push(("priority", priority.to_string()));
        params.push(("convert", flag(self.convert)));
        params
    }
}

fn flag(enabled: bool) -> String {
    let value = if enabled { "1" } else { "0" };
    value.to_string()
}

fn require(field: &str, value: String) -> Result<String> {
    let value = value.trim().to_string();
    if value.is_empty() {
        return Err(CryptApiError::Validation(format!("{field} is missing")));
    }
    Ok(value)
}

/// One payment flow against the gateway: a coin, the owner's receiving
/// address and the callback URL, plus the HTTP session they share.
///
/// The session opens on construction and is released by [`close`](Self::close)
/// or when the helper is dropped. Mutating calls take `&mut self`, so a
/// single helper cannot be driven from two places at once.
#[derive(Debug)]
pub struct CryptApiHelper {
    coin: String,
    owner_address: String,
    callback_url: String,
    payment_address: String,
    session: Option<ApiClient>,
}

impl CryptApiHelper {
    /// Create a helper for the public gateway.
    ///
    /// Fails with [`CryptApiError::Validation`] if any argument is empty or
    /// the coin is not ticker-shaped;
    /// nothing touches the network here.
    pub fn new(
        coin: impl Into<String>,
        owner_address: impl Into<String>,
        callback_url: impl Into<String>,
    ) -> Result<Self> {
        Self::with_config(coin, owner_address, callback_url, ApiConfig::default())
    }

    pub fn with_config(
        coin: impl Into<String>,
        owner_address: impl Into<String>,
        callback_url: impl Into<String>,
        config: ApiConfig,
    ) -> Result<Self> {
        let coin = require("coin", coin.into())?;
        coin_path(&coin)?;
        let owner_address = require("owner address", owner_address.into())?;
        let callback_url = require("callback url", callback_url.into())?;
        let session = ApiClient::with_config(config)?;

        Ok(Self {
            coin,
            owner_address,
            callback_url,
            payment_address: String::new(),
            session: Some(session),
        })
    }

    pub fn coin(&self) -> &str {
        &self.coin
    }

    pub fn owner_address(&self) -> &str {
        &self.owner_address
    }

    pub fn callback_url(&self) -> &str {
        &self.callback_url
    }

    /// Deposit address from the last successful generation, if any.
    pub fn payment_address(&self) -> Option<&str> {
        Some(self.payment_address.as_str()).filter(|a| !a.is_empty())
    }

    pub fn is_closed(&self) -> bool {
        self.session.is_none()
    }

    fn session(&self) -> Result<&ApiClient> {
        self.session.as_ref().ok_or(CryptApiError::Closed)
    }

    /// Generate a deposit address that forwards to the owner address.
    ///
    /// Whether identical calls return the same address is up to the
    /// gateway; the helper simply remembers the latest one.
    pub async fn generate_payment_address(
        &mut self,
        options: &AddressOptions,
    ) -> Result<PaymentAddress> {
        let mut params: Params = vec![
            ("callback", self.callback_url.clone()),
            ("address", self.owner_address.clone()),
        ];
        params.extend(options.query());

        let result = self
            .session()?
            .get::<PaymentAddress>(Some(self.coin.as_str()), Endpoint::Create, &params)
            .await;

        match result {
            Ok(address) => {
                tracing::debug!(coin = %self.coin, address = %address.address_in, "payment address generated");
                self.payment_address = address.address_in.clone();
                Ok(address)
            }
            Err(e) => {
                tracing::error!(coin = %self.coin, error = %e, "failed payment address generation");
                Err(e)
            }
        }
    }

    /// Callbacks the gateway has sent to this helper's callback URL so far.
    ///
    /// Every call returns the full current log; nothing is cached.
    pub async fn get_payment_logs(&self) -> Result<PaymentLogs> {
        let params = [("callback", self.callback_url.clone())];
        self.session()?
            .get(Some(self.coin.as_str()), Endpoint::Logs, &params)
            .await
    }

    /// Base64 PNG QR code for the generated payment address.
    ///
    /// `size` is the edge length in pixels and must be within 64..=1024.
    pub async fn get_qrcode(&self, size: u32) -> Result<QrCode> {
        if !(MIN_QR_SIZE..=MAX_QR_SIZE).contains(&size) {
            return Err(CryptApiError::Validation(format!(
                "qr code size {size} outside {MIN_QR_SIZE}..={MAX_QR_SIZE}"
            )));
        }
        let session = self.session()?;
        let address = self.payment_address().ok_or_else(|| {
            CryptApiError::Validation("no payment address generated yet".to_string())
        })?;

        let params = [
            ("address", address.to_string()),
            ("value", String::new()),
            ("size", size.to_string()),
        ];
        session.get(Some(self.coin.as_str()), Endpoint::QrCode, &params).await
    }

    /// Convert `value` of `from_coin` (a fiat code or ticker, e.g. `usd`)
    /// into this helper's coin.
    pub async fn get_conversion(&self, from_coin: &str, value: f64) -> Result<Conversion> {
        if from_coin.trim().is_empty() {
            return Err(CryptApiError::Validation("from coin is missing".to_string()));
        }
        if !value.is_finite() {
            return Err(CryptApiError::Validation(format!(
                "conversion value must be finite, got {value}"
            )));
        }
        let params = [
            ("from", from_coin.trim().to_string()),
            ("value", value.to_string()),
        ];
        self.session()?
            .get(Some(self.coin.as_str()), Endpoint::Convert, &params)
            .await
    }

    /// Release the HTTP session. Calling it again is a no-op.
    pub fn close(&mut self) {
        if self.session.take().is_some() {
            tracing::debug!(coin = %self.coin, "cryptapi session closed");
        }
    }
}
