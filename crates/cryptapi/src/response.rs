use std::collections::BTreeMap;
use std::fmt;

use base64::Engine;
use serde::de::{DeserializeOwned, Error as _};
use serde::{Deserialize, Deserializer, Serialize};
use serde_json::{Map, Value};

use crate::error::{CryptApiError, Result};

/// Value of the `status` field carried by most gateway responses.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ApiStatus {
    Success,
    Error,
}

/// Outcome of a gateway call, decided by the `status` field.
///
/// Bodies without a status (the service-wide info listing) count as success.
#[derive(Debug, Clone, PartialEq)]
pub enum ApiResponse<T> {
    Success(T),
    Error(String),
}

impl<T: DeserializeOwned> ApiResponse<T> {
    /// Split a decoded JSON body into success payload or backend error.
    pub fn from_value(mut value: Value) -> Result<Self> {
        if status_of(&value) == Some(ApiStatus::Error) {
            let message = error_message(&value).unwrap_or_else(|| "unknown error".to_string());
            return Ok(Self::Error(message));
        }
        if let Value::Object(map) = &mut value {
            map.remove("status");
        }
        let payload = serde_json::from_value(value)?;
        Ok(Self::Success(payload))
    }
}

impl<T> ApiResponse<T> {
    /// Collapse into a `Result`; `status` is the HTTP status the body came with.
    pub fn into_result(self, status: Option<u16>) -> Result<T> {
        match self {
            Self::Success(payload) => Ok(payload),
            Self::Error(message) => Err(CryptApiError::Api { status, message }),
        }
    }
}

fn status_of(value: &Value) -> Option<ApiStatus> {
    value
        .get("status")
        .cloned()
        .and_then(|s| serde_json::from_value(s).ok())
}

/// The backend's `error` text, if the body has one.
pub(crate) fn error_message(value: &Value) -> Option<String> {
    value.get("error").and_then(|e| match e {
        Value::String(s) => Some(s.clone()),
        Value::Null => None,
        other => Some(other.to_string()),
    })
}

/// Monetary amount as sent by the gateway.
///
/// The API emits amounts both as JSON numbers and as strings. Both are
/// kept verbatim as text so no precision is lost.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize)]
#[serde(transparent)]
pub struct Amount(pub String);

impl Amount {
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Lossy numeric view, `None` when the text is not a number.
    pub fn to_f64(&self) -> Option<f64> {
        self.0.trim().parse().ok()
    }
}

impl fmt::Display for Amount {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl<'de> Deserialize<'de> for Amount {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> std::result::Result<Self, D::Error> {
        match Value::deserialize(deserializer)? {
            Value::String(s) => Ok(Self(s)),
            Value::Number(n) => Ok(Self(n.to_string())),
            other => Err(D::Error::custom(format!(
                "expected amount as string or number, got {other}"
            ))),
        }
    }
}

/// Information about a single coin or token (`/{coin}/info/`).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CoinInfo {
    /// Display name, e.g. "Bitcoin" or "USDT".
    pub coin: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub ticker: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub logo: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub minimum_transaction: Option<Amount>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub minimum_transaction_coin: Option<Amount>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub minimum_fee: Option<Amount>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub minimum_fee_coin: Option<Amount>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub fee_percent: Option<Amount>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub network_fee_estimation: Option<Amount>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub prices: Option<Value>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

/// One top-level entry of the service-wide info listing.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum InfoEntry {
    /// A native coin (the entry has a `coin` field).
    Coin(CoinInfo),
    /// A blockchain carrying tokens, keyed by token ticker.
    Network(BTreeMap<String, CoinInfo>),
    Other(Value),
}

/// Service-wide info (`/info/`): every supported blockchain, coin and token.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ServiceInfo {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub fee_tiers: Option<Value>,
    #[serde(flatten)]
    pub entries: BTreeMap<String, InfoEntry>,
}

/// Estimated blockchain fees for forwarding a payment (`/{coin}/estimate/`).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FeeEstimate {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub estimated_cost: Option<Amount>,
    /// Cost converted to fiat, keyed by currency code.
    #[serde(default)]
    pub estimated_cost_currency: BTreeMap<String, Amount>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

/// A freshly generated payment address (`/{coin}/create/`).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PaymentAddress {
    /// Deposit address the customer pays into.
    pub address_in: String,
    /// Address(es) the gateway forwards funds to.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub address_out: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub callback_url: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub priority: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub minimum_transaction_coin: Option<Amount>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

/// Callback history for a callback URL (`/{coin}/logs/`).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PaymentLogs {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub address_in: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub address_out: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub callback_url: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub notify_pending: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub notify_confirmations: Option<u64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub priority: Option<String>,
    #[serde(default)]
    pub callbacks: Vec<CallbackLog>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

/// A single observed transaction and the callbacks sent for it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CallbackLog {
    #[serde(default)]
    pub txid_in: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub txid_out: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub value: Option<Amount>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub value_coin: Option<Amount>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub value_forwarded: Option<Amount>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub value_forwarded_coin: Option<Amount>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub confirmations: Option<u64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub last_update: Option<String>,
    /// Forwarding state reported by the gateway, e.g. "pending" or "done".
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub result: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub fee_percent: Option<Amount>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub fee: Option<Amount>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub fee_coin: Option<Amount>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub prices: Option<Value>,
    #[serde(default)]
    pub logs: Vec<Value>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

/// QR code for a payment address (`/{coin}/qrcode/`).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct QrCode {
    /// Base64 PNG, possibly wrapped in a `data:` URI.
    #[serde(alias = "qrcode")]
    pub qr_code: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub payment_uri: Option<String>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl QrCode {
    /// Decode the image into raw PNG bytes.
    pub fn png_bytes(&self) -> Result<Vec<u8>> {
        let encoded = match self.qr_code.split_once(";base64,") {
            Some((_, data)) => data,
            None => self.qr_code.as_str(),
        };
        base64::engine::general_purpose::STANDARD
            .decode(encoded.trim())
            .map_err(|e| CryptApiError::Decode(format!("invalid base64 qr code: {e}")))
    }
}

/// Price conversion between a fiat currency or coin and the helper's coin.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Conversion {
    pub value_coin: Amount,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub exchange_rate: Option<Amount>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_error_envelope_is_error_variant() {
        let body = json!({"status": "error", "error": "Invalid callback URL"});
        let parsed = ApiResponse::<PaymentAddress>::from_value(body).unwrap();
        assert_eq!(parsed, ApiResponse::Error("Invalid callback URL".to_string()));

        let err = parsed.into_result(Some(200)).unwrap_err();
        assert!(matches!(
            err,
            CryptApiError::Api { status: Some(200), ref message } if message == "Invalid callback URL"
        ));
    }

    #[test]
    fn test_error_envelope_without_message() {
        let body = json!({"status": "error"});
        let parsed = ApiResponse::<Value>::from_value(body).unwrap();
        assert_eq!(parsed, ApiResponse::Error("unknown error".to_string()));
    }

    #[test]
    fn test_success_strips_status_from_extra() {
        let body = json!({
            "status": "success",
            "address_in": "14PqCsA7KMgseZMPwg6mJy754MtQkrgszu",
            "address_out": "1H6ZZpRmMnrw8ytepV3BYwMjYYnEkWDqVP",
            "callback_url": "https://example.com/invoice/1234?payment_id=5678",
            "priority": "default",
            "minimum_transaction_coin": 0.008
        });
        let ApiResponse::Success(address) = ApiResponse::<PaymentAddress>::from_value(body).unwrap()
        else {
            panic!("expected success");
        };
        assert_eq!(address.address_in, "14PqCsA7KMgseZMPwg6mJy754MtQkrgszu");
        assert_eq!(address.priority.as_deref(), Some("default"));
        assert_eq!(
            address.minimum_transaction_coin,
            Some(Amount("0.008".to_string()))
        );
        assert!(address.extra.is_empty());
    }

    #[test]
    fn test_missing_required_field_is_decode_error() {
        let body = json!({"status": "success", "address_out": "1H6Z"});
        let err = ApiResponse::<PaymentAddress>::from_value(body).unwrap_err();
        assert!(matches!(err, CryptApiError::Decode(_)));
    }

    #[test]
    fn test_amount_accepts_string_and_number() {
        let from_str: Amount = serde_json::from_value(json!("0.02")).unwrap();
        let from_num: Amount = serde_json::from_value(json!(100000)).unwrap();
        assert_eq!(from_str.as_str(), "0.02");
        assert_eq!(from_num.as_str(), "100000");
        assert_eq!(from_num.to_f64(), Some(100000.0));
        assert!(serde_json::from_value::<Amount>(json!([1])).is_err());
    }

    #[test]
    fn test_payment_logs_decode() {
        let body = json!({
            "address_in": "14PqCsA7KMgseZMPwg6mJy754MtQkrgszu",
            "address_out": "1H6ZZpRmMnrw8ytepV3BYwMjYYnEkWDqVP",
            "callback_url": "https://example.com/invoice/1234?payment_id=5678",
            "status": "success",
            "notify_pending": true,
            "notify_confirmations": 1,
            "priority": "default",
            "callbacks": [{
                "txid_in": "33f11611f863d7475eb10daada2f225f0877561cf58cdfff175e99635dfd9120",
                "txid_out": "5ea53d5e728bfdb56b54c0b945990b69ae1e66cec56ab24679c9a622c4695276",
                "value": 100000,
                "value_coin": 0.1,
                "value_forwarded": 100000,
                "value_forwarded_coin": 0.1,
                "confirmations": 13,
                "last_update": "14/10/2022 12:47:18",
                "result": "done",
                "fee_percent": 1,
                "fee": 2000,
                "fee_coin": 0.02,
                "prices": 55.59,
                "logs": []
            }]
        });
        let logs = ApiResponse::<PaymentLogs>::from_value(body)
            .unwrap()
            .into_result(Some(200))
            .unwrap();
        assert_eq!(logs.notify_pending, Some(true));
        assert_eq!(logs.callbacks.len(), 1);
        let cb = &logs.callbacks[0];
        assert_eq!(cb.confirmations, Some(13));
        assert_eq!(cb.result.as_deref(), Some("done"));
        assert_eq!(cb.value_coin.as_ref().map(Amount::as_str), Some("0.1"));
        assert_eq!(cb.fee_coin.as_ref().and_then(Amount::to_f64), Some(0.02));
    }

    #[test]
    fn test_service_info_entries() {
        let body = json!({
            "btc": {"coin": "Bitcoin", "ticker": "btc", "minimum_transaction": 8000},
            "trc20": {
                "usdt": {"coin": "USDT", "ticker": "usdt"},
                "usdc": {"coin": "USDC", "ticker": "usdc"}
            },
            "fee_tiers": [{"minimum": "0", "fee": "0.01"}]
        });
        let info: ServiceInfo = serde_json::from_value(body).unwrap();
        assert!(info.fee_tiers.is_some());
        assert_eq!(info.entries.len(), 2);
        assert!(matches!(info.entries["btc"], InfoEntry::Coin(ref c) if c.coin == "Bitcoin"));
        match &info.entries["trc20"] {
            InfoEntry::Network(tokens) => {
                assert_eq!(tokens.len(), 2);
                assert_eq!(tokens["usdt"].coin, "USDT");
            }
            other => panic!("expected network entry, got {other:?}"),
        }
    }

    #[test]
    fn test_qrcode_accepts_legacy_key_and_decodes() {
        let body = json!({"qrcode": "data:image/png;base64,iVBORw0KGgo=", "payment_uri": "bitcoin:1abc"});
        let qr: QrCode = serde_json::from_value(body).unwrap();
        assert_eq!(qr.payment_uri.as_deref(), Some("bitcoin:1abc"));
        let png = qr.png_bytes().unwrap();
        assert_eq!(&png[..4], &[0x89, b'P', b'N', b'G']);
    }

    #[test]
    fn test_qrcode_rejects_bad_base64() {
        let qr: QrCode = serde_json::from_value(json!({"qr_code": "***"})).unwrap();
        assert!(matches!(qr.png_bytes(), Err(CryptApiError::Decode(_))));
    }
}
