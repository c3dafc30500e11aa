//! Async client for the CryptAPI cryptocurrency payment gateway.
//!
//! Two entry points:
//!
//! - **Info queries** ([`get_info`], [`get_supported_coins`], [`get_coin_info`],
//!   [`get_estimate_fees`]), stateless and callable at any time
//! - **Payment flow** ([`CryptApiHelper`]): generate a deposit address, poll
//!   the callback logs, fetch a QR code, then close the session
//!
//! Every call is a single GET request. There are no retries; any failure
//! returns a [`CryptApiError`] immediately.
//!
//! # Quick example
//!
//! ```no_run
//! use cryptapi::{AddressOptions, CryptApiHelper};
//!
//! # #[tokio::main]
//! # async fn main() -> Result<(), cryptapi::CryptApiError> {
//! let mut helper = CryptApiHelper::new(
//!     "polygon/usdt",
//!     "0xYOUR_RECEIVING_ADDRESS",
//!     "https://example.com/invoice/1234?payment_id=5678",
//! )?;
//!
//! let address = helper
//!     .generate_payment_address(&AddressOptions::default().notify_pending(true))
//!     .await?;
//! println!("Pay to: {}", address.address_in);
//!
//! let logs = helper.get_payment_logs().await?;
//! println!("{} callbacks so far", logs.callbacks.len());
//!
//! helper.close();
//! # Ok(())
//! # }
//! ```

pub mod api_client;
pub mod constants;
pub mod endpoint;
pub mod error;
pub mod helper;
pub mod info;
pub mod response;

// Re-exports
pub use api_client::ApiClient;
pub use constants::*;
pub use endpoint::Endpoint;
pub use error::{CryptApiError, Result};
pub use helper::{AddressOptions, CryptApiHelper, DEFAULT_CONVERSION_VALUE};
pub use info::{
    get_coin_info, get_estimate_fees, get_info, get_supported_coins, supported_coins_from,
};
pub use response::*;
