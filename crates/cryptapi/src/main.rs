use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use cryptapi::{AddressOptions, ApiClient, ApiConfig, CryptApiError, CryptApiHelper, DEFAULT_QR_SIZE};

const USAGE: &str = "usage: cryptapi <info | coins | coin <ticker> | estimate <ticker> | pay>";

fn print_json<T: serde::Serialize>(label: &str, value: &T) -> Result<(), CryptApiError> {
    let rendered = serde_json::to_string_pretty(value)?;
    println!("{label}:");
    println!("{rendered}");
    Ok(())
}

fn required_env(name: &str) -> Result<String, CryptApiError> {
    std::env::var(name)
        .ok()
        .filter(|v| !v.trim().is_empty())
        .ok_or_else(|| CryptApiError::Config(format!("{name} environment variable is required")))
}

/// Full payment flow: create -> logs -> qrcode, then close the session.
async fn pay(config: ApiConfig) -> Result<(), CryptApiError> {
    let coin = std::env::var("CRYPTAPI_COIN").unwrap_or_else(|_| "polygon/usdt".to_string());
    // must be valid for the ticker in use
    let owner_address = required_env("CRYPTAPI_OWNER_ADDRESS")?;
    let callback_url = required_env("CRYPTAPI_CALLBACK_URL")?;

    let mut options = AddressOptions::default().notify_pending(true);
    if let Ok(email) = std::env::var("CRYPTAPI_OWNER_EMAIL") {
        options = options.email(email);
    }

    let mut helper = CryptApiHelper::with_config(coin, owner_address, callback_url, config)?;

    let result = async {
        let address = helper.generate_payment_address(&options).await?;
        print_json("Payment address", &address)?;

        let logs = helper.get_payment_logs().await?;
        print_json("Payment logs", &logs)?;

        let qr = helper.get_qrcode(DEFAULT_QR_SIZE).await?;
        println!("QR code: {} bytes of PNG", qr.png_bytes()?.len());
        if let Some(uri) = &qr.payment_uri {
            println!("Payment URI: {uri}");
        }
        Ok::<(), CryptApiError>(())
    }
    .await;

    helper.close();
    result
}

async fn run(args: &[String]) -> Result<(), CryptApiError> {
    let config = ApiConfig::from_env()?;

    match args {
        [cmd] if cmd == "info" => {
            let info = ApiClient::with_config(config)?.info().await?;
            print_json("Service info", &info)?;
        }
        [cmd] if cmd == "coins" => {
            let coins = ApiClient::with_config(config)?.supported_coins().await?;
            for (ticker, name) in &coins {
                println!("{ticker:<24} {name}");
            }
        }
        [cmd, coin] if cmd == "coin" => {
            let info = ApiClient::with_config(config)?.coin_info(coin).await?;
            print_json("Coin info", &info)?;
        }
        [cmd, coin] if cmd == "estimate" => {
            let estimate = ApiClient::with_config(config)?
                .estimate_fees(coin, 1, cryptapi::DEFAULT_PRIORITY)
                .await?;
            print_json("Fee estimate", &estimate)?;
        }
        [cmd] if cmd == "pay" => pay(config).await?,
        _ => {
            eprintln!("{USAGE}");
            std::process::exit(2);
        }
    }
    Ok(())
}

#[tokio::main]
async fn main() {
    dotenvy::dotenv().ok();
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "info".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let args: Vec<String> = std::env::args().skip(1).collect();

    if let Err(e) = run(&args).await {
        eprintln!("Error: {e}");
        std::process::exit(1);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::BTreeMap;

    #[test]
    fn test_print_json_reports_serialization_failure() {
        // JSON object keys must be strings
        let unrenderable = BTreeMap::from([((1u8, 2u8), "pair")]);
        let err = print_json("Unrenderable", &unrenderable).unwrap_err();
        assert!(matches!(err, CryptApiError::Decode(_)));
    }

    #[test]
    fn test_print_json_ok() {
        assert!(print_json("Value", &serde_json::json!({"status": "success"})).is_ok());
    }
}
