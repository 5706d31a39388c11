use std::sync::Arc;
use std::time::Duration;

use anyhow::{Context, Result};
use chrono::Utc;
use clap::{Arg, Command};
use rust_decimal::Decimal;
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

use crosslane::config::Config;
use crosslane::constants::NATIVE_TOKEN_ADDRESS;
use crosslane::mocks::status_mock::{complete_status, pending_status};
use crosslane::mocks::{is_mock_mode, FixedGasFeeSource, MockStatusClient, StaticRateSource};
use crosslane::oracle::{fetch_quote_rates, GasFeeSource};
use crosslane::quotes::format::{format_eta_in_minutes, format_fiat_amount, format_token_amount};
use crosslane::quotes::rank_quotes;
use crosslane::quotes::metadata::build_quote_metadata;
use crosslane::tracker::{BridgeTxTracker, StartTrackingArgs};
use crosslane::types::{
    ApprovalData, BridgeAsset, FeeData, ProtocolFee, PricingSnapshot, Quote, QuoteResponse,
    QuoteWithMetadata, SortOrder, StatusRequest, TradeData,
};

const USDC_OPTIMISM: &str = "0x0b2c639c533813f4aa9d7837caf62653d097ff85";
const USDC_ARBITRUM: &str = "0xaf88d065e77c8cc2239327c5edb3a432268e5831";

#[tokio::main]
async fn main() -> Result<()> {
    dotenvy::dotenv().ok();

    let matches = Command::new("crosslane")
        .version(env!("CARGO_PKG_VERSION"))
        .about("Cross-chain bridge quote ranking and transaction tracking engine")
        .arg(
            Arg::new("config")
                .short('c')
                .long("config")
                .value_name("FILE")
                .help("Config file path")
                .default_value("config/default.toml"),
        )
        .arg(
            Arg::new("log-level")
                .short('l')
                .long("log-level")
                .value_name("LEVEL")
                .help("Log level (trace, debug, info, warn, error)")
                .default_value("info"),
        )
        .arg(
            Arg::new("sort")
                .short('s')
                .long("sort")
                .value_name("ORDER")
                .help("Quote sort order (return, eta)")
                .default_value("return"),
        )
        .get_matches();

    let log_level = matches.get_one::<String>("log-level").unwrap();
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new(format!("crosslane={}", log_level))),
        )
        .init();

    let config_path = matches.get_one::<String>("config").unwrap();
    let config = match Config::load(config_path).await {
        Ok(config) => config,
        Err(error) => {
            warn!(%error, "config not loaded, using defaults");
            Config::default()
        }
    };

    let sort_order = match matches.get_one::<String>("sort").unwrap().as_str() {
        "eta" => SortOrder::EtaAsc,
        _ => SortOrder::AdjustedReturnDesc,
    };

    run_demo(&config, sort_order).await
}

/// Mock-mode walkthrough: rank a batch of sample quotes, submit the
/// recommended one and poll its status to completion.
async fn run_demo(config: &Config, sort_order: SortOrder) -> Result<()> {
    if !is_mock_mode() {
        info!("API_MODE != mock, demo still runs against the scripted status backend");
    }

    let rates = StaticRateSource::new()
        .with_rate(10, USDC_OPTIMISM, Decimal::ONE)
        .with_rate(10, NATIVE_TOKEN_ADDRESS, Decimal::from(2500))
        .with_rate(42161, USDC_ARBITRUM, Decimal::ONE)
        .with_rate(42161, NATIVE_TOKEN_ADDRESS, Decimal::from(2500));
    let gas_source = FixedGasFeeSource::new(
        Decimal::new(25, 1), // 2.5 gwei base fee
        Decimal::new(1, 1),  // 0.1 gwei priority fee
    );
    let gas = gas_source.fee_estimates(10).await?;

    let mut quotes_with_metadata = Vec::new();
    for response in sample_quotes() {
        let quote_rates = fetch_quote_rates(&rates, &response.quote, "usd").await;
        match build_quote_metadata(&response, &quote_rates, &gas, None) {
            Ok(metadata) => quotes_with_metadata.push(QuoteWithMetadata { response, metadata }),
            Err(error) => {
                warn!(
                    bridge = %response.quote.bridge_id,
                    %error,
                    "dropping quote with invalid amounts"
                );
            }
        }
    }

    let ranked = rank_quotes(quotes_with_metadata, sort_order, &config.ranking);
    info!(quotes = ranked.sorted.len(), ?sort_order, "ranked bridge quotes");
    for quote in &ranked.sorted {
        info!(
            bridge = %quote.response.quote.bridge_id,
            receive = %format_token_amount(
                quote.metadata.to_token_amount.raw,
                &quote.response.quote.dest_asset.symbol,
            ),
            network_fee = ?format_fiat_amount(quote.metadata.total_network_fee.fiat, "usd"),
            adjusted_return = ?format_fiat_amount(quote.metadata.adjusted_return, "usd"),
            eta_minutes = %format_eta_in_minutes(quote.eta_seconds()),
            "quote"
        );
    }

    let recommended = match ranked.recommended {
        Some(quote) => quote,
        None => {
            warn!("no quotes to recommend, nothing to track");
            return Ok(());
        }
    };
    info!(
        bridge = %recommended.response.quote.bridge_id,
        "recommended quote selected, submitting"
    );

    // scripted status backend: two pending polls, then completion
    let src_tx_hash = format!("0x{}", "5a".repeat(32));
    let client = Arc::new(MockStatusClient::new());
    client.push_status(pending_status(10, &src_tx_hash)).await;
    client.push_status(pending_status(10, &src_tx_hash)).await;
    client
        .push_status(complete_status(
            10,
            &src_tx_hash,
            42161,
            &format!("0x{}", "7e".repeat(32)),
        ))
        .await;

    let tracker = Arc::new(BridgeTxTracker::new(client, &config.tracker));
    let scheduler = Arc::clone(&tracker);
    let scheduler_handle = tokio::spawn(async move { scheduler.run().await });

    tracker
        .start_tracking(StartTrackingArgs {
            status_request: StatusRequest {
                src_chain_id: recommended.response.quote.src_chain_id,
                src_tx_hash: src_tx_hash.clone(),
                bridge_id: recommended.response.quote.bridge_id.clone(),
                dest_chain_id: recommended.response.quote.dest_chain_id,
            },
            quote_response: recommended.response.clone(),
            start_time: Some(Utc::now()),
            slippage_percentage: 0.5,
            completion_time: None,
            pricing_data: Some(PricingSnapshot {
                amount_sent: recommended.metadata.sent_amount.raw,
                amount_sent_in_fiat: recommended.metadata.sent_amount.fiat,
                quoted_gas_in_fiat: recommended.metadata.total_network_fee.fiat,
                quoted_return_in_fiat: recommended.metadata.adjusted_return,
            }),
            initial_dest_asset_balance: None,
            target_contract_address: Some(
                "0x0439e60f02a8900a951603950d8d4527f400c3f1".to_string(),
            ),
            account: "0xc0ffee254729296a45a3885639ac7e10f9d54979".to_string(),
        })
        .await;

    // wait for the scheduler to drive the transfer to completion
    let deadline = Duration::from_secs(config.tracker.poll_interval_secs * 10);
    tokio::time::timeout(deadline, async {
        while tracker.active_sessions().await > 0 {
            tokio::time::sleep(Duration::from_millis(200)).await;
        }
    })
    .await
    .context("bridge transfer did not complete in time")?;
    scheduler_handle.abort();

    let history = tracker.history().await;
    let item = history.get(&src_tx_hash).context("missing history record")?;
    info!(
        status = %item.status.as_ref().map(|s| s.status.to_string()).unwrap_or_default(),
        dest_tx_hash = ?item.status.as_ref().and_then(|s| s.dest_tx_hash()),
        "bridge transfer tracked to completion"
    );
    println!("{}", serde_json::to_string_pretty(&history)?);
    Ok(())
}

/// Three representative quotes: a fast one, a better-priced slow one
/// and one whose destination asset has no known rate
fn sample_quotes() -> Vec<QuoteResponse> {
    let usdc_src = BridgeAsset {
        address: USDC_OPTIMISM.to_string(),
        symbol: "USDC".to_string(),
        decimals: 6,
    };
    let usdc_dest = BridgeAsset {
        address: USDC_ARBITRUM.to_string(),
        symbol: "USDC".to_string(),
        decimals: 6,
    };
    let unknown_dest = BridgeAsset {
        address: "0x912ce59144191c1204e64559fe8253a0e49e6548".to_string(),
        symbol: "ARB".to_string(),
        decimals: 18,
    };

    let quote = |request_id: &str,
                 bridge_id: &str,
                 dest_asset: &BridgeAsset,
                 dest_amount: &str,
                 fee: &str,
                 gas_limit: u64,
                 eta: u64| QuoteResponse {
        quote: Quote {
            request_id: request_id.to_string(),
            src_chain_id: 10,
            src_asset: usdc_src.clone(),
            src_token_amount: "250000000".to_string(), // 250 USDC
            dest_chain_id: 42161,
            dest_asset: dest_asset.clone(),
            dest_token_amount: dest_amount.to_string(),
            fee_data: FeeData {
                metabridge: ProtocolFee {
                    amount: fee.to_string(),
                },
            },
            bridge_id: bridge_id.to_string(),
        },
        trade: TradeData {
            value: "0x0".to_string(),
            gas_limit: Some(gas_limit),
        },
        approval: Some(ApprovalData {
            gas_limit: Some(46_000),
        }),
        estimated_processing_time_in_seconds: eta,
    };

    vec![
        quote("req-across", "across", &usdc_dest, "248750000", "875000", 150_000, 45),
        quote("req-stargate", "stargate", &usdc_dest, "249400000", "625000", 210_000, 900),
        quote("req-hop", "hop", &unknown_dest, "198000000000000000000", "875000", 180_000, 300),
    ]
}
