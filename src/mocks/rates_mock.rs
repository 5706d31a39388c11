//! In-memory exchange-rate and gas-fee sources

use std::collections::HashMap;

use anyhow::Result;
use async_trait::async_trait;
use rust_decimal::Decimal;

use crate::oracle::{ExchangeRateSource, GasFeeEstimates, GasFeeSource};
use crate::types::ChainId;

/// Rate source backed by a fixed table keyed by chain id and lowercase
/// token address. Missing entries answer `None`, exercising the
/// null-propagation path.
#[derive(Debug, Clone, Default)]
pub struct StaticRateSource {
    rates: HashMap<(ChainId, String), Decimal>,
}

impl StaticRateSource {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_rate(mut self, chain_id: ChainId, token_address: &str, rate: Decimal) -> Self {
        self.rates
            .insert((chain_id, token_address.to_lowercase()), rate);
        self
    }
}

#[async_trait]
impl ExchangeRateSource for StaticRateSource {
    async fn fiat_rate(
        &self,
        chain_id: ChainId,
        token_address: &str,
        _currency: &str,
    ) -> Option<Decimal> {
        self.rates
            .get(&(chain_id, token_address.to_lowercase()))
            .copied()
    }
}

/// Gas-fee source answering the same estimate for every chain
#[derive(Debug, Clone)]
pub struct FixedGasFeeSource {
    estimates: GasFeeEstimates,
}

impl FixedGasFeeSource {
    pub fn new(estimated_base_fee_gwei: Decimal, max_priority_fee_gwei: Decimal) -> Self {
        Self {
            estimates: GasFeeEstimates {
                estimated_base_fee_gwei,
                max_priority_fee_gwei,
            },
        }
    }
}

#[async_trait]
impl GasFeeSource for FixedGasFeeSource {
    async fn fee_estimates(&self, _chain_id: ChainId) -> Result<GasFeeEstimates> {
        Ok(self.estimates.clone())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::constants::NATIVE_TOKEN_ADDRESS;
    use crate::oracle::fetch_quote_rates;
    use crate::types::{BridgeAsset, FeeData, ProtocolFee, Quote};

    #[tokio::test]
    async fn missing_rates_answer_none() {
        let source = StaticRateSource::new().with_rate(10, NATIVE_TOKEN_ADDRESS, Decimal::from(2500));
        assert_eq!(
            source.fiat_rate(10, NATIVE_TOKEN_ADDRESS, "usd").await,
            Some(Decimal::from(2500))
        );
        assert_eq!(source.fiat_rate(1, NATIVE_TOKEN_ADDRESS, "usd").await, None);
    }

    #[tokio::test]
    async fn quote_rates_gather_all_four_legs() {
        let usdc = "0xa0b86991c6218b36c1d19d4a2e9eb0ce3606eb48";
        let source = StaticRateSource::new()
            .with_rate(10, usdc, Decimal::ONE)
            .with_rate(10, NATIVE_TOKEN_ADDRESS, Decimal::from(2500))
            .with_rate(42161, usdc, Decimal::ONE);

        let quote = Quote {
            request_id: "req-1".to_string(),
            src_chain_id: 10,
            src_asset: BridgeAsset {
                address: usdc.to_string(),
                symbol: "USDC".to_string(),
                decimals: 6,
            },
            src_token_amount: "100000000".to_string(),
            dest_chain_id: 42161,
            dest_asset: BridgeAsset {
                address: usdc.to_string(),
                symbol: "USDC".to_string(),
                decimals: 6,
            },
            dest_token_amount: "99000000".to_string(),
            fee_data: FeeData {
                metabridge: ProtocolFee {
                    amount: "0".to_string(),
                },
            },
            bridge_id: "across".to_string(),
        };

        let rates = fetch_quote_rates(&source, &quote, "usd").await;
        assert_eq!(rates.src_token, Some(Decimal::ONE));
        assert_eq!(rates.src_native, Some(Decimal::from(2500)));
        assert_eq!(rates.dest_token, Some(Decimal::ONE));
        // dest-side native rate not configured
        assert_eq!(rates.dest_native, None);
    }
}
