use anyhow::Result;
use async_trait::async_trait;
use rust_decimal::Decimal;

use crate::types::{ChainId, Quote};

/// Current fee-per-gas estimates for a network, in decimal gwei
#[derive(Debug, Clone, PartialEq)]
pub struct GasFeeEstimates {
    pub estimated_base_fee_gwei: Decimal,
    pub max_priority_fee_gwei: Decimal,
}

/// Token → fiat exchange rates. An absent rate is a soft failure: the
/// caller degrades the derived fiat figures to `None`, it never errors.
#[async_trait]
pub trait ExchangeRateSource: Send + Sync {
    /// Fiat rate for one token on one chain, in the given display
    /// currency. `None` when the rate is unavailable.
    async fn fiat_rate(
        &self,
        chain_id: ChainId,
        token_address: &str,
        currency: &str,
    ) -> Option<Decimal>;
}

/// Network fee-per-gas estimates
#[async_trait]
pub trait GasFeeSource: Send + Sync {
    async fn fee_estimates(&self, chain_id: ChainId) -> Result<GasFeeEstimates>;
}

/// The four rates a quote's metadata depends on. Any of them may be
/// missing independently of the others.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ExchangeRates {
    pub src_token: Option<Decimal>,
    pub src_native: Option<Decimal>,
    pub dest_token: Option<Decimal>,
    pub dest_native: Option<Decimal>,
}

/// Gather the source/destination token and native rates for one quote.
/// Lookups run concurrently; each one fails soft to `None`.
pub async fn fetch_quote_rates(
    source: &dyn ExchangeRateSource,
    quote: &Quote,
    currency: &str,
) -> ExchangeRates {
    let (src_token, src_native, dest_token, dest_native) = tokio::join!(
        source.fiat_rate(quote.src_chain_id, &quote.src_asset.address, currency),
        source.fiat_rate(
            quote.src_chain_id,
            crate::constants::NATIVE_TOKEN_ADDRESS,
            currency
        ),
        source.fiat_rate(quote.dest_chain_id, &quote.dest_asset.address, currency),
        source.fiat_rate(
            quote.dest_chain_id,
            crate::constants::NATIVE_TOKEN_ADDRESS,
            currency
        ),
    );

    ExchangeRates {
        src_token,
        src_native,
        dest_token,
        dest_native,
    }
}
