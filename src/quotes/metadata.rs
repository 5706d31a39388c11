//! Financial metadata derived from a raw quote.
//!
//! Pure functions: quote + exchange rates + fee-per-gas estimates in,
//! `QuoteMetadata` out. No state, no I/O. All amount math runs on
//! `rust_decimal` — token amounts arrive as integer strings in smallest
//! units and every decimal shift (token decimals, gwei to native) is an
//! exact scale change, never a float operation.

use std::str::FromStr;

use rust_decimal::Decimal;

use crate::constants::{GWEI_DECIMALS, NATIVE_DECIMALS};
use crate::oracle::{ExchangeRates, GasFeeEstimates};
use crate::types::{AmountDisplay, BridgeAsset, Quote, QuoteMetadata, QuoteResponse};

/// Maximum scale rust_decimal can represent
const MAX_DECIMAL_SCALE: u32 = 28;

/// Calculator-boundary errors. Raised eagerly on malformed numeric
/// input so no NaN-like value ever reaches the ranker.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum QuoteError {
    #[error("invalid {field} amount: {value:?}")]
    InvalidAmount { field: &'static str, value: String },

    #[error("{field} amount out of range: {value}")]
    AmountOutOfRange { field: &'static str, value: String },

    #[error("invalid trade value: {0:?}")]
    InvalidTradeValue(String),

    #[error("empty {0} asset address")]
    EmptyAssetAddress(&'static str),

    #[error("asset decimals not representable: {0}")]
    UnsupportedDecimals(u8),

    #[error("sent amount is zero")]
    ZeroSentAmount,

    #[error("numeric overflow computing {0}")]
    NumericOverflow(&'static str),
}

/// Parse a base-10 integer amount string. Token amounts must be
/// positive without leading zeros; fee amounts may be "0".
fn parse_integer_amount(
    field: &'static str,
    value: &str,
    allow_zero: bool,
) -> Result<Decimal, QuoteError> {
    let invalid = || QuoteError::InvalidAmount {
        field,
        value: value.to_string(),
    };

    if value.is_empty() || !value.bytes().all(|b| b.is_ascii_digit()) {
        return Err(invalid());
    }
    if value == "0" {
        return if allow_zero { Ok(Decimal::ZERO) } else { Err(invalid()) };
    }
    if value.starts_with('0') {
        return Err(invalid());
    }

    Decimal::from_str(value).map_err(|_| QuoteError::AmountOutOfRange {
        field,
        value: value.to_string(),
    })
}

/// Parse a 0x-prefixed hex wei value into a scale-0 decimal
fn parse_hex_wei(value: &str) -> Result<Decimal, QuoteError> {
    let invalid = || QuoteError::InvalidTradeValue(value.to_string());

    let digits = value
        .strip_prefix("0x")
        .or_else(|| value.strip_prefix("0X"))
        .ok_or_else(invalid)?;
    if digits.is_empty() {
        return Err(invalid());
    }
    let wei = num_bigint::BigUint::parse_bytes(digits.as_bytes(), 16).ok_or_else(invalid)?;
    Decimal::from_str(&wei.to_string()).map_err(|_| QuoteError::AmountOutOfRange {
        field: "trade value",
        value: value.to_string(),
    })
}

/// Divide by 10^decimals as an exact scale shift
fn shift_decimals(mut value: Decimal, decimals: u32, asset_decimals: u8) -> Result<Decimal, QuoteError> {
    let scale = value.scale() + decimals;
    if scale > MAX_DECIMAL_SCALE {
        return Err(QuoteError::UnsupportedDecimals(asset_decimals));
    }
    value
        .set_scale(scale)
        .map_err(|_| QuoteError::UnsupportedDecimals(asset_decimals))?;
    Ok(value)
}

/// The rate that prices an asset: native rate for the zero address,
/// token rate otherwise
fn applicable_rate(
    asset: &BridgeAsset,
    token_rate: Option<Decimal>,
    native_rate: Option<Decimal>,
) -> Option<Decimal> {
    if asset.is_native() {
        native_rate
    } else {
        token_rate
    }
}

fn to_fiat(raw: Decimal, rate: Option<Decimal>) -> Result<Option<Decimal>, QuoteError> {
    match rate {
        Some(rate) => raw
            .checked_mul(rate)
            .map(Some)
            .ok_or(QuoteError::NumericOverflow("fiat value")),
        None => Ok(None),
    }
}

/// Destination amount normalized by destination-asset decimals
pub fn calc_to_token_amount(
    quote: &Quote,
    rates: &ExchangeRates,
) -> Result<AmountDisplay, QuoteError> {
    let amount = parse_integer_amount("destination token", &quote.dest_token_amount, false)?;
    let raw = shift_decimals(
        amount,
        u32::from(quote.dest_asset.decimals),
        quote.dest_asset.decimals,
    )?;
    let rate = applicable_rate(&quote.dest_asset, rates.dest_token, rates.dest_native);
    Ok(AmountDisplay {
        raw,
        fiat: to_fiat(raw, rate)?,
    })
}

/// Source token amount plus the protocol fee, both charged in
/// source-asset units
fn sent_base_units(quote: &Quote) -> Result<Decimal, QuoteError> {
    let amount = parse_integer_amount("source token", &quote.src_token_amount, false)?;
    let fee = parse_integer_amount("protocol fee", &quote.fee_data.metabridge.amount, true)?;
    amount
        .checked_add(fee)
        .ok_or(QuoteError::NumericOverflow("sent amount"))
}

/// Amount leaving the user's wallet: source amount + protocol fee,
/// normalized by source-asset decimals
pub fn calc_sent_amount(quote: &Quote, rates: &ExchangeRates) -> Result<AmountDisplay, QuoteError> {
    let raw = shift_decimals(
        sent_base_units(quote)?,
        u32::from(quote.src_asset.decimals),
        quote.src_asset.decimals,
    )?;
    let rate = applicable_rate(&quote.src_asset, rates.src_token, rates.src_native);
    Ok(AmountDisplay {
        raw,
        fiat: to_fiat(raw, rate)?,
    })
}

/// Native-currency fee implied by the trade's on-chain value beyond the
/// source amount already accounted for. Non-zero only when the source
/// asset is native.
fn calc_relayer_fee(
    response: &QuoteResponse,
    src_native_rate: Option<Decimal>,
) -> Result<AmountDisplay, QuoteError> {
    let value_wei = parse_hex_wei(&response.trade.value)?;
    let accounted_wei = if response.quote.src_asset.is_native() {
        sent_base_units(&response.quote)?
    } else {
        Decimal::ZERO
    };
    let fee_wei = value_wei
        .checked_sub(accounted_wei)
        .ok_or(QuoteError::NumericOverflow("relayer fee"))?;
    let raw = shift_decimals(fee_wei, u32::from(NATIVE_DECIMALS), NATIVE_DECIMALS)?;
    Ok(AmountDisplay {
        raw,
        fiat: to_fiat(raw, src_native_rate)?,
    })
}

/// Gas cost of the trade plus approval transactions at the current
/// fee-per-gas estimate, in native units. `l1_gas_gwei` adds the L1
/// data fee charged by rollup execution layers.
fn calc_total_gas_fee(
    response: &QuoteResponse,
    gas: &GasFeeEstimates,
    src_native_rate: Option<Decimal>,
    l1_gas_gwei: Option<Decimal>,
) -> Result<AmountDisplay, QuoteError> {
    let trade_gas = response.trade.gas_limit.unwrap_or(0);
    let approval_gas = response
        .approval
        .as_ref()
        .and_then(|approval| approval.gas_limit)
        .unwrap_or(0);
    let total_gas_limit = trade_gas
        .checked_add(approval_gas)
        .ok_or(QuoteError::NumericOverflow("gas limit"))?;

    let fee_per_gas_gwei = gas
        .estimated_base_fee_gwei
        .checked_add(gas.max_priority_fee_gwei)
        .ok_or(QuoteError::NumericOverflow("fee per gas"))?;
    let mut gas_gwei = Decimal::from(total_gas_limit)
        .checked_mul(fee_per_gas_gwei)
        .ok_or(QuoteError::NumericOverflow("gas fee"))?;
    if let Some(l1) = l1_gas_gwei {
        gas_gwei = gas_gwei
            .checked_add(l1)
            .ok_or(QuoteError::NumericOverflow("gas fee"))?;
    }

    let raw = shift_decimals(gas_gwei, GWEI_DECIMALS, NATIVE_DECIMALS)?;
    Ok(AmountDisplay {
        raw,
        fiat: to_fiat(raw, src_native_rate)?,
    })
}

/// Gas fee + relayer fee. Raw parts always sum; the fiat part sums only
/// when both operands are present.
pub fn calc_total_network_fee(
    response: &QuoteResponse,
    gas: &GasFeeEstimates,
    rates: &ExchangeRates,
    l1_gas_gwei: Option<Decimal>,
) -> Result<AmountDisplay, QuoteError> {
    let gas_fee = calc_total_gas_fee(response, gas, rates.src_native, l1_gas_gwei)?;
    let relayer_fee = calc_relayer_fee(response, rates.src_native)?;

    let raw = gas_fee
        .raw
        .checked_add(relayer_fee.raw)
        .ok_or(QuoteError::NumericOverflow("network fee"))?;
    let fiat = match (gas_fee.fiat, relayer_fee.fiat) {
        (Some(gas_fiat), Some(relayer_fiat)) => Some(
            gas_fiat
                .checked_add(relayer_fiat)
                .ok_or(QuoteError::NumericOverflow("network fee"))?,
        ),
        _ => None,
    };
    Ok(AmountDisplay { raw, fiat })
}

/// Destination value minus total network fee, in fiat. `None` if either
/// operand is missing — partial estimates are never produced.
pub fn calc_adjusted_return(
    to_token_fiat: Option<Decimal>,
    network_fee_fiat: Option<Decimal>,
) -> Option<Decimal> {
    match (to_token_fiat, network_fee_fiat) {
        (Some(to), Some(fee)) => Some(to - fee),
        _ => None,
    }
}

/// Destination units received per source unit sent. A pure ratio,
/// independent of any fiat rate.
pub fn calc_swap_rate(sent_raw: Decimal, to_token_raw: Decimal) -> Result<Decimal, QuoteError> {
    if sent_raw.is_zero() {
        return Err(QuoteError::ZeroSentAmount);
    }
    to_token_raw
        .checked_div(sent_raw)
        .ok_or(QuoteError::NumericOverflow("swap rate"))
}

/// Overall cost of taking the quote: adjusted return minus the amount
/// sent, in fiat, under the same null-propagation rule.
pub fn calc_cost(
    adjusted_return_fiat: Option<Decimal>,
    sent_amount_fiat: Option<Decimal>,
) -> Option<Decimal> {
    match (adjusted_return_fiat, sent_amount_fiat) {
        (Some(adjusted), Some(sent)) => Some(adjusted - sent),
        _ => None,
    }
}

fn validate_assets(quote: &Quote) -> Result<(), QuoteError> {
    if quote.src_asset.address.is_empty() {
        return Err(QuoteError::EmptyAssetAddress("source"));
    }
    if quote.dest_asset.address.is_empty() {
        return Err(QuoteError::EmptyAssetAddress("destination"));
    }
    Ok(())
}

/// Derive the full metadata record for one quote
pub fn build_quote_metadata(
    response: &QuoteResponse,
    rates: &ExchangeRates,
    gas: &GasFeeEstimates,
    l1_gas_gwei: Option<Decimal>,
) -> Result<QuoteMetadata, QuoteError> {
    validate_assets(&response.quote)?;
    let to_token_amount = calc_to_token_amount(&response.quote, rates)?;
    let sent_amount = calc_sent_amount(&response.quote, rates)?;
    let total_network_fee = calc_total_network_fee(response, gas, rates, l1_gas_gwei)?;
    let adjusted_return = calc_adjusted_return(to_token_amount.fiat, total_network_fee.fiat);
    let swap_rate = calc_swap_rate(sent_amount.raw, to_token_amount.raw)?;
    let cost = calc_cost(adjusted_return, sent_amount.fiat);

    Ok(QuoteMetadata {
        sent_amount,
        to_token_amount,
        total_network_fee,
        adjusted_return,
        swap_rate,
        cost,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::constants::NATIVE_TOKEN_ADDRESS;
    use crate::types::{ApprovalData, FeeData, ProtocolFee, TradeData};
    use rand::rngs::StdRng;
    use rand::{Rng, SeedableRng};

    fn asset(address: &str, symbol: &str, decimals: u8) -> BridgeAsset {
        BridgeAsset {
            address: address.to_string(),
            symbol: symbol.to_string(),
            decimals,
        }
    }

    fn usdc() -> BridgeAsset {
        asset("0xa0b86991c6218b36c1d19d4a2e9eb0ce3606eb48", "USDC", 6)
    }

    fn native() -> BridgeAsset {
        asset(NATIVE_TOKEN_ADDRESS, "ETH", 18)
    }

    fn quote_response(
        src_asset: BridgeAsset,
        src_amount: &str,
        fee_amount: &str,
        dest_asset: BridgeAsset,
        dest_amount: &str,
        trade_value: &str,
    ) -> QuoteResponse {
        QuoteResponse {
            quote: Quote {
                request_id: "req-1".to_string(),
                src_chain_id: 10,
                src_asset,
                src_token_amount: src_amount.to_string(),
                dest_chain_id: 42161,
                dest_asset,
                dest_token_amount: dest_amount.to_string(),
                fee_data: FeeData {
                    metabridge: ProtocolFee {
                        amount: fee_amount.to_string(),
                    },
                },
                bridge_id: "across".to_string(),
            },
            trade: TradeData {
                value: trade_value.to_string(),
                gas_limit: Some(21_000),
            },
            approval: Some(ApprovalData {
                gas_limit: Some(46_000),
            }),
            estimated_processing_time_in_seconds: 60,
        }
    }

    fn gas_estimates(base: &str, priority: &str) -> GasFeeEstimates {
        GasFeeEstimates {
            estimated_base_fee_gwei: Decimal::from_str(base).unwrap(),
            max_priority_fee_gwei: Decimal::from_str(priority).unwrap(),
        }
    }

    fn all_rates() -> ExchangeRates {
        ExchangeRates {
            src_token: Some(Decimal::ONE),
            src_native: Some(Decimal::from(2500)),
            dest_token: Some(Decimal::ONE),
            dest_native: Some(Decimal::from(2500)),
        }
    }

    #[test]
    fn to_token_amount_normalizes_by_decimals() {
        // 150 USDC at 6 decimals
        let response = quote_response(usdc(), "100000000", "0", usdc(), "150000000", "0x0");
        let amount = calc_to_token_amount(&response.quote, &all_rates()).unwrap();
        assert_eq!(amount.raw, Decimal::from(150));
        assert_eq!(amount.fiat, Some(Decimal::from(150)));
    }

    #[test]
    fn native_destination_uses_native_rate() {
        // 0.05 ETH out
        let response = quote_response(usdc(), "100000000", "0", native(), "50000000000000000", "0x0");
        let rates = ExchangeRates {
            dest_token: Some(Decimal::from(999)),
            dest_native: Some(Decimal::from(2000)),
            ..all_rates()
        };
        let amount = calc_to_token_amount(&response.quote, &rates).unwrap();
        assert_eq!(amount.fiat, Some(Decimal::from(100)));
    }

    #[test]
    fn sent_amount_includes_protocol_fee() {
        // 100 USDC + 0.875 USDC metabridge fee
        let response = quote_response(usdc(), "100000000", "875000", usdc(), "99000000", "0x0");
        let sent = calc_sent_amount(&response.quote, &all_rates()).unwrap();
        assert_eq!(sent.raw, Decimal::from_str("100.875").unwrap());
    }

    #[test]
    fn missing_rate_nulls_fiat_but_keeps_raw() {
        let response = quote_response(usdc(), "100000000", "0", usdc(), "99000000", "0x0");
        let rates = ExchangeRates::default();
        let gas = gas_estimates("20", "2");

        let metadata = build_quote_metadata(&response, &rates, &gas, None).unwrap();
        assert!(metadata.sent_amount.fiat.is_none());
        assert!(metadata.to_token_amount.fiat.is_none());
        assert!(metadata.total_network_fee.fiat.is_none());
        assert!(metadata.adjusted_return.is_none());
        assert!(metadata.cost.is_none());
        // raw figures stay available
        assert_eq!(metadata.sent_amount.raw, Decimal::from(100));
        assert!(metadata.total_network_fee.raw > Decimal::ZERO);
        assert!(metadata.swap_rate > Decimal::ZERO);
    }

    #[test]
    fn relayer_fee_is_zero_for_erc20_source() {
        // trade value carries no native amount beyond gas for token bridges
        let response = quote_response(usdc(), "100000000", "0", usdc(), "99000000", "0x0");
        let fee = calc_relayer_fee(&response, Some(Decimal::from(2500))).unwrap();
        assert_eq!(fee.raw, Decimal::ZERO);
        assert_eq!(fee.fiat, Some(Decimal::ZERO));
    }

    #[test]
    fn relayer_fee_is_trade_value_excess_for_native_source() {
        // sending 1 ETH + 0.01 ETH fee, trade value 1.02 ETH -> 0.01 ETH relayer fee
        let response = quote_response(
            native(),
            "1000000000000000000",
            "10000000000000000",
            usdc(),
            "2500000000",
            "0xe27c49886e60000", // 1.02e18
        );
        let fee = calc_relayer_fee(&response, None).unwrap();
        assert_eq!(fee.raw, Decimal::from_str("0.01").unwrap());
        assert!(fee.fiat.is_none());
    }

    #[test]
    fn gas_fee_shifts_gwei_to_native() {
        let response = quote_response(usdc(), "100000000", "0", usdc(), "99000000", "0x0");
        let gas = gas_estimates("20", "2");
        // (21000 + 46000) * 22 gwei = 1474000 gwei = 0.001474 native
        let fee = calc_total_gas_fee(&response, &gas, Some(Decimal::from(1000)), None).unwrap();
        assert_eq!(fee.raw, Decimal::from_str("0.001474").unwrap());
        assert_eq!(fee.fiat, Some(Decimal::from_str("1.474").unwrap()));
    }

    #[test]
    fn l1_data_fee_adds_into_gas_fee() {
        let response = quote_response(usdc(), "100000000", "0", usdc(), "99000000", "0x0");
        let gas = gas_estimates("20", "2");
        let without = calc_total_gas_fee(&response, &gas, None, None).unwrap();
        let with = calc_total_gas_fee(
            &response,
            &gas,
            None,
            Some(Decimal::from(1_000_000)), // 0.001 native worth of L1 gas
        )
        .unwrap();
        assert_eq!(with.raw - without.raw, Decimal::from_str("0.001").unwrap());
    }

    #[test]
    fn adjusted_return_subtracts_network_fee() {
        let metadata = build_quote_metadata(
            &quote_response(usdc(), "100000000", "0", usdc(), "99000000", "0x0"),
            &all_rates(),
            &gas_estimates("20", "2"),
            None,
        )
        .unwrap();

        let to_fiat = metadata.to_token_amount.fiat.unwrap();
        let fee_fiat = metadata.total_network_fee.fiat.unwrap();
        assert_eq!(metadata.adjusted_return, Some(to_fiat - fee_fiat));
        assert_eq!(
            metadata.cost,
            Some(metadata.adjusted_return.unwrap() - metadata.sent_amount.fiat.unwrap())
        );
    }

    #[test]
    fn swap_rate_is_a_pure_ratio() {
        let metadata = build_quote_metadata(
            &quote_response(usdc(), "100000000", "0", usdc(), "99000000", "0x0"),
            &ExchangeRates::default(),
            &gas_estimates("20", "2"),
            None,
        )
        .unwrap();
        assert_eq!(metadata.swap_rate, Decimal::from_str("0.99").unwrap());
    }

    #[test]
    fn malformed_amounts_fail_fast() {
        for bad in ["", "0", "012", "1.5", "1e9", "abc", "-5"] {
            let response = quote_response(usdc(), bad, "0", usdc(), "99000000", "0x0");
            let result = calc_sent_amount(&response.quote, &all_rates());
            assert!(result.is_err(), "expected error for {:?}", bad);
        }
    }

    #[test]
    fn empty_asset_address_fails_fast() {
        let response = quote_response(
            asset("", "???", 6),
            "100000000",
            "0",
            usdc(),
            "99000000",
            "0x0",
        );
        let result = build_quote_metadata(
            &response,
            &all_rates(),
            &gas_estimates("20", "2"),
            None,
        );
        assert_eq!(result, Err(QuoteError::EmptyAssetAddress("source")));
    }

    #[test]
    fn zero_protocol_fee_is_accepted() {
        let response = quote_response(usdc(), "100000000", "0", usdc(), "99000000", "0x0");
        assert!(calc_sent_amount(&response.quote, &all_rates()).is_ok());
    }

    #[test]
    fn malformed_trade_value_fails_fast() {
        for bad in ["", "1234", "0x", "0xzz"] {
            let mut response = quote_response(usdc(), "100000000", "0", usdc(), "99000000", "0x0");
            response.trade.value = bad.to_string();
            let result = calc_total_network_fee(
                &response,
                &gas_estimates("20", "2"),
                &all_rates(),
                None,
            );
            assert!(result.is_err(), "expected error for {:?}", bad);
        }
    }

    #[test]
    fn adjusted_return_law_holds_for_random_inputs() {
        let mut rng = StdRng::seed_from_u64(7);
        for _ in 0..200 {
            let src_amount = rng.gen_range(1u64..=u64::MAX / 2).to_string();
            let dest_amount = rng.gen_range(1u64..=u64::MAX / 2).to_string();
            let fee_amount = rng.gen_range(0u64..=1_000_000_000).to_string();
            let response = quote_response(
                usdc(),
                &src_amount,
                &fee_amount,
                usdc(),
                &dest_amount,
                "0x0",
            );

            let have_src_native = rng.gen_bool(0.5);
            let have_dest_token = rng.gen_bool(0.5);
            let rates = ExchangeRates {
                src_token: Some(Decimal::ONE),
                src_native: have_src_native.then(|| Decimal::from(rng.gen_range(1u64..5000))),
                dest_token: have_dest_token.then(|| Decimal::from(rng.gen_range(1u64..5000))),
                dest_native: None,
            };
            let gas = gas_estimates("31", "2");

            let metadata = build_quote_metadata(&response, &rates, &gas, None).unwrap();

            // null-propagation law: a fiat figure exists iff its rates do
            assert_eq!(metadata.to_token_amount.fiat.is_some(), have_dest_token);
            assert_eq!(metadata.total_network_fee.fiat.is_some(), have_src_native);
            match (metadata.to_token_amount.fiat, metadata.total_network_fee.fiat) {
                (Some(to), Some(fee)) => {
                    assert_eq!(metadata.adjusted_return, Some(to - fee));
                }
                _ => assert!(metadata.adjusted_return.is_none()),
            }
        }
    }
}
