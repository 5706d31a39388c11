use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::constants::NATIVE_TOKEN_ADDRESS;

/// Numeric chain id (EVM convention: 1 = Ethereum, 10 = Optimism, ...)
pub type ChainId = u64;

/// Source-chain transaction hash, 0x-prefixed
pub type TxHash = String;

/// One asset leg of a bridge quote. The chain-native asset uses the
/// zero address.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct BridgeAsset {
    pub address: String,
    pub symbol: String,
    pub decimals: u8,
}

impl BridgeAsset {
    /// True when this asset is the chain's native currency
    pub fn is_native(&self) -> bool {
        self.address.eq_ignore_ascii_case(NATIVE_TOKEN_ADDRESS)
    }
}

/// Protocol fee charged by the aggregator, in source-asset smallest units
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct ProtocolFee {
    pub amount: String,
}

/// Fee breakdown attached to a quote
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct FeeData {
    pub metabridge: ProtocolFee,
}

/// One priced cross-chain swap/bridge offer from a liquidity provider.
/// Token amounts are base-10 integer strings in smallest units.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct Quote {
    pub request_id: String,
    pub src_chain_id: ChainId,
    pub src_asset: BridgeAsset,
    pub src_token_amount: String,
    pub dest_chain_id: ChainId,
    pub dest_asset: BridgeAsset,
    pub dest_token_amount: String,
    pub fee_data: FeeData,
    pub bridge_id: String,
}

/// Unsigned trade transaction descriptor returned alongside a quote
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct TradeData {
    /// On-chain value in wei, 0x-prefixed hex
    pub value: String,
    pub gas_limit: Option<u64>,
}

/// Optional token-approval transaction descriptor
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct ApprovalData {
    pub gas_limit: Option<u64>,
}

/// A quote plus its unsigned transaction descriptors
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct QuoteResponse {
    pub quote: Quote,
    pub trade: TradeData,
    pub approval: Option<ApprovalData>,
    pub estimated_processing_time_in_seconds: u64,
}

/// A raw amount with its optional fiat valuation. Fiat is `None`
/// whenever a required exchange rate is unavailable, never zero.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct AmountDisplay {
    pub raw: Decimal,
    pub fiat: Option<Decimal>,
}

/// Derived financial view over a quote. Never persisted.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct QuoteMetadata {
    pub sent_amount: AmountDisplay,
    pub to_token_amount: AmountDisplay,
    pub total_network_fee: AmountDisplay,
    pub adjusted_return: Option<Decimal>,
    pub swap_rate: Decimal,
    pub cost: Option<Decimal>,
}

/// A quote joined with its derived metadata, the unit the ranker works on
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct QuoteWithMetadata {
    #[serde(flatten)]
    pub response: QuoteResponse,
    #[serde(flatten)]
    pub metadata: QuoteMetadata,
}

impl QuoteWithMetadata {
    pub fn eta_seconds(&self) -> u64 {
        self.response.estimated_processing_time_in_seconds
    }

    pub fn adjusted_return(&self) -> Option<Decimal> {
        self.metadata.adjusted_return
    }
}

/// Quote list sort order selector
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum SortOrder {
    EtaAsc,
    #[default]
    AdjustedReturnDesc,
}

/// Identifies one in-flight bridge transfer against the status API
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct StatusRequest {
    pub src_chain_id: ChainId,
    pub src_tx_hash: TxHash,
    pub bridge_id: String,
    pub dest_chain_id: ChainId,
}

/// Bridge transfer status as reported by the status API. Unrecognized
/// server values deserialize to `Unknown` instead of failing the poll.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum BridgeStatus {
    Pending,
    Complete,
    #[serde(other)]
    Unknown,
}

impl BridgeStatus {
    /// Terminal states stop the polling session
    pub fn is_terminal(&self) -> bool {
        matches!(self, BridgeStatus::Complete)
    }
}

impl std::fmt::Display for BridgeStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            BridgeStatus::Pending => write!(f, "PENDING"),
            BridgeStatus::Complete => write!(f, "COMPLETE"),
            BridgeStatus::Unknown => write!(f, "UNKNOWN"),
        }
    }
}

/// Per-chain view inside a status response
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct ChainStatus {
    pub chain_id: ChainId,
    pub tx_hash: Option<TxHash>,
}

/// Status API response for one tracked transfer
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct StatusResponse {
    pub status: BridgeStatus,
    pub src_chain: ChainStatus,
    pub dest_chain: Option<ChainStatus>,
    pub bridge: Option<String>,
}

impl StatusResponse {
    /// Destination-chain transaction hash, once the bridge reports it
    pub fn dest_tx_hash(&self) -> Option<&str> {
        self.dest_chain
            .as_ref()
            .and_then(|chain| chain.tx_hash.as_deref())
    }
}

/// Pricing captured at submission time, preserved for the lifetime of
/// the history record
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct PricingSnapshot {
    pub amount_sent: Decimal,
    pub amount_sent_in_fiat: Option<Decimal>,
    pub quoted_gas_in_fiat: Option<Decimal>,
    pub quoted_return_in_fiat: Option<Decimal>,
}

/// Persistent record of one submitted bridge transaction, keyed by
/// source tx hash. Created exactly once at submission; polls only ever
/// replace the `status` field.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct BridgeHistoryItem {
    pub quote: Quote,
    pub start_time: Option<DateTime<Utc>>,
    pub estimated_processing_time_in_seconds: u64,
    pub slippage_percentage: f64,
    pub completion_time: Option<DateTime<Utc>>,
    pub pricing_data: Option<PricingSnapshot>,
    pub initial_dest_asset_balance: Option<String>,
    pub target_contract_address: Option<String>,
    pub account: String,
    pub status: Option<StatusResponse>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn native_asset_detection_is_case_insensitive() {
        let asset = BridgeAsset {
            address: "0x0000000000000000000000000000000000000000".to_string(),
            symbol: "ETH".to_string(),
            decimals: 18,
        };
        assert!(asset.is_native());

        let erc20 = BridgeAsset {
            address: "0xA0b86991c6218b36c1d19D4a2e9Eb0cE3606eB48".to_string(),
            symbol: "USDC".to_string(),
            decimals: 6,
        };
        assert!(!erc20.is_native());
    }

    #[test]
    fn unknown_status_values_deserialize_to_unknown() {
        let parsed: BridgeStatus = serde_json::from_str("\"FAILED\"").unwrap();
        assert_eq!(parsed, BridgeStatus::Unknown);
        assert!(!parsed.is_terminal());

        let complete: BridgeStatus = serde_json::from_str("\"COMPLETE\"").unwrap();
        assert!(complete.is_terminal());
    }

    #[test]
    fn status_response_surfaces_dest_tx_hash() {
        let json = r#"{
            "status": "COMPLETE",
            "srcChain": { "chainId": 10, "txHash": "0xabc" },
            "destChain": { "chainId": 42161, "txHash": "0xdef" },
            "bridge": "across"
        }"#;
        let parsed: StatusResponse = serde_json::from_str(json).unwrap();
        assert_eq!(parsed.dest_tx_hash(), Some("0xdef"));
        assert_eq!(parsed.status, BridgeStatus::Complete);
    }
}
