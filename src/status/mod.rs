//! Bridge status API boundary: the `StatusClient` trait consumed by the
//! tracker plus the HTTP implementation.

pub mod client;

use async_trait::async_trait;

use crate::types::{StatusRequest, StatusResponse};

// Re-exports
pub use client::HttpStatusClient;

/// Status query errors. The tracker treats every variant as transient:
/// it logs and keeps the polling session alive.
#[derive(Debug, thiserror::Error)]
pub enum StatusError {
    #[error("request failed: {0}")]
    Http(#[from] reqwest::Error),

    #[error("status API returned {code}: {message}")]
    Api { code: u16, message: String },

    #[error("invalid status request: {0}")]
    InvalidRequest(String),
}

/// Source of truth for a tracked transfer's multi-chain status
#[async_trait]
pub trait StatusClient: Send + Sync {
    async fn fetch_status(&self, request: &StatusRequest) -> Result<StatusResponse, StatusError>;
}

/// Sanity checks on a status request before it hits the wire
pub fn validate_status_request(request: &StatusRequest) -> Result<(), StatusError> {
    if request.src_chain_id == 0 || request.dest_chain_id == 0 {
        return Err(StatusError::InvalidRequest(
            "chain ids must be non-zero".to_string(),
        ));
    }
    if request.bridge_id.is_empty() {
        return Err(StatusError::InvalidRequest("empty bridge id".to_string()));
    }
    let digits = request
        .src_tx_hash
        .strip_prefix("0x")
        .ok_or_else(|| StatusError::InvalidRequest("tx hash missing 0x prefix".to_string()))?;
    let decoded = hex::decode(digits)
        .map_err(|_| StatusError::InvalidRequest("tx hash is not hex".to_string()))?;
    if decoded.len() != 32 {
        return Err(StatusError::InvalidRequest(format!(
            "tx hash must be 32 bytes, got {}",
            decoded.len()
        )));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn request(hash: &str) -> StatusRequest {
        StatusRequest {
            src_chain_id: 10,
            src_tx_hash: hash.to_string(),
            bridge_id: "across".to_string(),
            dest_chain_id: 42161,
        }
    }

    #[test]
    fn accepts_well_formed_request() {
        let hash = format!("0x{}", "ab".repeat(32));
        assert!(validate_status_request(&request(&hash)).is_ok());
    }

    #[test]
    fn rejects_malformed_tx_hashes() {
        for bad in ["", "abcdef", "0x", "0x1234", "0xzz"] {
            assert!(validate_status_request(&request(bad)).is_err(), "{:?}", bad);
        }
    }

    #[test]
    fn rejects_zero_chain_id_and_empty_bridge() {
        let hash = format!("0x{}", "ab".repeat(32));
        let mut r = request(&hash);
        r.src_chain_id = 0;
        assert!(validate_status_request(&r).is_err());

        let mut r = request(&hash);
        r.bridge_id.clear();
        assert!(validate_status_request(&r).is_err());
    }
}
