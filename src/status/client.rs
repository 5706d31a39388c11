use std::time::Duration;

use reqwest::Client;
use tracing::debug;

use super::{validate_status_request, StatusClient, StatusError};
use crate::config::ApiConfig;
use crate::types::{StatusRequest, StatusResponse};

/// HTTP client against the bridge aggregator's status endpoint.
/// Requests are encoded as a query string; responses are camelCase
/// JSON matching [`StatusResponse`].
#[derive(Debug, Clone)]
pub struct HttpStatusClient {
    client: Client,
    base_url: String,
}

impl HttpStatusClient {
    pub fn new(config: &ApiConfig) -> Result<Self, StatusError> {
        let client = Client::builder()
            .timeout(Duration::from_secs(config.request_timeout_secs))
            .build()?;
        Ok(Self {
            client,
            base_url: config.base_url.trim_end_matches('/').to_string(),
        })
    }
}

#[async_trait::async_trait]
impl StatusClient for HttpStatusClient {
    async fn fetch_status(&self, request: &StatusRequest) -> Result<StatusResponse, StatusError> {
        validate_status_request(request)?;

        let url = format!("{}/getTxStatus", self.base_url);
        debug!(
            src_tx_hash = %request.src_tx_hash,
            bridge = %request.bridge_id,
            "fetching bridge tx status"
        );

        let response = self.client.get(&url).query(request).send().await?;
        if !response.status().is_success() {
            let code = response.status().as_u16();
            let message = response.text().await.unwrap_or_default();
            return Err(StatusError::Api { code, message });
        }

        let status: StatusResponse = response.json().await?;
        debug!(
            src_tx_hash = %request.src_tx_hash,
            status = %status.status,
            dest_tx_hash = ?status.dest_tx_hash(),
            "bridge tx status fetched"
        );
        Ok(status)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn base_url_trailing_slash_is_normalized() {
        let client = HttpStatusClient::new(&ApiConfig {
            base_url: "https://bridge-api.crosslane.dev/v1/".to_string(),
            request_timeout_secs: 5,
        })
        .unwrap();
        assert_eq!(client.base_url, "https://bridge-api.crosslane.dev/v1");
    }

    #[tokio::test]
    async fn invalid_request_is_rejected_before_any_io() {
        let client = HttpStatusClient::new(&ApiConfig::default()).unwrap();
        let request = StatusRequest {
            src_chain_id: 10,
            src_tx_hash: "not-a-hash".to_string(),
            bridge_id: "across".to_string(),
            dest_chain_id: 42161,
        };
        let err = client.fetch_status(&request).await.unwrap_err();
        assert!(matches!(err, StatusError::InvalidRequest(_)));
    }
}
