//! Scripted status client for tests and mock-mode runs

use std::collections::VecDeque;
use std::sync::atomic::{AtomicUsize, Ordering};

use async_trait::async_trait;
use tokio::sync::Mutex;

use crate::status::{StatusClient, StatusError};
use crate::types::{BridgeStatus, ChainStatus, StatusRequest, StatusResponse};

enum ScriptedResult {
    Status(StatusResponse),
    Error(String),
}

/// Status client that replays a scripted sequence of responses. Once
/// the script is exhausted it keeps answering `PENDING`, mirroring a
/// bridge that has not settled yet.
#[derive(Default)]
pub struct MockStatusClient {
    script: Mutex<VecDeque<ScriptedResult>>,
    calls: AtomicUsize,
}

impl MockStatusClient {
    pub fn new() -> Self {
        Self::default()
    }

    pub async fn push_status(&self, status: StatusResponse) {
        self.script
            .lock()
            .await
            .push_back(ScriptedResult::Status(status));
    }

    pub async fn push_error(&self, message: &str) {
        self.script
            .lock()
            .await
            .push_back(ScriptedResult::Error(message.to_string()));
    }

    /// Number of fetches issued so far
    pub fn call_count(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl StatusClient for MockStatusClient {
    async fn fetch_status(&self, request: &StatusRequest) -> Result<StatusResponse, StatusError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        match self.script.lock().await.pop_front() {
            Some(ScriptedResult::Status(status)) => Ok(status),
            Some(ScriptedResult::Error(message)) => Err(StatusError::Api { code: 500, message }),
            None => Ok(pending_status(request.src_chain_id, &request.src_tx_hash)),
        }
    }
}

/// A PENDING response where only the source chain has a tx hash yet
pub fn pending_status(src_chain_id: u64, src_tx_hash: &str) -> StatusResponse {
    StatusResponse {
        status: BridgeStatus::Pending,
        src_chain: ChainStatus {
            chain_id: src_chain_id,
            tx_hash: Some(src_tx_hash.to_string()),
        },
        dest_chain: None,
        bridge: Some("across".to_string()),
    }
}

/// A terminal COMPLETE response carrying the destination tx hash
pub fn complete_status(
    src_chain_id: u64,
    src_tx_hash: &str,
    dest_chain_id: u64,
    dest_tx_hash: &str,
) -> StatusResponse {
    StatusResponse {
        status: BridgeStatus::Complete,
        src_chain: ChainStatus {
            chain_id: src_chain_id,
            tx_hash: Some(src_tx_hash.to_string()),
        },
        dest_chain: Some(ChainStatus {
            chain_id: dest_chain_id,
            tx_hash: Some(dest_tx_hash.to_string()),
        }),
        bridge: Some("across".to_string()),
    }
}
