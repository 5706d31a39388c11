//! Bridge transaction lifecycle tracking.
//!
//! One scheduler timer is shared by every tracked transaction. Each
//! transaction owns a polling session keyed by its source tx hash; a
//! session is registered at submission, issues one status query per
//! tick, and is deregistered on terminal completion or explicit stop.
//! Sessions carry an opaque token so a response that completes after
//! its session ended is discarded instead of applied.

use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;

use chrono::{DateTime, Utc};
use tokio::sync::RwLock;
use tokio::time::interval;
use tracing::{debug, info, warn};
use uuid::Uuid;

use crate::config::TrackerConfig;
use crate::status::StatusClient;
use crate::types::{
    BridgeHistoryItem, PricingSnapshot, QuoteResponse, StatusRequest, StatusResponse, TxHash,
};

/// Submission-time context captured when tracking starts. Everything
/// here is frozen into the history record; polls never touch it.
#[derive(Debug, Clone)]
pub struct StartTrackingArgs {
    pub status_request: StatusRequest,
    pub quote_response: QuoteResponse,
    pub start_time: Option<DateTime<Utc>>,
    pub slippage_percentage: f64,
    pub completion_time: Option<DateTime<Utc>>,
    pub pricing_data: Option<PricingSnapshot>,
    pub initial_dest_asset_balance: Option<String>,
    pub target_contract_address: Option<String>,
    pub account: String,
}

/// One registered polling session
#[derive(Debug, Clone)]
struct PollingSession {
    token: Uuid,
    request: StatusRequest,
}

/// Tracks submitted bridge transactions until they complete
pub struct BridgeTxTracker {
    client: Arc<dyn StatusClient>,
    history: Arc<RwLock<HashMap<TxHash, BridgeHistoryItem>>>,
    sessions: Arc<RwLock<HashMap<TxHash, PollingSession>>>,
    poll_interval: Duration,
}

impl std::fmt::Debug for BridgeTxTracker {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("BridgeTxTracker")
            .field("poll_interval", &self.poll_interval)
            .finish()
    }
}

impl BridgeTxTracker {
    pub fn new(client: Arc<dyn StatusClient>, config: &TrackerConfig) -> Self {
        Self {
            client,
            history: Arc::new(RwLock::new(HashMap::new())),
            sessions: Arc::new(RwLock::new(HashMap::new())),
            poll_interval: Duration::from_secs(config.poll_interval_secs),
        }
    }

    /// Scheduler loop: one shared timer driving every active session.
    /// Runs until the owning task is dropped.
    pub async fn run(&self) {
        let mut ticker = interval(self.poll_interval);
        loop {
            ticker.tick().await;
            self.poll_once().await;
        }
    }

    /// Begin tracking one submitted transaction. Creates the history
    /// record immediately with `status` absent and registers a polling
    /// session. A second call for the same source tx hash is ignored,
    /// leaving the existing session and record untouched.
    pub async fn start_tracking(&self, args: StartTrackingArgs) {
        let tx_hash = args.status_request.src_tx_hash.clone();

        let mut sessions = self.sessions.write().await;
        if sessions.contains_key(&tx_hash) {
            debug!(%tx_hash, "polling session already active, ignoring duplicate start");
            return;
        }

        let item = BridgeHistoryItem {
            quote: args.quote_response.quote,
            start_time: args.start_time,
            estimated_processing_time_in_seconds: args
                .quote_response
                .estimated_processing_time_in_seconds,
            slippage_percentage: args.slippage_percentage,
            completion_time: args.completion_time,
            pricing_data: args.pricing_data,
            initial_dest_asset_balance: args.initial_dest_asset_balance,
            target_contract_address: args.target_contract_address,
            account: args.account,
            status: None,
        };
        self.history.write().await.insert(tx_hash.clone(), item);

        sessions.insert(
            tx_hash.clone(),
            PollingSession {
                token: Uuid::new_v4(),
                request: args.status_request,
            },
        );
        info!(%tx_hash, "started tracking bridge transaction");
    }

    /// One scheduler tick: every active session issues its status query
    /// in its own task. The tick does not wait for responses; merges
    /// happen in completion order.
    pub async fn poll_once(&self) {
        let snapshot: Vec<(TxHash, PollingSession)> = {
            let sessions = self.sessions.read().await;
            sessions
                .iter()
                .map(|(hash, session)| (hash.clone(), session.clone()))
                .collect()
        };

        for (tx_hash, session) in snapshot {
            let client = Arc::clone(&self.client);
            let history = Arc::clone(&self.history);
            let sessions = Arc::clone(&self.sessions);
            tokio::spawn(async move {
                poll_session(client, history, sessions, tx_hash, session).await;
            });
        }
    }

    /// Cancel the polling session for one transaction. The stored
    /// history record is left as-is. Unknown hashes are a no-op.
    pub async fn stop_tracking(&self, tx_hash: &str) {
        let mut sessions = self.sessions.write().await;
        if sessions.remove(tx_hash).is_some() {
            info!(%tx_hash, "stopped tracking bridge transaction");
        } else {
            debug!(%tx_hash, "stop requested for unknown tx hash, ignoring");
        }
    }

    /// Clear all history and sessions. Full-wipe semantics, distinct
    /// from per-transaction cancellation.
    pub async fn wipe(&self) {
        let mut sessions = self.sessions.write().await;
        let mut history = self.history.write().await;
        let dropped = sessions.len();
        sessions.clear();
        history.clear();
        info!(dropped_sessions = dropped, "bridge tx history wiped");
    }

    /// Snapshot of all tracked transactions keyed by source tx hash
    pub async fn history(&self) -> HashMap<TxHash, BridgeHistoryItem> {
        self.history.read().await.clone()
    }

    /// Number of currently active polling sessions
    pub async fn active_sessions(&self) -> usize {
        self.sessions.read().await.len()
    }
}

/// Issue one status query for one session and apply the result. Fetch
/// failures are retryable: log and leave the session for the next tick.
async fn poll_session(
    client: Arc<dyn StatusClient>,
    history: Arc<RwLock<HashMap<TxHash, BridgeHistoryItem>>>,
    sessions: Arc<RwLock<HashMap<TxHash, PollingSession>>>,
    tx_hash: TxHash,
    session: PollingSession,
) {
    match client.fetch_status(&session.request).await {
        Ok(status) => apply_status(&history, &sessions, &tx_hash, session.token, status).await,
        Err(error) => {
            warn!(%tx_hash, %error, "status fetch failed, will retry next tick");
        }
    }
}

/// Merge one fetched status into the history. The merge is dropped
/// unless the session token is still current, so responses landing
/// after `stop_tracking` or completion never mutate state. A terminal
/// status deregisters the session.
async fn apply_status(
    history: &Arc<RwLock<HashMap<TxHash, BridgeHistoryItem>>>,
    sessions: &Arc<RwLock<HashMap<TxHash, PollingSession>>>,
    tx_hash: &str,
    token: Uuid,
    status: StatusResponse,
) {
    let mut sessions_guard = sessions.write().await;
    let current = matches!(
        sessions_guard.get(tx_hash),
        Some(session) if session.token == token
    );
    if !current {
        debug!(%tx_hash, "discarding status for inactive polling session");
        return;
    }

    let terminal = status.status.is_terminal();
    {
        let mut history_guard = history.write().await;
        match history_guard.get_mut(tx_hash) {
            Some(item) => merge_status(item, status),
            None => {
                warn!(%tx_hash, "no history record for active session, dropping status");
                return;
            }
        }
    }

    if terminal {
        sessions_guard.remove(tx_hash);
        info!(%tx_hash, "bridge transaction complete, polling stopped");
    }
}

/// Field-level merge contract: replaces only `status`. Every
/// submission-time field keeps its value from `start_tracking`.
fn merge_status(item: &mut BridgeHistoryItem, status: StatusResponse) {
    item.status = Some(status);
}
