// crosslane - cross-chain bridge quote ranking & transaction tracking engine

pub mod config;
pub mod constants;
pub mod mocks;
pub mod oracle;
pub mod quotes;
pub mod status;
pub mod tracker;
pub mod types;

// Re-exports for convenience
pub use config::Config;
pub use quotes::{build_quote_metadata, rank_quotes, RankedQuotes};
pub use status::{HttpStatusClient, StatusClient};
pub use tracker::{BridgeTxTracker, StartTrackingArgs};
