pub mod format;
pub mod metadata;
pub mod ranking;

// Re-exports
pub use metadata::{build_quote_metadata, QuoteError};
pub use ranking::{rank_quotes, RankedQuotes};
