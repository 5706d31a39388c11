//! Quote ordering and recommended-quote selection.
//!
//! Sorting is stable and total; the selection policy walks the sorted
//! list and applies a reasonableness threshold from `RankingConfig` so
//! the recommendation never lands on an extremely slow best-priced
//! quote or an extremely poor fastest quote.

use std::cmp::Ordering;

use once_cell::sync::Lazy;
use rust_decimal::prelude::FromPrimitive;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::config::RankingConfig;
use crate::constants;
use crate::types::{QuoteWithMetadata, SortOrder};

static DEFAULT_TOLERANCE: Lazy<Decimal> = Lazy::new(|| {
    Decimal::from_f64(constants::ranking::RETURN_VALUE_TOLERANCE)
        .unwrap_or_else(|| Decimal::new(80, 2))
});

/// Output of the ranking entry point
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct RankedQuotes {
    pub sorted: Vec<QuoteWithMetadata>,
    pub recommended: Option<QuoteWithMetadata>,
}

/// Stable sort by the selected order. `AdjustedReturnDesc` places
/// quotes without a fiat adjusted return last, preserving their
/// relative order.
pub fn sort_quotes(quotes: Vec<QuoteWithMetadata>, order: SortOrder) -> Vec<QuoteWithMetadata> {
    let mut sorted = quotes;
    match order {
        SortOrder::EtaAsc => sorted.sort_by_key(QuoteWithMetadata::eta_seconds),
        SortOrder::AdjustedReturnDesc => sorted.sort_by(cmp_adjusted_return_desc),
    }
    sorted
}

fn cmp_adjusted_return_desc(a: &QuoteWithMetadata, b: &QuoteWithMetadata) -> Ordering {
    match (a.adjusted_return(), b.adjusted_return()) {
        (Some(left), Some(right)) => right.cmp(&left),
        (Some(_), None) => Ordering::Less,
        (None, Some(_)) => Ordering::Greater,
        (None, None) => Ordering::Equal,
    }
}

/// A fast quote qualifies when its adjusted return is at least
/// `tolerance` of the best return in the batch. A quote without an
/// adjusted return never qualifies.
fn is_fast_quote_value_reasonable(
    adjusted_return: Option<Decimal>,
    best_return: Option<Decimal>,
    tolerance: Decimal,
) -> bool {
    match (adjusted_return, best_return) {
        (Some(value), Some(best)) if best > Decimal::ZERO => value
            .checked_div(best)
            .map_or(false, |ratio| ratio >= tolerance),
        // non-positive best return: only a quote matching it qualifies
        (Some(value), Some(best)) => value >= best,
        _ => false,
    }
}

/// The best-priced quote qualifies while its ETA stays under the ceiling
fn is_best_priced_quote_eta_reasonable(eta_seconds: u64, max_eta_seconds: u64) -> bool {
    eta_seconds < max_eta_seconds
}

/// Pick the recommended quote from an already-sorted list. Falls back
/// to the first sorted element when no quote satisfies the policy;
/// empty input yields `None`.
pub fn recommend<'a>(
    sorted: &'a [QuoteWithMetadata],
    order: SortOrder,
    config: &RankingConfig,
) -> Option<&'a QuoteWithMetadata> {
    if sorted.is_empty() {
        return None;
    }

    let best_return = sorted.iter().filter_map(QuoteWithMetadata::adjusted_return).max();
    let tolerance =
        Decimal::from_f64(config.return_value_tolerance).unwrap_or(*DEFAULT_TOLERANCE);

    sorted
        .iter()
        .find(|quote| match order {
            SortOrder::EtaAsc => {
                is_fast_quote_value_reasonable(quote.adjusted_return(), best_return, tolerance)
            }
            SortOrder::AdjustedReturnDesc => {
                is_best_priced_quote_eta_reasonable(quote.eta_seconds(), config.max_eta_seconds)
            }
        })
        .or_else(|| sorted.first())
}

/// Ranking entry point: sort, then select
pub fn rank_quotes(
    quotes: Vec<QuoteWithMetadata>,
    order: SortOrder,
    config: &RankingConfig,
) -> RankedQuotes {
    let sorted = sort_quotes(quotes, order);
    let recommended = recommend(&sorted, order, config).cloned();
    RankedQuotes { sorted, recommended }
}
