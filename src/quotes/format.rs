//! Display formatting for quote amounts and ETAs

use rust_decimal::Decimal;

use crate::constants::display::{FIAT_AMOUNT_PRECISION, TOKEN_AMOUNT_PRECISION};

/// ETA rounded to whole minutes, e.g. 90s -> "2"
pub fn format_eta_in_minutes(estimated_processing_time_in_seconds: u64) -> String {
    ((estimated_processing_time_in_seconds + 30) / 60).to_string()
}

/// Token amount with its symbol, e.g. "1.234567 ETH"
pub fn format_token_amount(amount: Decimal, symbol: &str) -> String {
    let rounded = amount.round_dp(TOKEN_AMOUNT_PRECISION).normalize();
    if symbol.is_empty() {
        rounded.to_string()
    } else {
        format!("{} {}", rounded, symbol)
    }
}

/// Fiat amount in the display currency, `None` stays `None`
pub fn format_fiat_amount(amount: Option<Decimal>, currency: &str) -> Option<String> {
    amount.map(|value| {
        format!(
            "{} {}",
            value.round_dp(FIAT_AMOUNT_PRECISION),
            currency.to_uppercase()
        )
    })
}
