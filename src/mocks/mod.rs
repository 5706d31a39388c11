pub mod rates_mock;
pub mod status_mock;

pub use rates_mock::{FixedGasFeeSource, StaticRateSource};
pub use status_mock::MockStatusClient;

use std::env;

/// Check if mock mode is enabled
pub fn is_mock_mode() -> bool {
    env::var("API_MODE").unwrap_or_default() == "mock"
}
