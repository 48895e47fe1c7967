//! Exchange rate provider abstraction

use super::currency::{CurrencyCode, CurrencyInfo, DateRange, RateQuote};
use super::error::Result;
use async_trait::async_trait;

/// One round trip to the remote rate service per call. Implementations carry
/// no business rules; an empty answer is `None` or an empty `Vec`, never an
/// error.
#[async_trait]
pub trait RateProvider: Send + Sync {
    async fn fetch_today_rate(&self) -> Result<Option<RateQuote>>;

    /// Every currency the provider quotes, in provider order, with symbols
    /// taken from the code table.
    async fn fetch_available_currencies(&self) -> Result<Vec<CurrencyInfo>>;

    /// Quotes within `range`, restricted to `code` when given.
    async fn fetch_rate_range(
        &self,
        range: DateRange,
        code: Option<CurrencyCode>,
    ) -> Result<Vec<RateQuote>>;
}
