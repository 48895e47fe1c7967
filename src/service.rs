//! Normalization and conversion rules on top of a [`RateProvider`].

use crate::core::clock::Clock;
use crate::core::currency::{
    CurrencyCode, CurrencyId, CurrencyInfo, DateRange, GTQ, RateQuote, USD, is_usd_based, round5,
};
use crate::core::error::{ExchangeRateError, Result};
use crate::core::provider::RateProvider;
use rust_decimal::Decimal;
use tracing::debug;

pub struct ExchangeRateService<P, C> {
    provider: P,
    clock: C,
}

impl<P: RateProvider, C: Clock> ExchangeRateService<P, C> {
    pub fn new(provider: P, clock: C) -> Self {
        ExchangeRateService { provider, clock }
    }

    pub fn provider(&self) -> &P {
        &self.provider
    }

    pub fn today(&self) -> chrono::NaiveDate {
        self.clock.today()
    }

    /// The provider's reference rate for today, unmodified.
    pub async fn get_today_rate(&self) -> Result<Option<RateQuote>> {
        self.provider.fetch_today_rate().await
    }

    pub async fn get_available_currencies(&self) -> Result<Vec<CurrencyInfo>> {
        self.provider.fetch_available_currencies().await
    }

    /// Quotes in `range` (today when omitted), for one currency or all of them.
    ///
    /// A single-day query for today that comes back empty is retried once for
    /// yesterday, since the day's rate may not be published yet.
    pub async fn get_range_exchange_rate(
        &self,
        range: Option<DateRange>,
        code: Option<CurrencyCode>,
    ) -> Result<Vec<RateQuote>> {
        let range = range.unwrap_or_else(|| DateRange::single(self.clock.today()));
        self.fetch_range(range, code, true).await
    }

    async fn fetch_range(
        &self,
        range: DateRange,
        code: Option<CurrencyCode>,
        allow_fallback: bool,
    ) -> Result<Vec<RateQuote>> {
        let quotes = self.provider.fetch_rate_range(range, code).await?;
        if !quotes.is_empty() {
            return Ok(quotes);
        }

        let today = self.clock.today();
        if allow_fallback && range.is_single_day() && range.start == today {
            let yesterday = self.clock.yesterday();
            debug!(%today, %yesterday, "No rate for today, falling back to yesterday");
            return Box::pin(self.fetch_range(DateRange::single(yesterday), code, false)).await;
        }

        Ok(quotes)
    }

    /// Today's normalized quote for a currency.
    ///
    /// GTQ is answered with the USD quote relabelled as GTQ, USD itself is
    /// always unity, and EUR, DEG and GBP are inverted onto a USD basis.
    /// `Ok(None)` means the provider has no rate even after the date fallback.
    pub async fn get_currency_exchange_rate(
        &self,
        currency: Option<CurrencyId>,
    ) -> Result<Option<RateQuote>> {
        let Some(currency) = currency else {
            return Err(ExchangeRateError::Resolution(
                "no currency given".to_string(),
            ));
        };

        let gtq_primary = currency.is_gtq();
        let target = if gtq_primary {
            debug!("Substituting USD for GTQ");
            CurrencyId::Code(USD)
        } else {
            currency
        };

        let today = self.clock.today();
        if target.is_usd() && !gtq_primary {
            debug!("USD is quoted at unity");
            return Ok(Some(RateQuote {
                code: USD,
                date: today,
                buy: Decimal::ONE,
                sell: Decimal::ONE,
            }));
        }

        let code = self.resolve_currency(&target).await?;
        let quote = self
            .get_range_exchange_rate(Some(DateRange::single(today)), Some(code))
            .await?
            .into_iter()
            .next();

        let Some(mut quote) = quote else {
            return Ok(None);
        };

        if is_usd_based(quote.code) {
            quote = quote.inverted().ok_or_else(|| {
                ExchangeRateError::RateUnavailable(format!("{target} is quoted at zero"))
            })?;
        }

        if gtq_primary {
            quote.code = GTQ;
        }

        Ok(Some(quote))
    }

    /// Provider code for a currency; symbols are matched against the provider's list.
    pub async fn resolve_currency(&self, currency: &CurrencyId) -> Result<CurrencyCode> {
        match currency {
            CurrencyId::Code(code) => Ok(*code),
            CurrencyId::Symbol(symbol) => {
                let currencies = self.provider.fetch_available_currencies().await?;
                currencies
                    .iter()
                    .find(|info| {
                        info.symbol
                            .as_deref()
                            .is_some_and(|s| s.eq_ignore_ascii_case(symbol))
                    })
                    .map(|info| info.code)
                    .ok_or_else(|| ExchangeRateError::Resolution(symbol.clone()))
            }
        }
    }

    /// Converts `amount` through USD, rounding after each hop.
    pub async fn convert_currency(
        &self,
        amount: Decimal,
        from: &CurrencyId,
        to: &CurrencyId,
    ) -> Result<Decimal> {
        if from == to {
            return Ok(amount);
        }

        let from_quote = self.required_rate(from).await?;
        let to_quote = self.required_rate(to).await?;

        if from_quote.buy.is_zero() {
            return Err(ExchangeRateError::RateUnavailable(format!(
                "{from} is quoted at zero"
            )));
        }
        let usd = amount
            .checked_div(from_quote.buy)
            .map(round5)
            .ok_or_else(|| ExchangeRateError::Unknown("Conversion overflow".to_string()))?;
        let converted = usd
            .checked_mul(to_quote.buy)
            .map(round5)
            .ok_or_else(|| ExchangeRateError::Unknown("Conversion overflow".to_string()))?;

        debug!(%amount, %from, %to, %converted, "Converted amount");
        Ok(converted)
    }

    async fn required_rate(&self, currency: &CurrencyId) -> Result<RateQuote> {
        self.get_currency_exchange_rate(Some(currency.clone()))
            .await?
            .ok_or_else(|| ExchangeRateError::RateUnavailable(currency.to_string()))
    }
}
