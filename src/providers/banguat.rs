use super::soap::{
    self, AVAILABLE_CURRENCIES, CurrenciesBody, RATE_RANGE, RATE_RANGE_BY_CURRENCY, RateRangeBody,
    TODAY_RATE, TodayRateBody,
};
use crate::core::currency::{CurrencyCode, CurrencyInfo, DATE_FORMAT, DateRange, RateQuote};
use crate::core::error::{ExchangeRateError, Result};
use crate::core::provider::RateProvider;
use async_trait::async_trait;
use reqwest::header::CONTENT_TYPE;
use serde::de::DeserializeOwned;
use std::time::Duration;
use tracing::{debug, instrument};

/// SOAP client for the Banco de Guatemala `TipoCambio` service.
pub struct BanguatProvider {
    endpoint: String,
    client: reqwest::Client,
}

impl BanguatProvider {
    pub fn new(endpoint: &str, timeout: Duration) -> Result<Self> {
        let client = reqwest::Client::builder()
            .user_agent("banguat/0.1")
            .timeout(timeout)
            .build()?;
        Ok(BanguatProvider {
            endpoint: endpoint.to_string(),
            client,
        })
    }

    async fn request<B: DeserializeOwned>(
        &self,
        operation: &str,
        params: &[(&str, String)],
    ) -> Result<B> {
        let body = soap::request_envelope(operation, params);
        debug!("Calling {} at {}", operation, self.endpoint);

        let response = self
            .client
            .post(&self.endpoint)
            .header(CONTENT_TYPE, "text/xml; charset=utf-8")
            .header("SOAPAction", soap::soap_action(operation))
            .body(body)
            .send()
            .await
            .map_err(|e| {
                ExchangeRateError::Unknown(format!("Request error: {e} for operation: {operation}"))
            })?;

        let status = response.status();
        let text = response.text().await?;
        debug!(%status, "Received {} response", operation);

        // Faults usually arrive with a 500 status, so look for them first.
        if let Some(fault) = soap::parse_fault(&text) {
            debug!(%fault, "Provider reported a fault");
            return Err(ExchangeRateError::Unknown(fault));
        }

        if !status.is_success() {
            return Err(ExchangeRateError::Unknown(format!(
                "HTTP error: {status} for operation: {operation}"
            )));
        }

        soap::parse_envelope(operation, &text)
    }
}

fn format_date_params(range: &DateRange) -> Vec<(&'static str, String)> {
    vec![
        ("fechainit", range.start.format(DATE_FORMAT).to_string()),
        ("fechafin", range.end.format(DATE_FORMAT).to_string()),
    ]
}

#[async_trait]
impl RateProvider for BanguatProvider {
    #[instrument(name = "BanguatTodayRate", skip(self))]
    async fn fetch_today_rate(&self) -> Result<Option<RateQuote>> {
        let body: TodayRateBody = self.request(TODAY_RATE, &[]).await?;
        body.into_quote()
    }

    #[instrument(name = "BanguatCurrencies", skip(self))]
    async fn fetch_available_currencies(&self) -> Result<Vec<CurrencyInfo>> {
        let body: CurrenciesBody = self.request(AVAILABLE_CURRENCIES, &[]).await?;
        body.into_currencies()
    }

    #[instrument(
        name = "BanguatRateRange",
        skip(self),
        fields(start = %range.start, end = %range.end)
    )]
    async fn fetch_rate_range(
        &self,
        range: DateRange,
        code: Option<CurrencyCode>,
    ) -> Result<Vec<RateQuote>> {
        let mut params = format_date_params(&range);
        let operation = match code {
            Some(code) => {
                params.push(("moneda", code.to_string()));
                RATE_RANGE_BY_CURRENCY
            }
            None => RATE_RANGE,
        };

        let body: RateRangeBody = self.request(operation, &params).await?;
        let quotes = body.into_quotes(code)?;
        debug!("Received {} quotes", quotes.len());
        Ok(quotes)
    }
}
