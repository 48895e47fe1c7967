//! Error types for exchange rate lookups

use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ExchangeRateError {
    /// Round trip to the provider failed: network, malformed response or a
    /// provider reported fault.
    #[error("{0}")]
    Unknown(String),

    /// A symbol or code did not match any currency known to the provider.
    #[error("Unable to resolve currency: {0}")]
    Resolution(String),

    #[error("No exchange rate available for currency: {0}")]
    RateUnavailable(String),
}

impl From<reqwest::Error> for ExchangeRateError {
    fn from(err: reqwest::Error) -> Self {
        ExchangeRateError::Unknown(err.to_string())
    }
}

pub type Result<T> = std::result::Result<T, ExchangeRateError>;
