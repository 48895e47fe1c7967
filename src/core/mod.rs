//! Core business logic abstractions

pub mod clock;
pub mod config;
pub mod currency;
pub mod error;
pub mod log;
pub mod provider;

// Re-export main types for cleaner imports
pub use clock::{Clock, FixedClock, LocalClock};
pub use currency::{CurrencyCode, CurrencyId, CurrencyInfo, DateRange, RateQuote};
pub use error::{ExchangeRateError, Result};
pub use provider::RateProvider;
