//! Currency identifiers, the provider's code table and quote types

use chrono::NaiveDate;
use rust_decimal::{Decimal, RoundingStrategy};
use serde::{Deserialize, Serialize};
use std::fmt::Display;
use std::str::FromStr;

/// Integer identifier the provider assigns to a currency.
pub type CurrencyCode = u32;

pub const GTQ: CurrencyCode = 1;
pub const USD: CurrencyCode = 2;

/// Day format used by the provider, on the wire and on the command line.
pub const DATE_FORMAT: &str = "%d/%m/%Y";

/// Number of fractional digits kept on every derived value.
pub const DECIMAL_PLACES: u32 = 5;

/// Provider codes whose quotes are inverted onto a USD basis.
///
/// 26 (DEG, special drawing rights) has no symbol in [`CURRENCY_CODES`] but is
/// still quoted by the provider.
pub const USD_BASED: [CurrencyCode; 3] = [24, 26, 9];

pub const CURRENCY_CODES: &[(CurrencyCode, &str)] = &[
    (1, "GTQ"),
    (2, "USD"),
    (3, "JPY"),
    (4, "CHF"),
    (7, "CAD"),
    (9, "GBP"),
    (15, "SEK"),
    (16, "CRC"),
    (18, "MXN"),
    (19, "HNL"),
    (21, "NIO"),
    (23, "DKK"),
    (24, "EUR"),
    (25, "NOK"),
    (29, "ARS"),
    (30, "BRL"),
    (31, "KRW"),
    (32, "HKD"),
    (33, "TWD"),
    (34, "CNY"),
    (35, "PKR"),
    (36, "INR"),
    (38, "COP"),
    (39, "DOP"),
    (40, "MYR"),
    (41, "VES"),
    (42, "PLN"),
];

/// Looks up the three letter symbol for a provider code.
pub fn symbol_of(code: CurrencyCode) -> Option<&'static str> {
    CURRENCY_CODES
        .iter()
        .find(|(c, _)| *c == code)
        .map(|(_, symbol)| *symbol)
}

/// Looks up the provider code for a three letter symbol, ignoring case.
pub fn code_of(symbol: &str) -> Option<CurrencyCode> {
    CURRENCY_CODES
        .iter()
        .find(|(_, s)| s.eq_ignore_ascii_case(symbol))
        .map(|(code, _)| *code)
}

pub fn is_usd_based(code: CurrencyCode) -> bool {
    USD_BASED.contains(&code)
}

/// Rounds to [`DECIMAL_PLACES`], halves away from zero.
pub fn round5(value: Decimal) -> Decimal {
    value.round_dp_with_strategy(DECIMAL_PLACES, RoundingStrategy::MidpointAwayFromZero)
}

/// A currency as given by a caller: either the provider code or a symbol.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum CurrencyId {
    Code(CurrencyCode),
    Symbol(String),
}

impl CurrencyId {
    pub fn is_gtq(&self) -> bool {
        self.denotes(GTQ)
    }

    pub fn is_usd(&self) -> bool {
        self.denotes(USD)
    }

    fn denotes(&self, code: CurrencyCode) -> bool {
        match self {
            CurrencyId::Code(c) => *c == code,
            CurrencyId::Symbol(s) => {
                symbol_of(code).is_some_and(|sym| sym.eq_ignore_ascii_case(s))
            }
        }
    }
}

impl Display for CurrencyId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            CurrencyId::Code(code) => write!(f, "{code}"),
            CurrencyId::Symbol(symbol) => write!(f, "{symbol}"),
        }
    }
}

impl From<CurrencyCode> for CurrencyId {
    fn from(code: CurrencyCode) -> Self {
        CurrencyId::Code(code)
    }
}

impl From<&str> for CurrencyId {
    fn from(symbol: &str) -> Self {
        CurrencyId::Symbol(symbol.to_string())
    }
}

impl FromStr for CurrencyId {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let s = s.trim();
        if s.is_empty() {
            return Err(anyhow::anyhow!("Currency must not be empty"));
        }
        match s.parse::<CurrencyCode>() {
            Ok(code) => Ok(CurrencyId::Code(code)),
            Err(_) => Ok(CurrencyId::Symbol(s.to_uppercase())),
        }
    }
}

/// A currency quoted by the provider.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CurrencyInfo {
    pub code: CurrencyCode,
    pub symbol: Option<String>,
    pub name: String,
}

/// Buy and sell prices of one currency on one day.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RateQuote {
    pub code: CurrencyCode,
    pub date: NaiveDate,
    pub buy: Decimal,
    pub sell: Decimal,
}

impl RateQuote {
    pub fn symbol(&self) -> Option<&'static str> {
        symbol_of(self.code)
    }

    /// Replaces both prices with their rounded reciprocal.
    ///
    /// Returns `None` when either price is zero.
    pub fn inverted(&self) -> Option<RateQuote> {
        Some(RateQuote {
            code: self.code,
            date: self.date,
            buy: round5(Decimal::ONE.checked_div(self.buy)?),
            sell: round5(Decimal::ONE.checked_div(self.sell)?),
        })
    }
}

/// Inclusive range of days.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct DateRange {
    pub start: NaiveDate,
    pub end: NaiveDate,
}

impl DateRange {
    pub fn new(start: NaiveDate, end: NaiveDate) -> Self {
        DateRange { start, end }
    }

    pub fn single(day: NaiveDate) -> Self {
        DateRange {
            start: day,
            end: day,
        }
    }

    pub fn is_single_day(&self) -> bool {
        self.start == self.end
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn dec(s: &str) -> Decimal {
        Decimal::from_str(s).unwrap()
    }

    #[test]
    fn test_symbol_lookup_is_total_for_table() {
        for (code, symbol) in CURRENCY_CODES {
            assert_eq!(symbol_of(*code), Some(*symbol));
            assert_eq!(code_of(symbol), Some(*code));
        }
        assert_eq!(CURRENCY_CODES.len(), 27);
    }

    #[test]
    fn test_symbol_lookup_misses() {
        assert_eq!(symbol_of(26), None);
        assert_eq!(symbol_of(0), None);
        assert_eq!(symbol_of(43), None);
        assert_eq!(code_of("XAU"), None);
        assert_eq!(code_of("eur"), Some(24));
    }

    #[test]
    fn test_usd_based_set() {
        assert!(is_usd_based(24));
        assert!(is_usd_based(26));
        assert!(is_usd_based(9));
        assert!(!is_usd_based(GTQ));
        assert!(!is_usd_based(USD));
    }

    #[test]
    fn test_round5_half_away_from_zero() {
        assert_eq!(round5(dec("1.234565")), dec("1.23457"));
        assert_eq!(round5(dec("-1.234565")), dec("-1.23457"));
        assert_eq!(round5(dec("1.234564")), dec("1.23456"));
        assert_eq!(round5(dec("7.75")), dec("7.75"));
    }

    #[test]
    fn test_inverted_rounds_each_side() {
        let quote = RateQuote {
            code: 24,
            date: NaiveDate::from_ymd_opt(2026, 10, 16).unwrap(),
            buy: dec("1.087"),
            sell: dec("1.0643"),
        };
        let inverted = quote.inverted().unwrap();
        assert_eq!(inverted.buy, dec("0.91996"));
        assert_eq!(inverted.sell, dec("0.93958"));

        // rounding loses precision, inverting again does not recover the quote
        let back = inverted.inverted().unwrap();
        assert_eq!(back.buy, dec("1.08700"));
        assert_ne!(back.sell, quote.sell);
    }

    #[test]
    fn test_inverted_zero_price() {
        let quote = RateQuote {
            code: 9,
            date: NaiveDate::from_ymd_opt(2026, 10, 16).unwrap(),
            buy: Decimal::ZERO,
            sell: dec("1.3"),
        };
        assert!(quote.inverted().is_none());
    }

    #[test]
    fn test_currency_id_parsing() {
        assert_eq!("24".parse::<CurrencyId>().unwrap(), CurrencyId::Code(24));
        assert_eq!(
            "eur".parse::<CurrencyId>().unwrap(),
            CurrencyId::Symbol("EUR".to_string())
        );
        assert!("  ".parse::<CurrencyId>().is_err());
    }

    #[test]
    fn test_currency_id_denotes_gtq_and_usd() {
        assert!(CurrencyId::Code(1).is_gtq());
        assert!(CurrencyId::from("GTQ").is_gtq());
        assert!(CurrencyId::from("gtq").is_gtq());
        assert!(!CurrencyId::Code(2).is_gtq());
        assert!(CurrencyId::Code(2).is_usd());
        assert!(CurrencyId::from("USD").is_usd());
        assert!(!CurrencyId::from("EUR").is_usd());
    }
}
