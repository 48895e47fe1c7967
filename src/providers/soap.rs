//! SOAP 1.1 envelopes for the Banguat `TipoCambio` web service.

use crate::core::currency::{
    CurrencyCode, CurrencyInfo, DATE_FORMAT, RateQuote, USD, symbol_of,
};
use crate::core::error::{ExchangeRateError, Result};
use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::Deserialize;
use serde::de::DeserializeOwned;
use std::str::FromStr;

pub const SERVICE_NAMESPACE: &str = "http://www.banguat.gob.gt/variables/ws/";

pub const TODAY_RATE: &str = "TipoCambioDia";
pub const AVAILABLE_CURRENCIES: &str = "VariablesDisponibles";
pub const RATE_RANGE: &str = "TipoCambioRango";
pub const RATE_RANGE_BY_CURRENCY: &str = "TipoCambioRangoMoneda";

pub fn soap_action(operation: &str) -> String {
    format!("\"{SERVICE_NAMESPACE}{operation}\"")
}

/// Builds the request envelope. Parameter values are dates and integers, so
/// they are written without escaping.
pub fn request_envelope(operation: &str, params: &[(&str, String)]) -> String {
    let params: String = params
        .iter()
        .map(|(name, value)| format!("<{name}>{value}</{name}>"))
        .collect();

    format!(
        r#"<?xml version="1.0" encoding="utf-8"?>
<soap:Envelope xmlns:xsi="http://www.w3.org/2001/XMLSchema-instance" xmlns:xsd="http://www.w3.org/2001/XMLSchema" xmlns:soap="http://schemas.xmlsoap.org/soap/envelope/">
  <soap:Body>
    <{operation} xmlns="{SERVICE_NAMESPACE}">{params}</{operation}>
  </soap:Body>
</soap:Envelope>"#
    )
}

#[derive(Deserialize, Debug)]
pub struct Envelope<B> {
    #[serde(rename = "Body")]
    pub body: B,
}

#[derive(Deserialize, Debug)]
struct FaultBody {
    #[serde(rename = "Fault")]
    fault: Option<Fault>,
}

#[derive(Deserialize, Debug)]
struct Fault {
    faultstring: Option<String>,
}

/// Extracts the fault message when the document is a SOAP fault.
pub fn parse_fault(text: &str) -> Option<String> {
    let envelope: Envelope<FaultBody> = serde_xml_rs::from_str(text).ok()?;
    envelope.body.fault.map(|fault| {
        fault
            .faultstring
            .map(|s| s.trim().to_string())
            .filter(|s| !s.is_empty())
            .unwrap_or_else(|| "Unknown SOAP fault".to_string())
    })
}

pub fn parse_envelope<B: DeserializeOwned>(operation: &str, text: &str) -> Result<B> {
    serde_xml_rs::from_str::<Envelope<B>>(text)
        .map(|envelope| envelope.body)
        .map_err(|e| {
            ExchangeRateError::Unknown(format!("Failed to parse {operation} response: {e}"))
        })
}

// TipoCambioDia

#[derive(Deserialize, Debug)]
pub struct TodayRateBody {
    #[serde(rename = "TipoCambioDiaResponse")]
    response: Option<TodayRateResponse>,
}

#[derive(Deserialize, Debug)]
struct TodayRateResponse {
    #[serde(rename = "TipoCambioDiaResult")]
    result: Option<TodayRateResult>,
}

#[derive(Deserialize, Debug)]
struct TodayRateResult {
    #[serde(rename = "CambioDolar")]
    dollar: Option<DollarRates>,
}

#[derive(Deserialize, Debug)]
struct DollarRates {
    #[serde(rename = "VarDolar", default)]
    items: Vec<DollarRecord>,
}

#[derive(Deserialize, Debug)]
struct DollarRecord {
    fecha: Option<String>,
    referencia: Option<String>,
}

impl TodayRateBody {
    /// The reference rate is a single price, reported as both buy and sell of USD.
    pub fn into_quote(self) -> Result<Option<RateQuote>> {
        let Some(record) = self
            .response
            .and_then(|r| r.result)
            .and_then(|r| r.dollar)
            .and_then(|d| d.items.into_iter().next())
        else {
            return Ok(None);
        };

        let date = parse_date(required(record.fecha, "fecha")?)?;
        let reference = parse_decimal(required(record.referencia, "referencia")?)?;
        Ok(Some(RateQuote {
            code: USD,
            date,
            buy: reference,
            sell: reference,
        }))
    }
}

// VariablesDisponibles

#[derive(Deserialize, Debug)]
pub struct CurrenciesBody {
    #[serde(rename = "VariablesDisponiblesResponse")]
    response: Option<CurrenciesResponse>,
}

#[derive(Deserialize, Debug)]
struct CurrenciesResponse {
    #[serde(rename = "VariablesDisponiblesResult")]
    result: Option<CurrenciesResult>,
}

#[derive(Deserialize, Debug)]
struct CurrenciesResult {
    #[serde(rename = "Variables")]
    variables: Option<CurrencyRecords>,
}

#[derive(Deserialize, Debug)]
struct CurrencyRecords {
    #[serde(rename = "Variable", default)]
    items: Vec<CurrencyRecord>,
}

#[derive(Deserialize, Debug)]
struct CurrencyRecord {
    moneda: Option<String>,
    descripcion: Option<String>,
}

impl CurrenciesBody {
    pub fn into_currencies(self) -> Result<Vec<CurrencyInfo>> {
        let records = self
            .response
            .and_then(|r| r.result)
            .and_then(|r| r.variables)
            .map(|v| v.items)
            .unwrap_or_default();

        records
            .into_iter()
            .map(|record| {
                let code = parse_code(required(record.moneda, "moneda")?)?;
                Ok(CurrencyInfo {
                    code,
                    symbol: symbol_of(code).map(str::to_string),
                    name: record
                        .descripcion
                        .map(|d| d.trim().to_string())
                        .unwrap_or_default(),
                })
            })
            .collect()
    }
}

// TipoCambioRango and TipoCambioRangoMoneda share the same result shape.

#[derive(Deserialize, Debug)]
pub struct RateRangeBody {
    #[serde(rename = "TipoCambioRangoResponse", alias = "TipoCambioRangoMonedaResponse")]
    response: Option<RateRangeResponse>,
}

#[derive(Deserialize, Debug)]
struct RateRangeResponse {
    #[serde(rename = "TipoCambioRangoResult", alias = "TipoCambioRangoMonedaResult")]
    result: Option<RateRangeResult>,
}

#[derive(Deserialize, Debug)]
struct RateRangeResult {
    #[serde(rename = "Vars")]
    vars: Option<RateRecords>,
}

#[derive(Deserialize, Debug)]
struct RateRecords {
    #[serde(rename = "Var", default)]
    items: Vec<RateRecord>,
}

#[derive(Deserialize, Debug)]
struct RateRecord {
    moneda: Option<String>,
    fecha: Option<String>,
    venta: Option<String>,
    compra: Option<String>,
}

impl RateRangeBody {
    /// `requested` fills in the currency when records omit it.
    pub fn into_quotes(self, requested: Option<CurrencyCode>) -> Result<Vec<RateQuote>> {
        let records = self
            .response
            .and_then(|r| r.result)
            .and_then(|r| r.vars)
            .map(|v| v.items)
            .unwrap_or_default();

        records
            .into_iter()
            .map(|record| {
                let code = match (record.moneda, requested) {
                    (Some(moneda), _) => parse_code(moneda)?,
                    (None, Some(code)) => code,
                    (None, None) => return Err(missing_field("moneda")),
                };
                Ok(RateQuote {
                    code,
                    date: parse_date(required(record.fecha, "fecha")?)?,
                    buy: parse_decimal(required(record.compra, "compra")?)?,
                    sell: parse_decimal(required(record.venta, "venta")?)?,
                })
            })
            .collect()
    }
}

fn missing_field(field: &str) -> ExchangeRateError {
    ExchangeRateError::Unknown(format!("Malformed response: missing field '{field}'"))
}

fn required(value: Option<String>, field: &str) -> Result<String> {
    value
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
        .ok_or_else(|| missing_field(field))
}

fn parse_code(value: String) -> Result<CurrencyCode> {
    value.parse().map_err(|_| {
        ExchangeRateError::Unknown(format!("Malformed response: invalid currency code '{value}'"))
    })
}

fn parse_date(value: String) -> Result<NaiveDate> {
    NaiveDate::parse_from_str(&value, DATE_FORMAT).map_err(|_| {
        ExchangeRateError::Unknown(format!("Malformed response: invalid date '{value}'"))
    })
}

fn parse_decimal(value: String) -> Result<Decimal> {
    Decimal::from_str(&value).map_err(|_| {
        ExchangeRateError::Unknown(format!("Malformed response: invalid rate '{value}'"))
    })
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;

    pub fn response_envelope(inner: &str) -> String {
        format!(
            r#"<?xml version="1.0" encoding="utf-8"?>
<soap:Envelope xmlns:soap="http://schemas.xmlsoap.org/soap/envelope/" xmlns:xsi="http://www.w3.org/2001/XMLSchema-instance" xmlns:xsd="http://www.w3.org/2001/XMLSchema">
  <soap:Body>{inner}</soap:Body>
</soap:Envelope>"#
        )
    }

    #[test]
    fn test_request_envelope() {
        let body = request_envelope(
            RATE_RANGE_BY_CURRENCY,
            &[
                ("fechainit", "15/10/2026".to_string()),
                ("fechafin", "16/10/2026".to_string()),
                ("moneda", "24".to_string()),
            ],
        );
        assert!(body.contains(
            r#"<TipoCambioRangoMoneda xmlns="http://www.banguat.gob.gt/variables/ws/">"#
        ));
        assert!(body.contains("<fechainit>15/10/2026</fechainit>"));
        assert!(body.contains("<fechafin>16/10/2026</fechafin>"));
        assert!(body.contains("<moneda>24</moneda>"));
        assert_eq!(
            soap_action(TODAY_RATE),
            "\"http://www.banguat.gob.gt/variables/ws/TipoCambioDia\""
        );
    }

    #[test]
    fn test_parse_fault() {
        let text = response_envelope(
            "<soap:Fault><faultcode>soap:Server</faultcode><faultstring>Server was unable to process request.</faultstring><detail /></soap:Fault>",
        );
        assert_eq!(
            parse_fault(&text),
            Some("Server was unable to process request.".to_string())
        );

        let ok = response_envelope(
            r#"<TipoCambioDiaResponse xmlns="http://www.banguat.gob.gt/variables/ws/"></TipoCambioDiaResponse>"#,
        );
        assert_eq!(parse_fault(&ok), None);
        assert_eq!(parse_fault("not xml"), None);
    }

    #[test]
    fn test_parse_range_records() {
        let text = response_envelope(
            r#"<TipoCambioRangoMonedaResponse xmlns="http://www.banguat.gob.gt/variables/ws/">
              <TipoCambioRangoMonedaResult>
                <Vars>
                  <Var><moneda>24</moneda><fecha>15/10/2026</fecha><venta>1.0643</venta><compra>1.087</compra></Var>
                  <Var><moneda>24</moneda><fecha>16/10/2026</fecha><venta>1.0650</venta><compra>1.0901</compra></Var>
                </Vars>
                <TotalItems>2</TotalItems>
              </TipoCambioRangoMonedaResult>
            </TipoCambioRangoMonedaResponse>"#,
        );
        let body: RateRangeBody = parse_envelope(RATE_RANGE_BY_CURRENCY, &text).unwrap();
        let quotes = body.into_quotes(Some(24)).unwrap();
        assert_eq!(quotes.len(), 2);
        assert_eq!(quotes[0].code, 24);
        assert_eq!(quotes[0].date, NaiveDate::from_ymd_opt(2026, 10, 15).unwrap());
        assert_eq!(quotes[0].buy, Decimal::from_str("1.087").unwrap());
        assert_eq!(quotes[0].sell, Decimal::from_str("1.0643").unwrap());
        assert_eq!(quotes[1].date, NaiveDate::from_ymd_opt(2026, 10, 16).unwrap());
    }

    #[test]
    fn test_parse_range_without_vars_is_empty() {
        let text = response_envelope(
            r#"<TipoCambioRangoResponse xmlns="http://www.banguat.gob.gt/variables/ws/">
              <TipoCambioRangoResult><TotalItems>0</TotalItems></TipoCambioRangoResult>
            </TipoCambioRangoResponse>"#,
        );
        let body: RateRangeBody = parse_envelope(RATE_RANGE, &text).unwrap();
        assert!(body.into_quotes(None).unwrap().is_empty());
    }

    #[test]
    fn test_parse_range_missing_price_is_malformed() {
        let text = response_envelope(
            r#"<TipoCambioRangoResponse xmlns="http://www.banguat.gob.gt/variables/ws/">
              <TipoCambioRangoResult>
                <Vars><Var><moneda>2</moneda><fecha>16/10/2026</fecha><venta>7.80</venta></Var></Vars>
              </TipoCambioRangoResult>
            </TipoCambioRangoResponse>"#,
        );
        let body: RateRangeBody = parse_envelope(RATE_RANGE, &text).unwrap();
        assert_eq!(
            body.into_quotes(None).unwrap_err(),
            ExchangeRateError::Unknown("Malformed response: missing field 'compra'".to_string())
        );
    }

    #[test]
    fn test_parse_currencies() {
        let text = response_envelope(
            r#"<VariablesDisponiblesResponse xmlns="http://www.banguat.gob.gt/variables/ws/">
              <VariablesDisponiblesResult>
                <Variables>
                  <Variable><moneda>1</moneda><descripcion>Quetzales</descripcion></Variable>
                  <Variable><moneda>26</moneda><descripcion>Derechos Especiales de Giro</descripcion></Variable>
                  <Variable><moneda>24</moneda><descripcion>Euro</descripcion></Variable>
                </Variables>
              </VariablesDisponiblesResult>
            </VariablesDisponiblesResponse>"#,
        );
        let body: CurrenciesBody = parse_envelope(AVAILABLE_CURRENCIES, &text).unwrap();
        let currencies = body.into_currencies().unwrap();
        assert_eq!(currencies.len(), 3);
        assert_eq!(currencies[0].symbol.as_deref(), Some("GTQ"));
        assert_eq!(currencies[0].name, "Quetzales");
        assert_eq!(currencies[1].code, 26);
        assert_eq!(currencies[1].symbol, None);
        assert_eq!(currencies[2].symbol.as_deref(), Some("EUR"));
    }

    #[test]
    fn test_parse_today_rate() {
        let text = response_envelope(
            r#"<TipoCambioDiaResponse xmlns="http://www.banguat.gob.gt/variables/ws/">
              <TipoCambioDiaResult>
                <CambioDolar><VarDolar><fecha>16/10/2026</fecha><referencia>7.66063</referencia></VarDolar></CambioDolar>
                <TotalItems>1</TotalItems>
              </TipoCambioDiaResult>
            </TipoCambioDiaResponse>"#,
        );
        let body: TodayRateBody = parse_envelope(TODAY_RATE, &text).unwrap();
        let quote = body.into_quote().unwrap().unwrap();
        assert_eq!(quote.code, USD);
        assert_eq!(quote.buy, Decimal::from_str("7.66063").unwrap());
        assert_eq!(quote.sell, quote.buy);
    }

    #[test]
    fn test_parse_today_rate_empty() {
        let text = response_envelope(
            r#"<TipoCambioDiaResponse xmlns="http://www.banguat.gob.gt/variables/ws/">
              <TipoCambioDiaResult><CambioDolar /><TotalItems>0</TotalItems></TipoCambioDiaResult>
            </TipoCambioDiaResponse>"#,
        );
        let body: TodayRateBody = parse_envelope(TODAY_RATE, &text).unwrap();
        assert_eq!(body.into_quote().unwrap(), None);
    }

    #[test]
    fn test_parse_invalid_document() {
        let result = parse_envelope::<TodayRateBody>(TODAY_RATE, "<html>oops");
        assert!(matches!(result, Err(ExchangeRateError::Unknown(msg)) if msg.starts_with("Failed to parse TipoCambioDia response")));
    }
}
