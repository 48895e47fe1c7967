use super::ui;
use crate::OutputFormat;
use crate::core::currency::{CurrencyId, CurrencyInfo, DATE_FORMAT, RateQuote};
use anyhow::{Context, Result};
use comfy_table::Cell;
use rust_decimal::Decimal;
use serde::Serialize;

fn to_json<T: Serialize + ?Sized>(value: &T) -> Result<String> {
    serde_json::to_string_pretty(value).context("Failed to serialize output")
}

fn no_data(message: &str) -> String {
    ui::style_text(message, ui::StyleType::Subtle)
}

fn quotes_table(quotes: &[RateQuote]) -> String {
    let mut table = ui::new_styled_table();
    table.set_header(vec![
        ui::header_cell("Currency"),
        ui::header_cell("Code"),
        ui::header_cell("Date"),
        ui::header_cell("Buy"),
        ui::header_cell("Sell"),
    ]);

    for quote in quotes {
        table.add_row(vec![
            ui::format_optional_cell(quote.symbol(), str::to_string),
            Cell::new(quote.code),
            Cell::new(quote.date.format(DATE_FORMAT)),
            ui::rate_cell(quote.buy),
            ui::rate_cell(quote.sell),
        ]);
    }

    table.to_string()
}

pub fn render_today(quote: Option<&RateQuote>, format: OutputFormat) -> Result<String> {
    match format {
        OutputFormat::Json => to_json(&quote),
        OutputFormat::Table => Ok(match quote {
            Some(quote) => format!(
                "Reference rate for {}: {} GTQ per USD",
                ui::style_text(&quote.date.format(DATE_FORMAT).to_string(), ui::StyleType::Title),
                ui::style_text(&quote.buy.normalize().to_string(), ui::StyleType::TotalValue)
            ),
            None => no_data("No reference rate published for today"),
        }),
    }
}

pub fn render_currencies(currencies: &[CurrencyInfo], format: OutputFormat) -> Result<String> {
    if format == OutputFormat::Json {
        return to_json(currencies);
    }
    if currencies.is_empty() {
        return Ok(no_data("No currencies available"));
    }

    let mut table = ui::new_styled_table();
    table.set_header(vec![
        ui::header_cell("Code"),
        ui::header_cell("Symbol"),
        ui::header_cell("Name"),
    ]);
    for currency in currencies {
        table.add_row(vec![
            Cell::new(currency.code),
            ui::format_optional_cell(currency.symbol.as_deref(), str::to_string),
            Cell::new(&currency.name),
        ]);
    }
    Ok(table.to_string())
}

pub fn render_quotes(quotes: &[RateQuote], format: OutputFormat) -> Result<String> {
    if format == OutputFormat::Json {
        return to_json(quotes);
    }
    if quotes.is_empty() {
        return Ok(no_data("No exchange rates in range"));
    }
    Ok(quotes_table(quotes))
}

pub fn render_rate(
    currency: &CurrencyId,
    quote: Option<&RateQuote>,
    format: OutputFormat,
) -> Result<String> {
    match (format, quote) {
        (OutputFormat::Json, _) => to_json(&quote),
        (OutputFormat::Table, Some(quote)) => Ok(format!(
            "Exchange rate: {}\n\n{}",
            ui::style_text(&currency.to_string(), ui::StyleType::Title),
            quotes_table(std::slice::from_ref(quote))
        )),
        (OutputFormat::Table, None) => Ok(no_data(&format!(
            "No exchange rate available for {currency}"
        ))),
    }
}

#[derive(Serialize)]
struct Conversion {
    amount: Decimal,
    from: String,
    to: String,
    result: Decimal,
}

pub fn render_conversion(
    amount: Decimal,
    from: &CurrencyId,
    to: &CurrencyId,
    converted: Decimal,
    format: OutputFormat,
) -> Result<String> {
    match format {
        OutputFormat::Json => to_json(&Conversion {
            amount,
            from: from.to_string(),
            to: to.to_string(),
            result: converted,
        }),
        OutputFormat::Table => Ok(format!(
            "{} {} = {} {}",
            amount.normalize(),
            from,
            ui::style_text(&converted.normalize().to_string(), ui::StyleType::TotalValue),
            ui::style_text(&to.to_string(), ui::StyleType::TotalLabel)
        )),
    }
}
