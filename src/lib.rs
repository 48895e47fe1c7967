pub mod cli;
pub mod core;
pub mod providers;
pub mod service;

use crate::core::config::AppConfig;
use crate::core::{CurrencyId, DateRange, LocalClock};
use crate::providers::banguat::BanguatProvider;
use crate::service::ExchangeRateService;
use anyhow::{Context, Result};
use chrono::NaiveDate;
use rust_decimal::Decimal;
use std::time::Duration;
use tracing::{debug, info};

#[derive(Debug, Clone, PartialEq)]
pub enum AppCommand {
    Today,
    Currencies,
    Range {
        start: Option<NaiveDate>,
        end: Option<NaiveDate>,
        currency: Option<CurrencyId>,
    },
    Rate {
        currency: CurrencyId,
    },
    Convert {
        amount: Decimal,
        from: CurrencyId,
        to: CurrencyId,
    },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum OutputFormat {
    #[default]
    Table,
    Json,
}

/// Builds the service described by `config`.
pub fn build_service(config: &AppConfig) -> Result<ExchangeRateService<BanguatProvider, LocalClock>> {
    let provider = BanguatProvider::new(
        &config.provider.base_url,
        Duration::from_secs(config.provider.timeout_secs),
    )
    .context("Failed to create provider client")?;
    let clock = LocalClock::from_utc_offset_hours(config.utc_offset_hours).with_context(|| {
        format!("Invalid utc_offset_hours: {}", config.utc_offset_hours)
    })?;
    Ok(ExchangeRateService::new(provider, clock))
}

/// Runs a command and returns its rendered output.
pub async fn execute(command: AppCommand, config: &AppConfig, format: OutputFormat) -> Result<String> {
    let service = build_service(config)?;

    match command {
        AppCommand::Today => {
            let quote = service.get_today_rate().await?;
            cli::rates::render_today(quote.as_ref(), format)
        }
        AppCommand::Currencies => {
            let currencies = service.get_available_currencies().await?;
            cli::rates::render_currencies(&currencies, format)
        }
        AppCommand::Range {
            start,
            end,
            currency,
        } => {
            let range = match (start, end) {
                (None, None) => None,
                (start, end) => {
                    let today = service.today();
                    Some(DateRange::new(
                        start.unwrap_or(today),
                        end.unwrap_or(today),
                    ))
                }
            };
            let code = match &currency {
                Some(currency) => Some(service.resolve_currency(currency).await?),
                None => None,
            };
            let quotes = service.get_range_exchange_rate(range, code).await?;
            cli::rates::render_quotes(&quotes, format)
        }
        AppCommand::Rate { currency } => {
            let quote = service
                .get_currency_exchange_rate(Some(currency.clone()))
                .await?;
            cli::rates::render_rate(&currency, quote.as_ref(), format)
        }
        AppCommand::Convert { amount, from, to } => {
            let converted = service.convert_currency(amount, &from, &to).await?;
            cli::rates::render_conversion(amount, &from, &to, converted, format)
        }
    }
}

pub async fn run_command(
    command: AppCommand,
    config_path: Option<&str>,
    format: OutputFormat,
) -> Result<()> {
    info!("Exchange rate client starting...");

    let config = match config_path {
        Some(path) => AppConfig::load_from_path(path)?,
        None => AppConfig::load()?,
    };
    debug!("Loaded config: {config:#?}");

    let output = execute(command, &config, format).await?;
    println!("{output}");
    Ok(())
}
