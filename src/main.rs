use anyhow::Result;
use banguat::core::currency::{CurrencyId, DATE_FORMAT};
use banguat::core::log::init_logging;
use banguat::{AppCommand, OutputFormat};
use chrono::NaiveDate;
use clap::{CommandFactory, Parser, Subcommand};
use rust_decimal::Decimal;

#[derive(Parser)]
#[command(version, about)]
struct Cli {
    /// Enable verbose logging
    #[arg(short, long, global = true)]
    verbose: bool,

    /// Path to optional configuration file
    #[arg(short, long, global = true)]
    config_path: Option<String>,

    /// Print results as JSON
    #[arg(long, global = true)]
    json: bool,

    #[command(subcommand)]
    command: Option<Commands>,
}

fn parse_date(s: &str) -> Result<NaiveDate, String> {
    NaiveDate::parse_from_str(s, DATE_FORMAT).map_err(|e| format!("expected dd/mm/yyyy: {e}"))
}

#[derive(Subcommand)]
enum Commands {
    /// Create default configuration
    Setup,
    /// Display the reference USD rate published for today
    Today,
    /// List currencies quoted by the provider
    Currencies,
    /// Display exchange rates within a date range
    Range {
        /// First day, dd/mm/yyyy (defaults to today)
        #[arg(long, value_parser = parse_date)]
        start: Option<NaiveDate>,
        /// Last day, dd/mm/yyyy (defaults to today)
        #[arg(long, value_parser = parse_date)]
        end: Option<NaiveDate>,
        /// Provider code or symbol; all currencies when omitted
        #[arg(long)]
        currency: Option<CurrencyId>,
    },
    /// Display today's exchange rate for a currency
    Rate {
        /// Provider code or symbol
        currency: CurrencyId,
    },
    /// Convert an amount between currencies
    Convert {
        amount: Decimal,
        #[arg(long, default_value = "GTQ")]
        from: CurrencyId,
        #[arg(long, default_value = "USD")]
        to: CurrencyId,
    },
}

impl From<Commands> for AppCommand {
    fn from(cmd: Commands) -> AppCommand {
        match cmd {
            Commands::Today => AppCommand::Today,
            Commands::Currencies => AppCommand::Currencies,
            Commands::Range {
                start,
                end,
                currency,
            } => AppCommand::Range {
                start,
                end,
                currency,
            },
            Commands::Rate { currency } => AppCommand::Rate { currency },
            Commands::Convert { amount, from, to } => AppCommand::Convert { amount, from, to },
            Commands::Setup => unreachable!("Setup command should be handled separately"),
        }
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    init_logging(cli.verbose);

    let format = if cli.json {
        OutputFormat::Json
    } else {
        OutputFormat::Table
    };

    let result = match cli.command {
        Some(Commands::Setup) => banguat::cli::setup::setup(),
        Some(cmd) => banguat::run_command(cmd.into(), cli.config_path.as_deref(), format).await,
        None => {
            Cli::command().print_help()?;
            Ok(())
        }
    };

    if let Err(e) = &result {
        tracing::error!(error = %e, "Application failed");
    }
    result
}
