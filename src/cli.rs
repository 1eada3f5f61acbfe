use std::path::PathBuf;

use clap::{Args, Parser, Subcommand, ValueEnum};
use rust_decimal::Decimal;

use crate::adjust::{AdjustField, AdjustMode, Direction};
use crate::schedule::MAX_TERM_YEARS;

#[derive(Debug, Parser)]
#[command(
    author,
    version,
    about = "Import lot spreadsheets, adjust prices, and compute installment schedules",
    long_about = None
)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Debug, Subcommand)]
pub enum Commands {
    /// Import a lot spreadsheet into the canonical table
    Load(LoadArgs),
    /// Preview (and optionally apply) a price adjustment over the lots
    Adjust(AdjustArgs),
    /// Compute the yearly installment schedule and export the result
    Schedule(ScheduleArgs),
}

#[derive(Debug, Args)]
pub struct LoadArgs {
    /// Input lot spreadsheet (CSV, `-` for stdin)
    #[arg(short = 'i', long = "input")]
    pub input: PathBuf,
    /// Optional down-payment spreadsheet merged into the table by unit
    #[arg(long = "merge")]
    pub merge: Option<PathBuf>,
    /// Output CSV file (stdout if omitted)
    #[arg(short = 'o', long = "output")]
    pub output: Option<PathBuf>,
    /// CSV delimiter character (supports ';', ',', 'tab', '|')
    #[arg(long, value_parser = parse_delimiter)]
    pub delimiter: Option<u8>,
    /// Character encoding of the input files (defaults to utf-8)
    #[arg(long = "input-encoding")]
    pub input_encoding: Option<String>,
    /// Render the canonical table to stdout instead of writing CSV
    #[arg(long = "table")]
    pub table: bool,
    /// Emit the canonical records as JSON instead of CSV
    #[arg(long = "json")]
    pub json: bool,
}

#[derive(Debug, Clone, Copy, ValueEnum)]
#[value(rename_all = "kebab-case")]
pub enum TargetFieldArg {
    /// Adjust the cash price (VALOR_A_VISTA)
    ValorAVista,
    /// Adjust the down payment (ENTRADA)
    Entrada,
}

impl From<TargetFieldArg> for AdjustField {
    fn from(value: TargetFieldArg) -> Self {
        match value {
            TargetFieldArg::ValorAVista => AdjustField::CashPrice,
            TargetFieldArg::Entrada => AdjustField::DownPayment,
        }
    }
}

#[derive(Debug, Clone, Copy, ValueEnum)]
#[value(rename_all = "kebab-case")]
pub enum OperationArg {
    Increase,
    Decrease,
}

impl From<OperationArg> for Direction {
    fn from(value: OperationArg) -> Self {
        match value {
            OperationArg::Increase => Direction::Increase,
            OperationArg::Decrease => Direction::Decrease,
        }
    }
}

#[derive(Debug, Clone, Copy, ValueEnum)]
#[value(rename_all = "kebab-case")]
pub enum ModeArg {
    Percent,
    Absolute,
}

impl From<ModeArg> for AdjustMode {
    fn from(value: ModeArg) -> Self {
        match value {
            ModeArg::Percent => AdjustMode::Percent,
            ModeArg::Absolute => AdjustMode::Absolute,
        }
    }
}

#[derive(Debug, Args)]
pub struct AdjustArgs {
    /// Input lot spreadsheet (CSV, `-` for stdin)
    #[arg(short = 'i', long = "input")]
    pub input: PathBuf,
    /// Optional down-payment spreadsheet merged into the table by unit
    #[arg(long = "merge")]
    pub merge: Option<PathBuf>,
    /// Monetary field the adjustment targets
    #[arg(long = "field", value_enum, default_value = "valor-a-vista")]
    pub field: TargetFieldArg,
    /// Whether to increase or decrease the field
    #[arg(long = "op", value_enum)]
    pub operation: OperationArg,
    /// Whether the amount is a percentage or an absolute value
    #[arg(long = "mode", value_enum)]
    pub mode: ModeArg,
    /// Adjustment magnitude (non-negative)
    #[arg(long = "amount")]
    pub amount: Decimal,
    /// Restrict the operation to these units (repeatable; empty means all
    /// lots in the filtered view)
    #[arg(long = "unit", action = clap::ArgAction::Append)]
    pub units: Vec<String>,
    /// Only consider lots in this stage
    #[arg(long = "stage")]
    pub stage: Option<String>,
    /// Only consider lots in this block
    #[arg(long = "block")]
    pub block: Option<String>,
    /// Apply the previewed values to the table instead of just previewing
    #[arg(long = "apply")]
    pub apply: bool,
    /// Output CSV file (stdout if omitted)
    #[arg(short = 'o', long = "output")]
    pub output: Option<PathBuf>,
    /// CSV delimiter character (supports ';', ',', 'tab', '|')
    #[arg(long, value_parser = parse_delimiter)]
    pub delimiter: Option<u8>,
    /// Character encoding of the input files (defaults to utf-8)
    #[arg(long = "input-encoding")]
    pub input_encoding: Option<String>,
    /// Render the result to stdout as a table instead of CSV
    #[arg(long = "table")]
    pub table: bool,
    /// Emit the result as JSON instead of CSV
    #[arg(long = "json")]
    pub json: bool,
}

#[derive(Debug, Args)]
pub struct ScheduleArgs {
    /// Input lot spreadsheet (CSV, `-` for stdin)
    #[arg(short = 'i', long = "input")]
    pub input: PathBuf,
    /// Optional down-payment spreadsheet merged into the table by unit
    #[arg(long = "merge")]
    pub merge: Option<PathBuf>,
    /// Term in years (1 to 40)
    #[arg(long = "years", value_parser = clap::value_parser!(u32).range(1..=MAX_TERM_YEARS as i64))]
    pub years: u32,
    /// Annual interest rate percentage, e.g. 9.5
    #[arg(long = "rate")]
    pub rate: Decimal,
    /// Restrict the schedule to these units (repeatable; empty means all
    /// lots in the filtered view)
    #[arg(long = "unit", action = clap::ArgAction::Append)]
    pub units: Vec<String>,
    /// Only include lots in this stage
    #[arg(long = "stage")]
    pub stage: Option<String>,
    /// Only include lots in this block
    #[arg(long = "block")]
    pub block: Option<String>,
    /// Output CSV file (stdout if omitted)
    #[arg(short = 'o', long = "output")]
    pub output: Option<PathBuf>,
    /// Write into this directory using the conventional export name
    /// (`precificacao_calculada_<years>anos_<rate>juros.csv`)
    #[arg(long = "output-dir", conflicts_with = "output")]
    pub output_dir: Option<PathBuf>,
    /// CSV delimiter character (supports ';', ',', 'tab', '|')
    #[arg(long, value_parser = parse_delimiter)]
    pub delimiter: Option<u8>,
    /// Character encoding of the input files (defaults to utf-8)
    #[arg(long = "input-encoding")]
    pub input_encoding: Option<String>,
    /// Render the result to stdout as a table instead of CSV
    #[arg(long = "table")]
    pub table: bool,
    /// Emit the result as JSON instead of CSV
    #[arg(long = "json")]
    pub json: bool,
}

pub fn parse_delimiter(value: &str) -> Result<u8, String> {
    match value {
        ";" | "semicolon" => Ok(b';'),
        "," | "comma" => Ok(b','),
        "tab" | "\t" => Ok(b'\t'),
        "|" | "pipe" => Ok(b'|'),
        other => {
            let mut chars = other.chars();
            let first = chars
                .next()
                .ok_or_else(|| "Delimiter cannot be empty".to_string())?;
            if chars.next().is_some() {
                return Err("Delimiter must be a single character".to_string());
            }
            if !first.is_ascii() {
                return Err("Delimiter must be ASCII".to_string());
            }
            Ok(first as u8)
        }
    }
}
