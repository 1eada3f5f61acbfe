pub mod adjust;
pub mod cli;
pub mod columns;
pub mod currency;
pub mod error;
pub mod export;
pub mod io_utils;
pub mod loader;
pub mod lot;
pub mod schedule;
pub mod table;

use std::{env, path::PathBuf, sync::OnceLock};

use anyhow::{Context, Result, ensure};
use clap::Parser;
use itertools::Itertools;
use log::{LevelFilter, info};
use rust_decimal::Decimal;

use crate::{
    cli::{AdjustArgs, Cli, Commands, LoadArgs, ScheduleArgs},
    columns::ImportSession,
    currency::format_currency,
    lot::{LotFilter, LotRecord, select_indices},
};

static LOGGER: OnceLock<()> = OnceLock::new();

fn init_logging() {
    LOGGER.get_or_init(|| {
        let mut builder = env_logger::Builder::from_env(env_logger::Env::default());
        if env::var("RUST_LOG").is_err() {
            builder.filter_module("precifica", LevelFilter::Info);
        }
        let _ = builder.format_timestamp_millis().try_init();
    });
}

pub fn run() -> Result<()> {
    init_logging();
    let cli = Cli::parse();
    match cli.command {
        Commands::Load(args) => handle_load(&args),
        Commands::Adjust(args) => handle_adjust(&args),
        Commands::Schedule(args) => handle_schedule(&args),
    }
}

/// Imports the primary spreadsheet and, when given, merges the secondary
/// down-payment sheet into it.
fn import_lots(
    input: &PathBuf,
    merge: Option<&PathBuf>,
    delimiter: Option<u8>,
    input_encoding: Option<&str>,
    session: &mut ImportSession,
) -> Result<Vec<LotRecord>> {
    let delimiter = io_utils::resolve_delimiter(delimiter);
    let encoding = io_utils::resolve_encoding(input_encoding)?;

    let raw = io_utils::read_raw_table(input, delimiter, encoding)
        .with_context(|| format!("Reading lot spreadsheet {input:?}"))?;
    let mut lots =
        loader::load(&raw, session).with_context(|| format!("Loading lot spreadsheet {input:?}"))?;

    if let Some(merge_path) = merge {
        let secondary = io_utils::read_raw_table(merge_path, delimiter, encoding)
            .with_context(|| format!("Reading down-payment spreadsheet {merge_path:?}"))?;
        lots = loader::merge_down_payments(&lots, &secondary, session)
            .with_context(|| format!("Merging down payments from {merge_path:?}"))?;
        info!(
            "Merged down payments from '{}' into {} lot(s)",
            merge_path.display(),
            lots.len()
        );
    }
    Ok(lots)
}

fn emit_lots(
    lots: &[LotRecord],
    session: &ImportSession,
    output: Option<&PathBuf>,
    delimiter: Option<u8>,
    as_table: bool,
    as_json: bool,
) -> Result<()> {
    let headers = export::export_headers(lots, session);
    if as_json {
        let records = export::to_json_records(lots)?;
        println!("{}", serde_json::to_string_pretty(&records)?);
    } else if as_table {
        table::print_table(&headers, &export::export_rows(lots));
    } else {
        io_utils::write_table(
            output.map(PathBuf::as_path),
            io_utils::resolve_delimiter(delimiter),
            &headers,
            &export::export_rows(lots),
        )?;
    }
    Ok(())
}

fn handle_load(args: &LoadArgs) -> Result<()> {
    info!("Loading '{}'", args.input.display());
    let mut session = ImportSession::new();
    let lots = import_lots(
        &args.input,
        args.merge.as_ref(),
        args.delimiter,
        args.input_encoding.as_deref(),
        &mut session,
    )?;
    let stages = lots
        .iter()
        .map(|lot| lot.stage.as_str())
        .unique()
        .sorted()
        .join(", ");
    info!("Loaded {} lot(s) across stage(s): {}", lots.len(), stages);
    emit_lots(
        &lots,
        &session,
        args.output.as_ref(),
        args.delimiter,
        args.table,
        args.json,
    )
}

fn handle_adjust(args: &AdjustArgs) -> Result<()> {
    ensure!(
        args.amount >= Decimal::ZERO,
        "Adjustment amount must be non-negative, got {}",
        args.amount
    );
    let mut session = ImportSession::new();
    let mut lots = import_lots(
        &args.input,
        args.merge.as_ref(),
        args.delimiter,
        args.input_encoding.as_deref(),
        &mut session,
    )?;

    let filter = LotFilter {
        stage: args.stage.clone(),
        block: args.block.clone(),
    };
    let indices = select_indices(&lots, &filter, &args.units);
    let field = args.field.into();
    let previews = adjust::preview_adjustment(
        &lots,
        &indices,
        field,
        args.operation.into(),
        args.mode.into(),
        args.amount,
    );
    info!(
        "Previewed {} adjustment(s) on {}",
        previews.len(),
        field.canonical().name()
    );

    if args.apply {
        adjust::apply_adjustment(&mut lots, field, &previews);
        info!("Applied {} adjustment(s)", previews.len());
        return emit_lots(
            &lots,
            &session,
            args.output.as_ref(),
            args.delimiter,
            args.table,
            args.json,
        );
    }

    if args.json {
        println!("{}", serde_json::to_string_pretty(&previews)?);
        return Ok(());
    }
    let headers: Vec<String> = ["UNIDADE", "VALOR ATUAL", "AJUSTE", "NOVO VALOR"]
        .iter()
        .map(|s| s.to_string())
        .collect();
    let rows: Vec<Vec<String>> = previews
        .iter()
        .map(|preview| {
            vec![
                preview.unit.clone(),
                format_currency(preview.current),
                format_currency(preview.delta),
                format_currency(preview.new_value),
            ]
        })
        .collect();
    if args.output.is_some() {
        io_utils::write_table(
            args.output.as_deref(),
            io_utils::resolve_delimiter(args.delimiter),
            &headers,
            &rows,
        )?;
    } else {
        table::print_table(&headers, &rows);
    }
    Ok(())
}

fn handle_schedule(args: &ScheduleArgs) -> Result<()> {
    let mut session = ImportSession::new();
    let lots = import_lots(
        &args.input,
        args.merge.as_ref(),
        args.delimiter,
        args.input_encoding.as_deref(),
        &mut session,
    )?;

    let filter = LotFilter {
        stage: args.stage.clone(),
        block: args.block.clone(),
    };
    let indices = select_indices(&lots, &filter, &args.units);
    let selected: Vec<LotRecord> = indices.iter().map(|&idx| lots[idx].clone()).collect();

    let result = schedule::compute_schedule(&selected, args.years, args.rate)
        .context("Computing installment schedule")?;

    let total_cash: Decimal = result.iter().map(|lot| lot.cash_price).sum();
    let mean_first_year = if result.is_empty() {
        Decimal::ZERO
    } else {
        let first_year: Decimal = result
            .iter()
            .filter_map(|lot| lot.installments.first().copied())
            .sum();
        (first_year / Decimal::from(result.len() as u64)).round_dp(2)
    };
    info!(
        "Computed schedule for {} lot(s) over {} year(s) at {}%: total {}, mean first-year installment {}",
        result.len(),
        args.years,
        args.rate,
        format_currency(total_cash),
        format_currency(mean_first_year)
    );

    let output = match (&args.output, &args.output_dir) {
        (Some(path), _) => Some(path.clone()),
        (None, Some(dir)) => Some(dir.join(export::default_file_name(args.years, args.rate))),
        (None, None) => None,
    };
    if let Some(path) = &output {
        info!("Writing schedule to '{}'", path.display());
    }
    emit_lots(
        &result,
        &session,
        output.as_ref(),
        args.delimiter,
        args.table,
        args.json,
    )
}
