//! Export-boundary rendering of the canonical table.
//!
//! Inside the table every monetary value is a normalized decimal; only here
//! are they rendered as locale strings. Headers are restored to the text the
//! operator's spreadsheet used, falling back to the canonical names for
//! columns that were defaulted in.

use anyhow::{Context, Result};
use rust_decimal::Decimal;
use serde_json::Value;

use crate::{
    columns::{CanonicalField, ImportSession},
    currency::format_currency,
    lot::LotRecord,
    schedule::installment_column,
};

/// Output header row: the five canonical columns (original text where the
/// import resolved one) followed by one installment column per computed year.
pub fn export_headers(lots: &[LotRecord], session: &ImportSession) -> Vec<String> {
    let mut headers: Vec<String> = CanonicalField::ALL
        .iter()
        .map(|&field| {
            session
                .original_header(field)
                .unwrap_or(field.name())
                .to_string()
        })
        .collect();
    let years = lots.first().map(|lot| lot.installments.len()).unwrap_or(0);
    headers.extend((1..=years).map(installment_column));
    headers
}

/// Data rows with monetary columns rendered via the currency codec.
pub fn export_rows(lots: &[LotRecord]) -> Vec<Vec<String>> {
    lots.iter()
        .map(|lot| {
            let mut row = vec![
                lot.stage.clone(),
                lot.block.clone(),
                lot.unit.clone(),
                format_currency(lot.cash_price),
                format_currency(lot.down_payment),
            ];
            row.extend(lot.installments.iter().copied().map(format_currency));
            row
        })
        .collect()
}

/// The canonical records as a JSON array, installment columns included.
/// Mirrors the record payloads the table is exchanged as.
pub fn to_json_records(lots: &[LotRecord]) -> Result<Value> {
    let records = lots
        .iter()
        .map(|lot| {
            let mut value = serde_json::to_value(lot).context("Serializing lot record")?;
            if let Some(object) = value.as_object_mut() {
                for (index, amount) in lot.installments.iter().enumerate() {
                    object.insert(
                        installment_column(index + 1),
                        serde_json::to_value(amount).context("Serializing installment")?,
                    );
                }
            }
            Ok(value)
        })
        .collect::<Result<Vec<_>>>()?;
    Ok(Value::Array(records))
}

/// Export file name encoding the simulation parameters, e.g.
/// `precificacao_calculada_16anos_9.5juros.csv`.
pub fn default_file_name(term_years: u32, annual_rate_percent: Decimal) -> String {
    format!("precificacao_calculada_{term_years}anos_{annual_rate_percent}juros.csv")
}
