//! Canonical lot table construction from raw spreadsheets.
//!
//! The loader is the single validation boundary: it drops fully-blank rows,
//! resolves headers to canonical fields, enforces the required columns, fills
//! defaults, and coerces monetary cells through the currency codec. Either a
//! complete canonical table comes out or a [`CoreError`] does; there is no
//! partial result.

use std::collections::HashMap;

use rust_decimal::Decimal;

use crate::{
    columns::{CanonicalField, ColumnMatch, ImportSession, resolve_columns},
    currency::parse_currency,
    error::CoreError,
    io_utils::RawTable,
    lot::{DEFAULT_STAGE, LotRecord},
};

fn column_index(matches: &[ColumnMatch], field: CanonicalField) -> Option<usize> {
    matches.iter().find(|m| m.field == field).map(|m| m.index)
}

fn is_blank_row(row: &[String]) -> bool {
    row.iter().all(|cell| cell.trim().is_empty())
}

/// Loads a primary lot spreadsheet into the canonical table.
///
/// `BLOCO`, `UNIDADE`, and `VALOR_A_VISTA` must resolve from some alias;
/// `ETAPA` defaults to the sentinel stage and `ENTRADA` to zero when their
/// columns are absent. Unrecognized columns are ignored. The session is
/// reset first, so each primary import starts a fresh header registry.
pub fn load(raw: &RawTable, session: &mut ImportSession) -> Result<Vec<LotRecord>, CoreError> {
    session.reset();
    let matches = resolve_columns(&raw.headers, session, false);

    for field in CanonicalField::ALL {
        if field.is_required() && column_index(&matches, field).is_none() {
            return Err(CoreError::MissingColumn { field: field.name() });
        }
    }

    let required = |field| column_index(&matches, field).expect("required column checked above");
    let stage_idx = column_index(&matches, CanonicalField::Stage);
    let block_idx = required(CanonicalField::Block);
    let unit_idx = required(CanonicalField::Unit);
    let price_idx = required(CanonicalField::CashPrice);
    let entrada_idx = column_index(&matches, CanonicalField::DownPayment);

    let mut records = Vec::with_capacity(raw.rows.len());
    for row in &raw.rows {
        if is_blank_row(row) {
            continue;
        }
        let cell = |idx: usize| row.get(idx).map(String::as_str).unwrap_or("");
        let stage = match stage_idx {
            Some(idx) => cell(idx).to_string(),
            None => DEFAULT_STAGE.to_string(),
        };
        let down_payment = match entrada_idx {
            Some(idx) => parse_currency(cell(idx)),
            None => Decimal::ZERO,
        };
        records.push(LotRecord {
            stage,
            block: cell(block_idx).to_string(),
            unit: cell(unit_idx).to_string(),
            cash_price: parse_currency(cell(price_idx)),
            down_payment,
            installments: Vec::new(),
        });
    }
    Ok(records)
}

/// Combines a primary table with a secondary down-payment sheet.
///
/// The secondary sheet must resolve `UNIDADE` and `ENTRADA`. Any existing
/// down payments in the primary are discarded and replaced through a left
/// join on unit: primary rows are authoritative, unmatched primary rows get
/// zero, and secondary rows with no primary match are dropped. Only the
/// secondary's `UNIDADE`/`ENTRADA` headers are recorded into the session.
pub fn merge_down_payments(
    primary: &[LotRecord],
    secondary: &RawTable,
    session: &mut ImportSession,
) -> Result<Vec<LotRecord>, CoreError> {
    let matches = resolve_columns(&secondary.headers, session, true);
    let unit_idx = column_index(&matches, CanonicalField::Unit).ok_or(CoreError::MissingColumn {
        field: CanonicalField::Unit.name(),
    })?;
    let entrada_idx =
        column_index(&matches, CanonicalField::DownPayment).ok_or(CoreError::MissingColumn {
            field: CanonicalField::DownPayment.name(),
        })?;

    let mut by_unit: HashMap<&str, Decimal> = HashMap::new();
    for row in &secondary.rows {
        if is_blank_row(row) {
            continue;
        }
        let unit = row.get(unit_idx).map(String::as_str).unwrap_or("");
        let amount = parse_currency(row.get(entrada_idx).map(String::as_str).unwrap_or(""));
        // Units are assumed unique; on duplicates the first row wins.
        by_unit.entry(unit).or_insert(amount);
    }

    Ok(primary
        .iter()
        .map(|lot| {
            let mut merged = lot.clone();
            merged.down_payment = by_unit
                .get(lot.unit.as_str())
                .copied()
                .unwrap_or(Decimal::ZERO);
            merged
        })
        .collect())
}
