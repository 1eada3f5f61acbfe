//! Year-by-year monthly installment computation.
//!
//! The first year's monthly amount is the remaining principal split flat
//! over the whole term in months; every following year compounds the
//! previous year's monthly amount by the annual rate. Each year's amount is
//! rounded to two decimals before feeding the next year; the accumulated
//! rounding is a reproducible property of the schedule, not an error to
//! correct.

use rust_decimal::Decimal;

use crate::{error::CoreError, lot::LotRecord};

/// Upper bound on the schedule term offered to operators.
pub const MAX_TERM_YEARS: u32 = 40;

/// Header of the installment column for a given year (1-based).
pub fn installment_column(year: usize) -> String {
    format!("MENSAL ANO {year:02}")
}

/// Computes the installment schedule for every lot.
///
/// Returns a new table; the input is untouched. Fails with
/// [`CoreError::InvalidTerm`] when the term in months is not positive.
pub fn compute_schedule(
    lots: &[LotRecord],
    term_years: u32,
    annual_rate_percent: Decimal,
) -> Result<Vec<LotRecord>, CoreError> {
    let months = i64::from(term_years) * 12;
    if months <= 0 {
        return Err(CoreError::InvalidTerm { months });
    }
    let growth = Decimal::ONE + annual_rate_percent / Decimal::from(100);

    Ok(lots
        .iter()
        .map(|lot| {
            let principal = lot.cash_price - lot.down_payment;
            let mut installments = Vec::with_capacity(term_years as usize);
            let mut monthly = (principal / Decimal::from(months)).round_dp(2);
            installments.push(monthly);
            for _ in 2..=term_years {
                monthly = (monthly * growth).round_dp(2);
                installments.push(monthly);
            }
            LotRecord {
                installments,
                ..lot.clone()
            }
        })
        .collect())
}
