//! Price adjustment previews and their confirmed application.
//!
//! Adjustments are a two-step gesture: [`preview_adjustment`] computes what
//! would change without touching the table, and [`apply_adjustment`] writes
//! the previewed values back verbatim. Apply never recomputes, so what the
//! operator confirmed is exactly what lands in the table.

use rust_decimal::Decimal;
use serde::Serialize;

use crate::{columns::CanonicalField, lot::LotRecord};

/// The monetary field an adjustment targets.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AdjustField {
    CashPrice,
    DownPayment,
}

impl AdjustField {
    pub fn canonical(self) -> CanonicalField {
        match self {
            AdjustField::CashPrice => CanonicalField::CashPrice,
            AdjustField::DownPayment => CanonicalField::DownPayment,
        }
    }

    fn get(self, lot: &LotRecord) -> Decimal {
        match self {
            AdjustField::CashPrice => lot.cash_price,
            AdjustField::DownPayment => lot.down_payment,
        }
    }

    fn set(self, lot: &mut LotRecord, value: Decimal) {
        match self {
            AdjustField::CashPrice => lot.cash_price = value,
            AdjustField::DownPayment => lot.down_payment = value,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Direction {
    Increase,
    Decrease,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AdjustMode {
    /// Magnitude is a percentage of each lot's current value; the delta is
    /// rounded to two decimals before the sign is applied.
    Percent,
    /// Magnitude is a fixed amount applied identically to every selected
    /// lot, used as given.
    Absolute,
}

/// One previewed row: current value, computed delta, resulting value.
/// Transient; discarded after being applied or abandoned.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct AdjustmentPreview {
    #[serde(skip)]
    pub row: usize,
    #[serde(rename = "UNIDADE")]
    pub unit: String,
    #[serde(rename = "VALOR_ATUAL")]
    pub current: Decimal,
    #[serde(rename = "AJUSTE")]
    pub delta: Decimal,
    #[serde(rename = "NOVO_VALOR")]
    pub new_value: Decimal,
}

/// Computes the adjustment preview for the selected rows. Pure: no stored
/// table is mutated.
pub fn preview_adjustment(
    lots: &[LotRecord],
    indices: &[usize],
    field: AdjustField,
    direction: Direction,
    mode: AdjustMode,
    magnitude: Decimal,
) -> Vec<AdjustmentPreview> {
    let sign = match direction {
        Direction::Increase => Decimal::ONE,
        Direction::Decrease => -Decimal::ONE,
    };
    indices
        .iter()
        .filter_map(|&row| lots.get(row).map(|lot| (row, lot)))
        .map(|(row, lot)| {
            let current = field.get(lot);
            let delta = match mode {
                AdjustMode::Percent => {
                    (current * magnitude / Decimal::from(100)).round_dp(2) * sign
                }
                AdjustMode::Absolute => magnitude * sign,
            };
            AdjustmentPreview {
                row,
                unit: lot.unit.clone(),
                current,
                delta,
                new_value: current + delta,
            }
        })
        .collect()
}

/// Overwrites the target field for exactly the previewed rows, taking each
/// preview's resulting value verbatim.
pub fn apply_adjustment(lots: &mut [LotRecord], field: AdjustField, previews: &[AdjustmentPreview]) {
    for preview in previews {
        if let Some(lot) = lots.get_mut(preview.row) {
            field.set(lot, preview.new_value);
        }
    }
}
