//! The canonical lot table row and view helpers.

use rust_decimal::Decimal;
use serde::Serialize;

/// Sentinel stage assigned when the imported sheet has no stage column.
pub const DEFAULT_STAGE: &str = "Padrão";

/// One row of the canonical lot table.
///
/// Monetary fields are always normalized decimals; locale-formatted strings
/// exist only at the parse and export boundaries. `installments` holds the
/// per-year monthly amounts (year 1 first) and is empty until a schedule is
/// computed.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct LotRecord {
    #[serde(rename = "ETAPA")]
    pub stage: String,
    #[serde(rename = "BLOCO")]
    pub block: String,
    #[serde(rename = "UNIDADE")]
    pub unit: String,
    #[serde(rename = "VALOR_A_VISTA")]
    pub cash_price: Decimal,
    #[serde(rename = "ENTRADA")]
    pub down_payment: Decimal,
    #[serde(skip)]
    pub installments: Vec<Decimal>,
}

/// Equality filters narrowing the table to the operator's current view.
#[derive(Debug, Clone, Default)]
pub struct LotFilter {
    pub stage: Option<String>,
    pub block: Option<String>,
}

impl LotFilter {
    pub fn matches(&self, lot: &LotRecord) -> bool {
        self.stage.as_ref().is_none_or(|stage| &lot.stage == stage)
            && self.block.as_ref().is_none_or(|block| &lot.block == block)
    }
}

/// Indices of the lots an operation targets.
///
/// An explicit non-empty unit selection restricts the operation to those
/// rows; an empty selection means every lot in the filtered view. The empty
/// case is deliberately "all", not "none".
pub fn select_indices(lots: &[LotRecord], filter: &LotFilter, units: &[String]) -> Vec<usize> {
    lots.iter()
        .enumerate()
        .filter(|(_, lot)| filter.matches(lot))
        .filter(|(_, lot)| units.is_empty() || units.iter().any(|unit| unit == &lot.unit))
        .map(|(index, _)| index)
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::str::FromStr;

    fn lot(stage: &str, block: &str, unit: &str) -> LotRecord {
        LotRecord {
            stage: stage.to_string(),
            block: block.to_string(),
            unit: unit.to_string(),
            cash_price: Decimal::from_str("100000").unwrap(),
            down_payment: Decimal::ZERO,
            installments: Vec::new(),
        }
    }

    #[test]
    fn empty_selection_means_whole_filtered_view() {
        let lots = vec![lot("1", "A", "01"), lot("1", "B", "02"), lot("2", "A", "03")];
        let filter = LotFilter {
            stage: Some("1".to_string()),
            block: None,
        };
        assert_eq!(select_indices(&lots, &filter, &[]), vec![0, 1]);
    }

    #[test]
    fn explicit_selection_restricts_to_named_units() {
        let lots = vec![lot("1", "A", "01"), lot("1", "A", "02")];
        let units = vec!["02".to_string()];
        assert_eq!(select_indices(&lots, &LotFilter::default(), &units), vec![1]);
    }

    #[test]
    fn selection_ignores_units_outside_the_filtered_view() {
        let lots = vec![lot("1", "A", "01"), lot("2", "B", "02")];
        let filter = LotFilter {
            stage: None,
            block: Some("A".to_string()),
        };
        let units = vec!["02".to_string()];
        assert!(select_indices(&lots, &filter, &units).is_empty());
    }
}
