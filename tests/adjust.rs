mod common;

use std::str::FromStr;

use encoding_rs::UTF_8;
use rust_decimal::Decimal;

use common::{TestWorkspace, sample_lot_sheet};
use precifica::adjust::{AdjustField, AdjustMode, Direction, apply_adjustment, preview_adjustment};
use precifica::columns::ImportSession;
use precifica::io_utils::read_raw_table;
use precifica::loader::load;
use precifica::lot::{LotFilter, LotRecord, select_indices};

fn dec(text: &str) -> Decimal {
    Decimal::from_str(text).unwrap()
}

fn loaded_lots(workspace: &TestWorkspace) -> Vec<LotRecord> {
    let raw = read_raw_table(&sample_lot_sheet(workspace), b';', UTF_8).expect("read sheet");
    let mut session = ImportSession::new();
    load(&raw, &mut session).expect("load sheet")
}

#[test]
fn empty_selection_adjusts_the_whole_filtered_view() {
    let workspace = TestWorkspace::new();
    let lots = loaded_lots(&workspace);

    // Stage 1 holds units 01 and 02; no explicit selection means both.
    let filter = LotFilter {
        stage: Some("1".to_string()),
        block: None,
    };
    let indices = select_indices(&lots, &filter, &[]);
    let previews = preview_adjustment(
        &lots,
        &indices,
        AdjustField::CashPrice,
        Direction::Increase,
        AdjustMode::Percent,
        dec("10"),
    );

    assert_eq!(previews.len(), 2);
    assert_eq!(previews[0].delta, dec("10000.00"));
    assert_eq!(previews[0].new_value, dec("110000.00"));
    assert_eq!(previews[1].delta, dec("8000.00"));
}

#[test]
fn explicit_selection_narrows_the_operation() {
    let workspace = TestWorkspace::new();
    let lots = loaded_lots(&workspace);

    let units = vec!["03".to_string()];
    let indices = select_indices(&lots, &LotFilter::default(), &units);
    let previews = preview_adjustment(
        &lots,
        &indices,
        AdjustField::DownPayment,
        Direction::Decrease,
        AdjustMode::Absolute,
        dec("2000.00"),
    );

    assert_eq!(previews.len(), 1);
    assert_eq!(previews[0].unit, "03");
    assert_eq!(previews[0].delta, dec("-2000.00"));
    assert_eq!(previews[0].new_value, dec("10000.00"));
}

#[test]
fn applying_writes_exactly_the_previewed_values() {
    let workspace = TestWorkspace::new();
    let mut lots = loaded_lots(&workspace);

    let indices = select_indices(&lots, &LotFilter::default(), &[]);
    let previews = preview_adjustment(
        &lots,
        &indices,
        AdjustField::CashPrice,
        Direction::Increase,
        AdjustMode::Percent,
        dec("10"),
    );
    apply_adjustment(&mut lots, AdjustField::CashPrice, &previews);

    for (lot, preview) in lots.iter().zip(&previews) {
        assert_eq!(lot.cash_price, preview.new_value);
    }
    // Down payments were not the target and stay put.
    assert_eq!(lots[0].down_payment, dec("10000.00"));
}
