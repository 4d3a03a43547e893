use eframe::egui::{Align, Layout, Ui};
use egui_extras::{Column, TableBuilder};

use crate::data::model::SalesRecord;
use crate::state::AppState;

const ROW_HEIGHT: f32 = 18.0;
const FIXED_COLUMNS: [&str; 8] = [
    "order_date",
    "order_year",
    "category",
    "segment",
    "sub_category",
    "sales",
    "profit",
    "quantity",
];

/// Undefined measures render as empty cells.
fn number_cell(v: f64) -> String {
    if v.is_nan() {
        String::new()
    } else {
        v.to_string()
    }
}

fn fixed_cell(record: &SalesRecord, col: usize) -> String {
    match col {
        0 => record.order_date.to_string(),
        1 => record.order_year.to_string(),
        2 => record.category.clone(),
        3 => record.segment.clone(),
        4 => record.sub_category.clone(),
        5 => number_cell(record.sales),
        6 => number_cell(record.profit),
        _ => number_cell(record.quantity),
    }
}

/// Scrollable table of the rows passing the filters.
pub fn data_table(ui: &mut Ui, state: &AppState) {
    let extra_columns = &state.dataset.extra_columns;
    let n_columns = FIXED_COLUMNS.len() + extra_columns.len();

    ui.push_id("data_table", |ui: &mut Ui| {
        TableBuilder::new(ui)
            .striped(true)
            .resizable(true)
            .vscroll(true)
            .max_scroll_height(300.0)
            .cell_layout(Layout::left_to_right(Align::Center))
            .columns(Column::auto().at_least(60.0).clip(true), n_columns)
            .header(ROW_HEIGHT + 4.0, |mut header| {
                for name in FIXED_COLUMNS.iter().copied().chain(extra_columns.iter().map(String::as_str)) {
                    header.col(|ui| {
                        ui.strong(name);
                    });
                }
            })
            .body(|body| {
                body.rows(ROW_HEIGHT, state.visible_indices.len(), |mut row| {
                    let record = &state.dataset.records[state.visible_indices[row.index()]];
                    for col in 0..FIXED_COLUMNS.len() {
                        row.col(|ui| {
                            ui.label(fixed_cell(record, col));
                        });
                    }
                    for idx in 0..extra_columns.len() {
                        row.col(|ui| {
                            ui.label(record.extra(idx));
                        });
                    }
                });
            });
    });
}

#[cfg(test)]
mod tests {
    use chrono::NaiveDate;

    use super::*;

    #[test]
    fn test_fixed_cells() {
        let d = NaiveDate::from_ymd_opt(2016, 11, 8).unwrap();
        let r = SalesRecord::new("Furniture", "Consumer", "Chairs", d, 731.94, f64::NAN, 3.0);
        assert_eq!(fixed_cell(&r, 0), "2016-11-08");
        assert_eq!(fixed_cell(&r, 1), "2016");
        assert_eq!(fixed_cell(&r, 4), "Chairs");
        assert_eq!(fixed_cell(&r, 5), "731.94");
        assert_eq!(fixed_cell(&r, 6), "");
        assert_eq!(fixed_cell(&r, 7), "3");
    }
}
