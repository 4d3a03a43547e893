use eframe::egui::{self, Color32, RichText, ScrollArea, Ui};

use crate::data::aggregate::{format_amount, format_thousands, quantity_icon_count};
use crate::data::loader::DataSource;
use crate::data::selector::Dimension;
use crate::state::AppState;

// ---------------------------------------------------------------------------
// Left side panel – filter widgets
// ---------------------------------------------------------------------------

/// Render the left filter panel.
pub fn side_panel(ui: &mut Ui, state: &mut AppState) {
    ui.heading("Please Filter Here:");
    ui.separator();

    if state.dataset.is_empty() {
        ui.label("No rows loaded.");
        return;
    }

    ScrollArea::vertical()
        .auto_shrink([false, false])
        .show(ui, |ui: &mut Ui| {
            for dim in Dimension::ALL {
                let all_values = state.options.available(dim);

                // Show count of selected / total in the header
                let header_text = format!(
                    "Select the {dim}:  ({}/{})",
                    state.selection.count(dim),
                    all_values.len()
                );

                egui::CollapsingHeader::new(RichText::new(header_text).strong())
                    .id_salt(dim.label())
                    .default_open(true)
                    .show(ui, |ui: &mut Ui| {
                        ui.horizontal(|ui: &mut Ui| {
                            if ui.small_button("All").clicked() {
                                state.select_all(dim);
                            }
                            if ui.small_button("None").clicked() {
                                state.select_none(dim);
                            }
                        });

                        for val in &all_values {
                            let mut checked = state.selection.is_selected(dim, val);
                            if ui.checkbox(&mut checked, val.as_str()).changed() {
                                state.toggle_filter_value(dim, val);
                            }
                        }
                    });
            }
        });
}

// ---------------------------------------------------------------------------
// Top bar
// ---------------------------------------------------------------------------

/// Render the top menu / toolbar.
pub fn top_bar(ui: &mut Ui, state: &mut AppState) {
    egui::menu::bar(ui, |ui: &mut Ui| {
        ui.menu_button("File", |ui: &mut Ui| {
            if ui.button("Open…").clicked() {
                open_file_dialog(state);
                ui.close_menu();
            }
        });

        ui.separator();

        ui.label(format!(
            "{} rows loaded, {} visible",
            state.dataset.len(),
            state.visible_indices.len()
        ));

        ui.separator();

        if ui
            .selectable_label(state.show_credit, "Click Here for Credit")
            .clicked()
        {
            state.show_credit = !state.show_credit;
        }

        if let Some(msg) = &state.status_message {
            ui.label(RichText::new(msg).color(Color32::RED));
        }
    });
}

/// Author and data source lines, shown when toggled from the top bar.
pub fn credit(ui: &mut Ui, state: &AppState) {
    if !state.show_credit {
        return;
    }
    ui.label("Created by husnafanyn");
    let source = state
        .source
        .as_ref()
        .map(ToString::to_string)
        .unwrap_or_else(|| "Superstore Dataset".to_string());
    ui.label(format!("Data Source: {source}"));
}

// ---------------------------------------------------------------------------
// KPI cards
// ---------------------------------------------------------------------------

/// Text shown for a mean that is undefined because nothing is selected.
const UNDEFINED: &str = "-";

/// Render the three KPI cards side by side.
pub fn kpi_row(ui: &mut Ui, state: &AppState) {
    let kpis = &state.summary.kpis;

    let quantity = match kpis.average_quantity {
        Some(q) => format!(
            "{} {q:.1}",
            "📦".repeat(quantity_icon_count(kpis.average_quantity))
        ),
        None => UNDEFINED.to_string(),
    };
    let sales = kpis
        .average_sales
        .map(|s| format!("US$ {}", format_amount(s)))
        .unwrap_or_else(|| UNDEFINED.to_string());

    ui.columns(3, |cols| {
        kpi_card(&mut cols[0], "Total Sales:", &format!("US$ {}", format_thousands(kpis.total_sales)));
        kpi_card(&mut cols[1], "Average Quantity Sold:", &quantity);
        kpi_card(&mut cols[2], "Average Sales:", &sales);
    });
}

fn kpi_card(ui: &mut Ui, title: &str, value: &str) {
    egui::Frame::group(ui.style()).show(ui, |ui: &mut Ui| {
        ui.set_width(ui.available_width());
        ui.label(RichText::new(title).strong().size(16.0));
        ui.label(RichText::new(value).size(20.0));
    });
}

// ---------------------------------------------------------------------------
// File dialog
// ---------------------------------------------------------------------------

pub fn open_file_dialog(state: &mut AppState) {
    let file = rfd::FileDialog::new()
        .set_title("Open sales data")
        .add_filter("Supported files", &["csv", "json", "parquet", "pq"])
        .add_filter("CSV", &["csv"])
        .add_filter("JSON", &["json"])
        .add_filter("Parquet", &["parquet", "pq"])
        .pick_file();

    if let Some(path) = file {
        match crate::data::loader::load_file(&path) {
            Ok(dataset) => {
                log::info!(
                    "Loaded {} rows from {} (extra columns: {:?})",
                    dataset.len(),
                    path.display(),
                    dataset.extra_columns
                );
                state.set_dataset(dataset, DataSource::Path(path));
            }
            Err(e) => {
                let e = anyhow::Error::new(e);
                log::error!("Failed to load file: {e:#}");
                state.status_message = Some(format!("Error: {e:#}"));
            }
        }
    }
}
