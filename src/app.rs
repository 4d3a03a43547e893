use eframe::egui;

use crate::data::loader::DataSource;
use crate::data::model::SalesDataset;
use crate::state::AppState;
use crate::ui::{panels, plot, table};

// ---------------------------------------------------------------------------
// eframe App implementation
// ---------------------------------------------------------------------------

pub struct SalesDashboardApp {
    pub state: AppState,
}

impl SalesDashboardApp {
    pub fn new(dataset: SalesDataset, source: DataSource) -> Self {
        Self {
            state: AppState::new(dataset, Some(source)),
        }
    }
}

impl eframe::App for SalesDashboardApp {
    fn update(&mut self, ctx: &egui::Context, _frame: &mut eframe::Frame) {
        // ---- Top panel: menu bar ----
        egui::TopBottomPanel::top("top_bar").show(ctx, |ui| {
            panels::top_bar(ui, &mut self.state);
        });

        // ---- Left side panel: filters ----
        egui::SidePanel::left("filter_panel")
            .default_width(220.0)
            .resizable(true)
            .show(ctx, |ui| {
                panels::side_panel(ui, &mut self.state);
            });

        // ---- Central panel: KPIs, table, charts ----
        egui::CentralPanel::default().show(ctx, |ui| {
            egui::ScrollArea::vertical()
                .auto_shrink([false, false])
                .show(ui, |ui| {
                    ui.heading("📊 Sales Dashboard");
                    panels::credit(ui, &self.state);
                    ui.add_space(8.0);

                    panels::kpi_row(ui, &self.state);
                    ui.separator();

                    table::data_table(ui, &self.state);
                    ui.add_space(12.0);

                    plot::sales_per_sub_category(ui, &self.state);
                    ui.add_space(12.0);
                    plot::sales_per_month(ui, &self.state);
                    ui.add_space(12.0);
                    plot::profit_ratio_scatter(ui, &self.state);
                });
        });
    }
}
