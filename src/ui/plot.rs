use std::ops::RangeInclusive;

use chrono::{Datelike, NaiveDate};
use eframe::egui::{RichText, Ui};
use egui_plot::{Bar, BarChart, GridMark, HLine, Legend, Line, LineStyle, Plot, PlotPoints, Points, VLine};

use crate::color::{ACCENT, MEAN_RATIO, MEAN_SALES};
use crate::data::aggregate::ProfitRatioOutcome;
use crate::state::AppState;

const CHART_HEIGHT: f32 = 320.0;
const EMPTY_SELECTION: &str = "No rows match the current filters.";

fn chart_title(ui: &mut Ui, title: &str) {
    ui.label(RichText::new(title).strong().size(18.0));
}

// ---------------------------------------------------------------------------
// Bar chart: sales per sub-category
// ---------------------------------------------------------------------------

pub fn sales_per_sub_category(ui: &mut Ui, state: &AppState) {
    chart_title(ui, "Sales per Sub-Category");
    let rows = &state.summary.sales_per_sub_category;
    if rows.is_empty() {
        ui.label(EMPTY_SELECTION);
        return;
    }

    let bars: Vec<Bar> = rows
        .iter()
        .enumerate()
        .map(|(i, r)| {
            Bar::new(i as f64, r.sales)
                .name(&r.sub_category)
                .fill(ACCENT)
                .width(0.7)
        })
        .collect();
    let names: Vec<String> = rows.iter().map(|r| r.sub_category.clone()).collect();

    Plot::new("sales_per_sub_category")
        .height(CHART_HEIGHT)
        .x_axis_label("Sub-Category")
        .y_axis_label("Sales")
        .x_axis_formatter(move |mark: GridMark, _range: &RangeInclusive<f64>| {
            category_label(&names, mark.value)
        })
        .allow_drag(false)
        .allow_scroll(false)
        .show(ui, |plot_ui| {
            plot_ui.bar_chart(BarChart::new(bars).color(ACCENT).name("Sales"));
        });
}

/// Axis label for integer positions that index into `names`.
fn category_label(names: &[String], value: f64) -> String {
    if value.fract() != 0.0 || value < 0.0 {
        return String::new();
    }
    names.get(value as usize).cloned().unwrap_or_default()
}

// ---------------------------------------------------------------------------
// Line chart: sales per month
// ---------------------------------------------------------------------------

pub fn sales_per_month(ui: &mut Ui, state: &AppState) {
    chart_title(ui, "Sales per Month");
    let months = &state.summary.sales_per_month;
    if months.is_empty() {
        ui.label(EMPTY_SELECTION);
        return;
    }

    let points: PlotPoints = months
        .iter()
        .map(|m| [month_index(m.month), m.sales])
        .collect();

    Plot::new("sales_per_month")
        .height(CHART_HEIGHT)
        .x_axis_label("Order Date")
        .y_axis_label("Sales")
        .x_axis_formatter(|mark: GridMark, _range: &RangeInclusive<f64>| month_label(mark.value))
        .allow_boxed_zoom(true)
        .show(ui, |plot_ui| {
            plot_ui.line(Line::new(points).name("Sales").color(ACCENT).width(2.0));
        });
}

/// Months since year 0, so consecutive months are one unit apart.
fn month_index(month: NaiveDate) -> f64 {
    (month.year() as f64) * 12.0 + month.month0() as f64
}

fn month_label(value: f64) -> String {
    if value.fract() != 0.0 {
        return String::new();
    }
    let index = value as i64;
    let year = index.div_euclid(12) as i32;
    let month = index.rem_euclid(12) as u32 + 1;
    NaiveDate::from_ymd_opt(year, month, 1)
        .map(|d| d.format("%b %Y").to_string())
        .unwrap_or_default()
}

// ---------------------------------------------------------------------------
// Scatter: sales vs profit ratio
// ---------------------------------------------------------------------------

pub fn profit_ratio_scatter(ui: &mut Ui, state: &AppState) {
    chart_title(ui, "Sales vs Profit Ratio by Sub-Category");

    let (points, mean_sales, mean_profit_ratio) = match &state.summary.profit_ratio {
        ProfitRatioOutcome::NoNonZeroProfit => {
            ui.label("No sub-category with non-zero profit to show in the scatter plot.");
            return;
        }
        ProfitRatioOutcome::NoPositiveRatio => {
            ui.label("No sub-category with a profit ratio above 0 to show in the scatter plot.");
            return;
        }
        ProfitRatioOutcome::Ready {
            points,
            mean_sales,
            mean_profit_ratio,
        } => (points, *mean_sales, *mean_profit_ratio),
    };

    let max_ratio = points
        .iter()
        .map(|p| p.profit_ratio)
        .fold(f64::MIN_POSITIVE, f64::max);

    Plot::new("profit_ratio_scatter")
        .height(CHART_HEIGHT * 1.5)
        .legend(Legend::default())
        .x_axis_label("Sales")
        .y_axis_label("Profit Ratio")
        .allow_boxed_zoom(true)
        .show(ui, |plot_ui| {
            for p in points {
                // Marker size grows with the ratio.
                let radius = 3.0 + 12.0 * (p.profit_ratio / max_ratio).sqrt() as f32;
                plot_ui.points(
                    Points::new(vec![[p.sales, p.profit_ratio]])
                        .name(&p.sub_category)
                        .color(state.color_map.color_for(&p.sub_category))
                        .radius(radius)
                        .filled(true),
                );
            }
            plot_ui.vline(
                VLine::new(mean_sales)
                    .name("Avg Sales")
                    .color(MEAN_SALES)
                    .style(LineStyle::dashed_loose()),
            );
            plot_ui.hline(
                HLine::new(mean_profit_ratio)
                    .name("Avg Profit Ratio")
                    .color(MEAN_RATIO)
                    .style(LineStyle::dashed_loose()),
            );
        });
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_month_index_round_trips_through_label() {
        let d = NaiveDate::from_ymd_opt(2016, 11, 1).unwrap();
        assert_eq!(month_label(month_index(d)), "Nov 2016");
        let jan = NaiveDate::from_ymd_opt(2017, 1, 1).unwrap();
        assert_eq!(month_index(jan) - month_index(d), 2.0);
        assert_eq!(month_label(24203.5), "");
    }

    #[test]
    fn test_category_label() {
        let names = vec!["Phones".to_string(), "Chairs".to_string()];
        assert_eq!(category_label(&names, 1.0), "Chairs");
        assert_eq!(category_label(&names, 0.5), "");
        assert_eq!(category_label(&names, 2.0), "");
        assert_eq!(category_label(&names, -1.0), "");
    }
}
