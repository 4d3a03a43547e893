use crate::color::ColorMap;
use crate::data::aggregate::{summarize, DashboardSummary};
use crate::data::filter::apply;
use crate::data::loader::DataSource;
use crate::data::model::SalesDataset;
use crate::data::selector::{Dimension, FilterOptions, Selection};

// ---------------------------------------------------------------------------
// Application state
// ---------------------------------------------------------------------------

/// The full UI state, independent of rendering.
pub struct AppState {
    /// Where the current dataset came from.
    pub source: Option<DataSource>,

    /// Loaded dataset.
    pub dataset: SalesDataset,

    /// Distinct values offered by the sidebar.
    pub options: FilterOptions,

    /// Per-dimension selections.
    pub selection: Selection,

    /// Indices of rows passing the current selection.
    pub visible_indices: Vec<usize>,

    /// Aggregates of the visible rows.
    pub summary: DashboardSummary,

    /// Scatter colours per sub-category of the whole dataset.
    pub color_map: ColorMap,

    /// Whether the credit lines are expanded.
    pub show_credit: bool,

    /// Status / error message shown in the UI.
    pub status_message: Option<String>,
}

impl Default for AppState {
    fn default() -> Self {
        Self::new(SalesDataset::default(), None)
    }
}

impl AppState {
    pub fn new(dataset: SalesDataset, source: Option<DataSource>) -> Self {
        let options = FilterOptions::from_dataset(&dataset);
        let selection = Selection::all(&options);
        let view = apply(&dataset, &selection);
        let summary = summarize(&view);
        let visible_indices = view.into_indices();
        let color_map = ColorMap::new(dataset.distinct_by(|r| r.sub_category.as_str()));

        Self {
            source,
            dataset,
            options,
            selection,
            visible_indices,
            summary,
            color_map,
            show_credit: false,
            status_message: None,
        }
    }

    /// Replace the dataset and reset every filter to "select all".
    pub fn set_dataset(&mut self, dataset: SalesDataset, source: DataSource) {
        let show_credit = self.show_credit;
        *self = Self::new(dataset, Some(source));
        self.show_credit = show_credit;
    }

    /// Recompute the view and every aggregate after a selection change.
    pub fn refilter(&mut self) {
        let view = apply(&self.dataset, &self.selection);
        if view.is_empty() {
            log::debug!("Selection changed: no rows match");
        } else {
            log::debug!(
                "Selection changed: {} of {} rows visible",
                view.len(),
                self.dataset.len()
            );
        }
        self.summary = summarize(&view);
        self.visible_indices = view.into_indices();
    }

    /// Toggle a single value in a dimension's selection.
    pub fn toggle_filter_value(&mut self, dimension: Dimension, value: &str) {
        self.selection.toggle(dimension, value);
        self.refilter();
    }

    /// Select all values in a dimension.
    pub fn select_all(&mut self, dimension: Dimension) {
        self.selection.select_all(dimension, &self.options);
        self.refilter();
    }

    /// Deselect all values in a dimension.
    pub fn select_none(&mut self, dimension: Dimension) {
        self.selection.select_none(dimension);
        self.refilter();
    }
}

#[cfg(test)]
mod tests {
    use std::path::PathBuf;

    use chrono::NaiveDate;

    use super::*;
    use crate::data::aggregate::ProfitRatioOutcome;
    use crate::data::model::SalesRecord;

    fn dataset() -> SalesDataset {
        let d = |y| NaiveDate::from_ymd_opt(y, 1, 10).unwrap();
        SalesDataset::new(
            vec![
                SalesRecord::new("Furniture", "Consumer", "Chairs", d(2016), 100.0, 20.0, 2.0),
                SalesRecord::new("Technology", "Corporate", "Phones", d(2017), 300.0, -30.0, 4.0),
            ],
            Vec::new(),
        )
    }

    #[test]
    fn test_initial_state_shows_everything() {
        let state = AppState::new(dataset(), None);
        assert_eq!(state.visible_indices, vec![0, 1]);
        assert_eq!(state.summary.kpis.total_sales, 400);
        assert_ne!(state.color_map.color_for("Chairs"), state.color_map.color_for("Phones"));
    }

    #[test]
    fn test_filter_changes_recompute_summary() {
        let mut state = AppState::new(dataset(), None);

        state.toggle_filter_value(Dimension::Category, "Furniture");
        assert_eq!(state.visible_indices, vec![1]);
        assert_eq!(state.summary.kpis.total_sales, 300);
        assert_eq!(state.summary.profit_ratio, ProfitRatioOutcome::NoPositiveRatio);

        state.select_none(Dimension::Year);
        assert!(state.visible_indices.is_empty());
        assert_eq!(state.summary.kpis.average_sales, None);

        state.select_all(Dimension::Year);
        state.select_all(Dimension::Category);
        assert_eq!(state.visible_indices.len(), 2);
    }

    #[test]
    fn test_set_dataset_resets_selection() {
        let mut state = AppState::default();
        assert!(state.visible_indices.is_empty());
        state.show_credit = true;

        state.set_dataset(dataset(), DataSource::Path(PathBuf::from("sales.csv")));
        assert_eq!(state.visible_indices.len(), 2);
        assert_eq!(state.selection.count(Dimension::Segment), 2);
        assert!(state.show_credit);
        assert!(state.source.is_some());
    }
}
