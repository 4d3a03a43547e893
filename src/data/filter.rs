use super::model::{SalesDataset, SalesRecord};
use super::selector::Selection;

// ---------------------------------------------------------------------------
// Filtered view
// ---------------------------------------------------------------------------

/// The rows of a dataset that pass the current selection, in dataset order.
#[derive(Debug, Clone)]
pub struct FilteredView<'a> {
    dataset: &'a SalesDataset,
    indices: Vec<usize>,
}

impl<'a> FilteredView<'a> {
    /// Wrap precomputed row indices.
    pub fn from_indices(dataset: &'a SalesDataset, indices: Vec<usize>) -> Self {
        FilteredView { dataset, indices }
    }

    pub fn len(&self) -> usize {
        self.indices.len()
    }

    pub fn is_empty(&self) -> bool {
        self.indices.is_empty()
    }

    pub fn indices(&self) -> &[usize] {
        &self.indices
    }

    pub fn into_indices(self) -> Vec<usize> {
        self.indices
    }

    /// Matching records, in dataset order.
    pub fn records(&self) -> impl Iterator<Item = &'a SalesRecord> + '_ {
        let records = &self.dataset.records;
        self.indices.iter().map(move |&i| &records[i])
    }
}

// ---------------------------------------------------------------------------
// Selection engine
// ---------------------------------------------------------------------------

/// Whether a record passes all three membership tests.
///
/// An empty set for any dimension rejects every record.
pub fn matches(record: &SalesRecord, selection: &Selection) -> bool {
    selection.categories.contains(&record.category)
        && selection.segments.contains(&record.segment)
        && selection.years.contains(&record.order_year)
}

/// Return indices of records that pass the selection.
pub fn filtered_indices(dataset: &SalesDataset, selection: &Selection) -> Vec<usize> {
    dataset
        .records
        .iter()
        .enumerate()
        .filter(|(_, r)| matches(r, selection))
        .map(|(i, _)| i)
        .collect()
}

/// Apply the selection to the dataset.
pub fn apply<'a>(dataset: &'a SalesDataset, selection: &Selection) -> FilteredView<'a> {
    FilteredView::from_indices(dataset, filtered_indices(dataset, selection))
}

#[cfg(test)]
mod tests {
    use chrono::NaiveDate;

    use super::*;
    use crate::data::selector::{Dimension, FilterOptions};

    fn record(category: &str, segment: &str, year: i32, sales: f64) -> SalesRecord {
        let date = NaiveDate::from_ymd_opt(year, 6, 15).unwrap();
        SalesRecord::new(category, segment, "Paper", date, sales, 1.0, 1.0)
    }

    fn dataset() -> SalesDataset {
        SalesDataset::new(
            vec![
                record("Furniture", "Consumer", 2016, 10.0),
                record("Technology", "Consumer", 2016, 20.0),
                record("Furniture", "Corporate", 2017, 30.0),
                record("Technology", "Corporate", 2017, 40.0),
                record("Furniture", "Consumer", 2017, 50.0),
            ],
            Vec::new(),
        )
    }

    #[test]
    fn test_select_all_keeps_everything_in_order() {
        let ds = dataset();
        let sel = Selection::all(&FilterOptions::from_dataset(&ds));
        let view = apply(&ds, &sel);
        assert_eq!(view.indices(), &[0, 1, 2, 3, 4]);
    }

    #[test]
    fn test_conjunction_of_dimensions() {
        let ds = dataset();
        let opts = FilterOptions::from_dataset(&ds);
        let mut sel = Selection::all(&opts);
        sel.toggle(Dimension::Category, "Technology");
        sel.toggle(Dimension::Segment, "Corporate");

        let view = apply(&ds, &sel);
        // Furniture AND Consumer AND any year
        assert_eq!(view.indices(), &[0, 4]);

        for (i, r) in ds.records.iter().enumerate() {
            assert_eq!(view.indices().contains(&i), matches(r, &sel));
        }
    }

    #[test]
    fn test_any_empty_dimension_empties_the_view() {
        let ds = dataset();
        let opts = FilterOptions::from_dataset(&ds);
        for dim in Dimension::ALL {
            let mut sel = Selection::all(&opts);
            sel.select_none(dim);
            assert!(apply(&ds, &sel).is_empty(), "{dim}");
        }
    }

    #[test]
    fn test_records_iterates_matching_rows() {
        let ds = dataset();
        let opts = FilterOptions::from_dataset(&ds);
        let mut sel = Selection::all(&opts);
        sel.toggle(Dimension::Year, "2016");

        let view = apply(&ds, &sel);
        let sales: Vec<f64> = view.records().map(|r| r.sales).collect();
        assert_eq!(sales, vec![30.0, 40.0, 50.0]);
    }
}
