use std::collections::HashSet;

use chrono::{Datelike, NaiveDate};

/// Columns every source must provide, in canonical order.
pub const REQUIRED_COLUMNS: [&str; 7] = [
    "category",
    "segment",
    "sub_category",
    "order_date",
    "sales",
    "profit",
    "quantity",
];

// ---------------------------------------------------------------------------
// SalesRecord – one row of the source table
// ---------------------------------------------------------------------------

/// A single sales transaction.
#[derive(Debug, Clone, PartialEq)]
pub struct SalesRecord {
    pub category: String,
    pub segment: String,
    pub sub_category: String,
    pub order_date: NaiveDate,
    /// Calendar year of `order_date`, derived at load time.
    pub order_year: i32,
    /// `NaN` when the source cell was empty.
    pub sales: f64,
    pub profit: f64,
    pub quantity: f64,
    /// Remaining source columns as display text, aligned with
    /// [`SalesDataset::extra_columns`].
    pub extras: Vec<String>,
}

impl SalesRecord {
    pub fn new(
        category: impl Into<String>,
        segment: impl Into<String>,
        sub_category: impl Into<String>,
        order_date: NaiveDate,
        sales: f64,
        profit: f64,
        quantity: f64,
    ) -> Self {
        SalesRecord {
            category: category.into(),
            segment: segment.into(),
            sub_category: sub_category.into(),
            order_date,
            order_year: order_date.year(),
            sales,
            profit,
            quantity,
            extras: Vec::new(),
        }
    }

    /// First day of the month the order was placed in.
    pub fn order_month(&self) -> NaiveDate {
        self.order_date.with_day(1).unwrap_or(self.order_date)
    }

    /// Value of an extra column by position, empty when absent.
    pub fn extra(&self, idx: usize) -> &str {
        self.extras.get(idx).map(String::as_str).unwrap_or("")
    }
}

// ---------------------------------------------------------------------------
// SalesDataset – the complete loaded dataset
// ---------------------------------------------------------------------------

/// The full parsed dataset. Immutable once loaded.
#[derive(Debug, Clone, Default)]
pub struct SalesDataset {
    pub records: Vec<SalesRecord>,
    /// Names of the non-required source columns, in source order.
    pub extra_columns: Vec<String>,
}

impl SalesDataset {
    pub fn new(records: Vec<SalesRecord>, extra_columns: Vec<String>) -> Self {
        SalesDataset {
            records,
            extra_columns,
        }
    }

    /// Number of rows.
    pub fn len(&self) -> usize {
        self.records.len()
    }

    /// Whether the dataset is empty.
    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    /// Distinct values of a string field, in order of first appearance.
    pub fn distinct_by<F>(&self, field: F) -> Vec<String>
    where
        F: Fn(&SalesRecord) -> &str,
    {
        let mut seen = HashSet::new();
        self.records
            .iter()
            .map(|r| field(r))
            .filter(|v| seen.insert(*v))
            .map(str::to_string)
            .collect()
    }

    /// Distinct order years, ascending.
    pub fn distinct_years(&self) -> Vec<i32> {
        let mut years: Vec<i32> = self.records.iter().map(|r| r.order_year).collect();
        years.sort_unstable();
        years.dedup();
        years
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    #[test]
    fn test_order_year_and_month_are_derived() {
        let r = SalesRecord::new("Furniture", "Consumer", "Chairs", date(2016, 11, 8), 1.0, 1.0, 1.0);
        assert_eq!(r.order_year, 2016);
        assert_eq!(r.order_month(), date(2016, 11, 1));
    }

    #[test]
    fn test_distinct_values_keep_first_appearance_order() {
        let ds = SalesDataset::new(
            vec![
                SalesRecord::new("Technology", "Consumer", "Phones", date(2017, 1, 1), 1.0, 1.0, 1.0),
                SalesRecord::new("Furniture", "Corporate", "Chairs", date(2015, 1, 1), 1.0, 1.0, 1.0),
                SalesRecord::new("Technology", "Consumer", "Phones", date(2016, 1, 1), 1.0, 1.0, 1.0),
            ],
            Vec::new(),
        );
        assert_eq!(ds.distinct_by(|r| r.category.as_str()), vec!["Technology", "Furniture"]);
        assert_eq!(ds.distinct_years(), vec![2015, 2016, 2017]);
    }

    #[test]
    fn test_extra_out_of_range_is_empty() {
        let r = SalesRecord::new("a", "b", "c", date(2020, 2, 29), 0.0, 0.0, 0.0);
        assert_eq!(r.extra(3), "");
    }
}
