use std::collections::BTreeSet;
use std::fmt;

use super::model::SalesDataset;

// ---------------------------------------------------------------------------
// Filter dimensions
// ---------------------------------------------------------------------------

/// The three columns the sidebar filters on.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Dimension {
    Category,
    Segment,
    Year,
}

impl Dimension {
    pub const ALL: [Dimension; 3] = [Dimension::Category, Dimension::Segment, Dimension::Year];

    /// Widget label.
    pub fn label(self) -> &'static str {
        match self {
            Dimension::Category => "Category",
            Dimension::Segment => "Segment",
            Dimension::Year => "Year",
        }
    }
}

impl fmt::Display for Dimension {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

// ---------------------------------------------------------------------------
// Available options
// ---------------------------------------------------------------------------

/// Distinct values offered per dimension.
///
/// Categories and segments keep first-appearance order, years are ascending.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct FilterOptions {
    pub categories: Vec<String>,
    pub segments: Vec<String>,
    pub years: Vec<i32>,
}

impl FilterOptions {
    pub fn from_dataset(dataset: &SalesDataset) -> Self {
        FilterOptions {
            categories: dataset.distinct_by(|r| r.category.as_str()),
            segments: dataset.distinct_by(|r| r.segment.as_str()),
            years: dataset.distinct_years(),
        }
    }

    /// Options of one dimension rendered as labels.
    pub fn available(&self, dimension: Dimension) -> Vec<String> {
        match dimension {
            Dimension::Category => self.categories.clone(),
            Dimension::Segment => self.segments.clone(),
            Dimension::Year => self.years.iter().map(|y| y.to_string()).collect(),
        }
    }
}

// ---------------------------------------------------------------------------
// Current selection
// ---------------------------------------------------------------------------

/// The values currently chosen per dimension. An empty set selects nothing.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Selection {
    pub categories: BTreeSet<String>,
    pub segments: BTreeSet<String>,
    pub years: BTreeSet<i32>,
}

impl Selection {
    /// Everything selected, the initial state.
    pub fn all(options: &FilterOptions) -> Self {
        Selection {
            categories: options.categories.iter().cloned().collect(),
            segments: options.segments.iter().cloned().collect(),
            years: options.years.iter().copied().collect(),
        }
    }

    /// Whether `value` (as rendered by [`FilterOptions::available`]) is selected.
    pub fn is_selected(&self, dimension: Dimension, value: &str) -> bool {
        match dimension {
            Dimension::Category => self.categories.contains(value),
            Dimension::Segment => self.segments.contains(value),
            Dimension::Year => value
                .parse::<i32>()
                .map(|y| self.years.contains(&y))
                .unwrap_or(false),
        }
    }

    /// Number of selected values in one dimension.
    pub fn count(&self, dimension: Dimension) -> usize {
        match dimension {
            Dimension::Category => self.categories.len(),
            Dimension::Segment => self.segments.len(),
            Dimension::Year => self.years.len(),
        }
    }

    /// Flip a single value in or out of the selection.
    pub fn toggle(&mut self, dimension: Dimension, value: &str) {
        match dimension {
            Dimension::Category => toggle_in(&mut self.categories, value.to_string()),
            Dimension::Segment => toggle_in(&mut self.segments, value.to_string()),
            Dimension::Year => {
                if let Ok(year) = value.parse::<i32>() {
                    toggle_in(&mut self.years, year);
                } else {
                    log::warn!("Ignoring non-numeric year '{value}'");
                }
            }
        }
    }

    /// Select every available value of a dimension.
    pub fn select_all(&mut self, dimension: Dimension, options: &FilterOptions) {
        match dimension {
            Dimension::Category => self.categories = options.categories.iter().cloned().collect(),
            Dimension::Segment => self.segments = options.segments.iter().cloned().collect(),
            Dimension::Year => self.years = options.years.iter().copied().collect(),
        }
    }

    /// Deselect every value of a dimension.
    pub fn select_none(&mut self, dimension: Dimension) {
        match dimension {
            Dimension::Category => self.categories.clear(),
            Dimension::Segment => self.segments.clear(),
            Dimension::Year => self.years.clear(),
        }
    }
}

fn toggle_in<T: Ord>(set: &mut BTreeSet<T>, value: T) {
    if !set.remove(&value) {
        set.insert(value);
    }
}
