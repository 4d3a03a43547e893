use std::collections::BTreeMap;

use chrono::NaiveDate;

use super::filter::FilteredView;
use super::model::SalesRecord;

// ---------------------------------------------------------------------------
// Result types
// ---------------------------------------------------------------------------

/// Summed sales of one sub-category.
#[derive(Debug, Clone, PartialEq)]
pub struct SubCategorySales {
    pub sub_category: String,
    pub sales: f64,
}

/// Summed sales of one calendar month (keyed by its first day).
#[derive(Debug, Clone, PartialEq)]
pub struct MonthlySales {
    pub month: NaiveDate,
    pub sales: f64,
}

/// One point of the sales vs profit ratio scatter.
#[derive(Debug, Clone, PartialEq)]
pub struct ProfitRatioPoint {
    pub sub_category: String,
    pub sales: f64,
    pub profit: f64,
    pub profit_ratio: f64,
}

/// Outcome of the profit ratio pipeline. The two empty cases are reported
/// separately so the UI can explain which filter removed everything.
#[derive(Debug, Clone, PartialEq)]
pub enum ProfitRatioOutcome {
    /// Every sub-category summed to zero (or undefined) profit.
    NoNonZeroProfit,
    /// No sub-category had a positive sales / profit ratio.
    NoPositiveRatio,
    Ready {
        points: Vec<ProfitRatioPoint>,
        mean_sales: f64,
        mean_profit_ratio: f64,
    },
}

/// Headline numbers shown above the table.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Kpis {
    pub total_sales: i64,
    /// `None` when nothing is selected.
    pub average_quantity: Option<f64>,
    pub average_sales: Option<f64>,
}

/// Everything the dashboard renders for one selection.
#[derive(Debug, Clone, PartialEq)]
pub struct DashboardSummary {
    pub kpis: Kpis,
    pub sales_per_sub_category: Vec<SubCategorySales>,
    pub sales_per_month: Vec<MonthlySales>,
    pub profit_ratio: ProfitRatioOutcome,
}

// ---------------------------------------------------------------------------
// KPIs
// ---------------------------------------------------------------------------

/// Sum of sales truncated toward zero.
pub fn total_sales(view: &FilteredView) -> i64 {
    nan_sum(view.records().map(|r| r.sales)).trunc() as i64
}

/// Mean quantity rounded to one decimal, `None` for an empty view.
pub fn average_quantity(view: &FilteredView) -> Option<f64> {
    nan_mean(view.records().map(|r| r.quantity)).map(|m| round_half_up(m, 1))
}

/// Mean sales rounded to two decimals, `None` for an empty view.
pub fn average_sales(view: &FilteredView) -> Option<f64> {
    nan_mean(view.records().map(|r| r.sales)).map(|m| round_half_up(m, 2))
}

/// Most box icons drawn next to the average quantity.
pub const MAX_QUANTITY_ICONS: usize = 10;

/// Number of box icons drawn next to the average quantity, capped at
/// [`MAX_QUANTITY_ICONS`].
pub fn quantity_icon_count(average_quantity: Option<f64>) -> usize {
    average_quantity
        .map(|q| round_half_up(q, 0).clamp(0.0, MAX_QUANTITY_ICONS as f64) as usize)
        .unwrap_or(0)
}

pub fn kpis(view: &FilteredView) -> Kpis {
    Kpis {
        total_sales: total_sales(view),
        average_quantity: average_quantity(view),
        average_sales: average_sales(view),
    }
}

// ---------------------------------------------------------------------------
// Grouped sums
// ---------------------------------------------------------------------------

/// Group records by `key` and sum each of the `N` measures per group.
///
/// Groups come back in ascending key order; `NaN` measures are skipped.
pub fn group_sum<'r, K, I, F, const N: usize>(
    records: I,
    key: F,
    measures: [fn(&SalesRecord) -> f64; N],
) -> BTreeMap<K, [f64; N]>
where
    K: Ord,
    I: IntoIterator<Item = &'r SalesRecord>,
    F: Fn(&SalesRecord) -> K,
{
    let mut groups: BTreeMap<K, [f64; N]> = BTreeMap::new();
    for record in records {
        let sums = groups.entry(key(record)).or_insert([0.0; N]);
        for (sum, measure) in sums.iter_mut().zip(measures.iter()) {
            let v = measure(record);
            if !v.is_nan() {
                *sum += v;
            }
        }
    }
    groups
}

/// Sales per sub-category, largest first. Ties keep ascending name order.
pub fn sales_per_sub_category(view: &FilteredView) -> Vec<SubCategorySales> {
    let mut rows: Vec<SubCategorySales> =
        group_sum(view.records(), |r| r.sub_category.clone(), [|r| r.sales])
            .into_iter()
            .map(|(sub_category, [sales])| SubCategorySales { sub_category, sales })
            .collect();
    rows.sort_by(|a, b| b.sales.total_cmp(&a.sales));
    rows
}

/// Sales per calendar month, oldest first.
pub fn sales_per_month(view: &FilteredView) -> Vec<MonthlySales> {
    group_sum(view.records(), SalesRecord::order_month, [|r| r.sales])
        .into_iter()
        .map(|(month, [sales])| MonthlySales { month, sales })
        .collect()
}

/// Sales against `sales / profit` per sub-category, with the reference means.
pub fn sales_profit_ratio_per_sub_category(view: &FilteredView) -> ProfitRatioOutcome {
    let groups = group_sum(
        view.records(),
        |r| r.sub_category.clone(),
        [|r| r.sales, |r| r.profit],
    );

    let with_profit: Vec<(String, f64, f64)> = groups
        .into_iter()
        .filter(|(_, [_, profit])| *profit != 0.0 && !profit.is_nan())
        .map(|(name, [sales, profit])| (name, sales, profit))
        .collect();
    if with_profit.is_empty() {
        return ProfitRatioOutcome::NoNonZeroProfit;
    }

    let points: Vec<ProfitRatioPoint> = with_profit
        .into_iter()
        .map(|(sub_category, sales, profit)| ProfitRatioPoint {
            sub_category,
            sales,
            profit,
            profit_ratio: sales / profit,
        })
        // NaN ratios fail the comparison as well.
        .filter(|p| p.profit_ratio > 0.0)
        .collect();
    if points.is_empty() {
        return ProfitRatioOutcome::NoPositiveRatio;
    }

    let n = points.len() as f64;
    let mean_sales = points.iter().map(|p| p.sales).sum::<f64>() / n;
    let mean_profit_ratio = points.iter().map(|p| p.profit_ratio).sum::<f64>() / n;
    ProfitRatioOutcome::Ready {
        points,
        mean_sales,
        mean_profit_ratio,
    }
}

/// Compute every aggregate for one filtered view.
pub fn summarize(view: &FilteredView) -> DashboardSummary {
    DashboardSummary {
        kpis: kpis(view),
        sales_per_sub_category: sales_per_sub_category(view),
        sales_per_month: sales_per_month(view),
        profit_ratio: sales_profit_ratio_per_sub_category(view),
    }
}

// ---------------------------------------------------------------------------
// Numeric helpers
// ---------------------------------------------------------------------------

fn nan_sum(values: impl Iterator<Item = f64>) -> f64 {
    values.filter(|v| !v.is_nan()).sum()
}

fn nan_mean(values: impl Iterator<Item = f64>) -> Option<f64> {
    let (sum, count) = values
        .filter(|v| !v.is_nan())
        .fold((0.0, 0usize), |(s, c), v| (s + v, c + 1));
    (count > 0).then(|| sum / count as f64)
}

/// Round half away from zero on the shortest decimal representation of
/// `value`, so `3.05` becomes `3.1` even though its binary value is slightly
/// below the tie.
pub fn round_half_up(value: f64, decimals: usize) -> f64 {
    if !value.is_finite() {
        return value;
    }
    let repr = value.abs().to_string();
    let (int_part, frac_part) = repr.split_once('.').unwrap_or((repr.as_str(), ""));
    if frac_part.len() <= decimals {
        return value;
    }

    let mut digits: Vec<u8> = int_part
        .bytes()
        .chain(frac_part.bytes().take(decimals))
        .map(|b| b - b'0')
        .collect();
    if frac_part.as_bytes()[decimals] >= b'5' {
        let mut i = digits.len();
        loop {
            if i == 0 {
                digits.insert(0, 1);
                break;
            }
            i -= 1;
            if digits[i] == 9 {
                digits[i] = 0;
            } else {
                digits[i] += 1;
                break;
            }
        }
    }

    let split = digits.len() - decimals;
    let mut text: String = digits[..split].iter().map(|d| char::from(b'0' + d)).collect();
    if decimals > 0 {
        text.push('.');
        text.extend(digits[split..].iter().map(|d| char::from(b'0' + d)));
    }
    let magnitude = text.parse::<f64>().unwrap_or(value.abs());
    if value < 0.0 {
        -magnitude
    } else {
        magnitude
    }
}

// ---------------------------------------------------------------------------
// Display helpers
// ---------------------------------------------------------------------------

fn group_thousands(digits: &str) -> String {
    let mut result = String::new();
    for (i, ch) in digits.chars().rev().enumerate() {
        if i > 0 && i % 3 == 0 {
            result.push(',');
        }
        result.push(ch);
    }
    result.chars().rev().collect()
}

/// Integer with comma thousands separators: `1234567` → `1,234,567`.
pub fn format_thousands(n: i64) -> String {
    let grouped = group_thousands(&n.unsigned_abs().to_string());
    if n < 0 {
        format!("-{grouped}")
    } else {
        grouped
    }
}

/// Float with comma thousands separators and its shortest decimal form:
/// `2297.2` → `2,297.2`.
pub fn format_amount(value: f64) -> String {
    if !value.is_finite() {
        return value.to_string();
    }
    let repr = value.abs().to_string();
    let (int_part, frac_part) = repr.split_once('.').unwrap_or((repr.as_str(), ""));
    let sign = if value < 0.0 { "-" } else { "" };
    let grouped = group_thousands(int_part);
    if frac_part.is_empty() {
        format!("{sign}{grouped}.0")
    } else {
        format!("{sign}{grouped}.{frac_part}")
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::filter::{apply, FilteredView};
    use crate::data::model::SalesDataset;
    use crate::data::selector::{Dimension, FilterOptions, Selection};

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    fn rec(sub: &str, d: NaiveDate, sales: f64, profit: f64, quantity: f64) -> SalesRecord {
        SalesRecord::new("Furniture", "Consumer", sub, d, sales, profit, quantity)
    }

    fn everything(ds: &SalesDataset) -> FilteredView<'_> {
        FilteredView::from_indices(ds, (0..ds.len()).collect())
    }

    #[test]
    fn test_total_sales_truncates() {
        let ds = SalesDataset::new(
            vec![
                rec("Chairs", date(2016, 1, 1), 1000.5, 1.0, 1.0),
                rec("Chairs", date(2016, 1, 2), 234.49, 1.0, 1.0),
            ],
            Vec::new(),
        );
        // 1234.99 rounds to 1235 but truncates to 1234.
        assert_eq!(total_sales(&everything(&ds)), 1234);
    }

    #[test]
    fn test_total_sales_truncates_toward_zero_for_negatives() {
        let ds = SalesDataset::new(vec![rec("Chairs", date(2016, 1, 1), -5.7, 0.0, 1.0)], Vec::new());
        assert_eq!(total_sales(&everything(&ds)), -5);
    }

    #[test]
    fn test_averages_round_half_up() {
        // 20 rows with quantities summing to 61 → mean 3.05.
        let mut records: Vec<SalesRecord> = (0..19)
            .map(|_| rec("Paper", date(2017, 5, 1), 19.995, 1.0, 3.0))
            .collect();
        records.push(rec("Paper", date(2017, 5, 1), 19.995, 1.0, 4.0));
        let ds = SalesDataset::new(records, Vec::new());
        let view = everything(&ds);

        assert_eq!(average_quantity(&view), Some(3.1));
        assert_eq!(quantity_icon_count(average_quantity(&view)), 3);

        let single = SalesDataset::new(vec![rec("Paper", date(2017, 5, 1), 19.995, 1.0, 1.0)], Vec::new());
        assert_eq!(average_sales(&everything(&single)), Some(20.0));
    }

    #[test]
    fn test_means_skip_undefined_values() {
        let ds = SalesDataset::new(
            vec![
                rec("Paper", date(2017, 5, 1), f64::NAN, 1.0, 2.0),
                rec("Paper", date(2017, 5, 1), 10.0, 1.0, f64::NAN),
            ],
            Vec::new(),
        );
        let view = everything(&ds);
        assert_eq!(average_sales(&view), Some(10.0));
        assert_eq!(average_quantity(&view), Some(2.0));
        assert_eq!(total_sales(&view), 10);
    }

    #[test]
    fn test_quantity_icon_count_is_capped() {
        assert_eq!(quantity_icon_count(Some(1e20)), MAX_QUANTITY_ICONS);
        assert_eq!(quantity_icon_count(Some(1e9)), MAX_QUANTITY_ICONS);
        assert_eq!(quantity_icon_count(Some(f64::INFINITY)), MAX_QUANTITY_ICONS);
        assert_eq!(quantity_icon_count(Some(-4.0)), 0);
        assert_eq!(quantity_icon_count(Some(2.5)), 3);
        assert!("📦".repeat(quantity_icon_count(Some(1e20))).chars().count() <= MAX_QUANTITY_ICONS);
    }

    #[test]
    fn test_round_half_up() {
        assert_eq!(round_half_up(3.05, 1), 3.1);
        assert_eq!(round_half_up(3.04, 1), 3.0);
        assert_eq!(round_half_up(19.995, 2), 20.0);
        assert_eq!(round_half_up(2.675, 2), 2.68);
        assert_eq!(round_half_up(-2.5, 0), -3.0);
        assert_eq!(round_half_up(9.96, 1), 10.0);
        assert_eq!(round_half_up(42.0, 2), 42.0);
        assert!(round_half_up(f64::NAN, 1).is_nan());
    }

    #[test]
    fn test_sales_per_sub_category_sorted_desc_and_stable() {
        let d = date(2016, 3, 3);
        let ds = SalesDataset::new(
            vec![
                rec("Tables", d, 50.0, 1.0, 1.0),
                rec("Binders", d, 100.0, 1.0, 1.0),
                rec("Art", d, 30.0, 1.0, 1.0),
                rec("Chairs", d, 20.0, 1.0, 1.0),
                rec("Art", d, 20.0, 1.0, 1.0),
            ],
            Vec::new(),
        );
        let rows = sales_per_sub_category(&everything(&ds));
        let names: Vec<&str> = rows.iter().map(|r| r.sub_category.as_str()).collect();
        // Art and Tables tie at 50 and keep name order.
        assert_eq!(names, vec!["Binders", "Art", "Tables", "Chairs"]);
        assert_eq!(rows[0].sales, 100.0);
        assert_eq!(rows[1].sales, 50.0);
    }

    #[test]
    fn test_sales_per_month_chronological() {
        let ds = SalesDataset::new(
            vec![
                rec("Paper", date(2017, 2, 20), 5.0, 1.0, 1.0),
                rec("Paper", date(2016, 12, 31), 1.0, 1.0, 1.0),
                rec("Paper", date(2017, 2, 1), 7.0, 1.0, 1.0),
                rec("Paper", date(2016, 12, 1), 2.0, 1.0, 1.0),
            ],
            Vec::new(),
        );
        let months = sales_per_month(&everything(&ds));
        assert_eq!(
            months,
            vec![
                MonthlySales { month: date(2016, 12, 1), sales: 3.0 },
                MonthlySales { month: date(2017, 2, 1), sales: 12.0 },
            ]
        );
    }

    #[test]
    fn test_profit_ratio_drops_zero_profit_and_negative_ratio() {
        let d = date(2016, 1, 1);
        let ds = SalesDataset::new(
            vec![
                rec("A", d, 100.0, 0.0, 1.0),
                rec("B", d, 120.0, 20.0, 1.0),
                rec("B", d, 80.0, 30.0, 1.0),
                rec("C", d, 50.0, -10.0, 1.0),
            ],
            Vec::new(),
        );
        match sales_profit_ratio_per_sub_category(&everything(&ds)) {
            ProfitRatioOutcome::Ready {
                points,
                mean_sales,
                mean_profit_ratio,
            } => {
                assert_eq!(points.len(), 1);
                assert_eq!(points[0].sub_category, "B");
                assert_eq!(points[0].profit_ratio, 4.0);
                assert_eq!(mean_sales, 200.0);
                assert_eq!(mean_profit_ratio, 4.0);
            }
            other => panic!("unexpected outcome {other:?}"),
        }
    }

    #[test]
    fn test_profit_ratio_degenerate_states_are_distinct() {
        let d = date(2016, 1, 1);
        let zero = SalesDataset::new(
            vec![rec("A", d, 100.0, 5.0, 1.0), rec("A", d, 10.0, -5.0, 1.0), rec("B", d, 1.0, f64::NAN, 1.0)],
            Vec::new(),
        );
        assert_eq!(
            sales_profit_ratio_per_sub_category(&everything(&zero)),
            ProfitRatioOutcome::NoNonZeroProfit
        );

        let negative = SalesDataset::new(vec![rec("C", d, 50.0, -10.0, 1.0)], Vec::new());
        assert_eq!(
            sales_profit_ratio_per_sub_category(&everything(&negative)),
            ProfitRatioOutcome::NoPositiveRatio
        );
    }

    #[test]
    fn test_end_to_end_selection() {
        let ds = SalesDataset::new(
            vec![
                SalesRecord::new("Furniture", "Consumer", "Chairs", date(2016, 4, 1), 100.25, 10.0, 2.0),
                SalesRecord::new("Technology", "Consumer", "Phones", date(2016, 5, 1), 300.0, 30.0, 1.0),
                SalesRecord::new("Furniture", "Consumer", "Tables", date(2017, 6, 1), 500.0, 50.0, 4.0),
                SalesRecord::new("Furniture", "Consumer", "Chairs", date(2016, 7, 1), 49.9, 5.0, 3.0),
            ],
            Vec::new(),
        );
        let opts = FilterOptions::from_dataset(&ds);
        let mut sel = Selection::all(&opts);
        sel.toggle(Dimension::Category, "Technology");
        sel.toggle(Dimension::Year, "2017");

        let view = apply(&ds, &sel);
        assert_eq!(view.indices(), &[0, 3]);

        let summary = summarize(&view);
        assert_eq!(summary.kpis.total_sales, 150);
        assert_eq!(summary.kpis.average_quantity, Some(2.5));
        assert_eq!(summary.kpis.average_sales, Some(75.08));
        assert_eq!(summary.sales_per_sub_category.len(), 1);
        assert_eq!(summary.sales_per_month.len(), 2);
    }

    #[test]
    fn test_empty_dataset_boundary() {
        let ds = SalesDataset::default();
        let sel = Selection::all(&FilterOptions::from_dataset(&ds));
        let view = apply(&ds, &sel);
        assert!(view.is_empty());

        let summary = summarize(&view);
        assert_eq!(summary.kpis.total_sales, 0);
        assert_eq!(summary.kpis.average_quantity, None);
        assert_eq!(summary.kpis.average_sales, None);
        assert_eq!(quantity_icon_count(None), 0);
        assert!(summary.sales_per_sub_category.is_empty());
        assert!(summary.sales_per_month.is_empty());
        assert_eq!(summary.profit_ratio, ProfitRatioOutcome::NoNonZeroProfit);
    }

    #[test]
    fn test_format_thousands() {
        assert_eq!(format_thousands(0), "0");
        assert_eq!(format_thousands(999), "999");
        assert_eq!(format_thousands(1000), "1,000");
        assert_eq!(format_thousands(2297200), "2,297,200");
        assert_eq!(format_thousands(-1234), "-1,234");
    }

    #[test]
    fn test_format_amount() {
        assert_eq!(format_amount(229.86), "229.86");
        assert_eq!(format_amount(2297.2), "2,297.2");
        assert_eq!(format_amount(1500.0), "1,500.0");
        assert_eq!(format_amount(-12345.5), "-12,345.5");
    }
}
