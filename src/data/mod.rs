/// Data layer: core types, loading, filtering and aggregation.
///
/// Architecture:
/// ```text
///  .csv / .json / .parquet / https://…
///        │
///        ▼
///   ┌──────────┐
///   │  loader   │  parse source → SalesDataset
///   └──────────┘
///        │
///        ▼
///   ┌──────────┐
///   │ selector  │  distinct categories / segments / years → Selection
///   └──────────┘
///        │
///        ▼
///   ┌──────────┐
///   │  filter   │  category ∧ segment ∧ year membership → FilteredView
///   └──────────┘
///        │
///        ▼
///   ┌──────────┐
///   │ aggregate │  KPIs, grouped sums, profit ratio → DashboardSummary
///   └──────────┘
/// ```

pub mod aggregate;
pub mod filter;
pub mod loader;
pub mod model;
pub mod selector;
