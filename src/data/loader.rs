use std::fmt;
use std::io::Read;
use std::path::{Path, PathBuf};

use arrow::util::display::array_value_to_string;
use chrono::{DateTime, NaiveDate, NaiveDateTime};
use parquet::arrow::arrow_reader::ParquetRecordBatchReaderBuilder;
use serde_json::Value as JsonValue;
use thiserror::Error;

use super::model::{REQUIRED_COLUMNS, SalesDataset, SalesRecord};

// ---------------------------------------------------------------------------
// Errors
// ---------------------------------------------------------------------------

/// Why a dataset could not be loaded. Fatal at startup.
#[derive(Debug, Error)]
pub enum LoadError {
    #[error("reading {}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("fetching {url}")]
    Fetch {
        url: String,
        #[source]
        source: reqwest::Error,
    },
    #[error("unsupported file extension: .{0}")]
    UnsupportedFormat(String),
    #[error("parsing CSV")]
    Csv(#[from] csv::Error),
    #[error("parsing JSON")]
    Json(#[from] serde_json::Error),
    #[error("reading parquet file")]
    Parquet(#[from] parquet::errors::ParquetError),
    #[error("decoding arrow data")]
    Arrow(#[from] arrow::error::ArrowError),
    #[error("missing required column '{0}'")]
    MissingColumn(String),
    #[error("row {row}: '{value}' is not a valid order_date")]
    InvalidDate { row: usize, value: String },
    #[error("row {row}, {column}: '{value}' is not a number")]
    InvalidNumber {
        row: usize,
        column: &'static str,
        value: String,
    },
    #[error("{0}")]
    InvalidStructure(String),
}

// ---------------------------------------------------------------------------
// Data source
// ---------------------------------------------------------------------------

/// Where the dataset comes from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DataSource {
    Path(PathBuf),
    Url(String),
}

impl DataSource {
    /// `http://` and `https://` locations are URLs, everything else a path.
    pub fn parse(location: &str) -> Self {
        let trimmed = location.trim();
        if trimmed.starts_with("http://") || trimmed.starts_with("https://") {
            DataSource::Url(trimmed.to_string())
        } else {
            DataSource::Path(PathBuf::from(trimmed))
        }
    }
}

impl fmt::Display for DataSource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DataSource::Path(p) => write!(f, "{}", p.display()),
            DataSource::Url(u) => write!(f, "{u}"),
        }
    }
}

// ---------------------------------------------------------------------------
// Public entry-points
// ---------------------------------------------------------------------------

/// Load a sales dataset from a path or URL. Single attempt, no retries.
pub fn load_source(source: &DataSource) -> Result<SalesDataset, LoadError> {
    match source {
        DataSource::Path(path) => load_file(path),
        DataSource::Url(url) => load_url(url),
    }
}

/// Load a sales dataset from a file.  Dispatch by extension.
///
/// Supported formats:
/// * `.csv`     – header row plus one transaction per line (also the default
///   for files without an extension)
/// * `.json`    – `[{ "category": ..., "sales": ..., ... }, ...]`
/// * `.parquet` – one column per field
pub fn load_file(path: &Path) -> Result<SalesDataset, LoadError> {
    let ext = path
        .extension()
        .and_then(|e| e.to_str())
        .unwrap_or("")
        .to_ascii_lowercase();

    match ext.as_str() {
        "csv" | "" => load_csv(path),
        "json" => load_json(path),
        "parquet" | "pq" => load_parquet(path),
        other => Err(LoadError::UnsupportedFormat(other.to_string())),
    }
}

/// Parse CSV from any reader.
pub fn load_csv_reader<R: Read>(input: R) -> Result<SalesDataset, LoadError> {
    let mut reader = csv::Reader::from_reader(input);
    read_csv(&mut reader)
}

// ---------------------------------------------------------------------------
// Column layout shared by every format
// ---------------------------------------------------------------------------

/// Positions of the required columns and of everything else in a header row.
#[derive(Debug)]
struct ColumnLayout {
    /// Indexed like [`REQUIRED_COLUMNS`].
    required: [usize; REQUIRED_COLUMNS.len()],
    extras: Vec<(usize, String)>,
}

impl ColumnLayout {
    fn from_headers<S: AsRef<str>>(headers: &[S]) -> Result<Self, LoadError> {
        let names: Vec<&str> = headers.iter().map(|h| h.as_ref().trim()).collect();

        let mut required = [0usize; REQUIRED_COLUMNS.len()];
        for (slot, column) in required.iter_mut().zip(REQUIRED_COLUMNS) {
            *slot = names
                .iter()
                .position(|h| *h == column)
                .ok_or_else(|| LoadError::MissingColumn(column.to_string()))?;
        }

        let extras = names
            .iter()
            .enumerate()
            .filter(|(i, _)| !required.contains(i))
            .map(|(i, name)| (i, name.to_string()))
            .collect();

        Ok(ColumnLayout { required, extras })
    }

    fn extra_columns(&self) -> Vec<String> {
        self.extras.iter().map(|(_, name)| name.clone()).collect()
    }

    /// Build one record from the cells of row `row`.
    fn record<S: AsRef<str>>(&self, row: usize, cells: &[S]) -> Result<SalesRecord, LoadError> {
        let cell = |idx: usize| cells.get(idx).map(|c| c.as_ref()).unwrap_or("");
        let [category, segment, sub_category, order_date, sales, profit, quantity] =
            self.required.map(cell);

        let date = parse_order_date(order_date).ok_or_else(|| LoadError::InvalidDate {
            row,
            value: order_date.to_string(),
        })?;

        let mut record = SalesRecord::new(
            category,
            segment,
            sub_category,
            date,
            parse_number(sales, row, "sales")?,
            parse_number(profit, row, "profit")?,
            parse_number(quantity, row, "quantity")?,
        );
        record.extras = self
            .extras
            .iter()
            .map(|(idx, _)| cell(*idx).to_string())
            .collect();
        Ok(record)
    }
}

const DATE_FORMATS: [&str; 4] = ["%Y-%m-%d", "%Y/%m/%d", "%m/%d/%Y", "%m-%d-%Y"];
const TIME_SUFFIXES: [&str; 4] = [" %H:%M:%S", " %H:%M", "T%H:%M:%S", "T%H:%M:%S%.f"];

/// Accepts plain dates, dates with a time part and RFC 3339 timestamps.
fn parse_order_date(s: &str) -> Option<NaiveDate> {
    let s = s.trim();
    if s.is_empty() {
        return None;
    }
    for fmt in DATE_FORMATS {
        if let Ok(d) = NaiveDate::parse_from_str(s, fmt) {
            return Some(d);
        }
        for suffix in TIME_SUFFIXES {
            if let Ok(dt) = NaiveDateTime::parse_from_str(s, &format!("{fmt}{suffix}")) {
                return Some(dt.date());
            }
        }
    }
    DateTime::parse_from_rfc3339(s).ok().map(|dt| dt.date_naive())
}

/// Empty cells are undefined (`NaN`), anything else must parse.
fn parse_number(s: &str, row: usize, column: &'static str) -> Result<f64, LoadError> {
    let trimmed = s.trim();
    if trimmed.is_empty() {
        return Ok(f64::NAN);
    }
    trimmed.parse::<f64>().map_err(|_| LoadError::InvalidNumber {
        row,
        column,
        value: s.to_string(),
    })
}

// ---------------------------------------------------------------------------
// CSV loader
// ---------------------------------------------------------------------------

fn load_csv(path: &Path) -> Result<SalesDataset, LoadError> {
    let file = std::fs::File::open(path).map_err(|source| LoadError::Io {
        path: path.to_path_buf(),
        source,
    })?;
    load_csv_reader(file)
}

fn read_csv<R: Read>(reader: &mut csv::Reader<R>) -> Result<SalesDataset, LoadError> {
    let headers: Vec<String> = reader.headers()?.iter().map(|h| h.to_string()).collect();
    let layout = ColumnLayout::from_headers(&headers)?;

    let mut records = Vec::new();
    for (row_no, result) in reader.records().enumerate() {
        let row = result?;
        let cells: Vec<&str> = row.iter().collect();
        records.push(layout.record(row_no, &cells)?);
    }

    Ok(SalesDataset::new(records, layout.extra_columns()))
}

// ---------------------------------------------------------------------------
// Remote CSV
// ---------------------------------------------------------------------------

fn load_url(url: &str) -> Result<SalesDataset, LoadError> {
    log::info!("Fetching {url}");
    let fetch_err = |source| LoadError::Fetch {
        url: url.to_string(),
        source,
    };
    let body = reqwest::blocking::get(url)
        .and_then(|resp| resp.error_for_status())
        .and_then(|resp| resp.text())
        .map_err(fetch_err)?;
    load_csv_reader(body.as_bytes())
}

// ---------------------------------------------------------------------------
// JSON loader
// ---------------------------------------------------------------------------

/// Expected JSON schema (records-oriented, the default `df.to_json(orient='records')`):
///
/// ```json
/// [
///   { "category": "Furniture", "segment": "Consumer", "sub_category": "Chairs",
///     "order_date": "2016-11-08", "sales": 731.94, "profit": 219.58, "quantity": 3 },
///   ...
/// ]
/// ```
///
/// Columns are taken from the first object.
fn load_json(path: &Path) -> Result<SalesDataset, LoadError> {
    let text = std::fs::read_to_string(path).map_err(|source| LoadError::Io {
        path: path.to_path_buf(),
        source,
    })?;
    load_json_str(&text)
}

fn load_json_str(text: &str) -> Result<SalesDataset, LoadError> {
    let root: JsonValue = serde_json::from_str(text)?;
    let rows = root
        .as_array()
        .ok_or_else(|| LoadError::InvalidStructure("expected top-level JSON array".into()))?;

    let Some(first) = rows.first() else {
        return Ok(SalesDataset::default());
    };
    let headers: Vec<String> = first
        .as_object()
        .ok_or_else(|| LoadError::InvalidStructure("row 0 is not a JSON object".into()))?
        .keys()
        .cloned()
        .collect();
    let layout = ColumnLayout::from_headers(&headers)?;

    let mut records = Vec::with_capacity(rows.len());
    for (i, row) in rows.iter().enumerate() {
        let obj = row
            .as_object()
            .ok_or_else(|| LoadError::InvalidStructure(format!("row {i} is not a JSON object")))?;
        let cells: Vec<String> = headers
            .iter()
            .map(|h| obj.get(h).map(json_cell_text).unwrap_or_default())
            .collect();
        records.push(layout.record(i, &cells)?);
    }

    Ok(SalesDataset::new(records, layout.extra_columns()))
}

fn json_cell_text(val: &JsonValue) -> String {
    match val {
        JsonValue::String(s) => s.clone(),
        JsonValue::Null => String::new(),
        other => other.to_string(),
    }
}

// ---------------------------------------------------------------------------
// Parquet loader
// ---------------------------------------------------------------------------

/// Load a Parquet file with one column per field.
///
/// String columns may be Utf8 or LargeUtf8, `order_date` may be a string or a
/// Date32/timestamp column, and the measures any integer or float type. Works
/// with files written by both **Pandas** and **Polars**.
fn load_parquet(path: &Path) -> Result<SalesDataset, LoadError> {
    let file = std::fs::File::open(path).map_err(|source| LoadError::Io {
        path: path.to_path_buf(),
        source,
    })?;
    let builder = ParquetRecordBatchReaderBuilder::try_new(file)?;

    let headers: Vec<String> = builder
        .schema()
        .fields()
        .iter()
        .map(|f| f.name().clone())
        .collect();
    let layout = ColumnLayout::from_headers(&headers)?;
    let reader = builder.build()?;

    let mut records = Vec::new();
    for batch_result in reader {
        let batch = batch_result?;
        let columns = batch.columns();
        for row in 0..batch.num_rows() {
            let cells = columns
                .iter()
                .map(|col| array_value_to_string(col, row))
                .collect::<Result<Vec<String>, _>>()?;
            records.push(layout.record(records.len(), &cells)?);
        }
    }

    Ok(SalesDataset::new(records, layout.extra_columns()))
}
