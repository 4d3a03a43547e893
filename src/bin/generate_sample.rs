use std::sync::Arc;

use anyhow::{Context, Result};
use arrow::array::{Date32Array, Float64Array, Int64Array, StringArray};
use arrow::datatypes::{DataType, Field, Schema};
use arrow::record_batch::RecordBatch;
use arrow::util::pretty::pretty_format_batches;
use chrono::{Datelike, Duration, NaiveDate};
use parquet::arrow::ArrowWriter;
use serde::Serialize;

/// Sub-categories per category with a typical unit price and margin.
const CATALOG: [(&str, &[(&str, f64, f64)]); 3] = [
    (
        "Furniture",
        &[("Bookcases", 210.0, 0.02), ("Chairs", 160.0, 0.08), ("Furnishings", 45.0, 0.14), ("Tables", 320.0, -0.09)],
    ),
    (
        "Office Supplies",
        &[("Binders", 30.0, 0.15), ("Paper", 18.0, 0.43), ("Storage", 75.0, 0.10), ("Supplies", 25.0, -0.02)],
    ),
    (
        "Technology",
        &[("Accessories", 70.0, 0.24), ("Copiers", 700.0, 0.37), ("Machines", 480.0, 0.02), ("Phones", 120.0, 0.13)],
    ),
];
const SEGMENTS: [&str; 3] = ["Consumer", "Corporate", "Home Office"];
const REGIONS: [&str; 4] = ["Central", "East", "South", "West"];
const ROWS: usize = 2000;

/// Minimal deterministic PRNG (xoshiro256**)
struct SimpleRng {
    state: [u64; 4],
}

impl SimpleRng {
    fn new(seed: u64) -> Self {
        let mut s = [0u64; 4];
        let mut x = seed;
        for slot in &mut s {
            x = x.wrapping_mul(6364136223846793005).wrapping_add(1);
            *slot = x;
        }
        SimpleRng { state: s }
    }

    fn next_u64(&mut self) -> u64 {
        let result = (self.state[1].wrapping_mul(5))
            .rotate_left(7)
            .wrapping_mul(9);
        let t = self.state[1] << 17;
        self.state[2] ^= self.state[0];
        self.state[3] ^= self.state[1];
        self.state[1] ^= self.state[2];
        self.state[0] ^= self.state[3];
        self.state[2] ^= t;
        self.state[3] = self.state[3].rotate_left(45);
        result
    }

    fn next_f64(&mut self) -> f64 {
        (self.next_u64() >> 11) as f64 / (1u64 << 53) as f64
    }

    fn below(&mut self, n: usize) -> usize {
        (self.next_f64() * n as f64) as usize % n
    }

    fn pick<'a, T>(&mut self, items: &'a [T]) -> &'a T {
        &items[self.below(items.len())]
    }
}

#[derive(Debug, Serialize)]
struct Row {
    order_id: String,
    order_date: NaiveDate,
    category: &'static str,
    segment: &'static str,
    sub_category: &'static str,
    region: &'static str,
    sales: f64,
    profit: f64,
    quantity: i64,
}

fn round2(v: f64) -> f64 {
    (v * 100.0).round() / 100.0
}

fn generate(rng: &mut SimpleRng) -> Result<Vec<Row>> {
    let start = NaiveDate::from_ymd_opt(2014, 1, 1).context("invalid start date")?;
    let days = 4 * 365;

    let rows = (0..ROWS)
        .map(|i| {
            let (category, subs) = *rng.pick(&CATALOG);
            let &(sub_category, unit_price, margin) = rng.pick(subs);
            let quantity = 1 + rng.below(9) as i64;
            let discount = [0.0, 0.0, 0.1, 0.2, 0.5][rng.below(5)];

            let price = unit_price * (0.6 + 0.8 * rng.next_f64());
            let sales = round2(price * quantity as f64 * (1.0 - discount));
            let profit = round2(sales * (margin - discount * 0.8 + 0.1 * (rng.next_f64() - 0.5)));
            let order_date = start + Duration::days(rng.below(days) as i64);

            Row {
                order_id: format!("CA-{}-{:06}", order_date.year(), 100000 + i),
                order_date,
                category,
                segment: *rng.pick(&SEGMENTS),
                sub_category,
                region: *rng.pick(&REGIONS),
                sales,
                profit,
                quantity,
            }
        })
        .collect();
    Ok(rows)
}

fn write_csv(rows: &[Row], path: &str) -> Result<()> {
    let mut writer = csv::Writer::from_path(path).with_context(|| format!("creating {path}"))?;
    for row in rows {
        writer.serialize(row)?;
    }
    writer.flush()?;
    Ok(())
}

fn to_batch(rows: &[Row]) -> Result<RecordBatch> {
    let epoch = NaiveDate::from_ymd_opt(1970, 1, 1).context("invalid epoch")?;
    let strings = |f: fn(&Row) -> &str| StringArray::from(rows.iter().map(f).collect::<Vec<_>>());

    let schema = Arc::new(Schema::new(vec![
        Field::new("order_id", DataType::Utf8, false),
        Field::new("order_date", DataType::Date32, false),
        Field::new("category", DataType::Utf8, false),
        Field::new("segment", DataType::Utf8, false),
        Field::new("sub_category", DataType::Utf8, false),
        Field::new("region", DataType::Utf8, false),
        Field::new("sales", DataType::Float64, false),
        Field::new("profit", DataType::Float64, false),
        Field::new("quantity", DataType::Int64, false),
    ]));

    let batch = RecordBatch::try_new(
        schema,
        vec![
            Arc::new(strings(|r| r.order_id.as_str())),
            Arc::new(Date32Array::from(
                rows.iter()
                    .map(|r| (r.order_date - epoch).num_days() as i32)
                    .collect::<Vec<_>>(),
            )),
            Arc::new(strings(|r| r.category)),
            Arc::new(strings(|r| r.segment)),
            Arc::new(strings(|r| r.sub_category)),
            Arc::new(strings(|r| r.region)),
            Arc::new(Float64Array::from(rows.iter().map(|r| r.sales).collect::<Vec<_>>())),
            Arc::new(Float64Array::from(rows.iter().map(|r| r.profit).collect::<Vec<_>>())),
            Arc::new(Int64Array::from(rows.iter().map(|r| r.quantity).collect::<Vec<_>>())),
        ],
    )?;
    Ok(batch)
}

fn write_parquet(batch: &RecordBatch, path: &str) -> Result<()> {
    let file = std::fs::File::create(path).with_context(|| format!("creating {path}"))?;
    let mut writer = ArrowWriter::try_new(file, batch.schema(), None)?;
    writer.write(batch)?;
    writer.close()?;
    Ok(())
}

fn main() -> Result<()> {
    env_logger::init();
    let mut rng = SimpleRng::new(42);
    let rows = generate(&mut rng)?;

    let csv_path = "sample_sales.csv";
    write_csv(&rows, csv_path)?;

    let batch = to_batch(&rows)?;
    let parquet_path = "sample_sales.parquet";
    write_parquet(&batch, parquet_path)?;

    log::debug!("Preview:\n{}", pretty_format_batches(&[batch.slice(0, 5)])?);
    println!("Wrote {} orders to {csv_path} and {parquet_path}", rows.len());
    Ok(())
}
