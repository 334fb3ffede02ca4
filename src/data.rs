//! Return data loading.
//!
//! Reads a delimited table of per-period returns:
//!
//! ```text
//! Date,AAA,BBB,CCC,Index1,Index2
//! 2020-01-31,0.012,-0.004,0.021,0.008,0.010
//! ...
//! ```
//!
//! The date column and the benchmark columns are named in [`DataConfig`];
//! every other column is an asset.

use std::fs::File;
use std::io::Read;
use std::path::Path;

use chrono::NaiveDate;
use csv::ReaderBuilder;
use nalgebra::DMatrix;
use serde::{Deserialize, Serialize};
use tracing::{debug, info, warn};

use crate::error::{FrontierError, Result};
use crate::model::{AssetUniverse, MomentEstimate, ReturnSample};

/// How to read the return table.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct DataConfig {
    /// Name of the date column (matched case-insensitively).
    pub date_column: String,
    /// `chrono` format of the dates.
    pub date_format: String,
    /// Columns holding benchmark index returns rather than assets.
    pub benchmarks: Vec<String>,
    /// Field delimiter.
    pub delimiter: char,
}

impl Default for DataConfig {
    fn default() -> Self {
        DataConfig {
            date_column: "Date".to_string(),
            date_format: "%Y-%m-%d".to_string(),
            benchmarks: Vec::new(),
            delimiter: ',',
        }
    }
}

/// Return series of a benchmark index.
#[derive(Debug, Clone, PartialEq)]
pub struct BenchmarkSeries {
    pub name: String,
    pub returns: Vec<f64>,
}

impl BenchmarkSeries {
    /// Mean and variance of the series as a one-asset moment estimate.
    pub fn moments(&self) -> Result<MomentEstimate> {
        let sample = ReturnSample::new(DMatrix::from_column_slice(
            self.returns.len(),
            1,
            &self.returns,
        ))?;
        MomentEstimate::from_sample(&sample)
    }
}

/// A loaded return table.
#[derive(Debug, Clone)]
pub struct ReturnTable {
    pub dates: Vec<NaiveDate>,
    pub universe: AssetUniverse,
    pub sample: ReturnSample,
    pub benchmarks: Vec<BenchmarkSeries>,
}

impl ReturnTable {
    pub fn periods(&self) -> usize {
        self.dates.len()
    }

    pub fn benchmark(&self, name: &str) -> Option<&BenchmarkSeries> {
        self.benchmarks.iter().find(|b| b.name == name)
    }
}

/// Load a return table from a file.
pub fn load_returns(path: impl AsRef<Path>, config: &DataConfig) -> Result<ReturnTable> {
    let path = path.as_ref();
    info!("Loading returns from: {}", path.display());
    let file = File::open(path)?;
    let table = read_returns(file, config)?;
    info!(
        periods = table.periods(),
        assets = table.universe.len(),
        benchmarks = table.benchmarks.len(),
        "loaded return table"
    );
    Ok(table)
}

/// Read a return table from any reader.
pub fn read_returns<R: Read>(reader: R, config: &DataConfig) -> Result<ReturnTable> {
    if !config.delimiter.is_ascii() {
        return Err(FrontierError::InvalidParameter(format!(
            "delimiter '{}' is not ASCII",
            config.delimiter
        )));
    }

    let mut reader = ReaderBuilder::new()
        .has_headers(true)
        .delimiter(config.delimiter as u8)
        .trim(csv::Trim::All)
        .from_reader(reader);

    let headers: Vec<String> = reader.headers()?.iter().map(str::to_string).collect();
    let date_idx = headers
        .iter()
        .position(|h| h.eq_ignore_ascii_case(&config.date_column))
        .ok_or_else(|| {
            FrontierError::DataError(format!("missing date column '{}'", config.date_column))
        })?;

    let mut benchmark_idx = Vec::with_capacity(config.benchmarks.len());
    for name in &config.benchmarks {
        let idx = headers.iter().position(|h| h == name).ok_or_else(|| {
            FrontierError::DataError(format!("missing benchmark column '{}'", name))
        })?;
        benchmark_idx.push(idx);
    }

    let asset_idx: Vec<usize> = (0..headers.len())
        .filter(|i| *i != date_idx && !benchmark_idx.contains(i))
        .collect();
    let universe = AssetUniverse::new(asset_idx.iter().map(|&i| headers[i].clone()))?;

    let mut dates = Vec::new();
    let mut asset_values = Vec::new();
    let mut benchmark_values = vec![Vec::new(); benchmark_idx.len()];

    for (row, record) in reader.records().enumerate() {
        let record = record?;
        // Header is line 1.
        let line = row + 2;

        let raw_date = record.get(date_idx).unwrap_or("");
        let date = NaiveDate::parse_from_str(raw_date, &config.date_format).map_err(
            |source| FrontierError::DateParse {
                line,
                value: raw_date.to_string(),
                source,
            },
        )?;
        dates.push(date);

        for &i in &asset_idx {
            asset_values.push(parse_value(&record, i, &headers, line)?);
        }
        for (series, &i) in benchmark_values.iter_mut().zip(&benchmark_idx) {
            series.push(parse_value(&record, i, &headers, line)?);
        }
    }

    if dates.windows(2).any(|w| w[1] <= w[0]) {
        warn!("dates are not strictly increasing");
    }
    debug!(rows = dates.len(), "parsed return rows");

    let sample = ReturnSample::new(DMatrix::from_row_slice(
        dates.len(),
        universe.len(),
        &asset_values,
    ))?;
    let benchmarks = config
        .benchmarks
        .iter()
        .cloned()
        .zip(benchmark_values)
        .map(|(name, returns)| BenchmarkSeries { name, returns })
        .collect();

    Ok(ReturnTable {
        dates,
        universe,
        sample,
        benchmarks,
    })
}

fn parse_value(
    record: &csv::StringRecord,
    idx: usize,
    headers: &[String],
    line: usize,
) -> Result<f64> {
    let raw = record.get(idx).unwrap_or("");
    if raw.is_empty() {
        return Err(FrontierError::DataError(format!(
            "line {}: missing value for '{}'",
            line, headers[idx]
        )));
    }
    raw.parse::<f64>().map_err(|_| {
        FrontierError::DataError(format!(
            "line {}: '{}' is not a number in column '{}'",
            line, raw, headers[idx]
        ))
    })
}
