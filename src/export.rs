/*

SPDX-License-Identifier: AGPL-3.0-only
Copyright (c) 2025 Augustus Rizza

*/

use std::fs::{self, File};
use std::path::Path;

use log::info;
use polars::prelude::*;

use crate::errors::CrawlError;
use crate::record::{BatchResult, MISSING};

pub const TICKER_COLUMN: &str = "Ticker";

#[derive(Debug, Clone, Copy, PartialEq, Eq, clap::ValueEnum)]
pub enum ExportFormat {
    Csv,
    Json,
}

impl ExportFormat {
    /// Guess from the file extension; anything unknown is CSV.
    pub fn from_path(path: &Path) -> Self {
        match path
            .extension()
            .and_then(|e| e.to_str())
            .map(|e| e.to_ascii_lowercase())
            .as_deref()
        {
            Some("json") => ExportFormat::Json,
            _ => ExportFormat::Csv,
        }
    }
}

/// One row per entry: `Ticker` then every canonical field. Failed tickers
/// carry `N/A` in every field column.
pub fn to_dataframe(result: &BatchResult, fields: &[String]) -> Result<DataFrame, CrawlError> {
    let tickers: Vec<String> = result
        .entries
        .iter()
        .map(|e| e.ticker().to_string())
        .collect();

    let mut columns = Vec::with_capacity(fields.len() + 1);
    columns.push(Column::new(TICKER_COLUMN.into(), tickers));

    for name in fields {
        let values: Vec<String> = result
            .entries
            .iter()
            .map(|e| {
                e.record()
                    .map(|r| r.get(name))
                    .unwrap_or(MISSING)
                    .to_string()
            })
            .collect();
        columns.push(Column::new(name.as_str().into(), values));
    }

    Ok(DataFrame::new(columns)?)
}

/// Write `result` to `path`, creating parent directories as needed.
pub fn write_batch(
    result: &BatchResult,
    fields: &[String],
    path: &Path,
    format: ExportFormat,
) -> Result<DataFrame, CrawlError> {
    let mut df = to_dataframe(result, fields)?;

    if let Some(parent) = path.parent() {
        if !parent.as_os_str().is_empty() && !parent.exists() {
            fs::create_dir_all(parent)?;
        }
    }

    let mut file = File::create(path)?;
    match format {
        ExportFormat::Csv => {
            CsvWriter::new(&mut file)
                .include_header(true)
                .finish(&mut df)?;
        }
        ExportFormat::Json => {
            JsonWriter::new(&mut file)
                .with_json_format(JsonFormat::Json)
                .finish(&mut df)?;
        }
    }

    info!(
        "Wrote {} row(s) x {} column(s) to {}",
        df.height(),
        df.width(),
        path.display()
    );
    Ok(df)
}
