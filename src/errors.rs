/*

SPDX-License-Identifier: AGPL-3.0-only
Copyright (c) 2025 Augustus Rizza

*/

use thiserror::Error;

#[derive(Debug, Error)]
pub enum CrawlError {
    #[error("invalid ticker: {0}")]
    InvalidTicker(String),

    #[error("no tickers given")]
    NoTickers,

    #[error("invalid source `{source_id}`: {reason}")]
    InvalidSource { source_id: String, reason: String },

    #[error("source registry is empty")]
    NoSources,

    #[error("configuration error: {0}")]
    Config(String),

    #[error("http client error: {0}")]
    HttpClient(#[from] reqwest::Error),

    #[error("dataframe error: {0}")]
    Frame(#[from] polars::prelude::PolarsError),

    #[error("io error: {0}")]
    Io(#[from] std::io::Error),

    #[error("json error: {0}")]
    Json(#[from] serde_json::Error),
}

impl CrawlError {
    pub fn invalid_source(source_id: &str, reason: impl Into<String>) -> Self {
        CrawlError::InvalidSource {
            source_id: source_id.to_string(),
            reason: reason.into(),
        }
    }
}
