/*

SPDX-License-Identifier: AGPL-3.0-only
Copyright (c) 2025 Augustus Rizza

*/

use std::fmt;
use std::fs;
use std::path::Path;

use log::warn;
use serde::{Deserialize, Serialize};

use crate::errors::CrawlError;

/// Exchange symbol, trimmed and uppercased. Never empty.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Ticker(String);

impl Ticker {
    pub fn parse(raw: &str) -> Result<Self, CrawlError> {
        let t = raw.trim();
        if t.is_empty() {
            return Err(CrawlError::InvalidTicker("empty symbol".into()));
        }
        Ok(Ticker(t.to_ascii_uppercase()))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for Ticker {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl AsRef<str> for Ticker {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

/// Split a free-form list like `"aapl, msft tsla"` into tickers.
///
/// Commas, semicolons and whitespace all separate symbols; blank entries are
/// skipped. Order is preserved and duplicates are kept.
pub fn parse_ticker_list(input: &str) -> Result<Vec<Ticker>, CrawlError> {
    input
        .split(|c: char| c == ',' || c == ';' || c.is_whitespace())
        .filter(|s| !s.trim().is_empty())
        .map(Ticker::parse)
        .collect()
}

/// One or more tickers per line; `#` starts a comment.
pub fn read_ticker_file(path: &Path) -> Result<Vec<Ticker>, CrawlError> {
    let text = fs::read_to_string(path)?;
    let mut out = Vec::new();
    for (lineno, line) in text.lines().enumerate() {
        let body = line.split('#').next().unwrap_or("");
        if body.trim().is_empty() {
            continue;
        }
        match parse_ticker_list(body) {
            Ok(mut ts) => out.append(&mut ts),
            Err(e) => {
                warn!("{}:{}: skipping line: {e}", path.display(), lineno + 1);
            }
        }
    }
    Ok(out)
}

/// Collect tickers from every input and fail when nothing usable remains.
pub fn gather_tickers(
    inline: &[String],
    file: Option<&Path>,
) -> Result<Vec<Ticker>, CrawlError> {
    let mut tickers = Vec::new();
    for chunk in inline {
        tickers.extend(parse_ticker_list(chunk)?);
    }
    if let Some(p) = file {
        tickers.extend(read_ticker_file(p)?);
    }
    if tickers.is_empty() {
        return Err(CrawlError::NoTickers);
    }
    Ok(tickers)
}
