/*

SPDX-License-Identifier: AGPL-3.0-only
Copyright (c) 2025 Augustus Rizza

*/

use log::{info, warn};

use crate::extractor::extract;
use crate::fetcher::{FetchStatus, Fetcher};
use crate::record::SourceResult;
use crate::sources::SourceSpec;
use crate::ticker::Ticker;

/// Tries sources in priority order and keeps the first usable record.
pub struct FallbackCoordinator<F: Fetcher> {
    fetcher: F,
}

impl<F: Fetcher> FallbackCoordinator<F> {
    pub fn new(fetcher: F) -> Self {
        FallbackCoordinator { fetcher }
    }

    pub fn fetcher(&self) -> &F {
        &self.fetcher
    }

    pub fn into_fetcher(self) -> F {
        self.fetcher
    }

    /// First non-empty record wins; later sources are not contacted.
    /// `None` once every source has been tried.
    pub fn resolve(&mut self, ticker: &Ticker, sources: &[SourceSpec]) -> Option<SourceResult> {
        for source in sources {
            let outcome = self.fetcher.fetch(source, ticker);
            match &outcome.status {
                FetchStatus::Success => {}
                FetchStatus::NotFound => {
                    info!("{}: no page for {ticker}, trying next source", source.id);
                    continue;
                }
                FetchStatus::Error(msg) => {
                    warn!("{}: {ticker} failed ({msg}), trying next source", source.id);
                    continue;
                }
            }

            let record = extract(source, &outcome.payload);
            if record.is_empty() {
                info!("{}: no fields found for {ticker}", source.id);
                continue;
            }

            info!(
                "{}: resolved {ticker} ({}/{} fields)",
                source.id,
                record.found_count(),
                record.len()
            );
            return Some(SourceResult {
                source: source.id.clone(),
                record,
            });
        }
        None
    }
}
