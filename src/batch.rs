/*

SPDX-License-Identifier: AGPL-3.0-only
Copyright (c) 2025 Augustus Rizza

*/

use log::{info, warn};

use crate::coordinator::FallbackCoordinator;
use crate::fetcher::Fetcher;
use crate::record::{BatchEntry, BatchResult};
use crate::sources::SourceRegistry;
use crate::ticker::Ticker;

/// Emitted after each ticker.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Progress {
    pub completed: usize,
    pub total: usize,
}

impl Progress {
    /// `round(100 * completed / total)`; 100 for an empty batch.
    pub fn percent(&self) -> u32 {
        if self.total == 0 {
            return 100;
        }
        (100.0 * self.completed as f64 / self.total as f64).round() as u32
    }
}

pub struct BatchDriver<F: Fetcher> {
    coordinator: FallbackCoordinator<F>,
    registry: SourceRegistry,
}

impl<F: Fetcher> BatchDriver<F> {
    pub fn new(fetcher: F, registry: SourceRegistry) -> Self {
        BatchDriver {
            coordinator: FallbackCoordinator::new(fetcher),
            registry,
        }
    }

    pub fn registry(&self) -> &SourceRegistry {
        &self.registry
    }

    pub fn into_fetcher(self) -> F {
        self.coordinator.into_fetcher()
    }

    /// Like [`run_with_progress`](Self::run_with_progress), logging progress.
    pub fn run(&mut self, tickers: &[Ticker]) -> BatchResult {
        self.run_with_progress(tickers, |p| {
            info!("Progress: {}/{} ({}%)", p.completed, p.total, p.percent());
        })
    }

    /// Resolve every ticker in order. A ticker with no usable source becomes
    /// a `Failed` entry; the batch always runs to the end.
    pub fn run_with_progress<P>(&mut self, tickers: &[Ticker], mut on_progress: P) -> BatchResult
    where
        P: FnMut(Progress),
    {
        let total = tickers.len();
        let mut entries = Vec::with_capacity(total);

        for (i, ticker) in tickers.iter().enumerate() {
            let sources = self.registry.priority_order();
            let entry = match self.coordinator.resolve(ticker, sources) {
                Some(res) => BatchEntry::Resolved {
                    ticker: ticker.clone(),
                    source: res.source,
                    record: res.record,
                },
                None => {
                    let message = format!(
                        "no usable data for {ticker} from any source ({})",
                        self.registry.source_list().join(", ")
                    );
                    warn!("{message}");
                    BatchEntry::Failed {
                        ticker: ticker.clone(),
                        message,
                    }
                }
            };
            entries.push(entry);

            on_progress(Progress {
                completed: i + 1,
                total,
            });
        }

        BatchResult { entries }
    }
}
