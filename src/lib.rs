/*

SPDX-License-Identifier: AGPL-3.0-only
Copyright (c) 2025 Augustus Rizza

*/

pub mod batch;
pub mod config;
pub mod coordinator;
pub mod errors;
pub mod export;
pub mod extractor;
pub mod fetcher;
pub mod record;
pub mod sources;
pub mod ticker;

mod tests;

pub use batch::{BatchDriver, Progress};
pub use config::CrawlerConfig;
pub use errors::CrawlError;
pub use fetcher::{FetchOutcome, FetchStatus, Fetcher, HttpFetcher};
pub use record::{BatchEntry, BatchResult, FieldRecord, MISSING, SourceResult};
pub use sources::{SourceRegistry, SourceSpec};
pub use ticker::Ticker;
