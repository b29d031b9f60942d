/*

SPDX-License-Identifier: AGPL-3.0-only
Copyright (c) 2025 Augustus Rizza

*/

use std::collections::HashMap;
use std::env;
use std::path::PathBuf;
use std::time::Duration as StdDuration;

use log::{info, warn};
use time::macros::format_description;
use time::{Date, Duration, OffsetDateTime};

use crate::errors::CrawlError;
use crate::sources::{AuthSpec, SourceRegistry};

pub const DEFAULT_USER_AGENT: &str = "esg-crawler/0.1";
pub const DEFAULT_DELAY: StdDuration = StdDuration::from_secs(1);
pub const DEFAULT_TIMEOUT: StdDuration = StdDuration::from_secs(20);
pub const DEFAULT_RANGE_DAYS: i64 = 365;

/// Everything the fetcher needs, resolved once at startup.
#[derive(Debug, Clone)]
pub struct CrawlerConfig {
    pub user_agent: String,
    pub timeout: StdDuration,
    /// Minimum spacing between two outbound calls.
    pub request_delay: StdDuration,
    /// `YYYY-MM-DD`, substituted for `{start}`.
    pub start: String,
    /// `YYYY-MM-DD`, substituted for `{end}`.
    pub end: String,
    credentials: HashMap<String, String>,
}

impl Default for CrawlerConfig {
    fn default() -> Self {
        let (start, end) = default_last_days(DEFAULT_RANGE_DAYS);
        CrawlerConfig {
            user_agent: DEFAULT_USER_AGENT.to_string(),
            timeout: DEFAULT_TIMEOUT,
            request_delay: DEFAULT_DELAY,
            start,
            end,
            credentials: HashMap::new(),
        }
    }
}

impl CrawlerConfig {
    /// Read every key the registry mentions from the process environment.
    /// A `.env` file in the working directory is honoured.
    pub fn from_env(registry: &SourceRegistry) -> Self {
        match dotenvy::dotenv() {
            Ok(p) => info!("Loaded environment from {}", p.display()),
            Err(e) if e.not_found() => {}
            Err(e) => warn!("Ignoring unreadable .env: {e}"),
        }

        let mut cfg = CrawlerConfig::default();
        for src in registry.priority_order() {
            let Some(var) = src.auth.key_env() else {
                continue;
            };
            match env::var(var) {
                Ok(v) if !v.trim().is_empty() => {
                    cfg.credentials.insert(var.to_string(), v.trim().to_string());
                }
                _ => warn!(
                    "{var} is not set; source `{}` will be skipped",
                    src.id
                ),
            }
        }
        cfg
    }

    pub fn with_credential(mut self, key_env: &str, value: &str) -> Self {
        self.credentials
            .insert(key_env.to_string(), value.to_string());
        self
    }

    pub fn with_delay(mut self, delay: StdDuration) -> Self {
        self.request_delay = delay;
        self
    }

    /// Override the `{start}`/`{end}` window. Either bound may be omitted.
    pub fn with_date_range(
        mut self,
        start: Option<&str>,
        end: Option<&str>,
    ) -> Result<Self, CrawlError> {
        if let Some(s) = start {
            self.start = parse_day(s)?.to_string();
        }
        if let Some(e) = end {
            self.end = parse_day(e)?.to_string();
        }
        if self.start > self.end {
            return Err(CrawlError::Config(format!(
                "start {} is after end {}",
                self.start, self.end
            )));
        }
        Ok(self)
    }

    /// `None` when the source needs no key or the key is not configured.
    pub fn api_key_for(&self, auth: &AuthSpec) -> Option<&str> {
        auth.key_env()
            .and_then(|var| self.credentials.get(var))
            .map(String::as_str)
    }

    pub fn has_key_for(&self, auth: &AuthSpec) -> bool {
        auth.key_env().is_none() || self.api_key_for(auth).is_some()
    }
}

/// `<config dir>/esg-crawler/sources.json`, if the platform has a config dir.
pub fn default_sources_path() -> Option<PathBuf> {
    dirs::config_dir().map(|d| d.join("esg-crawler").join("sources.json"))
}

fn parse_day(s: &str) -> Result<Date, CrawlError> {
    let t = s.trim();
    // accept RFC3339 by keeping only the date part
    let day = t.get(..10).unwrap_or(t);
    Date::parse(day, format_description!("[year]-[month]-[day]"))
        .map_err(|e| CrawlError::Config(format!("invalid date `{s}`: {e}")))
}

fn default_last_days(days: i64) -> (String, String) {
    let today = OffsetDateTime::now_utc().date();
    let from = today - Duration::days(days);
    (from.to_string(), today.to_string())
}
