/*

SPDX-License-Identifier: AGPL-3.0-only
Copyright (c) 2025 Augustus Rizza

*/

use std::thread;
use std::time::{Duration, Instant};

use log::{debug, warn};
use reqwest::StatusCode;
use reqwest::blocking::Client;
use reqwest::header::{ACCEPT, HeaderMap, HeaderValue, USER_AGENT};

use crate::config::CrawlerConfig;
use crate::errors::CrawlError;
use crate::sources::{AuthSpec, SourceSpec, TemplateVars, render_template};
use crate::ticker::Ticker;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FetchStatus {
    Success,
    NotFound,
    /// Any other status, transport failure or timeout.
    Error(String),
}

/// Raw body plus status class. The body is empty unless `status` is `Success`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FetchOutcome {
    pub payload: String,
    pub status: FetchStatus,
}

impl FetchOutcome {
    pub fn success(payload: impl Into<String>) -> Self {
        FetchOutcome {
            payload: payload.into(),
            status: FetchStatus::Success,
        }
    }

    pub fn not_found() -> Self {
        FetchOutcome {
            payload: String::new(),
            status: FetchStatus::NotFound,
        }
    }

    pub fn error(msg: impl Into<String>) -> Self {
        FetchOutcome {
            payload: String::new(),
            status: FetchStatus::Error(msg.into()),
        }
    }

    pub fn is_success(&self) -> bool {
        self.status == FetchStatus::Success
    }
}

pub trait Fetcher {
    /// One GET against `source` for `ticker`. Never retries.
    fn fetch(&mut self, source: &SourceSpec, ticker: &Ticker) -> FetchOutcome;
}

/// Enforces a fixed gap between consecutive calls. The first call is free.
#[derive(Debug)]
pub struct Pacer {
    delay: Duration,
    last: Option<Instant>,
}

impl Pacer {
    pub fn new(delay: Duration) -> Self {
        Pacer { delay, last: None }
    }

    pub fn wait(&mut self) {
        if let Some(prev) = self.last {
            let since = prev.elapsed();
            if since < self.delay {
                thread::sleep(self.delay - since);
            }
        }
        self.last = Some(Instant::now());
    }
}

/// Blocking reqwest fetcher configured from [`CrawlerConfig`].
pub struct HttpFetcher {
    http: Client,
    config: CrawlerConfig,
    pacer: Pacer,
}

impl HttpFetcher {
    pub fn new(config: CrawlerConfig) -> Result<Self, CrawlError> {
        let mut headers = HeaderMap::new();
        headers.insert(ACCEPT, HeaderValue::from_static("*/*"));
        let ua = HeaderValue::from_str(&config.user_agent).map_err(|e| {
            CrawlError::Config(format!("invalid user agent `{}`: {e}", config.user_agent))
        })?;
        headers.insert(USER_AGENT, ua);

        let http = Client::builder()
            .default_headers(headers)
            .timeout(config.timeout)
            .build()?;

        Ok(Self {
            http,
            pacer: Pacer::new(config.request_delay),
            config,
        })
    }

    /// URL and query pairs with every placeholder filled in.
    pub fn build_request_parts(
        &self,
        source: &SourceSpec,
        ticker: &Ticker,
    ) -> (String, Vec<(String, String)>) {
        let vars = TemplateVars {
            ticker: ticker.as_str(),
            start: &self.config.start,
            end: &self.config.end,
            api_key: self.config.api_key_for(&source.auth),
        };
        let url = render_template(&source.url, &vars);
        let mut query: Vec<(String, String)> = source
            .query
            .iter()
            .map(|(k, v)| (k.clone(), render_template(v, &vars)))
            .collect();
        if let (AuthSpec::Query { param, .. }, Some(key)) = (&source.auth, vars.api_key) {
            query.push((param.clone(), key.to_string()));
        }
        (url, query)
    }
}

impl Fetcher for HttpFetcher {
    fn fetch(&mut self, source: &SourceSpec, ticker: &Ticker) -> FetchOutcome {
        if !self.config.has_key_for(&source.auth) {
            return FetchOutcome::error(format!(
                "no api key configured ({})",
                source.auth.key_env().unwrap_or("?")
            ));
        }

        let (url, query) = self.build_request_parts(source, ticker);
        let mut req = self.http.get(&url).query(&query);
        match (&source.auth, self.config.api_key_for(&source.auth)) {
            (AuthSpec::Bearer { .. }, Some(key)) => req = req.bearer_auth(key),
            (AuthSpec::Header { name, .. }, Some(key)) => req = req.header(name.as_str(), key),
            _ => {}
        }

        self.pacer.wait();
        debug!("GET {url} [{}] for {ticker}", source.id);

        let resp = match req.send() {
            Ok(r) => r,
            Err(e) => {
                warn!("{}: request for {ticker} failed: {e}", source.id);
                return FetchOutcome::error(format!("request error: {e}"));
            }
        };

        let status = resp.status();
        if status == StatusCode::NOT_FOUND {
            warn!("{}: {ticker} not found (404)", source.id);
            return FetchOutcome::not_found();
        }
        if !status.is_success() {
            warn!("{}: {ticker} answered with status {status}", source.id);
            return FetchOutcome::error(format!("http status {status}"));
        }

        match resp.text() {
            Ok(body) => {
                debug!("{}: {} bytes for {ticker}", source.id, body.len());
                FetchOutcome::success(body)
            }
            Err(e) => {
                warn!("{}: reading body for {ticker} failed: {e}", source.id);
                FetchOutcome::error(format!("body read error: {e}"))
            }
        }
    }
}
