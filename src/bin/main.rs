/*
SPDX-License-Identifier: AGPL-3.0-only
Copyright (c) 2025 Augustus Rizza
*/

extern crate esg_crawler;

use std::path::PathBuf;
use std::time::Duration;

use anyhow::{Context, Result};
use clap::Parser;
use log::{error, info, warn};

use esg_crawler::config::{self, CrawlerConfig};
use esg_crawler::export::{self, ExportFormat};
use esg_crawler::ticker::gather_tickers;
use esg_crawler::{BatchDriver, BatchEntry, HttpFetcher, SourceRegistry};

#[derive(Debug, Parser)]
#[command(author, version, about = "Collect ESG and company data for a list of tickers")]
struct Args {
    /// Tickers, comma or space separated (repeatable)
    #[arg(short, long = "tickers", num_args = 1..)]
    tickers: Vec<String>,

    /// File with tickers, one or more per line, `#` comments allowed
    #[arg(long)]
    tickers_file: Option<PathBuf>,

    /// Output file
    #[arg(short, long, default_value = "esg_data.csv")]
    output: PathBuf,

    /// Output format; guessed from the output extension when omitted
    #[arg(long, value_enum)]
    format: Option<ExportFormat>,

    /// JSON file with source definitions, replacing the built-in list
    #[arg(long)]
    sources: Option<PathBuf>,

    /// Pause between outbound requests, in milliseconds
    #[arg(long, default_value_t = 1000)]
    delay_ms: u64,

    /// Per-request timeout, in seconds
    #[arg(long, default_value_t = 20)]
    timeout_secs: u64,

    /// User-Agent header sent to every source
    #[arg(long)]
    user_agent: Option<String>,

    /// Start of the `{start}` date window (YYYY-MM-DD)
    #[arg(long)]
    start: Option<String>,

    /// End of the `{end}` date window (YYYY-MM-DD)
    #[arg(long)]
    end: Option<String>,

    /// Print the configured sources in priority order and exit
    #[arg(long)]
    list_sources: bool,
}

fn main() {
    env_logger::builder()
        .format_timestamp_millis()
        .filter_level(log::LevelFilter::Info)
        .parse_default_env()
        .init();

    let args = Args::parse();
    if let Err(e) = run(args) {
        error!("{e:#}");
        std::process::exit(1);
    }
}

fn run(args: Args) -> Result<()> {
    let registry = load_registry(args.sources.as_ref())?;

    if args.list_sources {
        for (i, s) in registry.priority_order().iter().enumerate() {
            let fields: Vec<&str> = s.fields.names().collect();
            println!("{}. {} ({:?}) {}", i + 1, s.id, s.kind, fields.join(", "));
        }
        return Ok(());
    }

    let tickers = gather_tickers(&args.tickers, args.tickers_file.as_deref())
        .context("enter at least one ticker with --tickers or --tickers-file")?;

    let mut cfg = CrawlerConfig::from_env(&registry)
        .with_delay(Duration::from_millis(args.delay_ms))
        .with_date_range(args.start.as_deref(), args.end.as_deref())?;
    cfg.timeout = Duration::from_secs(args.timeout_secs);
    if let Some(ua) = args.user_agent {
        cfg.user_agent = ua;
    }

    info!(
        "Crawling {} ticker(s) via {}",
        tickers.len(),
        registry.source_list().join(" -> ")
    );

    let fetcher = HttpFetcher::new(cfg).context("building http client")?;
    let fields = registry.canonical_fields();
    let mut driver = BatchDriver::new(fetcher, registry);
    let result = driver.run(&tickers);

    for entry in &result.entries {
        match entry {
            BatchEntry::Resolved { ticker, source, record } => info!(
                "{ticker}: {}/{} fields from {source}",
                record.found_count(),
                record.len()
            ),
            BatchEntry::Failed { ticker, message } => warn!("{ticker}: {message}"),
        }
    }

    let format = args
        .format
        .unwrap_or_else(|| ExportFormat::from_path(&args.output));
    export::write_batch(&result, &fields, &args.output, format)
        .with_context(|| format!("writing {}", args.output.display()))?;

    info!(
        "Done: {} resolved, {} failed, saved to {}",
        result.resolved_count(),
        result.failures().count(),
        args.output.display()
    );
    Ok(())
}

/// `--sources`, else the user config file if present, else the built-ins.
fn load_registry(explicit: Option<&PathBuf>) -> Result<SourceRegistry> {
    if let Some(p) = explicit {
        return SourceRegistry::from_json_file(p)
            .with_context(|| format!("loading sources from {}", p.display()));
    }
    if let Some(p) = config::default_sources_path().filter(|p| p.is_file()) {
        return SourceRegistry::from_json_file(&p)
            .with_context(|| format!("loading sources from {}", p.display()));
    }
    Ok(SourceRegistry::builtin())
}
