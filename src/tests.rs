/*

SPDX-License-Identifier: AGPL-3.0-only
Copyright (c) 2025 Augustus Rizza

*/
#[cfg(test)]
pub mod tests {
    use std::collections::HashSet;
    use std::fs;

    use crate::batch::BatchDriver;
    use crate::export::{ExportFormat, write_batch};
    use crate::fetcher::{FetchOutcome, Fetcher};
    use crate::sources::{SourceRegistry, SourceSpec, alpha_vantage, fmp_esg, yahoo_sustainability};
    use crate::ticker::{Ticker, parse_ticker_list};

    const YAHOO_PAGE: &str = r#"
        <html><body><div id="esg">
          <div><span>Water Usage</span><span>Low</span></div>
          <div><span>Data Privacy</span><span>High</span></div>
        </div></body></html>
    "#;

    /// Canned responses keyed by source id; anything else gets a 404.
    struct FixtureFetcher {
        calls: Vec<(String, String)>,
    }

    impl Fetcher for FixtureFetcher {
        fn fetch(&mut self, source: &SourceSpec, ticker: &Ticker) -> FetchOutcome {
            self.calls.push((source.id.clone(), ticker.to_string()));
            match (source.id.as_str(), ticker.as_str()) {
                (yahoo_sustainability::ID, "MSFT") => FetchOutcome::success(YAHOO_PAGE),
                // the page exists but carries no ESG panel
                (yahoo_sustainability::ID, "TSLA") => {
                    FetchOutcome::success("<html><body>Sustainability</body></html>")
                }
                (fmp_esg::ID, "TSLA") => FetchOutcome::success(
                    r#"[{"environmentalScore": 40.1, "socialScore": 30, "ESGScore": 35.5}]"#,
                ),
                (alpha_vantage::ID, "ZZZZ") => FetchOutcome::success(r#"{"Information": "rate limit"}"#),
                _ => FetchOutcome::not_found(),
            }
        }
    }

    #[test]
    fn builtin_pipeline_end_to_end() {
        let registry = SourceRegistry::builtin();
        let fields = registry.canonical_fields();
        let tickers = parse_ticker_list("msft, tsla zzzz").unwrap();

        let mut driver = BatchDriver::new(FixtureFetcher { calls: vec![] }, registry);
        let mut percents = Vec::new();
        let result = driver.run_with_progress(&tickers, |p| percents.push(p.percent()));

        assert_eq!(percents, vec![33, 67, 100]);
        assert_eq!(result.entries[0].source(), Some(yahoo_sustainability::ID));
        assert_eq!(result.entries[0].record().unwrap().get("dataPrivacy"), "High");
        assert_eq!(result.entries[1].source(), Some(fmp_esg::ID));
        assert_eq!(result.entries[1].record().unwrap().get("esgScore"), "35.5");
        assert!(result.entries[2].is_failed());

        let fetcher = driver.into_fetcher();
        let msft_calls = fetcher.calls.iter().filter(|(_, t)| t == "MSFT").count();
        assert_eq!(msft_calls, 1);
        let zzzz_calls = fetcher.calls.iter().filter(|(_, t)| t == "ZZZZ").count();
        assert_eq!(zzzz_calls, 3);

        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("esg.csv");
        let df = write_batch(&result, &fields, &path, ExportFormat::Csv).unwrap();

        assert_eq!(df.height(), tickers.len());
        let columns: HashSet<String> = df
            .get_column_names()
            .iter()
            .map(|s| s.to_string())
            .collect();
        let mut expected: HashSet<String> = fields.iter().cloned().collect();
        expected.insert("Ticker".to_string());
        assert_eq!(columns, expected);

        let text = fs::read_to_string(&path).unwrap();
        assert_eq!(text.lines().count(), tickers.len() + 1);
    }
}
