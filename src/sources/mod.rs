/*

SPDX-License-Identifier: AGPL-3.0-only
Copyright (c) 2025 Augustus Rizza

*/

use std::collections::HashSet;
use std::fs;
use std::path::Path;

use log::info;
use serde::{Deserialize, Serialize};

use crate::errors::CrawlError;
use crate::export::TICKER_COLUMN;

pub mod alpha_vantage;
pub mod fmp_esg;
pub mod yahoo_sustainability;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PayloadKind {
    /// Field keys are label texts; the value is the next element's text.
    Html,
    /// Field keys are dot paths; numeric segments index arrays.
    Json,
}

/// How a source expects its API key.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum AuthSpec {
    #[default]
    None,
    Bearer {
        key_env: String,
    },
    Header {
        name: String,
        key_env: String,
    },
    Query {
        param: String,
        key_env: String,
    },
}

impl AuthSpec {
    /// Environment variable holding the key, if the source needs one.
    pub fn key_env(&self) -> Option<&str> {
        match self {
            AuthSpec::None => None,
            AuthSpec::Bearer { key_env }
            | AuthSpec::Header { key_env, .. }
            | AuthSpec::Query { key_env, .. } => Some(key_env),
        }
    }
}

/// (canonical name, lookup key) pair.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FieldMapping {
    pub name: String,
    pub key: String,
}

/// Ordered canonical-name → lookup-key table for one source.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct FieldSchema(Vec<FieldMapping>);

impl FieldSchema {
    pub fn new<I, N, K>(pairs: I) -> Self
    where
        I: IntoIterator<Item = (N, K)>,
        N: Into<String>,
        K: Into<String>,
    {
        FieldSchema(
            pairs
                .into_iter()
                .map(|(n, k)| FieldMapping {
                    name: n.into(),
                    key: k.into(),
                })
                .collect(),
        )
    }

    pub fn iter(&self) -> impl Iterator<Item = &FieldMapping> {
        self.0.iter()
    }

    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.0.iter().map(|m| m.name.as_str())
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

/// Everything needed to fetch and read one data source.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SourceSpec {
    pub id: String,
    pub kind: PayloadKind,
    /// URL template; `{ticker}`, `{start}`, `{end}` and `{api_key}` are substituted.
    pub url: String,
    #[serde(default)]
    pub query: Vec<(String, String)>,
    #[serde(default)]
    pub auth: AuthSpec,
    pub fields: FieldSchema,
}

impl SourceSpec {
    pub fn validate(&self) -> Result<(), CrawlError> {
        let bad = |reason: &str| -> Result<(), CrawlError> {
            Err(CrawlError::invalid_source(&self.id, reason))
        };

        if self.id.trim().is_empty() {
            return Err(CrawlError::invalid_source("<unnamed>", "empty id"));
        }
        if !(self.url.starts_with("http://") || self.url.starts_with("https://")) {
            return bad("url must be http(s)");
        }
        let mentions_ticker = self.url.contains("{ticker}")
            || self.query.iter().any(|(_, v)| v.contains("{ticker}"));
        if !mentions_ticker {
            return bad("neither url nor query mentions {ticker}");
        }
        if self.fields.is_empty() {
            return bad("field schema is empty");
        }
        let mut seen = HashSet::new();
        for m in self.fields.iter() {
            if m.name.trim().is_empty() || m.key.trim().is_empty() {
                return bad("field name and key must be non-empty");
            }
            if m.name == TICKER_COLUMN {
                return Err(CrawlError::invalid_source(
                    &self.id,
                    format!("field name `{TICKER_COLUMN}` is reserved for the ticker column"),
                ));
            }
            if !seen.insert(m.name.as_str()) {
                return Err(CrawlError::invalid_source(
                    &self.id,
                    format!("duplicate field `{}`", m.name),
                ));
            }
            if self.kind == PayloadKind::Json && m.key.split('.').any(|seg| seg.is_empty()) {
                return Err(CrawlError::invalid_source(
                    &self.id,
                    format!("json path `{}` has an empty segment", m.key),
                ));
            }
        }
        if let AuthSpec::Header { name, .. } | AuthSpec::Query { param: name, .. } = &self.auth {
            if name.trim().is_empty() {
                return bad("auth header/param name is empty");
            }
        }
        if self.auth.key_env().is_some_and(|k| k.trim().is_empty()) {
            return bad("auth key_env is empty");
        }
        Ok(())
    }
}

/// Values substituted into URL and query templates.
#[derive(Debug, Clone, Default)]
pub struct TemplateVars<'a> {
    pub ticker: &'a str,
    pub start: &'a str,
    pub end: &'a str,
    pub api_key: Option<&'a str>,
}

pub fn render_template(tpl: &str, vars: &TemplateVars<'_>) -> String {
    tpl.replace("{ticker}", vars.ticker)
        .replace("{start}", vars.start)
        .replace("{end}", vars.end)
        .replace("{api_key}", vars.api_key.unwrap_or(""))
}

/// Sources in the order they are tried.
#[derive(Debug, Clone)]
pub struct SourceRegistry {
    list: Vec<SourceSpec>,
}

impl SourceRegistry {
    /// Validate every spec and reject duplicate ids.
    pub fn new(list: Vec<SourceSpec>) -> Result<Self, CrawlError> {
        if list.is_empty() {
            return Err(CrawlError::NoSources);
        }
        let mut ids = HashSet::new();
        for s in &list {
            s.validate()?;
            if !ids.insert(s.id.clone()) {
                return Err(CrawlError::invalid_source(&s.id, "duplicate source id"));
            }
        }
        Ok(SourceRegistry { list })
    }

    /// Yahoo page first, then the two JSON APIs.
    pub fn builtin() -> Self {
        SourceRegistry {
            list: vec![
                yahoo_sustainability::spec(),
                fmp_esg::spec(),
                alpha_vantage::spec(),
            ],
        }
    }

    /// Load a JSON array of source specs.
    pub fn from_json_file(path: &Path) -> Result<Self, CrawlError> {
        let text = fs::read_to_string(path)?;
        let list: Vec<SourceSpec> = serde_json::from_str(&text)?;
        let reg = Self::new(list)?;
        info!(
            "Loaded {} source(s) from {}: {}",
            reg.list.len(),
            path.display(),
            reg.source_list().join(", ")
        );
        Ok(reg)
    }

    pub fn priority_order(&self) -> &[SourceSpec] {
        &self.list
    }

    pub fn source_list(&self) -> Vec<String> {
        self.list.iter().map(|s| s.id.clone()).collect()
    }

    pub fn get_source(&self, id: &str) -> Option<&SourceSpec> {
        self.list.iter().find(|s| s.id == id)
    }

    /// Union of all schema names, first appearance wins the position.
    pub fn canonical_fields(&self) -> Vec<String> {
        let mut seen = HashSet::new();
        let mut out = Vec::new();
        for s in &self.list {
            for n in s.fields.names() {
                if seen.insert(n) {
                    out.push(n.to_string());
                }
            }
        }
        out
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn json_spec(id: &str) -> SourceSpec {
        SourceSpec {
            id: id.into(),
            kind: PayloadKind::Json,
            url: "https://api.example.com/v1/{ticker}".into(),
            query: vec![],
            auth: AuthSpec::None,
            fields: FieldSchema::new([("marketCap", "data.cap")]),
        }
    }

    #[test]
    fn builtin_registry_is_valid() {
        let reg = SourceRegistry::builtin();
        SourceRegistry::new(reg.priority_order().to_vec()).unwrap();
        assert_eq!(
            reg.source_list(),
            vec!["yahoo_sustainability", "fmp_esg", "alpha_vantage_overview"]
        );
    }

    #[test]
    fn canonical_fields_keep_first_position() {
        let mut a = json_spec("a");
        a.fields = FieldSchema::new([("x", "x"), ("y", "y")]);
        let mut b = json_spec("b");
        b.fields = FieldSchema::new([("y", "yy"), ("z", "z")]);
        let reg = SourceRegistry::new(vec![a, b]).unwrap();
        assert_eq!(reg.canonical_fields(), vec!["x", "y", "z"]);
    }

    #[test]
    fn rejects_duplicate_ids() {
        let err = SourceRegistry::new(vec![json_spec("a"), json_spec("a")]).unwrap_err();
        assert!(matches!(err, CrawlError::InvalidSource { .. }));
    }

    #[test]
    fn rejects_empty_registry() {
        assert!(matches!(SourceRegistry::new(vec![]), Err(CrawlError::NoSources)));
    }

    #[test]
    fn rejects_spec_without_ticker_placeholder() {
        let mut s = json_spec("a");
        s.url = "https://api.example.com/v1/quote".into();
        assert!(s.validate().is_err());
        s.query = vec![("symbol".into(), "{ticker}".into())];
        assert!(s.validate().is_ok());
    }

    #[test]
    fn rejects_bad_json_path_and_duplicate_names() {
        let mut s = json_spec("a");
        s.fields = FieldSchema::new([("cap", "data..cap")]);
        assert!(s.validate().is_err());
        s.fields = FieldSchema::new([("cap", "a"), ("cap", "b")]);
        assert!(s.validate().is_err());
    }

    #[test]
    fn rejects_field_named_like_ticker_column() {
        let mut s = json_spec("custom");
        s.fields = FieldSchema::new([("Ticker", "Symbol"), ("marketCap", "cap")]);
        let err = SourceRegistry::new(vec![s]).unwrap_err();
        match err {
            CrawlError::InvalidSource { source_id, reason } => {
                assert_eq!(source_id, "custom");
                assert!(reason.contains("Ticker"));
            }
            other => panic!("expected invalid source, got {other:?}"),
        }
    }

    #[test]
    fn template_substitution() {
        let vars = TemplateVars {
            ticker: "AAPL",
            start: "2024-01-01",
            end: "2024-12-31",
            api_key: Some("k"),
        };
        assert_eq!(
            render_template("/{ticker}?from={start}&to={end}&k={api_key}", &vars),
            "/AAPL?from=2024-01-01&to=2024-12-31&k=k"
        );
    }

    #[test]
    fn specs_parse_from_json() {
        let text = r#"[{
            "id": "custom",
            "kind": "json",
            "url": "https://example.com/q",
            "query": [["symbol", "{ticker}"]],
            "auth": {"type": "bearer", "key_env": "CUSTOM_KEY"},
            "fields": [{"name": "marketCap", "key": "quote.marketCap"}]
        }]"#;
        let list: Vec<SourceSpec> = serde_json::from_str(text).unwrap();
        let reg = SourceRegistry::new(list).unwrap();
        let s = reg.get_source("custom").unwrap();
        assert_eq!(s.auth.key_env(), Some("CUSTOM_KEY"));
        assert_eq!(reg.canonical_fields(), vec!["marketCap"]);
    }
}
