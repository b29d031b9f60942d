/*

SPDX-License-Identifier: AGPL-3.0-only
Copyright (c) 2025 Augustus Rizza

*/

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::ticker::Ticker;

/// Placeholder for a field the source did not provide.
pub const MISSING: &str = "N/A";

/// Field values extracted from one (ticker, source) attempt.
///
/// Order follows the source schema. Values are never empty: anything blank is
/// stored as [`MISSING`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FieldRecord {
    fields: Vec<(String, String)>,
}

impl FieldRecord {
    pub fn from_pairs<I, K, V>(pairs: I) -> Self
    where
        I: IntoIterator<Item = (K, V)>,
        K: Into<String>,
        V: Into<String>,
    {
        let fields = pairs
            .into_iter()
            .map(|(k, v)| {
                let v: String = v.into();
                let v = if v.trim().is_empty() {
                    MISSING.to_string()
                } else {
                    v
                };
                (k.into(), v)
            })
            .collect();
        FieldRecord { fields }
    }

    /// Value for `name`, or [`MISSING`] when the record does not carry it.
    pub fn get(&self, name: &str) -> &str {
        self.fields
            .iter()
            .find(|(k, _)| k == name)
            .map(|(_, v)| v.as_str())
            .unwrap_or(MISSING)
    }

    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.fields.iter().map(|(k, _)| k.as_str())
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.fields.iter().map(|(k, v)| (k.as_str(), v.as_str()))
    }

    pub fn len(&self) -> usize {
        self.fields.len()
    }

    pub fn is_empty(&self) -> bool {
        self.fields.iter().all(|(_, v)| v == MISSING)
    }

    pub fn found_count(&self) -> usize {
        self.fields.iter().filter(|(_, v)| v != MISSING).count()
    }

    /// Flat JSON object, one string member per field.
    pub fn to_json(&self) -> Value {
        let mut obj = Map::with_capacity(self.fields.len());
        for (k, v) in &self.fields {
            obj.insert(k.clone(), Value::String(v.clone()));
        }
        Value::Object(obj)
    }
}

/// A usable record together with the source that produced it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SourceResult {
    pub source: String,
    pub record: FieldRecord,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "state", rename_all = "snake_case")]
pub enum BatchEntry {
    Resolved {
        ticker: Ticker,
        source: String,
        record: FieldRecord,
    },
    Failed {
        ticker: Ticker,
        message: String,
    },
}

impl BatchEntry {
    pub fn ticker(&self) -> &Ticker {
        match self {
            BatchEntry::Resolved { ticker, .. } | BatchEntry::Failed { ticker, .. } => ticker,
        }
    }

    pub fn record(&self) -> Option<&FieldRecord> {
        match self {
            BatchEntry::Resolved { record, .. } => Some(record),
            BatchEntry::Failed { .. } => None,
        }
    }

    pub fn source(&self) -> Option<&str> {
        match self {
            BatchEntry::Resolved { source, .. } => Some(source),
            BatchEntry::Failed { .. } => None,
        }
    }

    pub fn is_failed(&self) -> bool {
        matches!(self, BatchEntry::Failed { .. })
    }
}

/// One entry per requested ticker, in input order.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct BatchResult {
    pub entries: Vec<BatchEntry>,
}

impl BatchResult {
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn failures(&self) -> impl Iterator<Item = &BatchEntry> {
        self.entries.iter().filter(|e| e.is_failed())
    }

    pub fn resolved_count(&self) -> usize {
        self.entries.len() - self.failures().count()
    }
}
