/*

SPDX-License-Identifier: AGPL-3.0-only
Copyright (c) 2025 Augustus Rizza

*/

use log::warn;
use scraper::{ElementRef, Html, Node};
use serde_json::Value;

use crate::record::{FieldRecord, MISSING};
use crate::sources::{FieldSchema, PayloadKind, SourceSpec};

/// Read every schema field out of `payload`. Never fails: anything that
/// cannot be found, including an unparseable payload, becomes `N/A`.
pub fn extract(source: &SourceSpec, payload: &str) -> FieldRecord {
    match source.kind {
        PayloadKind::Html => extract_html(&source.fields, payload),
        PayloadKind::Json => match serde_json::from_str::<Value>(payload) {
            Ok(doc) => extract_json(&source.fields, &doc),
            Err(e) => {
                if !payload.trim().is_empty() {
                    warn!("{}: payload is not valid json: {e}", source.id);
                }
                all_missing(&source.fields)
            }
        },
    }
}

pub fn extract_html(schema: &FieldSchema, html: &str) -> FieldRecord {
    let doc = Html::parse_document(html);
    FieldRecord::from_pairs(schema.iter().map(|m| {
        let v = value_after_label(&doc, &m.key).unwrap_or_else(|| MISSING.to_string());
        (m.name.clone(), v)
    }))
}

pub fn extract_json(schema: &FieldSchema, doc: &Value) -> FieldRecord {
    FieldRecord::from_pairs(schema.iter().map(|m| {
        let v = lookup_path(doc, &m.key)
            .and_then(scalar_text)
            .unwrap_or_else(|| MISSING.to_string());
        (m.name.clone(), v)
    }))
}

fn all_missing(schema: &FieldSchema) -> FieldRecord {
    FieldRecord::from_pairs(schema.names().map(|n| (n.to_string(), MISSING)))
}

/// Text of the first element that follows, in document order, the first
/// text node reading exactly `label`.
fn value_after_label(doc: &Html, label: &str) -> Option<String> {
    let want = norm_text(label);
    let mut nodes = doc.tree.root().descendants();

    nodes.find(|n| match n.value() {
        Node::Text(t) => norm_text(t) == want,
        _ => false,
    })?;

    let next = nodes.find_map(ElementRef::wrap)?;
    let text = norm_text(&next.text().collect::<String>());
    if text.is_empty() { None } else { Some(text) }
}

/// Dot-separated walk; numeric segments index arrays.
fn lookup_path<'a>(doc: &'a Value, path: &str) -> Option<&'a Value> {
    path.split('.').try_fold(doc, |cur, seg| match cur {
        Value::Object(map) => map.get(seg),
        Value::Array(items) => seg.parse::<usize>().ok().and_then(|i| items.get(i)),
        _ => None,
    })
}

fn scalar_text(v: &Value) -> Option<String> {
    let s = match v {
        Value::String(s) => s.trim().to_string(),
        Value::Number(n) => n.to_string(),
        Value::Bool(b) => b.to_string(),
        Value::Null | Value::Array(_) | Value::Object(_) => return None,
    };
    if s.is_empty() { None } else { Some(s) }
}

/// Collapse whitespace & trim
fn norm_text(s: &str) -> String {
    let mut out = String::with_capacity(s.len());
    let mut prev_space = false;
    for ch in s.chars() {
        if ch.is_whitespace() {
            if !prev_space {
                out.push(' ');
                prev_space = true;
            }
        } else {
            out.push(ch);
            prev_space = false;
        }
    }
    out.trim().to_string()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sources::{AuthSpec, yahoo_sustainability};
    use serde_json::json;

    const PAGE: &str = r#"
        <html><body>
          <section>
            <div><span>Water Usage</span><span> Low </span></div>
            <div><span>Energy Usage</span><span>Medium</span></div>
            <div><span>Data Privacy</span><span>   </span></div>
            <table>
              <tr><td>Board Composition</td><td><b>Severe</b> risk</td></tr>
            </table>
          </section>
        </body></html>
    "#;

    fn json_source(fields: FieldSchema) -> SourceSpec {
        SourceSpec {
            id: "json".into(),
            kind: PayloadKind::Json,
            url: "https://example.com/{ticker}".into(),
            query: vec![],
            auth: AuthSpec::None,
            fields,
        }
    }

    #[test]
    fn html_reads_element_after_label() {
        let rec = extract(&yahoo_sustainability::spec(), PAGE);
        assert_eq!(rec.get("waterUsage"), "Low");
        assert_eq!(rec.get("energyUsage"), "Medium");
        assert_eq!(rec.get("boardComposition"), "Severe risk");
        assert_eq!(rec.len(), 12);
    }

    #[test]
    fn html_missing_and_blank_are_sentinel() {
        let rec = extract(&yahoo_sustainability::spec(), PAGE);
        assert_eq!(rec.get("materialUsage"), MISSING);
        assert_eq!(rec.get("dataPrivacy"), MISSING);
    }

    #[test]
    fn html_label_with_nothing_after() {
        let schema = FieldSchema::new([("x", "Last")]);
        let rec = extract_html(&schema, "<p>Last</p>");
        assert_eq!(rec.get("x"), MISSING);
    }

    #[test]
    fn html_garbage_is_all_missing() {
        let rec = extract(&yahoo_sustainability::spec(), "<<not html at all");
        assert!(rec.is_empty());
    }

    #[test]
    fn json_paths_and_array_index() {
        let src = json_source(FieldSchema::new([
            ("env", "0.environmentalScore"),
            ("name", "0.profile.name"),
            ("flag", "0.active"),
            ("nothing", "0.missing"),
            ("nul", "0.nul"),
            ("obj", "0.profile"),
            ("blank", "0.blank"),
            ("oob", "3.environmentalScore"),
        ]));
        let payload = json!([{
            "environmentalScore": 61.5,
            "profile": {"name": " Apple Inc. "},
            "active": true,
            "nul": null,
            "blank": ""
        }])
        .to_string();
        let rec = extract(&src, &payload);
        assert_eq!(rec.get("env"), "61.5");
        assert_eq!(rec.get("name"), "Apple Inc.");
        assert_eq!(rec.get("flag"), "true");
        for f in ["nothing", "nul", "obj", "blank", "oob"] {
            assert_eq!(rec.get(f), MISSING, "field {f}");
        }
    }

    #[test]
    fn invalid_json_is_all_missing() {
        let src = json_source(FieldSchema::new([("a", "a"), ("b", "b")]));
        let rec = extract(&src, "{ not json");
        assert!(rec.is_empty());
        assert_eq!(rec.len(), 2);
        assert!(extract(&src, "").is_empty());
    }

    #[test]
    fn reextracting_missing_record_is_stable() {
        let schema = FieldSchema::new([("a", "a"), ("b", "b"), ("c", "c")]);
        let src = json_source(schema);
        let first = extract(&src, r#"{"a": "kept"}"#);
        let again = extract(&src, &first.to_json().to_string());
        assert_eq!(first, again);
        assert_eq!(again.get("b"), MISSING);
    }
}
