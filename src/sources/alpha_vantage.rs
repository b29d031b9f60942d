/*

SPDX-License-Identifier: AGPL-3.0-only
Copyright (c) 2025 Augustus Rizza

*/

use super::{AuthSpec, FieldSchema, PayloadKind, SourceSpec};

pub const ID: &str = "alpha_vantage_overview";
pub const KEY_ENV: &str = "ALPHA_VANTAGE_API_KEY";

/// Alpha Vantage company overview (fundamentals only, no ESG data).
pub fn spec() -> SourceSpec {
    SourceSpec {
        id: ID.to_string(),
        kind: PayloadKind::Json,
        url: "https://www.alphavantage.co/query".to_string(),
        query: vec![
            ("function".to_string(), "OVERVIEW".to_string()),
            ("symbol".to_string(), "{ticker}".to_string()),
        ],
        auth: AuthSpec::Query {
            param: "apikey".to_string(),
            key_env: KEY_ENV.to_string(),
        },
        fields: FieldSchema::new([
            ("companyName", "Name"),
            ("sector", "Sector"),
            ("industry", "Industry"),
            ("marketCap", "MarketCapitalization"),
            ("peRatio", "PERatio"),
        ]),
    }
}
