/*

SPDX-License-Identifier: AGPL-3.0-only
Copyright (c) 2025 Augustus Rizza

*/

use super::{AuthSpec, FieldSchema, PayloadKind, SourceSpec};

pub const ID: &str = "fmp_esg";
pub const KEY_ENV: &str = "FMP_API_KEY";

/// Financial Modeling Prep ESG scores. The endpoint answers with an array of
/// filings, newest first, so every path reads element 0.
pub fn spec() -> SourceSpec {
    SourceSpec {
        id: ID.to_string(),
        kind: PayloadKind::Json,
        url: "https://financialmodelingprep.com/api/v4/esg-environmental-social-governance-data"
            .to_string(),
        query: vec![("symbol".to_string(), "{ticker}".to_string())],
        auth: AuthSpec::Query {
            param: "apikey".to_string(),
            key_env: KEY_ENV.to_string(),
        },
        fields: FieldSchema::new([
            ("environmentalScore", "0.environmentalScore"),
            ("socialScore", "0.socialScore"),
            ("governanceScore", "0.governanceScore"),
            ("esgScore", "0.ESGScore"),
        ]),
    }
}
