/*

SPDX-License-Identifier: AGPL-3.0-only
Copyright (c) 2025 Augustus Rizza

*/

// Yahoo Finance sustainability page, scraped by label text.

use super::{AuthSpec, FieldSchema, PayloadKind, SourceSpec};

pub const ID: &str = "yahoo_sustainability";

const LABELS: [(&str, &str); 12] = [
    ("waterUsage", "Water Usage"),
    ("materialUsage", "Material Usage"),
    ("wasteManagement", "Waste Management"),
    ("energyUsage", "Energy Usage"),
    ("pollutionIncidents", "Pollution Incidents"),
    ("workforceDiversity", "Workforce Diversity"),
    ("fairCompensation", "Fair Compensation"),
    ("employeeWelfare", "Employee Welfare"),
    ("boardComposition", "Board Composition"),
    ("executiveCompensation", "Executive Compensation"),
    ("dataPrivacy", "Data Privacy"),
    ("ethicalDecisionMaking", "Ethical Decision Making"),
];

pub fn spec() -> SourceSpec {
    SourceSpec {
        id: ID.to_string(),
        kind: PayloadKind::Html,
        url: "https://finance.yahoo.com/quote/{ticker}/sustainability".to_string(),
        query: Vec::new(),
        auth: AuthSpec::None,
        fields: FieldSchema::new(LABELS),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn covers_all_twelve_metrics() {
        let s = spec();
        assert_eq!(s.fields.len(), 12);
        assert!(s.fields.names().any(|n| n == "dataPrivacy"));
        s.validate().unwrap();
    }
}
