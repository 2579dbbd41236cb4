//! Boundary adapter: upstream market documents → `ProviderRecord`.
//!
//! The upstream `marketAnalysis` rows are inconsistent: field names
//! vary between pipeline versions, some rows nest provider and market
//! attributes in sub-objects, and numbers sometimes arrive as strings.
//! All of that is resolved here and nowhere else.
//!
//! RULE: ingest never drops a row. Anything unreadable becomes the
//! documented default (0, "", "Unknown Specialty").

use crate::{
    catalog::is_placeholder_name,
    error::{ScoreError, ScoreResult},
    provider::{ProviderRecord, UNKNOWN_SPECIALTY},
};
use serde_json::{Map, Value};
use std::cmp::Ordering;

const PROVIDER_ID_KEYS: &[&str] = &["providerNPI", "topProviderNPI", "providerId", "npi", "NPI"];
const PROVIDER_NAME_KEYS: &[&str] = &["providerName", "topProvider", "name"];
const SPECIALTY_KEYS: &[&str] = &["specialty"];
const MARKET_SHARE_KEYS: &[&str] = &["marketSharePercentage", "marketShare"];
const REVENUE_KEYS: &[&str] = &["providerRevenue", "topProviderRevenue"];
const SERVICES_KEYS: &[&str] = &["providerServices", "topProviderServices"];
const PROVIDER_COUNT_KEYS: &[&str] = &["providerCount"];
const MARKET_REVENUE_KEYS: &[&str] = &["totalRevenue", "marketRevenue"];
const ZIP_KEYS: &[&str] = &["zipCode", "zip"];

/// Sub-objects searched after the row itself.
const NESTED_KEYS: &[&str] = &["provider", "market"];

/// Parse a market document: `{"marketAnalysis": [...]}` or a bare array.
pub fn parse_market_document(json: &str) -> ScoreResult<Vec<ProviderRecord>> {
    let doc: Value = serde_json::from_str(json)?;
    let rows = match &doc {
        Value::Array(rows) => rows,
        Value::Object(obj) => match obj.get("marketAnalysis") {
            Some(Value::Array(rows)) => rows,
            Some(_) => {
                return Err(ScoreError::InvalidDocument(
                    "marketAnalysis is not an array".into(),
                ))
            }
            None => {
                return Err(ScoreError::InvalidDocument(
                    "missing marketAnalysis array".into(),
                ))
            }
        },
        _ => {
            return Err(ScoreError::InvalidDocument(
                "expected an object or an array of rows".into(),
            ))
        }
    };

    let records: Vec<ProviderRecord> = rows
        .iter()
        .enumerate()
        .map(|(i, row)| normalize_row(i, row))
        .collect();
    log::debug!("Ingested {} market rows", records.len());
    Ok(records)
}

/// Normalize a single upstream row into canonical shape.
pub fn normalize_row(index: usize, row: &Value) -> ProviderRecord {
    let Some(obj) = row.as_object() else {
        log::warn!("Row {index} is not an object; using defaults");
        return ProviderRecord::new("");
    };
    let row = RowView { obj };

    let provider_revenue = row.number(REVENUE_KEYS);
    let market_revenue = if row.find(MARKET_REVENUE_KEYS).is_some() {
        row.number(MARKET_REVENUE_KEYS)
    } else {
        provider_revenue
    };

    let specialty = row
        .text(SPECIALTY_KEYS)
        .unwrap_or_else(|| UNKNOWN_SPECIALTY.to_string());

    ProviderRecord {
        provider_id: row.text(PROVIDER_ID_KEYS).unwrap_or_default(),
        provider_name: row.text(PROVIDER_NAME_KEYS),
        specialty,
        market_share_percentage: row.number(MARKET_SHARE_KEYS).min(100.0),
        provider_revenue,
        provider_services: row.count(SERVICES_KEYS),
        provider_count: row.count(PROVIDER_COUNT_KEYS),
        market_revenue,
        zip_code: row.text(ZIP_KEYS).unwrap_or_default(),
    }
}

/// The upstream "top providers" cut: drop unresolved names, sort by
/// revenue (highest first, id breaks ties) and keep `n`.
pub fn select_top_by_revenue(records: &[ProviderRecord], n: usize) -> Vec<ProviderRecord> {
    let mut named: Vec<ProviderRecord> = records
        .iter()
        .filter(|r| {
            r.provider_name
                .as_deref()
                .is_some_and(|name| !is_placeholder_name(name))
        })
        .cloned()
        .collect();

    named.sort_by(|a, b| {
        b.clamped_revenue()
            .partial_cmp(&a.clamped_revenue())
            .unwrap_or(Ordering::Equal)
            .then_with(|| a.provider_id.cmp(&b.provider_id))
    });
    named.truncate(n);
    named
}

struct RowView<'a> {
    obj: &'a Map<String, Value>,
}

impl<'a> RowView<'a> {
    fn find(&self, keys: &[&str]) -> Option<&'a Value> {
        let nested = NESTED_KEYS
            .iter()
            .filter_map(|k| self.obj.get(*k).and_then(Value::as_object));
        std::iter::once(self.obj)
            .chain(nested)
            .find_map(|obj| {
                keys.iter()
                    .filter_map(|k| obj.get(*k))
                    .find(|v| !v.is_null())
            })
    }

    /// Strings verbatim (trimmed), numbers as their decimal form.
    fn text(&self, keys: &[&str]) -> Option<String> {
        match self.find(keys)? {
            Value::String(s) if !s.trim().is_empty() => Some(s.trim().to_string()),
            Value::Number(n) => Some(match n.as_u64() {
                Some(u) => u.to_string(),
                None => n.to_string(),
            }),
            _ => None,
        }
    }

    /// Finite, non-negative float; anything else is 0.
    fn number(&self, keys: &[&str]) -> f64 {
        let value = match self.find(keys) {
            Some(Value::Number(n)) => n.as_f64(),
            Some(Value::String(s)) => s.trim().parse::<f64>().ok(),
            _ => None,
        };
        match value {
            Some(v) if v.is_finite() && v >= 0.0 => v,
            Some(v) => {
                log::warn!("Coercing out-of-range value {v} for {keys:?} to 0");
                0.0
            }
            None => 0.0,
        }
    }

    fn count(&self, keys: &[&str]) -> u64 {
        self.number(keys).round() as u64
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn first_matching_key_wins() {
        let row = json!({ "providerNPI": "111", "topProviderNPI": "222" });
        assert_eq!(normalize_row(0, &row).provider_id, "111");
    }

    #[test]
    fn null_values_fall_through_to_alternates() {
        let row = json!({ "providerRevenue": null, "topProviderRevenue": 5000.0 });
        assert_eq!(normalize_row(0, &row).provider_revenue, 5000.0);
    }

    #[test]
    fn numeric_strings_are_parsed() {
        let row = json!({ "marketShare": " 42.5 ", "providerCount": "7" });
        let rec = normalize_row(0, &row);
        assert_eq!(rec.market_share_percentage, 42.5);
        assert_eq!(rec.provider_count, 7);
    }

    #[test]
    fn garbage_numbers_coerce_to_zero() {
        let row = json!({ "providerRevenue": "lots", "providerServices": -4, "marketShare": true });
        let rec = normalize_row(0, &row);
        assert_eq!(rec.provider_revenue, 0.0);
        assert_eq!(rec.provider_services, 0);
        assert_eq!(rec.market_share_percentage, 0.0);
    }

    #[test]
    fn numeric_ids_and_zips_become_text() {
        let row = json!({ "npi": 1234567890u64, "zipCode": 90210 });
        let rec = normalize_row(0, &row);
        assert_eq!(rec.provider_id, "1234567890");
        assert_eq!(rec.zip_code, "90210");
    }
}
