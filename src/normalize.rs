//! Scraper output normalization and enrichment.
//!
//! The external scraper has emitted three different shapes over its
//! releases: a whole-file JSON array, a single JSON object, and
//! newline-delimited JSON. [`parse_items`] tries an ordered sequence of
//! parse strategies so any of them yields a flat item list, discarding
//! what cannot be salvaged instead of failing the batch.
//!
//! [`enrich`] then stamps locality provenance onto every item, mirrors the
//! scraper's `link` field under the canonical `google_maps_url` name the
//! CRM queries on, and derives a `best_time_to_call` suggestion from the
//! venue's popular-times histogram when one was captured.

use crate::models::Locality;
use serde_json::{Map, Value};
use tracing::{debug, instrument};

/// Weekdays considered for the contact-time suggestion, in scan order.
const CALL_DAYS: [&str; 5] = ["Monday", "Tuesday", "Wednesday", "Thursday", "Friday"];

/// Parse a scraper output artifact into a flat list of JSON items.
///
/// Strategies, in order:
/// 1. Whole-file JSON — an array is used as-is, a single object becomes a
///    one-element list, any other valid top-level value yields nothing.
/// 2. Newline-delimited JSON — each non-empty line is parsed on its own
///    and lines that fail to parse are silently dropped.
///
/// An empty or all-invalid artifact produces an empty vector; deciding
/// what to log about that is the caller's business.
pub fn parse_items(content: &str) -> Vec<Value> {
    if content.trim().is_empty() {
        return Vec::new();
    }

    match serde_json::from_str::<Value>(content) {
        Ok(Value::Array(items)) => items,
        Ok(item @ Value::Object(_)) => vec![item],
        // Valid JSON, but a scalar: the file is not a result set.
        Ok(_) => Vec::new(),
        Err(_) => content
            .lines()
            .map(str::trim)
            .filter(|line| !line.is_empty())
            .filter_map(|line| serde_json::from_str::<Value>(line).ok())
            .collect(),
    }
}

/// Enrich parsed items in place with locality provenance and derived fields.
///
/// Each JSON object gains `source_city_zip` and `source_city_name`; a
/// `link` field is duplicated under `google_maps_url`; a `popular_times`
/// histogram produces a `best_time_to_call` (explicitly null when the
/// histogram is empty, so the CRM can tell "no data" from "not computed").
/// Non-object items are left untouched.
#[instrument(level = "debug", skip_all, fields(count = items.len(), zip = %locality.postal_code))]
pub fn enrich(items: &mut [Value], locality: &Locality) {
    for item in items.iter_mut() {
        let Value::Object(map) = item else {
            continue;
        };

        map.insert(
            "source_city_zip".to_string(),
            Value::String(locality.postal_code.clone()),
        );
        map.insert(
            "source_city_name".to_string(),
            Value::String(locality.name.clone()),
        );

        if let Some(link) = map.get("link").cloned() {
            map.insert("google_maps_url".to_string(), link);
        }

        if let Some(popular_times) = map.get("popular_times") {
            let best = best_contact_time(popular_times);
            debug!(?best, "Computed contact-time suggestion");
            map.insert(
                "best_time_to_call".to_string(),
                best.map(Value::String).unwrap_or(Value::Null),
            );
        }
    }
}

/// Derive the best time to call a venue from its popular-times histogram.
///
/// The histogram maps weekday names to hour→busyness-percentage maps.
/// Only weekdays are considered, and within them only the 10h (morning)
/// and 15h (afternoon) call slots. Days are scanned Monday→Friday with
/// the afternoon slot checked before the morning one, and only a strictly
/// lower non-zero busyness replaces the current best — so ties keep the
/// earliest candidate under that scan order.
///
/// Hour keys may be spelled as strings or numbers, and busyness values as
/// numbers or numeric strings; the scraper has produced all of these.
///
/// # Returns
///
/// A sentence like `"Tuesday around 15h (Afternoon) (12% busy)"`, or
/// `None` when no slot has a non-zero busyness.
pub fn best_contact_time(popular_times: &Value) -> Option<String> {
    let days = popular_times.as_object()?;

    let mut best: Option<(f64, &str, &str)> = None;
    for day in CALL_DAYS {
        let Some(hours) = days.get(day).and_then(Value::as_object) else {
            continue;
        };

        for (hour, slot) in [(15, "15h (Afternoon)"), (10, "10h (Morning)")] {
            let Some(traffic) = slot_value(hours, hour) else {
                continue;
            };
            if traffic <= 0.0 {
                continue;
            }
            if best.is_none_or(|(lowest, _, _)| traffic < lowest) {
                best = Some((traffic, day, slot));
            }
        }
    }

    best.map(|(traffic, day, slot)| format!("{day} around {slot} ({traffic}% busy)"))
}

/// Look up the busyness value for an hour, tolerating key and value
/// spellings ("15", 15, "15.0"; 12, "12").
fn slot_value(hours: &Map<String, Value>, hour: u32) -> Option<f64> {
    let value = hours.get(&hour.to_string()).or_else(|| {
        hours
            .iter()
            .find(|(key, _)| key.trim().parse::<f64>() == Ok(hour as f64))
            .map(|(_, value)| value)
    })?;

    match value {
        Value::Number(n) => n.as_f64(),
        Value::String(s) => s.trim().parse::<f64>().ok(),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_parse_single_object_wraps() {
        let items = parse_items(r#"{"name": "Chez Louise"}"#);
        assert_eq!(items.len(), 1);
        assert_eq!(items[0]["name"], "Chez Louise");
    }

    #[test]
    fn test_parse_array_used_as_is() {
        let items = parse_items(r#"[{"name": "A"}, {"name": "B"}]"#);
        assert_eq!(items.len(), 2);
    }

    #[test]
    fn test_parse_ndjson_drops_malformed_lines() {
        let content = "{\"name\": \"A\"}\n{broken\n{\"name\": \"B\"}\n";
        let items = parse_items(content);
        assert_eq!(items.len(), 2);
        assert_eq!(items[1]["name"], "B");
    }

    #[test]
    fn test_parse_ndjson_skips_blank_lines() {
        let content = "\n{\"name\": \"A\"}\n\n   \n{\"name\": \"B\"}\n";
        assert_eq!(parse_items(content).len(), 2);
    }

    #[test]
    fn test_parse_empty_and_scalar_yield_nothing() {
        assert!(parse_items("").is_empty());
        assert!(parse_items("   \n ").is_empty());
        // Valid JSON, but not a result set; must not fall through to the
        // line-by-line strategy.
        assert!(parse_items("42").is_empty());
        assert!(parse_items("\"just a string\"").is_empty());
    }

    #[test]
    fn test_enrich_attaches_provenance_and_canonical_url() {
        let locality = Locality {
            name: "Brest".to_string(),
            postal_code: "29200".to_string(),
        };
        let mut items = vec![json!({
            "name": "Crêperie du Port",
            "link": "https://maps.google.com/?cid=123"
        })];

        enrich(&mut items, &locality);

        assert_eq!(items[0]["source_city_zip"], "29200");
        assert_eq!(items[0]["source_city_name"], "Brest");
        assert_eq!(items[0]["google_maps_url"], "https://maps.google.com/?cid=123");
        // No popular_times: the field is not even present.
        assert!(items[0].get("best_time_to_call").is_none());
    }

    #[test]
    fn test_enrich_null_suggestion_for_empty_histogram() {
        let locality = Locality {
            name: "Brest".to_string(),
            postal_code: "29200".to_string(),
        };
        let mut items = vec![json!({"popular_times": {}})];

        enrich(&mut items, &locality);

        assert_eq!(items[0]["best_time_to_call"], Value::Null);
    }

    #[test]
    fn test_enrich_leaves_non_objects_alone() {
        let locality = Locality {
            name: "Brest".to_string(),
            postal_code: "29200".to_string(),
        };
        let mut items = vec![json!(3), json!({"name": "A"})];
        enrich(&mut items, &locality);

        assert_eq!(items[0], json!(3));
        assert_eq!(items[1]["source_city_name"], "Brest");
    }

    #[test]
    fn test_best_time_picks_lowest_across_days() {
        let pt = json!({
            "Tuesday": {"15": 20},
            "Wednesday": {"10": 15}
        });
        assert_eq!(
            best_contact_time(&pt).unwrap(),
            "Wednesday around 10h (Morning) (15% busy)"
        );
    }

    #[test]
    fn test_best_time_all_zero_or_absent_is_none() {
        assert!(best_contact_time(&json!({})).is_none());
        assert!(best_contact_time(&json!({"Monday": {"10": 0, "15": 0}})).is_none());
        assert!(best_contact_time(&json!(null)).is_none());
        assert!(best_contact_time(&json!("busy"))
            .is_none());
    }

    #[test]
    fn test_best_time_tie_keeps_first_in_scan_order() {
        // Equal busyness later in the week must not displace the earlier
        // candidate; within a day the afternoon slot is checked first.
        let pt = json!({
            "Monday": {"10": 30, "15": 30},
            "Thursday": {"15": 30}
        });
        assert_eq!(
            best_contact_time(&pt).unwrap(),
            "Monday around 15h (Afternoon) (30% busy)"
        );
    }

    #[test]
    fn test_best_time_ignores_weekends_and_other_hours() {
        let pt = json!({
            "Saturday": {"10": 1},
            "Sunday": {"15": 1},
            "Monday": {"12": 2, "15": 40}
        });
        assert_eq!(
            best_contact_time(&pt).unwrap(),
            "Monday around 15h (Afternoon) (40% busy)"
        );
    }

    #[test]
    fn test_best_time_tolerates_string_values_and_odd_keys() {
        let pt = json!({
            "Friday": {"15.0": "25"}
        });
        assert_eq!(
            best_contact_time(&pt).unwrap(),
            "Friday around 15h (Afternoon) (25% busy)"
        );
    }

    #[test]
    fn test_best_time_skips_non_object_days() {
        let pt = json!({
            "Monday": "closed",
            "Tuesday": {"10": 8}
        });
        assert_eq!(
            best_contact_time(&pt).unwrap(),
            "Tuesday around 10h (Morning) (8% busy)"
        );
    }
}
