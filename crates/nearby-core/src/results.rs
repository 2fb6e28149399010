//! Ranking and rendering of theme search results.
//!
//! Records are parsed one at a time into `Result<RankedFacility, RecordError>`;
//! a malformed record is logged and dropped without affecting its neighbours.

use std::sync::OnceLock;

use regex::Regex;
use serde_json::Value;

use crate::{
    domain::Coordinate,
    errors::Error,
    formatting::{escape_html, title_case},
    geo::distance_km,
    themes::Theme,
    Result,
};

/// Maximum number of entries rendered.
pub const TOP_N: usize = 8;

const MAP_PLACE_BASE: &str = "http://www.google.com/maps/place/";

/// One formatted entry awaiting ranking.
#[derive(Clone, Debug)]
pub struct RankedFacility {
    pub text: String,
    pub distance_km: f64,
}

/// Why a single upstream record could not be rendered.
#[derive(Debug, thiserror::Error)]
pub enum RecordError {
    #[error("record is not an object")]
    NotAnObject,

    #[error("missing field {0}")]
    MissingField(&'static str),

    #[error("invalid LatLng {0:?}")]
    InvalidCoordinate(String),
}

/// Message used when nothing is found around the user.
pub fn zero_results_message(theme: Theme) -> String {
    format!("No {} found in a ~2.5km radius", theme.label().to_lowercase())
}

/// Render a raw `retrieveTheme` body as a numbered top-8 list.
pub fn format_results(response: &Value, origin: Coordinate, theme: Theme) -> Result<String> {
    let records = response
        .get("SrchResults")
        .and_then(Value::as_array)
        .ok_or_else(|| Error::UpstreamSearch("unexpected response shape".to_string()))?;
    let header = records
        .first()
        .ok_or_else(|| Error::UpstreamSearch("response has no header record".to_string()))?;

    if header.get("ErrorMessage").is_some() {
        tracing::error!("Invalid theme code for {}", theme.label());
        return Ok("Search term not available".to_string());
    }

    let count = text_field(header, "FeatCount")
        .and_then(|n| n.trim().parse::<u64>().ok())
        .unwrap_or(0);
    tracing::info!("Found {count} results for {}", theme.label());
    if count == 0 {
        return Ok(zero_results_message(theme));
    }

    let mut ranked: Vec<RankedFacility> = records[1..]
        .iter()
        .map(|record| rank_record(record, origin, theme))
        .filter_map(|parsed| match parsed {
            Ok(entry) => Some(entry),
            Err(e) => {
                tracing::warn!("skipping {} record: {e}", theme.label());
                None
            }
        })
        .collect();

    if ranked.is_empty() {
        return Ok(zero_results_message(theme));
    }

    // `sort_by` is stable: equal distances keep upstream order.
    ranked.sort_by(|a, b| a.distance_km.total_cmp(&b.distance_km));

    let mut out = String::new();
    for (idx, entry) in ranked.iter().take(TOP_N).enumerate() {
        out.push_str(&format!("{}. {}\n", idx + 1, entry.text));
    }
    Ok(out)
}

/// Parse and render one upstream record.
pub fn rank_record(
    record: &Value,
    origin: Coordinate,
    theme: Theme,
) -> std::result::Result<RankedFacility, RecordError> {
    if !record.is_object() {
        return Err(RecordError::NotAnObject);
    }

    let raw_lat_lng = text_field(record, "LatLng").ok_or(RecordError::MissingField("LatLng"))?;
    let at = Coordinate::parse_lat_lng(&raw_lat_lng)
        .ok_or_else(|| RecordError::InvalidCoordinate(raw_lat_lng.clone()))?;
    let name = text_field(record, "NAME").ok_or(RecordError::MissingField("NAME"))?;
    let distance = distance_km(origin, at);

    let mut text = format!(
        "<b>{}</b> ({distance:.2}km)\n",
        escape_html(&title_case(&name))
    );

    if theme.has_useful_description() {
        if let Some(description) = non_empty_field(record, "DESCRIPTION") {
            let description = if theme == Theme::ChasClinics {
                description.replace(',', ", ")
            } else {
                description
            };
            text.push_str(&format!("<i>{}</i>\n---\n", escape_html(&description)));
        }
    }

    let address = address_line(record);
    if !address.is_empty() {
        text.push_str(&escape_html(&address));
        text.push('\n');
    }

    if let Some(link) = non_empty_field(record, "HYPERLINK") {
        text.push_str(&format!("[<a href=\"{}\">Link</a>] ", escape_html(&link)));
    }
    text.push_str(&format!(
        "[<a href=\"{MAP_PLACE_BASE}{}\">Map</a>] \n",
        escape_html(&raw_lat_lng)
    ));

    Ok(RankedFacility {
        text,
        distance_km: distance,
    })
}

/// Address fragments in display order, skipping absent ones.
fn address_line(record: &Value) -> String {
    let mut parts: Vec<String> = Vec::new();

    if let Some(block) = non_empty_field(record, "ADDRESSBLOCKHOUSENUMBER") {
        parts.push(format!("Blk {}", normalize_block(&block)));
    }
    if let Some(street) = non_empty_field(record, "ADDRESSSTREETNAME") {
        parts.push(title_case(street.trim()));
    }
    if let Some(unit) = non_empty_field(record, "ADDRESSUNITNUMBER") {
        parts.push(unit.trim().to_string());
    }
    if let Some(building) = non_empty_field(record, "ADDRESSBUILDINGNAME") {
        parts.push(title_case(building.trim()));
    }
    if let Some(postal) = non_empty_field(record, "ADDRESSPOSTALCODE") {
        parts.push(format!("S{postal}"));
    }

    parts.join(", ")
}

fn normalize_block(raw: &str) -> String {
    static BLOCK_PREFIX: OnceLock<Regex> = OnceLock::new();
    let re = BLOCK_PREFIX.get_or_init(|| Regex::new("BLOCK|BLK").expect("valid regex"));
    // Trim after stripping so "BLK 5" renders as "Blk 5", not "Blk  5".
    re.replace_all(&raw.trim().to_uppercase(), "")
        .trim()
        .to_string()
}

/// String or numeric field rendered as text.
fn text_field(record: &Value, key: &str) -> Option<String> {
    match record.get(key)? {
        Value::String(s) => Some(s.clone()),
        Value::Number(n) => Some(n.to_string()),
        _ => None,
    }
}

fn non_empty_field(record: &Value, key: &str) -> Option<String> {
    text_field(record, key).filter(|s| !s.trim().is_empty())
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;

    fn origin() -> Coordinate {
        Coordinate::new(1.304833, 103.831833).unwrap()
    }

    fn record(name: &str, lat: f64, lng: f64) -> Value {
        json!({"NAME": name, "LatLng": format!("{lat},{lng}")})
    }

    fn response(records: Vec<Value>) -> Value {
        let mut all = vec![json!({"FeatCount": records.len()})];
        all.extend(records);
        json!({ "SrchResults": all })
    }

    #[test]
    fn zero_results_uses_lowercased_label() {
        let body = json!({"SrchResults": [{"FeatCount": 0}]});
        let out = format_results(&body, origin(), Theme::Parks).unwrap();
        assert_eq!(out, "No parks found in a ~2.5km radius");
    }

    #[test]
    fn error_header_means_search_term_unavailable() {
        let body = json!({"SrchResults": [{"FeatCount": 0, "ErrorMessage": "Invalid Query"}]});
        let out = format_results(&body, origin(), Theme::Hotels).unwrap();
        assert_eq!(out, "Search term not available");
    }

    #[test]
    fn missing_envelope_is_a_search_error() {
        let err = format_results(&json!({"error": "x"}), origin(), Theme::Hotels).unwrap_err();
        assert!(matches!(err, Error::UpstreamSearch(_)));

        let err = format_results(&json!({"SrchResults": []}), origin(), Theme::Hotels).unwrap_err();
        assert!(matches!(err, Error::UpstreamSearch(_)));
    }

    #[test]
    fn renders_full_entry() {
        let body = response(vec![json!({
            "NAME": "BISHAN PARK",
            "LatLng": "1.31,103.84",
            "DESCRIPTION": "Riverside park",
            "HYPERLINK": "https://example.org/bishan",
            "ADDRESSBLOCKHOUSENUMBER": "blk 1382",
            "ADDRESSSTREETNAME": "ANG MO KIO AVE 1",
            "ADDRESSUNITNUMBER": "#01-01",
            "ADDRESSBUILDINGNAME": "PARK VIEW",
            "ADDRESSPOSTALCODE": "569931"
        })]);

        let out = format_results(&body, origin(), Theme::Parks).unwrap();
        assert_eq!(
            out,
            "1. <b>Bishan Park</b> (1.07km)\n\
<i>Riverside park</i>\n---\n\
Blk 1382, Ang Mo Kio Ave 1, #01-01, Park View, S569931\n\
[<a href=\"https://example.org/bishan\">Link</a>] \
[<a href=\"http://www.google.com/maps/place/1.31,103.84\">Map</a>] \n\n"
        );
    }

    #[test]
    fn entry_without_address_ends_with_single_newline() {
        let body = response(vec![record("CLINIC", 1.31, 103.84)]);
        let out = format_results(&body, origin(), Theme::Hospitals).unwrap();
        assert_eq!(
            out,
            "1. <b>Clinic</b> (1.07km)\n\
[<a href=\"http://www.google.com/maps/place/1.31,103.84\">Map</a>] \n\n"
        );
    }

    #[test]
    fn chas_clinic_descriptions_get_spaced_commas() {
        let mut rec = record("HEALTHY CLINIC", 1.31, 103.84);
        rec["DESCRIPTION"] = json!("Open,Mon-Fri,9-5");
        let out = format_results(&response(vec![rec]), origin(), Theme::ChasClinics).unwrap();
        assert!(out.contains("<i>Open, Mon-Fri, 9-5</i>\n---\n"), "{out}");
    }

    #[test]
    fn noisy_descriptions_are_suppressed() {
        let mut rec = record("HOTEL 81", 1.31, 103.84);
        rec["DESCRIPTION"] = json!("HOTELS.1234");
        let out = format_results(&response(vec![rec]), origin(), Theme::Hotels).unwrap();
        assert!(!out.contains("<i>"));
    }

    #[test]
    fn block_prefixes_are_stripped_without_double_space() {
        for raw in ["BLK 5", "block 5", " 5 ", "Blk5"] {
            let rec = json!({"ADDRESSBLOCKHOUSENUMBER": raw});
            assert_eq!(address_line(&rec), "Blk 5", "raw = {raw:?}");
        }
    }

    #[test]
    fn empty_and_numeric_address_fields() {
        let rec = json!({
            "ADDRESSBLOCKHOUSENUMBER": "",
            "ADDRESSSTREETNAME": null,
            "ADDRESSUNITNUMBER": "   ",
            "ADDRESSPOSTALCODE": 238801
        });
        assert_eq!(address_line(&rec), "S238801");
    }

    #[test]
    fn names_are_html_escaped() {
        let body = response(vec![record("A&W <DRIVE-IN>", 1.31, 103.84)]);
        let out = format_results(&body, origin(), Theme::Hotels).unwrap();
        assert!(out.starts_with("1. <b>A&amp;W &lt;Drive-In&gt;</b>"), "{out}");
    }

    #[test]
    fn malformed_record_is_skipped_not_fatal() {
        let body = response(vec![
            record("ONE", 1.31, 103.84),
            json!({"NAME": "BROKEN", "LatLng": "not-a-coordinate"}),
            json!({"LatLng": "1.30,103.83"}),
            record("TWO", 1.3, 103.8),
        ]);
        let out = format_results(&body, origin(), Theme::Hotels).unwrap();
        assert!(out.contains("<b>One</b>"));
        assert!(out.contains("<b>Two</b>"));
        assert!(!out.contains("Broken"));
        assert!(out.starts_with("1. "));
        assert!(out.contains("\n\n2. "));
        assert!(!out.contains("3. "));
    }

    #[test]
    fn all_records_broken_reports_zero_results() {
        let body = response(vec![json!({"NAME": "X", "LatLng": "200,500"})]);
        let out = format_results(&body, origin(), Theme::Libraries).unwrap();
        assert_eq!(out, "No libraries found in a ~2.5km radius");
    }

    #[test]
    fn keeps_eight_nearest_in_ascending_order() {
        // Twelve records, inserted farthest first.
        let records: Vec<Value> = (0..12_i32)
            .rev()
            .map(|i| {
                let lat = 1.304833 + 0.001 * f64::from(i + 1);
                record(&format!("PLACE {i}"), lat, 103.831833)
            })
            .collect();
        let out = format_results(&response(records), origin(), Theme::Supermarkets).unwrap();

        let entries: Vec<&str> = out.trim_end().split("\n\n").collect();
        assert_eq!(entries.len(), 8);
        for (idx, entry) in entries.iter().enumerate() {
            assert!(entry.starts_with(&format!("{}. <b>Place {idx}</b>", idx + 1)), "{entry}");
        }
    }

    #[test]
    fn equal_distances_keep_upstream_order() {
        let body = response(vec![
            record("FIRST", 1.31, 103.84),
            record("SECOND", 1.31, 103.84),
        ]);
        let out = format_results(&body, origin(), Theme::Hotels).unwrap();
        let first = out.find("First").unwrap();
        let second = out.find("Second").unwrap();
        assert!(first < second);
    }

    #[test]
    fn formatting_is_deterministic() {
        let body = response(vec![
            record("A", 1.31, 103.84),
            record("B", 1.3, 103.8),
            record("C", 1.305, 103.832),
        ]);
        let a = format_results(&body, origin(), Theme::Gyms).unwrap();
        let b = format_results(&body, origin(), Theme::Gyms).unwrap();
        assert_eq!(a, b);
    }
}
