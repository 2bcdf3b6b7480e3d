//! Conversion of ratings API responses into [`Establishment`] records.
//!
//! The API has been seen sending the same fields both in `PascalCase` and in `camelCase`, and
//! coordinates both as numbers and as numeric strings. Everything is accepted here so the rest
//! of the crate only sees one shape.

use serde_json::{Map, Value};

use crate::error::FetchError;
use crate::establishment::{Establishment, Scores};
use crate::geo::GeoPoint;

// Keys are tried in order; the first one holding a usable value wins.
const ID: &[&str] = &["FHRSID", "FhrsId", "id"];
const NAME: &[&str] = &["BusinessName", "name"];
const ADDRESS_LINES: [&[&str]; 4] = [
    &["AddressLine1", "addressLine1"],
    &["AddressLine2", "addressLine2"],
    &["AddressLine3", "addressLine3"],
    &["AddressLine4", "addressLine4"],
];
const POST_CODE: &[&str] = &["PostCode", "postCode"];
const GEOCODE: &[&str] = &["geocode", "Geocode"];
const LATITUDE: &[&str] = &["latitude", "Latitude"];
const LONGITUDE: &[&str] = &["longitude", "Longitude"];
const RATING: &[&str] = &["RatingValue", "ratingValue", "RatingKey", "ratingKey"];
const RATING_DATE: &[&str] = &["RatingDate", "ratingDate"];
const SCORES: &[&str] = &["scores", "Scores"];
const HYGIENE: &[&str] = &["Hygiene", "hygiene"];
const STRUCTURAL: &[&str] = &["Structural", "structural"];
const CONFIDENCE: &[&str] = &[
    "ConfidenceInManagement",
    "confidenceInManagement",
    "Confidence",
    "confidence",
];

/// Decodes a response body of the establishment search endpoint.
pub fn parse_response(body: &[u8]) -> Result<Vec<Establishment>, FetchError> {
    let value: Value = serde_json::from_slice(body)?;
    Ok(establishments_from_value(&value))
}

/// Extracts and normalises the establishment list from a decoded response.
///
/// Entries that cannot be read at all are skipped; a missing list gives an empty result.
pub fn establishments_from_value(value: &Value) -> Vec<Establishment> {
    let list = value
        .get("establishments")
        .or_else(|| value.get("Establishments"))
        .and_then(Value::as_array);

    let Some(list) = list else {
        log::debug!("Response has no establishment list");
        return vec![];
    };

    list.iter()
        .enumerate()
        .filter_map(|(index, entry)| {
            let normalized = normalize(entry);
            if normalized.is_none() {
                log::warn!("Skipping unreadable establishment entry #{index}");
            }
            normalized
        })
        .collect()
}

/// Normalises a single establishment entry. Returns `None` if the entry is not an object.
pub fn normalize(entry: &Value) -> Option<Establishment> {
    let entry = entry.as_object()?;

    let location = first(entry, GEOCODE, Value::as_object).and_then(|geocode| {
        let lat = first(geocode, LATITUDE, lenient_f64)?;
        let lng = first(geocode, LONGITUDE, lenient_f64)?;
        Some(GeoPoint::new(lat, lng))
    });

    let scores = first(entry, SCORES, Value::as_object)
        .map(|scores| Scores {
            hygiene: first(scores, HYGIENE, lenient_f64),
            structural: first(scores, STRUCTURAL, lenient_f64),
            confidence_in_management: first(scores, CONFIDENCE, lenient_f64),
        })
        .unwrap_or_default();

    let address_lines = ADDRESS_LINES
        .iter()
        .filter_map(|keys| first(entry, keys, lenient_string))
        .collect();

    Some(Establishment {
        id: first(entry, ID, lenient_string),
        name: first(entry, NAME, lenient_string),
        address_lines,
        post_code: first(entry, POST_CODE, lenient_string),
        location,
        rating: first(entry, RATING, lenient_string),
        rating_date: first(entry, RATING_DATE, lenient_string),
        scores,
    })
}

/// Reads the first of `keys` that `read` accepts.
fn first<'a, T>(
    object: &'a Map<String, Value>,
    keys: &[&str],
    read: impl Fn(&'a Value) -> Option<T>,
) -> Option<T> {
    keys.iter().filter_map(|key| object.get(*key)).find_map(read)
}

/// Reads a finite number given either as a JSON number or as a numeric string.
fn lenient_f64(value: &Value) -> Option<f64> {
    let number = match value {
        Value::Number(number) => number.as_f64(),
        Value::String(text) => text.trim().parse::<f64>().ok(),
        _ => None,
    }?;

    number.is_finite().then_some(number)
}

/// Reads a non-empty string, accepting numbers in their JSON form.
fn lenient_string(value: &Value) -> Option<String> {
    match value {
        Value::String(text) if !text.trim().is_empty() => Some(text.clone()),
        Value::Number(number) => Some(number.to_string()),
        _ => None,
    }
}
