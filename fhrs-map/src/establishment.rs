//! Canonical establishment record shared by the API boundary and the marker renderer.

use crate::geo::GeoPoint;

/// Inspection sub-scores. Lower is better; `None` when the API gave no usable number.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct Scores {
    /// Food hygiene and safety score.
    pub hygiene: Option<f64>,
    /// Structural compliance score.
    pub structural: Option<f64>,
    /// Confidence in management score.
    pub confidence_in_management: Option<f64>,
}

/// A food business as returned by the ratings API, normalised to one shape.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Establishment {
    /// FHRS identifier.
    pub id: Option<String>,
    /// Trading name.
    pub name: Option<String>,
    /// Address lines 1 to 4, empty lines dropped.
    pub address_lines: Vec<String>,
    /// Post code.
    pub post_code: Option<String>,
    /// Position, if the API provided finite coordinates.
    pub location: Option<GeoPoint>,
    /// Raw rating value (`"0"`..`"5"`, `"Pass"`, `"AwaitingInspection"`, ...) or rating key.
    pub rating: Option<String>,
    /// Raw rating date as sent by the API.
    pub rating_date: Option<String>,
    /// Inspection sub-scores.
    pub scores: Scores,
}

impl Establishment {
    /// Address lines and post code joined with commas.
    pub fn address(&self) -> String {
        self.address_lines
            .iter()
            .map(String::as_str)
            .chain(self.post_code.as_deref())
            .filter(|part| !part.is_empty())
            .collect::<Vec<_>>()
            .join(", ")
    }

    /// Key of the marker for this establishment: the identifier, or the coordinate pair.
    pub fn marker_key(&self) -> Option<String> {
        match (&self.id, self.location) {
            (Some(id), _) => Some(id.clone()),
            (None, Some(location)) => Some(format!("{},{}", location.lat, location.lng)),
            (None, None) => None,
        }
    }
}
