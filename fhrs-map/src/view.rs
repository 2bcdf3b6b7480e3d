//! Snapshot of what the user is looking at.

use std::fmt;

use crate::geo::{GeoPoint, MapViewport};

/// Map view combined with the UI filter state. Queries are built from this snapshot.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ViewState {
    /// Visible area of the map.
    pub viewport: MapViewport,
    /// Only establishments with the top rating are requested.
    pub only_top_rated: bool,
}

impl ViewState {
    /// Creates a new view state.
    pub fn new(viewport: MapViewport, only_top_rated: bool) -> Self {
        Self {
            viewport,
            only_top_rated,
        }
    }

    /// Center of the view.
    pub fn center(&self) -> GeoPoint {
        self.viewport.center
    }

    /// Zoom level of the view.
    pub fn zoom(&self) -> u32 {
        self.viewport.zoom
    }

    /// Unclamped search radius covering the visible area, in miles.
    pub fn radius_miles(&self) -> f64 {
        self.viewport.corner_distance_miles()
    }

    /// Key identifying this view for duplicate request suppression.
    pub fn fetch_key(&self) -> FetchKey {
        FetchKey::from_view(self)
    }
}

/// Identity of a query: the center rounded to 4 decimal places, the zoom level and the filter flag.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct FetchKey(String);

impl FetchKey {
    /// Derives the key of the given view.
    pub fn from_view(view: &ViewState) -> Self {
        let center = view.center();
        Self(format!(
            "{:.4},{:.4}:{}:five={}",
            center.lat,
            center.lng,
            view.zoom(),
            view.only_top_rated
        ))
    }

    /// String form of the key.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for FetchKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}
