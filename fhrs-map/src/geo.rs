//! Geographic primitives and viewport geometry.

use serde::{Deserialize, Serialize};

/// Mean Earth radius used for distances between points, in metres.
pub const EARTH_RADIUS_M: f64 = 6_371_000.0;

/// Number of metres in a statute mile.
pub const METRES_PER_MILE: f64 = 1609.344;

/// Semi-major axis of the Web Mercator projection, in metres.
const MERCATOR_RADIUS_M: f64 = 6_378_137.0;

/// Resolution of zoom level 0 for 256 pixel tiles, in metres per pixel.
const TOP_RESOLUTION: f64 = 156_543.033_928_000_14;

/// Largest latitude representable in Web Mercator.
const MAX_MERCATOR_LAT: f64 = 85.051_128_779_806_6;

/// Geographic position with latitude and longitude in degrees.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct GeoPoint {
    /// Latitude in degrees, positive to the north.
    pub lat: f64,
    /// Longitude in degrees, positive to the east.
    pub lng: f64,
}

impl GeoPoint {
    /// Creates a new point.
    pub const fn new(lat: f64, lng: f64) -> Self {
        Self { lat, lng }
    }

    /// Returns true if both coordinates are finite numbers.
    pub fn is_finite(&self) -> bool {
        self.lat.is_finite() && self.lng.is_finite()
    }

    /// Great-circle distance to `other` in metres (haversine).
    pub fn distance_to(&self, other: &GeoPoint) -> f64 {
        let lat1 = self.lat.to_radians();
        let lat2 = other.lat.to_radians();
        let d_lat = lat2 - lat1;
        let d_lng = (other.lng - self.lng).to_radians();

        let a = (d_lat / 2.0).sin().powi(2) + lat1.cos() * lat2.cos() * (d_lng / 2.0).sin().powi(2);
        let c = 2.0 * a.sqrt().atan2((1.0 - a).sqrt());
        EARTH_RADIUS_M * c
    }

    fn to_mercator(self) -> (f64, f64) {
        let lat = self.lat.clamp(-MAX_MERCATOR_LAT, MAX_MERCATOR_LAT).to_radians();
        let x = MERCATOR_RADIUS_M * self.lng.to_radians();
        let y = MERCATOR_RADIUS_M * (std::f64::consts::FRAC_PI_4 + lat / 2.0).tan().ln();
        (x, y)
    }

    fn from_mercator(x: f64, y: f64) -> Self {
        let lng = (x / MERCATOR_RADIUS_M).to_degrees();
        let lat = (2.0 * (y / MERCATOR_RADIUS_M).exp().atan() - std::f64::consts::FRAC_PI_2)
            .to_degrees();
        Self::new(lat.clamp(-MAX_MERCATOR_LAT, MAX_MERCATOR_LAT), lng)
    }
}

/// Physical size of the map widget in pixels.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct MapSize {
    /// Width in pixels.
    pub width: u32,
    /// Height in pixels.
    pub height: u32,
}

impl MapSize {
    /// Creates a new size.
    pub const fn new(width: u32, height: u32) -> Self {
        Self { width, height }
    }
}

impl Default for MapSize {
    fn default() -> Self {
        Self::new(1024, 768)
    }
}

/// Visible part of the map as reported by the map widget.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct MapViewport {
    /// Center of the view.
    pub center: GeoPoint,
    /// Integer zoom level (0 shows the whole world).
    pub zoom: u32,
    /// Size of the widget.
    pub size: MapSize,
}

impl MapViewport {
    /// Creates a new viewport.
    pub fn new(center: GeoPoint, zoom: u32, size: MapSize) -> Self {
        Self { center, zoom, size }
    }

    /// Ground resolution at the equator, in metres per pixel.
    pub fn resolution(&self) -> f64 {
        TOP_RESOLUTION / 2f64.powi(self.zoom as i32)
    }

    /// North-east corner of the visible area.
    pub fn north_east(&self) -> GeoPoint {
        let (x, y) = self.center.to_mercator();
        let resolution = self.resolution();
        let half_width = self.size.width as f64 / 2.0 * resolution;
        let half_height = self.size.height as f64 / 2.0 * resolution;

        GeoPoint::from_mercator(x + half_width, y + half_height)
    }

    /// Distance from the center to the north-east corner, in miles.
    pub fn corner_distance_miles(&self) -> f64 {
        self.center.distance_to(&self.north_east()) / METRES_PER_MILE
    }
}
