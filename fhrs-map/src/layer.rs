//! Display surface the session draws on.

use std::sync::atomic::{AtomicU64, Ordering};

use parking_lot::Mutex;

use crate::geo::GeoPoint;
use crate::marker::Marker;

/// Map widget as seen by the [`MapSession`](crate::session::MapSession).
///
/// Implementations are called from the session task and must hand the work over to the UI
/// thread if the widget requires it.
pub trait MapSurface: Send + Sync {
    /// Moves the map to the given center and zoom level.
    fn set_view(&self, center: GeoPoint, zoom: u32);

    /// Removes all markers and shows the given ones instead.
    fn replace_markers(&self, markers: Vec<Marker>);

    /// Removes all markers.
    fn clear_markers(&self);
}

/// In-memory marker layer.
///
/// Keeps the current marker set and the last requested view. Useful for headless hosts and as
/// the state holder of widget integrations that redraw from a snapshot.
#[derive(Default)]
pub struct MarkerLayer {
    markers: Mutex<Vec<Marker>>,
    view: Mutex<Option<(GeoPoint, u32)>>,
    updates: AtomicU64,
}

impl MarkerLayer {
    /// Creates an empty layer.
    pub fn new() -> Self {
        Self::default()
    }

    /// Snapshot of the displayed markers.
    pub fn markers(&self) -> Vec<Marker> {
        self.markers.lock().clone()
    }

    /// Number of displayed markers.
    pub fn len(&self) -> usize {
        self.markers.lock().len()
    }

    /// Returns true if no markers are displayed.
    pub fn is_empty(&self) -> bool {
        self.markers.lock().is_empty()
    }

    /// Displayed marker with the given key.
    pub fn get(&self, key: &str) -> Option<Marker> {
        self.markers
            .lock()
            .iter()
            .find(|marker| marker.key == key)
            .cloned()
    }

    /// Last view requested with [`MapSurface::set_view`].
    pub fn view(&self) -> Option<(GeoPoint, u32)> {
        *self.view.lock()
    }

    /// Number of times the marker set was replaced or cleared.
    pub fn updates(&self) -> u64 {
        self.updates.load(Ordering::Relaxed)
    }
}

impl MapSurface for MarkerLayer {
    fn set_view(&self, center: GeoPoint, zoom: u32) {
        *self.view.lock() = Some((center, zoom));
    }

    fn replace_markers(&self, markers: Vec<Marker>) {
        let mut displayed = self.markers.lock();
        log::debug!("Replacing {} markers with {}", displayed.len(), markers.len());
        *displayed = markers;
        self.updates.fetch_add(1, Ordering::Relaxed);
    }

    fn clear_markers(&self) {
        self.markers.lock().clear();
        self.updates.fetch_add(1, Ordering::Relaxed);
    }
}
