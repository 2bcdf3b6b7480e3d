//! Translation of the map view into an establishment search request.

use crate::config::QueryLimits;
use crate::view::{FetchKey, ViewState};

/// Rating scheme constrained when only top rated establishments are requested.
pub const TOP_RATED_SCHEME: &str = "FHRS";

/// Rating key of the top tier in [`TOP_RATED_SCHEME`].
pub const TOP_RATED_KEY: &str = "5";

/// Parameters of one establishment search request.
#[derive(Debug, Clone, PartialEq)]
pub struct EstablishmentQuery {
    /// Latitude of the search center.
    pub latitude: f64,
    /// Longitude of the search center.
    pub longitude: f64,
    /// Search radius in whole miles.
    pub max_distance_miles: u32,
    /// Number of results requested.
    pub page_size: u32,
    /// Requested result page, starting from 1.
    pub page_number: u32,
    /// Restrict results to the top rating tier of the FHRS scheme.
    pub top_rated_only: bool,
}

impl EstablishmentQuery {
    /// Query string pairs in the order they are sent.
    pub fn params(&self) -> Vec<(&'static str, String)> {
        let mut params = vec![
            ("latitude", self.latitude.to_string()),
            ("longitude", self.longitude.to_string()),
            ("maxDistanceLimit", self.max_distance_miles.to_string()),
            ("sortOptionKey", "distance".to_string()),
            ("pageSize", self.page_size.to_string()),
            ("pageNumber", self.page_number.to_string()),
        ];

        if self.top_rated_only {
            params.push(("schemeTypeKey", TOP_RATED_SCHEME.to_string()));
            params.push(("ratingKey", TOP_RATED_KEY.to_string()));
        }

        params
    }
}

/// What to do for a given view.
#[derive(Debug, Clone, PartialEq)]
pub enum QueryPlan {
    /// Zoomed out too far: remove all markers and forget the last request.
    Clear,
    /// The same view was already requested.
    Skip,
    /// Send the query and remember its key.
    Fetch {
        /// Key to remember as the last issued request.
        key: FetchKey,
        /// Request to send.
        query: EstablishmentQuery,
    },
}

/// Builds queries from view snapshots. Holds no state of its own: the caller keeps the last key.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct QueryBuilder {
    limits: QueryLimits,
    page_size: u32,
}

impl QueryBuilder {
    /// Creates a builder with the given limits and page size.
    pub fn new(limits: QueryLimits, page_size: u32) -> Self {
        Self { limits, page_size }
    }

    /// Search radius of the view clamped to the configured bounds, in miles.
    pub fn clamped_radius(&self, view: &ViewState) -> f64 {
        clamp_radius(view.radius_miles(), &self.limits)
    }

    /// Decides what request, if any, the view requires.
    pub fn plan(&self, view: &ViewState, last_key: Option<&FetchKey>) -> QueryPlan {
        if view.zoom() < self.limits.min_zoom {
            return QueryPlan::Clear;
        }

        let key = view.fetch_key();
        if last_key == Some(&key) {
            return QueryPlan::Skip;
        }

        let center = view.center();
        let query = EstablishmentQuery {
            latitude: center.lat,
            longitude: center.lng,
            max_distance_miles: self.clamped_radius(view).round() as u32,
            page_size: self.page_size,
            page_number: 1,
            top_rated_only: view.only_top_rated,
        };

        QueryPlan::Fetch { key, query }
    }
}

impl Default for QueryBuilder {
    fn default() -> Self {
        Self::new(QueryLimits::default(), 200)
    }
}

fn clamp_radius(radius: f64, limits: &QueryLimits) -> f64 {
    if radius.is_nan() {
        return limits.min_radius_miles;
    }

    // Unlike `f64::clamp`, never panics on inverted bounds; the upper bound wins then.
    radius
        .max(limits.min_radius_miles)
        .min(limits.max_radius_miles)
}

#[cfg(test)]
mod tests {
    use approx::assert_relative_eq;

    use super::*;
    use crate::geo::{GeoPoint, MapSize, MapViewport};

    fn view(zoom: u32, size: MapSize, only_top_rated: bool) -> ViewState {
        ViewState::new(
            MapViewport::new(GeoPoint::new(51.5074, -0.1278), zoom, size),
            only_top_rated,
        )
    }

    #[test]
    fn low_zoom_clears() {
        let builder = QueryBuilder::default();
        for zoom in 0..17 {
            assert_eq!(
                builder.plan(&view(zoom, MapSize::new(800, 600), false), None),
                QueryPlan::Clear
            );
        }
    }

    #[test]
    fn inverted_limits_do_not_panic() {
        let limits = QueryLimits {
            min_zoom: 17,
            min_radius_miles: 30.0,
            max_radius_miles: 25.0,
        };
        let builder = QueryBuilder::new(limits, 200);

        let plan = builder.plan(&view(17, MapSize::new(800, 600), false), None);
        let QueryPlan::Fetch { query, .. } = plan else {
            panic!("expected a fetch, got {plan:?}");
        };
        assert_eq!(query.max_distance_miles, 25);
    }

    #[test]
    fn low_zoom_clears_even_with_matching_key() {
        let builder = QueryBuilder::default();
        let view = view(12, MapSize::new(800, 600), false);
        let key = view.fetch_key();
        assert_eq!(builder.plan(&view, Some(&key)), QueryPlan::Clear);
    }

    #[test]
    fn identical_view_is_skipped() {
        let builder = QueryBuilder::default();
        let view = view(17, MapSize::new(800, 600), false);

        let QueryPlan::Fetch { key, .. } = builder.plan(&view, None) else {
            panic!("expected a fetch");
        };
        assert_eq!(builder.plan(&view, Some(&key)), QueryPlan::Skip);
    }

    #[test]
    fn small_view_uses_minimum_radius() {
        let builder = QueryBuilder::default();
        let view = view(19, MapSize::new(100, 100), false);

        assert!(view.radius_miles() < 0.5);
        assert_relative_eq!(builder.clamped_radius(&view), 0.5);

        let QueryPlan::Fetch { query, .. } = builder.plan(&view, None) else {
            panic!("expected a fetch");
        };
        assert_eq!(query.max_distance_miles, 1);
    }

    #[test]
    fn huge_view_uses_maximum_radius() {
        let builder = QueryBuilder::default();
        let view = view(17, MapSize::new(200_000, 200_000), false);

        assert!(view.radius_miles() > 25.0);
        assert_relative_eq!(builder.clamped_radius(&view), 25.0);

        let QueryPlan::Fetch { query, .. } = builder.plan(&view, None) else {
            panic!("expected a fetch");
        };
        assert_eq!(query.max_distance_miles, 25);
    }

    #[test]
    fn radius_is_always_within_bounds() {
        let builder = QueryBuilder::default();
        for zoom in 17..=21 {
            for side in [1, 50, 500, 5_000, 50_000, 500_000] {
                let radius = builder.clamped_radius(&view(zoom, MapSize::new(side, side), false));
                assert!((0.5..=25.0).contains(&radius), "radius {radius} for {zoom}/{side}");
            }
        }
    }

    #[test]
    fn query_parameters() {
        let builder = QueryBuilder::default();
        let QueryPlan::Fetch { query, .. } =
            builder.plan(&view(17, MapSize::new(800, 600), false), None)
        else {
            panic!("expected a fetch");
        };

        assert_eq!(
            query.params(),
            vec![
                ("latitude", "51.5074".to_string()),
                ("longitude", "-0.1278".to_string()),
                ("maxDistanceLimit", "1".to_string()),
                ("sortOptionKey", "distance".to_string()),
                ("pageSize", "200".to_string()),
                ("pageNumber", "1".to_string()),
            ]
        );
    }

    #[test]
    fn top_rated_filter_adds_scheme_and_rating() {
        let builder = QueryBuilder::default();
        let QueryPlan::Fetch { query, .. } =
            builder.plan(&view(18, MapSize::new(800, 600), true), None)
        else {
            panic!("expected a fetch");
        };

        let params = query.params();
        assert!(params.contains(&("schemeTypeKey", "FHRS".to_string())));
        assert!(params.contains(&("ratingKey", "5".to_string())));
    }

    #[test]
    fn configured_limits_are_respected() {
        let limits = QueryLimits {
            min_zoom: 10,
            min_radius_miles: 2.0,
            max_radius_miles: 3.0,
        };
        let builder = QueryBuilder::new(limits, 50);

        let QueryPlan::Fetch { query, .. } =
            builder.plan(&view(12, MapSize::new(800, 600), false), None)
        else {
            panic!("expected a fetch");
        };
        assert_eq!(query.page_size, 50);
        assert!((2..=3).contains(&query.max_distance_miles));
    }
}
