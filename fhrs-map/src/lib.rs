//! Food hygiene ratings around the current map view.
//!
//! The crate turns what a map widget shows into searches of the UK food hygiene rating API and
//! the answers into rating markers. Map widgets plug in through [`MapSurface`], device position
//! through [`Geolocator`] and the data source through [`EstablishmentSource`]; a
//! [`MapSession`] drives them.
//!
//! ```no_run
//! use std::sync::Arc;
//!
//! use fhrs_map::{Config, FhrsClient, MapSession, MarkerLayer};
//!
//! # #[tokio::main]
//! # async fn main() -> Result<(), Box<dyn std::error::Error>> {
//! let config = Config::default();
//! let client = Arc::new(FhrsClient::new(&config.api)?);
//! let layer = Arc::new(MarkerLayer::new());
//!
//! let session = MapSession::builder(client, layer.clone())
//!     .with_config(config)
//!     .spawn()?;
//! # session.shutdown().await;
//! # Ok(())
//! # }
//! ```

pub mod api;
pub mod config;
pub mod error;
pub mod establishment;
pub mod geo;
pub mod geolocation;
pub mod layer;
pub mod marker;
pub mod query;
pub mod session;
pub mod style;
pub mod view;

pub use api::{EstablishmentSource, FhrsClient};
pub use config::Config;
pub use establishment::{Establishment, Scores};
pub use geo::{GeoPoint, MapSize, MapViewport};
pub use geolocation::Geolocator;
pub use layer::{MapSurface, MarkerLayer};
pub use marker::{Marker, MarkerRenderer};
pub use query::{EstablishmentQuery, QueryBuilder, QueryPlan};
pub use session::{MapSession, MapSessionHandle};
pub use view::{FetchKey, ViewState};
