//! Access to the food hygiene ratings API.

mod client;
pub mod normalize;

pub use client::FhrsClient;

use crate::error::FetchError;
use crate::establishment::Establishment;
use crate::query::EstablishmentQuery;

/// Source of establishments near a point.
#[async_trait::async_trait]
pub trait EstablishmentSource: Send + Sync {
    /// Runs the search described by the query.
    async fn search(&self, query: &EstablishmentQuery) -> Result<Vec<Establishment>, FetchError>;
}
