//! Geocode Resolver Port

use crate::domain::entities::{Address, Coordinates};
use crate::domain::errors::ResolveError;
use async_trait::async_trait;

/// Resolver for postal address to geographic coordinates.
#[async_trait]
pub trait GeocodeResolver: Send + Sync {
    /// Geocode an address, using the first match.
    ///
    /// An empty result list is `ResolveError::NoResult`, never a zero coordinate.
    async fn geocode(&self, address: &Address) -> Result<Coordinates, ResolveError>;
}
