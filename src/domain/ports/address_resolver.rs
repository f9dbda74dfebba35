//! Address Resolver Port
//!
//! Defines the interface for looking up a device's coarse postal address.

use crate::domain::entities::{Address, DeviceIdentity};
use crate::domain::errors::ResolveError;
use async_trait::async_trait;

/// Resolver for device identity to postal address.
///
/// This is an outbound port that abstracts the device settings API.
#[async_trait]
pub trait AddressResolver: Send + Sync {
    /// Resolve a device to its country and postal code.
    ///
    /// Returns `ResolveError::PermissionDenied` when the user has not
    /// granted address access, so the caller can ask for it.
    async fn resolve_address(&self, identity: &DeviceIdentity) -> Result<Address, ResolveError>;
}
