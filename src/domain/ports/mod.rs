mod address_resolver;
mod geocode_resolver;
mod offset_cache;
mod timezone_resolver;

pub use address_resolver::AddressResolver;
pub use geocode_resolver::GeocodeResolver;
pub use offset_cache::{OffsetCache, ProcessCache};
pub use timezone_resolver::TimezoneResolver;
