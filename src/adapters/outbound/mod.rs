mod alexa_address_resolver;
mod dashmap_process_cache;
mod google_maps_client;
mod sqlite_offset_cache;

pub use alexa_address_resolver::AlexaAddressResolver;
pub use dashmap_process_cache::DashMapProcessCache;
pub use google_maps_client::{GoogleMapsClient, GoogleMapsConfig};
pub use sqlite_offset_cache::SqliteOffsetCache;
