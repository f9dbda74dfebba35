//! Infrastructure Layer
//!
//! Cross-cutting concerns shared by the adapters.

pub mod http_client;

pub use http_client::{build_http_client, HttpClientConfig};
