//! Domain Layer
//!
//! Entities, value objects, errors, ports and pure services for
//! resolving a device's local time. No I/O happens here.

pub mod entities;
pub mod errors;
pub mod ports;
pub mod services;
pub mod value_objects;
