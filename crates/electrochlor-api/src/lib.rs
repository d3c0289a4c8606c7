// electrochlor-api: Async Rust client for the Electrochlor local HTTP API

pub mod client;
pub mod endpoint;
pub mod error;
pub mod payload;
pub mod transport;

pub use client::ElectrochlorClient;
pub use endpoint::DeviceEndpoint;
pub use error::Error;
pub use payload::{Payload, coerce_bool, find_key, lookup_scoped};
pub use transport::TransportConfig;
