// meraki-api: Async Rust client for the Meraki Dashboard API v1

pub mod client;
pub mod error;
pub mod transport;
pub mod types;

pub use client::{DEFAULT_BASE_URL, DashboardClient};
pub use error::Error;
pub use transport::TransportConfig;
pub use types::{Device, Network};
