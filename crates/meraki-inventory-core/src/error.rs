// ── Inventory error types ──
//
// Everything that can stop a pass. Upstream failures are not classified:
// they are wrapped once with a fixed prefix and their own text.

use thiserror::Error;

/// Boxed error from whatever [`DeviceDirectory`](crate::DeviceDirectory) is in use.
pub type BoxError = Box<dyn std::error::Error + Send + Sync + 'static>;

#[derive(Debug, Error)]
pub enum InventoryError {
    // ── Configuration ────────────────────────────────────────────────
    #[error("{var} environment variable not set or is empty.")]
    MissingCredential { var: &'static str },

    #[error(
        "{path} is not a meraki_devices inventory source \
         (expected *meraki_devices.yml or *meraki_devices.yaml)"
    )]
    UnsupportedFile { path: String },

    #[error("plugin must be 'meraki_devices', got '{found}'")]
    WrongPlugin { found: String },

    #[error("invalid inventory configuration: {message}")]
    Config { message: String },

    #[error("failed to load inventory configuration: {0}")]
    Figment(Box<figment::Error>),

    #[error("failed to build Meraki API client: {0}")]
    Client(#[source] meraki_api::Error),

    // ── Fetch stage ──────────────────────────────────────────────────
    #[error("Failed to get devices from Meraki API: {source}")]
    Fetch {
        #[source]
        source: BoxError,
    },
}

impl From<figment::Error> for InventoryError {
    fn from(err: figment::Error) -> Self {
        Self::Figment(Box::new(err))
    }
}

impl InventoryError {
    pub(crate) fn fetch(err: impl Into<BoxError>) -> Self {
        Self::Fetch { source: err.into() }
    }
}

/// A keyed-group rule could not be applied to a host under `strict`.
#[derive(Debug, Error)]
pub enum KeyedGroupError {
    #[error("Could not generate group for host {host} from {key} entry: {reason}")]
    Unresolvable {
        host: String,
        key: String,
        reason: String,
    },

    #[error("No key or key resulted empty for {key} in host {host}, invalid entry")]
    Empty { host: String, key: String },
}
