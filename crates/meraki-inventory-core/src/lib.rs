// meraki-inventory-core: Dashboard device directory -> automation host inventory.

pub mod config;
pub mod credentials;
pub mod directory;
pub mod error;
pub mod inventory;
pub mod keyed_groups;
pub mod populator;

// ── Primary re-exports ──────────────────────────────────────────────
pub use config::{ConfigSource, InventoryConfig, PLUGIN_NAME, YamlConfigSource, verify_file};
pub use credentials::{API_KEY_VAR, Credentials, ORG_ID_VAR};
pub use directory::DeviceDirectory;
pub use error::{InventoryError, KeyedGroupError};
pub use inventory::{Inventory, InventorySink};
pub use keyed_groups::KeyedGroup;
pub use populator::{BASE_GROUP, InventoryPopulator, PopulateSummary, populate_from_dashboard};
