//! Inventory source file: `*meraki_devices.yml` / `*meraki_devices.yaml`.
//!
//! ```yaml
//! plugin: meraki_devices
//! strict: false
//! keyed_groups:
//!   - prefix: meraki_model
//!     key: model
//!   - prefix: meraki_network_id
//!     key: networkId
//! ```
//!
//! Unknown keys are accepted and ignored.

use std::path::Path;

use figment::{
    Figment,
    providers::{Format, Yaml},
};
use indexmap::IndexMap;
use serde::Deserialize;
use serde_json::Value;

use crate::error::InventoryError;
use crate::keyed_groups::KeyedGroup;

/// Value the `plugin` key must carry.
pub const PLUGIN_NAME: &str = "meraki_devices";

const ACCEPTED_SUFFIXES: [&str; 2] = ["meraki_devices.yml", "meraki_devices.yaml"];

// ── Config struct ───────────────────────────────────────────────────

#[derive(Debug, Clone, Deserialize)]
pub struct InventoryConfig {
    pub plugin: String,

    /// Fail the pass when a keyed-group rule cannot be applied to a host.
    #[serde(default)]
    pub strict: bool,

    #[serde(default)]
    pub keyed_groups: Vec<KeyedGroup>,

    /// Static variables set on every emitted host.
    #[serde(default)]
    pub host_vars: IndexMap<String, Value>,

    /// Static variables per group name.
    #[serde(default)]
    pub group_vars: IndexMap<String, IndexMap<String, Value>>,
}

impl Default for InventoryConfig {
    fn default() -> Self {
        Self {
            plugin: PLUGIN_NAME.into(),
            strict: false,
            keyed_groups: Vec::new(),
            host_vars: IndexMap::new(),
            group_vars: IndexMap::new(),
        }
    }
}

impl InventoryConfig {
    /// Check the parts serde cannot.
    pub fn validate(&self) -> Result<(), InventoryError> {
        if self.plugin != PLUGIN_NAME {
            return Err(InventoryError::WrongPlugin {
                found: self.plugin.clone(),
            });
        }

        for rule in &self.keyed_groups {
            if rule.key.trim().is_empty() {
                return Err(InventoryError::Config {
                    message: "keyed_groups entry has an empty 'key'".into(),
                });
            }
            if rule.default_value.is_some() && !rule.trailing_separator {
                return Err(InventoryError::Config {
                    message: format!(
                        "keyed_groups entry for '{}': parameters 'default_value' and \
                         'trailing_separator' are mutually exclusive",
                        rule.key
                    ),
                });
            }
        }

        Ok(())
    }
}

// ── Loading ─────────────────────────────────────────────────────────

/// Where a pass gets its configuration from.
pub trait ConfigSource {
    fn read_config(&self, path: &Path) -> Result<InventoryConfig, InventoryError>;
}

/// Reads the YAML inventory source through figment.
#[derive(Debug, Default, Clone, Copy)]
pub struct YamlConfigSource;

impl ConfigSource for YamlConfigSource {
    fn read_config(&self, path: &Path) -> Result<InventoryConfig, InventoryError> {
        verify_file(path)?;

        let config: InventoryConfig = Figment::new().merge(Yaml::file(path)).extract()?;
        config.validate()?;

        tracing::debug!(
            path = %path.display(),
            strict = config.strict,
            keyed_groups = config.keyed_groups.len(),
            "inventory configuration loaded"
        );
        Ok(config)
    }
}

/// Accept only existing files named `*meraki_devices.yml` / `*meraki_devices.yaml`.
pub fn verify_file(path: &Path) -> Result<(), InventoryError> {
    let name_ok = path
        .to_str()
        .is_some_and(|p| ACCEPTED_SUFFIXES.iter().any(|s| p.ends_with(s)));

    if name_ok && path.is_file() {
        Ok(())
    } else {
        Err(InventoryError::UnsupportedFile {
            path: path.display().to_string(),
        })
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use serde_json::json;
    use std::fs;

    fn write(dir: &tempfile::TempDir, name: &str, body: &str) -> std::path::PathBuf {
        let path = dir.path().join(name);
        fs::write(&path, body).unwrap();
        path
    }

    #[test]
    fn loads_full_config() {
        let dir = tempfile::tempdir().unwrap();
        let path = write(
            &dir,
            "meraki_devices.yml",
            r"
plugin: meraki_devices
strict: true
keyed_groups:
  - prefix: meraki_model
    key: model
  - key: networkId
    separator: '-'
    parent_group: networks
host_vars:
  ansible_network_os: meraki
group_vars:
  meraki_devices:
    ansible_connection: local
some_unknown_option: 17
",
        );

        let config = YamlConfigSource.read_config(&path).unwrap();

        assert!(config.strict);
        assert_eq!(config.keyed_groups.len(), 2);
        assert_eq!(config.keyed_groups[0].prefix, "meraki_model");
        assert_eq!(config.keyed_groups[0].separator, "_");
        assert_eq!(config.keyed_groups[1].separator, "-");
        assert_eq!(config.keyed_groups[1].parent_group.as_deref(), Some("networks"));
        assert_eq!(config.host_vars["ansible_network_os"], json!("meraki"));
        assert_eq!(
            config.group_vars["meraki_devices"]["ansible_connection"],
            json!("local")
        );
    }

    #[test]
    fn defaults_are_lenient() {
        let dir = tempfile::tempdir().unwrap();
        let path = write(&dir, "site.meraki_devices.yaml", "plugin: meraki_devices\n");

        let config = YamlConfigSource.read_config(&path).unwrap();

        assert!(!config.strict);
        assert!(config.keyed_groups.is_empty());
        assert!(config.host_vars.is_empty());
    }

    #[test]
    fn rejects_foreign_plugin() {
        let dir = tempfile::tempdir().unwrap();
        let path = write(&dir, "meraki_devices.yml", "plugin: aws_ec2\n");

        let err = YamlConfigSource.read_config(&path).unwrap_err();
        assert!(matches!(err, InventoryError::WrongPlugin { ref found } if found == "aws_ec2"));
    }

    #[test]
    fn rejects_other_file_names() {
        let dir = tempfile::tempdir().unwrap();
        let path = write(&dir, "inventory.yml", "plugin: meraki_devices\n");

        let err = YamlConfigSource.read_config(&path).unwrap_err();
        assert!(matches!(err, InventoryError::UnsupportedFile { .. }));
    }

    #[test]
    fn rejects_missing_file() {
        let dir = tempfile::tempdir().unwrap();
        let err = verify_file(&dir.path().join("meraki_devices.yml")).unwrap_err();
        assert!(matches!(err, InventoryError::UnsupportedFile { .. }));
    }

    #[test]
    fn default_value_conflicts_with_trailing_separator() {
        let dir = tempfile::tempdir().unwrap();
        let path = write(
            &dir,
            "meraki_devices.yml",
            r"
plugin: meraki_devices
keyed_groups:
  - key: tags
    default_value: untagged
    trailing_separator: false
",
        );

        let err = YamlConfigSource.read_config(&path).unwrap_err();
        assert!(matches!(err, InventoryError::Config { .. }), "got {err:?}");
    }

    #[test]
    fn malformed_yaml_is_figment_error() {
        let dir = tempfile::tempdir().unwrap();
        let path = write(&dir, "meraki_devices.yml", "plugin: [unterminated\n");

        let err = YamlConfigSource.read_config(&path).unwrap_err();
        assert!(matches!(err, InventoryError::Figment(_)));
    }
}
