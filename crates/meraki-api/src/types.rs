// Wire types for the Dashboard API v1 resources the inventory reads.
//
// A device keeps the JSON object the dashboard sent, untouched; the typed
// fields are a read-only view derived from it. Null or oddly typed fields
// the inventory does not need never fail decoding.

use serde::{Deserialize, Deserializer, Serialize};
use serde_json::{Map, Value};

// ── Network ──────────────────────────────────────────────────────────

/// `GET /organizations/{organizationId}/networks` element.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Network {
    pub id: String,
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub organization_id: Option<String>,
    #[serde(default, deserialize_with = "null_as_default")]
    pub product_types: Vec<String>,
    #[serde(default, deserialize_with = "null_as_default")]
    pub tags: Vec<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub time_zone: Option<String>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

fn null_as_default<'de, D, T>(deserializer: D) -> Result<T, D::Error>
where
    D: Deserializer<'de>,
    T: Deserialize<'de> + Default,
{
    Ok(Option::<T>::deserialize(deserializer)?.unwrap_or_default())
}

// ── Device ───────────────────────────────────────────────────────────

/// `GET /networks/{networkId}/devices` element.
///
/// Only `mac` and `model` are required (as strings). Every other typed
/// field is `None` / empty when absent, null, or not of the expected type.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(try_from = "Map<String, Value>", into = "Map<String, Value>")]
pub struct Device {
    pub mac: String,
    pub serial: Option<String>,
    pub name: Option<String>,
    pub model: String,
    /// Management address. Absent for devices that have never checked in.
    pub lan_ip: Option<String>,
    pub network_id: Option<String>,
    pub firmware: Option<String>,
    pub tags: Vec<String>,
    raw: Map<String, Value>,
}

impl TryFrom<Map<String, Value>> for Device {
    type Error = String;

    fn try_from(raw: Map<String, Value>) -> Result<Self, Self::Error> {
        let required = |key: &str| {
            text(&raw, key).ok_or_else(|| format!("device is missing string field `{key}`"))
        };

        Ok(Self {
            mac: required("mac")?,
            model: required("model")?,
            serial: text(&raw, "serial"),
            name: text(&raw, "name"),
            lan_ip: text(&raw, "lanIp"),
            network_id: text(&raw, "networkId"),
            firmware: text(&raw, "firmware"),
            tags: match raw.get("tags") {
                Some(Value::Array(items)) => items
                    .iter()
                    .filter_map(|t| t.as_str().map(str::to_owned))
                    .collect(),
                _ => Vec::new(),
            },
            raw,
        })
    }
}

impl From<Device> for Map<String, Value> {
    fn from(device: Device) -> Self {
        device.raw
    }
}

fn text(raw: &Map<String, Value>, key: &str) -> Option<String> {
    raw.get(key).and_then(Value::as_str).map(str::to_owned)
}

impl Device {
    /// Non-blank device name, if the dashboard has one.
    pub fn display_name(&self) -> Option<&str> {
        self.name.as_deref().map(str::trim).filter(|n| !n.is_empty())
    }

    /// Non-blank management address.
    pub fn management_address(&self) -> Option<&str> {
        self.lan_ip.as_deref().map(str::trim).filter(|ip| !ip.is_empty())
    }

    /// The device exactly as the dashboard described it, nulls included.
    pub fn attributes(&self) -> &Map<String, Value> {
        &self.raw
    }
}
