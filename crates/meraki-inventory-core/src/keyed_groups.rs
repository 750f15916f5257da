// ── Keyed groups ──
//
// Data-driven grouping rules evaluated against a host's raw attribute map.
// A rule names an attribute (dotted path), and every value found there
// becomes a group `<prefix><separator><value>` the host joins.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::error::KeyedGroupError;
use crate::inventory::InventorySink;

/// One `keyed_groups` entry.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct KeyedGroup {
    /// Attribute path, e.g. `model` or `details.role`.
    pub key: String,

    #[serde(default)]
    pub prefix: String,

    #[serde(default = "default_separator")]
    pub separator: String,

    /// Group that every group produced by this rule becomes a child of.
    #[serde(default)]
    pub parent_group: Option<String>,

    /// Stand-in for an empty string value.
    #[serde(default)]
    pub default_value: Option<String>,

    /// Keep `separator` after a mapping key whose value is empty.
    #[serde(default = "default_true")]
    pub trailing_separator: bool,

    /// Keep `separator` at the front when `prefix` is empty.
    #[serde(default = "default_true")]
    pub leading_separator: bool,
}

fn default_separator() -> String {
    "_".into()
}

fn default_true() -> bool {
    true
}

impl KeyedGroup {
    pub fn new(key: impl Into<String>, prefix: impl Into<String>) -> Self {
        Self {
            key: key.into(),
            prefix: prefix.into(),
            separator: default_separator(),
            parent_group: None,
            default_value: None,
            trailing_separator: true,
            leading_separator: true,
        }
    }

    /// Full group names this rule yields for `attributes`.
    ///
    /// `Ok(None)` means the attribute resolved but carried nothing to group on.
    pub fn group_names(
        &self,
        attributes: &Map<String, Value>,
    ) -> Result<Option<Vec<String>>, String> {
        let value = resolve(attributes, &self.key)?;
        Ok(self.raw_names(value).map(|raw| {
            let sep = if self.prefix.is_empty() && !self.leading_separator {
                ""
            } else {
                self.separator.as_str()
            };
            raw.iter()
                .map(|name| sanitize_group_name(&format!("{}{sep}{name}", self.prefix)))
                .collect()
        }))
    }

    fn raw_names(&self, value: &Value) -> Option<Vec<String>> {
        match value {
            Value::Null => None,
            Value::String(s) if s.is_empty() => self.default_value.clone().map(|d| vec![d]),
            Value::Array(items) if items.is_empty() => None,
            Value::Array(items) => Some(
                items
                    .iter()
                    .map(|item| match (scalar_text(item).as_str(), &self.default_value) {
                        ("", Some(default)) => default.clone(),
                        (text, _) => text.to_owned(),
                    })
                    .collect(),
            ),
            Value::Object(map) if map.is_empty() => None,
            Value::Object(map) => Some(
                map.iter()
                    .map(|(k, v)| {
                        let text = scalar_text(v);
                        match (&self.default_value, text.is_empty()) {
                            (Some(default), true) => format!("{k}{}{default}", self.separator),
                            (None, true) if !self.trailing_separator => k.clone(),
                            _ => format!("{k}{}{text}", self.separator),
                        }
                    })
                    .collect(),
            ),
            scalar => Some(vec![scalar_text(scalar)]),
        }
    }
}

/// Apply every rule to `host`, adding groups and memberships to `sink`.
///
/// Under `strict`, the first rule that cannot be applied aborts with an
/// error; otherwise such rules are skipped for this host.
pub fn apply<S: InventorySink + ?Sized>(
    sink: &mut S,
    rules: &[KeyedGroup],
    attributes: &Map<String, Value>,
    host: &str,
    strict: bool,
) -> Result<(), KeyedGroupError> {
    for rule in rules {
        let names = match rule.group_names(attributes) {
            Ok(Some(names)) => names,
            Ok(None) if strict => {
                return Err(KeyedGroupError::Empty {
                    host: host.to_owned(),
                    key: rule.key.clone(),
                });
            }
            Err(reason) if strict => {
                return Err(KeyedGroupError::Unresolvable {
                    host: host.to_owned(),
                    key: rule.key.clone(),
                    reason,
                });
            }
            Ok(None) | Err(_) => {
                tracing::trace!(host, key = %rule.key, "keyed group skipped");
                continue;
            }
        };

        let parent = rule
            .parent_group
            .as_deref()
            .map(|p| sink.add_group(&sanitize_group_name(p)));

        for name in names {
            let group = sink.add_group(&name);
            sink.add_host(host, &group);
            if let Some(ref parent) = parent {
                sink.add_child(parent, &group);
            }
        }
    }

    Ok(())
}

/// Replace every character outside `[A-Za-z0-9_]` with `_`.
pub fn sanitize_group_name(name: &str) -> String {
    name.chars()
        .map(|c| if c.is_ascii_alphanumeric() || c == '_' { c } else { '_' })
        .collect()
}

fn resolve<'a>(attributes: &'a Map<String, Value>, key: &str) -> Result<&'a Value, String> {
    let mut segments = key.split('.');
    let first = segments.next().unwrap_or_default();
    let mut current = attributes
        .get(first)
        .ok_or_else(|| format!("'{first}' is undefined"))?;

    for segment in segments {
        current = match current {
            Value::Object(map) => map.get(segment),
            Value::Array(items) => segment.parse::<usize>().ok().and_then(|i| items.get(i)),
            _ => None,
        }
        .ok_or_else(|| format!("'{key}' is undefined (no '{segment}')"))?;
    }

    Ok(current)
}

fn scalar_text(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        Value::Null => String::new(),
        other => other.to_string(),
    }
}
