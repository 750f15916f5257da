//! Inventory sink: groups, hosts, and variables.
//!
//! [`InventorySink`] is the narrow surface the populator writes through.
//! [`Inventory`] is the in-memory implementation the binary renders as a
//! dynamic-inventory `--list` document.

use indexmap::{IndexMap, IndexSet};
use serde_json::{Map, Value, json};

use crate::error::KeyedGroupError;
use crate::keyed_groups::{self, KeyedGroup};

/// Name of the implicit group holding hosts that belong to no other group.
const UNGROUPED: &str = "ungrouped";

/// Root group; its `children` are computed, never nested by the caller.
const ALL: &str = "all";

/// Reserved top-level key carrying every host's variables.
const META: &str = "_meta";

// ── Sink trait ──────────────────────────────────────────────────────

pub trait InventorySink {
    /// Create `name` if missing; returns the name the group is stored under.
    fn add_group(&mut self, name: &str) -> String;

    /// Register `host` (idempotent) and make it a member of `group`.
    fn add_host(&mut self, host: &str, group: &str);

    /// Nest `child` under `parent`, creating both if missing.
    fn add_child(&mut self, parent: &str, child: &str);

    /// Set a host variable. Later writes replace earlier ones.
    fn set_variable(&mut self, host: &str, key: &str, value: Value);

    fn set_group_variable(&mut self, group: &str, key: &str, value: Value);

    /// Derive extra memberships for `host` from `rules` evaluated on `attributes`.
    fn apply_keyed_groups(
        &mut self,
        rules: &[KeyedGroup],
        attributes: &Map<String, Value>,
        host: &str,
        strict: bool,
    ) -> Result<(), KeyedGroupError> {
        keyed_groups::apply(self, rules, attributes, host, strict)
    }
}

// ── In-memory inventory ─────────────────────────────────────────────

#[derive(Debug, Clone, Default)]
pub struct Group {
    hosts: IndexSet<String>,
    children: IndexSet<String>,
    vars: IndexMap<String, Value>,
}

impl Group {
    pub fn hosts(&self) -> &IndexSet<String> {
        &self.hosts
    }

    pub fn children(&self) -> &IndexSet<String> {
        &self.children
    }

    pub fn vars(&self) -> &IndexMap<String, Value> {
        &self.vars
    }
}

#[derive(Debug, Clone, Default)]
pub struct Inventory {
    groups: IndexMap<String, Group>,
    hosts: IndexMap<String, IndexMap<String, Value>>,
}

impl Inventory {
    pub fn group(&self, name: &str) -> Option<&Group> {
        self.groups.get(name)
    }

    pub fn group_names(&self) -> Vec<&str> {
        self.groups.keys().map(String::as_str).collect()
    }

    pub fn host_names(&self) -> Vec<&str> {
        self.hosts.keys().map(String::as_str).collect()
    }

    pub fn host_vars(&self, host: &str) -> Option<&IndexMap<String, Value>> {
        self.hosts.get(host)
    }

    pub fn contains_host(&self, host: &str) -> bool {
        self.hosts.contains_key(host)
    }

    pub fn host_count(&self) -> usize {
        self.hosts.len()
    }

    /// Render the `--list` document.
    ///
    /// Every group gets an entry (with `hosts`, `children`, `vars` only when
    /// non-empty); `all.children` lists the groups nobody nests; hostvars
    /// go under `_meta` so the caller never has to ask per host.
    ///
    /// A group that shares a reserved name (`all`, `ungrouped`, `_meta`) is
    /// merged into the computed entry instead of replacing it.
    pub fn to_list_json(&self) -> Value {
        let mut doc = Map::new();

        let hostvars: Map<String, Value> = self
            .hosts
            .iter()
            .map(|(name, vars)| (name.clone(), vars_object(vars)))
            .collect();
        doc.insert(META.into(), json!({ "hostvars": hostvars }));

        let nested: IndexSet<&str> = self
            .groups
            .values()
            .flat_map(|g| g.children.iter().map(String::as_str))
            .collect();
        let mut top_level: Vec<&str> = self
            .groups
            .keys()
            .map(String::as_str)
            .filter(|name| ![ALL, UNGROUPED, META].contains(name) && !nested.contains(name))
            .collect();

        let ungrouped: Vec<&str> = self
            .hosts
            .keys()
            .map(String::as_str)
            .filter(|host| {
                !self
                    .groups
                    .iter()
                    .any(|(name, g)| name != UNGROUPED && g.hosts.contains(*host))
            })
            .collect();
        if !ungrouped.is_empty() {
            doc.insert(UNGROUPED.into(), json!({ "hosts": ungrouped }));
        }
        if !ungrouped.is_empty() || self.groups.contains_key(UNGROUPED) {
            top_level.push(UNGROUPED);
        }
        doc.insert(ALL.into(), json!({ "children": top_level }));

        for (name, group) in &self.groups {
            let mut entry = Map::new();
            if !group.hosts.is_empty() {
                entry.insert("hosts".into(), json!(group.hosts));
            }
            if !group.children.is_empty() {
                entry.insert("children".into(), json!(group.children));
            }
            if !group.vars.is_empty() {
                entry.insert("vars".into(), vars_object(&group.vars));
            }
            match doc.get_mut(name) {
                Some(existing) => merge_value(existing, Value::Object(entry)),
                None => {
                    doc.insert(name.clone(), Value::Object(entry));
                }
            }
        }

        Value::Object(doc)
    }

    /// Render the `--host <name>` document (empty object for unknown hosts).
    pub fn to_host_json(&self, host: &str) -> Value {
        self.hosts
            .get(host)
            .map_or_else(|| Value::Object(Map::new()), vars_object)
    }
}

fn vars_object(vars: &IndexMap<String, Value>) -> Value {
    Value::Object(vars.iter().map(|(k, v)| (k.clone(), v.clone())).collect())
}

/// Objects merge key by key, arrays union in order, anything else is replaced.
fn merge_value(existing: &mut Value, value: Value) {
    match (existing, value) {
        (Value::Object(into), Value::Object(from)) => {
            for (key, value) in from {
                match into.get_mut(&key) {
                    Some(slot) => merge_value(slot, value),
                    None => {
                        into.insert(key, value);
                    }
                }
            }
        }
        (Value::Array(into), Value::Array(from)) => {
            for item in from {
                if !into.contains(&item) {
                    into.push(item);
                }
            }
        }
        (slot, value) => *slot = value,
    }
}

impl InventorySink for Inventory {
    fn add_group(&mut self, name: &str) -> String {
        self.groups.entry(name.to_owned()).or_default();
        name.to_owned()
    }

    fn add_host(&mut self, host: &str, group: &str) {
        self.hosts.entry(host.to_owned()).or_default();
        self.groups
            .entry(group.to_owned())
            .or_default()
            .hosts
            .insert(host.to_owned());
    }

    fn add_child(&mut self, parent: &str, child: &str) {
        self.groups.entry(child.to_owned()).or_default();
        self.groups
            .entry(parent.to_owned())
            .or_default()
            .children
            .insert(child.to_owned());
    }

    fn set_variable(&mut self, host: &str, key: &str, value: Value) {
        self.hosts
            .entry(host.to_owned())
            .or_default()
            .insert(key.to_owned(), value);
    }

    fn set_group_variable(&mut self, group: &str, key: &str, value: Value) {
        self.groups
            .entry(group.to_owned())
            .or_default()
            .vars
            .insert(key.to_owned(), value);
    }
}
