//! The two secrets a pass needs, resolved once and passed by value.

use secrecy::{ExposeSecret, SecretString};

use crate::error::InventoryError;

pub const API_KEY_VAR: &str = "MERAKI_API_KEY";
pub const ORG_ID_VAR: &str = "MERAKI_ORG_ID";

#[derive(Debug, Clone)]
pub struct Credentials {
    pub api_key: SecretString,
    pub org_id: String,
}

impl Credentials {
    /// Read `MERAKI_API_KEY` and `MERAKI_ORG_ID` from the process environment.
    pub fn from_env() -> Result<Self, InventoryError> {
        Self::from_lookup(|name| std::env::var(name).ok())
    }

    /// Resolve both values through `lookup`, trimming whitespace.
    ///
    /// The API key is checked first, so a pass missing both reports the key.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, InventoryError> {
        let api_key = required(&lookup, API_KEY_VAR)?;
        let org_id = required(&lookup, ORG_ID_VAR)?;

        Ok(Self {
            api_key: SecretString::from(api_key),
            org_id,
        })
    }

    pub fn api_key(&self) -> &str {
        self.api_key.expose_secret()
    }
}

fn required(
    lookup: &impl Fn(&str) -> Option<String>,
    var: &'static str,
) -> Result<String, InventoryError> {
    lookup(var)
        .map(|v| v.trim().to_owned())
        .filter(|v| !v.is_empty())
        .ok_or(InventoryError::MissingCredential { var })
}
