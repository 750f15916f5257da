//! CLI error types with miette diagnostics.
//!
//! Maps `InventoryError` variants into user-facing errors with help text.

use miette::Diagnostic;
use thiserror::Error;

use meraki_inventory_core::InventoryError;

pub mod exit_code {
    pub const UPSTREAM: i32 = 1;
    pub const USAGE: i32 = 2;
    pub const CREDENTIALS: i32 = 3;
}

#[derive(Debug, Error, Diagnostic)]
pub enum CliError {
    // ── Credentials ──────────────────────────────────────────────────
    #[error("{var} environment variable not set or is empty.")]
    #[diagnostic(
        code(meraki::missing_credential),
        help("Export {var} before running the inventory, e.g. `export {var}=...`.")
    )]
    MissingCredential { var: &'static str },

    // ── Configuration ────────────────────────────────────────────────
    #[error("{message}")]
    #[diagnostic(
        code(meraki::config),
        help(
            "The inventory source must be named *meraki_devices.yml or *meraki_devices.yaml\n\
             and contain `plugin: meraki_devices`."
        )
    )]
    Config { message: String },

    // ── Upstream ─────────────────────────────────────────────────────
    #[error("{message}")]
    #[diagnostic(
        code(meraki::upstream),
        help("Check the API key, the organization ID, and connectivity to api.meraki.com.")
    )]
    Upstream { message: String },

    // ── Output ───────────────────────────────────────────────────────
    #[error("failed to render inventory: {0}")]
    #[diagnostic(code(meraki::render))]
    Json(#[from] serde_json::Error),

    #[error("failed to render inventory: {0}")]
    #[diagnostic(code(meraki::render))]
    Yaml(#[from] serde_yaml::Error),

    #[error(transparent)]
    Io(#[from] std::io::Error),
}

impl CliError {
    /// Map this error to an exit code for process termination.
    pub fn exit_code(&self) -> i32 {
        match self {
            Self::MissingCredential { .. } => exit_code::CREDENTIALS,
            Self::Config { .. } => exit_code::USAGE,
            Self::Upstream { .. } | Self::Json(_) | Self::Yaml(_) | Self::Io(_) => {
                exit_code::UPSTREAM
            }
        }
    }
}

// ── InventoryError → CliError mapping ────────────────────────────────

impl From<InventoryError> for CliError {
    fn from(err: InventoryError) -> Self {
        match err {
            InventoryError::MissingCredential { var } => Self::MissingCredential { var },
            fetch @ InventoryError::Fetch { .. } => Self::Upstream {
                message: fetch.to_string(),
            },
            other => Self::Config {
                message: other.to_string(),
            },
        }
    }
}
