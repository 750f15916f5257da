//! Clap derive structures for the `meraki-inventory` script.
//!
//! Speaks the dynamic-inventory script protocol: `--list` prints the whole
//! inventory, `--host <name>` prints one host's variables.

use std::path::PathBuf;

use clap::{Parser, ValueEnum};

/// meraki-inventory -- Meraki dashboard devices as an automation inventory
#[derive(Debug, Parser)]
#[command(
    name = "meraki-inventory",
    version,
    about = "List Meraki dashboard devices as a dynamic host inventory",
    long_about = "Reads every network of the organization in MERAKI_ORG_ID with the API key in\n\
        MERAKI_API_KEY and prints hosts, groups, and variables as inventory JSON.\n\n\
        Devices without a LAN IP are skipped with a warning on stderr."
)]
pub struct Cli {
    /// Print the full inventory (default)
    #[arg(long, conflicts_with = "host")]
    pub list: bool,

    /// Print the variables of a single host
    #[arg(long, value_name = "HOST")]
    pub host: Option<String>,

    /// Inventory source file (*meraki_devices.yml / *meraki_devices.yaml)
    #[arg(long, short = 'c', env = "MERAKI_INVENTORY_CONFIG", value_name = "PATH")]
    pub config: Option<PathBuf>,

    /// Output format
    #[arg(long, short = 'o', default_value = "json")]
    pub output: OutputFormat,

    /// Pretty-print JSON output
    #[arg(long)]
    pub pretty: bool,

    /// Increase verbosity (-v, -vv, -vvv)
    #[arg(long, short = 'v', action = clap::ArgAction::Count)]
    pub verbose: u8,

    /// Dashboard API base URL
    #[arg(
        long,
        env = "MERAKI_API_BASE_URL",
        default_value = meraki_api::DEFAULT_BASE_URL,
        hide = true
    )]
    pub base_url: String,
}

#[derive(Debug, Clone, Copy, ValueEnum)]
pub enum OutputFormat {
    /// JSON (what inventory consumers expect)
    Json,
    /// YAML
    Yaml,
}
