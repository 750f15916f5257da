mod cli;
mod error;
mod output;

use std::io::IsTerminal;

use clap::Parser;
use tracing_subscriber::EnvFilter;

use meraki_inventory_core::{
    ConfigSource, Credentials, Inventory, InventoryConfig, YamlConfigSource,
    populate_from_dashboard,
};

use crate::cli::Cli;
use crate::error::CliError;

#[tokio::main(flavor = "current_thread")]
async fn main() {
    let cli = Cli::parse();

    init_tracing(cli.verbose);

    if let Err(err) = run(cli).await {
        let code = err.exit_code();
        eprintln!("{:?}", miette::Report::new(err));
        std::process::exit(code);
    }
}

fn init_tracing(verbosity: u8) {
    let filter = match verbosity {
        0 => "warn",
        1 => "info",
        2 => "debug",
        _ => "trace",
    };

    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(filter)),
        )
        .with_writer(std::io::stderr)
        .with_ansi(std::io::stderr().is_terminal())
        .with_target(false)
        .init();
}

async fn run(cli: Cli) -> Result<(), CliError> {
    // Config and credentials are both checked before any request is made.
    let config = match cli.config.as_deref() {
        Some(path) => YamlConfigSource.read_config(path)?,
        None => InventoryConfig::default(),
    };
    let credentials = Credentials::from_env()?;

    let mut inventory = Inventory::default();
    let summary =
        populate_from_dashboard(&mut inventory, &credentials, &config, &cli.base_url).await?;
    tracing::debug!(?summary, "pass complete");

    let doc = match (cli.list, cli.host.as_deref()) {
        (false, Some(host)) => inventory.to_host_json(host),
        _ => inventory.to_list_json(),
    };

    let rendered = output::render(cli.output, &doc, cli.pretty)?;
    output::print_output(&rendered)
}
