// ── Inventory populator ──
//
// One linear pass: list networks, list each network's devices, register
// every device that has a management address. Any failure while fetching
// or (under `strict`) grouping aborts the pass; whatever was already
// written to the sink stays there.

use meraki_api::{DashboardClient, Device, Network, TransportConfig};
use serde_json::Value;
use tracing::{debug, info, warn};

use crate::config::InventoryConfig;
use crate::credentials::Credentials;
use crate::directory::DeviceDirectory;
use crate::error::{BoxError, InventoryError};
use crate::inventory::InventorySink;

/// Group every emitted host belongs to.
pub const BASE_GROUP: &str = "meraki_devices";

pub const VAR_ANSIBLE_HOST: &str = "ansible_host";
pub const VAR_DEVICE_TYPE: &str = "meraki_device_type";
pub const VAR_NETWORK: &str = "meraki_network";

/// What a completed pass did.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PopulateSummary {
    pub networks: usize,
    /// Hostnames in the order they were registered (duplicates repeat).
    pub hosts: Vec<String>,
    /// Name (or MAC) of every device left out for lacking a management address.
    pub skipped: Vec<String>,
}

pub struct InventoryPopulator<'a, D> {
    directory: &'a D,
    credentials: &'a Credentials,
    config: &'a InventoryConfig,
}

impl<'a, D: DeviceDirectory> InventoryPopulator<'a, D> {
    /// The organization listed is `credentials.org_id`.
    pub fn new(
        directory: &'a D,
        credentials: &'a Credentials,
        config: &'a InventoryConfig,
    ) -> Self {
        Self {
            directory,
            credentials,
            config,
        }
    }

    /// Run one pass against `sink`.
    pub async fn populate<S: InventorySink + ?Sized>(
        &self,
        sink: &mut S,
    ) -> Result<PopulateSummary, InventoryError> {
        sink.add_group(BASE_GROUP);

        let summary = self
            .fetch_into(sink)
            .await
            .map_err(InventoryError::fetch)?;

        for (group, vars) in &self.config.group_vars {
            let group = sink.add_group(group);
            for (key, value) in vars {
                sink.set_group_variable(&group, key, value.clone());
            }
        }

        info!(
            networks = summary.networks,
            hosts = summary.hosts.len(),
            skipped = summary.skipped.len(),
            "inventory populated"
        );
        Ok(summary)
    }

    async fn fetch_into<S: InventorySink + ?Sized>(
        &self,
        sink: &mut S,
    ) -> Result<PopulateSummary, BoxError> {
        let org_id = self.credentials.org_id.as_str();
        let networks = self.directory.organization_networks(org_id).await?;
        debug!(org_id, count = networks.len(), "networks listed");

        let mut summary = PopulateSummary {
            networks: networks.len(),
            ..PopulateSummary::default()
        };

        for network in &networks {
            let devices = self.directory.network_devices(&network.id).await?;
            debug!(network = %network.name, count = devices.len(), "devices listed");

            for device in &devices {
                let ident = device.display_name().unwrap_or(&device.mac);
                let Some(address) = device.management_address() else {
                    warn!("Skipping device without lanIp: {ident}");
                    summary.skipped.push(ident.to_owned());
                    continue;
                };

                self.add_device(sink, ident, address, device, network)?;
                summary.hosts.push(ident.to_owned());
            }
        }

        Ok(summary)
    }

    fn add_device<S: InventorySink + ?Sized>(
        &self,
        sink: &mut S,
        hostname: &str,
        address: &str,
        device: &Device,
        network: &Network,
    ) -> Result<(), BoxError> {
        sink.add_host(hostname, BASE_GROUP);

        for (key, value) in &self.config.host_vars {
            sink.set_variable(hostname, key, value.clone());
        }
        sink.set_variable(hostname, VAR_ANSIBLE_HOST, Value::from(address));
        sink.set_variable(hostname, VAR_DEVICE_TYPE, Value::from(device.model.as_str()));
        sink.set_variable(hostname, VAR_NETWORK, Value::from(network.name.as_str()));

        sink.apply_keyed_groups(
            &self.config.keyed_groups,
            device.attributes(),
            hostname,
            self.config.strict,
        )?;
        Ok(())
    }
}

/// Build a dashboard client for `credentials` and run one pass with it.
pub async fn populate_from_dashboard<S: InventorySink + ?Sized>(
    sink: &mut S,
    credentials: &Credentials,
    config: &InventoryConfig,
    base_url: &str,
) -> Result<PopulateSummary, InventoryError> {
    sink.add_group(BASE_GROUP);

    let client = DashboardClient::new(base_url, &credentials.api_key, &TransportConfig::default())
        .map_err(InventoryError::Client)?;

    InventoryPopulator::new(&client, credentials, config)
        .populate(sink)
        .await
}
