//! Read side of the device directory: networks of an organization and
//! devices of a network. Implemented by the dashboard client and by test
//! doubles.

use std::future::Future;

use meraki_api::{DashboardClient, Device, Network};

pub trait DeviceDirectory {
    type Error: std::error::Error + Send + Sync + 'static;

    /// Every network in the organization, fully depaginated.
    fn organization_networks(
        &self,
        org_id: &str,
    ) -> impl Future<Output = Result<Vec<Network>, Self::Error>> + Send;

    fn network_devices(
        &self,
        network_id: &str,
    ) -> impl Future<Output = Result<Vec<Device>, Self::Error>> + Send;
}

impl DeviceDirectory for DashboardClient {
    type Error = meraki_api::Error;

    fn organization_networks(
        &self,
        org_id: &str,
    ) -> impl Future<Output = Result<Vec<Network>, Self::Error>> + Send {
        DashboardClient::organization_networks(self, org_id)
    }

    fn network_devices(
        &self,
        network_id: &str,
    ) -> impl Future<Output = Result<Vec<Device>, Self::Error>> + Send {
        DashboardClient::network_devices(self, network_id)
    }
}
