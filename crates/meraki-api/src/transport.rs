// Transport configuration for building the dashboard reqwest::Client.
//
// Redirects are disabled at the reqwest level: the dashboard answers with
// shard redirects and reqwest drops `Authorization` on cross-host hops,
// so the client follows them itself.

use std::time::Duration;

use reqwest::header::HeaderMap;
use reqwest::redirect;

use crate::error::Error;

/// Shared transport configuration for building HTTP clients.
#[derive(Debug, Clone)]
pub struct TransportConfig {
    pub timeout: Duration,
    pub user_agent: String,
}

impl Default for TransportConfig {
    fn default() -> Self {
        Self {
            timeout: Duration::from_secs(60),
            user_agent: concat!("meraki-inventory/", env!("CARGO_PKG_VERSION")).to_owned(),
        }
    }
}

impl TransportConfig {
    /// Build a `reqwest::Client` carrying the given default headers.
    pub fn build_client_with_headers(&self, headers: HeaderMap) -> Result<reqwest::Client, Error> {
        reqwest::Client::builder()
            .timeout(self.timeout)
            .user_agent(self.user_agent.as_str())
            .redirect(redirect::Policy::none())
            .default_headers(headers)
            .build()
            .map_err(Error::Transport)
    }
}
