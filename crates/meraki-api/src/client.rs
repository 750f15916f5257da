// Hand-crafted async HTTP client for the Meraki Dashboard API v1.
//
// Base path: /api/v1/
// Auth: `Authorization: Bearer <key>`
// Pagination: RFC 5988 `Link` header, followed until no `rel=next` remains.

use std::collections::HashSet;

use reqwest::StatusCode;
use reqwest::header::{self, HeaderMap, HeaderValue};
use secrecy::{ExposeSecret, SecretString};
use serde::de::DeserializeOwned;
use tracing::debug;
use url::Url;

use crate::Error;
use crate::transport::TransportConfig;
use crate::types::{Device, Network};

/// Stable public base URL of the Dashboard API.
pub const DEFAULT_BASE_URL: &str = "https://api.meraki.com/api/v1/";

/// Page size requested from paginated endpoints (dashboard maximum for networks).
const PER_PAGE: u32 = 1000;

/// Shard redirects are normally a single hop.
const MAX_REDIRECTS: usize = 5;

// ── Error response shape from the Dashboard API ──────────────────────

#[derive(serde::Deserialize)]
struct ErrorResponse {
    #[serde(default)]
    errors: Vec<String>,
}

// ── Client ───────────────────────────────────────────────────────────

/// Async client for the Meraki Dashboard API.
///
/// Issues one request at a time; callers that want concurrency must
/// drive several futures themselves.
pub struct DashboardClient {
    http: reqwest::Client,
    base_url: Url,
}

impl DashboardClient {
    // ── Constructors ─────────────────────────────────────────────────

    /// Build from an API key and transport config.
    ///
    /// Injects the bearer token as a sensitive default header.
    pub fn new(
        base_url: &str,
        api_key: &SecretString,
        transport: &TransportConfig,
    ) -> Result<Self, Error> {
        let mut headers = HeaderMap::new();
        let mut auth = HeaderValue::from_str(&format!("Bearer {}", api_key.expose_secret()))
            .map_err(|e| Error::Authentication {
                message: format!("invalid API key header value: {e}"),
            })?;
        auth.set_sensitive(true);
        headers.insert(header::AUTHORIZATION, auth);
        headers.insert(header::ACCEPT, HeaderValue::from_static("application/json"));

        let http = transport.build_client_with_headers(headers)?;
        let base_url = Self::normalize_base_url(base_url)?;

        Ok(Self { http, base_url })
    }

    /// Wrap an existing `reqwest::Client` (caller manages auth headers).
    pub fn from_reqwest(base_url: &str, http: reqwest::Client) -> Result<Self, Error> {
        let base_url = Self::normalize_base_url(base_url)?;
        Ok(Self { http, base_url })
    }

    /// Ensure the base path ends with `/` so relative joins stay under it.
    fn normalize_base_url(raw: &str) -> Result<Url, Error> {
        let mut url = Url::parse(raw)?;
        let path = url.path().trim_end_matches('/').to_owned();
        url.set_path(&format!("{path}/"));
        Ok(url)
    }

    pub fn base_url(&self) -> &Url {
        &self.base_url
    }

    // ── Request plumbing ─────────────────────────────────────────────

    /// Append `segments` to the base path, percent-encoding each one.
    fn url(&self, segments: &[&str], params: &[(&str, String)]) -> Result<Url, Error> {
        let mut url = self.base_url.clone();
        url.path_segments_mut()
            .map_err(|()| Error::InvalidUrl(url::ParseError::RelativeUrlWithCannotBeABaseBase))?
            .pop_if_empty()
            .extend(segments);
        if !params.is_empty() {
            url.query_pairs_mut()
                .extend_pairs(params.iter().map(|(k, v)| (*k, v.as_str())));
        }
        Ok(url)
    }

    /// GET with manual redirect following.
    async fn send(&self, mut url: Url) -> Result<reqwest::Response, Error> {
        for _ in 0..=MAX_REDIRECTS {
            debug!("GET {url}");
            let resp = self.http.get(url.clone()).send().await?;
            if !resp.status().is_redirection() {
                return Ok(resp);
            }

            let location = resp
                .headers()
                .get(header::LOCATION)
                .and_then(|v| v.to_str().ok())
                .ok_or_else(|| Error::MissingRedirectLocation {
                    url: url.to_string(),
                })?;
            let target = url.join(location)?;
            debug!(from = %url, to = %target, "following redirect");
            url = target;
        }

        Err(Error::TooManyRedirects {
            url: url.to_string(),
            limit: MAX_REDIRECTS,
        })
    }

    async fn get<T: DeserializeOwned>(&self, segments: &[&str]) -> Result<T, Error> {
        let url = self.url(segments, &[])?;
        let resp = self.send(url).await?;
        handle_response(resp).await
    }

    /// Collect every page of a list endpoint into a single `Vec<T>`.
    async fn get_all_pages<T: DeserializeOwned>(
        &self,
        segments: &[&str],
        params: &[(&str, String)],
    ) -> Result<Vec<T>, Error> {
        let mut all = Vec::new();
        let mut visited = HashSet::new();
        let mut next = Some(self.url(segments, params)?);

        while let Some(url) = next.take() {
            visited.insert(url.clone());
            let resp = self.send(url.clone()).await?;
            let link = next_link(resp.headers());
            let page: Vec<T> = handle_response(resp).await?;
            debug!(received = page.len(), "page fetched");
            all.extend(page);

            if let Some(link) = link {
                let candidate = url.join(&link)?;
                // A Link cycle would otherwise never terminate.
                if visited.contains(&candidate) {
                    debug!(url = %candidate, "pagination revisits a page, stopping");
                } else {
                    next = Some(candidate);
                }
            }
        }

        Ok(all)
    }

    // ━━ Public API ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━

    /// Every network in the organization, all pages.
    pub async fn organization_networks(&self, org_id: &str) -> Result<Vec<Network>, Error> {
        self.get_all_pages(
            &["organizations", org_id, "networks"],
            &[("perPage", PER_PAGE.to_string())],
        )
        .await
    }

    /// Devices claimed into a network.
    pub async fn network_devices(&self, network_id: &str) -> Result<Vec<Device>, Error> {
        self.get(&["networks", network_id, "devices"]).await
    }
}

// ── Response handling ────────────────────────────────────────────────

async fn handle_response<T: DeserializeOwned>(resp: reqwest::Response) -> Result<T, Error> {
    let status = resp.status();
    if status.is_success() {
        let body = resp.text().await?;
        serde_json::from_str(&body).map_err(|e| {
            let preview: String = body.chars().take(200).collect();
            Error::Deserialization {
                message: format!("{e} (body preview: {preview:?})"),
                body,
            }
        })
    } else {
        Err(parse_error(status, resp).await)
    }
}

async fn parse_error(status: StatusCode, resp: reqwest::Response) -> Error {
    let path = resp.url().path().to_owned();
    let retry_after = resp
        .headers()
        .get(header::RETRY_AFTER)
        .and_then(|v| v.to_str().ok())
        .and_then(|v| v.trim().parse::<u64>().ok());

    let raw = resp.text().await.unwrap_or_default();
    let message = match serde_json::from_str::<ErrorResponse>(&raw) {
        Ok(err) if !err.errors.is_empty() => err.errors.join("; "),
        _ if raw.trim().is_empty() => status.to_string(),
        _ => raw,
    };

    match status {
        StatusCode::UNAUTHORIZED => Error::InvalidApiKey,
        StatusCode::FORBIDDEN => Error::Forbidden { message },
        StatusCode::NOT_FOUND => Error::NotFound { path },
        StatusCode::TOO_MANY_REQUESTS => Error::RateLimited {
            retry_after_secs: retry_after.unwrap_or(1),
        },
        _ => Error::Api {
            status: status.as_u16(),
            message,
        },
    }
}

/// Extract the `rel=next` target from a `Link` header, if present.
fn next_link(headers: &HeaderMap) -> Option<String> {
    headers
        .get_all(header::LINK)
        .iter()
        .filter_map(|v| v.to_str().ok())
        .flat_map(|v| v.split(','))
        .find_map(|entry| {
            let mut parts = entry.split(';');
            let target = parts.next()?.trim();
            let is_next = parts.any(|p| {
                let p = p.trim();
                p == "rel=next" || p == "rel=\"next\""
            });
            if !is_next {
                return None;
            }
            target
                .strip_prefix('<')
                .and_then(|t| t.strip_suffix('>'))
                .map(str::to_owned)
        })
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    fn link(value: &str) -> HeaderMap {
        let mut headers = HeaderMap::new();
        headers.insert(header::LINK, HeaderValue::from_str(value).unwrap());
        headers
    }

    #[test]
    fn next_link_picks_rel_next() {
        let next = "https://api.meraki.com/api/v1/organizations/1/networks\
                    ?perPage=2&startingAfter=N_2";
        let headers = link(&format!(
            "<https://api.meraki.com/api/v1/organizations/1/networks?perPage=2>; rel=first, \
             <{next}>; rel=next"
        ));
        assert_eq!(next_link(&headers).as_deref(), Some(next));
    }

    #[test]
    fn next_link_accepts_quoted_rel() {
        let headers = link("</next?page=2>; rel=\"next\"");
        assert_eq!(next_link(&headers).as_deref(), Some("/next?page=2"));
    }

    #[test]
    fn next_link_absent_on_last_page() {
        let headers = link("<https://x/first>; rel=first, <https://x/prev>; rel=prev");
        assert_eq!(next_link(&headers), None);
        assert_eq!(next_link(&HeaderMap::new()), None);
    }

    #[test]
    fn base_url_gets_trailing_slash() {
        let client =
            DashboardClient::from_reqwest("https://api.meraki.com/api/v1", reqwest::Client::new())
                .unwrap();
        assert_eq!(client.base_url().as_str(), DEFAULT_BASE_URL);
        assert_eq!(
            client.url(&["networks", "N_1", "devices"], &[]).unwrap().as_str(),
            "https://api.meraki.com/api/v1/networks/N_1/devices"
        );
    }

    #[test]
    fn path_segments_are_escaped() {
        let client = DashboardClient::from_reqwest(DEFAULT_BASE_URL, reqwest::Client::new())
            .unwrap();
        let url = client
            .url(&["organizations", "1/../x?y#z", "networks"], &[("perPage", "5".into())])
            .unwrap();

        assert_eq!(
            url.as_str(),
            "https://api.meraki.com/api/v1/organizations/1%2F..%2Fx%3Fy%23z/networks?perPage=5"
        );
    }
}
