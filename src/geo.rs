use crate::models::Location;
use serde::Deserialize;
use std::{net::IpAddr, time::Duration};
use tracing::debug;

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct LookupResponse {
    city: Option<String>,
    country: Option<String>,
    region_name: Option<String>,
}

/// Best-effort IP to city/country lookup against an ip-api.com style service.
#[derive(Debug, Clone)]
pub struct GeoLocator {
    client: reqwest::Client,
    base_url: String,
    timeout: Duration,
}

impl GeoLocator {
    pub fn new(client: reqwest::Client, base_url: impl Into<String>, timeout: Duration) -> Self {
        Self {
            client,
            base_url: base_url.into().trim_end_matches('/').to_string(),
            timeout,
        }
    }

    /// Never fails: local addresses resolve without a request, anything that
    /// is not an IP address is unknown and any lookup error degrades to
    /// [`Location::unknown`].
    pub async fn resolve(&self, ip: &str) -> Location {
        if is_local(ip) {
            return Location::local();
        }
        let Ok(addr) = ip.parse::<IpAddr>() else {
            return Location::unknown();
        };

        match self.lookup(addr).await {
            Ok(location) => location,
            Err(err) => {
                debug!("geolocation lookup for {ip} failed: {err}");
                Location::unknown()
            }
        }
    }

    async fn lookup(&self, ip: IpAddr) -> Result<Location, reqwest::Error> {
        let url = format!("{}/json/{ip}", self.base_url);
        let response: LookupResponse = self
            .client
            .get(url)
            .query(&[("fields", "city,country,regionName")])
            .timeout(self.timeout)
            .send()
            .await?
            .error_for_status()?
            .json()
            .await?;

        Ok(Location {
            city: or_unknown(response.city),
            country: or_unknown(response.country),
            region: or_unknown(response.region_name),
        })
    }
}

fn or_unknown(value: Option<String>) -> String {
    value
        .filter(|value| !value.is_empty())
        .unwrap_or_else(|| "Unknown".to_string())
}

fn is_local(ip: &str) -> bool {
    if ip == "localhost" {
        return true;
    }
    match ip.parse::<IpAddr>() {
        Ok(IpAddr::V4(addr)) => addr.is_loopback(),
        Ok(IpAddr::V6(addr)) => {
            addr.is_loopback() || addr.to_ipv4_mapped().is_some_and(|v4| v4.is_loopback())
        }
        Err(_) => false,
    }
}
