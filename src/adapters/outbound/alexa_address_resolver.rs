//! Alexa Device Address Resolver
//!
//! Implements AddressResolver using the device settings API's
//! country-and-postal-code endpoint.

use crate::domain::entities::{Address, DeviceIdentity};
use crate::domain::errors::ResolveError;
use crate::domain::ports::AddressResolver;
use async_trait::async_trait;
use reqwest::header::{ACCEPT, AUTHORIZATION};
use reqwest::{StatusCode, Url};
use serde::Deserialize;

const SERVICE: &str = "Device Address API";

/// Body returned by the country-and-postal-code endpoint.
///
/// Either field is null when the user never entered an address.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct CountryAndPostalCode {
    country_code: Option<String>,
    postal_code: Option<String>,
}

/// Device settings API address resolver.
pub struct AlexaAddressResolver {
    client: reqwest::Client,
}

impl AlexaAddressResolver {
    pub fn new(client: reqwest::Client) -> Self {
        Self { client }
    }

    /// `{endpoint}/v1/devices/{deviceId}/settings/address/countryAndPostalCode`
    ///
    /// The device ID is percent-encoded as a single path segment.
    fn address_url(identity: &DeviceIdentity) -> Result<Url, ResolveError> {
        let mut url = Url::parse(&identity.api_endpoint)
            .map_err(|e| ResolveError::transport(SERVICE, format!("invalid endpoint: {}", e)))?;

        url.path_segments_mut()
            .map_err(|_| ResolveError::transport(SERVICE, "endpoint cannot take a path"))?
            .pop_if_empty()
            .extend([
                "v1",
                "devices",
                identity.device_id.as_str(),
                "settings",
                "address",
                "countryAndPostalCode",
            ]);

        Ok(url)
    }

    fn parse_address(body: &str) -> Result<Address, ResolveError> {
        let parsed: CountryAndPostalCode =
            serde_json::from_str(body).map_err(|e| ResolveError::parse(SERVICE, e))?;

        match (parsed.country_code, parsed.postal_code) {
            (Some(country), Some(postal)) if !country.is_empty() && !postal.is_empty() => {
                Ok(Address::new(country, postal))
            }
            _ => Err(ResolveError::NoResult { service: SERVICE }),
        }
    }
}

#[async_trait]
impl AddressResolver for AlexaAddressResolver {
    async fn resolve_address(&self, identity: &DeviceIdentity) -> Result<Address, ResolveError> {
        let url = Self::address_url(identity)?;
        tracing::info!("device address request will be made to {}", url);

        let response = self
            .client
            .get(url)
            .header(ACCEPT, "application/json")
            .header(AUTHORIZATION, format!("Bearer {}", identity.access_token))
            .send()
            .await
            .map_err(|e| ResolveError::transport(SERVICE, e))?;

        let status = response.status();
        tracing::info!("device address response status: {}", status);

        match status {
            StatusCode::OK => {
                let body = response
                    .text()
                    .await
                    .map_err(|e| ResolveError::transport(SERVICE, e))?;
                Self::parse_address(&body)
            }
            StatusCode::FORBIDDEN => {
                tracing::warn!(
                    device_id = %identity.device_id,
                    "not authorized to read device address"
                );
                Err(ResolveError::PermissionDenied)
            }
            other => Err(ResolveError::transport(
                SERVICE,
                format!("unexpected response status: {}", other),
            )),
        }
    }
}
