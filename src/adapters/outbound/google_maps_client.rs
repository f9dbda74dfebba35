//! Google Maps Client
//!
//! Implements GeocodeResolver and TimezoneResolver using the Google Maps
//! Geocoding and Time Zone web services. Each service has its own response
//! type and parser.

use crate::domain::entities::{Address, Coordinates, UtcOffset};
use crate::domain::errors::ResolveError;
use crate::domain::ports::{GeocodeResolver, TimezoneResolver};
use async_trait::async_trait;
use serde::Deserialize;
use std::fmt;

const GEOCODE_SERVICE: &str = "Geocode API";
const TIMEZONE_SERVICE: &str = "Time Zone API";

const GEOCODE_PATH: &str = "/maps/api/geocode/json";
const TIMEZONE_PATH: &str = "/maps/api/timezone/json";

const STATUS_OK: &str = "OK";

/// Largest offset magnitude accepted from the Time Zone API, in seconds.
const MAX_OFFSET_SECONDS: f64 = 86_400.0;
const STATUS_ZERO_RESULTS: &str = "ZERO_RESULTS";

/// A decimal that may arrive as a JSON number or a string.
#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum Decimal {
    Number(serde_json::Number),
    Text(String),
}

impl fmt::Display for Decimal {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Number(n) => write!(f, "{}", n),
            Self::Text(s) => write!(f, "{}", s),
        }
    }
}

/// Geocoding response; only the fields this client reads.
#[derive(Debug, Deserialize)]
struct GeocodeResponse {
    #[serde(default)]
    results: Vec<GeocodeResult>,
    status: String,
    error_message: Option<String>,
}

#[derive(Debug, Deserialize)]
struct GeocodeResult {
    formatted_address: Option<String>,
    geometry: Geometry,
}

#[derive(Debug, Deserialize)]
struct Geometry {
    location: Location,
}

#[derive(Debug, Deserialize)]
struct Location {
    lat: Decimal,
    lng: Decimal,
}

impl fmt::Display for GeocodeResponse {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "status={} results={}", self.status, self.results.len())?;
        if let Some(first) = self.results.first() {
            write!(
                f,
                " first=[{} @ {},{}]",
                first.formatted_address.as_deref().unwrap_or("?"),
                first.geometry.location.lat,
                first.geometry.location.lng
            )?;
        }
        Ok(())
    }
}

/// Time Zone response; offsets are in seconds.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct TimezoneResponse {
    dst_offset: Option<f64>,
    raw_offset: Option<f64>,
    status: String,
    time_zone_id: Option<String>,
    time_zone_name: Option<String>,
    error_message: Option<String>,
}

impl fmt::Display for TimezoneResponse {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "status={} zone={} ({}) raw={:?}s dst={:?}s",
            self.status,
            self.time_zone_id.as_deref().unwrap_or("?"),
            self.time_zone_name.as_deref().unwrap_or("?"),
            self.raw_offset,
            self.dst_offset
        )
    }
}

/// Configuration for the Google Maps web services.
#[derive(Debug, Clone)]
pub struct GoogleMapsConfig {
    /// Scheme and host, e.g. "https://maps.googleapis.com"
    pub base_url: String,
    pub geocode_key: String,
    pub time_zone_key: String,
}

impl Default for GoogleMapsConfig {
    fn default() -> Self {
        Self {
            base_url: "https://maps.googleapis.com".to_string(),
            geocode_key: String::new(),
            time_zone_key: String::new(),
        }
    }
}

/// Google Maps geocoding and timezone client.
pub struct GoogleMapsClient {
    config: GoogleMapsConfig,
    client: reqwest::Client,
}

impl GoogleMapsClient {
    pub fn new(config: GoogleMapsConfig, client: reqwest::Client) -> Self {
        Self { config, client }
    }

    fn url(&self, path: &str) -> String {
        format!("{}{}", self.config.base_url.trim_end_matches('/'), path)
    }

    /// Issue a GET and return the body of a 2xx response.
    async fn fetch(
        &self,
        service: &'static str,
        url: &str,
        query: &[(&str, &str)],
    ) -> Result<String, ResolveError> {
        // Keys stay out of the logs.
        tracing::info!(
            "{} request will be made to {} with {:?}",
            service,
            url,
            query.iter().filter(|(k, _)| *k != "key").collect::<Vec<_>>()
        );

        let response = self
            .client
            .get(url)
            .query(query)
            .send()
            .await
            .map_err(|e| ResolveError::transport(service, e))?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(ResolveError::transport(
                service,
                format!("unexpected response status: {} - {}", status, body),
            ));
        }

        response
            .text()
            .await
            .map_err(|e| ResolveError::transport(service, e))
    }

    /// Parse a geocoding body into the first result's coordinates.
    fn parse_geocode(body: &str) -> Result<Coordinates, ResolveError> {
        let response: GeocodeResponse =
            serde_json::from_str(body).map_err(|e| ResolveError::parse(GEOCODE_SERVICE, e))?;

        tracing::debug!("geocode response: {}", response);

        match response.status.as_str() {
            STATUS_OK => {}
            STATUS_ZERO_RESULTS => {
                return Err(ResolveError::NoResult {
                    service: GEOCODE_SERVICE,
                })
            }
            other => {
                if let Some(message) = &response.error_message {
                    tracing::warn!("geocode error message: {}", message);
                }
                return Err(ResolveError::Rejected {
                    service: GEOCODE_SERVICE,
                    status: other.to_string(),
                });
            }
        }

        let first = response
            .results
            .into_iter()
            .next()
            .ok_or(ResolveError::NoResult {
                service: GEOCODE_SERVICE,
            })?;

        let location = first.geometry.location;
        Ok(Coordinates::new(location.lat.to_string(), location.lng.to_string()))
    }

    /// Parse a Time Zone body into raw and DST offsets.
    fn parse_timezone(body: &str) -> Result<UtcOffset, ResolveError> {
        let response: TimezoneResponse =
            serde_json::from_str(body).map_err(|e| ResolveError::parse(TIMEZONE_SERVICE, e))?;

        tracing::info!("timezone response: {}", response);

        match response.status.as_str() {
            STATUS_OK => {}
            STATUS_ZERO_RESULTS => {
                return Err(ResolveError::NoResult {
                    service: TIMEZONE_SERVICE,
                })
            }
            other => {
                if let Some(message) = &response.error_message {
                    tracing::warn!("timezone error message: {}", message);
                }
                return Err(ResolveError::Rejected {
                    service: TIMEZONE_SERVICE,
                    status: other.to_string(),
                });
            }
        }

        match (response.raw_offset, response.dst_offset) {
            (Some(raw), Some(dst)) => Ok(UtcOffset::new(
                Self::offset_seconds("rawOffset", raw)?,
                Self::offset_seconds("dstOffset", dst)?,
            )),
            _ => Err(ResolveError::parse(
                TIMEZONE_SERVICE,
                "missing rawOffset or dstOffset",
            )),
        }
    }

    /// Whole seconds for an offset field; values beyond one day are rejected.
    fn offset_seconds(field: &str, value: f64) -> Result<i64, ResolveError> {
        if !value.is_finite() || value.abs() > MAX_OFFSET_SECONDS {
            return Err(ResolveError::parse(
                TIMEZONE_SERVICE,
                format!("{} out of range: {}", field, value),
            ));
        }
        Ok(value.round() as i64)
    }
}

#[async_trait]
impl GeocodeResolver for GoogleMapsClient {
    async fn geocode(&self, address: &Address) -> Result<Coordinates, ResolveError> {
        let url = self.url(GEOCODE_PATH);
        let query = address.to_query();

        let body = self
            .fetch(
                GEOCODE_SERVICE,
                &url,
                &[
                    ("address", query.as_str()),
                    ("key", self.config.geocode_key.as_str()),
                ],
            )
            .await?;

        let coordinates = Self::parse_geocode(&body)?;
        tracing::info!("coordinates for {}: {}", address, coordinates);
        Ok(coordinates)
    }
}

#[async_trait]
impl TimezoneResolver for GoogleMapsClient {
    async fn resolve_offset(
        &self,
        coordinates: &Coordinates,
        timestamp_seconds: i64,
    ) -> Result<UtcOffset, ResolveError> {
        let url = self.url(TIMEZONE_PATH);
        let location = coordinates.to_location();
        let timestamp = timestamp_seconds.to_string();

        let body = self
            .fetch(
                TIMEZONE_SERVICE,
                &url,
                &[
                    ("location", location.as_str()),
                    ("timestamp", timestamp.as_str()),
                    ("key", self.config.time_zone_key.as_str()),
                ],
            )
            .await?;

        let offset = Self::parse_timezone(&body)?;
        tracing::info!("offset at {}: {}", coordinates, offset);
        Ok(offset)
    }
}
