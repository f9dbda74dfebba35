use crate::adapters::outbound::GoogleMapsConfig;
use crate::infrastructure::HttpClientConfig;
use serde::Deserialize;
use std::time::Duration;

#[derive(Debug, Deserialize, Clone)]
pub struct Config {
    // Google Maps settings
    pub geocode_key: String,
    pub time_zone_key: String,
    pub maps_base_url: String,

    // Durable offset store
    pub db_path: String,

    // Outbound HTTP
    pub http_timeout_secs: u64,

    // Diagnostics
    pub debug: bool,
    pub debug_time_millis: Option<i64>,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            geocode_key: String::new(),
            time_zone_key: String::new(),
            maps_base_url: "https://maps.googleapis.com".to_string(),
            db_path: "offsets.db".to_string(),
            http_timeout_secs: 4,
            debug: false,
            debug_time_millis: None,
        }
    }
}

impl Config {
    /// Build a config from any variable lookup (the process environment in production).
    pub fn from_lookup<F>(lookup: F) -> Self
    where
        F: Fn(&str) -> Option<String>,
    {
        let defaults = Self::default();

        let geocode_key = lookup("GEOCODE_KEY").unwrap_or_default();
        let time_zone_key = lookup("TIME_ZONE_KEY").unwrap_or_default();

        let maps_base_url = lookup("TUNES_MAPS_BASE_URL").unwrap_or(defaults.maps_base_url);

        let db_path = lookup("TUNES_DB_PATH").unwrap_or(defaults.db_path);

        let http_timeout_secs = lookup("TUNES_HTTP_TIMEOUT_SECS")
            .and_then(|v| v.parse().ok())
            .filter(|secs| *secs > 0)
            .unwrap_or(defaults.http_timeout_secs);

        let debug = lookup("DEBUG").is_some();

        let debug_time_millis = lookup("DEBUG_TIME")
            .filter(|v| !v.is_empty())
            .and_then(|v| v.parse().ok());

        Self {
            geocode_key,
            time_zone_key,
            maps_base_url,
            db_path,
            http_timeout_secs,
            debug,
            debug_time_millis,
        }
    }

    pub fn google_maps(&self) -> GoogleMapsConfig {
        GoogleMapsConfig {
            base_url: self.maps_base_url.clone(),
            geocode_key: self.geocode_key.clone(),
            time_zone_key: self.time_zone_key.clone(),
        }
    }

    pub fn http_client(&self) -> HttpClientConfig {
        HttpClientConfig::with_timeout(Duration::from_secs(self.http_timeout_secs))
    }
}

pub fn load_config() -> anyhow::Result<Config> {
    let cfg = Config::from_lookup(|key| std::env::var(key).ok());

    if cfg.geocode_key.is_empty() {
        tracing::warn!("GEOCODE_KEY is not set, geocode lookups will be rejected");
    }
    if cfg.time_zone_key.is_empty() {
        tracing::warn!("TIME_ZONE_KEY is not set, timezone lookups will be rejected");
    }

    Ok(cfg)
}

#[cfg(test)]
#[cfg_attr(coverage_nightly, coverage(off))]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn from_pairs(pairs: &[(&str, &str)]) -> Config {
        let vars: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        Config::from_lookup(|key| vars.get(key).cloned())
    }

    #[test]
    fn test_default_config() {
        let cfg = Config::default();
        assert_eq!(cfg.maps_base_url, "https://maps.googleapis.com");
        assert_eq!(cfg.db_path, "offsets.db");
        assert_eq!(cfg.http_timeout_secs, 4);
        assert!(!cfg.debug);
        assert_eq!(cfg.debug_time_millis, None);
    }

    #[test]
    fn test_empty_environment_uses_defaults() {
        let cfg = from_pairs(&[]);
        assert!(cfg.geocode_key.is_empty());
        assert!(cfg.time_zone_key.is_empty());
        assert_eq!(cfg.db_path, "offsets.db");
        assert_eq!(cfg.http_timeout_secs, 4);
    }

    #[test]
    fn test_api_keys() {
        let cfg = from_pairs(&[("GEOCODE_KEY", "geo"), ("TIME_ZONE_KEY", "tz")]);
        assert_eq!(cfg.geocode_key, "geo");
        assert_eq!(cfg.time_zone_key, "tz");

        let maps = cfg.google_maps();
        assert_eq!(maps.geocode_key, "geo");
        assert_eq!(maps.time_zone_key, "tz");
        assert_eq!(maps.base_url, "https://maps.googleapis.com");
    }

    #[test]
    fn test_custom_paths() {
        let cfg = from_pairs(&[
            ("TUNES_DB_PATH", "/tmp/offsets.db"),
            ("TUNES_MAPS_BASE_URL", "http://127.0.0.1:9000"),
        ]);
        assert_eq!(cfg.db_path, "/tmp/offsets.db");
        assert_eq!(cfg.maps_base_url, "http://127.0.0.1:9000");
    }

    #[test]
    fn test_http_timeout() {
        let cfg = from_pairs(&[("TUNES_HTTP_TIMEOUT_SECS", "10")]);
        assert_eq!(cfg.http_timeout_secs, 10);
        assert_eq!(cfg.http_client().timeout, Duration::from_secs(10));
    }

    #[test]
    fn test_parse_error_uses_default() {
        let cfg = from_pairs(&[("TUNES_HTTP_TIMEOUT_SECS", "not_a_number")]);
        assert_eq!(cfg.http_timeout_secs, 4);

        let cfg = from_pairs(&[("TUNES_HTTP_TIMEOUT_SECS", "0")]);
        assert_eq!(cfg.http_timeout_secs, 4);
    }

    #[test]
    fn test_debug_flags() {
        let cfg = from_pairs(&[("DEBUG", "1"), ("DEBUG_TIME", "1710053100000")]);
        assert!(cfg.debug);
        assert_eq!(cfg.debug_time_millis, Some(1_710_053_100_000));
    }

    #[test]
    fn test_invalid_debug_time_ignored() {
        let cfg = from_pairs(&[("DEBUG_TIME", "noon")]);
        assert_eq!(cfg.debug_time_millis, None);

        let cfg = from_pairs(&[("DEBUG_TIME", "")]);
        assert_eq!(cfg.debug_time_millis, None);
    }

    #[test]
    fn test_load_config_reads_process_environment() {
        // Only checks that loading succeeds; values depend on the environment.
        assert!(load_config().is_ok());
    }
}
