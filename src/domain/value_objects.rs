//! Value Objects - Immutable domain primitives

use serde::{Deserialize, Serialize};

/// Where a device's offset came from.
///
/// The lookup tiers are tried in order: process cache, durable cache,
/// then a fresh resolution. `Default` means every tier failed and the
/// caller should fall back to UTC.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ResolutionSource {
    /// Held in memory by this process
    ProcessCache,
    /// Read from the durable offset table
    DurableCache,
    /// Resolved just now via address, geocode and timezone lookups
    Fresh,
    /// Could not be determined; offset is 0 (UTC)
    Default,
}

impl ResolutionSource {
    /// Convert to string representation.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::ProcessCache => "PROCESS_CACHE",
            Self::DurableCache => "DURABLE_CACHE",
            Self::Fresh => "FRESH",
            Self::Default => "DEFAULT",
        }
    }

    /// True when the local time could not be determined.
    pub fn is_fallback(&self) -> bool {
        matches!(self, Self::Default)
    }
}

impl std::fmt::Display for ResolutionSource {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_source_as_str() {
        let tests = vec![
            (ResolutionSource::ProcessCache, "PROCESS_CACHE"),
            (ResolutionSource::DurableCache, "DURABLE_CACHE"),
            (ResolutionSource::Fresh, "FRESH"),
            (ResolutionSource::Default, "DEFAULT"),
        ];

        for (source, expected) in tests {
            assert_eq!(source.as_str(), expected);
            assert_eq!(source.to_string(), expected);
        }
    }

    #[test]
    fn test_only_default_is_fallback() {
        assert!(ResolutionSource::Default.is_fallback());
        assert!(!ResolutionSource::ProcessCache.is_fallback());
        assert!(!ResolutionSource::DurableCache.is_fallback());
        assert!(!ResolutionSource::Fresh.is_fallback());
    }

    #[test]
    fn test_serde_matches_display() {
        let json = serde_json::to_string(&ResolutionSource::DurableCache).unwrap();
        assert_eq!(json, "\"DURABLE_CACHE\"");

        let parsed: ResolutionSource = serde_json::from_str("\"FRESH\"").unwrap();
        assert_eq!(parsed, ResolutionSource::Fresh);
    }
}
