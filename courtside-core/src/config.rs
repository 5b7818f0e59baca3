//! Tunable knobs for matching, filtering, and freshness.

use std::collections::HashMap;

use chrono::TimeDelta;
use serde::{Deserialize, Serialize};

use crate::district::{DEFAULT_MATCH_THRESHOLD, DistrictMatcher};
use crate::filter::DEFAULT_MIN_QUERY_LENGTH;
use crate::freshness::{DEFAULT_TTL_SECS, FreshnessTracker};
use crate::model::SportType;

/// Longest accepted TTL, in seconds.
pub const MAX_TTL_SECS: u64 = 366 * 24 * 60 * 60;

#[derive(thiserror::Error, Debug)]
/// Errors raised while loading configuration.
pub enum ConfigError {
    /// The document is not valid JSON for [`CoreConfig`].
    #[error("Invalid configuration: {0}")]
    Parse(#[from] serde_json::Error),
    /// A value is outside its accepted range.
    #[error("Invalid value for {field}: {reason}")]
    OutOfRange {
        /// Offending field.
        field: &'static str,
        /// Why the value was rejected.
        reason: &'static str,
    },
}

/// Top-level configuration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CoreConfig {
    /// Minimum score for a district name match.
    #[serde(default = "default_match_threshold")]
    pub district_match_threshold: f64,
    /// Trimmed characters required before search filtering starts.
    #[serde(default = "default_min_search_length")]
    pub min_search_length: usize,
    /// Data freshness settings.
    #[serde(default)]
    pub freshness: FreshnessConfig,
}

/// Time-to-live settings.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FreshnessConfig {
    /// TTL applied to every sport without an override.
    #[serde(default = "default_ttl_secs")]
    pub default_ttl_secs: u64,
    /// Per-sport TTL overrides, in seconds.
    #[serde(default)]
    pub per_sport: HashMap<SportType, u64>,
}

fn default_match_threshold() -> f64 {
    DEFAULT_MATCH_THRESHOLD
}

fn default_min_search_length() -> usize {
    DEFAULT_MIN_QUERY_LENGTH
}

fn default_ttl_secs() -> u64 {
    DEFAULT_TTL_SECS.unsigned_abs()
}

impl Default for CoreConfig {
    fn default() -> Self {
        Self {
            district_match_threshold: default_match_threshold(),
            min_search_length: default_min_search_length(),
            freshness: FreshnessConfig::default(),
        }
    }
}

impl Default for FreshnessConfig {
    fn default() -> Self {
        Self {
            default_ttl_secs: default_ttl_secs(),
            per_sport: HashMap::new(),
        }
    }
}

impl CoreConfig {
    /// Parse and validate a JSON document; missing fields take their defaults.
    ///
    /// # Errors
    ///
    /// Returns a [`ConfigError`] when the JSON is malformed or a value is out of range.
    pub fn from_json_str(raw: &str) -> Result<Self, ConfigError> {
        let config: Self = serde_json::from_str(raw)?;
        config.validate()?;
        Ok(config)
    }

    /// Check value ranges.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::OutOfRange`] for the first invalid value.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if !(0.0..=1.0).contains(&self.district_match_threshold) {
            return Err(ConfigError::OutOfRange {
                field: "district_match_threshold",
                reason: "must be between 0.0 and 1.0",
            });
        }
        let ttls = std::iter::once(&self.freshness.default_ttl_secs)
            .chain(self.freshness.per_sport.values());
        for secs in ttls {
            if *secs == 0 {
                return Err(ConfigError::OutOfRange {
                    field: "freshness",
                    reason: "TTLs must be positive",
                });
            }
            if *secs > MAX_TTL_SECS {
                return Err(ConfigError::OutOfRange {
                    field: "freshness",
                    reason: "TTLs must not exceed one year",
                });
            }
        }
        Ok(())
    }

    /// District matcher using the configured threshold.
    #[must_use]
    pub fn district_matcher(&self) -> DistrictMatcher {
        DistrictMatcher::new(self.district_match_threshold)
    }

    /// Freshness tracker with the configured TTLs.
    #[must_use]
    pub fn freshness_tracker(&self) -> FreshnessTracker {
        self.freshness.per_sport.iter().fold(
            FreshnessTracker::new(ttl(self.freshness.default_ttl_secs)),
            |tracker, (sport, secs)| tracker.with_ttl(*sport, ttl(*secs)),
        )
    }
}

fn ttl(secs: u64) -> TimeDelta {
    i64::try_from(secs)
        .ok()
        .and_then(TimeDelta::try_seconds)
        .unwrap_or(TimeDelta::MAX)
}
