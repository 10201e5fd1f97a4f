use std::time::Duration;

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::{
    COARSE_LOCATION_ZOOM, DEFAULT_DEBOUNCE_MS, DEFAULT_MAX_LOCATION_AGE_MS, FINE_LOCATION_ZOOM,
    MAX_DEBOUNCE_MS, MAX_ZOOM, MIN_ZOOM,
};

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("invalid controller config: {0}")]
    Invalid(String),

    #[error("failed to parse controller config: {0}")]
    Parse(#[from] serde_json::Error),
}

/// Policy values for [`crate::MapController`].
///
/// Every field has a default, so a host may pass a partial JSON object.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ControllerConfig {
    /// How long a lookup must be outstanding before the locating indicator shows.
    pub debounce_ms: u64,
    pub max_location_age_ms: u64,
    /// Camera zoom after a lookup when precise location is granted.
    pub fine_zoom: f64,
    /// Camera zoom after a lookup with approximate location only.
    pub coarse_zoom: f64,
}

impl Default for ControllerConfig {
    fn default() -> Self {
        Self {
            debounce_ms: DEFAULT_DEBOUNCE_MS,
            max_location_age_ms: DEFAULT_MAX_LOCATION_AGE_MS,
            fine_zoom: FINE_LOCATION_ZOOM,
            coarse_zoom: COARSE_LOCATION_ZOOM,
        }
    }
}

impl ControllerConfig {
    pub fn from_json(json: &str) -> Result<Self, ConfigError> {
        let config: Self = serde_json::from_str(json)?;
        config.validate()?;
        Ok(config)
    }

    pub fn with_debounce(mut self, debounce: Duration) -> Self {
        self.debounce_ms = u64::try_from(debounce.as_millis()).unwrap_or(u64::MAX);
        self
    }

    pub fn with_max_location_age(mut self, max_age: Duration) -> Self {
        self.max_location_age_ms = u64::try_from(max_age.as_millis()).unwrap_or(u64::MAX);
        self
    }

    pub fn with_zoom_levels(mut self, fine: f64, coarse: f64) -> Self {
        self.fine_zoom = fine;
        self.coarse_zoom = coarse;
        self
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.debounce_ms == 0 {
            return Err(ConfigError::Invalid("debounce_ms must be > 0".into()));
        }
        if self.debounce_ms > MAX_DEBOUNCE_MS {
            return Err(ConfigError::Invalid(format!(
                "debounce_ms must be at most {MAX_DEBOUNCE_MS}"
            )));
        }
        if self.max_location_age_ms == 0 {
            return Err(ConfigError::Invalid(
                "max_location_age_ms must be > 0".into(),
            ));
        }
        for (name, zoom) in [("fine_zoom", self.fine_zoom), ("coarse_zoom", self.coarse_zoom)] {
            if !zoom.is_finite() || !(MIN_ZOOM..=MAX_ZOOM).contains(&zoom) {
                return Err(ConfigError::Invalid(format!(
                    "{name} must be within [{MIN_ZOOM}, {MAX_ZOOM}], got {zoom}"
                )));
            }
        }
        Ok(())
    }

    pub fn debounce(&self) -> Duration {
        Duration::from_millis(self.debounce_ms)
    }

    pub fn max_location_age(&self) -> Duration {
        Duration::from_millis(self.max_location_age_ms)
    }
}
