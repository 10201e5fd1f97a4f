use serde::{Deserialize, Serialize};
use std::fmt;
use thiserror::Error;

use crate::{MAX_ZOOM, MIN_ZOOM};

#[derive(Debug, Clone, Copy, PartialEq, Error)]
pub enum CoordinateError {
    #[error("Latitude {0} is out of valid range [-90, 90]")]
    LatitudeOutOfRange(f64),
    #[error("Longitude {0} is out of valid range [-180, 180]")]
    LongitudeOutOfRange(f64),
    #[error("Coordinate value is not finite (NaN or Infinity)")]
    NonFinite,
}

/// Validated lat/lon
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Coordinate {
    lat: f64,
    lon: f64,
}

impl Coordinate {
    pub fn new(lat: f64, lon: f64) -> Result<Self, CoordinateError> {
        if !lat.is_finite() || !lon.is_finite() {
            return Err(CoordinateError::NonFinite);
        }
        if !(-90.0..=90.0).contains(&lat) {
            return Err(CoordinateError::LatitudeOutOfRange(lat));
        }
        if !(-180.0..=180.0).contains(&lon) {
            return Err(CoordinateError::LongitudeOutOfRange(lon));
        }
        Ok(Self { lat, lon })
    }

    /// For compile-time constants already known to be in range.
    pub(crate) const fn new_unchecked(lat: f64, lon: f64) -> Self {
        Self { lat, lon }
    }

    #[must_use]
    pub const fn lat(self) -> f64 {
        self.lat
    }

    #[must_use]
    pub const fn lon(self) -> f64 {
        self.lon
    }

    #[must_use]
    pub const fn as_tuple(self) -> (f64, f64) {
        (self.lat, self.lon)
    }
}

impl TryFrom<(f64, f64)> for Coordinate {
    type Error = CoordinateError;

    fn try_from((lat, lon): (f64, f64)) -> Result<Self, Self::Error> {
        Self::new(lat, lon)
    }
}

impl fmt::Display for Coordinate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "({:.5}, {:.5})", self.lat, self.lon)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ZoomLevel {
    value: f64,
}

impl ZoomLevel {
    /// Out-of-range and non-finite values are pulled back into the map's zoom range.
    #[must_use]
    pub fn new(value: f64) -> Self {
        let value = if value.is_finite() { value } else { MIN_ZOOM };
        Self {
            value: value.clamp(MIN_ZOOM, MAX_ZOOM),
        }
    }

    #[must_use]
    pub const fn value(self) -> f64 {
        self.value
    }
}

/// Base map rendering.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum MapMode {
    #[default]
    Normal,
    Satellite,
}

impl MapMode {
    /// The mode the map type button switches to.
    #[must_use]
    pub const fn toggled(self) -> Self {
        match self {
            Self::Normal => Self::Satellite,
            Self::Satellite => Self::Normal,
        }
    }
}

/// Which radius overlay is drawn over the map.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum OverlayRadius {
    Small,
    #[default]
    Large,
}

impl OverlayRadius {
    #[must_use]
    pub const fn meters(self) -> u32 {
        match self {
            Self::Small => 25,
            Self::Large => 100,
        }
    }

    #[must_use]
    pub const fn toggled(self) -> Self {
        match self {
            Self::Small => Self::Large,
            Self::Large => Self::Small,
        }
    }
}

/// Snapshot rendered by the map screen. Replaced wholesale on every change.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
pub struct UiState {
    /// True only while a lookup has been outstanding for longer than the debounce delay.
    pub locating: bool,
    pub map_mode: MapMode,
    pub overlay_radius: OverlayRadius,
    /// Whether the platform "my location" layer is enabled.
    pub my_location_visible: bool,
}

impl UiState {
    #[must_use]
    pub fn initial(my_location_visible: bool) -> Self {
        Self {
            my_location_visible,
            ..Self::default()
        }
    }

    #[must_use]
    pub const fn with_locating(self, locating: bool) -> Self {
        Self { locating, ..self }
    }

    #[must_use]
    pub const fn with_map_mode(self, map_mode: MapMode) -> Self {
        Self { map_mode, ..self }
    }

    #[must_use]
    pub const fn with_overlay_radius(self, overlay_radius: OverlayRadius) -> Self {
        Self {
            overlay_radius,
            ..self
        }
    }

    #[must_use]
    pub const fn with_my_location_visible(self, my_location_visible: bool) -> Self {
        Self {
            my_location_visible,
            ..self
        }
    }
}
