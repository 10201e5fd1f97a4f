//! State core for the interactive map screen.
//!
//! The shell forwards [`UiAction`]s to a [`MapController`], renders the
//! [`UiState`] it publishes, and executes the one-shot [`Effect`]s it emits
//! (camera moves, bearing resets, permission prompts). Device location and
//! permission checks are provided by the shell through the traits in
//! [`capabilities`].

#![forbid(unsafe_code)]
#![deny(clippy::all)]
#![warn(clippy::pedantic)]
#![allow(clippy::module_name_repetitions)]
#![allow(clippy::must_use_candidate)]
#![allow(clippy::missing_errors_doc)]

pub mod capabilities;
pub mod config;
pub mod controller;
pub mod effects;
pub mod event;
pub mod metrics;
pub mod model;
pub mod store;

pub use capabilities::{
    LocationError, LocationPermission, LocationRequest, LocationResult, LocationSource,
    PermissionOracle,
};
pub use config::{ConfigError, ControllerConfig};
pub use controller::{ControllerError, MapController};
pub use effects::{EffectConsumer, EffectQueue, EffectQueueError};
pub use event::{Effect, LookupId, UiAction};
pub use metrics::{LookupMetrics, LookupMetricsSnapshot};
pub use model::{Coordinate, CoordinateError, MapMode, OverlayRadius, UiState, ZoomLevel};
pub use store::{StateStore, StateSubscription, StoreClosed};

pub const DEFAULT_DEBOUNCE_MS: u64 = 200;
pub const MAX_DEBOUNCE_MS: u64 = 5_000;
pub const DEFAULT_MAX_LOCATION_AGE_MS: u64 = 30_000;
pub const FINE_LOCATION_ZOOM: f64 = 16.0;
pub const COARSE_LOCATION_ZOOM: f64 = 13.0;
pub const MIN_ZOOM: f64 = 2.0;
pub const MAX_ZOOM: f64 = 21.0;
pub const NORTH_BEARING_DEG: f64 = 0.0;

/// Where the camera sits before the first lookup: the middle of Germany.
pub const MAP_START_LOCATION: Coordinate = Coordinate::new_unchecked(52.0, 10.45);
pub const MAP_START_ZOOM: f64 = 6.0;

/// Permissions the shell asks for when it handles [`Effect::PromptForPermission`].
pub const LOCATION_PERMISSIONS: [LocationPermission; 2] = [
    LocationPermission::CoarseLocation,
    LocationPermission::FineLocation,
];

#[must_use]
pub fn map_start_camera() -> (Coordinate, ZoomLevel) {
    (MAP_START_LOCATION, ZoomLevel::new(MAP_START_ZOOM))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn start_camera_is_valid() {
        let (center, zoom) = map_start_camera();
        assert_eq!(Coordinate::new(52.0, 10.45), Ok(center));
        assert_eq!(zoom.value(), MAP_START_ZOOM);
    }

    #[test]
    fn zoom_constants_are_in_range() {
        for zoom in [FINE_LOCATION_ZOOM, COARSE_LOCATION_ZOOM, MAP_START_ZOOM] {
            assert!((MIN_ZOOM..=MAX_ZOOM).contains(&zoom));
        }
    }

    #[test]
    fn prompt_requests_both_precisions() {
        assert!(LOCATION_PERMISSIONS.contains(&LocationPermission::CoarseLocation));
        assert!(LOCATION_PERMISSIONS.contains(&LocationPermission::FineLocation));
    }
}
