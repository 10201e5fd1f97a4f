use serde::{Deserialize, Serialize};
use std::fmt;
use uuid::Uuid;

use crate::model::{Coordinate, MapMode, OverlayRadius, ZoomLevel};

// --- Typed IDs ---

macro_rules! typed_id {
    ($name:ident) => {
        #[derive(Serialize, Deserialize, Clone, Copy, Debug, PartialEq, Eq, Hash)]
        pub struct $name(Uuid);

        impl $name {
            pub fn new() -> Self {
                Self(Uuid::new_v4())
            }
            pub fn as_uuid(&self) -> &Uuid {
                &self.0
            }
        }

        impl Default for $name {
            fn default() -> Self {
                Self::new()
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                fmt::Display::fmt(&self.0, f)
            }
        }
    };
}

typed_id!(LookupId);

/// Input from the map screen.
#[derive(Serialize, Deserialize, Clone, Copy, Debug, PartialEq, Eq)]
pub enum UiAction {
    /// Center the camera on the device position.
    RequestLocate,
    /// The user asked for location access.
    RequestPermission,
    /// The platform reported that location access was granted.
    PermissionGranted,
    /// Rotate the camera back to north.
    ResetBearing,
    SetMapMode(MapMode),
    SetOverlayRadius(OverlayRadius),
}

impl UiAction {
    #[must_use]
    pub const fn name(&self) -> &'static str {
        match self {
            Self::RequestLocate => "request_locate",
            Self::RequestPermission => "request_permission",
            Self::PermissionGranted => "permission_granted",
            Self::ResetBearing => "reset_bearing",
            Self::SetMapMode(_) => "set_map_mode",
            Self::SetOverlayRadius(_) => "set_overlay_radius",
        }
    }
}

/// One-shot instruction for the presentation layer. Never replayed.
#[derive(Serialize, Deserialize, Clone, Copy, Debug, PartialEq)]
pub enum Effect {
    /// Show the platform location permission prompt for [`crate::LOCATION_PERMISSIONS`].
    PromptForPermission,
    MoveCameraTo { target: Coordinate, zoom: ZoomLevel },
    SetBearing { degrees: f64 },
}
