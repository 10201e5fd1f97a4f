use std::sync::Arc;

use serde::{Deserialize, Serialize};

/// Location capabilities the platform can grant independently.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum LocationPermission {
    CoarseLocation,
    FineLocation,
}

impl LocationPermission {
    #[must_use]
    pub const fn android_name(self) -> &'static str {
        match self {
            Self::CoarseLocation => "android.permission.ACCESS_COARSE_LOCATION",
            Self::FineLocation => "android.permission.ACCESS_FINE_LOCATION",
        }
    }
}

/// Synchronous, side-effect free permission check provided by the shell.
pub trait PermissionOracle: Send + Sync {
    fn is_granted(&self, permission: LocationPermission) -> bool;
}

impl<T: PermissionOracle + ?Sized> PermissionOracle for Arc<T> {
    fn is_granted(&self, permission: LocationPermission) -> bool {
        (**self).is_granted(permission)
    }
}
