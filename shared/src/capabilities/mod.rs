//! Collaborators the shell implements for the core.
mod location;
mod permission;

pub use self::location::{LocationError, LocationRequest, LocationResult, LocationSource};
pub use self::permission::{LocationPermission, PermissionOracle};
