use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::model::Coordinate;
use crate::DEFAULT_MAX_LOCATION_AGE_MS;

/// Parameters for a single current-location request.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct LocationRequest {
    /// Oldest cached fix the provider may answer with.
    pub max_age: Duration,
}

impl Default for LocationRequest {
    fn default() -> Self {
        Self {
            max_age: Duration::from_millis(DEFAULT_MAX_LOCATION_AGE_MS),
        }
    }
}

impl LocationRequest {
    pub fn with_max_age(mut self, max_age: Duration) -> Self {
        self.max_age = max_age;
        self
    }
}

#[derive(Debug, Clone, Error, Serialize, Deserialize, PartialEq, Eq)]
pub enum LocationError {
    #[error("location permission denied")]
    PermissionDenied,

    #[error("location provider disabled")]
    ProviderDisabled,

    #[error("location request timed out after {timeout_ms}ms")]
    Timeout { timeout_ms: u64 },

    #[error("location provider failed: {0}")]
    Provider(String),
}

impl LocationError {
    pub fn is_permission_error(&self) -> bool {
        matches!(self, LocationError::PermissionDenied)
    }
}

/// Outcome of one lookup: `Ok(None)` means the provider had no fix to offer.
pub type LocationResult = Result<Option<Coordinate>, LocationError>;

/// Device location provider supplied by the shell.
///
/// Implementations must not fault when permission is missing; they report
/// [`LocationError::PermissionDenied`] or `Ok(None)` instead. Dropping the
/// returned future cancels the underlying platform request, and the
/// implementation must not report anything afterwards.
#[async_trait]
pub trait LocationSource: Send + Sync {
    async fn current_location(&self, request: LocationRequest) -> LocationResult;
}

#[async_trait]
impl<T: LocationSource + ?Sized> LocationSource for Arc<T> {
    async fn current_location(&self, request: LocationRequest) -> LocationResult {
        (**self).current_location(request).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_request_accepts_thirty_second_old_fix() {
        assert_eq!(LocationRequest::default().max_age, Duration::from_secs(30));
    }

    #[test]
    fn request_builder_overrides_age() {
        let request = LocationRequest::default().with_max_age(Duration::from_secs(5));
        assert_eq!(request.max_age, Duration::from_secs(5));
    }

    #[test]
    fn location_error_helpers() {
        assert!(LocationError::PermissionDenied.is_permission_error());
        assert!(!LocationError::ProviderDisabled.is_permission_error());
        assert_eq!(
            LocationError::Timeout { timeout_ms: 1500 }.to_string(),
            "location request timed out after 1500ms"
        );
    }
}
