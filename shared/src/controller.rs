//! Map screen controller.
//!
//! Every transition (UI actions, lookup completion, the debounce timer and
//! shutdown) runs while holding the lookup slot lock. State updates and
//! effect sends therefore never interleave, and nothing touches the store or
//! the effect queue once the slot is closed.

use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use thiserror::Error;
use tokio::runtime::Handle;
use tokio::task::JoinHandle;
use tokio::time::Instant;
use tracing::{debug, info, instrument, warn};

use crate::capabilities::{
    LocationError, LocationPermission, LocationRequest, LocationResult, LocationSource,
    PermissionOracle,
};
use crate::config::{ConfigError, ControllerConfig};
use crate::effects::{EffectConsumer, EffectQueue, EffectQueueError};
use crate::event::{Effect, LookupId, UiAction};
use crate::metrics::{LookupMetrics, LookupMetricsSnapshot};
use crate::model::{UiState, ZoomLevel};
use crate::store::{StateStore, StateSubscription};
use crate::NORTH_BEARING_DEG;

#[derive(Debug, Error)]
pub enum ControllerError {
    #[error("no tokio runtime available to run location lookups")]
    NoRuntime,

    #[error(transparent)]
    Config(#[from] ConfigError),
}

struct InFlightLookup {
    id: LookupId,
    started_at: Instant,
    fetch: JoinHandle<()>,
    debounce: JoinHandle<()>,
}

impl InFlightLookup {
    fn cancel(self) {
        self.fetch.abort();
        self.debounce.abort();
    }
}

/// Settles the lookup if the fetch task goes away without an outcome, which
/// outside of shutdown means the location source panicked.
struct CompletionGuard<L, P>
where
    L: LocationSource + 'static,
    P: PermissionOracle + 'static,
{
    session: Arc<Session<L, P>>,
    id: LookupId,
    armed: bool,
}

impl<L, P> Drop for CompletionGuard<L, P>
where
    L: LocationSource + 'static,
    P: PermissionOracle + 'static,
{
    fn drop(&mut self) {
        if self.armed {
            self.session.finish_lookup(
                self.id,
                Err(LocationError::Provider(
                    "location lookup ended without a result".to_owned(),
                )),
            );
        }
    }
}

#[derive(Default)]
struct LookupSlot {
    in_flight: Option<InFlightLookup>,
    closed: bool,
}

struct Session<L, P> {
    location: L,
    permissions: P,
    config: ControllerConfig,
    store: StateStore<UiState>,
    effects: EffectQueue,
    metrics: LookupMetrics,
    runtime: Handle,
    slot: Mutex<LookupSlot>,
}

impl<L, P> Session<L, P>
where
    L: LocationSource + 'static,
    P: PermissionOracle + 'static,
{
    fn lock_slot(&self) -> MutexGuard<'_, LookupSlot> {
        // Nothing in the critical sections can leave the slot half-written.
        self.slot.lock().unwrap_or_else(PoisonError::into_inner)
    }

    fn start_lookup(self: &Arc<Self>, slot: &mut LookupSlot) {
        if let Some(active) = &slot.in_flight {
            LookupMetrics::incr(&self.metrics.deduplicated);
            debug!(lookup_id = %active.id, "lookup already in flight, ignoring request");
            return;
        }

        let id = LookupId::new();
        let request = LocationRequest::default().with_max_age(self.config.max_location_age());

        let fetch = {
            let mut guard = CompletionGuard {
                session: Arc::clone(self),
                id,
                armed: true,
            };
            self.runtime.spawn(async move {
                let outcome = guard.session.location.current_location(request).await;
                guard.armed = false;
                guard.session.finish_lookup(id, outcome);
            })
        };

        let debounce = {
            let session = Arc::clone(self);
            let delay = self.config.debounce();
            self.runtime.spawn(async move {
                tokio::time::sleep(delay).await;
                session.reveal_indicator(id);
            })
        };

        slot.in_flight = Some(InFlightLookup {
            id,
            started_at: Instant::now(),
            fetch,
            debounce,
        });
        LookupMetrics::incr(&self.metrics.started);
        info!(lookup_id = %id, "location lookup started");
    }

    /// Debounce timer fired. Only the lookup that armed it may raise the indicator.
    fn reveal_indicator(&self, id: LookupId) {
        let slot = self.lock_slot();
        if slot.closed {
            return;
        }
        match &slot.in_flight {
            Some(active) if active.id == id => {
                if self.store.update(|state| state.with_locating(true)) {
                    LookupMetrics::incr(&self.metrics.spinner_shown);
                }
                debug!(lookup_id = %id, "lookup still running after debounce, showing indicator");
            }
            _ => debug!(lookup_id = %id, "lookup finished before debounce"),
        }
    }

    fn finish_lookup(&self, id: LookupId, outcome: LocationResult) {
        let mut slot = self.lock_slot();
        if slot.closed {
            debug!(lookup_id = %id, "controller shut down, discarding lookup result");
            return;
        }

        let elapsed = match slot.in_flight.take() {
            Some(active) if active.id == id => active.started_at.elapsed(),
            other => {
                slot.in_flight = other;
                debug!(lookup_id = %id, "discarding result of stale lookup");
                return;
            }
        };

        self.store.update(|state| state.with_locating(false));

        match outcome {
            Ok(Some(target)) => {
                let zoom = self.zoom_for_current_permission();
                LookupMetrics::incr(&self.metrics.succeeded);
                info!(
                    lookup_id = %id,
                    elapsed_ms = u64::try_from(elapsed.as_millis()).unwrap_or(u64::MAX),
                    zoom = zoom.value(),
                    "location lookup succeeded"
                );
                self.effects.send(Effect::MoveCameraTo { target, zoom });
            }
            Ok(None) => {
                LookupMetrics::incr(&self.metrics.without_fix);
                debug!(lookup_id = %id, "location lookup returned no fix");
            }
            Err(error) => {
                LookupMetrics::incr(&self.metrics.failed);
                warn!(lookup_id = %id, %error, "location lookup failed");
            }
        }
    }

    fn zoom_for_current_permission(&self) -> ZoomLevel {
        if self.permissions.is_granted(LocationPermission::FineLocation) {
            ZoomLevel::new(self.config.fine_zoom)
        } else {
            ZoomLevel::new(self.config.coarse_zoom)
        }
    }

    fn shutdown(&self) {
        let lookup = {
            let mut slot = self.lock_slot();
            if slot.closed {
                return;
            }
            slot.closed = true;
            slot.in_flight.take()
        };
        // Aborting drops the fetch future, whose guard takes the slot lock.
        if let Some(lookup) = lookup {
            LookupMetrics::incr(&self.metrics.cancelled);
            info!(lookup_id = %lookup.id, "cancelling in-flight location lookup");
            lookup.cancel();
        }
        debug!("map controller shut down");
    }
}

/// State machine behind the map screen.
///
/// Owns the [`UiState`] store, the effect queue and the single in-flight
/// location lookup. Dropping the controller shuts it down.
pub struct MapController<L, P>
where
    L: LocationSource + 'static,
    P: PermissionOracle + 'static,
{
    session: Arc<Session<L, P>>,
}

impl<L, P> MapController<L, P>
where
    L: LocationSource + 'static,
    P: PermissionOracle + 'static,
{
    /// Creates a controller bound to the current tokio runtime.
    ///
    /// The runtime must have its time driver enabled, see [`Self::with_runtime`].
    pub fn new(location: L, permissions: P, config: ControllerConfig) -> Result<Self, ControllerError> {
        let runtime = Handle::try_current().map_err(|_| ControllerError::NoRuntime)?;
        Self::with_runtime(location, permissions, config, runtime)
    }

    /// Creates a controller that spawns its lookups on `runtime`, for shells
    /// calling in from threads the runtime does not own.
    ///
    /// `runtime` must be built with the time driver enabled (`enable_time` or
    /// `enable_all`). Without it the debounce timer panics inside its task and
    /// the locating indicator is never shown.
    pub fn with_runtime(
        location: L,
        permissions: P,
        config: ControllerConfig,
        runtime: Handle,
    ) -> Result<Self, ControllerError> {
        config.validate()?;

        let my_location_visible = permissions.is_granted(LocationPermission::CoarseLocation);
        info!(my_location_visible, "map controller created");

        Ok(Self {
            session: Arc::new(Session {
                location,
                permissions,
                config,
                store: StateStore::new(UiState::initial(my_location_visible)),
                effects: EffectQueue::new(),
                metrics: LookupMetrics::new(),
                runtime,
                slot: Mutex::new(LookupSlot::default()),
            }),
        })
    }

    #[instrument(skip(self))]
    pub fn on_action(&self, action: UiAction) {
        let session = &self.session;
        let mut slot = session.lock_slot();
        if slot.closed {
            debug!("controller shut down, ignoring action");
            return;
        }

        match action {
            UiAction::RequestLocate => session.start_lookup(&mut slot),
            UiAction::RequestPermission => session.effects.send(Effect::PromptForPermission),
            UiAction::PermissionGranted => {
                session
                    .store
                    .update(|state| state.with_my_location_visible(true));
                session.start_lookup(&mut slot);
            }
            UiAction::ResetBearing => session.effects.send(Effect::SetBearing {
                degrees: NORTH_BEARING_DEG,
            }),
            UiAction::SetMapMode(mode) => {
                session.store.update(|state| state.with_map_mode(mode));
            }
            UiAction::SetOverlayRadius(radius) => {
                session.store.update(|state| state.with_overlay_radius(radius));
            }
        }
    }

    pub fn state(&self) -> UiState {
        self.session.store.current()
    }

    pub fn subscribe(&self) -> StateSubscription<UiState> {
        self.session.store.subscribe()
    }

    pub fn effects(&self) -> &EffectQueue {
        &self.session.effects
    }

    /// Shorthand for `effects().try_consume()`.
    pub fn consume_effects(&self) -> Result<EffectConsumer, EffectQueueError> {
        self.session.effects.try_consume()
    }

    pub fn metrics(&self) -> LookupMetricsSnapshot {
        self.session.metrics.snapshot()
    }

    pub fn config(&self) -> &ControllerConfig {
        &self.session.config
    }

    pub fn is_lookup_in_flight(&self) -> bool {
        self.session.lock_slot().in_flight.is_some()
    }

    pub fn is_shut_down(&self) -> bool {
        self.session.lock_slot().closed
    }

    /// Cancels the in-flight lookup and its debounce timer. Once this returns,
    /// no further state change or effect is produced and later actions are ignored.
    pub fn shutdown(&self) {
        self.session.shutdown();
    }
}

impl<L, P> Drop for MapController<L, P>
where
    L: LocationSource + 'static,
    P: PermissionOracle + 'static,
{
    fn drop(&mut self) {
        self.session.shutdown();
    }
}
