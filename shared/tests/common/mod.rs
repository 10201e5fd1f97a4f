#![allow(dead_code)]

use std::collections::VecDeque;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use async_trait::async_trait;
use map_core::{
    Coordinate, LocationPermission, LocationRequest, LocationResult, LocationSource,
    PermissionOracle, StateSubscription, UiState,
};

pub fn ms(millis: u64) -> Duration {
    Duration::from_millis(millis)
}

pub fn munich() -> Coordinate {
    Coordinate::new(48.1, 11.6).unwrap()
}

/// Answers each call with the next scripted `(delay, outcome)`, then with the fallback.
pub struct ScriptedSource {
    script: Mutex<VecDeque<(Duration, LocationResult)>>,
    fallback: (Duration, LocationResult),
    calls: AtomicUsize,
    cancelled: Arc<AtomicUsize>,
    last_request: Mutex<Option<LocationRequest>>,
}

impl ScriptedSource {
    pub fn always(delay: Duration, outcome: LocationResult) -> Arc<Self> {
        Arc::new(Self {
            script: Mutex::new(VecDeque::new()),
            fallback: (delay, outcome),
            calls: AtomicUsize::new(0),
            cancelled: Arc::new(AtomicUsize::new(0)),
            last_request: Mutex::new(None),
        })
    }

    pub fn scripted(steps: Vec<(Duration, LocationResult)>) -> Arc<Self> {
        let source = Self::always(Duration::from_secs(3600), Ok(None));
        source.script.lock().unwrap().extend(steps);
        source
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }

    /// Requests whose future was dropped before answering.
    pub fn cancelled(&self) -> usize {
        self.cancelled.load(Ordering::SeqCst)
    }

    pub fn last_request(&self) -> Option<LocationRequest> {
        *self.last_request.lock().unwrap()
    }
}

struct CancelGuard {
    counter: Arc<AtomicUsize>,
    armed: bool,
}

impl Drop for CancelGuard {
    fn drop(&mut self) {
        if self.armed {
            self.counter.fetch_add(1, Ordering::SeqCst);
        }
    }
}

#[async_trait]
impl LocationSource for ScriptedSource {
    async fn current_location(&self, request: LocationRequest) -> LocationResult {
        self.calls.fetch_add(1, Ordering::SeqCst);
        *self.last_request.lock().unwrap() = Some(request);
        let (delay, outcome) = self
            .script
            .lock()
            .unwrap()
            .pop_front()
            .unwrap_or_else(|| self.fallback.clone());

        let mut guard = CancelGuard {
            counter: Arc::clone(&self.cancelled),
            armed: true,
        };
        tokio::time::sleep(delay).await;
        guard.armed = false;
        outcome
    }
}

pub struct FakePermissions {
    coarse: AtomicBool,
    fine: AtomicBool,
}

impl FakePermissions {
    pub fn new(coarse: bool, fine: bool) -> Arc<Self> {
        Arc::new(Self {
            coarse: AtomicBool::new(coarse),
            fine: AtomicBool::new(fine),
        })
    }

    pub fn none() -> Arc<Self> {
        Self::new(false, false)
    }

    pub fn coarse_only() -> Arc<Self> {
        Self::new(true, false)
    }

    pub fn fine() -> Arc<Self> {
        Self::new(true, true)
    }

    pub fn grant_all(&self) {
        self.coarse.store(true, Ordering::SeqCst);
        self.fine.store(true, Ordering::SeqCst);
    }
}

impl PermissionOracle for FakePermissions {
    fn is_granted(&self, permission: LocationPermission) -> bool {
        match permission {
            LocationPermission::CoarseLocation => self.coarse.load(Ordering::SeqCst),
            LocationPermission::FineLocation => self.fine.load(Ordering::SeqCst),
        }
    }
}

/// Records every distinct value of `locating` the subscription observes.
pub fn record_locating(mut subscription: StateSubscription<UiState>) -> Arc<Mutex<Vec<bool>>> {
    let log = Arc::new(Mutex::new(vec![subscription.latest().locating]));
    let sink = Arc::clone(&log);
    tokio::spawn(async move {
        while let Ok(state) = subscription.changed().await {
            let mut log = sink.lock().unwrap();
            if log.last() != Some(&state.locating) {
                log.push(state.locating);
            }
        }
    });
    log
}

pub fn snapshot(log: &Arc<Mutex<Vec<bool>>>) -> Vec<bool> {
    log.lock().unwrap().clone()
}
