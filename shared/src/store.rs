//! Observable snapshot store backed by a `tokio::sync::watch` channel.
//!
//! Subscribers always see the most recent value. A subscriber that attaches
//! late gets the current snapshot, never the history that led to it.

use thiserror::Error;
use tokio::sync::watch;
use tokio_stream::wrappers::WatchStream;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
#[error("state store was dropped")]
pub struct StoreClosed;

pub struct StateStore<S> {
    sender: watch::Sender<S>,
}

impl<S> StateStore<S>
where
    S: Clone + PartialEq + Send + Sync + 'static,
{
    pub fn new(initial: S) -> Self {
        let (sender, _rx) = watch::channel(initial);
        Self { sender }
    }

    /// Latest snapshot. Never waits on writers for longer than a clone.
    pub fn current(&self) -> S {
        self.sender.borrow().clone()
    }

    /// Atomic read-modify-write. Concurrent updates are serialized by the
    /// channel's write lock, so `f` always sees the result of the previous
    /// update. Subscribers are only woken when the value actually changed.
    ///
    /// Returns `true` if the snapshot changed.
    pub fn update<F>(&self, f: F) -> bool
    where
        F: FnOnce(&S) -> S,
    {
        self.sender.send_if_modified(|state| {
            let next = f(state);
            if next == *state {
                false
            } else {
                *state = next;
                true
            }
        })
    }

    pub fn subscribe(&self) -> StateSubscription<S> {
        StateSubscription {
            receiver: self.sender.subscribe(),
        }
    }

    pub fn subscriber_count(&self) -> usize {
        self.sender.receiver_count()
    }
}

impl<S> Default for StateStore<S>
where
    S: Clone + PartialEq + Send + Sync + Default + 'static,
{
    fn default() -> Self {
        Self::new(S::default())
    }
}

/// Live view of a [`StateStore`].
pub struct StateSubscription<S> {
    receiver: watch::Receiver<S>,
}

impl<S> StateSubscription<S>
where
    S: Clone + Send + Sync + 'static,
{
    pub fn latest(&self) -> S {
        self.receiver.borrow().clone()
    }

    /// Waits for the next change and returns the snapshot at that moment.
    ///
    /// Several quick updates may collapse into one wake-up; the returned value
    /// is always the newest.
    pub async fn changed(&mut self) -> Result<S, StoreClosed> {
        self.receiver.changed().await.map_err(|_| StoreClosed)?;
        Ok(self.receiver.borrow_and_update().clone())
    }

    pub fn has_changed(&self) -> bool {
        self.receiver.has_changed().unwrap_or(false)
    }

    /// Stream yielding the current snapshot first, then every change.
    pub fn into_stream(self) -> WatchStream<S> {
        WatchStream::new(self.receiver)
    }
}

impl<S> Clone for StateSubscription<S> {
    fn clone(&self) -> Self {
        Self {
            receiver: self.receiver.clone(),
        }
    }
}
