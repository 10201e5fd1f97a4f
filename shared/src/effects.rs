//! Single-consumer FIFO for one-shot effects.
//!
//! Unlike [`crate::store::StateStore`], nothing here is replayed: an effect is
//! handed to exactly one consumer and then it is gone. Effects sent while no
//! consumer is attached wait in the buffer for the next one.

use std::pin::Pin;
use std::sync::Arc;
use std::task::{Context, Poll};

use thiserror::Error;
use tokio::sync::mpsc::{self, error::TryRecvError, UnboundedReceiver, UnboundedSender};
use tokio::sync::{Mutex, OwnedMutexGuard};
use tokio_stream::Stream;
use tracing::warn;

use crate::event::Effect;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum EffectQueueError {
    #[error("another consumer is already attached to the effect queue")]
    ConsumerActive,
}

pub struct EffectQueue {
    sender: UnboundedSender<Effect>,
    receiver: Arc<Mutex<UnboundedReceiver<Effect>>>,
}

impl Default for EffectQueue {
    fn default() -> Self {
        Self::new()
    }
}

impl EffectQueue {
    pub fn new() -> Self {
        let (sender, receiver) = mpsc::unbounded_channel();
        Self {
            sender,
            receiver: Arc::new(Mutex::new(receiver)),
        }
    }

    /// Enqueue without blocking.
    pub fn send(&self, effect: Effect) {
        // The queue owns the receiver, so this only fails while it is being dropped.
        if self.sender.send(effect).is_err() {
            warn!(?effect, "effect queue closed, dropping effect");
        }
    }

    /// Attach as the consumer, waiting for a previous consumer to detach.
    pub async fn consume(&self) -> EffectConsumer {
        EffectConsumer {
            receiver: Arc::clone(&self.receiver).lock_owned().await,
        }
    }

    pub fn try_consume(&self) -> Result<EffectConsumer, EffectQueueError> {
        Arc::clone(&self.receiver)
            .try_lock_owned()
            .map(|receiver| EffectConsumer { receiver })
            .map_err(|_| EffectQueueError::ConsumerActive)
    }
}

/// Exclusive handle on the effect stream. Dropping it detaches the consumer.
///
/// The stream never ends while the queue is alive.
pub struct EffectConsumer {
    receiver: OwnedMutexGuard<UnboundedReceiver<Effect>>,
}

impl EffectConsumer {
    /// Next buffered effect, if any, without waiting.
    pub fn try_next(&mut self) -> Option<Effect> {
        match self.receiver.try_recv() {
            Ok(effect) => Some(effect),
            Err(TryRecvError::Empty | TryRecvError::Disconnected) => None,
        }
    }

    /// Drains everything currently buffered.
    pub fn drain(&mut self) -> Vec<Effect> {
        std::iter::from_fn(|| self.try_next()).collect()
    }
}

impl Stream for EffectConsumer {
    type Item = Effect;

    fn poll_next(mut self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<Option<Effect>> {
        self.receiver.poll_recv(cx)
    }
}
