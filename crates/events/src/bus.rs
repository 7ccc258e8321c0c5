//! Event publishing/subscription abstraction (mechanics only).
//!
//! The bus is the transport layer for sync events: plugins and modules react
//! to what lands here, but the bus itself makes minimal assumptions:
//!
//! - **Transport-agnostic**: in-memory channels here; a broker in production.
//! - **At-least-once delivery**: events may be delivered more than once, so
//!   consumers must be idempotent.
//! - **No ordering guarantees** between concurrent publishers.
//! - **No persistence**: the bus distributes, it does not store.
//!
//! Repeated delivery of an entity-sync event re-applies the sync; that is
//! acceptable because module adapters are upsert-shaped.

use std::sync::Arc;
use std::sync::mpsc::Receiver;
use std::time::Duration;

/// A subscription to an event stream.
///
/// Each subscription receives a copy of every event published after it was
/// created (broadcast semantics). Subscriptions are designed for
/// single-threaded consumption; hand one to exactly one consumer loop.
#[derive(Debug)]
pub struct Subscription<M> {
    receiver: Receiver<M>,
}

impl<M> Subscription<M> {
    pub fn new(receiver: Receiver<M>) -> Self {
        Self { receiver }
    }

    /// Block until the next message is available.
    pub fn recv(&self) -> Result<M, std::sync::mpsc::RecvError> {
        self.receiver.recv()
    }

    /// Try to receive a message without blocking.
    pub fn try_recv(&self) -> Result<M, std::sync::mpsc::TryRecvError> {
        self.receiver.try_recv()
    }

    /// Block for up to `timeout` waiting for a message.
    pub fn recv_timeout(&self, timeout: Duration) -> Result<M, std::sync::mpsc::RecvTimeoutError> {
        self.receiver.recv_timeout(timeout)
    }
}

/// Domain-agnostic event bus (pub/sub abstraction).
///
/// `publish()` can fail (bus full, broker unreachable); failures surface to the
/// caller, which decides whether the event was load-bearing. Announcement
/// traffic (plugin lifecycle, prediction-ready) treats publish failures as
/// log-and-continue.
pub trait EventBus<M>: Send + Sync {
    type Error: core::fmt::Debug + Send + Sync + 'static;

    fn publish(&self, message: M) -> Result<(), Self::Error>;

    fn subscribe(&self) -> Subscription<M>;
}

impl<M, B> EventBus<M> for Arc<B>
where
    B: EventBus<M> + ?Sized,
{
    type Error = B::Error;

    fn publish(&self, message: M) -> Result<(), Self::Error> {
        (**self).publish(message)
    }

    fn subscribe(&self) -> Subscription<M> {
        (**self).subscribe()
    }
}
