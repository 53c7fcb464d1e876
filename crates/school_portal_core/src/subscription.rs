//! crates/school_portal_core/src/subscription.rs
//!
//! Cancellable handles for live-query subscriptions.

use futures::{Stream, StreamExt};
use std::pin::Pin;
use std::sync::atomic::{AtomicBool, Ordering};
use tokio_util::sync::CancellationToken;
use tracing::debug;
use uuid::Uuid;

use crate::domain::Snapshot;

pub type SnapshotStream = Pin<Box<dyn Stream<Item = Snapshot> + Send>>;

/// Owns the right to stop a subscription. Releasing happens at most once,
/// either through `unsubscribe` or when the handle is dropped.
#[derive(Debug)]
pub struct SubscriptionHandle {
    id: Uuid,
    token: CancellationToken,
    released: AtomicBool,
}

impl SubscriptionHandle {
    pub fn new() -> Self {
        Self {
            id: Uuid::new_v4(),
            token: CancellationToken::new(),
            released: AtomicBool::new(false),
        }
    }

    pub fn id(&self) -> Uuid {
        self.id
    }

    /// Stops the subscription. Returns `true` only for the call that actually released it.
    pub fn unsubscribe(&self) -> bool {
        if self.released.swap(true, Ordering::SeqCst) {
            return false;
        }
        self.token.cancel();
        debug!("Subscription {} released.", self.id);
        true
    }

    pub fn is_released(&self) -> bool {
        self.released.load(Ordering::SeqCst)
    }

    /// A token that fires once this subscription is released.
    pub fn cancelled_token(&self) -> CancellationToken {
        self.token.clone()
    }
}

impl Default for SubscriptionHandle {
    fn default() -> Self {
        Self::new()
    }
}

impl Drop for SubscriptionHandle {
    fn drop(&mut self) {
        self.unsubscribe();
    }
}

/// A live query in progress: the handle that stops it and the snapshots it yields.
pub struct Subscription {
    pub handle: SubscriptionHandle,
    pub snapshots: SnapshotStream,
}

impl Subscription {
    /// Wraps a snapshot source so that it ends as soon as the handle is released.
    pub fn from_stream<S>(snapshots: S) -> Self
    where
        S: Stream<Item = Snapshot> + Send + 'static,
    {
        let handle = SubscriptionHandle::new();
        let stopped = handle.cancelled_token().cancelled_owned();
        let snapshots = snapshots.take_until(stopped).boxed();
        Self { handle, snapshots }
    }

    pub fn into_parts(self) -> (SubscriptionHandle, SnapshotStream) {
        (self.handle, self.snapshots)
    }
}
