//! Observable store for section aggregates.
//!
//! One store per application instance. Sections publish their totals here;
//! budget readers subscribe and re-read the snapshot. Publishing replaces
//! the section's slot wholesale and notifies every subscriber before
//! returning, so a reader running in the same tick always observes a
//! consistent snapshot.

use crate::aggregates::{SectionAggregate, SectionKey, SectionSnapshot};
use std::sync::Arc;

/// Handle returned by [`AggregateStore::subscribe`], used to unsubscribe.
pub type SubscriptionId = u64;

type Listener = Box<dyn FnMut(&Arc<SectionSnapshot>)>;

/// Keyed publish/subscribe store holding the current aggregate snapshot.
///
/// Snapshots are immutable: every publish allocates a fresh
/// [`Arc<SectionSnapshot>`] and never mutates a previously returned one, so
/// `Arc::ptr_eq` is a valid cheap change test for consumers.
pub struct AggregateStore {
    snapshot: Arc<SectionSnapshot>,
    listeners: Vec<(SubscriptionId, Listener)>,
    next_id: SubscriptionId,
}

impl AggregateStore {
    pub fn new() -> Self {
        Self {
            snapshot: Arc::new(SectionSnapshot::default()),
            listeners: Vec::new(),
            next_id: 0,
        }
    }

    /// Replace the aggregate's section slot wholesale and notify
    /// subscribers synchronously.
    pub fn publish(&mut self, aggregate: SectionAggregate) {
        let mut next = (*self.snapshot).clone();
        next.set(aggregate);
        self.install(next);
    }

    /// Reset a section slot to "not yet published" and notify subscribers.
    pub fn retract(&mut self, section: SectionKey) {
        let mut next = (*self.snapshot).clone();
        next.clear(section);
        self.install(next);
    }

    /// Current snapshot. Sections that have never published read as `None`.
    pub fn snapshot(&self) -> Arc<SectionSnapshot> {
        Arc::clone(&self.snapshot)
    }

    /// Register a listener invoked after every publish or retract, to any
    /// section. Consumers re-read the snapshot and compute their own
    /// slices.
    pub fn subscribe(
        &mut self,
        listener: impl FnMut(&Arc<SectionSnapshot>) + 'static,
    ) -> SubscriptionId {
        let id = self.next_id;
        self.next_id += 1;
        self.listeners.push((id, Box::new(listener)));
        id
    }

    /// Remove a listener. Returns false if the id was already gone.
    pub fn unsubscribe(&mut self, id: SubscriptionId) -> bool {
        let before = self.listeners.len();
        self.listeners.retain(|(lid, _)| *lid != id);
        self.listeners.len() != before
    }

    fn install(&mut self, next: SectionSnapshot) {
        self.snapshot = Arc::new(next);
        for (_, listener) in &mut self.listeners {
            listener(&self.snapshot);
        }
    }
}

impl Default for AggregateStore {
    fn default() -> Self {
        Self::new()
    }
}
