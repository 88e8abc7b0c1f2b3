//! Mutation notifications for the in-memory stores.
//!
//! Each store owns its own registry; there is no ambient global bus.
//! Callbacks run synchronously, in subscription order, strictly after the
//! mutation they describe has been applied.

use std::fmt;

pub type SubscriberId = u64;

/// Id-keyed callback registry for one store's event type.
pub struct Subscribers<E> {
    next_id: SubscriberId,
    entries: Vec<(SubscriberId, Box<dyn Fn(&E) + Send>)>,
}

impl<E> Default for Subscribers<E> {
    fn default() -> Self {
        Self::new()
    }
}

impl<E> Subscribers<E> {
    pub fn new() -> Self {
        Self { next_id: 0, entries: Vec::new() }
    }

    /// Register a callback; the returned id unsubscribes it later.
    pub fn subscribe(&mut self, callback: impl Fn(&E) + Send + 'static) -> SubscriberId {
        let id = self.next_id;
        self.next_id += 1;
        self.entries.push((id, Box::new(callback)));
        id
    }

    /// Remove a subscription. Returns false if the id was never registered
    /// or already removed.
    pub fn unsubscribe(&mut self, id: SubscriberId) -> bool {
        let before = self.entries.len();
        self.entries.retain(|(entry_id, _)| *entry_id != id);
        self.entries.len() != before
    }

    /// Invoke every callback with the event, in subscription order.
    pub fn emit(&self, event: &E) {
        for (_, callback) in &self.entries {
            callback(event);
        }
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl<E> fmt::Debug for Subscribers<E> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Subscribers").field("count", &self.entries.len()).finish()
    }
}
