use std::cell::{Cell, RefCell};
use std::collections::HashMap;

use crate::event::{EventType, Listener, ListenerId};

struct Subscription {
    seq: u64,
    listener: Listener,
    once: bool,
}

/// A named-event bus private to one editor instance.
///
/// Dispatch is synchronous and in registration order. The subscriber list is
/// snapshotted before dispatch and no borrow is held while a listener runs,
/// so listeners may subscribe, unsubscribe or emit re-entrantly.
pub struct EventBus {
    subscriptions: RefCell<HashMap<EventType, Vec<Subscription>>>,
    next_seq: Cell<u64>,
}

impl std::fmt::Debug for EventBus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let subscriptions = self.subscriptions.borrow();
        let total: usize = subscriptions.values().map(Vec::len).sum();
        f.debug_struct("EventBus")
            .field("events", &subscriptions.len())
            .field("handlers", &format!("<{} handlers>", total))
            .finish()
    }
}

impl Default for EventBus {
    fn default() -> Self {
        Self::new()
    }
}

impl EventBus {
    /// Creates a new event bus
    pub fn new() -> Self {
        Self {
            subscriptions: RefCell::new(HashMap::new()),
            next_seq: Cell::new(0),
        }
    }

    /// Subscribe a listener to every emission of `event`
    pub fn on(&self, event: EventType, listener: Listener) {
        self.subscribe(event, listener, false);
    }

    /// Subscribe a listener to the next emission of `event` only
    pub fn once(&self, event: EventType, listener: Listener) {
        self.subscribe(event, listener, true);
    }

    /// Remove every subscription of `listener` to `event`
    pub fn off(&self, event: &EventType, listener: &Listener) -> bool {
        self.off_id(event, listener.id())
    }

    pub(crate) fn off_id(&self, event: &EventType, id: ListenerId) -> bool {
        let mut subscriptions = self.subscriptions.borrow_mut();
        let Some(list) = subscriptions.get_mut(event) else {
            return false;
        };
        let before = list.len();
        list.retain(|sub| sub.listener.id() != id);
        let removed = list.len() != before;
        if list.is_empty() {
            subscriptions.remove(event);
        }
        removed
    }

    /// Emit `event` to its listeners and return how many were invoked
    pub fn emit(&self, event: &EventType) -> usize {
        let snapshot: Vec<(u64, Listener, bool)> = match self.subscriptions.borrow().get(event) {
            Some(list) => list
                .iter()
                .map(|sub| (sub.seq, sub.listener.clone(), sub.once))
                .collect(),
            None => return 0,
        };

        let mut invoked = 0;
        for (seq, listener, once) in snapshot {
            // A one-shot subscription may already have been consumed by a nested emit.
            if once && !self.remove_seq(event, seq) {
                continue;
            }
            listener.call(event);
            invoked += 1;
        }
        log::trace!("emitted '{}' to {} listener(s)", event, invoked);
        invoked
    }

    /// Number of active subscriptions for `event`
    pub fn listener_count(&self, event: &EventType) -> usize {
        self.subscriptions
            .borrow()
            .get(event)
            .map_or(0, Vec::len)
    }

    pub fn has_listener(&self, event: &EventType, listener: &Listener) -> bool {
        self.subscriptions
            .borrow()
            .get(event)
            .is_some_and(|list| list.iter().any(|sub| sub.listener == *listener))
    }

    fn subscribe(&self, event: EventType, listener: Listener, once: bool) {
        let seq = self.next_seq.get();
        self.next_seq.set(seq + 1);
        self.subscriptions
            .borrow_mut()
            .entry(event)
            .or_default()
            .push(Subscription { seq, listener, once });
    }

    fn remove_seq(&self, event: &EventType, seq: u64) -> bool {
        let mut subscriptions = self.subscriptions.borrow_mut();
        let Some(list) = subscriptions.get_mut(event) else {
            return false;
        };
        let Some(index) = list.iter().position(|sub| sub.seq == seq) else {
            return false;
        };
        list.remove(index);
        if list.is_empty() {
            subscriptions.remove(event);
        }
        true
    }
}
