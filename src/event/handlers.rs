use std::fmt;
use std::rc::{Rc, Weak};

use crate::event::{EventBus, EventType};
use crate::id_generator::generate_id;

/// Identity of a listener. Clones of a [`Listener`] share it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ListenerId(usize);

impl ListenerId {
    pub fn value(&self) -> usize {
        self.0
    }
}

/// A callback registered against an editor event.
///
/// Listeners are compared by identity, not by the closure they wrap: two
/// `Listener::new` calls with the same closure are different listeners,
/// while clones of one listener are the same listener.
#[derive(Clone)]
pub struct Listener {
    id: ListenerId,
    callback: Rc<dyn Fn(&EventType)>,
}

impl Listener {
    pub fn new(callback: impl Fn(&EventType) + 'static) -> Self {
        Self {
            id: ListenerId(generate_id()),
            callback: Rc::new(callback),
        }
    }

    pub fn id(&self) -> ListenerId {
        self.id
    }

    pub(crate) fn call(&self, event: &EventType) {
        (self.callback)(event);
    }
}

impl PartialEq for Listener {
    fn eq(&self, other: &Self) -> bool {
        self.id == other.id
    }
}

impl Eq for Listener {}

impl fmt::Debug for Listener {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Listener")
            .field("id", &self.id.0)
            .field("callback", &"<callback>")
            .finish()
    }
}

/// Handle that unregisters one listener from one event of a bus.
///
/// Returned by `Editor::on` for every non-`destroyed` event and run
/// automatically when the editor is destroyed. Running it early is the same
/// as calling `off` for that pair. The bus is held weakly, so a token never
/// keeps a bus alive.
#[derive(Clone)]
pub struct CleanupToken {
    event: EventType,
    target: ListenerId,
    bus: Weak<EventBus>,
}

impl CleanupToken {
    pub(crate) fn new(event: EventType, target: ListenerId, bus: &Rc<EventBus>) -> Self {
        Self {
            event,
            target,
            bus: Rc::downgrade(bus),
        }
    }

    pub fn event(&self) -> &EventType {
        &self.event
    }

    pub fn target(&self) -> ListenerId {
        self.target
    }

    /// Unregisters the target listener. Returns false if nothing was removed,
    /// either because it was already gone or because the bus was dropped.
    pub fn run(&self) -> bool {
        match self.bus.upgrade() {
            Some(bus) => bus.off_id(&self.event, self.target),
            None => false,
        }
    }

    /// Wraps the token in a listener suitable for the `destroyed` event.
    pub(crate) fn into_listener(self) -> Listener {
        Listener::new(move |_| {
            self.run();
        })
    }
}

impl fmt::Debug for CleanupToken {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CleanupToken")
            .field("event", &self.event)
            .field("target", &self.target.0)
            .field("bus_alive", &(self.bus.strong_count() > 0))
            .finish()
    }
}
