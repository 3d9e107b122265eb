//! Identity-keyed side tables that attach a private event bus and a set of
//! destroy listeners to each editor instance.
//!
//! Entries hold only a weak reference to the instance they belong to. Once
//! the [`Instance`] is dropped its entries are unreachable and are removed
//! by the next [`InstanceRegistry::sweep`], which every inserting operation
//! runs first.

use std::cell::RefCell;
use std::collections::HashMap;
use std::fmt;
use std::rc::{Rc, Weak};

use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::event::{CleanupToken, EventBus, ListenerId};

/// Stable identifier of an editor instance
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct InstanceId(Uuid);

impl InstanceId {
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }
}

impl Default for InstanceId {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for InstanceId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// The identity of one editing session.
///
/// Not `Clone`: an instance is an identity, and dropping it is what makes
/// its registry entries collectable.
#[derive(Debug)]
pub struct Instance {
    id: InstanceId,
    alive: Rc<()>,
}

impl Instance {
    pub fn new() -> Self {
        Self {
            id: InstanceId::new(),
            alive: Rc::new(()),
        }
    }

    pub fn id(&self) -> InstanceId {
        self.id
    }

    fn token(&self) -> Weak<()> {
        Rc::downgrade(&self.alive)
    }
}

impl Default for Instance {
    fn default() -> Self {
        Self::new()
    }
}

/// One entry of a [`DestroyListenerSet`]
#[derive(Debug, Clone)]
pub enum DestroyEntry {
    /// A listener the host registered for `destroyed` itself
    User(ListenerId),
    /// A synthesized listener that unregisters another listener
    Cleanup { shadow: ListenerId, token: CleanupToken },
}

impl DestroyEntry {
    /// The listener subscribed to `destroyed` on the bus
    pub fn listener_id(&self) -> ListenerId {
        match self {
            Self::User(id) => *id,
            Self::Cleanup { shadow, .. } => *shadow,
        }
    }

    pub fn is_cleanup(&self) -> bool {
        matches!(self, Self::Cleanup { .. })
    }
}

/// Listeners to detach from `destroyed` once it has fired, keyed by listener identity
#[derive(Debug, Clone, Default)]
pub struct DestroyListenerSet {
    entries: Vec<DestroyEntry>,
}

impl DestroyListenerSet {
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds `entry` unless its listener is already present
    pub fn insert(&mut self, entry: DestroyEntry) -> bool {
        if self.contains(entry.listener_id()) {
            return false;
        }
        self.entries.push(entry);
        true
    }

    pub fn contains(&self, id: ListenerId) -> bool {
        self.entries.iter().any(|entry| entry.listener_id() == id)
    }

    pub fn iter(&self) -> impl Iterator<Item = &DestroyEntry> {
        self.entries.iter()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn cleanup_count(&self) -> usize {
        self.entries.iter().filter(|entry| entry.is_cleanup()).count()
    }

    pub fn user_count(&self) -> usize {
        self.len() - self.cleanup_count()
    }
}

struct WeakEntry<V> {
    owner: Weak<()>,
    value: V,
}

/// A map keyed by instance identity whose entries live only as long as the instance
struct WeakTable<V> {
    entries: HashMap<InstanceId, WeakEntry<V>>,
}

impl<V> WeakTable<V> {
    fn new() -> Self {
        Self {
            entries: HashMap::new(),
        }
    }

    fn get(&self, instance: &Instance) -> Option<&V> {
        self.entries
            .get(&instance.id)
            .filter(|entry| entry.owner.strong_count() > 0)
            .map(|entry| &entry.value)
    }

    fn get_or_insert_with(&mut self, instance: &Instance, make: impl FnOnce() -> V) -> &mut V {
        &mut self
            .entries
            .entry(instance.id)
            .or_insert_with(|| WeakEntry {
                owner: instance.token(),
                value: make(),
            })
            .value
    }

    fn insert(&mut self, instance: &Instance, value: V) {
        self.entries.insert(
            instance.id,
            WeakEntry {
                owner: instance.token(),
                value,
            },
        );
    }

    fn remove(&mut self, id: &InstanceId) -> Option<V> {
        self.entries.remove(id).map(|entry| entry.value)
    }

    fn sweep(&mut self) -> Vec<V> {
        let dead: Vec<InstanceId> = self
            .entries
            .iter()
            .filter(|(_, entry)| entry.owner.strong_count() == 0)
            .map(|(id, _)| *id)
            .collect();
        dead.iter().filter_map(|id| self.remove(id)).collect()
    }

    fn contains(&self, id: &InstanceId) -> bool {
        self.entries.contains_key(id)
    }

    fn len(&self) -> usize {
        self.entries.len()
    }
}

/// Associates each editor instance with its private bus and destroy listeners
pub struct InstanceRegistry {
    buses: RefCell<WeakTable<Rc<EventBus>>>,
    destroy_listeners: RefCell<WeakTable<DestroyListenerSet>>,
}

thread_local! {
    static GLOBAL: Rc<InstanceRegistry> = Rc::new(InstanceRegistry::new());
}

impl fmt::Debug for InstanceRegistry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("InstanceRegistry")
            .field("buses", &self.buses.borrow().len())
            .field("destroy_sets", &self.destroy_listeners.borrow().len())
            .finish()
    }
}

impl Default for InstanceRegistry {
    fn default() -> Self {
        Self::new()
    }
}

impl InstanceRegistry {
    pub fn new() -> Self {
        Self {
            buses: RefCell::new(WeakTable::new()),
            destroy_listeners: RefCell::new(WeakTable::new()),
        }
    }

    /// The registry shared by every editor created on this thread
    pub fn global() -> Rc<InstanceRegistry> {
        GLOBAL.with(Rc::clone)
    }

    /// Returns the instance's bus, creating it on first use
    pub fn get_or_create_bus(&self, instance: &Instance) -> Rc<EventBus> {
        if let Some(bus) = self.buses.borrow().get(instance) {
            return Rc::clone(bus);
        }
        self.sweep();
        let mut buses = self.buses.borrow_mut();
        let bus = buses.get_or_insert_with(instance, || {
            log::debug!("creating event bus for editor {}", instance.id());
            Rc::new(EventBus::new())
        });
        Rc::clone(bus)
    }

    pub fn record_destroy_listener(&self, instance: &Instance, entry: DestroyEntry) {
        if self.destroy_listeners.borrow().get(instance).is_none() {
            self.sweep();
        }
        self.destroy_listeners
            .borrow_mut()
            .get_or_insert_with(instance, DestroyListenerSet::new)
            .insert(entry);
    }

    /// Snapshot of the instance's destroy listeners; never creates an entry
    pub fn destroy_listeners(&self, instance: &Instance) -> DestroyListenerSet {
        self.destroy_listeners
            .borrow()
            .get(instance)
            .cloned()
            .unwrap_or_default()
    }

    pub fn clear_destroy_listeners(&self, instance: &Instance) {
        self.destroy_listeners
            .borrow_mut()
            .insert(instance, DestroyListenerSet::new());
    }

    /// Drops every entry whose instance no longer exists and returns how many went
    pub fn sweep(&self) -> usize {
        // Dropping a bus drops its listeners, which may own other editors; keep
        // the tables unborrowed while that happens.
        let dead_buses = self.buses.borrow_mut().sweep();
        let dead_sets = self.destroy_listeners.borrow_mut().sweep();
        let swept = dead_buses.len() + dead_sets.len();
        drop(dead_buses);
        drop(dead_sets);
        if swept > 0 {
            log::debug!("swept {} registry entries of dropped editors", swept);
        }
        swept
    }

    /// Eagerly forgets an instance's entries
    pub fn release(&self, id: InstanceId) {
        let bus = self.buses.borrow_mut().remove(&id);
        let set = self.destroy_listeners.borrow_mut().remove(&id);
        drop(bus);
        drop(set);
    }

    pub fn contains(&self, id: InstanceId) -> bool {
        self.buses.borrow().contains(&id) || self.destroy_listeners.borrow().contains(&id)
    }

    /// Number of instances with at least one entry, dead ones included until swept
    pub fn len(&self) -> usize {
        let buses = self.buses.borrow();
        let sets = self.destroy_listeners.borrow();
        let mut ids: Vec<&InstanceId> = buses.entries.keys().collect();
        ids.extend(sets.entries.keys().filter(|id| !buses.contains(id)));
        ids.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::event::{EventType, Listener};

    #[test]
    fn test_single_bus_per_instance() {
        let registry = InstanceRegistry::new();
        let instance = Instance::new();

        let first = registry.get_or_create_bus(&instance);
        let second = registry.get_or_create_bus(&instance);
        assert!(Rc::ptr_eq(&first, &second));
    }

    #[test]
    fn test_distinct_instances_get_distinct_buses() {
        let registry = InstanceRegistry::new();
        let a = Instance::new();
        let b = Instance::new();

        let bus_a = registry.get_or_create_bus(&a);
        let bus_b = registry.get_or_create_bus(&b);
        assert!(!Rc::ptr_eq(&bus_a, &bus_b));
        assert_eq!(registry.len(), 2);
    }

    #[test]
    fn test_reading_destroy_listeners_creates_nothing() {
        let registry = InstanceRegistry::new();
        let instance = Instance::new();

        assert!(registry.destroy_listeners(&instance).is_empty());
        assert!(!registry.contains(instance.id()));
        assert!(registry.is_empty());
    }

    #[test]
    fn test_record_and_clear_destroy_listeners() {
        let registry = InstanceRegistry::new();
        let instance = Instance::new();
        let listener = Listener::new(|_| {});

        registry.record_destroy_listener(&instance, DestroyEntry::User(listener.id()));
        registry.record_destroy_listener(&instance, DestroyEntry::User(listener.id()));
        let set = registry.destroy_listeners(&instance);
        assert_eq!(set.len(), 1);
        assert_eq!(set.user_count(), 1);

        registry.clear_destroy_listeners(&instance);
        assert!(registry.destroy_listeners(&instance).is_empty());
    }

    #[test]
    fn test_cleanup_entries_are_distinguished() {
        let registry = InstanceRegistry::new();
        let instance = Instance::new();
        let bus = registry.get_or_create_bus(&instance);
        let target = Listener::new(|_| {});
        let token = CleanupToken::new(EventType::Change, target.id(), &bus);
        let shadow = token.clone().into_listener();

        registry.record_destroy_listener(
            &instance,
            DestroyEntry::Cleanup {
                shadow: shadow.id(),
                token,
            },
        );
        let set = registry.destroy_listeners(&instance);
        assert_eq!(set.cleanup_count(), 1);
        assert_eq!(set.user_count(), 0);
        assert!(set.contains(shadow.id()));
    }

    #[test]
    fn test_dropped_instance_entries_are_swept() {
        let registry = InstanceRegistry::new();
        let gone = Instance::new();
        let gone_id = gone.id();
        let weak_bus = Rc::downgrade(&registry.get_or_create_bus(&gone));
        registry.record_destroy_listener(&gone, DestroyEntry::User(Listener::new(|_| {}).id()));
        drop(gone);

        let kept = Instance::new();
        registry.get_or_create_bus(&kept);

        assert!(!registry.contains(gone_id));
        assert!(weak_bus.upgrade().is_none());
        assert_eq!(registry.len(), 1);
    }

    #[test]
    fn test_release_forgets_instance() {
        let registry = InstanceRegistry::new();
        let instance = Instance::new();
        registry.get_or_create_bus(&instance);

        registry.release(instance.id());
        assert!(!registry.contains(instance.id()));
    }

    #[test]
    fn test_global_registry_is_shared() {
        assert!(Rc::ptr_eq(&InstanceRegistry::global(), &InstanceRegistry::global()));
    }
}
