use std::cell::RefCell;
use std::rc::Rc;

use super::Editor;
use crate::components::Component;
use crate::error::{EditorError, EditorResult, Part};
use crate::event::{CleanupToken, EventBus, EventType, Listener};
use crate::registry::{DestroyEntry, DestroyListenerSet};

impl Editor {
    /// This editor's private event bus, created on first use
    pub fn event_bus(&self) -> Rc<EventBus> {
        self.registry.get_or_create_bus(&self.instance)
    }

    /// The listeners that will be detached from `destroyed` after it next fires
    pub fn destroy_listeners(&self) -> DestroyListenerSet {
        self.registry.destroy_listeners(&self.instance)
    }

    /// Registers `listener` for every emission of `event`.
    ///
    /// For any event other than `destroyed` a shadow listener is registered on
    /// `destroyed` that unregisters `listener` again, and its [`CleanupToken`]
    /// is returned. Listeners for `destroyed` itself are only recorded so they
    /// can be detached once it has fired.
    pub fn on(&self, event: impl Into<EventType>, listener: &Listener) -> Option<CleanupToken> {
        let event = event.into();
        let bus = self.event_bus();
        bus.on(event.clone(), listener.clone());

        if event.is_destroyed() {
            self.registry
                .record_destroy_listener(&self.instance, DestroyEntry::User(listener.id()));
            return None;
        }

        let token = CleanupToken::new(event, listener.id(), &bus);
        let shadow = token.clone().into_listener();
        bus.on(EventType::Destroyed, shadow.clone());
        self.registry.record_destroy_listener(
            &self.instance,
            DestroyEntry::Cleanup {
                shadow: shadow.id(),
                token: token.clone(),
            },
        );
        Some(token)
    }

    /// Registers `listener` for the next emission of `event` only. Not tracked for cleanup.
    pub fn once(&self, event: impl Into<EventType>, listener: &Listener) {
        self.event_bus().once(event.into(), listener.clone());
    }

    /// Unregisters `listener` from `event`. Unknown pairs are ignored.
    pub fn off(&self, event: impl Into<EventType>, listener: &Listener) {
        self.event_bus().off(&event.into(), listener);
    }

    /// Synchronously invokes the listeners of `event` in registration order.
    ///
    /// After a `destroyed` emission has reached every listener, all recorded
    /// destroy listeners are detached and the record is cleared.
    pub fn emit(&self, event: impl Into<EventType>) {
        let event = event.into();
        let bus = self.event_bus();
        bus.emit(&event);

        if event.is_destroyed() {
            let listeners = self.registry.destroy_listeners(&self.instance);
            for entry in listeners.iter() {
                bus.off_id(&EventType::Destroyed, entry.listener_id());
            }
            self.registry.clear_destroy_listeners(&self.instance);
            log::debug!(
                "editor {} detached {} destroy listener(s)",
                self.id(),
                listeners.len()
            );
        }
    }

    /// Destroys the text area, then the toolbar and hoverbar if attached, then
    /// emits `destroyed`.
    ///
    /// A failing component aborts the cascade and its error is returned; the
    /// editor is not marked destroyed, so a later call retries the whole
    /// cascade. Calls made while a cascade is running are ignored. With the
    /// default config only the first successful call does anything.
    pub fn destroy(&self) -> EditorResult<()> {
        if self.destroying.get() {
            log::debug!("editor {} is already being destroyed", self.id());
            return Ok(());
        }
        if self.destroyed.get() && self.guard_repeated_destroy {
            log::debug!("editor {} already destroyed", self.id());
            return Ok(());
        }
        log::debug!("destroying editor {}", self.id());

        self.destroying.set(true);
        let result = self.run_cascade();
        self.destroying.set(false);
        result?;

        self.destroyed.set(true);
        Ok(())
    }

    fn run_cascade(&self) -> EditorResult<()> {
        teardown(Part::TextArea, &self.text_area)?;
        teardown(Part::Toolbar, &self.toolbar)?;
        teardown(Part::Hoverbar, &self.hoverbar)?;
        self.emit(EventType::Destroyed);
        Ok(())
    }
}

// The component is taken out of its slot while it runs so it may call back
// into the editor. It goes back afterwards unless a replacement was attached.
fn teardown(part: Part, slot: &RefCell<Option<Box<dyn Component>>>) -> EditorResult<()> {
    let Some(mut component) = slot.borrow_mut().take() else {
        return Ok(());
    };
    let result = component.destroy().map_err(|reason| {
        log::warn!("failed to destroy {}: {}", part, reason);
        EditorError::Teardown { part, reason }
    });
    slot.borrow_mut().get_or_insert(component);
    result
}
