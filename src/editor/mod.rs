//! The editor instance and the event lifecycle installed on it.
//!
//! Every [`Editor`] owns an [`Instance`] identity. Its event bus and destroy
//! bookkeeping live in an [`InstanceRegistry`] keyed by that identity, so
//! the editor itself carries no event state.
//!
//! # Example
//!
//! ```rust
//! use editor_lifecycle::{Editor, Listener};
//!
//! let editor = Editor::new(|| -> Result<(), String> { Ok(()) });
//! editor.on("change", &Listener::new(|_| println!("changed")));
//! editor.emit("change");
//!
//! // Unregisters the "change" listener along with everything else.
//! editor.destroy().unwrap();
//! ```

mod lifecycle;

use std::cell::{Cell, RefCell};
use std::fmt;
use std::rc::Rc;

use crate::components::Component;
use crate::config::EditorConfig;
use crate::event::EventType;
use crate::registry::{Instance, InstanceId, InstanceRegistry};

/// One live editing session
pub struct Editor {
    instance: Instance,
    registry: Rc<InstanceRegistry>,
    text_area: RefCell<Option<Box<dyn Component>>>,
    toolbar: RefCell<Option<Box<dyn Component>>>,
    hoverbar: RefCell<Option<Box<dyn Component>>>,
    guard_repeated_destroy: bool,
    destroying: Cell<bool>,
    destroyed: Cell<bool>,
}

impl fmt::Debug for Editor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Editor")
            .field("id", &self.instance.id())
            .field("has_toolbar", &self.has_toolbar())
            .field("has_hoverbar", &self.has_hoverbar())
            .field("destroyed", &self.destroyed.get())
            .finish()
    }
}

impl Editor {
    /// Creates an editor around `text_area` with the default config
    pub fn new(text_area: impl Component + 'static) -> Self {
        Self::with_registry(text_area, InstanceRegistry::global(), &EditorConfig::default())
    }

    /// Creates an editor and wires the config's lifecycle hooks.
    ///
    /// `on_change` and `on_destroyed` are registered with [`Editor::on`];
    /// `on_created` fires once before this returns.
    pub fn create(text_area: impl Component + 'static, config: EditorConfig) -> Self {
        let editor = Self::with_registry(text_area, InstanceRegistry::global(), &config);
        editor.install_hooks(config);
        editor
    }

    /// Creates an editor whose event state lives in `registry` instead of the thread's global one
    pub fn with_registry(
        text_area: impl Component + 'static,
        registry: Rc<InstanceRegistry>,
        config: &EditorConfig,
    ) -> Self {
        let instance = Instance::new();
        log::debug!("editor {} created", instance.id());
        Self {
            instance,
            registry,
            text_area: RefCell::new(Some(Box::new(text_area))),
            toolbar: RefCell::new(None),
            hoverbar: RefCell::new(None),
            guard_repeated_destroy: config.guard_repeated_destroy,
            destroying: Cell::new(false),
            destroyed: Cell::new(false),
        }
    }

    fn install_hooks(&self, config: EditorConfig) {
        if let Some(listener) = config.on_change {
            self.on(EventType::Change, &listener);
        }
        if let Some(listener) = config.on_destroyed {
            self.on(EventType::Destroyed, &listener);
        }
        if let Some(listener) = config.on_created {
            self.once(EventType::Created, &listener);
            self.emit(EventType::Created);
        }
    }

    pub fn id(&self) -> InstanceId {
        self.instance.id()
    }

    pub fn registry(&self) -> &Rc<InstanceRegistry> {
        &self.registry
    }

    /// Attaches a toolbar, replacing any previous one
    pub fn attach_toolbar(&self, toolbar: impl Component + 'static) {
        *self.toolbar.borrow_mut() = Some(Box::new(toolbar));
    }

    /// Attaches a hoverbar, replacing any previous one
    pub fn attach_hoverbar(&self, hoverbar: impl Component + 'static) {
        *self.hoverbar.borrow_mut() = Some(Box::new(hoverbar));
    }

    /// False while the toolbar's own `destroy` is running
    pub fn has_toolbar(&self) -> bool {
        self.toolbar.borrow().is_some()
    }

    pub fn has_hoverbar(&self) -> bool {
        self.hoverbar.borrow().is_some()
    }

    /// True once a `destroy` call has completed its cascade
    pub fn is_destroyed(&self) -> bool {
        self.destroyed.get()
    }
}

impl Drop for Editor {
    fn drop(&mut self) {
        self.registry.release(self.instance.id());
    }
}
