#![warn(clippy::all, rust_2018_idioms)]

pub mod components;
pub mod config;
pub mod editor;
pub mod error;
pub mod event;
pub mod registry;

mod id_generator;

pub use components::Component;
pub use config::EditorConfig;
pub use editor::Editor;
pub use error::{EditorError, EditorResult, Part};
pub use event::{CleanupToken, EventBus, EventType, Listener, ListenerId};
pub use registry::{DestroyEntry, DestroyListenerSet, Instance, InstanceId, InstanceRegistry};
