use serde::{Deserialize, Serialize};

use crate::error::EditorResult;
use crate::event::Listener;

/// Editor configuration.
///
/// The lifecycle hooks are plain listeners and are never serialized; only
/// the scalar options round-trip through JSON.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct EditorConfig {
    /// When true, `destroy` only runs once and later calls are no-ops
    pub guard_repeated_destroy: bool,

    #[serde(skip)]
    pub on_created: Option<Listener>,
    #[serde(skip)]
    pub on_change: Option<Listener>,
    #[serde(skip)]
    pub on_destroyed: Option<Listener>,
}

impl Default for EditorConfig {
    fn default() -> Self {
        Self {
            guard_repeated_destroy: true,
            on_created: None,
            on_change: None,
            on_destroyed: None,
        }
    }
}

impl EditorConfig {
    /// Parses the serializable part of a config; missing keys take their defaults
    pub fn from_json(json: &str) -> EditorResult<Self> {
        Ok(serde_json::from_str(json)?)
    }

    pub fn with_on_created(mut self, listener: Listener) -> Self {
        self.on_created = Some(listener);
        self
    }

    pub fn with_on_change(mut self, listener: Listener) -> Self {
        self.on_change = Some(listener);
        self
    }

    pub fn with_on_destroyed(mut self, listener: Listener) -> Self {
        self.on_destroyed = Some(listener);
        self
    }
}
