use serde::{Deserialize, Serialize};
use std::fmt;

/// Name of an editor event.
///
/// Only [`EventType::Destroyed`] carries special semantics: listeners for every
/// other event are unregistered automatically when it fires.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum EventType {
    Created,
    Change,
    Destroyed,
    Custom(String),
}

impl EventType {
    pub fn as_str(&self) -> &str {
        match self {
            Self::Created => "created",
            Self::Change => "change",
            Self::Destroyed => "destroyed",
            Self::Custom(name) => name,
        }
    }

    pub fn is_destroyed(&self) -> bool {
        matches!(self, Self::Destroyed)
    }
}

impl From<&str> for EventType {
    fn from(name: &str) -> Self {
        match name {
            "created" => Self::Created,
            "change" => Self::Change,
            "destroyed" => Self::Destroyed,
            other => Self::Custom(other.to_string()),
        }
    }
}

impl From<String> for EventType {
    fn from(name: String) -> Self {
        match name.as_str() {
            "created" | "change" | "destroyed" => Self::from(name.as_str()),
            _ => Self::Custom(name),
        }
    }
}

impl From<EventType> for String {
    fn from(event: EventType) -> Self {
        match event {
            EventType::Custom(name) => name,
            other => other.as_str().to_string(),
        }
    }
}

impl fmt::Display for EventType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_reserved_names_map_to_variants() {
        assert_eq!(EventType::from("destroyed"), EventType::Destroyed);
        assert_eq!(EventType::from("change"), EventType::Change);
        assert_eq!(EventType::from("created".to_string()), EventType::Created);
        assert_eq!(
            EventType::from("selectionChange"),
            EventType::Custom("selectionChange".into())
        );
    }

    #[test]
    fn test_only_destroyed_is_special() {
        assert!(EventType::Destroyed.is_destroyed());
        assert!(!EventType::Change.is_destroyed());
        assert!(!EventType::Custom("destroy".into()).is_destroyed());
    }

    #[test]
    fn test_serializes_as_plain_name() {
        let json = serde_json::to_string(&EventType::Destroyed).unwrap();
        assert_eq!(json, "\"destroyed\"");

        let parsed: Vec<EventType> = serde_json::from_str(r#"["change", "fullScreen"]"#).unwrap();
        assert_eq!(parsed, vec![EventType::Change, EventType::Custom("fullScreen".into())]);
    }
}
