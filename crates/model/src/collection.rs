use std::fmt;

use serde::{Deserialize, Serialize};

/// Well-known collection names exposed by the hosted backend.
pub mod names {
    pub const APPEALS: &str = "appeals";
    pub const RESOURCES: &str = "resources";
    pub const FAQ_ITEMS: &str = "faq_items";
    pub const NOTIFICATIONS: &str = "notifications";
    pub const ACTIVITIES: &str = "activities";
}

/// An opaque identifier for a remote collection.
///
/// The backend owns the namespace; this type carries the name without
/// interpreting it. The constants in [`names`] cover the collections the
/// portal currently uses, but nothing restricts a store to them.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct CollectionName(String);

impl CollectionName {
    pub fn new(name: impl Into<String>) -> Self {
        Self(name.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl From<&str> for CollectionName {
    fn from(name: &str) -> Self {
        Self(name.to_string())
    }
}

impl fmt::Display for CollectionName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// An opaque identifier for a single record within a collection.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct RecordId(String);

impl RecordId {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl From<&str> for RecordId {
    fn from(id: &str) -> Self {
        Self(id.to_string())
    }
}

impl fmt::Display for RecordId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn collection_name_round_trips_through_json() {
        let name = CollectionName::from(names::APPEALS);
        let json = serde_json::to_string(&name).unwrap();
        assert_eq!(json, "\"appeals\"");
        let back: CollectionName = serde_json::from_str(&json).unwrap();
        assert_eq!(back, name);
    }

    #[test]
    fn record_id_displays_raw_value() {
        let id = RecordId::new("rec-42");
        assert_eq!(id.to_string(), "rec-42");
        assert_eq!(id.as_str(), "rec-42");
    }
}
