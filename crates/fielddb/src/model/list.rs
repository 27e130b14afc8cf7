use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

///
/// EntityList
///
/// Per-list metadata. `hash` fingerprints the last known-good full dataset
/// (used by sync collaborators to decide whether a re-sync is needed);
/// `needs_approval` marks lists whose offline-created entities require
/// server approval before they count as canonical.
///

#[derive(Clone, Debug, Deserialize, Eq, PartialEq, Serialize)]
pub struct EntityList {
    pub name: String,
    pub hash: Option<String>,
    pub needs_approval: bool,
    pub last_updated: Option<DateTime<Utc>>,
}

impl EntityList {
    #[must_use]
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            hash: None,
            needs_approval: false,
            last_updated: None,
        }
    }
}

///
/// TESTS
///
