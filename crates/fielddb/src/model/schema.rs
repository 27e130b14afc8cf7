use derive_more::Deref;
use serde::{Deserialize, Serialize};

///
/// ListSchema
///
/// Append-only registry of the property names ever observed on a list.
/// Names are unique case-insensitively; the first-seen casing is retained
/// for display and the insertion order is the schema order every query
/// result follows.
///

#[derive(Clone, Debug, Default, Deref, Deserialize, Eq, PartialEq, Serialize)]
pub struct ListSchema(Vec<String>);

impl ListSchema {
    #[must_use]
    pub const fn new() -> Self {
        Self(Vec::new())
    }

    /// Case-insensitive membership check.
    #[must_use]
    pub fn contains(&self, name: &str) -> bool {
        let folded = name.to_lowercase();
        self.0.iter().any(|known| known.to_lowercase() == folded)
    }

    /// Return the first-seen casing for a property name.
    #[must_use]
    pub fn canonical(&self, name: &str) -> Option<&str> {
        let folded = name.to_lowercase();
        self.0
            .iter()
            .find(|known| known.to_lowercase() == folded)
            .map(String::as_str)
    }

    /// Record a property name. Appends only when the name is new under
    /// case folding; returns whether the schema grew.
    pub fn observe(&mut self, name: &str) -> bool {
        if self.contains(name) {
            return false;
        }

        self.0.push(name.to_string());
        true
    }

    #[must_use]
    pub fn names(&self) -> &[String] {
        &self.0
    }
}

///
/// TESTS
///

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn observe_appends_in_first_seen_order() {
        let mut schema = ListSchema::new();

        assert!(schema.observe("age"));
        assert!(schema.observe("born"));
        assert!(!schema.observe("age"));

        assert_eq!(schema.names(), ["age", "born"]);
    }

    #[test]
    fn observe_dedupes_case_insensitively_keeping_first_casing() {
        let mut schema = ListSchema::new();

        assert!(schema.observe("Age"));
        assert!(!schema.observe("AGE"));
        assert!(!schema.observe("age"));

        assert_eq!(schema.names(), ["Age"]);
        assert_eq!(schema.canonical("aGe"), Some("Age"));
    }

    #[test]
    fn deref_exposes_iteration() {
        let mut schema = ListSchema::new();
        schema.observe("a");
        schema.observe("b");

        let collected: Vec<&str> = schema.iter().map(String::as_str).collect();
        assert_eq!(collected, ["a", "b"]);
    }
}
