use serde::{Deserialize, Serialize};

///
/// TreeElement
///
/// The tree-shaped data representation shared with the expression
/// evaluator: the instance adapter produces these for stored entities, and
/// the finalization extractor consumes them from a completed form.
/// `relevant` carries the form engine's relevance state; irrelevant
/// elements are invisible to extraction.
///

#[derive(Clone, Debug, Deserialize, Eq, PartialEq, Serialize)]
pub struct TreeElement {
    name: String,
    value: String,
    attributes: Vec<(String, String)>,
    children: Vec<Self>,
    relevant: bool,
}

impl TreeElement {
    #[must_use]
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            value: String::new(),
            attributes: Vec::new(),
            children: Vec::new(),
            relevant: true,
        }
    }

    /// A childless element holding a value.
    #[must_use]
    pub fn leaf(name: impl Into<String>, value: impl Into<String>) -> Self {
        Self {
            value: value.into(),
            ..Self::new(name)
        }
    }

    #[must_use]
    pub fn with_value(mut self, value: impl Into<String>) -> Self {
        self.value = value.into();
        self
    }

    #[must_use]
    pub fn with_attribute(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.attributes.push((name.into(), value.into()));
        self
    }

    #[must_use]
    pub fn with_child(mut self, child: Self) -> Self {
        self.children.push(child);
        self
    }

    #[must_use]
    pub fn with_children(mut self, children: impl IntoIterator<Item = Self>) -> Self {
        self.children.extend(children);
        self
    }

    #[must_use]
    pub const fn with_relevant(mut self, relevant: bool) -> Self {
        self.relevant = relevant;
        self
    }

    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    #[must_use]
    pub fn value(&self) -> &str {
        &self.value
    }

    #[must_use]
    pub fn attribute(&self, name: &str) -> Option<&str> {
        self.attributes
            .iter()
            .find(|(candidate, _)| candidate == name)
            .map(|(_, value)| value.as_str())
    }

    /// First child with the given element name.
    #[must_use]
    pub fn child(&self, name: &str) -> Option<&Self> {
        self.children.iter().find(|child| child.name == name)
    }

    #[must_use]
    pub fn children(&self) -> &[Self] {
        &self.children
    }

    #[must_use]
    pub const fn relevant(&self) -> bool {
        self.relevant
    }
}

///
/// TESTS
///
