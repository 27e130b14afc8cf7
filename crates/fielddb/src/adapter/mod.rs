mod partial;

pub use partial::{PartialRows, RowIter};

use crate::{
    model::SavedEntity,
    query::{COLUMN_ID, COLUMN_LABEL, COLUMN_VERSION, Query, QueryError},
    store::EntitiesRepository,
    tree::TreeElement,
};
use std::sync::Arc;

///
/// CONSTANTS
///

/// Element name for one entity within an instance tree.
pub const ELEMENT_ITEM: &str = "item";

/// Child names for the lineage fields that follow the reserved columns.
pub const CHILD_TRUNK_VERSION: &str = "trunk_version";
pub const CHILD_BRANCH_ID: &str = "branch_id";

///
/// InstanceAdapter
///
/// Converts stored entities into the tree shape the expression evaluator
/// consumes. Child order per entity is fixed: id, label, version,
/// trunk_version, branch_id, then every schema property in schema order.
/// Element 0 alone tells a consumer the list's full shape.
///

pub struct InstanceAdapter<R> {
    repo: Arc<R>,
}

impl<R: EntitiesRepository> InstanceAdapter<R> {
    #[must_use]
    pub const fn new(repo: Arc<R>) -> Self {
        Self { repo }
    }

    /// Materialize every entity eagerly. For small lists.
    #[must_use]
    pub fn full(&self, list: &str) -> Vec<TreeElement> {
        self.repo
            .query(list, None)
            .unwrap_or_default()
            .iter()
            .map(entity_element)
            .collect()
    }

    /// Lazy materialization: element 0 is built at construction, the rest
    /// are fetched on demand as the sequence is advanced.
    #[must_use]
    pub fn partial(&self, list: &str) -> PartialRows<R> {
        PartialRows::new(Arc::clone(&self.repo), list)
    }

    /// Answer a predicate directly from the store, bypassing full and
    /// partial materialization.
    pub fn query(&self, list: &str, query: &Query) -> Result<Vec<TreeElement>, QueryError> {
        Ok(self
            .repo
            .query(list, Some(query))?
            .iter()
            .map(entity_element)
            .collect())
    }
}

/// Convert one stored entity to its instance-tree element.
#[must_use]
pub fn entity_element(entity: &SavedEntity) -> TreeElement {
    let mut children = vec![
        TreeElement::leaf(COLUMN_ID, &entity.id),
        TreeElement::leaf(COLUMN_LABEL, entity.label.clone().unwrap_or_default()),
        TreeElement::leaf(COLUMN_VERSION, entity.version.to_string()),
        TreeElement::leaf(
            CHILD_TRUNK_VERSION,
            entity.trunk_version.map_or_else(String::new, |v| v.to_string()),
        ),
        TreeElement::leaf(CHILD_BRANCH_ID, &entity.branch_id),
    ];
    children.extend(
        entity
            .properties
            .iter()
            .map(|(name, value)| TreeElement::leaf(name, value)),
    );

    TreeElement::new(ELEMENT_ITEM).with_children(children)
}

///
/// TESTS
///

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{
        model::NewEntity,
        store::InMemoryEntities,
    };

    fn seeded_repo() -> Arc<InMemoryEntities> {
        let repo = Arc::new(InMemoryEntities::new());
        repo.save(
            "people",
            &[
                NewEntity::new("u1", Some("Shiv".to_string()))
                    .with_version(2)
                    .with_trunk_version(Some(1))
                    .with_property("age", "35")
                    .into(),
                NewEntity::new("u2", None).with_property("born", "England").into(),
            ],
        );
        repo
    }

    #[test]
    fn children_follow_the_fixed_order_then_schema_order() {
        let adapter = InstanceAdapter::new(seeded_repo());

        let items = adapter.full("people");
        let names: Vec<&str> = items[0]
            .children()
            .iter()
            .map(TreeElement::name)
            .collect();

        assert_eq!(
            names,
            ["id", "label", "version", "trunk_version", "branch_id", "age", "born"]
        );
    }

    #[test]
    fn missing_values_render_as_empty_strings() {
        let adapter = InstanceAdapter::new(seeded_repo());

        let items = adapter.full("people");
        let u2 = &items[1];

        assert_eq!(u2.child("id").map(TreeElement::value), Some("u2"));
        assert_eq!(u2.child("label").map(TreeElement::value), Some(""));
        assert_eq!(u2.child("trunk_version").map(TreeElement::value), Some(""));
        assert_eq!(u2.child("age").map(TreeElement::value), Some(""));
        assert_eq!(u2.child("born").map(TreeElement::value), Some("England"));
    }

    #[test]
    fn full_on_an_unknown_list_is_empty() {
        let adapter = InstanceAdapter::new(Arc::new(InMemoryEntities::new()));

        assert!(adapter.full("nowhere").is_empty());
    }

    #[test]
    fn query_translates_matches_only() {
        let adapter = InstanceAdapter::new(seeded_repo());

        let items = adapter
            .query("people", &Query::string_eq("age", "35"))
            .unwrap();

        assert_eq!(items.len(), 1);
        assert_eq!(items[0].child("id").map(TreeElement::value), Some("u1"));
    }

    #[test]
    fn query_propagates_unknown_columns() {
        let adapter = InstanceAdapter::new(seeded_repo());

        assert!(adapter
            .query("people", &Query::string_eq("height", "180"))
            .is_err());
    }
}
