//! End-to-end flow: a finalized form produces entity candidates, the store
//! merges them with a server-synced dataset, and both evaluator entry
//! points (instance materialization and pushdown) observe the result.

use fielddb::{
    adapter::InstanceAdapter,
    extract::extract_entities,
    model::{EntityState, ExtractedEntity, NewEntity},
    prelude::*,
    pull::PullData,
    pushdown::{FilterExpr, InstanceRegistry, Literal, PushdownFilter},
    store::{EntitiesRepository, InMemoryEntities},
};
use std::sync::Arc;

const PERSON_ID: &str = "3b4f5ab2-8a1e-4f9a-9c42-1f0a5b6de111";

fn finalized_form() -> TreeElement {
    TreeElement::new("data")
        .with_child(TreeElement::leaf("age", "35").with_attribute("saveto", "age"))
        .with_child(
            TreeElement::new("meta").with_child(
                TreeElement::new("entity")
                    .with_attribute("dataset", "people")
                    .with_attribute("id", PERSON_ID)
                    .with_attribute("create", "1")
                    .with_child(TreeElement::leaf("label", "Shiv")),
            ),
        )
}

#[test]
fn finalization_sync_and_evaluation_agree_on_one_record() {
    let repo = Arc::new(InMemoryEntities::new());

    // A dataset sync writes server-confirmed rows first.
    repo.add_list("people");
    repo.update_list("people", "md5:seed", false);
    repo.save(
        "people",
        &[NewEntity::new(PERSON_ID, Some("S.".to_string()))
            .with_property("born", "England")
            .with_state(EntityState::Online)
            .into()],
    );

    // Form finalization extracts a local update for the same id.
    let extracted = extract_entities(&finalized_form());
    assert_eq!(extracted.len(), 1);
    let candidates: Vec<Entity> = extracted
        .iter()
        .map(|candidate| match candidate {
            ExtractedEntity::Valid(entity) => entity.to_entity(),
            ExtractedEntity::Invalid(invalid) => panic!("unexpected invalid: {invalid:?}"),
        })
        .collect();
    repo.save("people", &candidates);

    // The merge kept the synced field, took the form's label, and stayed
    // Online despite the offline write.
    let rows = repo.query("people", None).unwrap();
    assert_eq!(rows.len(), 1);
    assert_eq!(rows[0].label.as_deref(), Some("Shiv"));
    assert_eq!(rows[0].property("age"), Some("35"));
    assert_eq!(rows[0].property("born"), Some("England"));
    assert_eq!(rows[0].state, EntityState::Online);

    // Full materialization exposes both schema properties on the element.
    let adapter = InstanceAdapter::new(Arc::clone(&repo));
    let items = adapter.full("people");
    assert_eq!(items.len(), 1);
    assert_eq!(items[0].child("born").map(TreeElement::value), Some("England"));
    assert_eq!(items[0].child("age").map(TreeElement::value), Some("35"));

    // The partial path sees the same element 0 without a full load.
    let partial = adapter.partial("people");
    assert_eq!(partial.len(), 1);
    assert_eq!(partial.first(), items.first());

    // Pushdown answers a supported predicate without the generic path.
    let mut registry = InstanceRegistry::new();
    registry.register("people");
    let strategy = PushdownFilter::new(Arc::clone(&repo), registry);
    let matched = strategy.filter(
        "people",
        &FilterExpr::eq("age", Literal::Text("35".to_string())),
        || panic!("generic path must not run"),
    );
    assert_eq!(matched, items);

    // And the pull function resolves a single value from the same state.
    let pull = PullData::new(repo);
    assert_eq!(pull.pull("people", "label", "id", PERSON_ID), "Shiv");
    assert_eq!(pull.pull("people", "born", "age", "35"), "England");
}
