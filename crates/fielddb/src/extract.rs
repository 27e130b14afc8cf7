use crate::{
    model::{EntityAction, ExtractedEntity, FormEntity, InvalidEntity, overlay_property},
    tree::TreeElement,
};
use tracing::debug;
use uuid::Uuid;

///
/// CONSTANTS
///

/// Element name marking an entity-producing declaration in a form tree.
pub const ELEMENT_ENTITY: &str = "entity";

/// Wrapper element that holds form bookkeeping; never an entity group.
pub const ELEMENT_META: &str = "meta";

const ATTR_DATASET: &str = "dataset";
const ATTR_ID: &str = "id";
const ATTR_CREATE: &str = "create";
const ATTR_UPDATE: &str = "update";
const ATTR_BASE_VERSION: &str = "baseVersion";
const ATTR_SAVETO: &str = "saveto";
const ELEMENT_LABEL: &str = "label";

/// Scan a completed form's data tree for entity-producing elements and
/// turn each into a merge-ready candidate. Candidates with a malformed id
/// or a blank label come back as `Invalid` rather than being dropped, so
/// callers can surface the failure distinctly from "nothing to save".
///
/// Runs once per form completion, over the finalized (post-relevance)
/// instance.
#[must_use]
pub fn extract_entities(root: &TreeElement) -> Vec<ExtractedEntity> {
    let mut extracted = Vec::new();
    let mut ancestors: Vec<&TreeElement> = Vec::new();

    walk(root, root, &mut ancestors, &mut extracted);
    extracted
}

fn walk<'a>(
    root: &'a TreeElement,
    element: &'a TreeElement,
    ancestors: &mut Vec<&'a TreeElement>,
    extracted: &mut Vec<ExtractedEntity>,
) {
    if !element.relevant() {
        return;
    }

    if element.name() == ELEMENT_ENTITY {
        if let Some(candidate) = extract_one(root, element, ancestors) {
            extracted.push(candidate);
        }
        return;
    }

    ancestors.push(element);
    for child in element.children() {
        walk(root, child, ancestors, extracted);
    }
    ancestors.pop();
}

fn extract_one(
    root: &TreeElement,
    entity: &TreeElement,
    ancestors: &[&TreeElement],
) -> Option<ExtractedEntity> {
    let action = declared_action(entity)?;

    let dataset = entity.attribute(ATTR_DATASET).unwrap_or_default().to_string();
    let id = entity.attribute(ATTR_ID).unwrap_or_default().to_string();
    let label = entity
        .child(ELEMENT_LABEL)
        .map(|child| child.value().to_string())
        .unwrap_or_default();

    if !is_v4_uuid(&id) || label.trim().is_empty() {
        debug!(dataset = dataset.as_str(), id = id.as_str(), "entity candidate failed validation");
        return Some(ExtractedEntity::Invalid(InvalidEntity { dataset, id, label }));
    }

    // The entity group: the nearest enclosing element that is not form
    // bookkeeping, falling back to the whole form.
    let scope = ancestors
        .iter()
        .rev()
        .find(|ancestor| ancestor.name() != ELEMENT_META)
        .copied()
        .unwrap_or(root);

    let mut properties = Vec::new();
    collect_properties(scope, &mut properties);

    let base_version = entity
        .attribute(ATTR_BASE_VERSION)
        .and_then(|raw| raw.parse::<i64>().ok());

    Some(ExtractedEntity::Valid(FormEntity {
        action,
        dataset,
        id,
        label,
        base_version,
        properties,
    }))
}

/// Create wins over update when a form declares both; neither means the
/// element produces nothing this pass.
fn declared_action(entity: &TreeElement) -> Option<EntityAction> {
    if is_truthy(entity.attribute(ATTR_CREATE)) {
        Some(EntityAction::Create)
    } else if is_truthy(entity.attribute(ATTR_UPDATE)) {
        Some(EntityAction::Update)
    } else {
        None
    }
}

fn collect_properties(element: &TreeElement, properties: &mut Vec<(String, String)>) {
    if !element.relevant() {
        return;
    }

    if let Some(property) = element.attribute(ATTR_SAVETO) {
        overlay_property(properties, property, element.value());
    }

    for child in element.children() {
        collect_properties(child, properties);
    }
}

fn is_truthy(value: Option<&str>) -> bool {
    matches!(value, Some("1" | "true"))
}

fn is_v4_uuid(id: &str) -> bool {
    Uuid::parse_str(id).is_ok_and(|uuid| uuid.get_version_num() == 4)
}

///
/// TESTS
///
