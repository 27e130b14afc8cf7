use crate::model::entity::{Entity, NewEntity};
use serde::{Deserialize, Serialize};

///
/// EntityAction
///
/// What a form submission intends for its entity: create a new record or
/// update an existing one. Any other declared action produces nothing.
///

#[derive(Clone, Copy, Debug, Deserialize, Eq, PartialEq, Serialize)]
pub enum EntityAction {
    Create,
    Update,
}

///
/// FormEntity
///
/// A validated, merge-ready entity candidate produced by finalization.
/// `base_version` is the stored version the form's edit was based on; an
/// update candidate advances past it and records it as the trunk version.
///

#[derive(Clone, Debug, Deserialize, PartialEq, Serialize)]
pub struct FormEntity {
    pub action: EntityAction,
    pub dataset: String,
    pub id: String,
    pub label: String,
    pub base_version: Option<i64>,
    pub properties: Vec<(String, String)>,
}

impl FormEntity {
    /// Convert into an unsaved entity ready for `EntitiesRepository::save`.
    #[must_use]
    pub fn to_entity(&self) -> Entity {
        Entity::New(
            NewEntity::new(&self.id, Some(self.label.clone()))
                .with_version(self.base_version.map_or(1, |base| base + 1))
                .with_trunk_version(self.base_version)
                .with_properties(self.properties.clone()),
        )
    }
}

///
/// InvalidEntity
///
/// A candidate that failed validation (malformed id or blank label).
/// Carried as data rather than an error so callers can decide whether to
/// block finalization, warn, or skip.
///

#[derive(Clone, Debug, Deserialize, Eq, PartialEq, Serialize)]
pub struct InvalidEntity {
    pub dataset: String,
    pub id: String,
    pub label: String,
}

///
/// ExtractedEntity
///

#[derive(Clone, Debug, Deserialize, PartialEq, Serialize)]
pub enum ExtractedEntity {
    Valid(FormEntity),
    Invalid(InvalidEntity),
}

///
/// TESTS
///
