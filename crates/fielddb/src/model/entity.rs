use crate::query::{COLUMN_ID, COLUMN_LABEL, COLUMN_VERSION};
use serde::{Deserialize, Serialize};

///
/// EntityState
///
/// Provenance marker for a stored entity. `Online` means the server has
/// confirmed the record; `Offline` means it was created or modified locally
/// and not yet confirmed. Once a record has been confirmed `Online` it never
/// drops back to `Offline` through a merge.
///

#[derive(Clone, Copy, Debug, Default, Deserialize, Eq, PartialEq, Serialize)]
pub enum EntityState {
    #[default]
    Offline,
    Online,
}

///
/// NewEntity
///
/// An unsaved entity description. Has no storage position; becomes a
/// `SavedEntity` once it passes through `EntitiesRepository::save`.
///

#[derive(Clone, Debug, Deserialize, PartialEq, Serialize)]
pub struct NewEntity {
    pub id: String,
    pub label: Option<String>,
    pub version: i64,
    pub properties: Vec<(String, String)>,
    pub state: EntityState,
    pub trunk_version: Option<i64>,
    pub branch_id: String,
}

impl NewEntity {
    /// Construct a minimal unsaved entity: version 1, offline, on trunk.
    #[must_use]
    pub fn new(id: impl Into<String>, label: Option<String>) -> Self {
        Self {
            id: id.into(),
            label,
            version: 1,
            properties: Vec::new(),
            state: EntityState::Offline,
            trunk_version: None,
            branch_id: String::new(),
        }
    }

    #[must_use]
    pub fn with_version(mut self, version: i64) -> Self {
        self.version = version;
        self
    }

    #[must_use]
    pub fn with_properties(mut self, properties: Vec<(String, String)>) -> Self {
        self.properties = properties;
        self
    }

    #[must_use]
    pub fn with_property(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.properties.push((name.into(), value.into()));
        self
    }

    #[must_use]
    pub const fn with_state(mut self, state: EntityState) -> Self {
        self.state = state;
        self
    }

    #[must_use]
    pub const fn with_trunk_version(mut self, trunk_version: Option<i64>) -> Self {
        self.trunk_version = trunk_version;
        self
    }

    #[must_use]
    pub fn with_branch_id(mut self, branch_id: impl Into<String>) -> Self {
        self.branch_id = branch_id.into();
        self
    }
}

///
/// SavedEntity
///
/// An entity as returned from a query: `index` is its position within the
/// query result it came from, and `properties` covers exactly the list's
/// current schema, in schema order, with missing values defaulted to `""`.
///

#[derive(Clone, Debug, Deserialize, PartialEq, Serialize)]
pub struct SavedEntity {
    pub id: String,
    pub label: Option<String>,
    pub version: i64,
    pub properties: Vec<(String, String)>,
    pub state: EntityState,
    pub trunk_version: Option<i64>,
    pub branch_id: String,
    pub index: usize,
}

impl SavedEntity {
    /// Case-insensitive property lookup.
    #[must_use]
    pub fn property(&self, name: &str) -> Option<&str> {
        let folded = name.to_lowercase();
        self.properties
            .iter()
            .find(|(candidate, _)| candidate.to_lowercase() == folded)
            .map(|(_, value)| value.as_str())
    }

    /// Resolve a queryable field value: reserved columns first, then
    /// properties. `None` means the column is unknown to this entity.
    #[must_use]
    pub fn field(&self, column: &str) -> Option<String> {
        match column {
            COLUMN_ID => Some(self.id.clone()),
            COLUMN_LABEL => Some(self.label.clone().unwrap_or_default()),
            COLUMN_VERSION => Some(self.version.to_string()),
            _ => self.property(column).map(ToString::to_string),
        }
    }
}

///
/// Entity
///
/// The two shapes of one concept: an unsaved description and a stored record
/// with a result position. Merge logic and `save` accept either shape.
///

#[derive(Clone, Debug, Deserialize, PartialEq, Serialize)]
pub enum Entity {
    New(NewEntity),
    Saved(SavedEntity),
}

impl Entity {
    #[must_use]
    pub fn id(&self) -> &str {
        match self {
            Self::New(entity) => &entity.id,
            Self::Saved(entity) => &entity.id,
        }
    }

    #[must_use]
    pub const fn label(&self) -> Option<&String> {
        match self {
            Self::New(entity) => entity.label.as_ref(),
            Self::Saved(entity) => entity.label.as_ref(),
        }
    }

    #[must_use]
    pub const fn version(&self) -> i64 {
        match self {
            Self::New(entity) => entity.version,
            Self::Saved(entity) => entity.version,
        }
    }

    #[must_use]
    pub fn properties(&self) -> &[(String, String)] {
        match self {
            Self::New(entity) => &entity.properties,
            Self::Saved(entity) => &entity.properties,
        }
    }

    #[must_use]
    pub const fn state(&self) -> EntityState {
        match self {
            Self::New(entity) => entity.state,
            Self::Saved(entity) => entity.state,
        }
    }

    #[must_use]
    pub const fn trunk_version(&self) -> Option<i64> {
        match self {
            Self::New(entity) => entity.trunk_version,
            Self::Saved(entity) => entity.trunk_version,
        }
    }

    #[must_use]
    pub fn branch_id(&self) -> &str {
        match self {
            Self::New(entity) => &entity.branch_id,
            Self::Saved(entity) => &entity.branch_id,
        }
    }

    /// Content equality: everything except state and storage position.
    /// Two descriptions are the same when they denote the same logical
    /// record, regardless of where they sit or who confirmed them.
    #[must_use]
    pub fn same_as(&self, other: &Self) -> bool {
        self.id() == other.id()
            && self.label() == other.label()
            && self.version() == other.version()
            && self.trunk_version() == other.trunk_version()
            && self.branch_id() == other.branch_id()
            && folded_properties(self.properties()) == folded_properties(other.properties())
    }
}

impl From<NewEntity> for Entity {
    fn from(entity: NewEntity) -> Self {
        Self::New(entity)
    }
}

impl From<SavedEntity> for Entity {
    fn from(entity: SavedEntity) -> Self {
        Self::Saved(entity)
    }
}

/// Overlay one property into a bag: case-insensitive key match, value
/// replaced in place if the key exists, appended otherwise. Keeps the
/// first-seen key position and casing.
pub(crate) fn overlay_property(properties: &mut Vec<(String, String)>, name: &str, value: &str) {
    let folded = name.to_lowercase();
    if let Some((_, existing)) = properties
        .iter_mut()
        .find(|(candidate, _)| candidate.to_lowercase() == folded)
    {
        *existing = value.to_string();
    } else {
        properties.push((name.to_string(), value.to_string()));
    }
}

fn folded_properties(properties: &[(String, String)]) -> Vec<(String, String)> {
    let mut folded: Vec<(String, String)> = properties
        .iter()
        .map(|(name, value)| (name.to_lowercase(), value.clone()))
        .collect();
    folded.sort();
    folded
}

///
/// TESTS
///
