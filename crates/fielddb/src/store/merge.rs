use crate::model::{Entity, EntityState, overlay_property};

///
/// StoredEntity
///
/// The sparse, storage-internal shape of one entity: properties hold only
/// what was actually written, under the schema's first-seen casing.
/// Materialization against the schema happens at query time.
///

#[derive(Clone, Debug, PartialEq)]
pub(crate) struct StoredEntity {
    pub id: String,
    pub label: Option<String>,
    pub version: i64,
    pub properties: Vec<(String, String)>,
    pub state: EntityState,
    pub trunk_version: Option<i64>,
    pub branch_id: String,
}

impl StoredEntity {
    pub fn from_entity(entity: &Entity) -> Self {
        // Normalize the bag on the way in: later duplicates of a key within
        // one write win, and stored bags stay unique under case folding.
        let mut properties = Vec::new();
        for (name, value) in entity.properties() {
            overlay_property(&mut properties, name, value);
        }

        Self {
            id: entity.id().to_string(),
            label: entity.label().cloned(),
            version: entity.version(),
            properties,
            state: entity.state(),
            trunk_version: entity.trunk_version(),
            branch_id: entity.branch_id().to_string(),
        }
    }

    /// Case-insensitive sparse property lookup.
    pub fn property(&self, name: &str) -> Option<&str> {
        let folded = name.to_lowercase();
        self.properties
            .iter()
            .find(|(candidate, _)| candidate.to_lowercase() == folded)
            .map(|(_, value)| value.as_str())
    }
}

/// Merge an incoming write onto the stored entity with the same id.
///
/// - label: incoming wins when present, else the stored label is kept
/// - version: never drops below the max of the two revisions
/// - trunk_version, branch_id: the incoming write is authoritative
/// - properties: union-with-overwrite, incoming values win per key
/// - state: Online is sticky; an Offline record takes the incoming state
pub(crate) fn merge_entities(existing: &StoredEntity, incoming: &Entity) -> StoredEntity {
    let mut properties = existing.properties.clone();
    for (name, value) in incoming.properties() {
        overlay_property(&mut properties, name, value);
    }

    let state = if existing.state == EntityState::Online {
        EntityState::Online
    } else {
        incoming.state()
    };

    StoredEntity {
        id: existing.id.clone(),
        label: incoming
            .label()
            .cloned()
            .or_else(|| existing.label.clone()),
        version: existing.version.max(incoming.version()),
        properties,
        state,
        trunk_version: incoming.trunk_version(),
        branch_id: incoming.branch_id().to_string(),
    }
}

///
/// TESTS
///

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::NewEntity;

    fn stored(label: Option<&str>, version: i64, properties: Vec<(&str, &str)>) -> StoredEntity {
        StoredEntity {
            id: "u1".to_string(),
            label: label.map(ToString::to_string),
            version,
            properties: properties
                .into_iter()
                .map(|(name, value)| (name.to_string(), value.to_string()))
                .collect(),
            state: EntityState::Offline,
            trunk_version: None,
            branch_id: String::new(),
        }
    }

    #[test]
    fn missing_incoming_label_keeps_the_stored_one() {
        let existing = stored(Some("Shiv"), 1, vec![]);
        let incoming = Entity::New(NewEntity::new("u1", None).with_version(2));

        let merged = merge_entities(&existing, &incoming);

        assert_eq!(merged.label.as_deref(), Some("Shiv"));
        assert_eq!(merged.version, 2);
    }

    #[test]
    fn properties_union_with_incoming_overwrite() {
        let existing = stored(None, 1, vec![("age", "35"), ("born", "England")]);
        let incoming = Entity::New(
            NewEntity::new("u1", None)
                .with_property("AGE", "36")
                .with_property("height", "180"),
        );

        let merged = merge_entities(&existing, &incoming);

        assert_eq!(merged.property("age"), Some("36"));
        assert_eq!(merged.property("born"), Some("England"));
        assert_eq!(merged.property("height"), Some("180"));
        // Casing of a known key follows the stored bag, not the write.
        assert_eq!(merged.properties[0].0, "age");
    }

    #[test]
    fn version_never_drops_below_the_stored_revision() {
        let existing = stored(None, 5, vec![]);
        let stale = Entity::New(NewEntity::new("u1", None).with_version(3));

        let merged = merge_entities(&existing, &stale);

        assert_eq!(merged.version, 5);
    }

    #[test]
    fn online_state_is_sticky() {
        let mut existing = stored(None, 1, vec![]);
        existing.state = EntityState::Online;
        let offline_write =
            Entity::New(NewEntity::new("u1", None).with_state(EntityState::Offline));

        let merged = merge_entities(&existing, &offline_write);

        assert_eq!(merged.state, EntityState::Online);
    }

    #[test]
    fn offline_record_takes_the_incoming_state() {
        let existing = stored(None, 1, vec![]);
        let online_write = Entity::New(NewEntity::new("u1", None).with_state(EntityState::Online));

        let merged = merge_entities(&existing, &online_write);

        assert_eq!(merged.state, EntityState::Online);
    }

    #[test]
    fn incoming_write_is_authoritative_for_lineage() {
        let mut existing = stored(None, 3, vec![]);
        existing.trunk_version = Some(2);
        existing.branch_id = "old-edit".to_string();
        let incoming = Entity::New(
            NewEntity::new("u1", None)
                .with_version(4)
                .with_trunk_version(Some(3))
                .with_branch_id("new-edit"),
        );

        let merged = merge_entities(&existing, &incoming);

        assert_eq!(merged.trunk_version, Some(3));
        assert_eq!(merged.branch_id, "new-edit");
    }
}
