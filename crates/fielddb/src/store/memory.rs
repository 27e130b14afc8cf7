use crate::{
    model::{Entity, EntityList, ListSchema, SavedEntity},
    query::{Query, QueryError},
    store::{
        EntitiesRepository,
        merge::{StoredEntity, merge_entities},
    },
};
use chrono::Utc;
use std::{
    collections::BTreeMap,
    sync::{Arc, PoisonError, RwLock, RwLockReadGuard, RwLockWriteGuard},
};
use tracing::debug;

///
/// ListCell
///
/// One list's complete state: metadata, schema, and rows in insertion
/// order. Insertion order is the default query order; a merge keeps the
/// row's position.
///

struct ListCell {
    meta: EntityList,
    schema: ListSchema,
    rows: Vec<StoredEntity>,
}

impl ListCell {
    fn new(name: &str) -> Self {
        Self {
            meta: EntityList::new(name),
            schema: ListSchema::new(),
            rows: Vec::new(),
        }
    }

    fn position(&self, id: &str) -> Option<usize> {
        self.rows.iter().position(|row| row.id == id)
    }

    /// Expand a sparse stored row to the list's full current schema,
    /// in schema order, defaulting missing properties to `""`.
    fn materialize(&self, row: &StoredEntity, index: usize) -> SavedEntity {
        let properties = self
            .schema
            .iter()
            .map(|name| {
                let value = row.property(name).unwrap_or_default().to_string();
                (name.clone(), value)
            })
            .collect();

        SavedEntity {
            id: row.id.clone(),
            label: row.label.clone(),
            version: row.version,
            properties,
            state: row.state,
            trunk_version: row.trunk_version,
            branch_id: row.branch_id.clone(),
            index,
        }
    }
}

///
/// InMemoryEntities
///
/// Reference implementation of the repository contract. Each list sits
/// behind its own lock, so writes serialize per list while reads of the
/// same list run concurrently with each other. A poisoned lock yields its
/// inner state rather than panicking the caller.
///

#[derive(Default)]
pub struct InMemoryEntities {
    lists: RwLock<BTreeMap<String, Arc<RwLock<ListCell>>>>,
}

impl InMemoryEntities {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    fn cell(&self, list: &str) -> Option<Arc<RwLock<ListCell>>> {
        read(&self.lists).get(list).cloned()
    }

    fn cell_or_create(&self, list: &str) -> Arc<RwLock<ListCell>> {
        if let Some(cell) = self.cell(list) {
            return cell;
        }

        write(&self.lists)
            .entry(list.to_string())
            .or_insert_with(|| Arc::new(RwLock::new(ListCell::new(list))))
            .clone()
    }
}

impl EntitiesRepository for InMemoryEntities {
    fn get_lists(&self) -> Vec<EntityList> {
        read(&self.lists)
            .values()
            .map(|cell| read(cell).meta.clone())
            .collect()
    }

    fn get_list(&self, list: &str) -> Option<EntityList> {
        self.cell(list).map(|cell| read(&cell).meta.clone())
    }

    fn add_list(&self, list: &str) {
        self.cell_or_create(list);
    }

    fn update_list(&self, list: &str, hash: &str, needs_approval: bool) {
        let cell = self.cell_or_create(list);
        let mut cell = write(&cell);

        cell.meta.hash = Some(hash.to_string());
        cell.meta.needs_approval = needs_approval;
        cell.meta.last_updated = Some(Utc::now());
    }

    fn save(&self, list: &str, entities: &[Entity]) {
        let cell = self.cell_or_create(list);
        let mut cell = write(&cell);

        for entity in entities {
            for (name, _) in entity.properties() {
                if cell.schema.observe(name) {
                    debug!(list, property = name.as_str(), "schema extended");
                }
            }

            match cell.position(entity.id()) {
                Some(position) => {
                    let merged = merge_entities(&cell.rows[position], entity);
                    debug!(list, id = entity.id(), "merged entity update");
                    cell.rows[position] = merged;
                }
                None => {
                    debug!(list, id = entity.id(), "inserted entity");
                    cell.rows.push(StoredEntity::from_entity(entity));
                }
            }
        }
    }

    fn query(&self, list: &str, query: Option<&Query>) -> Result<Vec<SavedEntity>, QueryError> {
        let Some(cell) = self.cell(list) else {
            return Ok(Vec::new());
        };
        let cell = read(&cell);

        let mut results: Vec<SavedEntity> = match query {
            None => cell
                .rows
                .iter()
                .enumerate()
                .map(|(index, row)| cell.materialize(row, index))
                .collect(),
            Some(query) => {
                query.validate(list, &cell.schema)?;

                cell.rows
                    .iter()
                    .map(|row| cell.materialize(row, 0))
                    .filter(|row| query.matches(row))
                    .collect()
            }
        };

        // Indexes are positions within this result set, for this call only.
        for (index, row) in results.iter_mut().enumerate() {
            row.index = index;
        }

        Ok(results)
    }

    fn get_count(&self, list: &str) -> usize {
        self.cell(list).map_or(0, |cell| read(&cell).rows.len())
    }

    fn get_by_index(&self, list: &str, index: usize) -> Option<SavedEntity> {
        let cell = self.cell(list)?;
        let cell = read(&cell);

        cell.rows.get(index).map(|row| cell.materialize(row, index))
    }

    fn get_by_id(&self, list: &str, id: &str) -> Option<SavedEntity> {
        let cell = self.cell(list)?;
        let cell = read(&cell);

        cell.position(id)
            .map(|position| cell.materialize(&cell.rows[position], position))
    }

    fn delete(&self, list: &str, id: &str) {
        if let Some(cell) = self.cell(list) {
            write(&cell).rows.retain(|row| row.id != id);
        }
    }

    fn clear_list(&self, list: &str) {
        write(&self.lists).remove(list);
    }

    fn clear(&self) {
        write(&self.lists).clear();
    }
}

fn read<T>(lock: &RwLock<T>) -> RwLockReadGuard<'_, T> {
    lock.read().unwrap_or_else(PoisonError::into_inner)
}

fn write<T>(lock: &RwLock<T>) -> RwLockWriteGuard<'_, T> {
    lock.write().unwrap_or_else(PoisonError::into_inner)
}

///
/// TESTS
///
