mod memory;
mod merge;

pub use memory::InMemoryEntities;

use crate::{
    model::{Entity, EntityList, SavedEntity},
    query::{Query, QueryError},
};

///
/// EntitiesRepository
///
/// The storage contract: list management, CRUD, versioned merge-on-save,
/// and query execution. Every operation completes synchronously on the
/// caller's thread. Implementations must serialize writes per list (the
/// merge is a read-then-write sequence with no partial-result meaning),
/// and a single `query` call must assign indexes from one consistent
/// snapshot. An unknown list is an expected, normal state and reads as
/// empty, never as an error.
///

pub trait EntitiesRepository {
    /// All known lists, in name order.
    fn get_lists(&self) -> Vec<EntityList>;

    fn get_list(&self, list: &str) -> Option<EntityList>;

    /// Create an empty list. Idempotent: an existing list is untouched.
    fn add_list(&self, list: &str);

    /// Upsert list metadata and stamp `last_updated` with the current time.
    fn update_list(&self, list: &str, hash: &str, needs_approval: bool);

    /// Merge entities into the list, creating the list and extending its
    /// schema as a side effect. A second save for an existing id merges
    /// rather than duplicates.
    fn save(&self, list: &str, entities: &[Entity]);

    /// `None` returns every entity with a stable 0-based index; `Some`
    /// validates the predicate against the list's schema and filters,
    /// re-indexing the result set. A column unknown to the list fails with
    /// `QueryError` rather than matching nothing.
    fn query(&self, list: &str, query: Option<&Query>) -> Result<Vec<SavedEntity>, QueryError>;

    /// Row count without materializing the list.
    fn get_count(&self, list: &str) -> usize;

    /// Single row by its position in the default (unfiltered) order.
    fn get_by_index(&self, list: &str, index: usize) -> Option<SavedEntity>;

    /// Single row by id, without index assignment.
    fn get_by_id(&self, list: &str, id: &str) -> Option<SavedEntity>;

    fn delete(&self, list: &str, id: &str);

    /// Remove one list: entities, schema, and metadata.
    fn clear_list(&self, list: &str);

    /// Remove every list.
    fn clear(&self);
}
