use crate::{adapter::entity_element, store::EntitiesRepository, tree::TreeElement};
use std::sync::Arc;
use tracing::trace;

///
/// PartialRows
///
/// A finite, restartable sequence of instance elements where only element
/// 0 is materialized up front. Consumers learn the list's size and shape
/// without paying for every row; rows past 0 are fetched one at a time as
/// a `RowIter` advances. The row count is snapshotted at construction, so
/// one sequence exposes one consistent length.
///

pub struct PartialRows<R> {
    repo: Arc<R>,
    list: String,
    count: usize,
    first: Option<TreeElement>,
}

impl<R: EntitiesRepository> PartialRows<R> {
    pub(crate) fn new(repo: Arc<R>, list: &str) -> Self {
        let count = repo.get_count(list);
        let first = repo.get_by_index(list, 0).map(|row| entity_element(&row));

        Self {
            repo,
            list: list.to_string(),
            count,
            first,
        }
    }

    #[must_use]
    pub const fn len(&self) -> usize {
        self.count
    }

    #[must_use]
    pub const fn is_empty(&self) -> bool {
        self.count == 0
    }

    /// The eagerly materialized element 0.
    #[must_use]
    pub const fn first(&self) -> Option<&TreeElement> {
        self.first.as_ref()
    }

    /// Materialize a single position on demand.
    #[must_use]
    pub fn get(&self, index: usize) -> Option<TreeElement> {
        if index >= self.count {
            return None;
        }
        if index == 0 {
            return self.first.clone();
        }

        trace!(list = self.list.as_str(), index, "lazy row fetch");
        self.repo
            .get_by_index(&self.list, index)
            .map(|row| entity_element(&row))
    }

    /// Restartable iteration: each call walks the sequence from element 0.
    #[must_use]
    pub const fn iter(&self) -> RowIter<'_, R> {
        RowIter {
            rows: self,
            next: 0,
        }
    }
}

impl<'a, R: EntitiesRepository> IntoIterator for &'a PartialRows<R> {
    type Item = TreeElement;
    type IntoIter = RowIter<'a, R>;

    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}

///
/// RowIter
///

pub struct RowIter<'a, R> {
    rows: &'a PartialRows<R>,
    next: usize,
}

impl<R: EntitiesRepository> Iterator for RowIter<'_, R> {
    type Item = TreeElement;

    fn next(&mut self) -> Option<Self::Item> {
        let element = self.rows.get(self.next)?;
        self.next += 1;

        Some(element)
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        let remaining = self.rows.count.saturating_sub(self.next);
        (0, Some(remaining))
    }
}

///
/// TESTS
///
