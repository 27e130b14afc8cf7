use crate::{query::Query, store::EntitiesRepository};
use std::sync::Arc;
use tracing::debug;

/// Handler consulted when the entity store does not recognize the list,
/// so this function composes with other expression-function providers.
/// Arguments mirror `pull`: list, property, filter property, filter value.
pub type PullFallback = Box<dyn Fn(&str, &str, &str, &str) -> String + Send + Sync>;

///
/// PullData
///
/// Single-value lookup callable from form expressions: find the first
/// entity whose filter property equals the filter value, and return one
/// property of it. Every failure path (unknown list without a fallback,
/// unknown column, no match, unknown property) collapses to `""`.
///

pub struct PullData<R> {
    repo: Arc<R>,
    fallback: Option<PullFallback>,
}

impl<R: EntitiesRepository> PullData<R> {
    #[must_use]
    pub const fn new(repo: Arc<R>) -> Self {
        Self {
            repo,
            fallback: None,
        }
    }

    #[must_use]
    pub fn with_fallback(mut self, fallback: PullFallback) -> Self {
        self.fallback = Some(fallback);
        self
    }

    #[must_use]
    pub fn pull(
        &self,
        list: &str,
        property: &str,
        filter_property: &str,
        filter_value: &str,
    ) -> String {
        if self.repo.get_list(list).is_none() {
            return self.fallback.as_ref().map_or_else(String::new, |handler| {
                debug!(list, "list unknown to the entity store, delegating");
                handler(list, property, filter_property, filter_value)
            });
        }

        let query = Query::string_eq(filter_property, filter_value);
        match self.repo.query(list, Some(&query)) {
            Ok(rows) => rows
                .first()
                .and_then(|row| row.field(property))
                .unwrap_or_default(),
            Err(err) => {
                debug!(list, %err, "pull query failed");
                String::new()
            }
        }
    }
}

///
/// TESTS
///

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{model::NewEntity, store::InMemoryEntities};

    fn seeded_repo() -> Arc<InMemoryEntities> {
        let repo = Arc::new(InMemoryEntities::new());
        repo.save(
            "people",
            &[
                NewEntity::new("abc", Some("Shiv".to_string()))
                    .with_property("age", "35")
                    .into(),
                NewEntity::new("def", Some("Kate".to_string()))
                    .with_property("age", "35")
                    .into(),
            ],
        );
        repo
    }

    #[test]
    fn returns_the_property_of_the_matching_entity() {
        let pull = PullData::new(seeded_repo());

        assert_eq!(pull.pull("people", "label", "id", "abc"), "Shiv");
        assert_eq!(pull.pull("people", "age", "label", "Kate"), "35");
    }

    #[test]
    fn no_match_returns_the_empty_string() {
        let pull = PullData::new(seeded_repo());

        assert_eq!(pull.pull("people", "label", "id", "zzz"), "");
    }

    #[test]
    fn first_match_in_query_order_wins() {
        let pull = PullData::new(seeded_repo());

        assert_eq!(pull.pull("people", "label", "age", "35"), "Shiv");
    }

    #[test]
    fn unknown_column_and_unknown_property_return_the_empty_string() {
        let pull = PullData::new(seeded_repo());

        assert_eq!(pull.pull("people", "label", "height", "180"), "");
        assert_eq!(pull.pull("people", "height", "id", "abc"), "");
    }

    #[test]
    fn unknown_list_without_a_fallback_returns_the_empty_string() {
        let pull = PullData::new(seeded_repo());

        assert_eq!(pull.pull("trees", "label", "id", "abc"), "");
    }

    #[test]
    fn unknown_list_delegates_to_the_fallback() {
        let pull = PullData::new(seeded_repo()).with_fallback(Box::new(
            |list, property, filter_property, filter_value| {
                format!("{list}/{property}/{filter_property}/{filter_value}")
            },
        ));

        assert_eq!(pull.pull("trees", "label", "id", "abc"), "trees/label/id/abc");
        // A known list never reaches the fallback.
        assert_eq!(pull.pull("people", "label", "id", "abc"), "Shiv");
    }
}
