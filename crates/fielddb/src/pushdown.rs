use crate::{
    adapter::InstanceAdapter,
    query::Query,
    store::EntitiesRepository,
    tree::TreeElement,
};
use derive_more::{Deref, DerefMut};
use serde::{Deserialize, Serialize};
use std::{collections::HashSet, sync::Arc};
use tracing::debug;

///
/// Literal
///
/// Comparison literal as the evaluator hands it over: already split into
/// text and numeric shapes by the evaluator's own typing.
///

#[derive(Clone, Debug, Deserialize, PartialEq, Serialize)]
pub enum Literal {
    Text(String),
    Number(f64),
}

///
/// FilterExpr
///
/// The evaluator-boundary predicate shape. `Unsupported` stands for any
/// expression the evaluator could not describe in these terms; its
/// presence anywhere in the tree makes the whole expression
/// untranslatable, forcing the generic path.
///

#[derive(Clone, Debug, Deserialize, PartialEq, Serialize)]
pub enum FilterExpr {
    Eq { column: String, literal: Literal },
    NotEq { column: String, literal: Literal },
    And(Box<Self>, Box<Self>),
    Or(Box<Self>, Box<Self>),
    Unsupported,
}

impl FilterExpr {
    #[must_use]
    pub fn eq(column: impl Into<String>, literal: Literal) -> Self {
        Self::Eq {
            column: column.into(),
            literal,
        }
    }

    #[must_use]
    pub fn not_eq(column: impl Into<String>, literal: Literal) -> Self {
        Self::NotEq {
            column: column.into(),
            literal,
        }
    }

    #[must_use]
    pub fn and(left: Self, right: Self) -> Self {
        Self::And(Box::new(left), Box::new(right))
    }

    #[must_use]
    pub fn or(left: Self, right: Self) -> Self {
        Self::Or(Box::new(left), Box::new(right))
    }
}

///
/// InstanceRegistry
///
/// Explicit record of which instance ids are backed by the entity store.
/// Passed into the strategy at construction; nothing ambient decides
/// whether pushdown applies.
///

#[derive(Clone, Debug, Default, Deref, DerefMut)]
pub struct InstanceRegistry(HashSet<String>);

impl InstanceRegistry {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    pub fn register(&mut self, instance_id: impl Into<String>) {
        self.0.insert(instance_id.into());
    }
}

///
/// PushdownFilter
///
/// Intercepts the evaluator's generic "filter this node-set by this
/// predicate" call. Anything it cannot handle (an unregistered instance,
/// an untranslatable expression, a column the store does not know)
/// delegates to the fallback continuation; the two paths agree on results
/// and differ only in cost.
///

pub struct PushdownFilter<R> {
    adapter: InstanceAdapter<R>,
    registry: InstanceRegistry,
    aliases: Vec<(String, String)>,
}

impl<R: EntitiesRepository> PushdownFilter<R> {
    #[must_use]
    pub fn new(repo: Arc<R>, registry: InstanceRegistry) -> Self {
        Self {
            adapter: InstanceAdapter::new(repo),
            registry,
            aliases: Vec::new(),
        }
    }

    /// Column aliases for deployments where the evaluator publishes
    /// different names than storage uses (evaluator name, storage name).
    #[must_use]
    pub fn with_aliases(mut self, aliases: Vec<(String, String)>) -> Self {
        self.aliases = aliases;
        self
    }

    pub fn filter<F>(&self, instance_id: &str, expr: &FilterExpr, fallback: F) -> Vec<TreeElement>
    where
        F: FnOnce() -> Vec<TreeElement>,
    {
        if !self.registry.contains(instance_id) {
            debug!(instance_id, "not an entity instance, using generic path");
            return fallback();
        }

        let Some(query) = expr_to_query(expr) else {
            debug!(instance_id, "expression not translatable, using generic path");
            return fallback();
        };

        let query = query.map_columns(&|column| {
            self.aliases
                .iter()
                .find(|(from, _)| from == column)
                .map(|(_, to)| to.clone())
        });

        match self.adapter.query(instance_id, &query) {
            Ok(items) => {
                debug!(instance_id, matched = items.len(), "pushdown answered filter");
                items
            }
            Err(err) => {
                debug!(instance_id, %err, "query rejected, using generic path");
                fallback()
            }
        }
    }
}

/// Translate a supported expression tree into a store query. `None` means
/// the shape cannot be pushed down.
pub(crate) fn expr_to_query(expr: &FilterExpr) -> Option<Query> {
    match expr {
        FilterExpr::Eq { column, literal } => Some(match literal {
            Literal::Text(value) => Query::string_eq(column, value),
            Literal::Number(value) => Query::numeric_eq(column, *value),
        }),
        FilterExpr::NotEq { column, literal } => Some(match literal {
            Literal::Text(value) => Query::string_not_eq(column, value),
            Literal::Number(value) => Query::numeric_not_eq(column, *value),
        }),
        FilterExpr::And(left, right) => {
            Some(Query::and(expr_to_query(left)?, expr_to_query(right)?))
        }
        FilterExpr::Or(left, right) => {
            Some(Query::or(expr_to_query(left)?, expr_to_query(right)?))
        }
        FilterExpr::Unsupported => None,
    }
}

///
/// TESTS
///
