//! Local entity store for an offline-first data-collection tool: named,
//! versioned records merged conflict-tolerantly across writers, a small
//! relational query language, and the adapters that expose stored records
//! to a form-expression evaluator.
#![warn(unreachable_pub)]

// public exports are one module level down
pub mod adapter;
pub mod extract;
pub mod model;
pub mod pull;
pub mod pushdown;
pub mod query;
pub mod store;
pub mod tree;

///
/// Prelude
///
/// Prelude contains only domain vocabulary.
/// No errors, adapters, stores, or helpers are re-exported here.
///

pub mod prelude {
    pub use crate::{
        model::{Entity, EntityAction, EntityList, EntityState, FormEntity, NewEntity, SavedEntity},
        query::Query,
        tree::TreeElement,
    };
}
