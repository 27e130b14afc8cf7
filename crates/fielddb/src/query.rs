use crate::model::{ListSchema, SavedEntity};
use serde::{Deserialize, Serialize};
use std::ops::{BitAnd, BitOr};
use thiserror::Error as ThisError;

///
/// CONSTANTS
///

/// Reserved field names every list exposes alongside its schema properties.
pub const COLUMN_ID: &str = "id";
pub const COLUMN_LABEL: &str = "label";
pub const COLUMN_VERSION: &str = "version";

const RESERVED_COLUMNS: [&str; 3] = [COLUMN_ID, COLUMN_LABEL, COLUMN_VERSION];

///
/// QueryError
///
/// Recoverable, local failure: the query references a column the target
/// list has never seen. Callers that might pass an unsupported predicate
/// treat this as "cannot be satisfied here" and fall back, never as
/// "no rows".
///

#[derive(Clone, Debug, Eq, PartialEq, ThisError)]
pub enum QueryError {
    #[error("unknown column '{column}' for list '{list}'")]
    UnknownColumn { list: String, column: String },
}

///
/// Query
///
/// Closed predicate tree over one list's field values. Equality and
/// inequality only, string or numeric, composed with binary and/or. No
/// negation of compound expressions and no range operators: this mirrors
/// the narrow predicate shapes the evaluator can push down.
///

#[derive(Clone, Debug, Deserialize, PartialEq, Serialize)]
pub enum Query {
    StringEq { column: String, value: String },
    StringNotEq { column: String, value: String },
    NumericEq { column: String, value: f64 },
    NumericNotEq { column: String, value: f64 },
    And(Box<Self>, Box<Self>),
    Or(Box<Self>, Box<Self>),
}

impl Query {
    #[must_use]
    pub fn string_eq(column: impl Into<String>, value: impl Into<String>) -> Self {
        Self::StringEq {
            column: column.into(),
            value: value.into(),
        }
    }

    #[must_use]
    pub fn string_not_eq(column: impl Into<String>, value: impl Into<String>) -> Self {
        Self::StringNotEq {
            column: column.into(),
            value: value.into(),
        }
    }

    #[must_use]
    pub fn numeric_eq(column: impl Into<String>, value: f64) -> Self {
        Self::NumericEq {
            column: column.into(),
            value,
        }
    }

    #[must_use]
    pub fn numeric_not_eq(column: impl Into<String>, value: f64) -> Self {
        Self::NumericNotEq {
            column: column.into(),
            value,
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

    /// Rename column references sub-expression-wise. Columns the rename
    /// function declines (`None`) are left untouched, so partial alias
    /// tables compose.
    #[must_use]
    pub fn map_columns<F>(&self, rename: &F) -> Self
    where
        F: Fn(&str) -> Option<String>,
    {
        let renamed = |column: &str| rename(column).unwrap_or_else(|| column.to_string());

        match self {
            Self::StringEq { column, value } => Self::StringEq {
                column: renamed(column),
                value: value.clone(),
            },
            Self::StringNotEq { column, value } => Self::StringNotEq {
                column: renamed(column),
                value: value.clone(),
            },
            Self::NumericEq { column, value } => Self::NumericEq {
                column: renamed(column),
                value: *value,
            },
            Self::NumericNotEq { column, value } => Self::NumericNotEq {
                column: renamed(column),
                value: *value,
            },
            Self::And(left, right) => Self::And(
                Box::new(left.map_columns(rename)),
                Box::new(right.map_columns(rename)),
            ),
            Self::Or(left, right) => Self::Or(
                Box::new(left.map_columns(rename)),
                Box::new(right.map_columns(rename)),
            ),
        }
    }

    /// Check every referenced column against the reserved fields and the
    /// list's schema. Runs before evaluation; evaluation after a clean
    /// validation is infallible.
    pub fn validate(&self, list: &str, schema: &ListSchema) -> Result<(), QueryError> {
        match self {
            Self::StringEq { column, .. }
            | Self::StringNotEq { column, .. }
            | Self::NumericEq { column, .. }
            | Self::NumericNotEq { column, .. } => {
                if RESERVED_COLUMNS.contains(&column.as_str()) || schema.contains(column) {
                    Ok(())
                } else {
                    Err(QueryError::UnknownColumn {
                        list: list.to_string(),
                        column: column.clone(),
                    })
                }
            }
            Self::And(left, right) | Self::Or(left, right) => {
                left.validate(list, schema)?;
                right.validate(list, schema)
            }
        }
    }

    /// Evaluate against one materialized row. Numeric comparisons parse the
    /// stored string; an unparseable stored value is never numerically
    /// equal to anything.
    #[must_use]
    #[allow(clippy::float_cmp)]
    pub fn matches(&self, row: &SavedEntity) -> bool {
        match self {
            Self::StringEq { column, value } => {
                row.field(column).is_some_and(|stored| stored == *value)
            }
            Self::StringNotEq { column, value } => {
                row.field(column).is_some_and(|stored| stored != *value)
            }
            Self::NumericEq { column, value } => row
                .field(column)
                .and_then(|stored| stored.parse::<f64>().ok())
                .is_some_and(|stored| stored == *value),
            Self::NumericNotEq { column, value } => row.field(column).is_some_and(|stored| {
                stored
                    .parse::<f64>()
                    .ok()
                    .is_none_or(|parsed| parsed != *value)
            }),
            Self::And(left, right) => left.matches(row) && right.matches(row),
            Self::Or(left, right) => left.matches(row) || right.matches(row),
        }
    }
}

impl BitAnd for Query {
    type Output = Self;

    fn bitand(self, rhs: Self) -> Self::Output {
        Self::and(self, rhs)
    }
}

impl BitOr for Query {
    type Output = Self;

    fn bitor(self, rhs: Self) -> Self::Output {
        Self::or(self, rhs)
    }
}

///
/// TESTS
///
