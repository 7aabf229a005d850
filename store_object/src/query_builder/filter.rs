//! Filter clauses
//!
//! `OperatorKind` is closed: a typed `FilterClause` can only carry a known
//! operator. Operators arriving as strings go through `RawFilterClause`,
//! where unknown ones are either dropped or rejected.

use crate::errors::QueryError;
use config::UnknownOperatorPolicy;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::fmt;
use std::str::FromStr;

/// Query condition operators
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OperatorKind {
    Eq,    // =
    Neq,   // <>
    Gt,    // >
    Gte,   // >=
    Lt,    // <
    Lte,   // <=
    Like,  // LIKE
    Ilike, // ILIKE (case insensitive)
    In,    // IN
    Is,    // IS NULL / TRUE / FALSE
}

impl OperatorKind {
    pub const ALL: [OperatorKind; 10] = [
        OperatorKind::Eq,
        OperatorKind::Neq,
        OperatorKind::Gt,
        OperatorKind::Gte,
        OperatorKind::Lt,
        OperatorKind::Lte,
        OperatorKind::Like,
        OperatorKind::Ilike,
        OperatorKind::In,
        OperatorKind::Is,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            OperatorKind::Eq => "eq",
            OperatorKind::Neq => "neq",
            OperatorKind::Gt => "gt",
            OperatorKind::Gte => "gte",
            OperatorKind::Lt => "lt",
            OperatorKind::Lte => "lte",
            OperatorKind::Like => "like",
            OperatorKind::Ilike => "ilike",
            OperatorKind::In => "in",
            OperatorKind::Is => "is",
        }
    }
}

impl fmt::Display for OperatorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Returned when a string does not name an `OperatorKind`
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UnknownOperator(pub String);

impl FromStr for OperatorKind {
    type Err = UnknownOperator;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        OperatorKind::ALL
            .into_iter()
            .find(|op| op.as_str() == s)
            .ok_or_else(|| UnknownOperator(s.to_string()))
    }
}

/// Single condition; clauses in a query are combined with AND
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FilterClause {
    pub column: String,
    pub operator: OperatorKind,
    #[serde(default)]
    pub value: Value,
}

impl FilterClause {
    pub fn new(column: &str, operator: OperatorKind, value: Value) -> Self {
        Self {
            column: column.to_string(),
            operator,
            value,
        }
    }

    pub fn eq(column: &str, value: Value) -> Self {
        Self::new(column, OperatorKind::Eq, value)
    }

    pub fn neq(column: &str, value: Value) -> Self {
        Self::new(column, OperatorKind::Neq, value)
    }

    pub fn gt(column: &str, value: Value) -> Self {
        Self::new(column, OperatorKind::Gt, value)
    }

    pub fn gte(column: &str, value: Value) -> Self {
        Self::new(column, OperatorKind::Gte, value)
    }

    pub fn lt(column: &str, value: Value) -> Self {
        Self::new(column, OperatorKind::Lt, value)
    }

    pub fn lte(column: &str, value: Value) -> Self {
        Self::new(column, OperatorKind::Lte, value)
    }

    pub fn like(column: &str, pattern: &str) -> Self {
        Self::new(column, OperatorKind::Like, Value::String(pattern.to_string()))
    }

    pub fn ilike(column: &str, pattern: &str) -> Self {
        Self::new(column, OperatorKind::Ilike, Value::String(pattern.to_string()))
    }

    pub fn in_values(column: &str, values: Vec<Value>) -> Self {
        Self::new(column, OperatorKind::In, Value::Array(values))
    }

    pub fn is_null(column: &str) -> Self {
        Self::new(column, OperatorKind::Is, Value::Null)
    }
}

/// A filter as received from outside, with the operator still a string
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RawFilterClause {
    pub column: String,
    pub operator: String,
    #[serde(default)]
    pub value: Value,
}

impl RawFilterClause {
    pub fn new(column: &str, operator: &str, value: Value) -> Self {
        Self {
            column: column.to_string(),
            operator: operator.to_string(),
            value,
        }
    }

    /// Convert to a typed clause. `Ok(None)` means the clause was dropped.
    pub fn resolve(self, policy: UnknownOperatorPolicy) -> Result<Option<FilterClause>, QueryError> {
        match self.operator.parse::<OperatorKind>() {
            Ok(operator) => Ok(Some(FilterClause {
                column: self.column,
                operator,
                value: self.value,
            })),
            Err(UnknownOperator(operator)) => match policy {
                UnknownOperatorPolicy::Drop => {
                    tracing::warn!(
                        column = %self.column,
                        operator = %operator,
                        "dropping filter with unknown operator"
                    );
                    Ok(None)
                }
                UnknownOperatorPolicy::Reject => Err(QueryError::UnknownOperator {
                    column: self.column,
                    operator,
                }),
            },
        }
    }
}
