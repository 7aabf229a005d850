//! Join descriptors and the projection they compose into
//!
//! This layer only builds the projection; how a related table is actually
//! joined is up to the backing store.

use serde::{Deserialize, Serialize};

/// Represents the type of join requested for a related table
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum JoinType {
    /// Only base rows with at least one related row
    Inner,
    /// Every base row, related rows where present
    #[default]
    Left,
    Right,
}

/// A related table to embed in each base row
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct JoinSpec {
    pub related_table: String,
    /// Raw SQL condition linking the related table to the base table
    pub on_condition: String,
    #[serde(default)]
    pub join_type: JoinType,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub projection: Option<String>,
}

impl JoinSpec {
    pub fn new(related_table: impl Into<String>, on_condition: impl Into<String>) -> Self {
        Self {
            related_table: related_table.into(),
            on_condition: on_condition.into(),
            join_type: JoinType::default(),
            projection: None,
        }
    }

    pub fn with_join_type(mut self, join_type: JoinType) -> Self {
        self.join_type = join_type;
        self
    }

    pub fn with_projection(mut self, projection: impl Into<String>) -> Self {
        self.projection = Some(projection.into());
        self
    }

    /// `related(cols)`, `related(*)` without an explicit projection
    pub fn embedded_projection(&self) -> String {
        format!(
            "{}({})",
            self.related_table,
            self.projection.as_deref().unwrap_or("*")
        )
    }
}

/// `*` for the base table followed by one embedded resource per join
pub fn compose_join_projection(joins: &[JoinSpec]) -> String {
    std::iter::once("*".to_string())
        .chain(joins.iter().map(JoinSpec::embedded_projection))
        .collect::<Vec<_>>()
        .join(", ")
}
