//! Ordering
//!
//! Entries apply in list order: the first one is the primary sort key.

use serde::{Deserialize, Serialize};

fn ascending_by_default() -> bool {
    true
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OrderSpec {
    pub column: String,
    #[serde(default = "ascending_by_default")]
    pub ascending: bool,
}

impl OrderSpec {
    pub fn asc(column: &str) -> Self {
        Self {
            column: column.to_string(),
            ascending: true,
        }
    }

    pub fn desc(column: &str) -> Self {
        Self {
            column: column.to_string(),
            ascending: false,
        }
    }

    pub fn to_sql(&self) -> &'static str {
        if self.ascending {
            "ASC"
        } else {
            "DESC"
        }
    }
}
