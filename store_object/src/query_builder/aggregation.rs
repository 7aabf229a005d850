use serde::{Deserialize, Serialize};

/// Represents SQL aggregate functions
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum AggregateFunction {
    Count,
    Sum,
    Avg,
    Min,
    Max,
}

impl AggregateFunction {
    /// Projection order: count, sum, avg, min, max
    pub const ALL: [AggregateFunction; 5] = [
        AggregateFunction::Count,
        AggregateFunction::Sum,
        AggregateFunction::Avg,
        AggregateFunction::Min,
        AggregateFunction::Max,
    ];

    /// Name used in projection expressions
    pub fn name(&self) -> &'static str {
        match self {
            AggregateFunction::Count => "count",
            AggregateFunction::Sum => "sum",
            AggregateFunction::Avg => "avg",
            AggregateFunction::Min => "min",
            AggregateFunction::Max => "max",
        }
    }

    /// Convert aggregate function to SQL string
    pub fn to_sql(&self) -> &'static str {
        match self {
            AggregateFunction::Count => "COUNT",
            AggregateFunction::Sum => "SUM",
            AggregateFunction::Avg => "AVG",
            AggregateFunction::Min => "MIN",
            AggregateFunction::Max => "MAX",
        }
    }

    pub fn from_name(name: &str) -> Option<Self> {
        Self::ALL
            .into_iter()
            .find(|f| f.name().eq_ignore_ascii_case(name))
    }
}

/// Columns to aggregate per function; `"*"` under `count` counts rows
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct AggregationRequest {
    pub count: Vec<String>,
    pub sum: Vec<String>,
    pub avg: Vec<String>,
    pub min: Vec<String>,
    pub max: Vec<String>,
}

impl AggregationRequest {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn count(mut self, column: &str) -> Self {
        self.count.push(column.to_string());
        self
    }

    pub fn count_all(self) -> Self {
        self.count("*")
    }

    pub fn sum(mut self, column: &str) -> Self {
        self.sum.push(column.to_string());
        self
    }

    pub fn avg(mut self, column: &str) -> Self {
        self.avg.push(column.to_string());
        self
    }

    pub fn min(mut self, column: &str) -> Self {
        self.min.push(column.to_string());
        self
    }

    pub fn max(mut self, column: &str) -> Self {
        self.max.push(column.to_string());
        self
    }

    fn columns(&self, function: AggregateFunction) -> &[String] {
        match function {
            AggregateFunction::Count => &self.count,
            AggregateFunction::Sum => &self.sum,
            AggregateFunction::Avg => &self.avg,
            AggregateFunction::Min => &self.min,
            AggregateFunction::Max => &self.max,
        }
    }

    pub fn is_empty(&self) -> bool {
        AggregateFunction::ALL
            .iter()
            .all(|f| self.columns(*f).is_empty())
    }

    /// One expression per requested aggregate, grouped by function in
    /// count/sum/avg/min/max order, columns in the order given
    pub fn expressions(&self) -> Vec<String> {
        AggregateFunction::ALL
            .iter()
            .flat_map(|function| {
                self.columns(*function)
                    .iter()
                    .map(move |column| format!("{}({})", function.name(), column))
            })
            .collect()
    }

    /// All expressions joined into a single projection string
    pub fn to_projection(&self) -> String {
        self.expressions().join(", ")
    }
}
