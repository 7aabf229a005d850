//! SQL generation for the Postgres store
//!
//! Values always travel as `$n` parameters. Identifiers are validated before
//! they are interpolated. Join conditions are trusted SQL supplied by the
//! application, never by end users.

use crate::errors::StoreError;
use crate::query_builder::aggregation::AggregateFunction;
use crate::query_builder::filter::{FilterClause, OperatorKind};
use crate::query_builder::join::{JoinSpec, JoinType};
use crate::query_builder::ordering::OrderSpec;
use crate::query_builder::projection::{parse_projection, ProjectionItem};
use crate::traits::backing_store::{CountRequest, RowRange, SelectRequest};
use crate::validation::{ValidatedFieldName, ValidatedTableName};
use serde_json::Value;

/// SQL text with its positional parameters
#[derive(Debug, Clone, PartialEq)]
pub struct SqlStatement {
    pub sql: String,
    pub params: Vec<Value>,
}

pub struct SqlGenerator;

impl SqlGenerator {
    /// Each result row comes back as a single JSON object column
    pub fn select(request: &SelectRequest) -> Result<SqlStatement, StoreError> {
        let table = ValidatedTableName::new(&request.table)?;
        let mut params = Vec::new();
        let mut join_conditions = Vec::new();

        let projection = Self::build_projection(
            &table,
            &request.projection,
            &request.joins,
            &mut join_conditions,
        )?;
        let where_clause = Self::build_where_clause(&request.filters, join_conditions, &mut params)?;
        let order_clause = Self::build_order_clause(&request.order_by)?;
        let limit_clause = Self::build_limit_clause(request.range);

        let mut inner = format!("SELECT {} FROM {}", projection, table);
        for clause in [where_clause, order_clause, limit_clause] {
            if !clause.is_empty() {
                inner.push(' ');
                inner.push_str(&clause);
            }
        }

        Ok(SqlStatement {
            sql: format!("SELECT row_to_json(t) FROM ({}) t", inner),
            params,
        })
    }

    pub fn count(request: &CountRequest) -> Result<SqlStatement, StoreError> {
        let table = ValidatedTableName::new(&request.table)?;
        let mut params = Vec::new();
        let where_clause = Self::build_where_clause(&request.filters, Vec::new(), &mut params)?;

        let mut sql = format!("SELECT COUNT(*) FROM {}", table);
        if !where_clause.is_empty() {
            sql.push(' ');
            sql.push_str(&where_clause);
        }

        Ok(SqlStatement { sql, params })
    }

    /// Render a projection string into a SELECT list
    pub fn build_projection(
        table: &ValidatedTableName,
        projection: &str,
        joins: &[JoinSpec],
        join_conditions: &mut Vec<String>,
    ) -> Result<String, StoreError> {
        let items = parse_projection(projection);
        if items.is_empty() {
            return Err(StoreError::UnsupportedProjection(
                "projection is empty".to_string(),
            ));
        }

        items
            .iter()
            .map(|item| match item {
                ProjectionItem::All => Ok(format!("{}.*", table)),
                ProjectionItem::Column(column) => {
                    Ok(ValidatedFieldName::new(column)?.into_string())
                }
                ProjectionItem::Aggregate { function, column } => {
                    Self::build_aggregate(*function, column.as_deref())
                }
                ProjectionItem::Embedded {
                    table: related,
                    projection,
                } => Self::build_embedded(related, projection, joins, join_conditions),
            })
            .collect::<Result<Vec<_>, _>>()
            .map(|parts| parts.join(", "))
    }

    /// `count(*)` is aliased `count`, everything else `<fn>_<column>`
    fn build_aggregate(function: AggregateFunction, column: Option<&str>) -> Result<String, StoreError> {
        match column {
            None if function == AggregateFunction::Count => Ok("COUNT(*) AS count".to_string()),
            None => Err(StoreError::UnsupportedProjection(format!(
                "{}(*)",
                function.name()
            ))),
            Some(column) => {
                let column = ValidatedFieldName::new(column)?;
                Ok(format!(
                    "{}({}) AS {}_{}",
                    function.to_sql(),
                    column,
                    function.name(),
                    column.as_str().replace('.', "_")
                ))
            }
        }
    }

    /// Correlated sub-select returning the related rows as a JSON array
    fn build_embedded(
        related: &str,
        projection: &str,
        joins: &[JoinSpec],
        join_conditions: &mut Vec<String>,
    ) -> Result<String, StoreError> {
        let join = joins
            .iter()
            .find(|join| join.related_table == related)
            .ok_or_else(|| {
                StoreError::UnsupportedProjection(format!(
                    "no join description for embedded resource '{}'",
                    related
                ))
            })?;
        let related = ValidatedTableName::new(related)?;

        let columns = parse_projection(projection)
            .iter()
            .map(|item| match item {
                ProjectionItem::All => Ok("*".to_string()),
                ProjectionItem::Column(column) => {
                    Ok(ValidatedFieldName::new(column)?.into_string())
                }
                other => Err(StoreError::UnsupportedProjection(format!(
                    "{:?} inside embedded resource '{}'",
                    other, related
                ))),
            })
            .collect::<Result<Vec<_>, _>>()?;
        let columns = if columns.is_empty() {
            "*".to_string()
        } else {
            columns.join(", ")
        };

        match join.join_type {
            JoinType::Left => {}
            JoinType::Inner => join_conditions.push(format!(
                "EXISTS (SELECT 1 FROM {} WHERE {})",
                related, join.on_condition
            )),
            JoinType::Right => {
                return Err(StoreError::UnsupportedProjection(format!(
                    "right join on embedded resource '{}'",
                    related
                )))
            }
        }

        Ok(format!(
            "(SELECT COALESCE(json_agg(j), '[]'::json) FROM (SELECT {} FROM {} WHERE {}) j) AS {}",
            columns, related, join.on_condition, related
        ))
    }

    /// Build WHERE clause from filters plus any extra raw conditions
    pub fn build_where_clause(
        filters: &[FilterClause],
        extra_conditions: Vec<String>,
        params: &mut Vec<Value>,
    ) -> Result<String, StoreError> {
        let mut conditions = filters
            .iter()
            .map(|filter| Self::build_condition_sql(filter, params))
            .collect::<Result<Vec<_>, _>>()?;
        conditions.extend(extra_conditions);

        if conditions.is_empty() {
            Ok(String::new())
        } else {
            Ok(format!("WHERE {}", conditions.join(" AND ")))
        }
    }

    fn push_param(params: &mut Vec<Value>, value: &Value) -> String {
        params.push(value.clone());
        format!("${}", params.len())
    }

    fn build_condition_sql(filter: &FilterClause, params: &mut Vec<Value>) -> Result<String, StoreError> {
        let field = ValidatedFieldName::new(&filter.column)?;
        let invalid = |reason: &str| StoreError::InvalidFilter {
            column: filter.column.clone(),
            reason: reason.to_string(),
        };

        let sql = match (filter.operator, &filter.value) {
            (OperatorKind::Eq, Value::Null) => format!("{} IS NULL", field),
            (OperatorKind::Neq, Value::Null) => format!("{} IS NOT NULL", field),
            (OperatorKind::Eq, value) => format!("{} = {}", field, Self::push_param(params, value)),
            (OperatorKind::Neq, value) => {
                format!("{} <> {}", field, Self::push_param(params, value))
            }
            (
                OperatorKind::Gt | OperatorKind::Gte | OperatorKind::Lt | OperatorKind::Lte,
                Value::Null,
            ) => return Err(invalid("cannot compare against null")),
            (OperatorKind::Gt, value) => format!("{} > {}", field, Self::push_param(params, value)),
            (OperatorKind::Gte, value) => {
                format!("{} >= {}", field, Self::push_param(params, value))
            }
            (OperatorKind::Lt, value) => format!("{} < {}", field, Self::push_param(params, value)),
            (OperatorKind::Lte, value) => {
                format!("{} <= {}", field, Self::push_param(params, value))
            }
            (OperatorKind::Like, value @ Value::String(_)) => {
                format!("{} LIKE {}", field, Self::push_param(params, value))
            }
            (OperatorKind::Ilike, value @ Value::String(_)) => {
                format!("{} ILIKE {}", field, Self::push_param(params, value))
            }
            (OperatorKind::Like | OperatorKind::Ilike, _) => {
                return Err(invalid("pattern must be a string"))
            }
            // IN () is invalid SQL
            (OperatorKind::In, Value::Array(values)) if values.is_empty() => "FALSE".to_string(),
            (OperatorKind::In, Value::Array(values)) => {
                let placeholders: Vec<String> = values
                    .iter()
                    .map(|value| Self::push_param(params, value))
                    .collect();
                format!("{} IN ({})", field, placeholders.join(", "))
            }
            (OperatorKind::In, _) => return Err(invalid("value must be an array")),
            (OperatorKind::Is, value) => {
                let keyword = match value {
                    Value::Null => "NULL",
                    Value::Bool(true) => "TRUE",
                    Value::Bool(false) => "FALSE",
                    Value::String(s) => match s.to_ascii_lowercase().as_str() {
                        "null" => "NULL",
                        "true" => "TRUE",
                        "false" => "FALSE",
                        "unknown" => "UNKNOWN",
                        _ => return Err(invalid("is expects null, true, false or unknown")),
                    },
                    _ => return Err(invalid("is expects null, true, false or unknown")),
                };
                format!("{} IS {}", field, keyword)
            }
        };

        Ok(sql)
    }

    /// Build ORDER BY clause
    pub fn build_order_clause(order_by: &[OrderSpec]) -> Result<String, StoreError> {
        if order_by.is_empty() {
            return Ok(String::new());
        }

        let parts = order_by
            .iter()
            .map(|order| {
                let field = ValidatedFieldName::new(&order.column)?;
                Ok(format!("{} {}", field, order.to_sql()))
            })
            .collect::<Result<Vec<_>, StoreError>>()?;

        Ok(format!("ORDER BY {}", parts.join(", ")))
    }

    /// Build LIMIT/OFFSET clause
    pub fn build_limit_clause(range: Option<RowRange>) -> String {
        match range {
            Some(range) if range.offset() > 0 => {
                format!("LIMIT {} OFFSET {}", range.limit(), range.offset())
            }
            Some(range) => format!("LIMIT {}", range.limit()),
            None => String::new(),
        }
    }
}
