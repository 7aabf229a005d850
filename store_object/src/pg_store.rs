//! Postgres implementation of `BackingStore`

use crate::errors::StoreError;
use crate::query_builder::sql_generation::{SqlGenerator, SqlStatement};
use crate::traits::backing_store::{BackingStore, CountRequest, Row, SelectRequest};
use crate::DbPool;
use async_trait::async_trait;
use sqlx::Row as _;

// Macro for the shared parameter binding logic
macro_rules! bind_json_param {
    ($query:expr, $param:expr) => {
        match $param {
            serde_json::Value::String(s) => {
                // Try to parse as RFC3339 timestamp first
                if let Ok(dt) = chrono::DateTime::parse_from_rfc3339(&s) {
                    $query.bind(dt.with_timezone(&chrono::Utc))
                // Try to parse as UUID
                } else if let Ok(uuid) = uuid::Uuid::parse_str(&s) {
                    $query.bind(uuid)
                } else {
                    $query.bind(s)
                }
            }
            serde_json::Value::Number(n) => {
                if let Some(i) = n.as_i64() {
                    if i >= i32::MIN as i64 && i <= i32::MAX as i64 {
                        $query.bind(i as i32)
                    } else {
                        $query.bind(i)
                    }
                } else if let Some(f) = n.as_f64() {
                    $query.bind(f)
                } else {
                    $query.bind(n.to_string())
                }
            }
            serde_json::Value::Bool(b) => $query.bind(b),
            serde_json::Value::Null => $query.bind(Option::<String>::None),
            other => $query.bind(sqlx::types::Json(other)),
        }
    };
}

type PgQuery<'q> = sqlx::query::Query<'q, sqlx::Postgres, sqlx::postgres::PgArguments>;

fn bind_params(statement: &SqlStatement) -> PgQuery<'_> {
    let mut query = sqlx::query(&statement.sql);
    for param in statement.params.iter().cloned() {
        query = bind_json_param!(query, param);
    }
    query
}

/// Reads rows through a Postgres pool; each row comes back as one JSON object
#[derive(Clone)]
pub struct PgStore {
    pool: DbPool,
}

impl std::fmt::Debug for PgStore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PgStore")
            .field("pool_size", &self.pool.size())
            .field("idle", &self.pool.num_idle())
            .finish()
    }
}

impl PgStore {
    pub fn new(pool: DbPool) -> Self {
        Self { pool }
    }

    pub fn pool(&self) -> &DbPool {
        &self.pool
    }
}

#[async_trait]
impl BackingStore for PgStore {
    async fn select(&self, request: &SelectRequest) -> Result<Vec<Row>, StoreError> {
        let statement = SqlGenerator::select(request)?;
        cache_system::debug_log!("[SELECT] Table: {}", request.table);
        cache_system::debug_log!("[SELECT] SQL: {}", statement.sql);
        cache_system::debug_log!("[SELECT] params count: {}", statement.params.len());

        let rows = bind_params(&statement)
            .fetch_all(&self.pool)
            .await
            .map_err(|e| StoreError::database_operation(&request.table, "select", e))?;

        rows.iter()
            .map(|row| {
                row.try_get::<sqlx::types::Json<Row>, _>(0)
                    .map(|json| json.0)
                    .map_err(|e| StoreError::database_operation(&request.table, "select", e))
            })
            .collect()
    }

    async fn count(&self, request: &CountRequest) -> Result<u64, StoreError> {
        let statement = SqlGenerator::count(request)?;
        cache_system::debug_log!("[COUNT] Table: {} SQL: {}", request.table, statement.sql);

        let row = bind_params(&statement)
            .fetch_one(&self.pool)
            .await
            .map_err(|e| StoreError::database_operation(&request.table, "count", e))?;

        let total: i64 = row
            .try_get(0)
            .map_err(|e| StoreError::database_operation(&request.table, "count", e))?;
        Ok(total.max(0) as u64)
    }
}
