//! SQLite implementation of the store seam
//!
//! Each `bulk_insert` runs in one transaction. Multi-row INSERT statements
//! are chunked so a statement never binds more than SQLite's variable limit.

use super::{Row, Store, StoreError, TableSpec, Value};
use async_trait::async_trait;
use sqlx::{QueryBuilder, Row as _, Sqlite, SqlitePool};
use tracing::debug;

/// SQLITE_MAX_VARIABLE_NUMBER of current SQLite builds
const MAX_BIND_PARAMETERS: usize = 32_766;

/// Error texts that mean "the batch was too big", lowercase
const OVERFLOW_MARKERS: &[&str] = &["too many sql variables", "too big", "out of memory"];

pub struct SqliteStore {
    pool: SqlitePool,
    max_batch_rows: usize,
}

impl SqliteStore {
    /// `max_batch_rows` is the largest batch accepted before reporting overflow
    pub fn new(pool: SqlitePool, max_batch_rows: usize) -> Self {
        Self {
            pool,
            max_batch_rows: max_batch_rows.max(1),
        }
    }

    pub fn pool(&self) -> &SqlitePool {
        &self.pool
    }
}

#[async_trait]
impl Store for SqliteStore {
    async fn bulk_insert(&self, table: &TableSpec, rows: &[Row]) -> Result<(), StoreError> {
        if rows.is_empty() {
            return Ok(());
        }

        if rows.len() > self.max_batch_rows {
            return Err(StoreError::Overflow {
                rows: rows.len(),
                reason: format!("more than {} rows per batch", self.max_batch_rows),
            });
        }

        if let Some(row) = rows.iter().find(|row| row.len() != table.width()) {
            return Err(StoreError::Backend(format!(
                "{} row has {} values, expected {}",
                table.name,
                row.len(),
                table.width()
            )));
        }

        let insert = format!("INSERT INTO {} ({}) ", table.name, table.columns.join(", "));
        let chunk_rows = (MAX_BIND_PARAMETERS / table.width()).max(1);

        let mut tx = self
            .pool
            .begin()
            .await
            .map_err(|e| classify(rows.len(), e))?;

        for chunk in rows.chunks(chunk_rows) {
            let mut builder: QueryBuilder<'_, Sqlite> = QueryBuilder::new(insert.as_str());
            builder.push_values(chunk, |mut b, row| {
                for value in row {
                    match value {
                        Value::Int(v) => {
                            b.push_bind(*v);
                        }
                        Value::Text(v) => {
                            b.push_bind(v.as_str());
                        }
                        Value::Null => {
                            b.push_bind(None::<i64>);
                        }
                    }
                }
            });

            builder
                .build()
                .execute(&mut *tx)
                .await
                .map_err(|e| classify(rows.len(), e))?;
        }

        tx.commit().await.map_err(|e| classify(rows.len(), e))?;

        debug!(table = table.name, rows = rows.len(), "Batch committed");
        Ok(())
    }

    async fn read_rows(&self, table: &TableSpec) -> Result<Vec<Row>, StoreError> {
        let sql = format!(
            "SELECT {} FROM {} ORDER BY rowid",
            table.columns.join(", "),
            table.name
        );

        let stored = sqlx::query(&sql)
            .fetch_all(&self.pool)
            .await
            .map_err(|e| StoreError::Backend(e.to_string()))?;

        let rows = stored
            .iter()
            .map(|row| {
                (0..table.width())
                    .map(|index| match row.try_get::<Option<i64>, _>(index) {
                        Ok(Some(value)) => Value::Int(value),
                        Ok(None) => Value::Null,
                        Err(_) => row
                            .try_get::<Option<String>, _>(index)
                            .ok()
                            .flatten()
                            .map_or(Value::Null, Value::Text),
                    })
                    .collect()
            })
            .collect();

        Ok(rows)
    }
}

/// Map a driver error to overflow (retry smaller) or backend (give up)
fn classify(rows: usize, err: sqlx::Error) -> StoreError {
    let reason = err.to_string();
    let lower = reason.to_lowercase();
    if OVERFLOW_MARKERS.iter().any(|marker| lower.contains(marker)) {
        StoreError::Overflow { rows, reason }
    } else {
        StoreError::Backend(reason)
    }
}
