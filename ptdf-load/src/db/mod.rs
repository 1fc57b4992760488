//! Destination store seam
//!
//! Everything the loader writes goes through [`Store::bulk_insert`]. A store
//! either accepts a whole batch or rejects it; a rejection is reported as
//! [`StoreError::Overflow`] when splitting the batch may help and as
//! [`StoreError::Backend`] otherwise.

pub mod memory_store;
pub mod sqlite_store;
pub mod tables;

pub use memory_store::MemoryStore;
pub use sqlite_store::SqliteStore;
pub use tables::TableSpec;

use async_trait::async_trait;
use thiserror::Error;

/// Single column value
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Value {
    Int(i64),
    Text(String),
    Null,
}

impl Value {
    pub fn as_int(&self) -> Option<i64> {
        match self {
            Value::Int(value) => Some(*value),
            _ => None,
        }
    }

    pub fn as_text(&self) -> Option<&str> {
        match self {
            Value::Text(value) => Some(value),
            _ => None,
        }
    }

    pub fn is_null(&self) -> bool {
        matches!(self, Value::Null)
    }
}

impl From<i64> for Value {
    fn from(value: i64) -> Self {
        Value::Int(value)
    }
}

impl From<String> for Value {
    fn from(value: String) -> Self {
        Value::Text(value)
    }
}

impl From<&str> for Value {
    fn from(value: &str) -> Self {
        Value::Text(value.to_string())
    }
}

impl<T: Into<Value>> From<Option<T>> for Value {
    fn from(value: Option<T>) -> Self {
        value.map_or(Value::Null, Into::into)
    }
}

/// Row in table column order
pub type Row = Vec<Value>;

/// Bulk insert failure
#[derive(Debug, Clone, Error)]
pub enum StoreError {
    /// Batch too large for the store; retry in smaller pieces
    #[error("batch of {rows} rows rejected: {reason}")]
    Overflow { rows: usize, reason: String },

    /// Any other store failure
    #[error("store error: {0}")]
    Backend(String),
}

impl StoreError {
    pub fn is_overflow(&self) -> bool {
        matches!(self, StoreError::Overflow { .. })
    }
}

/// Destination of loaded rows
#[async_trait]
pub trait Store: Send + Sync {
    /// Insert every row of `rows` or none of them
    async fn bulk_insert(&self, table: &TableSpec, rows: &[Row]) -> Result<(), StoreError>;

    /// Every stored row of `table`, in id order
    async fn read_rows(&self, table: &TableSpec) -> Result<Vec<Row>, StoreError>;
}
