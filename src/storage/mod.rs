pub mod postgrest;

#[cfg(test)]
pub mod memory;

pub use postgrest::PostgrestClient;

use async_trait::async_trait;
use serde_json::Value;
use std::time::Duration;
use thiserror::Error;

/// A single row as handed back by the backing store.
///
/// No schema is assumed: keys and values pass through untouched and keep
/// the order the store sent them in.
pub type Record = serde_json::Map<String, Value>;

/// Filtered read against one table
#[derive(Debug, Clone, PartialEq)]
pub struct Select {
    pub table: String,
    pub columns: String,
    pub filters: Vec<(String, String)>,
    pub order: Option<Order>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Order {
    pub column: String,
    pub descending: bool,
}

impl Select {
    pub fn from(table: impl Into<String>) -> Self {
        Self {
            table: table.into(),
            columns: "*".to_string(),
            filters: Vec::new(),
            order: None,
        }
    }

    /// Restrict the projection, e.g. `"item_id,nota"`.
    pub fn columns(mut self, columns: impl Into<String>) -> Self {
        self.columns = columns.into();
        self
    }

    /// Add an equality filter. Filters are ANDed.
    pub fn eq(mut self, column: impl Into<String>, value: impl Into<String>) -> Self {
        self.filters.push((column.into(), value.into()));
        self
    }

    pub fn order_desc(mut self, column: impl Into<String>) -> Self {
        self.order = Some(Order {
            column: column.into(),
            descending: true,
        });
        self
    }
}

/// Failures raised by a backing-store call
#[derive(Debug, Error)]
pub enum StoreError {
    #[error("{0}")]
    Http(#[from] reqwest::Error),

    /// The store answered, but with a non-success status.
    #[error("{message}")]
    Api { status: u16, message: String },

    #[error("Invalid data store URL: {0}")]
    InvalidUrl(String),

    #[error("Unexpected response from data store: {0}")]
    Decode(String),

    #[error("Data store did not answer within {0:?}")]
    Timeout(Duration),
}

/// The external tabular-data service every handler talks to.
#[async_trait]
pub trait DataStore: Send + Sync {
    async fn select(&self, query: &Select) -> Result<Vec<Record>, StoreError>;

    /// Insert one row and return what the store persisted.
    async fn insert(&self, table: &str, row: Value) -> Result<Vec<Record>, StoreError>;

    /// Invoke a server-side procedure by name.
    async fn rpc(&self, function: &str, args: Value) -> Result<Value, StoreError>;
}
