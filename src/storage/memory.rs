//! In-process stand-in for the backing store, used by handler tests.

use crate::storage::{DataStore, Record, Select, StoreError};
use async_trait::async_trait;
use serde_json::Value;
use std::collections::HashMap;
use std::time::Duration;
use tokio::sync::RwLock;

#[derive(Default)]
pub struct MemoryStore {
    tables: RwLock<HashMap<String, Vec<Record>>>,
    procedures: RwLock<HashMap<String, Value>>,
    rpc_calls: RwLock<Vec<(String, Value)>>,
    failure: Option<String>,
    latency: Option<Duration>,
    next_id: RwLock<u64>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// A store whose every call fails with `message`.
    pub fn failing(message: impl Into<String>) -> Self {
        Self {
            failure: Some(message.into()),
            ..Self::default()
        }
    }

    pub fn with_latency(mut self, latency: Duration) -> Self {
        self.latency = Some(latency);
        self
    }

    pub async fn create_table(&self, table: &str, rows: Vec<Value>) {
        let rows = rows
            .into_iter()
            .filter_map(|row| match row {
                Value::Object(map) => Some(map),
                _ => None,
            })
            .collect();
        self.tables.write().await.insert(table.to_string(), rows);
    }

    pub async fn define_procedure(&self, function: &str, result: Value) {
        self.procedures
            .write()
            .await
            .insert(function.to_string(), result);
    }

    pub async fn rpc_calls(&self) -> Vec<(String, Value)> {
        self.rpc_calls.read().await.clone()
    }

    async fn before_call(&self) -> Result<(), StoreError> {
        if let Some(latency) = self.latency {
            tokio::time::sleep(latency).await;
        }
        match &self.failure {
            Some(message) => Err(StoreError::Api {
                status: 503,
                message: message.clone(),
            }),
            None => Ok(()),
        }
    }
}

fn missing_relation(table: &str) -> StoreError {
    StoreError::Api {
        status: 404,
        message: format!("relation \"public.{}\" does not exist", table),
    }
}

/// Equality the way PostgREST sees it: everything compared as text.
fn matches(value: Option<&Value>, expected: &str) -> bool {
    match value {
        Some(Value::String(s)) => s == expected,
        Some(Value::Null) | None => false,
        Some(other) => other.to_string() == expected,
    }
}

fn project(row: &Record, columns: &str) -> Record {
    if columns.trim() == "*" {
        return row.clone();
    }
    columns
        .split(',')
        .map(str::trim)
        .filter_map(|column| row.get(column).map(|v| (column.to_string(), v.clone())))
        .collect()
}

fn sort_key(row: &Record, column: &str) -> String {
    match row.get(column) {
        Some(Value::String(s)) => s.clone(),
        Some(other) => other.to_string(),
        None => String::new(),
    }
}

#[async_trait]
impl DataStore for MemoryStore {
    async fn select(&self, query: &Select) -> Result<Vec<Record>, StoreError> {
        self.before_call().await?;

        let tables = self.tables.read().await;
        let rows = tables
            .get(&query.table)
            .ok_or_else(|| missing_relation(&query.table))?;

        let mut selected: Vec<&Record> = rows
            .iter()
            .filter(|row| {
                query
                    .filters
                    .iter()
                    .all(|(column, value)| matches(row.get(column), value))
            })
            .collect();

        if let Some(order) = &query.order {
            selected.sort_by_key(|row| sort_key(row, &order.column));
            if order.descending {
                selected.reverse();
            }
        }

        Ok(selected
            .into_iter()
            .map(|row| project(row, &query.columns))
            .collect())
    }

    async fn insert(&self, table: &str, row: Value) -> Result<Vec<Record>, StoreError> {
        self.before_call().await?;

        let Value::Object(mut row) = row else {
            return Err(StoreError::Api {
                status: 400,
                message: "Empty or invalid json".to_string(),
            });
        };

        let id = {
            let mut next_id = self.next_id.write().await;
            *next_id += 1;
            *next_id
        };
        row.entry("id").or_insert_with(|| Value::from(id));
        // Fixed-width fraction keeps stamps in insertion order when compared as text
        row.entry("created_at")
            .or_insert_with(|| Value::String(format!("2024-01-01T00:00:00.{:09}Z", id)));

        let mut tables = self.tables.write().await;
        let rows = tables.get_mut(table).ok_or_else(|| missing_relation(table))?;
        rows.push(row.clone());

        Ok(vec![row])
    }

    async fn rpc(&self, function: &str, args: Value) -> Result<Value, StoreError> {
        self.before_call().await?;

        self.rpc_calls
            .write()
            .await
            .push((function.to_string(), args));

        self.procedures
            .read()
            .await
            .get(function)
            .cloned()
            .ok_or_else(|| StoreError::Api {
                status: 404,
                message: format!("Could not find the function public.{}", function),
            })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[tokio::test]
    async fn test_stamps_stay_ordered_past_a_day_of_seconds() {
        let store = MemoryStore::new();
        store.create_table("avaliacoes", vec![]).await;

        for _ in 0..90_000 {
            store
                .insert("avaliacoes", json!({"item_id": "1", "nota": 5}))
                .await
                .unwrap();
        }

        let rows = store
            .select(&Select::from("avaliacoes").order_desc("created_at"))
            .await
            .unwrap();

        assert_eq!(rows.len(), 90_000);
        assert_eq!(rows[0]["id"], json!(90_000));
        assert_eq!(rows[89_999]["id"], json!(1));
    }
}
