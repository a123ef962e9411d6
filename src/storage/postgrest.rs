//! HTTP client for a Supabase/PostgREST endpoint.

use crate::storage::{DataStore, Record, Select, StoreError};
use async_trait::async_trait;
use reqwest::{Client as HttpClient, RequestBuilder, Response, Url};
use serde::de::DeserializeOwned;
use serde_json::Value;
use std::time::Duration;
use tracing::debug;

/// Talks to the REST surface PostgREST exposes under `/rest/v1`.
///
/// The client is cheap to clone and holds no per-request state, so a
/// single instance is shared by every handler.
#[derive(Debug, Clone)]
pub struct PostgrestClient {
    /// Project URL, e.g. `https://xyz.supabase.co`.
    base_url: Url,
    http: HttpClient,
    /// Sent both as `apikey` and as a bearer token.
    api_key: String,
}

impl PostgrestClient {
    /// # Errors
    ///
    /// Returns an error if the URL is not an absolute http(s) URL or the
    /// HTTP client cannot be created.
    pub fn new(base_url: &str, api_key: impl Into<String>) -> Result<Self, StoreError> {
        if !base_url.starts_with("http://") && !base_url.starts_with("https://") {
            return Err(StoreError::InvalidUrl(format!(
                "URL must start with http:// or https://, got: {}",
                base_url
            )));
        }

        let base_url =
            Url::parse(base_url).map_err(|e| StoreError::InvalidUrl(format!("{}: {}", base_url, e)))?;

        let http = HttpClient::builder()
            .timeout(Duration::from_secs(30))
            .build()?;

        Ok(Self {
            base_url,
            http,
            api_key: api_key.into(),
        })
    }

    /// Build `<base>/rest/v1/<segments...>`, percent-encoding each segment.
    fn endpoint(&self, segments: &[&str]) -> Result<Url, StoreError> {
        let mut url = self.base_url.clone();
        url.path_segments_mut()
            .map_err(|_| StoreError::InvalidUrl(self.base_url.to_string()))?
            .pop_if_empty()
            .extend(["rest", "v1"])
            .extend(segments);
        Ok(url)
    }

    fn with_auth(&self, builder: RequestBuilder) -> RequestBuilder {
        builder
            .header("apikey", &self.api_key)
            .header("Authorization", format!("Bearer {}", self.api_key))
    }

    async fn handle_response<T: DeserializeOwned>(response: Response) -> Result<T, StoreError> {
        let status = response.status();
        let body = response.text().await?;

        if !status.is_success() {
            return Err(StoreError::Api {
                status: status.as_u16(),
                message: error_message(&body),
            });
        }

        serde_json::from_str(&body).map_err(|e| StoreError::Decode(e.to_string()))
    }
}

/// PostgREST errors look like `{"code", "message", "details", "hint"}`.
fn error_message(body: &str) -> String {
    if let Ok(json) = serde_json::from_str::<Value>(body) {
        if let Some(message) = json["message"].as_str().or_else(|| json["error"].as_str()) {
            return message.to_string();
        }
    }

    if body.trim().is_empty() {
        "Unknown error".to_string()
    } else {
        body.to_string()
    }
}

fn query_params(query: &Select) -> Vec<(String, String)> {
    let mut params = vec![("select".to_string(), query.columns.clone())];

    for (column, value) in &query.filters {
        params.push((column.clone(), format!("eq.{}", value)));
    }

    if let Some(order) = &query.order {
        let direction = if order.descending { "desc" } else { "asc" };
        params.push(("order".to_string(), format!("{}.{}", order.column, direction)));
    }

    params
}

#[async_trait]
impl DataStore for PostgrestClient {
    async fn select(&self, query: &Select) -> Result<Vec<Record>, StoreError> {
        let url = self.endpoint(&[query.table.as_str()])?;
        debug!(table = %query.table, filters = query.filters.len(), "select");

        let response = self
            .with_auth(self.http.get(url))
            .query(&query_params(query))
            .send()
            .await?;

        Self::handle_response(response).await
    }

    async fn insert(&self, table: &str, row: Value) -> Result<Vec<Record>, StoreError> {
        let url = self.endpoint(&[table])?;
        debug!(table, "insert");

        let response = self
            .with_auth(self.http.post(url))
            .header("Prefer", "return=representation")
            .json(&row)
            .send()
            .await?;

        Self::handle_response(response).await
    }

    async fn rpc(&self, function: &str, args: Value) -> Result<Value, StoreError> {
        let url = self.endpoint(&["rpc", function])?;
        debug!(function, "rpc");

        let response = self
            .with_auth(self.http.post(url))
            .json(&args)
            .send()
            .await?;

        Self::handle_response(response).await
    }
}
