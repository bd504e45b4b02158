//! REST `CollectionSource` against the hosted backend's row API.
//!
//! Uses `ureq` (sync) wrapped in `tokio::task::spawn_blocking` to avoid
//! blocking the async runtime. Filters are encoded PostgREST-style
//! (`field=op.value`), ordering as `order=field.dir`, and the API key is
//! sent both as `apikey` and as a bearer token.

use async_trait::async_trait;

use qala_model::{CollectionName, QuerySpec, RecordId, SortDirection};

use crate::config::SourceConfig;
use crate::error::SourceError;
use crate::traits::CollectionSource;

pub struct RestSource {
    base_url: String,
    api_key: Option<String>,
}

impl RestSource {
    pub fn new(config: &SourceConfig) -> Self {
        Self {
            base_url: config.base_url.trim_end_matches('/').to_string(),
            api_key: config.api_key.clone(),
        }
    }

    fn collection_url(&self, collection: &CollectionName) -> String {
        format!("{}/rest/v1/{}", self.base_url, collection)
    }

    /// Encode a `QuerySpec` as row-API query parameters.
    fn query_params(query: &QuerySpec) -> Vec<(String, String)> {
        let mut params = Vec::new();
        for filter in &query.filters {
            let literal = match filter.value.as_str() {
                Some(s) => s.to_string(),
                None => filter.value.to_string(),
            };
            params.push((
                filter.field.clone(),
                format!("{}.{}", filter.op.keyword(), literal),
            ));
        }
        if let Some(order) = &query.order {
            let dir = match order.direction {
                SortDirection::Ascending => "asc",
                SortDirection::Descending => "desc",
            };
            params.push(("order".to_string(), format!("{}.{}", order.field, dir)));
        }
        if let Some(limit) = query.limit {
            params.push(("limit".to_string(), limit.to_string()));
        }
        params
    }

}

/// Map a transport-level error onto the source taxonomy.
///
/// 401/403 mean the identity cannot do this; 5xx and connection failures
/// are transient; everything else is the caught fallback.
fn map_http_error(err: ureq::Error) -> SourceError {
    match err {
        ureq::Error::StatusCode(code) if code == 401 || code == 403 => {
            SourceError::permission_denied(format!("backend returned HTTP {code}"))
        }
        ureq::Error::StatusCode(code) if code >= 500 => {
            SourceError::remote_unavailable(format!("backend returned HTTP {code}"))
        }
        ureq::Error::StatusCode(code) => {
            SourceError::unknown(format!("backend returned HTTP {code}"))
        }
        other => SourceError::remote_unavailable(other.to_string()),
    }
}

fn join_error(e: tokio::task::JoinError) -> SourceError {
    SourceError::unknown(format!("task join error: {e}"))
}

#[async_trait]
impl CollectionSource for RestSource {
    async fn read(
        &self,
        collection: &CollectionName,
        query: &QuerySpec,
    ) -> Result<Vec<serde_json::Value>, SourceError> {
        let url = self.collection_url(collection);
        let params = Self::query_params(query);
        let api_key = self.api_key.clone();

        tokio::task::spawn_blocking(move || {
            let agent = ureq::Agent::new_with_defaults();
            let mut request = agent.get(&url);
            if let Some(key) = &api_key {
                request = request
                    .header("apikey", key)
                    .header("Authorization", &format!("Bearer {key}"));
            }
            for (name, value) in &params {
                request = request.query(name, value);
            }

            let response = request.call().map_err(map_http_error)?;
            let rows: Vec<serde_json::Value> = response
                .into_body()
                .read_json()
                .map_err(|e| SourceError::unknown(format!("response decode: {e}")))?;
            Ok(rows)
        })
        .await
        .map_err(join_error)?
    }

    async fn insert(
        &self,
        collection: &CollectionName,
        record: serde_json::Value,
    ) -> Result<serde_json::Value, SourceError> {
        let url = self.collection_url(collection);
        let api_key = self.api_key.clone();

        tokio::task::spawn_blocking(move || {
            let agent = ureq::Agent::new_with_defaults();
            let mut request = agent.post(&url).header("Prefer", "return=representation");
            if let Some(key) = &api_key {
                request = request
                    .header("apikey", key)
                    .header("Authorization", &format!("Bearer {key}"));
            }

            let response = request.send_json(record).map_err(map_http_error)?;
            let created: serde_json::Value = response
                .into_body()
                .read_json()
                .map_err(|e| SourceError::unknown(format!("response decode: {e}")))?;

            // The row API returns the representation as a one-element array.
            match created {
                serde_json::Value::Array(mut rows) if !rows.is_empty() => Ok(rows.remove(0)),
                serde_json::Value::Array(_) => {
                    Err(SourceError::unknown("insert returned no representation"))
                }
                row => Ok(row),
            }
        })
        .await
        .map_err(join_error)?
    }

    async fn update(
        &self,
        collection: &CollectionName,
        id: &RecordId,
        patch: serde_json::Value,
    ) -> Result<(), SourceError> {
        let url = self.collection_url(collection);
        let id_param = format!("eq.{id}");
        let api_key = self.api_key.clone();

        tokio::task::spawn_blocking(move || {
            let agent = ureq::Agent::new_with_defaults();
            let mut request = agent
                .patch(&url)
                .query("id", &id_param)
                .header("Prefer", "return=representation");
            if let Some(key) = &api_key {
                request = request
                    .header("apikey", key)
                    .header("Authorization", &format!("Bearer {key}"));
            }

            let response = request.send_json(patch).map_err(map_http_error)?;
            let patched: serde_json::Value = response
                .into_body()
                .read_json()
                .map_err(|e| SourceError::unknown(format!("response decode: {e}")))?;
            ensure_patch_matched(&id_param, &patched)
        })
        .await
        .map_err(join_error)?
    }
}

/// A PATCH whose id filter matches zero rows still returns HTTP success;
/// the representation tells whether anything was actually patched.
fn ensure_patch_matched(id_param: &str, patched: &serde_json::Value) -> Result<(), SourceError> {
    match patched {
        serde_json::Value::Array(rows) if rows.is_empty() => Err(SourceError::unknown(format!(
            "update matched no row ({id_param})"
        ))),
        _ => Ok(()),
    }
}
