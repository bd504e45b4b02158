//! In-memory `CollectionSource` for tests and local development.
//!
//! `MemorySource` plays the server: it applies `QuerySpec` filters,
//! ordering, and limits itself, and assigns `id`/`created_at` on insert,
//! so stores built on top of it observe the same contract they would get
//! from the hosted backend.

use std::cmp::Ordering;
use std::collections::HashMap;
use std::sync::Mutex;

use async_trait::async_trait;
use time::format_description::well_known::Rfc3339;
use time::OffsetDateTime;

use qala_model::{CollectionName, Filter, FilterOp, QuerySpec, RecordId, SortDirection};

use crate::error::SourceError;
use crate::traits::CollectionSource;

#[derive(Default)]
struct Inner {
    collections: HashMap<String, Vec<serde_json::Value>>,
    next_id: u64,
    fail_next: Option<SourceError>,
}

/// Mutex-guarded in-memory collections with server-side query semantics
/// and single-shot fault injection.
#[derive(Default)]
pub struct MemorySource {
    inner: Mutex<Inner>,
}

impl MemorySource {
    pub fn new() -> Self {
        Self::default()
    }

    /// Seed a collection with rows, preserving their order.
    pub fn seed(&self, collection: &CollectionName, rows: Vec<serde_json::Value>) {
        let mut inner = self.inner.lock().expect("lock poisoned");
        inner
            .collections
            .entry(collection.as_str().to_string())
            .or_default()
            .extend(rows);
    }

    /// Make the next operation (read, insert, or update) fail with `error`.
    pub fn fail_next(&self, error: SourceError) {
        let mut inner = self.inner.lock().expect("lock poisoned");
        inner.fail_next = Some(error);
    }

    fn take_injected_failure(inner: &mut Inner) -> Result<(), SourceError> {
        match inner.fail_next.take() {
            Some(err) => Err(err),
            None => Ok(()),
        }
    }
}

#[async_trait]
impl CollectionSource for MemorySource {
    async fn read(
        &self,
        collection: &CollectionName,
        query: &QuerySpec,
    ) -> Result<Vec<serde_json::Value>, SourceError> {
        let mut inner = self.inner.lock().expect("lock poisoned");
        Self::take_injected_failure(&mut inner)?;

        let mut rows: Vec<serde_json::Value> = inner
            .collections
            .get(collection.as_str())
            .cloned()
            .unwrap_or_default();

        rows.retain(|row| query.filters.iter().all(|f| filter_matches(f, row)));

        if let Some(order) = &query.order {
            // Stable sort: rows that don't compare keep insertion order.
            rows.sort_by(|a, b| {
                let ord = compare_values(
                    a.get(&order.field).unwrap_or(&serde_json::Value::Null),
                    b.get(&order.field).unwrap_or(&serde_json::Value::Null),
                )
                .unwrap_or(Ordering::Equal);
                match order.direction {
                    SortDirection::Ascending => ord,
                    SortDirection::Descending => ord.reverse(),
                }
            });
        }

        if let Some(limit) = query.limit {
            rows.truncate(limit);
        }

        Ok(rows)
    }

    async fn insert(
        &self,
        collection: &CollectionName,
        record: serde_json::Value,
    ) -> Result<serde_json::Value, SourceError> {
        let mut inner = self.inner.lock().expect("lock poisoned");
        Self::take_injected_failure(&mut inner)?;

        let mut row = match record {
            serde_json::Value::Object(map) => map,
            other => {
                return Err(SourceError::unknown(format!(
                    "insert payload must be an object, got {other}"
                )))
            }
        };

        if field_is_unset(row.get("id")) {
            inner.next_id += 1;
            row.insert(
                "id".to_string(),
                serde_json::Value::String(format!("rec-{}", inner.next_id)),
            );
        }
        if field_is_unset(row.get("created_at")) {
            let now = OffsetDateTime::now_utc()
                .format(&Rfc3339)
                .map_err(|e| SourceError::unknown(format!("timestamp format: {e}")))?;
            row.insert("created_at".to_string(), serde_json::Value::String(now));
        }

        let created = serde_json::Value::Object(row);
        inner
            .collections
            .entry(collection.as_str().to_string())
            .or_default()
            .push(created.clone());
        Ok(created)
    }

    async fn update(
        &self,
        collection: &CollectionName,
        id: &RecordId,
        patch: serde_json::Value,
    ) -> Result<(), SourceError> {
        let mut inner = self.inner.lock().expect("lock poisoned");
        Self::take_injected_failure(&mut inner)?;

        let patch = match patch {
            serde_json::Value::Object(map) => map,
            other => {
                return Err(SourceError::unknown(format!(
                    "update patch must be an object, got {other}"
                )))
            }
        };

        let rows = inner
            .collections
            .get_mut(collection.as_str())
            .ok_or_else(|| {
                SourceError::unknown(format!("no row with id '{id}' in '{collection}'"))
            })?;

        for row in rows.iter_mut() {
            if row.get("id").and_then(|v| v.as_str()) == Some(id.as_str()) {
                if let serde_json::Value::Object(map) = row {
                    for (key, value) in patch {
                        map.insert(key, value);
                    }
                }
                return Ok(());
            }
        }

        Err(SourceError::unknown(format!(
            "no row with id '{id}' in '{collection}'"
        )))
    }
}

fn field_is_unset(value: Option<&serde_json::Value>) -> bool {
    match value {
        None | Some(serde_json::Value::Null) => true,
        Some(serde_json::Value::String(s)) => s.is_empty(),
        Some(_) => false,
    }
}

fn filter_matches(filter: &Filter, row: &serde_json::Value) -> bool {
    let actual = row.get(&filter.field).unwrap_or(&serde_json::Value::Null);
    match filter.op {
        FilterOp::Eq => actual == &filter.value,
        FilterOp::Neq => actual != &filter.value,
        FilterOp::Gt => matches!(compare_values(actual, &filter.value), Some(Ordering::Greater)),
        FilterOp::Gte => matches!(
            compare_values(actual, &filter.value),
            Some(Ordering::Greater) | Some(Ordering::Equal)
        ),
        FilterOp::Lt => matches!(compare_values(actual, &filter.value), Some(Ordering::Less)),
        FilterOp::Lte => matches!(
            compare_values(actual, &filter.value),
            Some(Ordering::Less) | Some(Ordering::Equal)
        ),
        FilterOp::Like => match (actual.as_str(), filter.value.as_str()) {
            (Some(actual), Some(pattern)) => actual
                .to_lowercase()
                .contains(&pattern.trim_matches('%').to_lowercase()),
            _ => false,
        },
    }
}

/// Order numbers numerically and strings lexicographically; everything
/// else is incomparable.
fn compare_values(a: &serde_json::Value, b: &serde_json::Value) -> Option<Ordering> {
    match (a, b) {
        (serde_json::Value::Number(a), serde_json::Value::Number(b)) => {
            a.as_f64().partial_cmp(&b.as_f64())
        }
        (serde_json::Value::String(a), serde_json::Value::String(b)) => Some(a.cmp(b)),
        _ => None,
    }
}
