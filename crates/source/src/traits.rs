use async_trait::async_trait;

use qala_model::{CollectionName, QuerySpec, RecordId};

use crate::error::SourceError;

/// The remote data collection service the portal runs against.
///
/// Rows cross this boundary as `serde_json::Value` objects so the trait
/// stays object-safe and one `Arc<dyn CollectionSource>` can serve every
/// typed store; deserialization into record types happens on the store
/// side.
///
/// ## Contract
///
/// - `read` returns rows in the order the backend produced them — the
///   query's ordering key if one was given, stable backend order otherwise.
///   An empty collection is `Ok(vec![])`, never an error.
/// - `insert` returns the created row including every server-computed
///   field (id, timestamps). The caller must not assume the row is visible
///   in a subsequent `read` snapshot it already holds.
/// - `update` applies a partial patch to one row by id. Server-computed
///   fields may change as a side effect; callers re-read to observe them.
///
/// All three are network calls with unspecified latency and independent
/// failure modes. Implementations must be `Send + Sync + 'static` so a
/// source can be shared across stores and async task boundaries.
#[async_trait]
pub trait CollectionSource: Send + Sync + 'static {
    /// Read rows from a collection, filtered/ordered/limited server-side.
    async fn read(
        &self,
        collection: &CollectionName,
        query: &QuerySpec,
    ) -> Result<Vec<serde_json::Value>, SourceError>;

    /// Create one row; returns the created row with server-assigned fields.
    async fn insert(
        &self,
        collection: &CollectionName,
        record: serde_json::Value,
    ) -> Result<serde_json::Value, SourceError>;

    /// Apply a partial patch to the row with the given id.
    async fn update(
        &self,
        collection: &CollectionName,
        id: &RecordId,
        patch: serde_json::Value,
    ) -> Result<(), SourceError>;
}
