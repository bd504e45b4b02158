//! The generic remote-collection resource container.
//!
//! One `ResourceStore` is owned by exactly one logical view. It is the
//! single point of truth for "what does the remote collection currently
//! look like, from this view's perspective", plus a narrow mutation
//! surface. Views that must observe the same collection each own an
//! independent store; their snapshots may transiently disagree until each
//! refreshes.

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use serde::de::DeserializeOwned;
use serde::Serialize;
use time::OffsetDateTime;

use qala_model::{CollectionName, QuerySpec, RecordId};
use qala_source::{CollectionSource, SourceError};

use crate::state::ResourceState;

/// Fetch-lifecycle container for one remote collection.
///
/// `load` drives the state machine Idle → Loading → Ready/Failed and back
/// through Loading on every refresh. Completion order of overlapping loads
/// is not completion order of the network: each call gets a monotonically
/// increasing sequence number and only the latest-issued call may commit,
/// so the observable state always reflects the most recently *issued*
/// load. A superseded call's response is discarded, not aborted.
///
/// `insert` and `update` pass through to the source and never touch the
/// read state; the backend computes fields the client cannot predict
/// (ids, timestamps, validation), so the snapshot only changes on the
/// next `load`. Callers needing to see their own write re-load.
pub struct ResourceStore<T> {
    source: Arc<dyn CollectionSource>,
    collection: CollectionName,
    state: Mutex<ResourceState<T>>,
    issued: AtomicU64,
}

impl<T> ResourceStore<T>
where
    T: Serialize + DeserializeOwned + Clone + Send,
{
    /// Create a store in `Idle`; no fetch is issued until the first `load`.
    pub fn new(source: Arc<dyn CollectionSource>, collection: CollectionName) -> Self {
        Self {
            source,
            collection,
            state: Mutex::new(ResourceState::Idle),
            issued: AtomicU64::new(0),
        }
    }

    pub fn collection(&self) -> &CollectionName {
        &self.collection
    }

    /// Pure read of the current state.
    pub fn snapshot(&self) -> ResourceState<T> {
        self.state.lock().expect("lock poisoned").clone()
    }

    /// Issue a read and commit the outcome, last-sequence-wins.
    pub async fn load(&self, query: QuerySpec) {
        let seq = self.begin();
        let outcome = self.source.read(&self.collection, &query).await;
        self.commit(seq, outcome);
    }

    /// `load` with a caller-supplied deadline. Expiry commits
    /// `RemoteUnavailable` (subject to the same sequence gate); the
    /// underlying request is not aborted.
    pub async fn load_within(&self, query: QuerySpec, deadline: Duration) {
        let seq = self.begin();
        let outcome = match tokio::time::timeout(deadline, self.source.read(&self.collection, &query)).await
        {
            Ok(result) => result,
            Err(_) => Err(SourceError::remote_unavailable(format!(
                "no response within {deadline:?}"
            ))),
        };
        self.commit(seq, outcome);
    }

    /// Submit a create; returns the created record with server-assigned
    /// fields. The read state is untouched either way — errors go to the
    /// caller, not into the snapshot.
    pub async fn insert(&self, record: &T) -> Result<T, SourceError> {
        let row = serde_json::to_value(record)
            .map_err(|e| SourceError::unknown(format!("record encode: {e}")))?;
        let created = self.source.insert(&self.collection, row).await?;
        serde_json::from_value(created)
            .map_err(|e| SourceError::unknown(format!("created row decode: {e}")))
    }

    /// Apply a partial patch to one record. Same contract as `insert`:
    /// fire, report, no implicit local patching.
    pub async fn update(&self, id: &RecordId, patch: serde_json::Value) -> Result<(), SourceError> {
        self.source.update(&self.collection, id, patch).await
    }

    /// Assign the next sequence number and enter `Loading` — unless a
    /// newer call was issued in the meantime, in which case this call is
    /// already superseded and must not disturb the newer state.
    fn begin(&self) -> u64 {
        let seq = self.issued.fetch_add(1, Ordering::SeqCst) + 1;
        let mut state = self.state.lock().expect("lock poisoned");
        if seq == self.issued.load(Ordering::SeqCst) {
            *state = ResourceState::Loading;
        }
        seq
    }

    /// Commit a load outcome if and only if `seq` is still the latest
    /// issued. The gate and the state write happen under one lock so a
    /// newer commit cannot interleave.
    fn commit(&self, seq: u64, outcome: Result<Vec<serde_json::Value>, SourceError>) {
        let mut state = self.state.lock().expect("lock poisoned");
        if seq != self.issued.load(Ordering::SeqCst) {
            tracing::debug!(
                collection = %self.collection,
                seq,
                latest = self.issued.load(Ordering::SeqCst),
                "discarding superseded load response"
            );
            return;
        }

        *state = match outcome {
            Ok(rows) => {
                match rows
                    .into_iter()
                    .map(serde_json::from_value)
                    .collect::<Result<Vec<T>, _>>()
                {
                    Ok(items) => ResourceState::Ready {
                        items,
                        fetched_at: OffsetDateTime::now_utc(),
                    },
                    Err(e) => {
                        tracing::warn!(collection = %self.collection, error = %e, "row decode failed");
                        ResourceState::Failed(SourceError::unknown(format!("row decode: {e}")))
                    }
                }
            }
            Err(err) => {
                if !err.is_retryable() {
                    tracing::warn!(collection = %self.collection, error = %err, "load failed");
                }
                ResourceState::Failed(err)
            }
        };
    }
}
