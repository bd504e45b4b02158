//! Contract tests for `ResourceStore` fetch lifecycle and commit gating.
//!
//! The interesting cases need control over network completion order, so
//! these tests run against `GatedSource`: a `CollectionSource` whose
//! `read` blocks on a per-query gate and resolves with a scripted
//! response only when the test releases it.

use std::collections::HashMap;
use std::sync::{Arc, Mutex};
use std::time::Duration;

use async_trait::async_trait;
use tokio::sync::mpsc::{unbounded_channel, UnboundedReceiver, UnboundedSender};
use tokio::sync::Notify;

use qala_model::{names, CollectionName, FilterOp, QuerySpec, RecordId, SortDirection};
use qala_source::{CollectionSource, MemorySource, SourceError};
use qala_store::{collections, ResourceStore};

fn init_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .try_init();
}

// ── GatedSource ──────────────────────────────────────────────────────────────

struct Gate {
    release: Arc<Notify>,
    response: Result<Vec<serde_json::Value>, SourceError>,
}

/// Scripted source: each expected query is registered with a response and
/// a gate. `read` reports that it started (so tests can sequence issue
/// order), then waits for its gate before resolving.
struct GatedSource {
    gates: Mutex<HashMap<String, Gate>>,
    started: UnboundedSender<String>,
}

impl GatedSource {
    fn new() -> (Arc<Self>, UnboundedReceiver<String>) {
        let (started, started_rx) = unbounded_channel();
        (
            Arc::new(Self {
                gates: Mutex::new(HashMap::new()),
                started,
            }),
            started_rx,
        )
    }

    fn key(query: &QuerySpec) -> String {
        serde_json::to_string(query).expect("query is serializable")
    }

    /// Script a response for `query`; the returned handle releases it.
    fn expect(
        &self,
        query: &QuerySpec,
        response: Result<Vec<serde_json::Value>, SourceError>,
    ) -> Arc<Notify> {
        let release = Arc::new(Notify::new());
        self.gates.lock().unwrap().insert(
            Self::key(query),
            Gate {
                release: release.clone(),
                response,
            },
        );
        release
    }
}

#[async_trait]
impl CollectionSource for GatedSource {
    async fn read(
        &self,
        _collection: &CollectionName,
        query: &QuerySpec,
    ) -> Result<Vec<serde_json::Value>, SourceError> {
        let key = Self::key(query);
        let (release, response) = {
            let mut gates = self.gates.lock().unwrap();
            let gate = gates.remove(&key).unwrap_or_else(|| panic!("unexpected query {key}"));
            (gate.release, gate.response)
        };
        self.started.send(key).expect("test receiver alive");
        release.notified().await;
        response
    }

    async fn insert(
        &self,
        _collection: &CollectionName,
        _record: serde_json::Value,
    ) -> Result<serde_json::Value, SourceError> {
        unimplemented!("GatedSource only scripts reads")
    }

    async fn update(
        &self,
        _collection: &CollectionName,
        _id: &RecordId,
        _patch: serde_json::Value,
    ) -> Result<(), SourceError> {
        unimplemented!("GatedSource only scripts reads")
    }
}

fn rows(n: usize) -> Vec<serde_json::Value> {
    (0..n)
        .map(|i| serde_json::json!({"id": format!("rec-{i}"), "n": i}))
        .collect()
}

// ── Out-of-order resolution ──────────────────────────────────────────────────

/// The scenario from the portal's appeals screen: a plain load is still in
/// flight when a re-query with an ordering key is issued; the re-query's
/// response (5 rows) arrives first, the original (3 rows) arrives late.
/// The late response must not overwrite the newer result.
#[tokio::test]
async fn late_response_from_older_load_is_discarded() {
    init_tracing();
    let (source, mut started) = GatedSource::new();
    let store: Arc<ResourceStore<serde_json::Value>> = Arc::new(ResourceStore::new(
        source.clone(),
        CollectionName::from(names::APPEALS),
    ));

    let q1 = QuerySpec::all();
    let q2 = QuerySpec::all().order_by("created_at", SortDirection::Descending);
    let release1 = source.expect(&q1, Ok(rows(3)));
    let release2 = source.expect(&q2, Ok(rows(5)));

    let s1 = store.clone();
    let load1 = tokio::spawn(async move { s1.load(QuerySpec::all()).await });
    started.recv().await.expect("first load reached the source");

    let s2 = store.clone();
    let q2_clone = q2.clone();
    let load2 = tokio::spawn(async move { s2.load(q2_clone).await });
    started.recv().await.expect("second load reached the source");

    assert!(store.snapshot().is_loading());

    // Resolve the newer load first, then the stale one.
    release2.notify_one();
    load2.await.unwrap();
    release1.notify_one();
    load1.await.unwrap();

    let snapshot = store.snapshot();
    assert_eq!(snapshot.items().map(<[serde_json::Value]>::len), Some(5));
}

/// L1..Ln issued in order, resolved in reverse: the committed state is
/// Ln's response no matter how the earlier ones land.
#[tokio::test]
async fn reverse_resolution_of_many_loads_commits_the_last_issued() {
    let (source, mut started) = GatedSource::new();
    let store: Arc<ResourceStore<serde_json::Value>> = Arc::new(ResourceStore::new(
        source.clone(),
        CollectionName::from(names::APPEALS),
    ));

    let n = 4;
    let mut releases = Vec::new();
    let mut handles = Vec::new();
    for i in 1..=n {
        let query = QuerySpec::all().limit(i);
        releases.push(source.expect(&query, Ok(rows(i))));
        let s = store.clone();
        handles.push(tokio::spawn(async move { s.load(QuerySpec::all().limit(i)).await }));
        started.recv().await.expect("load reached the source");
    }

    for (release, handle) in releases.into_iter().zip(handles).rev() {
        release.notify_one();
        handle.await.unwrap();
    }

    let snapshot = store.snapshot();
    assert_eq!(snapshot.items().map(<[serde_json::Value]>::len), Some(n));
}

/// A failure of the latest-issued load wins over a success of an older one.
#[tokio::test]
async fn failure_of_latest_load_beats_stale_success() {
    let (source, mut started) = GatedSource::new();
    let store: Arc<ResourceStore<serde_json::Value>> = Arc::new(ResourceStore::new(
        source.clone(),
        CollectionName::from(names::APPEALS),
    ));

    let q1 = QuerySpec::all();
    let q2 = QuerySpec::all().limit(10);
    let release1 = source.expect(&q1, Ok(rows(3)));
    let release2 = source.expect(&q2, Err(SourceError::remote_unavailable("gateway down")));

    let s1 = store.clone();
    let load1 = tokio::spawn(async move { s1.load(QuerySpec::all()).await });
    started.recv().await.unwrap();
    let s2 = store.clone();
    let load2 = tokio::spawn(async move { s2.load(QuerySpec::all().limit(10)).await });
    started.recv().await.unwrap();

    release2.notify_one();
    load2.await.unwrap();
    release1.notify_one();
    load1.await.unwrap();

    assert_eq!(
        store.snapshot().error(),
        Some(&SourceError::remote_unavailable("gateway down"))
    );
}

// ── Write/read separation ────────────────────────────────────────────────────

/// A successful insert leaves the Ready snapshot untouched; the write
/// becomes visible only through the next load.
#[tokio::test]
async fn insert_does_not_mutate_ready_snapshot() {
    init_tracing();
    let source = Arc::new(MemorySource::new());
    source.seed(
        &CollectionName::from(names::APPEALS),
        vec![serde_json::json!({
            "id": "a1",
            "resident_id": "res-7",
            "category": "roads",
            "subject": "Pothole",
            "body": "...",
            "status": "open",
            "created_at": "2025-01-01T00:00:00Z"
        })],
    );
    let store = collections::appeals(source);
    store.load(collections::resident_appeals_query("res-7")).await;
    let before = store.snapshot();
    assert_eq!(before.items().map(<[qala_model::Appeal]>::len), Some(1));

    let created = store
        .insert(&qala_model::Appeal {
            id: String::new(),
            resident_id: "res-7".to_string(),
            category: "lighting".to_string(),
            subject: "Dark street".to_string(),
            body: "No lighting on Tole bi".to_string(),
            status: "open".to_string(),
            created_at: String::new(),
            updated_at: None,
        })
        .await
        .unwrap();
    assert!(!created.id.is_empty());

    // Unchanged until the next load.
    assert_eq!(store.snapshot(), before);

    store.load(collections::resident_appeals_query("res-7")).await;
    assert_eq!(store.snapshot().items().map(<[qala_model::Appeal]>::len), Some(2));
}

/// A failed mutation is returned to the caller and never lands in the
/// read state.
#[tokio::test]
async fn failed_update_is_caller_visible_not_store_visible() {
    let source = Arc::new(MemorySource::new());
    let store = collections::appeals(source.clone());
    store.load(QuerySpec::all()).await;
    let before = store.snapshot();
    assert!(before.is_ready());

    source.fail_next(SourceError::permission_denied("not your appeal"));
    let result = store
        .update(&RecordId::from("a1"), serde_json::json!({"status": "closed"}))
        .await;
    assert_eq!(result, Err(SourceError::permission_denied("not your appeal")));
    assert_eq!(store.snapshot(), before);
}

// ── Deadlines ────────────────────────────────────────────────────────────────

struct SilentSource;

#[async_trait]
impl CollectionSource for SilentSource {
    async fn read(
        &self,
        _collection: &CollectionName,
        _query: &QuerySpec,
    ) -> Result<Vec<serde_json::Value>, SourceError> {
        std::future::pending().await
    }

    async fn insert(
        &self,
        _collection: &CollectionName,
        _record: serde_json::Value,
    ) -> Result<serde_json::Value, SourceError> {
        std::future::pending().await
    }

    async fn update(
        &self,
        _collection: &CollectionName,
        _id: &RecordId,
        _patch: serde_json::Value,
    ) -> Result<(), SourceError> {
        std::future::pending().await
    }
}

#[tokio::test(start_paused = true)]
async fn deadline_expiry_surfaces_remote_unavailable() {
    let store: ResourceStore<serde_json::Value> =
        ResourceStore::new(Arc::new(SilentSource), CollectionName::from(names::FAQ_ITEMS));

    store
        .load_within(QuerySpec::all(), Duration::from_secs(5))
        .await;

    assert!(matches!(
        store.snapshot().error(),
        Some(SourceError::RemoteUnavailable { .. })
    ));
}

// ── Independent stores ───────────────────────────────────────────────────────

/// Two views over the same collection own independent stores; one
/// refreshing does not move the other's snapshot.
#[tokio::test]
async fn independent_stores_disagree_until_each_refreshes() {
    let source = Arc::new(MemorySource::new());
    let collection = CollectionName::from(names::FAQ_ITEMS);
    source.seed(&collection, vec![serde_json::json!({"id": "f1"})]);

    let view_a: ResourceStore<serde_json::Value> =
        ResourceStore::new(source.clone(), collection.clone());
    let view_b: ResourceStore<serde_json::Value> =
        ResourceStore::new(source.clone(), collection.clone());

    view_a.load(QuerySpec::all()).await;
    view_b.load(QuerySpec::all()).await;

    source.seed(&collection, vec![serde_json::json!({"id": "f2"})]);
    view_a.load(QuerySpec::all()).await;

    assert_eq!(view_a.snapshot().items().map(<[serde_json::Value]>::len), Some(2));
    assert_eq!(view_b.snapshot().items().map(<[serde_json::Value]>::len), Some(1));
}

// ── Query passthrough ────────────────────────────────────────────────────────

/// The store hands the QuerySpec to the source untouched and never
/// re-filters rows locally.
#[tokio::test]
async fn query_is_applied_by_the_source_not_the_store() {
    let source = Arc::new(MemorySource::new());
    let collection = CollectionName::from(names::NOTIFICATIONS);
    source.seed(
        &collection,
        vec![
            serde_json::json!({"id": "n1", "resident_id": "res-1"}),
            serde_json::json!({"id": "n2", "resident_id": "res-2"}),
        ],
    );

    let store: ResourceStore<serde_json::Value> = ResourceStore::new(source, collection);
    store
        .load(QuerySpec::all().filter("resident_id", FilterOp::Eq, "res-2"))
        .await;

    let snapshot = store.snapshot();
    let items = snapshot.items().unwrap();
    assert_eq!(items.len(), 1);
    assert_eq!(items[0]["id"], "n2");
}
