use std::future::Future;

use qala_model::{names, CollectionName, QuerySpec};

use super::{make_appeal, TestResult};
use crate::traits::CollectionSource;

pub(super) async fn run_read_tests<S, F, Fut>(factory: &F) -> Vec<TestResult>
where
    S: CollectionSource,
    F: Fn() -> Fut,
    Fut: Future<Output = S>,
{
    vec![
        TestResult::from_result(
            "read",
            "empty_collection_reads_as_empty",
            empty_collection_reads_as_empty(factory).await,
        ),
        TestResult::from_result(
            "read",
            "inserted_rows_come_back_in_order",
            inserted_rows_come_back_in_order(factory).await,
        ),
    ]
}

/// Reading a collection nothing was ever written to must be `Ok(vec![])`,
/// never an error.
async fn empty_collection_reads_as_empty<S, F, Fut>(factory: &F) -> Result<(), String>
where
    S: CollectionSource,
    F: Fn() -> Fut,
    Fut: Future<Output = S>,
{
    let source = factory().await;
    let rows = source
        .read(&CollectionName::from(names::APPEALS), &QuerySpec::all())
        .await
        .map_err(|e| format!("read: {e}"))?;
    if !rows.is_empty() {
        return Err(format!("expected empty read, got {} rows", rows.len()));
    }
    Ok(())
}

/// Without an ordering key, rows come back in stable backend order —
/// for a fresh source, insertion order.
async fn inserted_rows_come_back_in_order<S, F, Fut>(factory: &F) -> Result<(), String>
where
    S: CollectionSource,
    F: Fn() -> Fut,
    Fut: Future<Output = S>,
{
    let source = factory().await;
    let collection = CollectionName::from(names::APPEALS);

    for subject in ["first", "second", "third"] {
        source
            .insert(&collection, make_appeal("res-1", subject, "open"))
            .await
            .map_err(|e| format!("insert {subject}: {e}"))?;
    }

    let rows = source
        .read(&collection, &QuerySpec::all())
        .await
        .map_err(|e| format!("read: {e}"))?;
    let subjects: Vec<&str> = rows
        .iter()
        .filter_map(|r| r.get("subject").and_then(|v| v.as_str()))
        .collect();
    if subjects != vec!["first", "second", "third"] {
        return Err(format!("unexpected order: {subjects:?}"));
    }
    Ok(())
}
