use std::future::Future;

use qala_model::{names, CollectionName, FilterOp, QuerySpec, SortDirection};

use super::{make_appeal, TestResult};
use crate::traits::CollectionSource;

pub(super) async fn run_query_tests<S, F, Fut>(factory: &F) -> Vec<TestResult>
where
    S: CollectionSource,
    F: Fn() -> Fut,
    Fut: Future<Output = S>,
{
    vec![
        TestResult::from_result(
            "query",
            "eq_filter_is_applied",
            eq_filter_is_applied(factory).await,
        ),
        TestResult::from_result(
            "query",
            "ordering_key_is_applied",
            ordering_key_is_applied(factory).await,
        ),
        TestResult::from_result("query", "limit_is_applied", limit_is_applied(factory).await),
    ]
}

async fn seed_statuses<S: CollectionSource>(
    source: &S,
    collection: &CollectionName,
) -> Result<(), String> {
    for (subject, status) in [("a", "open"), ("b", "closed"), ("c", "open")] {
        source
            .insert(collection, make_appeal("res-1", subject, status))
            .await
            .map_err(|e| format!("insert {subject}: {e}"))?;
    }
    Ok(())
}

async fn eq_filter_is_applied<S, F, Fut>(factory: &F) -> Result<(), String>
where
    S: CollectionSource,
    F: Fn() -> Fut,
    Fut: Future<Output = S>,
{
    let source = factory().await;
    let collection = CollectionName::from(names::APPEALS);
    seed_statuses(&source, &collection).await?;

    let rows = source
        .read(
            &collection,
            &QuerySpec::all().filter("status", FilterOp::Eq, "open"),
        )
        .await
        .map_err(|e| format!("read: {e}"))?;
    if rows.len() != 2 {
        return Err(format!("expected 2 open rows, got {}", rows.len()));
    }
    if rows
        .iter()
        .any(|r| r.get("status").and_then(|v| v.as_str()) != Some("open"))
    {
        return Err("filter leaked a non-matching row".to_string());
    }
    Ok(())
}

async fn ordering_key_is_applied<S, F, Fut>(factory: &F) -> Result<(), String>
where
    S: CollectionSource,
    F: Fn() -> Fut,
    Fut: Future<Output = S>,
{
    let source = factory().await;
    let collection = CollectionName::from(names::APPEALS);
    seed_statuses(&source, &collection).await?;

    let rows = source
        .read(
            &collection,
            &QuerySpec::all().order_by("subject", SortDirection::Descending),
        )
        .await
        .map_err(|e| format!("read: {e}"))?;
    let subjects: Vec<&str> = rows
        .iter()
        .filter_map(|r| r.get("subject").and_then(|v| v.as_str()))
        .collect();
    if subjects != vec!["c", "b", "a"] {
        return Err(format!("unexpected order: {subjects:?}"));
    }
    Ok(())
}

async fn limit_is_applied<S, F, Fut>(factory: &F) -> Result<(), String>
where
    S: CollectionSource,
    F: Fn() -> Fut,
    Fut: Future<Output = S>,
{
    let source = factory().await;
    let collection = CollectionName::from(names::APPEALS);
    seed_statuses(&source, &collection).await?;

    let rows = source
        .read(&collection, &QuerySpec::all().limit(1))
        .await
        .map_err(|e| format!("read: {e}"))?;
    if rows.len() != 1 {
        return Err(format!("expected 1 row, got {}", rows.len()));
    }
    Ok(())
}
