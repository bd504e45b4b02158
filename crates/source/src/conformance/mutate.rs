use std::future::Future;

use qala_model::{names, CollectionName, QuerySpec, RecordId};

use super::{make_appeal, TestResult};
use crate::traits::CollectionSource;

pub(super) async fn run_mutate_tests<S, F, Fut>(factory: &F) -> Vec<TestResult>
where
    S: CollectionSource,
    F: Fn() -> Fut,
    Fut: Future<Output = S>,
{
    vec![
        TestResult::from_result(
            "mutate",
            "insert_returns_created_row_with_server_fields",
            insert_returns_created_row_with_server_fields(factory).await,
        ),
        TestResult::from_result(
            "mutate",
            "update_patch_is_visible_on_next_read",
            update_patch_is_visible_on_next_read(factory).await,
        ),
        TestResult::from_result(
            "mutate",
            "update_of_missing_row_errors",
            update_of_missing_row_errors(factory).await,
        ),
    ]
}

/// The created row must echo the caller's fields and carry a non-empty
/// server-assigned id and created_at.
async fn insert_returns_created_row_with_server_fields<S, F, Fut>(factory: &F) -> Result<(), String>
where
    S: CollectionSource,
    F: Fn() -> Fut,
    Fut: Future<Output = S>,
{
    let source = factory().await;
    let created = source
        .insert(
            &CollectionName::from(names::APPEALS),
            make_appeal("res-1", "leaking pipe", "open"),
        )
        .await
        .map_err(|e| format!("insert: {e}"))?;

    if created.get("subject").and_then(|v| v.as_str()) != Some("leaking pipe") {
        return Err(format!("caller field not echoed: {created}"));
    }
    let id = created.get("id").and_then(|v| v.as_str()).unwrap_or("");
    if id.is_empty() {
        return Err(format!("no server-assigned id in {created}"));
    }
    let created_at = created
        .get("created_at")
        .and_then(|v| v.as_str())
        .unwrap_or("");
    if created_at.is_empty() {
        return Err(format!("no server-assigned created_at in {created}"));
    }
    Ok(())
}

async fn update_patch_is_visible_on_next_read<S, F, Fut>(factory: &F) -> Result<(), String>
where
    S: CollectionSource,
    F: Fn() -> Fut,
    Fut: Future<Output = S>,
{
    let source = factory().await;
    let collection = CollectionName::from(names::APPEALS);

    let created = source
        .insert(&collection, make_appeal("res-1", "leaking pipe", "open"))
        .await
        .map_err(|e| format!("insert: {e}"))?;
    let id = created
        .get("id")
        .and_then(|v| v.as_str())
        .ok_or_else(|| format!("no id in {created}"))?
        .to_string();

    source
        .update(
            &collection,
            &RecordId::new(id.clone()),
            serde_json::json!({"status": "resolved"}),
        )
        .await
        .map_err(|e| format!("update: {e}"))?;

    let rows = source
        .read(&collection, &QuerySpec::all())
        .await
        .map_err(|e| format!("read: {e}"))?;
    let row = rows
        .iter()
        .find(|r| r.get("id").and_then(|v| v.as_str()) == Some(id.as_str()))
        .ok_or_else(|| format!("updated row '{id}' not found"))?;
    if row.get("status").and_then(|v| v.as_str()) != Some("resolved") {
        return Err(format!("patch not applied: {row}"));
    }
    Ok(())
}

async fn update_of_missing_row_errors<S, F, Fut>(factory: &F) -> Result<(), String>
where
    S: CollectionSource,
    F: Fn() -> Fut,
    Fut: Future<Output = S>,
{
    let source = factory().await;
    let result = source
        .update(
            &CollectionName::from(names::APPEALS),
            &RecordId::from("no-such-row"),
            serde_json::json!({"status": "resolved"}),
        )
        .await;
    match result {
        Err(_) => Ok(()),
        Ok(()) => Err("update of a missing row succeeded".to_string()),
    }
}
