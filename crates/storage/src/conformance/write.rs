use std::future::Future;

use super::{ids, make_document, TestResult};
use crate::{Collection, Document, DocumentStore, Filter, FindOptions, StorageError};

pub(super) async fn run_write_tests<S, F, Fut>(factory: &F) -> Vec<TestResult>
where
    S: DocumentStore,
    F: Fn() -> Fut,
    Fut: Future<Output = S>,
{
    vec![
        TestResult::from_result(
            "write",
            "replace_or_insert_inserts_when_absent",
            replace_or_insert_inserts_when_absent(factory).await,
        ),
        TestResult::from_result(
            "write",
            "replace_or_insert_replaces_existing",
            replace_or_insert_replaces_existing(factory).await,
        ),
        TestResult::from_result(
            "write",
            "update_fields_overwrites_only_given_fields",
            update_fields_overwrites_only_given_fields(factory).await,
        ),
        TestResult::from_result(
            "write",
            "update_fields_never_rewrites_id",
            update_fields_never_rewrites_id(factory).await,
        ),
        TestResult::from_result(
            "write",
            "update_fields_on_unknown_id_is_not_found",
            update_fields_on_unknown_id_is_not_found(factory).await,
        ),
    ]
}

async fn replace_or_insert_inserts_when_absent<S, F, Fut>(factory: &F) -> Result<(), String>
where
    S: DocumentStore,
    F: Fn() -> Fut,
    Fut: Future<Output = S>,
{
    let s = factory().await;
    s.replace_or_insert(
        Collection::IntegrationSettings,
        "cfg-1",
        make_document("cfg-1", "2026-03-01T00:00:00Z", "active"),
    )
    .await
    .map_err(|e| e.to_string())?;
    let count = s
        .count_matching(Collection::IntegrationSettings, &Filter::new())
        .await
        .map_err(|e| e.to_string())?;
    if count != 1 {
        return Err(format!("expected 1 document, got {}", count));
    }
    Ok(())
}

async fn replace_or_insert_replaces_existing<S, F, Fut>(factory: &F) -> Result<(), String>
where
    S: DocumentStore,
    F: Fn() -> Fut,
    Fut: Future<Output = S>,
{
    let s = factory().await;
    for status in ["draft", "final"] {
        s.replace_or_insert(
            Collection::AiInsights,
            "ins-1",
            make_document("ins-1", "2026-03-01T00:00:00Z", status),
        )
        .await
        .map_err(|e| e.to_string())?;
    }
    let found = s
        .find(Collection::AiInsights, &Filter::new(), &FindOptions::default())
        .await
        .map_err(|e| e.to_string())?;
    if found.len() != 1 {
        return Err(format!("expected a single document, got {:?}", ids(&found)));
    }
    if found[0].get("status") != Some(&serde_json::json!("final")) {
        return Err(format!("expected replaced status, got {:?}", found[0]));
    }
    Ok(())
}

async fn update_fields_overwrites_only_given_fields<S, F, Fut>(factory: &F) -> Result<(), String>
where
    S: DocumentStore,
    F: Fn() -> Fut,
    Fut: Future<Output = S>,
{
    let s = factory().await;
    s.insert(
        Collection::Tickets,
        make_document("t-1", "2026-03-01T00:00:00Z", "To Do"),
    )
    .await
    .map_err(|e| e.to_string())?;

    let mut fields = Document::new();
    fields.insert("status".to_string(), serde_json::json!("In Progress"));
    let updated = s
        .update_fields(Collection::Tickets, "t-1", fields)
        .await
        .map_err(|e| e.to_string())?;

    if updated.get("status") != Some(&serde_json::json!("In Progress")) {
        return Err(format!("status not updated: {:?}", updated));
    }
    if updated.get("timestamp") != Some(&serde_json::json!("2026-03-01T00:00:00Z")) {
        return Err(format!("untouched field changed: {:?}", updated));
    }
    let stored = s
        .find_one(Collection::Tickets, &Filter::by_id("t-1"))
        .await
        .map_err(|e| e.to_string())?
        .ok_or_else(|| "updated ticket disappeared".to_string())?;
    if stored != updated {
        return Err("returned document differs from stored document".to_string());
    }
    Ok(())
}

async fn update_fields_never_rewrites_id<S, F, Fut>(factory: &F) -> Result<(), String>
where
    S: DocumentStore,
    F: Fn() -> Fut,
    Fut: Future<Output = S>,
{
    let s = factory().await;
    s.insert(
        Collection::Tickets,
        make_document("t-1", "2026-03-01T00:00:00Z", "To Do"),
    )
    .await
    .map_err(|e| e.to_string())?;

    let mut fields = Document::new();
    fields.insert("id".to_string(), serde_json::json!("hijacked"));
    let updated = s
        .update_fields(Collection::Tickets, "t-1", fields)
        .await
        .map_err(|e| e.to_string())?;
    if updated.get("id") != Some(&serde_json::json!("t-1")) {
        return Err(format!("id was rewritten: {:?}", updated.get("id")));
    }
    Ok(())
}

async fn update_fields_on_unknown_id_is_not_found<S, F, Fut>(factory: &F) -> Result<(), String>
where
    S: DocumentStore,
    F: Fn() -> Fut,
    Fut: Future<Output = S>,
{
    let s = factory().await;
    match s
        .update_fields(Collection::Tickets, "t-missing", Document::new())
        .await
    {
        Err(StorageError::NotFound { id, .. }) if id == "t-missing" => Ok(()),
        other => Err(format!("expected NotFound, got {:?}", other)),
    }
}
