use std::future::Future;

use super::{ids, make_document, TestResult};
use crate::{Collection, DocumentStore, Filter, FindOptions};

pub(super) async fn run_find_tests<S, F, Fut>(factory: &F) -> Vec<TestResult>
where
    S: DocumentStore,
    F: Fn() -> Fut,
    Fut: Future<Output = S>,
{
    vec![
        TestResult::from_result(
            "find",
            "find_on_empty_collection_returns_nothing",
            find_on_empty_collection_returns_nothing(factory).await,
        ),
        TestResult::from_result(
            "find",
            "find_without_sort_keeps_insertion_order",
            find_without_sort_keeps_insertion_order(factory).await,
        ),
        TestResult::from_result(
            "find",
            "find_newest_first_orders_by_timestamp",
            find_newest_first_orders_by_timestamp(factory).await,
        ),
        TestResult::from_result(
            "find",
            "find_respects_limit",
            find_respects_limit(factory).await,
        ),
        TestResult::from_result(
            "find",
            "find_applies_equality_filter",
            find_applies_equality_filter(factory).await,
        ),
        TestResult::from_result(
            "find",
            "find_one_returns_first_match",
            find_one_returns_first_match(factory).await,
        ),
        TestResult::from_result(
            "find",
            "count_matching_honours_filter",
            count_matching_honours_filter(factory).await,
        ),
    ]
}

async fn seeded<S, F, Fut>(factory: &F) -> Result<S, String>
where
    S: DocumentStore,
    F: Fn() -> Fut,
    Fut: Future<Output = S>,
{
    let s = factory().await;
    let docs = [
        ("t-1", "2026-03-01T09:00:00Z", "To Do"),
        ("t-2", "2026-03-03T09:00:00Z", "Done"),
        ("t-3", "2026-03-02T09:00:00Z", "To Do"),
    ];
    for (id, ts, status) in docs {
        s.insert(Collection::Tickets, make_document(id, ts, status))
            .await
            .map_err(|e| e.to_string())?;
    }
    Ok(s)
}

async fn find_on_empty_collection_returns_nothing<S, F, Fut>(factory: &F) -> Result<(), String>
where
    S: DocumentStore,
    F: Fn() -> Fut,
    Fut: Future<Output = S>,
{
    let s = factory().await;
    let found = s
        .find(Collection::Standups, &Filter::new(), &FindOptions::default())
        .await
        .map_err(|e| e.to_string())?;
    if !found.is_empty() {
        return Err(format!("expected no documents, got {}", found.len()));
    }
    Ok(())
}

async fn find_without_sort_keeps_insertion_order<S, F, Fut>(factory: &F) -> Result<(), String>
where
    S: DocumentStore,
    F: Fn() -> Fut,
    Fut: Future<Output = S>,
{
    let s = seeded(factory).await?;
    let found = s
        .find(Collection::Tickets, &Filter::new(), &FindOptions::default())
        .await
        .map_err(|e| e.to_string())?;
    let got = ids(&found);
    if got != ["t-1", "t-2", "t-3"] {
        return Err(format!("expected insertion order, got {:?}", got));
    }
    Ok(())
}

async fn find_newest_first_orders_by_timestamp<S, F, Fut>(factory: &F) -> Result<(), String>
where
    S: DocumentStore,
    F: Fn() -> Fut,
    Fut: Future<Output = S>,
{
    let s = seeded(factory).await?;
    let found = s
        .find(
            Collection::Tickets,
            &Filter::new(),
            &FindOptions::newest_first("timestamp", 0),
        )
        .await
        .map_err(|e| e.to_string())?;
    let got = ids(&found);
    if got != ["t-2", "t-3", "t-1"] {
        return Err(format!("expected newest first, got {:?}", got));
    }
    Ok(())
}

async fn find_respects_limit<S, F, Fut>(factory: &F) -> Result<(), String>
where
    S: DocumentStore,
    F: Fn() -> Fut,
    Fut: Future<Output = S>,
{
    let s = seeded(factory).await?;
    let found = s
        .find(
            Collection::Tickets,
            &Filter::new(),
            &FindOptions::newest_first("timestamp", 2),
        )
        .await
        .map_err(|e| e.to_string())?;
    let got = ids(&found);
    if got != ["t-2", "t-3"] {
        return Err(format!("expected the two newest documents, got {:?}", got));
    }
    Ok(())
}

async fn find_applies_equality_filter<S, F, Fut>(factory: &F) -> Result<(), String>
where
    S: DocumentStore,
    F: Fn() -> Fut,
    Fut: Future<Output = S>,
{
    let s = seeded(factory).await?;
    let found = s
        .find(
            Collection::Tickets,
            &Filter::new().eq("status", "To Do"),
            &FindOptions::newest_first("timestamp", 10),
        )
        .await
        .map_err(|e| e.to_string())?;
    let got = ids(&found);
    if got != ["t-3", "t-1"] {
        return Err(format!("expected filtered To Do tickets, got {:?}", got));
    }
    Ok(())
}

async fn find_one_returns_first_match<S, F, Fut>(factory: &F) -> Result<(), String>
where
    S: DocumentStore,
    F: Fn() -> Fut,
    Fut: Future<Output = S>,
{
    let s = seeded(factory).await?;
    let found = s
        .find_one(Collection::Tickets, &Filter::by_id("t-3"))
        .await
        .map_err(|e| e.to_string())?;
    match found {
        Some(doc) if doc.get("status") == Some(&serde_json::json!("To Do")) => {}
        other => return Err(format!("expected t-3, got {:?}", other)),
    }
    let missing = s
        .find_one(Collection::Tickets, &Filter::by_id("t-404"))
        .await
        .map_err(|e| e.to_string())?;
    if missing.is_some() {
        return Err("expected None for unknown id".to_string());
    }
    Ok(())
}

async fn count_matching_honours_filter<S, F, Fut>(factory: &F) -> Result<(), String>
where
    S: DocumentStore,
    F: Fn() -> Fut,
    Fut: Future<Output = S>,
{
    let s = seeded(factory).await?;
    let all = s
        .count_matching(Collection::Tickets, &Filter::new())
        .await
        .map_err(|e| e.to_string())?;
    let done = s
        .count_matching(Collection::Tickets, &Filter::new().eq("status", "Done"))
        .await
        .map_err(|e| e.to_string())?;
    if all != 3 || done != 1 {
        return Err(format!("expected counts (3, 1), got ({}, {})", all, done));
    }
    Ok(())
}
