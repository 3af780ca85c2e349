//! Tests for the in-memory document store.

use serde_json::json;

use crate::db::document::MemoryStore;
use crate::db::repository::DocumentBackend;
use crate::db::{Filter, FindOrder, Project};

fn project(id: &str, title: &str) -> Project {
    let mut p = Project::new(title, "infrastructure");
    p.id = id.to_string();
    p
}

#[test]
fn seed_appends_in_insertion_order() {
    let store = MemoryStore::new();
    store.seed("projects", json!({"_id": "1"}));
    store.seed("projects", json!({"_id": "2"}));

    let ids: Vec<_> = store
        .all("projects")
        .iter()
        .map(|r| r["_id"].clone())
        .collect();
    assert_eq!(ids, vec![json!("1"), json!("2")]);
    assert_eq!(store.len("projects"), 2);
    assert!(store.is_empty("sectors"));
}

#[test]
fn identity_lookup_is_string_normalised() {
    let store = MemoryStore::new();
    store.seed("projects", json!({"_id": 42, "title": "numeric"}));
    store.seed("projects", json!({"_id": "43", "title": "textual"}));

    assert_eq!(
        store.find_by_identity("projects", "42").unwrap()["title"],
        "numeric"
    );
    assert_eq!(
        store.find_by_identity("projects", "43").unwrap()["title"],
        "textual"
    );
    assert!(store.find_by_identity("projects", "44").is_none());
}

#[test]
fn find_first_uses_exact_equality_and_first_match_wins() {
    let store = MemoryStore::new();
    store.seed("users", json!({"_id": "1", "username": "admin", "tag": "a"}));
    store.seed("users", json!({"_id": "2", "username": "admin", "tag": "b"}));

    let found = store
        .find_first("users", "username", &json!("admin"))
        .unwrap();
    assert_eq!(found["tag"], "a");
    assert!(store.find_first("users", "username", &json!("Admin")).is_none());
}

#[test]
fn remove_by_identity_drops_matching_records() {
    let store = MemoryStore::new();
    store.seed("contacts", json!({"_id": 7}));
    store.seed("contacts", json!({"_id": "8"}));

    assert_eq!(store.remove_by_identity("contacts", "7"), 1);
    assert_eq!(store.remove_by_identity("contacts", "7"), 0);
    assert_eq!(store.len("contacts"), 1);
    assert_eq!(store.remove_by_identity("missing", "1"), 0);
}

#[test]
fn replace_by_identity_keeps_position() {
    let store = MemoryStore::new();
    store.seed("sectors", json!({"_id": "1", "title": "old"}));
    store.seed("sectors", json!({"_id": "2", "title": "other"}));

    assert!(store.replace_by_identity("sectors", "1", json!({"_id": "1", "title": "new"})));
    assert!(!store.replace_by_identity("sectors", "9", json!({"_id": "9"})));

    let all = store.all("sectors");
    assert_eq!(all[0]["title"], "new");
    assert_eq!(all.len(), 2);
}

#[test]
fn clones_share_the_same_collections() {
    let store = MemoryStore::new();
    let clone = store.clone();
    clone.seed("projects", json!({"_id": "1"}));
    assert_eq!(store.len("projects"), 1);

    store.clear();
    assert!(clone.is_empty("projects"));
}

#[tokio::test]
async fn backend_find_reverses_insertion_order_and_ignores_filter() {
    let store = MemoryStore::new();
    for (id, title) in [("1", "first"), ("2", "second"), ("3", "third")] {
        store.insert(&project(id, title)).await.unwrap();
    }

    let newest: Vec<Project> = store
        .find(&Filter::new().eq("title", "second"), FindOrder::NewestFirst)
        .await
        .unwrap();
    let titles: Vec<_> = newest.iter().map(|p| p.title.as_str()).collect();
    assert_eq!(titles, vec!["third", "second", "first"]);

    let oldest: Vec<Project> = store
        .find(&Filter::new(), FindOrder::OldestFirst)
        .await
        .unwrap();
    assert_eq!(oldest[0].title, "first");
}

#[tokio::test]
async fn backend_find_one_without_conditions_returns_oldest_record() {
    let store = MemoryStore::new();
    let empty: Option<Project> = store.find_one(&Filter::new()).await.unwrap();
    assert!(empty.is_none());

    store.insert(&project("1", "first")).await.unwrap();
    store.insert(&project("2", "second")).await.unwrap();

    let found: Option<Project> = store.find_one(&Filter::new()).await.unwrap();
    assert_eq!(found.unwrap().title, "first");
}

#[tokio::test]
async fn backend_count_and_delete() {
    let store = MemoryStore::new();
    store.insert(&project("1", "a")).await.unwrap();
    store.insert(&project("2", "b")).await.unwrap();
    assert_eq!(store.count::<Project>().await.unwrap(), 2);

    store.delete::<Project>("1").await.unwrap();
    assert_eq!(store.count::<Project>().await.unwrap(), 1);
    let gone: Option<Project> = store.find_by_id("1").await.unwrap();
    assert!(gone.is_none());
}

#[tokio::test]
async fn malformed_record_surfaces_invalid_data() {
    let store = MemoryStore::new();
    store.seed("projects", json!({"_id": "1"}));

    let result: Result<Option<Project>, _> = store.find_by_id("1").await;
    assert!(matches!(
        result,
        Err(crate::db::DbError::InvalidData { .. })
    ));
}
