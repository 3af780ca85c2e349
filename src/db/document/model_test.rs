//! Tests for the hybrid document models in fallback mode.

use serde_json::json;

use crate::db::document::{DocumentConnection, MemoryStore, Models};
use crate::db::{Contact, Filter, FindOrder, HASH_MARKER, Project, Sector, StoreMode, User};

fn fallback_models() -> Models {
    Models::new(DocumentConnection::disconnected())
}

#[tokio::test]
async fn disconnected_models_run_in_fallback_mode() {
    let models = fallback_models();
    assert_eq!(models.mode(), StoreMode::Fallback);
    assert_eq!(models.projects.mode(), StoreMode::Fallback);
}

#[tokio::test]
async fn create_assigns_identity_and_timestamp() {
    let models = fallback_models();
    let before = chrono::Utc::now();

    let project = models
        .projects
        .create(Project::new("Bridge", "infrastructure"))
        .await
        .unwrap();

    assert!(!project.id.is_empty());
    assert!(!project.is_new());
    assert!(project.created_at >= before);
}

#[tokio::test]
async fn new_doc_is_unsaved_until_save() {
    let models = fallback_models();
    let mut doc = models.sectors.new_doc(Sector::new("Energy", "industry"));
    assert!(doc.is_new());
    assert_eq!(models.sectors.count_documents().await.unwrap(), 0);

    doc.save().await.unwrap();
    assert!(!doc.is_new());
    assert_eq!(models.sectors.count_documents().await.unwrap(), 1);
}

#[tokio::test]
async fn find_returns_reverse_insertion_order() {
    let models = fallback_models();
    for title in ["first", "second", "third"] {
        models
            .projects
            .create(Project::new(title, "infrastructure"))
            .await
            .unwrap();
    }

    let found = models.projects.find(Filter::new()).await.unwrap();
    let titles: Vec<_> = found.iter().map(|p| p.title.clone()).collect();
    assert_eq!(titles, vec!["third", "second", "first"]);
}

#[tokio::test]
async fn find_sort_oldest_first_keeps_insertion_order() {
    let models = fallback_models();
    for title in ["a", "b"] {
        models
            .contacts
            .create(Contact::new(title, "x@example.com", "hello"))
            .await
            .unwrap();
    }

    let found = models
        .contacts
        .find(Filter::new())
        .sort(FindOrder::OldestFirst)
        .exec()
        .await
        .unwrap();
    assert_eq!(found[0].name, "a");
    assert_eq!(found[1].name, "b");
}

#[tokio::test]
async fn find_is_resolved_when_awaited_not_when_built() {
    let models = fallback_models();
    let query = models.projects.find(Filter::new());

    models
        .projects
        .create(Project::new("late", "infrastructure"))
        .await
        .unwrap();

    let found = query.await.unwrap();
    assert_eq!(found.len(), 1);
    assert_eq!(found[0].title, "late");
}

#[tokio::test]
async fn find_by_id_matches_numeric_and_textual_identities() {
    let memory = MemoryStore::new();
    memory.seed(
        "projects",
        json!({"_id": 42, "title": "numeric", "category": "c", "createdAt": 0}),
    );
    let models = Models::with_memory(DocumentConnection::disconnected(), memory);

    let by_number = models.projects.find_by_id(42).await.unwrap().unwrap();
    let by_text = models.projects.find_by_id("42").await.unwrap().unwrap();
    assert_eq!(by_number.title, "numeric");
    assert_eq!(by_text.id, "42");
}

#[tokio::test]
async fn find_by_id_accepts_generated_identity_in_either_form() {
    let models = fallback_models();
    let created = models
        .projects
        .create(Project::new("Dam", "water"))
        .await
        .unwrap();
    let numeric: u64 = created.id.parse().unwrap();

    assert!(models.projects.find_by_id(numeric).await.unwrap().is_some());
    assert!(models.projects.find_by_id(&created.id).await.unwrap().is_some());
}

#[tokio::test]
async fn find_by_id_of_unknown_identity_is_none() {
    let models = fallback_models();
    assert!(models.sectors.find_by_id("missing").await.unwrap().is_none());
}

#[tokio::test]
async fn user_secret_is_hashed_on_save_and_matches() {
    let models = fallback_models();
    let user = models
        .users
        .create(User::new("admin", "metamax2025"))
        .await
        .unwrap();

    assert!(user.password.starts_with(HASH_MARKER));
    assert!(user.match_secret("metamax2025"));
    assert!(!user.match_secret("wrong"));

    let found = models
        .users
        .find_one(&Filter::new().eq("username", "admin"))
        .await
        .unwrap()
        .unwrap();
    assert!(found.match_secret("metamax2025"));
}

#[tokio::test]
async fn saving_again_does_not_rehash() {
    let models = fallback_models();
    let mut user = models
        .users
        .create(User::new("editor", "s3cret"))
        .await
        .unwrap();
    let first_hash = user.password.clone();

    user.save().await.unwrap();
    assert_eq!(user.password, first_hash);
    assert!(user.match_secret("s3cret"));
}

#[tokio::test]
async fn changed_plaintext_is_hashed_on_resave() {
    let models = fallback_models();
    let mut user = models
        .users
        .create(User::new("editor", "old"))
        .await
        .unwrap();

    user.password = "new".to_string();
    user.save().await.unwrap();

    let stored = models.users.find_by_id(&user.id).await.unwrap().unwrap();
    assert!(stored.match_secret("new"));
    assert!(!stored.match_secret("old"));
}

#[tokio::test]
async fn saving_a_persisted_doc_replaces_it() {
    let models = fallback_models();
    let mut project = models
        .projects
        .create(Project::new("Draft", "infrastructure"))
        .await
        .unwrap();

    project.title = "Final".to_string();
    project.save().await.unwrap();

    assert_eq!(models.projects.count_documents().await.unwrap(), 1);
    let stored = models
        .projects
        .find_by_id(&project.id)
        .await
        .unwrap()
        .unwrap();
    assert_eq!(stored.title, "Final");
}

#[tokio::test]
async fn delete_then_find_by_id_is_none() {
    let models = fallback_models();
    let mut sector = models
        .sectors
        .create(Sector::new("Mining", "industry"))
        .await
        .unwrap();

    sector.delete_one().await.unwrap();
    assert!(models.sectors.find_by_id(&sector.id).await.unwrap().is_none());
    assert_eq!(models.sectors.count_documents().await.unwrap(), 0);
}

#[tokio::test]
async fn saving_after_delete_inserts_again() {
    let models = fallback_models();
    let mut sector = models
        .sectors
        .create(Sector::new("Energy", "industry"))
        .await
        .unwrap();

    sector.delete_one().await.unwrap();
    assert!(sector.is_new());

    sector.save().await.unwrap();
    assert!(!sector.is_new());
    assert_eq!(models.sectors.count_documents().await.unwrap(), 1);
    let stored = models.sectors.find_by_id(&sector.id).await.unwrap().unwrap();
    assert_eq!(stored.title, "Energy");
}

#[tokio::test]
async fn find_one_without_conditions_returns_first_record() {
    let models = fallback_models();
    models
        .projects
        .create(Project::new("only", "c"))
        .await
        .unwrap();

    let found = models.projects.find_one(&Filter::new()).await.unwrap();
    assert_eq!(found.unwrap().title, "only");
}

#[tokio::test]
async fn find_one_matches_only_on_first_condition() {
    let models = fallback_models();
    models
        .contacts
        .create(Contact::new("Ana", "ana@example.com", "hi"))
        .await
        .unwrap();

    let found = models
        .contacts
        .find_one(&Filter::new().eq("name", "Ana").eq("email", "other@example.com"))
        .await
        .unwrap();
    assert!(found.is_some());
}

#[tokio::test]
async fn kinds_are_kept_in_separate_collections() {
    let models = fallback_models();
    models
        .projects
        .create(Project::new("P", "c"))
        .await
        .unwrap();

    assert_eq!(models.projects.count_documents().await.unwrap(), 1);
    assert_eq!(models.sectors.count_documents().await.unwrap(), 0);
    assert_eq!(models.users.count_documents().await.unwrap(), 0);
}
