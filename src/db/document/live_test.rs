//! Round-trip tests against a real MongoDB server.
//!
//! Enabled with `--features mongo-tests`; the server is taken from
//! `METAMAX_TEST_MONGO_URI` (default `mongodb://127.0.0.1:27017`).

use std::time::Duration;

use serial_test::serial;

use crate::db::document::{DocumentConnection, MemoryStore, Models, ReadyState};
use crate::db::{Contact, Filter, Project, Sector, StoreMode, User};

const TEST_DATABASE: &str = "metamax_test";

async fn live_models() -> (DocumentConnection, Models) {
    let uri = std::env::var("METAMAX_TEST_MONGO_URI")
        .unwrap_or_else(|_| "mongodb://127.0.0.1:27017".to_string());
    let connection = DocumentConnection::connect(&uri, TEST_DATABASE, Duration::from_secs(2)).await;
    assert_eq!(connection.ready_state(), ReadyState::Connected);

    let db = connection.live().unwrap();
    db.drop().await.unwrap();

    let models = Models::new(connection.clone());
    (connection, models)
}

#[tokio::test]
#[serial]
async fn projects_round_trip() {
    let (_connection, models) = live_models().await;
    assert_eq!(models.mode(), StoreMode::Live);

    let created = models
        .projects
        .create(Project::new("Bridge", "infrastructure"))
        .await
        .unwrap();
    let found = models
        .projects
        .find_by_id(&created.id)
        .await
        .unwrap()
        .unwrap();
    assert_eq!(found.title, "Bridge");
}

#[tokio::test]
#[serial]
async fn find_filters_and_sorts_newest_first() {
    let (_connection, models) = live_models().await;
    for title in ["a", "b"] {
        let mut sector = Sector::new(title, "industry");
        sector.is_visible = title == "b";
        models.sectors.create(sector).await.unwrap();
        tokio::time::sleep(Duration::from_millis(5)).await;
    }
    models.sectors.create(Sector::new("c", "industry")).await.unwrap();

    let all = models.sectors.find(Filter::new()).await.unwrap();
    let titles: Vec<_> = all.iter().map(|s| s.title.clone()).collect();
    assert_eq!(titles, vec!["c", "b", "a"]);

    let visible = models
        .sectors
        .find(Filter::new().eq("isVisible", true))
        .await
        .unwrap();
    assert_eq!(visible.len(), 2);
}

#[tokio::test]
#[serial]
async fn users_and_contacts_round_trip() {
    let (_connection, models) = live_models().await;

    models
        .users
        .create(User::new("admin", "metamax2025"))
        .await
        .unwrap();
    let user = models
        .users
        .find_one(&Filter::new().eq("username", "admin"))
        .await
        .unwrap()
        .unwrap();
    assert!(user.match_secret("metamax2025"));

    let mut contact = models
        .contacts
        .create(Contact::new("Ana", "ana@example.com", "hello"))
        .await
        .unwrap();
    assert_eq!(models.contacts.count_documents().await.unwrap(), 1);
    contact.delete_one().await.unwrap();
    assert_eq!(models.contacts.count_documents().await.unwrap(), 0);
}

#[tokio::test]
#[serial]
async fn models_switch_delegate_when_the_connection_changes() {
    let uri = std::env::var("METAMAX_TEST_MONGO_URI")
        .unwrap_or_else(|_| "mongodb://127.0.0.1:27017".to_string());
    let connection = DocumentConnection::connect(&uri, TEST_DATABASE, Duration::from_secs(2)).await;
    let memory = MemoryStore::new();
    let models = Models::with_memory(connection.clone(), memory.clone());
    assert_eq!(models.mode(), StoreMode::Live);

    connection.disconnect();
    assert_eq!(models.mode(), StoreMode::Fallback);
    models
        .projects
        .create(Project::new("offline", "c"))
        .await
        .unwrap();
    assert_eq!(memory.len("projects"), 1);

    assert!(connection.reconnect().await);
    assert_eq!(models.mode(), StoreMode::Live);
}
