//! End-to-end tests for the HTTP record store and its change channel.

mod common;

use std::sync::Arc;
use std::time::Duration;

use chrono::Utc;
use tokio::sync::mpsc;
use tokio::time::timeout;

use teamforge::changes::{ChangeEvent, ChangeKind};
use teamforge::client::{ChangeHandler, RecordStore};
use teamforge::error::Error;
use teamforge::roster::RosterView;
use teamforge::types::{Attributes, Category, CrewMemberPayload, Role};

const WAIT: Duration = Duration::from_secs(5);

fn payload(name: &str, category: Category, role: Option<Role>, skills: &[&str]) -> CrewMemberPayload {
    CrewMemberPayload {
        name: name.to_string(),
        category,
        attributes: Attributes {
            role,
            skills: skills.iter().map(|s| (*s).to_string()).collect(),
            level: None,
            notes: None,
        },
        updated_at: Utc::now(),
    }
}

fn forwarding_handler() -> (ChangeHandler, mpsc::UnboundedReceiver<ChangeEvent>) {
    let (tx, rx) = mpsc::unbounded_channel();
    let handler: ChangeHandler = Arc::new(move |event: ChangeEvent| {
        let _ = tx.send(event);
    });
    (handler, rx)
}

#[tokio::test(flavor = "multi_thread")]
async fn test_crud_round_trip() {
    let server = common::TestServer::start().await;
    let store = server.client();

    let mut input = payload("Nova", Category::Space, Some(Role::Pilot), &["Piloting", "Combat"]);
    input.attributes.level = Some("Officer".to_string());
    input.attributes.notes = Some("Flies anything".to_string());
    let created = store.insert(&input).await.expect("insert");

    assert!(!created.id.is_empty());
    assert_eq!(created.name, "Nova");
    assert_eq!(created.category, Category::Space);
    assert_eq!(created.attributes, input.attributes);

    let fetched = store
        .get_by_id(&created.id)
        .await
        .expect("get")
        .expect("present");
    assert_eq!(fetched, created);

    let listed = store.list_all().await.expect("list");
    assert_eq!(listed, vec![created.clone()]);

    let mut changed = input.clone();
    changed.name = "Nova Prime".to_string();
    changed.category = Category::Pirate;
    changed.attributes.skills = vec!["Navigation".to_string()];
    let updated = store.update(&created.id, &changed).await.expect("update");
    assert_eq!(updated.id, created.id);
    assert_eq!(updated.created_at, created.created_at);
    assert_eq!(updated.name, "Nova Prime");
    assert_eq!(updated.category, Category::Pirate);

    store.delete(&created.id).await.expect("delete");
    assert!(store.get_by_id(&created.id).await.expect("get").is_none());
    assert!(store.list_all().await.expect("list").is_empty());
}

#[tokio::test(flavor = "multi_thread")]
async fn test_listing_is_newest_first() {
    let server = common::TestServer::start().await;
    let store = server.client();

    for name in ["First", "Second", "Third"] {
        store
            .insert(&payload(name, Category::Dev, Some(Role::Engineer), &[]))
            .await
            .expect("insert");
    }

    let names: Vec<String> = store
        .list_all()
        .await
        .expect("list")
        .into_iter()
        .map(|m| m.name)
        .collect();
    assert_eq!(names, ["Third", "Second", "First"]);
}

#[tokio::test(flavor = "multi_thread")]
async fn test_server_rejects_invalid_payloads() {
    let server = common::TestServer::start().await;
    let store = server.client();

    let err = store
        .insert(&payload("Nova", Category::Space, None, &[]))
        .await
        .unwrap_err();
    assert!(err.to_string().contains("missing role"), "{err}");

    let err = store
        .insert(&payload("  ", Category::Space, Some(Role::Pilot), &[]))
        .await
        .unwrap_err();
    assert!(err.to_string().contains("missing name"), "{err}");

    let err = store
        .insert(&payload("Nova", Category::from("Wizard"), Some(Role::Pilot), &[]))
        .await
        .unwrap_err();
    assert!(err.to_string().contains("unknown category"), "{err}");

    let err = store
        .insert(&payload("Nova", Category::Dev, Some(Role::Pilot), &["React", "React"]))
        .await
        .unwrap_err();
    assert!(err.to_string().contains("duplicate skill"), "{err}");

    assert!(store.list_all().await.expect("list").is_empty());
}

#[tokio::test(flavor = "multi_thread")]
async fn test_update_missing_is_not_found() {
    let server = common::TestServer::start().await;
    let store = server.client();

    let err = store
        .update("missing", &payload("Nova", Category::Dev, Some(Role::Scout), &[]))
        .await
        .unwrap_err();
    assert!(matches!(err, Error::NotFound), "{err}");
}

#[tokio::test(flavor = "multi_thread")]
async fn test_delete_is_idempotent() {
    let server = common::TestServer::start().await;
    let store = server.client();

    let created = store
        .insert(&payload("Nova", Category::Dev, Some(Role::Scout), &[]))
        .await
        .expect("insert");

    store.delete(&created.id).await.expect("first delete");
    store.delete(&created.id).await.expect("second delete");
    store.delete("never-existed").await.expect("unknown id");
}

#[tokio::test(flavor = "multi_thread")]
async fn test_subscription_sees_every_write() {
    let server = common::TestServer::start().await;
    let listener = server.client();
    let writer = server.client();

    let (handler, mut rx) = forwarding_handler();
    let subscription = listener
        .subscribe_to_changes(handler)
        .await
        .expect("subscribe");
    assert!(subscription.is_active());

    let created = writer
        .insert(&payload("Nova", Category::Space, Some(Role::Pilot), &[]))
        .await
        .expect("insert");
    let event = timeout(WAIT, rx.recv()).await.expect("insert event").expect("open");
    assert_eq!(event.kind, ChangeKind::Insert);
    assert_eq!(event.id.as_deref(), Some(created.id.as_str()));

    writer
        .update(&created.id, &payload("Nova", Category::Space, Some(Role::Leader), &[]))
        .await
        .expect("update");
    let event = timeout(WAIT, rx.recv()).await.expect("update event").expect("open");
    assert_eq!(event.kind, ChangeKind::Update);

    writer.delete(&created.id).await.expect("delete");
    let event = timeout(WAIT, rx.recv()).await.expect("delete event").expect("open");
    assert_eq!(event.kind, ChangeKind::Delete);

    // Deleting a missing row changes nothing and announces nothing.
    writer.delete(&created.id).await.expect("delete again");

    subscription.dispose();
    writer
        .insert(&payload("Late", Category::Dev, Some(Role::Medic), &[]))
        .await
        .expect("insert after dispose");
    let late = timeout(Duration::from_millis(300), rx.recv()).await;
    assert!(!matches!(late, Ok(Some(_))), "got {late:?}");
}

#[tokio::test(flavor = "multi_thread")]
async fn test_roster_view_follows_remote_writes() {
    let server = common::TestServer::start().await;
    let writer = server.client();

    let mut view = RosterView::new(Arc::new(server.client()));
    view.activate().await.expect("activate");
    assert_eq!(view.total(), 0);

    writer
        .insert(&payload("Nova", Category::Space, Some(Role::Pilot), &[]))
        .await
        .expect("insert");
    assert!(timeout(WAIT, view.sync_once()).await.expect("change arrives"));
    assert_eq!(view.total(), 1);
    assert_eq!(view.members()[0].name, "Nova");

    view.deactivate();
    assert!(!view.is_active());
    assert!(!view.sync_once().await);
}
