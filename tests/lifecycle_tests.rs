//! # Lifecycle Helper Integration Tests
//!
//! These tests verify:
//! - Finalizer add is idempotent and remove tolerates deleted resources
//! - Finalizer removal still reports conflicts
//! - The initializer never overwrites an external name
//! - Connection details are published to a secret the resource controls
//! - Publishing refuses secrets controlled by another resource

mod common;

use common::{database, payload, secret, uid_of, Database, FINALIZER};
use k8s_openapi::api::core::v1::Secret;
use managed_runtime::config::ControllerConfig;
use managed_runtime::constants::SECRET_TYPE_CONNECTION;
use managed_runtime::error::ErrorKind;
use managed_runtime::managed::{
    ApiFinalizer, ApiSecretPublisher, ConnectionDetails, ConnectionPublisher, Finalizer,
    Initializer, NameAsExternalName, NopConnectionPublisher, NopFinalizer, NopInitializer,
};
use managed_runtime::meta;
use managed_runtime::resource::{MemoryStore, ObjectKey, Verb};

fn db_key() -> ObjectKey {
    ObjectKey::new("infra", "db-1")
}

fn creds_key() -> ObjectKey {
    ObjectKey::new("infra", "creds")
}

fn details(pairs: &[(&str, &str)]) -> ConnectionDetails {
    pairs
        .iter()
        .map(|(k, v)| ((*k).to_string(), v.as_bytes().to_vec()))
        .collect()
}

#[tokio::test]
async fn test_add_finalizer_twice_writes_once() {
    let store = MemoryStore::new();
    let mut db = store.insert(&database("db-1", Some("creds"))).unwrap();
    let finalizer = ApiFinalizer::new(store.clone(), FINALIZER);

    finalizer.add_finalizer(&mut db).await.unwrap();
    finalizer.add_finalizer(&mut db).await.unwrap();

    assert_eq!(store.writes().len(), 1);
    let stored: Database = store.stored(&db_key()).unwrap();
    assert_eq!(stored.metadata.finalizers, Some(vec![FINALIZER.to_string()]));
}

#[tokio::test]
async fn test_finalizer_gates_deletion_until_removed() {
    let store = MemoryStore::new();
    let mut db = store.insert(&database("db-1", Some("creds"))).unwrap();
    let finalizer = ApiFinalizer::from_config(
        store.clone(),
        &ControllerConfig {
            finalizer: FINALIZER.to_string(),
            ..ControllerConfig::default()
        },
    );
    finalizer.add_finalizer(&mut db).await.unwrap();

    store.delete::<Database>(&db_key());
    let mut db: Database = store.stored(&db_key()).unwrap();
    assert!(db.metadata.deletion_timestamp.is_some());

    finalizer.remove_finalizer(&mut db).await.unwrap();
    assert!(store.stored::<Database>(&db_key()).is_none());

    // The resource is gone; removing again still succeeds.
    finalizer.remove_finalizer(&mut db).await.unwrap();
}

#[tokio::test]
async fn test_remove_finalizer_keeps_other_controllers_tokens() {
    let store = MemoryStore::new();
    let mut db = database("db-1", Some("creds"));
    meta::add_finalizer(&mut db, FINALIZER);
    meta::add_finalizer(&mut db, "finalizer.backup.example.org");
    let mut db = store.insert(&db).unwrap();

    ApiFinalizer::new(store.clone(), FINALIZER)
        .remove_finalizer(&mut db)
        .await
        .unwrap();

    let stored: Database = store.stored(&db_key()).unwrap();
    assert_eq!(
        stored.metadata.finalizers,
        Some(vec!["finalizer.backup.example.org".to_string()])
    );
}

#[tokio::test]
async fn test_remove_finalizer_with_stale_copy_is_a_conflict() {
    let store = MemoryStore::new();
    let mut db = database("db-1", Some("creds"));
    meta::add_finalizer(&mut db, FINALIZER);
    let mut stale = store.insert(&db).unwrap();
    store.delete::<Database>(&db_key());

    let err = ApiFinalizer::new(store.clone(), FINALIZER)
        .remove_finalizer(&mut stale)
        .await
        .unwrap_err();

    assert_eq!(err.kind(), ErrorKind::Conflict);
    assert!(err.is_retryable());
    let stored: Database = store.stored(&db_key()).unwrap();
    assert!(meta::finalizer_exists(&stored, FINALIZER));
    assert!(stored.metadata.deletion_timestamp.is_some());
}

#[tokio::test]
async fn test_initialize_sets_missing_external_name_only() {
    let store = MemoryStore::new();
    let initializer = NameAsExternalName::new(store.clone());

    let mut fresh = store.insert(&database("db-1", Some("creds"))).unwrap();
    initializer.initialize(&mut fresh).await.unwrap();
    let stored: Database = store.stored(&db_key()).unwrap();
    assert_eq!(meta::external_name(&stored), Some("db-1"));

    let mut named = database("db-2", Some("creds"));
    meta::set_external_name(&mut named, "legacy-db");
    let mut named = store.insert(&named).unwrap();
    store.clear_calls();
    initializer.initialize(&mut named).await.unwrap();

    assert!(store.calls().is_empty());
    let stored: Database = store.stored(&ObjectKey::new("infra", "db-2")).unwrap();
    assert_eq!(meta::external_name(&stored), Some("legacy-db"));
}

#[tokio::test]
async fn test_publish_creates_and_republishes_identically() {
    let store = MemoryStore::new();
    let mut db = database("db-1", Some("creds"));
    db.metadata.uid = Some("u1".to_string());
    let db = store.insert(&db).unwrap();
    let publisher = ApiSecretPublisher::new(store.clone());
    let creds = details(&[("user", "a"), ("pass", "b")]);

    publisher.publish_connection(&db, &creds).await.unwrap();
    let first: Secret = store.stored(&creds_key()).unwrap();
    assert_eq!(first.data, Some(payload(&[("user", "a"), ("pass", "b")])));
    assert!(meta::is_controlled_by(&first, "u1"));
    assert_eq!(first.type_.as_deref(), Some(SECRET_TYPE_CONNECTION));

    publisher.publish_connection(&db, &creds).await.unwrap();
    let second: Secret = store.stored(&creds_key()).unwrap();
    assert_eq!(second.data, first.data);
    assert_eq!(uid_of(&second), uid_of(&first));

    let verbs: Vec<Verb> = store.writes().iter().map(|c| c.verb).collect();
    assert_eq!(verbs, vec![Verb::Create, Verb::Patch]);
}

#[tokio::test]
async fn test_publish_refuses_secret_of_another_resource() {
    let store = MemoryStore::new();
    let mut db = database("db-1", Some("creds"));
    db.metadata.uid = Some("u1".to_string());
    let db = store.insert(&db).unwrap();
    store
        .insert(&secret("infra", "creds", Some("u2"), Some(SECRET_TYPE_CONNECTION), &[("user", "other")]))
        .unwrap();

    let err = ApiSecretPublisher::new(store.clone())
        .publish_connection(&db, &details(&[("user", "a"), ("pass", "b")]))
        .await
        .unwrap_err();

    assert_eq!(err.kind(), ErrorKind::OwnershipViolation);
    assert!(err
        .to_string()
        .starts_with("cannot create or update connection secret"));
    let stored: Secret = store.stored(&creds_key()).unwrap();
    assert_eq!(stored.data, Some(payload(&[("user", "other")])));
    assert!(store.writes().is_empty());
}

#[tokio::test]
async fn test_nop_helpers_make_no_store_calls() {
    let mut db = database("db-1", Some("creds"));
    NopFinalizer.add_finalizer(&mut db).await.unwrap();
    NopFinalizer.remove_finalizer(&mut db).await.unwrap();
    NopInitializer.initialize(&mut db).await.unwrap();
    NopConnectionPublisher
        .publish_connection(&db, &details(&[("user", "a")]))
        .await
        .unwrap();
    NopConnectionPublisher
        .unpublish_connection(&db, &ConnectionDetails::new())
        .await
        .unwrap();

    assert!(db.metadata.finalizers.is_none());
    assert!(meta::external_name(&db).is_none());
}
