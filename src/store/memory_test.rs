use std::time::Duration;

use bytes::Bytes;
use futures::StreamExt;
use tokio::time::timeout;

use super::*;
use crate::config::StoreConfig;

async fn next_batch(stream: &mut EventStream) -> EventBatch {
    timeout(Duration::from_millis(500), stream.next())
        .await
        .expect("timed out waiting for watch event")
        .expect("watch stream ended unexpectedly")
}

async fn assert_no_event(stream: &mut EventStream) {
    let result = timeout(Duration::from_millis(50), stream.next()).await;
    assert!(result.is_err(), "expected no event, got {:?}", result);
}

#[tokio::test]
async fn test_put_then_list_prefix_returns_key_order() {
    let store = MemoryStore::default();
    store
        .put(Bytes::from_static(b"/backup/zed"), Bytes::from_static(b"1"))
        .await
        .expect("put");
    store
        .put(Bytes::from_static(b"/backup/abc"), Bytes::from_static(b"2"))
        .await
        .expect("put");

    let listed = store
        .list_prefix(Bytes::from_static(b"/backup"))
        .await
        .expect("list");
    let keys: Vec<_> = listed.iter().map(|kv| kv.key.clone()).collect();
    assert_eq!(keys, vec![
        Bytes::from_static(b"/backup/abc"),
        Bytes::from_static(b"/backup/zed"),
    ]);
}

#[tokio::test]
async fn test_list_prefix_is_namespace_scoped() {
    let store = MemoryStore::default();
    store
        .put(Bytes::from_static(b"/backup/foo"), Bytes::from_static(b"1"))
        .await
        .expect("put");
    store
        .put(
            Bytes::from_static(b"/deployment_backup/foo"),
            Bytes::from_static(b"2"),
        )
        .await
        .expect("put");

    let listed = store
        .list_prefix(Bytes::from_static(b"/backup"))
        .await
        .expect("list");
    assert_eq!(listed.len(), 1);
    assert_eq!(listed[0].key, Bytes::from_static(b"/backup/foo"));
}

#[tokio::test]
async fn test_watch_delivers_put_and_delete_in_order() {
    let store = MemoryStore::default();
    let mut stream = store
        .watch_prefix(Bytes::from_static(b"/backup"))
        .await
        .expect("watch");

    let key = Bytes::from_static(b"/backup/foo");
    store
        .put(key.clone(), Bytes::from_static(b"v1"))
        .await
        .expect("put");
    store
        .put(key.clone(), Bytes::from_static(b"v2"))
        .await
        .expect("put");
    store.delete(key.clone()).await.expect("delete");

    let first = next_batch(&mut stream).await;
    assert_eq!(first.events[0].kind, EventKind::Put);
    assert_eq!(first.events[0].value, Bytes::from_static(b"v1"));

    let second = next_batch(&mut stream).await;
    assert_eq!(second.events[0].kind, EventKind::Put);
    assert_eq!(second.events[0].value, Bytes::from_static(b"v2"));

    let third = next_batch(&mut stream).await;
    assert_eq!(third.events[0].kind, EventKind::Delete);
    assert_eq!(third.events[0].key, key);
    assert!(third.events[0].value.is_empty());
}

#[tokio::test]
async fn test_watch_is_prefix_scoped() {
    let store = MemoryStore::default();
    let mut stream = store
        .watch_prefix(Bytes::from_static(b"/backup"))
        .await
        .expect("watch");

    store
        .put(
            Bytes::from_static(b"/deployment_backup/foo"),
            Bytes::from_static(b"1"),
        )
        .await
        .expect("put");
    assert_no_event(&mut stream).await;

    store
        .put(Bytes::from_static(b"/backup/foo"), Bytes::from_static(b"2"))
        .await
        .expect("put");
    let batch = next_batch(&mut stream).await;
    assert_eq!(batch.events[0].key, Bytes::from_static(b"/backup/foo"));
}

#[tokio::test]
async fn test_concurrent_watchers_route_by_event_key() {
    let store = MemoryStore::default();
    let mut backups = store
        .watch_prefix(Bytes::from_static(b"/backup"))
        .await
        .expect("watch");
    let mut deployments = store
        .watch_prefix(Bytes::from_static(b"/deployment_backup"))
        .await
        .expect("watch");

    store
        .put(Bytes::from_static(b"/backup/foo"), Bytes::from_static(b"1"))
        .await
        .expect("put");
    store
        .put(
            Bytes::from_static(b"/deployment_backup/bar"),
            Bytes::from_static(b"2"),
        )
        .await
        .expect("put");

    let batch = next_batch(&mut backups).await;
    assert_eq!(batch.events[0].key, Bytes::from_static(b"/backup/foo"));
    assert_no_event(&mut backups).await;

    let batch = next_batch(&mut deployments).await;
    assert_eq!(
        batch.events[0].key,
        Bytes::from_static(b"/deployment_backup/bar")
    );
    assert_no_event(&mut deployments).await;
}

#[tokio::test]
async fn test_watch_does_not_replay_existing_keys() {
    let store = MemoryStore::default();
    store
        .put(Bytes::from_static(b"/backup/old"), Bytes::from_static(b"1"))
        .await
        .expect("put");

    let mut stream = store
        .watch_prefix(Bytes::from_static(b"/backup"))
        .await
        .expect("watch");
    assert_no_event(&mut stream).await;
}

#[tokio::test]
async fn test_delete_of_absent_key_is_silent() {
    let store = MemoryStore::default();
    let mut stream = store
        .watch_prefix(Bytes::from_static(b"/backup"))
        .await
        .expect("watch");

    let before = store.revision();
    store
        .delete(Bytes::from_static(b"/backup/ghost"))
        .await
        .expect("delete");

    assert_eq!(store.revision(), before);
    assert_no_event(&mut stream).await;
}

#[tokio::test]
async fn test_dropped_watcher_is_unregistered_on_next_dispatch() {
    let store = MemoryStore::default();
    let stream = store
        .watch_prefix(Bytes::from_static(b"/backup"))
        .await
        .expect("watch");
    assert_eq!(store.watcher_count(), 1);

    drop(stream);
    store
        .put(Bytes::from_static(b"/backup/foo"), Bytes::from_static(b"1"))
        .await
        .expect("put");
    assert_eq!(store.watcher_count(), 0);
}

#[tokio::test]
async fn test_slow_watcher_loses_events_instead_of_blocking() {
    let store = MemoryStore::new(StoreConfig {
        watch_buffer_size: 1,
    });
    let mut stream = store
        .watch_prefix(Bytes::from_static(b"/backup"))
        .await
        .expect("watch");

    let key = Bytes::from_static(b"/backup/foo");
    store
        .put(key.clone(), Bytes::from_static(b"v1"))
        .await
        .expect("put");
    store
        .put(key.clone(), Bytes::from_static(b"v2"))
        .await
        .expect("put");
    store
        .put(key.clone(), Bytes::from_static(b"v3"))
        .await
        .expect("put");

    let batch = next_batch(&mut stream).await;
    assert_eq!(batch.events[0].value, Bytes::from_static(b"v1"));
    assert_no_event(&mut stream).await;
    assert_eq!(store.revision(), 3);
}

#[tokio::test]
async fn test_revision_tracks_accepted_mutations() {
    let store = MemoryStore::default();
    assert_eq!(store.revision(), 0);

    let key = Bytes::from_static(b"/backup/foo");
    store
        .put(key.clone(), Bytes::from_static(b"1"))
        .await
        .expect("put");
    store
        .put(key.clone(), Bytes::from_static(b"1"))
        .await
        .expect("put");
    store.delete(key).await.expect("delete");
    assert_eq!(store.revision(), 3);
}
