//! Queue store properties against a real SQLite file
//!
//! Idempotent join, FIFO order, concurrent admission, race-safe pop, pruning.

mod common;

use common::{key, Fixture};
use futures::future::join_all;
use lineup_core::application::QueueStore;
use lineup_core::domain::{JoinOutcome, LeaveOutcome, QueueKey};
use lineup_core::EngineConfig;
use std::collections::HashSet;
use std::sync::Arc;

fn store(fixture: &Fixture, config: &EngineConfig) -> QueueStore {
    QueueStore::new(fixture.queue_repo.clone(), fixture.clock.clone(), config)
}

#[tokio::test]
async fn test_join_is_idempotent() {
    let fixture = Fixture::new().await;
    let store = store(&fixture, &EngineConfig::default());

    assert_eq!(store.join(&key(), "U1").await.unwrap(), JoinOutcome::Admitted);
    fixture.clock.advance_millis(10);
    assert_eq!(
        store.join(&key(), "U1").await.unwrap(),
        JoinOutcome::AlreadyQueued
    );

    assert_eq!(store.list(&key()).await.unwrap(), vec!["U1"]);
}

#[tokio::test]
async fn test_fifo_order_survives_identical_timestamps() {
    let fixture = Fixture::new().await;
    let store = store(&fixture, &EngineConfig::default());

    // Clock never moves: ranks must still follow admission order
    for member in ["U1", "U2", "U3", "U4"] {
        store.join(&key(), member).await.unwrap();
    }

    assert_eq!(store.list(&key()).await.unwrap(), vec!["U1", "U2", "U3", "U4"]);
    assert_eq!(store.pop_front(&key()).await.unwrap().as_deref(), Some("U1"));
    assert_eq!(store.pop_front(&key()).await.unwrap().as_deref(), Some("U2"));
    assert_eq!(store.list(&key()).await.unwrap(), vec!["U3", "U4"]);
}

#[tokio::test]
async fn test_rejoin_goes_to_back() {
    let fixture = Fixture::new().await;
    let store = store(&fixture, &EngineConfig::default());

    for member in ["U1", "U2"] {
        store.join(&key(), member).await.unwrap();
    }
    assert_eq!(store.leave(&key(), "U1").await.unwrap(), LeaveOutcome::Removed);
    assert_eq!(
        store.leave(&key(), "U1").await.unwrap(),
        LeaveOutcome::NotInQueue
    );
    store.join(&key(), "U1").await.unwrap();

    assert_eq!(store.list(&key()).await.unwrap(), vec!["U2", "U1"]);
}

#[tokio::test]
async fn test_concurrent_distinct_joins_all_admitted() {
    let fixture = Fixture::new().await;
    let store = Arc::new(store(&fixture, &EngineConfig::default()));

    let joins = (0..20).map(|i| {
        let store = store.clone();
        tokio::spawn(async move { store.join(&key(), &format!("U{:02}", i)).await })
    });
    for result in join_all(joins).await {
        assert_eq!(result.unwrap().unwrap(), JoinOutcome::Admitted);
    }

    let members = store.list(&key()).await.unwrap();
    assert_eq!(members.len(), 20);
    let unique: HashSet<_> = members.iter().collect();
    assert_eq!(unique.len(), 20, "No member may appear twice");
}

#[tokio::test]
async fn test_staggered_concurrent_joins_keep_admission_order() {
    let fixture = Fixture::new().await;
    let store = Arc::new(store(&fixture, &EngineConfig::default()));

    // Each batch joins concurrently; a batch starts only after the previous
    // one was admitted
    let mut batches: Vec<Vec<String>> = Vec::new();
    for batch in 0..4 {
        let members: Vec<String> = (0..5).map(|i| format!("U{}{}", batch, i)).collect();
        let joins = members.iter().cloned().map(|member| {
            let store = store.clone();
            tokio::spawn(async move { store.join(&key(), &member).await })
        });
        for result in join_all(joins).await {
            assert_eq!(result.unwrap().unwrap(), JoinOutcome::Admitted);
        }
        batches.push(members);
        // Alternate between a moving and a frozen clock
        if batch % 2 == 0 {
            fixture.clock.advance_millis(5);
        }
    }

    let listed = store.list(&key()).await.unwrap();
    assert_eq!(listed.len(), 20);
    let position = |member: &String| listed.iter().position(|m| m == member).unwrap();
    for (earlier, later) in batches.iter().zip(batches.iter().skip(1)) {
        let last_of_earlier = earlier.iter().map(position).max().unwrap();
        let first_of_later = later.iter().map(position).min().unwrap();
        assert!(
            last_of_earlier < first_of_later,
            "Members admitted earlier must rank ahead: {:?}",
            listed
        );
    }
}

#[tokio::test]
async fn test_concurrent_joins_of_same_member() {
    let fixture = Fixture::new().await;
    let store = Arc::new(store(&fixture, &EngineConfig::default()));

    let joins = (0..10).map(|_| {
        let store = store.clone();
        tokio::spawn(async move { store.join(&key(), "U1").await })
    });
    let admitted = join_all(joins)
        .await
        .into_iter()
        .filter(|r| matches!(r, Ok(Ok(JoinOutcome::Admitted))))
        .count();

    assert_eq!(admitted, 1, "Exactly one join wins");
    assert_eq!(store.list(&key()).await.unwrap(), vec!["U1"]);
}

#[tokio::test]
async fn test_concurrent_pops_return_each_member_once() {
    let fixture = Fixture::new().await;
    let config = EngineConfig::default().with_pop_max_attempts(100);
    let store = Arc::new(store(&fixture, &config));

    for i in 0..10 {
        store.join(&key(), &format!("U{}", i)).await.unwrap();
    }

    let pops = (0..15).map(|_| {
        let store = store.clone();
        tokio::spawn(async move { store.pop_front(&key()).await })
    });
    let popped: Vec<String> = join_all(pops)
        .await
        .into_iter()
        .filter_map(|r| r.unwrap().unwrap())
        .collect();

    assert_eq!(popped.len(), 10, "Ten members, ten successful pops");
    let unique: HashSet<_> = popped.iter().collect();
    assert_eq!(unique.len(), 10, "No member returned twice");
    assert!(store.list(&key()).await.unwrap().is_empty());
}

#[tokio::test]
async fn test_pruning_drops_stale_entries() {
    let fixture = Fixture::new().await;
    let config = EngineConfig::default().with_max_age_secs(60);
    let store = store(&fixture, &config);

    store.join(&key(), "U1").await.unwrap();
    fixture.clock.advance_millis(61_000);
    store.join(&key(), "U2").await.unwrap();

    assert_eq!(store.list(&key()).await.unwrap(), vec!["U2"]);
}

#[tokio::test]
async fn test_pruning_disabled_keeps_everything() {
    let fixture = Fixture::new().await;
    let store = store(&fixture, &EngineConfig::default().with_max_age_secs(0));

    store.join(&key(), "U1").await.unwrap();
    fixture.clock.advance_millis(365 * 24 * 3600 * 1000);

    assert_eq!(store.list(&key()).await.unwrap(), vec!["U1"]);
}

#[tokio::test]
async fn test_queues_are_independent() {
    let fixture = Fixture::new().await;
    let store = store(&fixture, &EngineConfig::default());
    let other = QueueKey::new("T1", "C2");

    store.join(&key(), "U1").await.unwrap();
    store.join(&other, "U2").await.unwrap();
    assert_eq!(store.clear(&key()).await.unwrap(), 1);

    assert!(store.list(&key()).await.unwrap().is_empty());
    assert_eq!(store.list(&other).await.unwrap(), vec!["U2"]);
}
