//! Concurrent queries against a shared pipeline, including during reloads.

mod common;

use std::sync::Arc;

use common::{entry, offline_pipeline, sample_corpus};
use snoutiq::{Severity, SpeciesScope, SubjectProfile};

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn concurrent_queries_share_one_pipeline() {
    let pipeline = Arc::new(offline_pipeline());
    pipeline.load_entries(sample_corpus()).await.unwrap();

    let handles: Vec<_> = (0..32)
        .map(|i| {
            let pipeline = Arc::clone(&pipeline);
            tokio::spawn(async move {
                let pet = if i % 2 == 0 {
                    SubjectProfile::new(format!("dog-{i}"), "dog")
                } else {
                    SubjectProfile::new(format!("cat-{i}"), "cat")
                };
                pipeline
                    .analyze(&pet, "pet limping after a fall")
                    .await
                    .map(|r| (i, r))
            })
        })
        .collect();

    for handle in handles {
        let (i, result) = handle.await.unwrap().unwrap();
        let expected = if i % 2 == 0 { 4 } else { 3 };
        assert_eq!(result.query_metadata.num_matches, expected);
        assert!(result.pet_name.ends_with(&i.to_string()));
    }
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn readers_see_whole_snapshots_during_reload() {
    let full = sample_corpus();
    let dogs_only = vec![
        entry("Vomiting", "Dog vomiting", Severity::Urgent, SpeciesScope::Dogs),
        entry("Ear mites", "Dog scratching ears", Severity::Routine, SpeciesScope::Dogs),
    ];

    let pipeline = Arc::new(offline_pipeline());
    pipeline.load_entries(full.clone()).await.unwrap();

    let reloader = {
        let pipeline = Arc::clone(&pipeline);
        tokio::spawn(async move {
            for round in 0..20 {
                let next = if round % 2 == 0 {
                    dogs_only.clone()
                } else {
                    full.clone()
                };
                pipeline.load_entries(next).await.unwrap();
                tokio::task::yield_now().await;
            }
        })
    };

    let readers: Vec<_> = (0..8)
        .map(|_| {
            let pipeline = Arc::clone(&pipeline);
            tokio::spawn(async move {
                let pet = SubjectProfile::new("Bruno", "dog");
                let mut seen = Vec::new();
                for _ in 0..25 {
                    let result = pipeline.analyze(&pet, "dog scratching and vomiting").await;
                    seen.push(result.unwrap().query_metadata.num_matches);
                    tokio::task::yield_now().await;
                }
                seen
            })
        })
        .collect();

    reloader.await.unwrap();
    for reader in readers {
        for count in reader.await.unwrap() {
            // 2 dog entries in the small corpus, 4 dog-visible entries in the full one.
            assert!(count == 2 || count == 4, "mixed snapshot: {count} matches");
        }
    }
    assert!(pipeline.is_ready());
}

#[test]
fn pipeline_is_send_and_sync() {
    fn assert_send_sync<T: Send + Sync>() {}
    assert_send_sync::<snoutiq::Pipeline>();
}
