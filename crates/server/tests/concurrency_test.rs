//! Concurrent feedback against the service.
//!
//! Ratings for one user must apply one at a time: N concurrent submissions
//! of the same rating end in exactly the state of N sequential ones.

use std::sync::Arc;

use catalog::seed::DEFAULT_USER_FACTORS;
use scoring::{apply_feedback, ScorerConfig};
use server::{
    InMemoryProfileStore, JsonFileProfileStore, ProfileStore, RecommendationService,
    StaticCatalogProvider,
};

const SUBMISSIONS: usize = 16;

fn sequential_factors(item_factors: &[f32], rating: f32, times: usize) -> Vec<f32> {
    let mut factors = DEFAULT_USER_FACTORS.to_vec();
    for _ in 0..times {
        factors = apply_feedback(&factors, item_factors, rating, 0.08).unwrap();
    }
    factors
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn test_concurrent_feedback_for_one_user_is_serialized() {
    let provider = StaticCatalogProvider::seeded().unwrap();
    let store = Arc::new(InMemoryProfileStore::new());
    let service = RecommendationService::new(&provider, store.clone(), ScorerConfig::default()).unwrap();

    let handles: Vec<_> = (0..SUBMISSIONS)
        .map(|_| {
            let service = service.clone();
            tokio::spawn(async move { service.submit_feedback("u1", "m1", 1.0, None).await })
        })
        .collect();
    for handle in handles {
        handle.await.unwrap().unwrap();
    }

    let profile = store.load("u1").unwrap().unwrap();
    assert_eq!(profile.feedback.len(), SUBMISSIONS);

    let item = service.catalog().require_item("m1").unwrap();
    let expected = sequential_factors(&item.factors, 1.0, SUBMISSIONS);
    for (got, want) in profile.factors.iter().zip(&expected) {
        assert!((got - want).abs() < 1e-6, "{:?} vs {:?}", profile.factors, expected);
    }
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn test_users_do_not_interfere() {
    let provider = StaticCatalogProvider::seeded().unwrap();
    let store = Arc::new(InMemoryProfileStore::new());
    let service = RecommendationService::new(&provider, store.clone(), ScorerConfig::default()).unwrap();

    let handles: Vec<_> = ["alice", "bob", "carol", "dave"]
        .into_iter()
        .flat_map(|user| {
            let service = service.clone();
            (0..4).map(move |_| {
                let service = service.clone();
                tokio::spawn(async move { service.submit_feedback(user, "m3", 0.9, None).await })
            })
        })
        .collect();
    for handle in handles {
        handle.await.unwrap().unwrap();
    }

    assert_eq!(store.len(), 4);
    let item = service.catalog().require_item("m3").unwrap();
    let expected = sequential_factors(&item.factors, 0.9, 4);
    for user in ["alice", "bob", "carol", "dave"] {
        let profile = store.load(user).unwrap().unwrap();
        assert_eq!(profile.feedback.len(), 4);
        for (got, want) in profile.factors.iter().zip(&expected) {
            assert!((got - want).abs() < 1e-6);
        }
    }
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn test_json_store_survives_restart() {
    let dir = tempfile::tempdir().unwrap();
    let provider = StaticCatalogProvider::seeded().unwrap();

    let first = RecommendationService::new(
        &provider,
        Arc::new(JsonFileProfileStore::new(dir.path()).unwrap()),
        ScorerConfig::default(),
    )
    .unwrap();

    let handles: Vec<_> = (0..8)
        .map(|_| {
            let service = first.clone();
            tokio::spawn(async move { service.submit_feedback("u1", "m5", 0.95, Some("tap")).await })
        })
        .collect();
    for handle in handles {
        handle.await.unwrap().unwrap();
    }
    let saved = first.profile("u1").await.unwrap();

    let second = RecommendationService::new(
        &provider,
        Arc::new(JsonFileProfileStore::new(dir.path()).unwrap()),
        ScorerConfig::default(),
    )
    .unwrap();
    let reloaded = second.profile("u1").await.unwrap();

    assert_eq!(reloaded, saved);
    assert_eq!(reloaded.feedback.len(), 8);
    assert!(reloaded.feedback.iter().all(|e| e.reason == "tap"));
}
