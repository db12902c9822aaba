//! Integration tests for the scoring crate.
//!
//! These run both strategies end to end over the bundled catalog the way a
//! service would: rank, learn from feedback, rank again.

use catalog::seed::{default_profile, seed_catalog};
use catalog::{Catalog, UserProfile};
use scoring::{
    build_strategy, latent_score, rank, ModelFallback, ProfileModel, ScorerConfig, ScoringError,
    StrategyKind, TrainingOptions,
};
use std::collections::BTreeMap;

fn setup() -> (Catalog, UserProfile) {
    (seed_catalog().unwrap(), default_profile("u1", 5))
}

#[test]
fn test_hybrid_feedback_moves_item_up() {
    let (catalog, mut profile) = setup();
    let strategy = build_strategy(catalog.schema(), &ScorerConfig::default());

    let before = rank(strategy.as_ref(), &profile, catalog.items(), None).unwrap();
    let score_of = |ranked: &[scoring::RankedItem], id: &str| {
        ranked.iter().find(|r| r.item_id == id).unwrap().score()
    };
    let m4_before = score_of(&before, "m4");

    let m4 = catalog.require_item("m4").unwrap();
    for _ in 0..20 {
        strategy.learn(&mut profile, m4, 1.0).unwrap();
    }

    let after = rank(strategy.as_ref(), &profile, catalog.items(), None).unwrap();
    assert!(score_of(&after, "m4") > m4_before);
}

#[test]
fn test_repeated_feedback_converges_towards_rating() {
    let (catalog, mut profile) = setup();
    let strategy = build_strategy(catalog.schema(), &ScorerConfig::default());
    let item = catalog.require_item("m2").unwrap();

    let mut last_error = f32::MAX;
    for _ in 0..50 {
        strategy.learn(&mut profile, item, 0.95).unwrap();
        let error = (0.95 - latent_score(&profile.factors, &item.factors).unwrap()).abs();
        assert!(error <= last_error);
        last_error = error;
    }
    assert!(last_error < 0.05);
}

#[test]
fn test_trained_model_takes_part_in_scores() {
    let (catalog, profile) = setup();
    let strategy = build_strategy(catalog.schema(), &ScorerConfig::default());
    let (model, report) = ProfileModel::train_for_profile(
        catalog.schema(),
        &profile,
        catalog.items(),
        &TrainingOptions::default(),
    )
    .unwrap();
    assert_eq!(report.samples, catalog.len());

    let ranked = rank(strategy.as_ref(), &profile, catalog.items(), Some(&model)).unwrap();
    for entry in &ranked {
        let model_score = entry.breakdown.model.expect("model score present");
        assert!((0.0..=1.0).contains(&model_score));
        assert!((0.0..=1.0).contains(&entry.score()));
    }
}

#[test]
fn test_renormalize_fallback_ranks_everything() {
    let (catalog, profile) = setup();
    let config = ScorerConfig {
        model_fallback: ModelFallback::Renormalize,
        ..ScorerConfig::default()
    };
    let strategy = build_strategy(catalog.schema(), &config);

    let ranked = rank(strategy.as_ref(), &profile, catalog.items(), None).unwrap();
    assert_eq!(ranked.len(), catalog.len());
}

#[test]
fn test_tag_strategy_end_to_end() {
    let (catalog, _) = setup();
    let config = ScorerConfig::tag_weights();
    assert_eq!(config.strategy, StrategyKind::TagWeights);
    let strategy = build_strategy(catalog.schema(), &config);

    let mut profile = UserProfile::new("u2", BTreeMap::new(), vec![0.3, 0.6, 0.2], 50);
    strategy.learn(&mut profile, catalog.require_item("m4").unwrap(), 5.0).unwrap();
    strategy.learn(&mut profile, catalog.require_item("m2").unwrap(), 1.0).unwrap();

    let ranked = rank(strategy.as_ref(), &profile, catalog.items(), None).unwrap();
    // m4 (drama|music) liked, m3 shares "drama", m2 (comedy|friendship) disliked
    assert_eq!(ranked[0].item_id, "m4");
    assert_eq!(ranked[1].item_id, "m3");
    let m2 = ranked.iter().find(|r| r.item_id == "m2").unwrap();
    assert_eq!(m2.score(), 0.0);
    // latent factors untouched by the tag strategy
    assert_eq!(profile.factors, vec![0.3, 0.6, 0.2]);
}

#[test]
fn test_dimension_mismatch_is_distinguishable() {
    let (catalog, mut profile) = setup();
    profile.factors.push(0.5);
    let strategy = build_strategy(catalog.schema(), &ScorerConfig::default());

    match rank(strategy.as_ref(), &profile, catalog.items(), None) {
        Err(ScoringError::DimensionMismatch { expected, found, .. }) => {
            assert_eq!(expected, 4);
            assert_eq!(found, 3);
        }
        other => panic!("expected a dimension mismatch, got {:?}", other),
    }
}

#[test]
fn test_example_config_file_loads() {
    let path = std::path::Path::new(env!("CARGO_MANIFEST_DIR")).join("../../config/scorer.example.json");
    let config = ScorerConfig::load_from_file(&path).unwrap();
    assert_eq!(config, ScorerConfig::default());
}
