//! Small demo harness for the recommendation service.
//!
//! Loads the catalog (from `CATALOG_DIR` when set, the built-in demo
//! catalog otherwise), replays a few ratings for one user and prints
//! recommendations before and after.

use std::path::PathBuf;
use std::sync::Arc;

use anyhow::{Context, Result};
use tracing::info;
use tracing_subscriber::EnvFilter;

use scoring::ScorerConfig;
use server::{InMemoryProfileStore, RecommendationService, StaticCatalogProvider};

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new("info,server=debug,scoring=debug")),
        )
        .init();

    info!("Starting recommendation service demo");

    let provider = match std::env::var_os("CATALOG_DIR").map(PathBuf::from) {
        Some(dir) => StaticCatalogProvider::from_dir(&dir)
            .with_context(|| format!("Failed to load catalog from {:?}", dir))?,
        None => StaticCatalogProvider::seeded().context("Failed to build demo catalog")?,
    };

    let service = RecommendationService::new(
        &provider,
        Arc::new(InMemoryProfileStore::new()),
        ScorerConfig::default(),
    )?;

    let user_id = "demo-user";
    let limit = 5;

    print_recommendations(&service, user_id, limit).await?;

    for (item_id, rating) in [("m1", 0.95), ("m3", 0.9), ("m2", 0.1)] {
        service
            .submit_feedback(user_id, item_id, rating, Some("demo"))
            .await
            .with_context(|| format!("Feedback for {} failed", item_id))?;
    }
    let report = service.train_model(user_id).await?;
    info!("Model trained, final loss {:.4}", report.loss);

    print_recommendations(&service, user_id, limit).await?;
    info!("Health: {:?}", service.health());

    Ok(())
}

async fn print_recommendations(
    service: &RecommendationService,
    user_id: &str,
    limit: usize,
) -> Result<()> {
    let recommendations = service.recommend(user_id, limit).await?;

    info!("Top {} for {}:", recommendations.len(), user_id);
    for (i, rec) in recommendations.iter().enumerate() {
        info!(
            "{}. {} ({}) - Score: {:.3}",
            i + 1,
            rec.title,
            rec.year.map(|y| y.to_string()).unwrap_or_else(|| "????".to_string()),
            rec.score
        );
        info!("   Tags: {}", rec.tags.join(", "));
        info!("   {}", rec.explanation);
    }
    Ok(())
}
