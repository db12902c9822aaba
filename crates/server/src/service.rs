//! # Recommendation Service
//!
//! Wires the catalog, the profile store and the scoring strategy together:
//! 1. Load the user's profile (or start from defaults)
//! 2. Rank the catalog on a blocking task
//! 3. Take the top N and attach titles and explanations
//!
//! Feedback goes the other way: validate the item, learn from the rating,
//! record the event and persist the profile. Each user's read-modify-write
//! runs under that user's own async mutex, so concurrent feedback for one
//! user applies one event at a time while other users are never blocked.

use std::collections::{BTreeMap, HashMap};
use std::sync::{Arc, Mutex, RwLock};
use std::time::Instant;

use chrono::Utc;
use serde::Serialize;
use tokio::sync::Mutex as AsyncMutex;
use tracing::{debug, info, warn};

use catalog::seed::{default_affinities, DEFAULT_USER_FACTORS};
use catalog::{Catalog, FeedbackEvent, ItemId, UserId, UserProfile};
use scoring::{
    build_strategy, rank, ModelScorer, ProfileModel, ScoreBreakdown, ScorerConfig, ScoringStrategy,
    StrategyKind, TrainingOptions, TrainingReport,
};

use crate::error::{Result, ServiceError};
use crate::store::{CatalogProvider, ProfileStore};

/// Reason recorded when the caller gives none
pub const DEFAULT_FEEDBACK_REASON: &str = "User feedback";

/// One entry of a recommendation list
#[derive(Debug, Clone, Serialize)]
pub struct Recommendation {
    pub item_id: ItemId,
    pub title: String,
    pub tags: Vec<String>,
    pub year: Option<u16>,
    pub score: f32,
    pub breakdown: ScoreBreakdown,
    pub explanation: String,
}

/// Snapshot of service state for health checks
#[derive(Debug, Clone, Serialize)]
pub struct HealthStatus {
    pub strategy: String,
    pub store: String,
    pub catalog_items: usize,
    pub trained_models: usize,
}

#[derive(Clone)]
pub struct RecommendationService {
    catalog: Arc<Catalog>,
    store: Arc<dyn ProfileStore>,
    strategy: Arc<dyn ScoringStrategy>,
    config: Arc<ScorerConfig>,
    training: TrainingOptions,
    user_locks: Arc<Mutex<HashMap<UserId, Arc<AsyncMutex<()>>>>>,
    models: Arc<RwLock<HashMap<UserId, Arc<ProfileModel>>>>,
}

impl RecommendationService {
    /// Create a service over one catalog and one profile store
    ///
    /// # Arguments
    /// * `provider` - Source of the read-only catalog
    /// * `store` - Where profiles are loaded from and saved to
    /// * `config` - Strategy selection and scoring parameters, validated here
    pub fn new(
        provider: &dyn CatalogProvider,
        store: Arc<dyn ProfileStore>,
        config: ScorerConfig,
    ) -> Result<Self> {
        config.validate()?;
        let catalog = provider.catalog();
        let strategy = build_strategy(catalog.schema(), &config);

        info!(
            "Recommendation service ready: strategy={}, store={}, items={}",
            strategy.name(),
            store.name(),
            catalog.len()
        );

        Ok(Self {
            catalog,
            store,
            strategy,
            config: Arc::new(config),
            training: TrainingOptions::default(),
            user_locks: Arc::new(Mutex::new(HashMap::new())),
            models: Arc::new(RwLock::new(HashMap::new())),
        })
    }

    pub fn catalog(&self) -> &Catalog {
        &self.catalog
    }

    pub fn strategy(&self) -> &dyn ScoringStrategy {
        self.strategy.as_ref()
    }

    /// Top `limit` items for a user, best first
    pub async fn recommend(&self, user_id: &str, limit: usize) -> Result<Vec<Recommendation>> {
        let start_time = Instant::now();

        let profile = self.load_or_default(user_id)?;
        let model = self.cached_model(user_id);

        let ranked = tokio::task::spawn_blocking({
            let strategy = Arc::clone(&self.strategy);
            let catalog = Arc::clone(&self.catalog);
            move || {
                let model = model.as_deref().map(|m| m as &dyn ModelScorer);
                rank(strategy.as_ref(), &profile, catalog.items(), model)
            }
        })
        .await??;

        let recommendations: Vec<Recommendation> = ranked
            .into_iter()
            .take(limit)
            .filter_map(|entry| {
                let item = self.catalog.get_item(&entry.item_id)?;
                let score = entry.score();
                let explanation = if entry.reasons.is_empty() {
                    format!("Score: {:.2}", score)
                } else {
                    entry.reasons.join("; ")
                };
                Some(Recommendation {
                    item_id: entry.item_id,
                    title: item.title.clone(),
                    tags: item.tags.clone(),
                    year: item.year,
                    score,
                    breakdown: entry.breakdown,
                    explanation,
                })
            })
            .collect();

        info!(
            "Recommended {} items for user {} in {:.2?}",
            recommendations.len(),
            user_id,
            start_time.elapsed()
        );
        Ok(recommendations)
    }

    /// Learn from one rating and persist the updated profile.
    ///
    /// An unknown item fails before anything is touched. The rating is
    /// clamped into the strategy's scale first.
    pub async fn submit_feedback(
        &self,
        user_id: &str,
        item_id: &str,
        rating: f32,
        reason: Option<&str>,
    ) -> Result<UserProfile> {
        let item = self
            .catalog
            .get_item(item_id)
            .ok_or_else(|| ServiceError::ItemNotFound(item_id.to_string()))?;

        let scale = self.strategy.rating_scale();
        let clamped = scale.clamp(rating);
        if clamped != rating {
            warn!(
                "Rating {} for {} outside [{}, {}], using {}",
                rating, item_id, scale.min, scale.max, clamped
            );
        }

        let lock = self.user_lock(user_id);
        let _guard = lock.lock().await;

        let mut profile = self.load_or_default(user_id)?;
        self.strategy.learn(&mut profile, item, clamped)?;
        profile.feedback.push(FeedbackEvent {
            item_id: item.id.clone(),
            rating: clamped,
            timestamp: Utc::now().timestamp(),
            reason: reason.unwrap_or(DEFAULT_FEEDBACK_REASON).to_string(),
        });
        self.store.save(&profile)?;

        debug!(
            "Applied feedback {} -> {} ({}), log size {}",
            user_id,
            item_id,
            clamped,
            profile.feedback.len()
        );
        Ok(profile)
    }

    /// Current profile, or the defaults a new user would start from
    pub async fn profile(&self, user_id: &str) -> Result<UserProfile> {
        self.load_or_default(user_id)
    }

    /// Recorded feedback, newest first
    pub async fn feedback_log(&self, user_id: &str) -> Result<Vec<FeedbackEvent>> {
        let profile = self.load_or_default(user_id)?;
        Ok(profile.feedback.iter().cloned().collect())
    }

    /// Restore default affinities and factors, clear the log and drop any
    /// trained model
    pub async fn reset_profile(&self, user_id: &str) -> Result<UserProfile> {
        let lock = self.user_lock(user_id);
        let _guard = lock.lock().await;

        self.models
            .write()
            .map_err(|_| ServiceError::Store("model cache lock poisoned".to_string()))?
            .remove(user_id);

        let mut profile = self.load_or_default(user_id)?;
        let fresh = self.fresh_profile(user_id);
        profile.reset_to(fresh.affinities, fresh.factors);
        self.store.save(&profile)?;

        info!("Reset profile for user {}", user_id);
        Ok(profile)
    }

    /// Fit a profile model for one user and use it for later rankings.
    ///
    /// Holds the user's lock from load to cache insert, so a concurrent
    /// reset or rating can't leave a model fitted to a stale profile.
    pub async fn train_model(&self, user_id: &str) -> Result<TrainingReport> {
        let start_time = Instant::now();

        let lock = self.user_lock(user_id);
        let _guard = lock.lock().await;

        let profile = self.load_or_default(user_id)?;

        let (model, report) = tokio::task::spawn_blocking({
            let catalog = Arc::clone(&self.catalog);
            let options = self.training;
            move || {
                ProfileModel::train_for_profile(catalog.schema(), &profile, catalog.items(), &options)
            }
        })
        .await??;

        self.models
            .write()
            .map_err(|_| ServiceError::Store("model cache lock poisoned".to_string()))?
            .insert(user_id.to_string(), Arc::new(model));

        info!(
            "Trained model for user {}: loss={:.4}, samples={}, epochs={} in {:.2?}",
            user_id,
            report.loss,
            report.samples,
            report.epochs,
            start_time.elapsed()
        );
        Ok(report)
    }

    pub fn health(&self) -> HealthStatus {
        let trained_models = self.models.read().map(|m| m.len()).unwrap_or(0);
        HealthStatus {
            strategy: self.strategy.name().to_string(),
            store: self.store.name().to_string(),
            catalog_items: self.catalog.len(),
            trained_models,
        }
    }

    fn user_lock(&self, user_id: &str) -> Arc<AsyncMutex<()>> {
        // The map only holds Arcs, so a poisoned guard is still consistent
        let mut locks = self
            .user_locks
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner());

        // Entries nobody else holds are idle
        locks.retain(|_, lock| Arc::strong_count(lock) > 1);
        Arc::clone(locks.entry(user_id.to_string()).or_default())
    }

    fn cached_model(&self, user_id: &str) -> Option<Arc<ProfileModel>> {
        self.models
            .read()
            .ok()
            .and_then(|models| models.get(user_id).cloned())
    }

    fn load_or_default(&self, user_id: &str) -> Result<UserProfile> {
        match self.store.load(user_id)? {
            Some(profile) => Ok(profile),
            None => {
                debug!("No stored profile for {}, starting from defaults", user_id);
                Ok(self.fresh_profile(user_id))
            }
        }
    }

    /// Defaults for a new user, shaped to the catalog's factor dimension
    fn fresh_profile(&self, user_id: &str) -> UserProfile {
        let affinities = match self.config.strategy {
            StrategyKind::Hybrid => default_affinities(),
            StrategyKind::TagWeights => BTreeMap::new(),
        };

        let dim = self.catalog.factor_dim();
        let factors = if dim == DEFAULT_USER_FACTORS.len() {
            DEFAULT_USER_FACTORS.to_vec()
        } else {
            vec![0.1; dim]
        };

        UserProfile::new(user_id, affinities, factors, self.config.feedback_capacity)
    }
}
