//! Core domain types for the recommendation catalog.
//!
//! Items are immutable once they enter a [`Catalog`](crate::Catalog);
//! profiles are the only mutable state and change exclusively through
//! feedback.

use crate::error::{CatalogError, Result};
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, HashMap, VecDeque};

// =============================================================================
// Type Aliases
// =============================================================================

/// Unique identifier for an item ("m1", "tt0133093", ...)
pub type ItemId = String;

/// Unique identifier for a user profile
pub type UserId = String;

// =============================================================================
// Attribute Schema
// =============================================================================

/// Ordered attribute names shared by item vectors and profile affinities.
///
/// Position `i` of every item's attribute vector refers to `names[i]`, and
/// profile affinities are keyed by the same names.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AttributeSchema {
    names: Vec<String>,
}

impl AttributeSchema {
    pub fn new<I, S>(names: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            names: names.into_iter().map(Into::into).collect(),
        }
    }

    /// Attribute names in vector order
    pub fn names(&self) -> &[String] {
        &self.names
    }

    /// Number of attributes (D)
    pub fn len(&self) -> usize {
        self.names.len()
    }

    pub fn is_empty(&self) -> bool {
        self.names.is_empty()
    }

    /// Position of an attribute in the vector order
    pub fn position(&self, name: &str) -> Option<usize> {
        self.names.iter().position(|n| n == name)
    }
}

impl Default for AttributeSchema {
    fn default() -> Self {
        Self::new(["Action", "Drama", "Comedy", "Sci-Fi"])
    }
}

// =============================================================================
// Items
// =============================================================================

/// A recommendable title
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Item {
    pub id: ItemId,
    pub title: String,
    #[serde(default)]
    pub synopsis: String,
    #[serde(default)]
    pub year: Option<u16>,
    /// Free-form tags, the keys of the tag-weight strategy
    #[serde(default)]
    pub tags: Vec<String>,
    /// Attribute weights in [0, 1], ordered by the catalog's schema
    pub attributes: Vec<f32>,
    /// Latent factor vector of length K
    pub factors: Vec<f32>,
}

// =============================================================================
// Ratings & Feedback
// =============================================================================

/// The closed range ratings are clamped into before any computation.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct RatingScale {
    pub min: f32,
    pub max: f32,
}

impl RatingScale {
    /// Implicit-feedback scale used by the latent-factor variant
    pub const fn unit() -> Self {
        Self { min: 0.0, max: 1.0 }
    }

    /// Star scale used by the tag-weight variant
    pub const fn stars() -> Self {
        Self { min: 1.0, max: 5.0 }
    }

    /// Saturate a raw rating into the scale. NaN maps to `min`.
    pub fn clamp(&self, rating: f32) -> f32 {
        rating.max(self.min).min(self.max)
    }

    pub fn midpoint(&self) -> f32 {
        (self.min + self.max) / 2.0
    }
}

/// One explicit rating given by a user
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FeedbackEvent {
    pub item_id: ItemId,
    /// Rating after clamping to the active scale
    pub rating: f32,
    /// Unix timestamp (seconds) when the feedback was received
    pub timestamp: i64,
    pub reason: String,
}

/// Newest-first feedback history bounded to `capacity` entries.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FeedbackLog {
    capacity: usize,
    events: VecDeque<FeedbackEvent>,
}

impl FeedbackLog {
    pub const DEFAULT_CAPACITY: usize = 50;

    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            capacity,
            events: VecDeque::with_capacity(capacity),
        }
    }

    /// Record an event, evicting the oldest ones on overflow
    pub fn push(&mut self, event: FeedbackEvent) {
        self.events.push_front(event);
        self.events.truncate(self.capacity);
    }

    /// Events from newest to oldest
    pub fn iter(&self) -> impl Iterator<Item = &FeedbackEvent> {
        self.events.iter()
    }

    pub fn latest(&self) -> Option<&FeedbackEvent> {
        self.events.front()
    }

    pub fn len(&self) -> usize {
        self.events.len()
    }

    pub fn is_empty(&self) -> bool {
        self.events.is_empty()
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }

    pub fn clear(&mut self) {
        self.events.clear();
    }
}

impl Default for FeedbackLog {
    fn default() -> Self {
        Self::with_capacity(Self::DEFAULT_CAPACITY)
    }
}

// =============================================================================
// Profiles
// =============================================================================

/// Per-user state: attribute/tag affinities, latent factors and history.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct UserProfile {
    pub user_id: UserId,
    /// Affinity per attribute or tag name. Missing keys count as 0.
    pub affinities: BTreeMap<String, f32>,
    /// Latent factor vector of length K
    pub factors: Vec<f32>,
    #[serde(default)]
    pub feedback: FeedbackLog,
}

impl UserProfile {
    pub fn new(
        user_id: impl Into<UserId>,
        affinities: BTreeMap<String, f32>,
        factors: Vec<f32>,
        feedback_capacity: usize,
    ) -> Self {
        Self {
            user_id: user_id.into(),
            affinities,
            factors,
            feedback: FeedbackLog::with_capacity(feedback_capacity),
        }
    }

    /// Affinity for a name, 0 when the profile has none
    pub fn affinity(&self, name: &str) -> f32 {
        self.affinities.get(name).copied().unwrap_or(0.0)
    }

    /// Restore affinities and factors and forget all feedback.
    /// The user id and log capacity are kept.
    pub fn reset_to(&mut self, affinities: BTreeMap<String, f32>, factors: Vec<f32>) {
        self.affinities = affinities;
        self.factors = factors;
        self.feedback.clear();
    }
}

// =============================================================================
// Catalog - the read-only item index
// =============================================================================

/// Validated, read-only item collection.
///
/// Items keep their insertion order (the ranking tie-break order) and are
/// also reachable by id. Every item's attribute vector matches the schema
/// length and every factor vector has the same length K.
#[derive(Debug, Clone)]
pub struct Catalog {
    pub(crate) schema: AttributeSchema,
    pub(crate) items: Vec<Item>,
    pub(crate) positions: HashMap<ItemId, usize>,
    pub(crate) factor_dim: usize,
}

impl Catalog {
    /// Get an item by id
    pub fn get_item(&self, id: &str) -> Option<&Item> {
        self.positions.get(id).map(|&pos| &self.items[pos])
    }

    /// Like [`get_item`](Self::get_item) but with a typed error
    pub fn require_item(&self, id: &str) -> Result<&Item> {
        self.get_item(id)
            .ok_or_else(|| CatalogError::ItemNotFound(id.to_string()))
    }

    /// All items in catalog order
    pub fn items(&self) -> &[Item] {
        &self.items
    }

    pub fn schema(&self) -> &AttributeSchema {
        &self.schema
    }

    /// Length K of every latent factor vector in this catalog
    pub fn factor_dim(&self) -> usize {
        self.factor_dim
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn event(item: &str, rating: f32) -> FeedbackEvent {
        FeedbackEvent {
            item_id: item.to_string(),
            rating,
            timestamp: 1_700_000_000,
            reason: "test".to_string(),
        }
    }

    #[test]
    fn test_feedback_log_evicts_oldest() {
        let mut log = FeedbackLog::with_capacity(5);
        for i in 0..7 {
            log.push(event(&format!("m{}", i), 0.5));
        }

        assert_eq!(log.len(), 5);
        // Newest first: m6..m2 survive, m0 and m1 were evicted
        let ids: Vec<_> = log.iter().map(|e| e.item_id.as_str()).collect();
        assert_eq!(ids, vec!["m6", "m5", "m4", "m3", "m2"]);
        assert_eq!(log.latest().unwrap().item_id, "m6");
    }

    #[test]
    fn test_rating_scale_clamp() {
        let stars = RatingScale::stars();
        assert_eq!(stars.clamp(7.0), 5.0);
        assert_eq!(stars.clamp(-2.0), 1.0);
        assert_eq!(stars.clamp(3.5), 3.5);
        assert_eq!(stars.midpoint(), 3.0);

        let unit = RatingScale::unit();
        assert_eq!(unit.clamp(f32::NAN), 0.0);
        assert_eq!(unit.midpoint(), 0.5);
    }

    #[test]
    fn test_profile_missing_affinity_is_zero() {
        let profile = UserProfile::new("u1", BTreeMap::new(), vec![0.1, 0.2], 5);
        assert_eq!(profile.affinity("Western"), 0.0);
    }

    #[test]
    fn test_profile_reset_keeps_identity() {
        let mut profile = UserProfile::new("u1", BTreeMap::new(), vec![0.1, 0.2], 5);
        profile.feedback.push(event("m1", 1.0));
        profile.affinities.insert("Drama".to_string(), 2.0);

        let defaults = BTreeMap::from([("Action".to_string(), 0.6)]);
        profile.reset_to(defaults.clone(), vec![0.0, 0.0]);

        assert_eq!(profile.user_id, "u1");
        assert_eq!(profile.affinities, defaults);
        assert_eq!(profile.factors, vec![0.0, 0.0]);
        assert!(profile.feedback.is_empty());
        assert_eq!(profile.feedback.capacity(), 5);
    }

    #[test]
    fn test_schema_positions() {
        let schema = AttributeSchema::default();
        assert_eq!(schema.len(), 4);
        assert_eq!(schema.position("Sci-Fi"), Some(3));
        assert_eq!(schema.position("Western"), None);
    }
}
