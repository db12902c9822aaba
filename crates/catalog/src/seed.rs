//! Built-in demo catalog and profile defaults.
//!
//! Used whenever no data directory is configured, and as the target of
//! profile resets.

use crate::error::Result;
use crate::types::*;
use std::collections::BTreeMap;

/// Latent factors every new profile starts from
pub const DEFAULT_USER_FACTORS: [f32; 3] = [0.42, 0.11, 0.55];

/// Starting affinities keyed by the default schema's attribute names
pub fn default_affinities() -> BTreeMap<String, f32> {
    BTreeMap::from([
        ("Action".to_string(), 0.6),
        ("Drama".to_string(), 0.4),
        ("Comedy".to_string(), 0.3),
        ("Sci-Fi".to_string(), 0.7),
    ])
}

/// A fresh profile with default affinities, factors and an empty log
pub fn default_profile(user_id: impl Into<UserId>, feedback_capacity: usize) -> UserProfile {
    UserProfile::new(
        user_id,
        default_affinities(),
        DEFAULT_USER_FACTORS.to_vec(),
        feedback_capacity,
    )
}

fn seed_item(
    id: &str,
    title: &str,
    year: u16,
    tags: &[&str],
    attributes: [f32; 4],
    factors: [f32; 3],
    synopsis: &str,
) -> Item {
    Item {
        id: id.to_string(),
        title: title.to_string(),
        synopsis: synopsis.to_string(),
        year: Some(year),
        tags: tags.iter().map(|t| t.to_string()).collect(),
        attributes: attributes.to_vec(),
        factors: factors.to_vec(),
    }
}

/// The five-title demo catalog
pub fn seed_catalog() -> Result<Catalog> {
    let items = vec![
        seed_item(
            "m1",
            "Nebula Drift",
            2021,
            &["sci-fi", "space", "rescue"],
            [0.8, 0.2, 0.1, 0.9],
            [0.9, 0.1, 0.4],
            "A sci-fi rescue mission becomes a test of loyalty.",
        ),
        seed_item(
            "m2",
            "Laughing Signals",
            2019,
            &["comedy", "friendship"],
            [0.1, 0.3, 0.95, 0.1],
            [0.2, 0.8, 0.3],
            "Roommates launch a prank channel that turns into a movement.",
        ),
        seed_item(
            "m3",
            "Steel Harbor",
            2020,
            &["crime", "detective", "drama"],
            [0.6, 0.7, 0.2, 0.2],
            [0.6, 0.4, 0.3],
            "A detective uncovers corruption in a coastal megacity.",
        ),
        seed_item(
            "m4",
            "Midnight Sonata",
            2018,
            &["drama", "music"],
            [0.1, 0.9, 0.2, 0.1],
            [0.1, 0.9, 0.2],
            "A pianist confronts her past through a haunting melody.",
        ),
        seed_item(
            "m5",
            "Quantum Circus",
            2022,
            &["sci-fi", "comedy", "adventure"],
            [0.7, 0.3, 0.6, 0.8],
            [0.7, 0.3, 0.5],
            "Time-warping performers try to save their interstellar troupe.",
        ),
    ];

    Catalog::from_items(AttributeSchema::default(), items)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_seed_catalog_is_valid() {
        let catalog = seed_catalog().unwrap();
        assert_eq!(catalog.len(), 5);
        assert_eq!(catalog.factor_dim(), DEFAULT_USER_FACTORS.len());
        assert_eq!(catalog.get_item("m1").unwrap().title, "Nebula Drift");
    }

    #[test]
    fn test_default_profile_covers_schema() {
        let profile = default_profile("u1", 5);
        for name in AttributeSchema::default().names() {
            assert!(profile.affinities.contains_key(name), "missing {}", name);
        }
        assert_eq!(profile.factors, DEFAULT_USER_FACTORS.to_vec());
    }
}
