//! Catalog building and validation.
//!
//! A catalog is only ever constructed through [`Catalog::from_items`], so
//! the dimension invariants hold for every `Catalog` value in the program.

use crate::error::{CatalogError, Result};
use crate::parser;
use crate::types::*;
use std::collections::HashMap;
use std::path::Path;
use tracing::info;

impl Catalog {
    /// Build a catalog from already-parsed items.
    ///
    /// Fails when an item id repeats, when an attribute vector does not
    /// match the schema, or when factor vectors disagree on K (the first
    /// item fixes K).
    pub fn from_items(schema: AttributeSchema, items: Vec<Item>) -> Result<Self> {
        let factor_dim = items.first().map(|item| item.factors.len()).unwrap_or(0);
        let mut positions = HashMap::with_capacity(items.len());

        for (pos, item) in items.iter().enumerate() {
            if positions.insert(item.id.clone(), pos).is_some() {
                return Err(CatalogError::DuplicateItem(item.id.clone()));
            }
        }

        let catalog = Self {
            schema,
            items,
            positions,
            factor_dim,
        };
        catalog.validate()?;
        Ok(catalog)
    }

    /// Load a catalog from a directory holding attributes.dat and items.dat
    pub fn load_from_files(data_dir: &Path) -> Result<Self> {
        info!("Loading catalog from {:?}", data_dir);

        let schema = parser::parse_schema(&data_dir.join("attributes.dat"))?;
        let items = parser::parse_items(&data_dir.join("items.dat"))?;

        let catalog = Self::from_items(schema, items)?;
        info!(
            "Loaded {} items ({} attributes, {} latent factors)",
            catalog.len(),
            catalog.schema.len(),
            catalog.factor_dim
        );
        Ok(catalog)
    }

    /// Check the dimension and range invariants of every item
    pub fn validate(&self) -> Result<()> {
        for item in &self.items {
            if item.attributes.len() != self.schema.len() {
                return Err(CatalogError::DimensionMismatch {
                    entity: format!("attributes of item {}", item.id),
                    expected: self.schema.len(),
                    found: item.attributes.len(),
                });
            }
            if item.factors.len() != self.factor_dim {
                return Err(CatalogError::DimensionMismatch {
                    entity: format!("factors of item {}", item.id),
                    expected: self.factor_dim,
                    found: item.factors.len(),
                });
            }
            if let Some(value) = item
                .attributes
                .iter()
                .find(|v| !(0.0..=1.0).contains(*v))
            {
                return Err(CatalogError::InvalidValue {
                    field: format!("attribute of item {}", item.id),
                    value: value.to_string(),
                });
            }
        }
        Ok(())
    }
}
