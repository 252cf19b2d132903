#![warn(missing_docs)]
//! Drink pack schema + loading into ingredient tables and recipe registries.

mod loader;

pub use loader::{default_registry, registry_from_file, registry_from_pack, registry_from_str};

use drinkmix_core::RegistryKeyError;
use drinkmix_world::RecipeError;
use serde::Deserialize;
use std::collections::BTreeMap;
use thiserror::Error;

/// Built-in tropical drink pack.
pub const DEFAULT_PACK: &str = include_str!("../packs/tropical.json");

/// Top-level drink pack document.
#[derive(Debug, Deserialize)]
pub struct DrinkPack {
    /// Item key of the cocktail produced by the mixer.
    pub cocktail_item: String,
    /// Leftover container per item key.
    #[serde(default)]
    pub containers: BTreeMap<String, String>,
    /// Recognized ingredients.
    pub ingredients: Vec<IngredientDefinition>,
    /// Named drinks and their recipes.
    #[serde(default)]
    pub drinks: Vec<DrinkDefinition>,
}

/// One ingredient entry.
#[derive(Debug, Deserialize)]
pub struct IngredientDefinition {
    /// Stable numeric id.
    pub id: u16,
    /// Short name, referenced by drink recipes (e.g. "lime").
    pub name: String,
    /// Item key that counts as this ingredient.
    pub item: String,
    /// Item damage value to match.
    #[serde(default)]
    pub damage: u16,
    /// Colour as `#rrggbb`.
    pub color: String,
    /// Base ingredient flag.
    #[serde(default)]
    pub primary: bool,
}

/// One drink entry with its recipe.
#[derive(Debug, Deserialize)]
pub struct DrinkDefinition {
    /// Stable drink id (non-zero).
    pub id: u8,
    /// Short name (e.g. "pina_colada").
    pub name: String,
    /// Colour as `#rrggbb`.
    pub color: String,
    /// Ingredient names.
    pub ingredients: Vec<String>,
}

/// Errors emitted during pack loading.
#[derive(Debug, Error)]
pub enum AssetError {
    /// Wrap IO errors when reading packs.
    #[error("failed to read drink pack: {0}")]
    Io(#[from] std::io::Error),
    /// Wrap serde parsing issues.
    #[error("failed to parse drink pack: {0}")]
    Parse(#[from] serde_json::Error),
    /// An item or name was not a valid registry key.
    #[error("invalid key in drink pack: {0}")]
    Key(#[from] RegistryKeyError),
    /// Ingredient or recipe validation failed.
    #[error("invalid drink registry: {0}")]
    Registry(#[from] RecipeError),
    /// Any other semantic problem.
    #[error("invalid drink pack: {0}")]
    Invalid(String),
}

/// Parse a JSON string into a drink pack.
pub fn load_pack_from_str(input: &str) -> Result<DrinkPack, AssetError> {
    Ok(serde_json::from_str(input)?)
}
