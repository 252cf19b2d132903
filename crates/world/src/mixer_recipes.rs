//! Drink mixer recipe registry.
//!
//! A recipe is a named [`Drink`] plus the set of ingredient ids that produce
//! it. Matching is order-independent: the mixer slots are flattened to
//! ingredient ids (cocktails expand to their embedded list) and compared as a
//! sorted multiset against every registered recipe.

use crate::cocktail::{self, Drink};
use crate::drink_mixer::MAX_INGREDIENTS;
use crate::ingredient::{Ingredient, IngredientId, IngredientLookup, IngredientTable};
use drinkmix_core::ItemStack;
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Errors raised while building ingredient tables and recipe registries.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum RecipeError {
    /// Two ingredients share an id.
    #[error("duplicate ingredient id {0}")]
    DuplicateIngredient(IngredientId),
    /// Two ingredients match the same item.
    #[error("ingredients {first} and {second} match the same item")]
    AmbiguousItem {
        /// First registered ingredient.
        first: IngredientId,
        /// Conflicting ingredient.
        second: IngredientId,
    },
    /// Two drinks share an id, or a drink used the reserved id 0.
    #[error("invalid or duplicate drink id {0}")]
    InvalidDrinkId(u8),
    /// A recipe referenced an ingredient that is not registered.
    #[error("recipe for drink {drink} references unknown ingredient {ingredient}")]
    UnknownIngredient {
        /// Drink the recipe produces.
        drink: u8,
        /// Missing ingredient id.
        ingredient: IngredientId,
    },
    /// A recipe listed no ingredients, too many, or repeated one.
    #[error("recipe for drink {0} must list one to three distinct ingredients")]
    MalformedRecipe(u8),
    /// Two recipes use the same ingredient combination.
    #[error("drinks {first} and {second} share an ingredient combination")]
    ConflictingRecipes {
        /// First registered drink.
        first: u8,
        /// Conflicting drink.
        second: u8,
    },
}

/// Recipe resolver consulted by the mixer.
pub trait MixerRecipes {
    /// Whether the slot contents form a known recipe.
    fn is_valid_recipe(&self, slots: &[Option<ItemStack>]) -> bool;

    /// Output produced by the slot contents, if they form a known recipe.
    fn result(&self, slots: &[Option<ItemStack>]) -> Option<ItemStack>;
}

/// A drink and the ingredient ids that make it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MixerRecipe {
    /// Produced drink.
    pub drink: Drink,
    /// Ingredient ids, in display order.
    pub ingredients: Vec<IngredientId>,
}

impl MixerRecipe {
    fn sorted_ids(&self) -> Vec<IngredientId> {
        let mut ids = self.ingredients.clone();
        ids.sort_unstable();
        ids
    }
}

/// Default [`MixerRecipes`] implementation backed by an [`IngredientTable`].
#[derive(Debug, Clone)]
pub struct DrinkMixerRegistry {
    table: IngredientTable,
    recipes: Vec<(Vec<IngredientId>, MixerRecipe)>,
}

impl DrinkMixerRegistry {
    /// Build a registry, validating every recipe against `table`.
    pub fn new(table: IngredientTable, recipes: Vec<MixerRecipe>) -> Result<Self, RecipeError> {
        let mut registered: Vec<(Vec<IngredientId>, MixerRecipe)> =
            Vec::with_capacity(recipes.len());

        for recipe in recipes {
            let drink_id = recipe.drink.id;
            if drink_id == 0 || registered.iter().any(|(_, r)| r.drink.id == drink_id) {
                return Err(RecipeError::InvalidDrinkId(drink_id));
            }
            if let Some(&missing) = recipe
                .ingredients
                .iter()
                .find(|&&id| table.by_id(id).is_none())
            {
                return Err(RecipeError::UnknownIngredient {
                    drink: drink_id,
                    ingredient: missing,
                });
            }

            let sorted = recipe.sorted_ids();
            if sorted.is_empty()
                || sorted.len() > MAX_INGREDIENTS
                || sorted.windows(2).any(|w| w[0] == w[1])
            {
                return Err(RecipeError::MalformedRecipe(drink_id));
            }
            if let Some((_, existing)) = registered.iter().find(|(ids, _)| *ids == sorted) {
                return Err(RecipeError::ConflictingRecipes {
                    first: existing.drink.id,
                    second: drink_id,
                });
            }
            registered.push((sorted, recipe));
        }

        Ok(Self {
            table,
            recipes: registered,
        })
    }

    /// The ingredient table recipes are resolved against.
    pub fn ingredients(&self) -> &IngredientTable {
        &self.table
    }

    /// Registered recipes in registration order.
    pub fn recipes(&self) -> impl Iterator<Item = &MixerRecipe> {
        self.recipes.iter().map(|(_, recipe)| recipe)
    }

    /// Recipe producing the drink with `id`.
    pub fn recipe_for_drink(&self, id: u8) -> Option<&MixerRecipe> {
        self.recipes().find(|r| r.drink.id == id)
    }

    /// Find the recipe matching the slot contents.
    pub fn find_recipe(&self, slots: &[Option<ItemStack>]) -> Option<&MixerRecipe> {
        let mut ids = self.flatten(slots)?;
        ids.sort_unstable();
        self.recipes
            .iter()
            .find(|(sorted, _)| *sorted == ids)
            .map(|(_, recipe)| recipe)
    }

    /// Slot contents as ingredient ids; `None` if any filled slot is unrecognized.
    fn flatten(&self, slots: &[Option<ItemStack>]) -> Option<Vec<IngredientId>> {
        let mut ids = Vec::new();
        for stack in slots.iter().flatten() {
            let resolved = self.table.list_ingredients(stack);
            if resolved.is_empty() {
                return None;
            }
            ids.extend(resolved);
        }
        Some(ids)
    }
}

impl MixerRecipes for DrinkMixerRegistry {
    fn is_valid_recipe(&self, slots: &[Option<ItemStack>]) -> bool {
        self.find_recipe(slots).is_some()
    }

    fn result(&self, slots: &[Option<ItemStack>]) -> Option<ItemStack> {
        let recipe = self.find_recipe(slots)?;
        let ingredients: Vec<&Ingredient> = self
            .flatten(slots)?
            .into_iter()
            .filter_map(|id| self.table.by_id(id))
            .collect();
        Some(cocktail::make_cocktail(
            self.table.cocktail_item(),
            Some(&recipe.drink),
            &ingredients,
        ))
    }
}
