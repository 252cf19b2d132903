//! Mixer ingredients and the lookup table that recognizes them.

use crate::cocktail;
use crate::mixer_recipes::RecipeError;
use drinkmix_core::{ItemStack, RegistryKey};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Identifier of an ingredient, stable across saves.
pub type IngredientId = u16;

/// A recognized drink ingredient.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Ingredient {
    /// Stable numeric id, embedded in cocktail tags.
    pub id: IngredientId,
    /// Display key, e.g. `tropic:ingredient/pineapple`.
    pub key: RegistryKey,
    /// The item that counts as this ingredient (matched exactly, count aside).
    pub stack: ItemStack,
    /// Whether this is a base ingredient. Not enforced by the mixer.
    #[serde(default)]
    pub primary: bool,
    /// RGB colour contributed to unnamed mixes.
    pub color: u32,
}

/// Read-only ingredient lookup used by the mixer.
pub trait IngredientLookup {
    /// Find the ingredient whose item matches `stack` exactly.
    fn find_matching(&self, stack: &ItemStack) -> Option<&Ingredient>;

    /// Look an ingredient up by id.
    fn by_id(&self, id: IngredientId) -> Option<&Ingredient>;

    /// Whether `stack` is a cocktail item.
    fn is_cocktail(&self, stack: &ItemStack) -> bool;

    /// Item left behind once `stack` is consumed (e.g. an empty bottle).
    fn container_item(&self, stack: &ItemStack) -> Option<ItemStack>;

    /// Resolve a stack to the ingredient ids it contributes.
    ///
    /// A cocktail yields its embedded list; anything else yields at most one id.
    fn list_ingredients(&self, stack: &ItemStack) -> Vec<IngredientId> {
        if self.is_cocktail(stack) {
            cocktail::cocktail_ingredients(stack)
        } else {
            self.find_matching(stack).map(|i| i.id).into_iter().collect()
        }
    }
}

/// Immutable ingredient table with the cocktail item and container mappings.
#[derive(Debug, Clone)]
pub struct IngredientTable {
    cocktail_item: RegistryKey,
    ingredients: BTreeMap<IngredientId, Ingredient>,
    containers: BTreeMap<RegistryKey, ItemStack>,
}

impl IngredientTable {
    /// Build a table, rejecting duplicate ids and duplicate items.
    pub fn new(
        cocktail_item: RegistryKey,
        ingredients: Vec<Ingredient>,
    ) -> Result<Self, RecipeError> {
        let mut by_id: BTreeMap<IngredientId, Ingredient> = BTreeMap::new();
        for ingredient in ingredients {
            if by_id.contains_key(&ingredient.id) {
                return Err(RecipeError::DuplicateIngredient(ingredient.id));
            }
            if let Some(existing) = by_id
                .values()
                .find(|other| other.stack.is_same_item(&ingredient.stack))
            {
                return Err(RecipeError::AmbiguousItem {
                    first: existing.id,
                    second: ingredient.id,
                });
            }
            by_id.insert(ingredient.id, ingredient);
        }

        Ok(Self {
            cocktail_item,
            ingredients: by_id,
            containers: BTreeMap::new(),
        })
    }

    /// Register the leftover container for an item.
    pub fn with_container(mut self, item: RegistryKey, container: ItemStack) -> Self {
        self.containers.insert(item, container);
        self
    }

    /// Key of the cocktail item.
    pub fn cocktail_item(&self) -> &RegistryKey {
        &self.cocktail_item
    }

    /// All ingredients, ordered by id.
    pub fn iter(&self) -> impl Iterator<Item = &Ingredient> {
        self.ingredients.values()
    }

    /// Number of registered ingredients.
    pub fn len(&self) -> usize {
        self.ingredients.len()
    }

    /// Returns true when no ingredients are registered.
    pub fn is_empty(&self) -> bool {
        self.ingredients.is_empty()
    }
}

impl IngredientLookup for IngredientTable {
    fn find_matching(&self, stack: &ItemStack) -> Option<&Ingredient> {
        self.ingredients
            .values()
            .find(|ingredient| ingredient.stack.is_same_item(stack))
    }

    fn by_id(&self, id: IngredientId) -> Option<&Ingredient> {
        self.ingredients.get(&id)
    }

    fn is_cocktail(&self, stack: &ItemStack) -> bool {
        stack.item == self.cocktail_item
    }

    fn container_item(&self, stack: &ItemStack) -> Option<ItemStack> {
        self.containers.get(&stack.item).map(|c| c.with_count(1))
    }
}
