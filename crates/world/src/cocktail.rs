//! Cocktail items: the mixer's output, carrying the mix in their tag.

use crate::ingredient::{Ingredient, IngredientId};
use drinkmix_core::{ItemStack, RegistryKey, TagValue};
use serde::{Deserialize, Serialize};

/// Tag holding the embedded ingredient id list.
pub const TAG_INGREDIENTS: &str = "Ingredients";
/// Tag holding the drink id (0 for an unnamed mix).
pub const TAG_DRINK_ID: &str = "DrinkID";
/// Tag holding the RGB colour.
pub const TAG_COLOR: &str = "Color";

/// A named drink produced by a mixer recipe.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Drink {
    /// Stable drink id; 0 is reserved for unnamed mixes.
    pub id: u8,
    /// Display key, e.g. `tropic:drink/pina_colada`.
    pub key: RegistryKey,
    /// RGB colour of the drink.
    pub color: u32,
}

/// Build a cocktail stack.
///
/// Named drinks keep their own colour; unnamed mixes average the ingredient
/// colours channel by channel.
pub fn make_cocktail(
    cocktail_item: &RegistryKey,
    drink: Option<&Drink>,
    ingredients: &[&Ingredient],
) -> ItemStack {
    let color = match drink {
        Some(drink) => drink.color,
        None => blend_colors(ingredients.iter().map(|i| i.color)),
    };
    let ids = ingredients.iter().map(|i| i32::from(i.id)).collect();

    ItemStack::new(cocktail_item.clone(), 1)
        .with_tag(TAG_INGREDIENTS, TagValue::IntList(ids))
        .with_tag(TAG_DRINK_ID, TagValue::Int(drink.map_or(0, |d| i32::from(d.id))))
        .with_tag(TAG_COLOR, TagValue::Int(color as i32))
}

/// Ingredient ids embedded in a cocktail stack; out-of-range entries are skipped.
pub fn cocktail_ingredients(stack: &ItemStack) -> Vec<IngredientId> {
    stack
        .tag_int_list(TAG_INGREDIENTS)
        .unwrap_or_default()
        .iter()
        .filter_map(|&id| IngredientId::try_from(id).ok())
        .collect()
}

/// Drink id of a cocktail, `None` for unnamed mixes and non-cocktails.
pub fn cocktail_drink_id(stack: &ItemStack) -> Option<u8> {
    stack
        .tag_int(TAG_DRINK_ID)
        .and_then(|id| u8::try_from(id).ok())
        .filter(|&id| id != 0)
}

/// RGB colour stored on a cocktail.
pub fn cocktail_color(stack: &ItemStack) -> Option<u32> {
    stack.tag_int(TAG_COLOR).map(|c| c as u32)
}

fn blend_colors(colors: impl Iterator<Item = u32>) -> u32 {
    let (mut r, mut g, mut b, mut n) = (0u32, 0u32, 0u32, 0u32);
    for c in colors {
        r += (c >> 16) & 0xff;
        g += (c >> 8) & 0xff;
        b += c & 0xff;
        n += 1;
    }
    if n == 0 {
        return 0xffffff;
    }
    ((r / n) << 16) | ((g / n) << 8) | (b / n)
}
