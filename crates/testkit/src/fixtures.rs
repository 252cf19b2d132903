//! Shared drink fixtures for tests.

use drinkmix_core::{ItemStack, RegistryKey};
use drinkmix_world::{
    Drink, DrinkMixerRegistry, Ingredient, IngredientId, IngredientTable, MixerEnv, MixerHost,
    MixerRecipe,
};

/// Cocktail item key used by the fixtures.
pub const COCKTAIL_ITEM: &str = "tropic:cocktail";

/// Fixture ingredients as `(id, item, colour)`.
pub const FIXTURE_INGREDIENTS: &[(IngredientId, &str, u32)] = &[
    (1, "tropic:sugar", 0xffffff),
    (2, "tropic:lemon", 0xffff00),
    (3, "tropic:lime", 0x7fff00),
    (4, "tropic:orange", 0xffa500),
    (5, "tropic:coconut", 0xefefef),
    (6, "tropic:pineapple", 0xeeff00),
    (7, "tropic:water_bottle", 0x3f76e4),
    (8, "tropic:coffee_beans", 0x68442f),
];

/// Fixture recipes as `(drink id, drink name, ingredient ids)`.
pub const FIXTURE_RECIPES: &[(u8, &str, &[IngredientId])] = &[
    (1, "lemonade", &[1, 2, 7]),
    (2, "limeade", &[1, 3, 7]),
    (3, "orangeade", &[1, 4, 7]),
    (4, "pina_colada", &[6, 5]),
    (5, "black_coffee", &[8, 7]),
];

/// Parse a key, panicking on invalid fixture input.
pub fn key(s: &str) -> RegistryKey {
    RegistryKey::parse(s).expect("fixture key is valid")
}

/// A single-item stack.
pub fn item(s: &str) -> ItemStack {
    ItemStack::new(key(s), 1)
}

/// Ingredient table with bottle and mug containers.
pub fn tropical_table() -> IngredientTable {
    let ingredients = FIXTURE_INGREDIENTS
        .iter()
        .map(|&(id, name, color)| Ingredient {
            id,
            key: key(&format!("tropic:ingredient/{}", key(name).path())),
            stack: item(name),
            primary: matches!(name, "tropic:coconut" | "tropic:pineapple"),
            color,
        })
        .collect();

    IngredientTable::new(key(COCKTAIL_ITEM), ingredients)
        .expect("fixture ingredients are unique")
        .with_container(key("tropic:water_bottle"), item("mc:glass_bottle"))
        .with_container(key(COCKTAIL_ITEM), item("tropic:bamboo_mug"))
}

/// Recipe registry over [`tropical_table`].
pub fn tropical_registry() -> DrinkMixerRegistry {
    let recipes = FIXTURE_RECIPES
        .iter()
        .map(|&(id, name, ingredients)| MixerRecipe {
            drink: Drink {
                id,
                key: key(&format!("tropic:drink/{name}")),
                color: 0x100000 * u32::from(id),
            },
            ingredients: ingredients.to_vec(),
        })
        .collect();
    DrinkMixerRegistry::new(tropical_table(), recipes).expect("fixture recipes are valid")
}

/// Borrow `registry` and `host` as a mixer environment.
pub fn mixer_env<'a>(
    registry: &'a DrinkMixerRegistry,
    host: &'a mut dyn MixerHost,
) -> MixerEnv<'a> {
    MixerEnv {
        ingredients: registry.ingredients(),
        recipes: registry,
        host,
    }
}
