use std::collections::BTreeMap;
use std::fs;
use std::path::Path;

use drinkmix_core::{ItemStack, RegistryKey};
use drinkmix_world::{
    Drink, DrinkMixerRegistry, Ingredient, IngredientId, IngredientTable, MixerRecipe,
};

use crate::{AssetError, DrinkPack, DEFAULT_PACK};

/// Load a recipe registry from the provided JSON file path.
pub fn registry_from_file(path: &Path) -> Result<DrinkMixerRegistry, AssetError> {
    let data = fs::read_to_string(path)?;
    registry_from_str(&data)
}

/// Load a recipe registry from an in-memory JSON string.
pub fn registry_from_str(input: &str) -> Result<DrinkMixerRegistry, AssetError> {
    let pack = crate::load_pack_from_str(input)?;
    registry_from_pack(pack)
}

/// The built-in tropical pack.
pub fn default_registry() -> Result<DrinkMixerRegistry, AssetError> {
    registry_from_str(DEFAULT_PACK)
}

/// Build the ingredient table and recipe registry described by `pack`.
pub fn registry_from_pack(pack: DrinkPack) -> Result<DrinkMixerRegistry, AssetError> {
    let mut names: BTreeMap<String, IngredientId> = BTreeMap::new();
    let mut ingredients = Vec::with_capacity(pack.ingredients.len());
    for def in pack.ingredients {
        if names.insert(def.name.clone(), def.id).is_some() {
            return Err(AssetError::Invalid(format!(
                "ingredient name `{}` used twice",
                def.name
            )));
        }
        ingredients.push(Ingredient {
            id: def.id,
            key: RegistryKey::parse(&format!("ingredient/{}", def.name))?,
            stack: ItemStack::new(RegistryKey::parse(&def.item)?, 1).with_damage(def.damage),
            primary: def.primary,
            color: parse_color(&def.color)?,
        });
    }

    let mut table = IngredientTable::new(RegistryKey::parse(&pack.cocktail_item)?, ingredients)?;
    for (item, container) in pack.containers {
        table = table.with_container(
            RegistryKey::parse(&item)?,
            ItemStack::new(RegistryKey::parse(&container)?, 1),
        );
    }

    let mut recipes = Vec::with_capacity(pack.drinks.len());
    for def in pack.drinks {
        let ids = def
            .ingredients
            .iter()
            .map(|name| {
                names.get(name).copied().ok_or_else(|| {
                    AssetError::Invalid(format!(
                        "drink `{}` uses unknown ingredient `{name}`",
                        def.name
                    ))
                })
            })
            .collect::<Result<Vec<_>, _>>()?;
        recipes.push(MixerRecipe {
            drink: Drink {
                id: def.id,
                key: RegistryKey::parse(&format!("drink/{}", def.name))?,
                color: parse_color(&def.color)?,
            },
            ingredients: ids,
        });
    }

    Ok(DrinkMixerRegistry::new(table, recipes)?)
}

fn parse_color(raw: &str) -> Result<u32, AssetError> {
    raw.strip_prefix('#')
        .filter(|hex| hex.len() == 6)
        .and_then(|hex| u32::from_str_radix(hex, 16).ok())
        .ok_or_else(|| AssetError::Invalid(format!("colour `{raw}` is not #rrggbb")))
}
