//! Drink mixer block entity.
//!
//! Collects up to three ingredients, checks them against the recipe
//! resolver, mixes for [`MIX_DURATION`] ticks and holds the resulting
//! cocktail until it is retrieved.
//!
//! ```text
//! Idle -> Filling(1..=3) -> Ready -> Mixing(0..80) -> Done -> (retrieve) -> Idle
//!   ^______________________ empty_mixer ___________________________|
//! ```
//!
//! Collaborators are passed in through [`MixerEnv`] so the state machine runs
//! without a host engine.

use crate::host::MixerHost;
use crate::ingredient::{IngredientId, IngredientLookup};
use crate::mixer_recipes::MixerRecipes;
use crate::persist::MixerRecord;
use crate::sync::BlockEntityUpdate;
use anyhow::Result;
use drinkmix_core::{BlockPos, ItemStack, TICKS_PER_SECOND};
use thiserror::Error;
use tracing::{debug, error, info, warn};

/// Ticks a mix takes (4 seconds).
pub const MIX_DURATION: u32 = 4 * TICKS_PER_SECOND;

/// Number of ingredient slots.
pub const MAX_INGREDIENTS: usize = 3;

/// Why an insertion was refused.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum InsertError {
    /// Every ingredient slot is filled.
    #[error("mixer is full")]
    Full,
    /// The stack is neither a known ingredient nor a cocktail.
    #[error("item is not a drink ingredient")]
    Unrecognized,
    /// Cocktails only go in alone; nothing joins them and they join nothing.
    #[error("cocktails cannot be combined with other ingredients")]
    CocktailNotAlone,
    /// A mix is running or a finished cocktail is waiting.
    #[error("mixer is busy")]
    Busy,
    /// The ingredient is already in the mixer.
    #[error("ingredient {id} is already in the mixer")]
    Duplicate {
        /// Duplicated ingredient.
        id: IngredientId,
    },
}

/// Collaborators the mixer calls into.
pub struct MixerEnv<'a> {
    /// Ingredient lookup table.
    pub ingredients: &'a dyn IngredientLookup,
    /// Recipe resolver.
    pub recipes: &'a dyn MixerRecipes,
    /// World and sync services.
    pub host: &'a mut dyn MixerHost,
}

/// State of a drink mixer in the world.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MixerState {
    pos: BlockPos,
    ingredients: [Option<ItemStack>; MAX_INGREDIENTS],
    result: Option<ItemStack>,
    mixing: bool,
    ticks: u32,
}

impl MixerState {
    /// Create an empty mixer at `pos`.
    pub fn new(pos: BlockPos) -> Self {
        Self {
            pos,
            ingredients: Default::default(),
            result: None,
            mixing: false,
            ticks: 0,
        }
    }

    /// Location of this mixer.
    pub fn pos(&self) -> BlockPos {
        self.pos
    }

    /// Ingredient slots in fill order.
    pub fn ingredients(&self) -> &[Option<ItemStack>; MAX_INGREDIENTS] {
        &self.ingredients
    }

    /// Number of filled ingredient slots.
    pub fn ingredient_count(&self) -> usize {
        self.ingredients.iter().flatten().count()
    }

    /// Finished cocktail, if any.
    pub fn result(&self) -> Option<&ItemStack> {
        self.result.as_ref()
    }

    /// Elapsed mixing ticks.
    pub fn ticks(&self) -> u32 {
        self.ticks
    }

    /// Whether a mix is running.
    pub fn is_mixing(&self) -> bool {
        self.mixing
    }

    /// Whether a finished cocktail is waiting.
    pub fn is_done_mixing(&self) -> bool {
        self.result.is_some()
    }

    /// Mix progress in `0.0..=1.0`, for rendering.
    pub fn progress(&self) -> f32 {
        self.ticks as f32 / MIX_DURATION as f32
    }

    /// Put `stack` into the first empty slot.
    ///
    /// # Returns
    /// `true` if the stack was accepted.
    pub fn insert(&mut self, stack: &ItemStack, env: &mut MixerEnv<'_>) -> bool {
        match self.try_insert(stack, env) {
            Ok(_) => true,
            Err(reason) => {
                debug!(pos = %self.pos, item = %stack.item, %reason, "mixer rejected item");
                false
            }
        }
    }

    /// Put `stack` into the first empty slot, reporting why it was refused.
    ///
    /// # Returns
    /// Index of the filled slot.
    pub fn try_insert(
        &mut self,
        stack: &ItemStack,
        env: &mut MixerEnv<'_>,
    ) -> Result<usize, InsertError> {
        if self.mixing || self.result.is_some() {
            return Err(InsertError::Busy);
        }
        let slot = self
            .ingredients
            .iter()
            .position(Option::is_none)
            .ok_or(InsertError::Full)?;

        let is_cocktail = env.ingredients.is_cocktail(stack);
        if slot == 0 {
            // Any resolvable ingredient may start a mix; the primary flag is not enforced.
            if !is_cocktail && env.ingredients.find_matching(stack).is_none() {
                return Err(InsertError::Unrecognized);
            }
        } else {
            let first_is_cocktail = self.ingredients[0]
                .as_ref()
                .is_some_and(|first| env.ingredients.is_cocktail(first));
            if is_cocktail || first_is_cocktail {
                return Err(InsertError::CocktailNotAlone);
            }

            let id = env
                .ingredients
                .find_matching(stack)
                .map(|ingredient| ingredient.id)
                .ok_or(InsertError::Unrecognized)?;
            let duplicate = self
                .ingredients
                .iter()
                .flatten()
                .any(|held| env.ingredients.list_ingredients(held).contains(&id));
            if duplicate {
                return Err(InsertError::Duplicate { id });
            }
        }

        self.ingredients[slot] = Some(stack.clone());
        debug!(pos = %self.pos, slot, item = %stack.item, "ingredient added");
        self.sync(env);
        Ok(slot)
    }

    /// Whether a mix can start now.
    pub fn can_mix(&self, env: &MixerEnv<'_>) -> bool {
        !self.mixing
            && self.result.is_none()
            && env.recipes.is_valid_recipe(&self.ingredients)
    }

    /// Begin mixing.
    ///
    /// # Returns
    /// `false` without changing anything if [`can_mix`](Self::can_mix) is false.
    pub fn start_mixing(&mut self, env: &mut MixerEnv<'_>) -> bool {
        if !self.can_mix(env) {
            warn!(pos = %self.pos, "start_mixing called on a mixer that cannot mix");
            return false;
        }
        self.ticks = 0;
        self.mixing = true;
        debug!(pos = %self.pos, "mixing started");
        self.sync(env);
        true
    }

    /// Advance one simulation tick.
    ///
    /// # Returns
    /// `true` on the tick that finished the mix.
    pub fn tick(&mut self, env: &mut MixerEnv<'_>) -> bool {
        if !self.mixing || self.ticks >= MIX_DURATION {
            return false;
        }

        self.ticks += 1;
        if self.ticks < MIX_DURATION {
            return false;
        }

        self.finish_mixing(env);
        true
    }

    fn finish_mixing(&mut self, env: &mut MixerEnv<'_>) {
        self.result = env.recipes.result(&self.ingredients);
        self.mixing = false;
        match &self.result {
            Some(result) => info!(pos = %self.pos, item = %result.item, "mix finished"),
            None => warn!(pos = %self.pos, "mix finished without a matching recipe"),
        }
        self.sync(env);
    }

    /// Drop every ingredient and reset to idle.
    pub fn empty_mixer(&mut self, env: &mut MixerEnv<'_>) {
        for slot in self.ingredients.iter_mut() {
            if let Some(stack) = slot.take() {
                env.host.spawn_item(self.pos, stack);
            }
        }

        self.result = None;
        self.ticks = MIX_DURATION;
        self.mixing = false;
        debug!(pos = %self.pos, "mixer emptied");
        self.sync(env);
    }

    /// Drop the finished cocktail plus leftover containers, then reset to idle.
    ///
    /// # Returns
    /// `false` without changing anything if there is no result.
    pub fn retrieve_result(&mut self, env: &mut MixerEnv<'_>) -> bool {
        let Some(result) = self.result.take() else {
            warn!(pos = %self.pos, "retrieve_result called with no result");
            return false;
        };

        env.host.spawn_item(self.pos, result);
        for stack in self.ingredients.iter_mut().filter_map(Option::take) {
            if let Some(container) = env.ingredients.container_item(&stack) {
                env.host.spawn_item(self.pos, container);
            }
        }

        self.ticks = 0;
        self.mixing = false;
        debug!(pos = %self.pos, "result retrieved");
        self.sync(env);
        true
    }

    /// Snapshot as a persisted record.
    pub fn to_record(&self) -> MixerRecord {
        MixerRecord::from_parts(
            self.ticks,
            self.mixing,
            &self.ingredients,
            self.result.as_ref(),
        )
    }

    /// Overwrite this mixer with a persisted record.
    ///
    /// Out-of-range tick counts are clamped into `0..=MIX_DURATION`.
    pub fn load_record(&mut self, record: &MixerRecord) {
        self.ticks = record.ticks.clamp(0, MIX_DURATION as i32) as u32;
        self.mixing = record.mixing;
        self.ingredients = record.ingredients();
        self.result = record.result.clone();
    }

    /// Create a mixer at `pos` from a persisted record.
    pub fn from_record(pos: BlockPos, record: &MixerRecord) -> Self {
        let mut state = Self::new(pos);
        state.load_record(record);
        state
    }

    /// Full-state update packet for observers.
    pub fn update_packet(&self) -> Result<BlockEntityUpdate> {
        BlockEntityUpdate::mixer(self.pos, &self.to_record())
    }

    /// Apply an update received from the authoritative side.
    pub fn on_data_packet(&mut self, update: &BlockEntityUpdate) -> Result<()> {
        let record = update.mixer_record()?;
        self.load_record(&record);
        Ok(())
    }

    fn sync(&self, env: &mut MixerEnv<'_>) {
        match self.update_packet() {
            Ok(update) => env.host.notify_block_update(update),
            Err(err) => error!(pos = %self.pos, "failed to build mixer update: {err:#}"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cocktail::{self, Drink};
    use crate::host::LocalWorld;
    use crate::ingredient::{Ingredient, IngredientTable};
    use crate::mixer_recipes::{DrinkMixerRegistry, MixerRecipe};
    use drinkmix_core::RegistryKey;

    fn key(s: &str) -> RegistryKey {
        RegistryKey::parse(s).unwrap()
    }

    fn stack(item: &str) -> ItemStack {
        ItemStack::new(key(item), 1)
    }

    fn registry() -> DrinkMixerRegistry {
        let ingredients = ["pineapple", "coconut", "sugar", "water_bottle"]
            .iter()
            .enumerate()
            .map(|(i, name)| Ingredient {
                id: i as IngredientId + 1,
                key: key(&format!("tropic:ingredient/{name}")),
                stack: stack(&format!("tropic:{name}")),
                primary: false,
                color: 0xffee00,
            })
            .collect();
        let table = IngredientTable::new(key("tropic:cocktail"), ingredients)
            .unwrap()
            .with_container(key("tropic:water_bottle"), stack("mc:glass_bottle"));
        DrinkMixerRegistry::new(
            table,
            vec![
                MixerRecipe {
                    drink: Drink {
                        id: 1,
                        key: key("tropic:drink/pina_colada"),
                        color: 0xefefef,
                    },
                    ingredients: vec![1, 2, 4],
                },
                MixerRecipe {
                    drink: Drink {
                        id: 2,
                        key: key("tropic:drink/sugar_water"),
                        color: 0xddeeff,
                    },
                    ingredients: vec![3, 4],
                },
            ],
        )
        .unwrap()
    }

    macro_rules! env {
        ($registry:expr, $world:expr) => {
            MixerEnv {
                ingredients: $registry.ingredients(),
                recipes: &$registry,
                host: &mut $world,
            }
        };
    }

    #[test]
    fn test_insert_fills_slots_in_order() {
        let registry = registry();
        let mut world = LocalWorld::new();
        let mut env = env!(registry, world);
        let mut mixer = MixerState::new(BlockPos::new(0, 64, 0));

        assert_eq!(mixer.try_insert(&stack("tropic:pineapple"), &mut env), Ok(0));
        assert_eq!(mixer.try_insert(&stack("tropic:coconut"), &mut env), Ok(1));
        assert_eq!(mixer.try_insert(&stack("tropic:water_bottle"), &mut env), Ok(2));
        assert_eq!(
            mixer.try_insert(&stack("tropic:sugar"), &mut env),
            Err(InsertError::Full)
        );
        assert_eq!(mixer.ingredient_count(), 3);
        assert_eq!(world.pending_updates(), 3);
    }

    #[test]
    fn test_insert_rejections() {
        let registry = registry();
        let mut world = LocalWorld::new();
        let mut env = env!(registry, world);
        let mut mixer = MixerState::new(BlockPos::default());

        assert_eq!(
            mixer.try_insert(&stack("mc:dirt"), &mut env),
            Err(InsertError::Unrecognized)
        );
        assert!(mixer.insert(&stack("tropic:pineapple"), &mut env));
        assert_eq!(
            mixer.try_insert(&stack("tropic:pineapple"), &mut env),
            Err(InsertError::Duplicate { id: 1 })
        );
        assert_eq!(
            mixer.try_insert(&stack("mc:dirt"), &mut env),
            Err(InsertError::Unrecognized)
        );
        assert_eq!(
            mixer.try_insert(&stack("tropic:cocktail"), &mut env),
            Err(InsertError::CocktailNotAlone)
        );
        assert_eq!(mixer.ingredient_count(), 1);
        assert_eq!(world.pending_updates(), 1);
    }

    #[test]
    fn test_cocktail_goes_in_alone() {
        let registry = registry();
        let mut world = LocalWorld::new();
        let mut env = env!(registry, world);
        let mut mixer = MixerState::new(BlockPos::default());

        let cocktail = stack("tropic:cocktail")
            .with_tag(cocktail::TAG_INGREDIENTS, drinkmix_core::TagValue::IntList(vec![3]));
        assert_eq!(mixer.try_insert(&cocktail, &mut env), Ok(0));
        assert_eq!(
            mixer.try_insert(&stack("tropic:coconut"), &mut env),
            Err(InsertError::CocktailNotAlone)
        );
    }

    #[test]
    fn test_full_mix_cycle() {
        let registry = registry();
        let mut world = LocalWorld::new();
        let pos = BlockPos::new(4, 65, 4);
        let mut mixer = MixerState::new(pos);
        {
            let mut env = env!(registry, world);
            for item in ["tropic:pineapple", "tropic:coconut", "tropic:water_bottle"] {
                assert!(mixer.insert(&stack(item), &mut env));
            }
            assert!(mixer.can_mix(&env));
            assert!(mixer.start_mixing(&mut env));
            assert!(!mixer.can_mix(&env));

            for _ in 0..MIX_DURATION - 1 {
                assert!(!mixer.tick(&mut env));
            }
            assert!(mixer.result().is_none());
            assert!(mixer.tick(&mut env));
            assert!(mixer.is_done_mixing());
            assert!(!mixer.is_mixing());
            assert_eq!(mixer.ticks(), MIX_DURATION);
            assert_eq!(mixer.progress(), 1.0);

            // Further ticks are no-ops
            assert!(!mixer.tick(&mut env));
            assert!(!mixer.can_mix(&env));
            assert!(mixer.retrieve_result(&mut env));
        }

        assert_eq!(mixer, MixerState::new(pos));
        let drops: Vec<_> = world.items.items().map(|i| i.stack.item.to_string()).collect();
        assert_eq!(drops, vec!["tropic:cocktail", "mc:glass_bottle"]);
    }

    #[test]
    fn test_guarded_preconditions() {
        let registry = registry();
        let mut world = LocalWorld::new();
        let mut env = env!(registry, world);
        let mut mixer = MixerState::new(BlockPos::default());
        mixer.insert(&stack("tropic:pineapple"), &mut env);
        let before = mixer.clone();

        assert!(!mixer.start_mixing(&mut env));
        assert!(!mixer.retrieve_result(&mut env));
        assert!(!mixer.tick(&mut env));
        assert_eq!(mixer, before);
    }

    #[test]
    fn test_done_mixer_cannot_restart() {
        let registry = registry();
        let mut world = LocalWorld::new();
        let mut env = env!(registry, world);
        let mut mixer = MixerState::new(BlockPos::default());
        for item in ["tropic:pineapple", "tropic:coconut", "tropic:water_bottle"] {
            mixer.insert(&stack(item), &mut env);
        }
        mixer.start_mixing(&mut env);
        for _ in 0..MIX_DURATION {
            mixer.tick(&mut env);
        }
        assert!(mixer.is_done_mixing());
        let done = mixer.clone();

        assert!(!mixer.can_mix(&env));
        assert!(!mixer.start_mixing(&mut env));
        assert_eq!(mixer, done);
    }

    #[test]
    fn test_insert_refused_while_busy() {
        let registry = registry();
        let mut world = LocalWorld::new();
        let pos = BlockPos::default();
        let mut mixer = MixerState::new(pos);
        {
            let mut env = env!(registry, world);
            mixer.insert(&stack("tropic:sugar"), &mut env);
            mixer.insert(&stack("tropic:water_bottle"), &mut env);
            assert!(mixer.start_mixing(&mut env));
            mixer.tick(&mut env);

            // Mid-mix
            assert_eq!(
                mixer.try_insert(&stack("tropic:pineapple"), &mut env),
                Err(InsertError::Busy)
            );
            for _ in 1..MIX_DURATION {
                mixer.tick(&mut env);
            }
            assert!(mixer.is_done_mixing());

            // Done
            assert_eq!(
                mixer.try_insert(&stack("tropic:pineapple"), &mut env),
                Err(InsertError::Busy)
            );
            assert_eq!(mixer.ingredient_count(), 2);
            assert!(mixer.retrieve_result(&mut env));
        }

        let drops: Vec<_> = world.items.items().map(|i| i.stack.item.to_string()).collect();
        assert_eq!(drops, vec!["tropic:cocktail", "mc:glass_bottle"]);
        assert_eq!(mixer, MixerState::new(pos));
    }

    #[test]
    fn test_empty_mixer_mid_mix() {
        let registry = registry();
        let mut world = LocalWorld::new();
        let mut mixer = MixerState::new(BlockPos::default());
        {
            let mut env = env!(registry, world);
            for item in ["tropic:pineapple", "tropic:coconut", "tropic:water_bottle"] {
                mixer.insert(&stack(item), &mut env);
            }
            mixer.start_mixing(&mut env);
            for _ in 0..10 {
                mixer.tick(&mut env);
            }
            mixer.empty_mixer(&mut env);
        }

        assert_eq!(mixer.ingredient_count(), 0);
        assert!(!mixer.is_mixing());
        assert_eq!(mixer.ticks(), MIX_DURATION);
        // Ingredients come back, no containers
        assert_eq!(world.items.count(), 3);
    }

    #[test]
    fn test_load_record_clamps_ticks() {
        let mut mixer = MixerState::new(BlockPos::default());
        mixer.load_record(&MixerRecord {
            ticks: 500,
            ..MixerRecord::default()
        });
        assert_eq!(mixer.ticks(), MIX_DURATION);
        mixer.load_record(&MixerRecord {
            ticks: -3,
            ..MixerRecord::default()
        });
        assert_eq!(mixer.ticks(), 0);
    }

    #[test]
    fn test_data_packet_overwrites_state() {
        let registry = registry();
        let mut world = LocalWorld::new();
        let pos = BlockPos::new(9, 9, 9);
        let mut server = MixerState::new(pos);
        let mut client = MixerState::new(pos);
        {
            let mut env = env!(registry, world);
            server.insert(&stack("tropic:sugar"), &mut env);
        }

        let update = world.drain_updates().pop().unwrap();
        client.on_data_packet(&update).unwrap();
        assert_eq!(client, server);
    }
}
