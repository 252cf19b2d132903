//! Persisted drink mixer record.
//!
//! The record mirrors the host save format: a flat compound with the tags
//! `MixTicks`, `Mixing`, `Ingredient0`..`Ingredient2` and `Result`. Empty
//! slots are omitted on write. On read, a missing or unreadable slot is an
//! empty slot rather than an error.

use crate::drink_mixer::MAX_INGREDIENTS;
use anyhow::{Context, Result};
use drinkmix_core::ItemStack;
use serde::{Deserialize, Deserializer, Serialize};
use std::fs;
use std::path::Path;
use tracing::warn;

/// Structured save record of one drink mixer.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct MixerRecord {
    /// Elapsed mixing ticks.
    #[serde(rename = "MixTicks", default)]
    pub ticks: i32,
    /// Whether mixing is in progress.
    #[serde(rename = "Mixing", default)]
    pub mixing: bool,
    /// Ingredient slot 0.
    #[serde(
        rename = "Ingredient0",
        default,
        deserialize_with = "lenient_slot",
        skip_serializing_if = "Option::is_none"
    )]
    pub ingredient0: Option<ItemStack>,
    /// Ingredient slot 1.
    #[serde(
        rename = "Ingredient1",
        default,
        deserialize_with = "lenient_slot",
        skip_serializing_if = "Option::is_none"
    )]
    pub ingredient1: Option<ItemStack>,
    /// Ingredient slot 2.
    #[serde(
        rename = "Ingredient2",
        default,
        deserialize_with = "lenient_slot",
        skip_serializing_if = "Option::is_none"
    )]
    pub ingredient2: Option<ItemStack>,
    /// Mixing result.
    #[serde(
        rename = "Result",
        default,
        deserialize_with = "lenient_slot",
        skip_serializing_if = "Option::is_none"
    )]
    pub result: Option<ItemStack>,
}

impl MixerRecord {
    /// Build a record from mixer fields.
    pub fn from_parts(
        ticks: u32,
        mixing: bool,
        ingredients: &[Option<ItemStack>; MAX_INGREDIENTS],
        result: Option<&ItemStack>,
    ) -> Self {
        let [ingredient0, ingredient1, ingredient2] = ingredients.clone();
        Self {
            ticks: i32::try_from(ticks).unwrap_or(i32::MAX),
            mixing,
            ingredient0,
            ingredient1,
            ingredient2,
            result: result.cloned(),
        }
    }

    /// Ingredient slots in order.
    pub fn ingredients(&self) -> [Option<ItemStack>; MAX_INGREDIENTS] {
        [
            self.ingredient0.clone(),
            self.ingredient1.clone(),
            self.ingredient2.clone(),
        ]
    }

    /// Encode as a JSON compound.
    pub fn to_bytes(&self) -> Result<Vec<u8>> {
        serde_json::to_vec(self).context("Failed to encode mixer record")
    }

    /// Decode from a JSON compound.
    pub fn from_bytes(bytes: &[u8]) -> Result<Self> {
        serde_json::from_slice(bytes).context("Failed to decode mixer record")
    }

    /// Write the record to `path`, creating parent directories.
    pub fn save_to_path(&self, path: &Path) -> Result<()> {
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)
                .with_context(|| format!("Failed to create {}", parent.display()))?;
        }
        let json = serde_json::to_string_pretty(self).context("Failed to encode mixer record")?;
        fs::write(path, json).with_context(|| format!("Failed to write {}", path.display()))
    }

    /// Read a record from `path`.
    pub fn load_from_path(path: &Path) -> Result<Self> {
        let bytes = fs::read(path).with_context(|| format!("Failed to read {}", path.display()))?;
        Self::from_bytes(&bytes)
    }
}

fn lenient_slot<'de, D>(deserializer: D) -> Result<Option<ItemStack>, D::Error>
where
    D: Deserializer<'de>,
{
    let raw = Option::<serde_json::Value>::deserialize(deserializer)?;
    Ok(raw.and_then(|value| match serde_json::from_value::<ItemStack>(value) {
        Ok(stack) => Some(stack),
        Err(err) => {
            warn!("Discarding unreadable mixer slot: {err}");
            None
        }
    }))
}
