//! Item stacks and their metadata tags.

use crate::registry::RegistryKey;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// A single metadata value stored on an item stack.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum TagValue {
    /// Signed integer.
    Int(i32),
    /// UTF-8 string.
    Str(String),
    /// Ordered integer list.
    IntList(Vec<i32>),
}

/// Ordered, string-keyed metadata attached to an item stack.
///
/// `BTreeMap` keeps serialization order stable across runs.
pub type ItemTag = BTreeMap<String, TagValue>;

/// An item stack (item identity, quantity and metadata).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ItemStack {
    /// Item key, e.g. `tropic:pineapple`.
    #[serde(rename = "id")]
    pub item: RegistryKey,
    /// Quantity in stack.
    #[serde(rename = "Count")]
    pub count: u32,
    /// Damage/variant value.
    #[serde(rename = "Damage", default)]
    pub damage: u16,
    /// Extra metadata; omitted when empty.
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub tag: ItemTag,
}

impl ItemStack {
    /// Create a plain stack with no damage value or tag.
    pub fn new(item: RegistryKey, count: u32) -> Self {
        Self {
            item,
            count,
            damage: 0,
            tag: ItemTag::new(),
        }
    }

    /// Builder-style damage setter.
    pub fn with_damage(mut self, damage: u16) -> Self {
        self.damage = damage;
        self
    }

    /// Builder-style tag entry setter.
    pub fn with_tag(mut self, key: impl Into<String>, value: TagValue) -> Self {
        self.tag.insert(key.into(), value);
        self
    }

    /// Whether `other` is the same item: key, damage and tag all equal.
    ///
    /// Quantity is ignored.
    pub fn is_same_item(&self, other: &ItemStack) -> bool {
        self.item == other.item && self.damage == other.damage && self.tag == other.tag
    }

    /// A copy of this stack with a different count.
    pub fn with_count(&self, count: u32) -> Self {
        Self {
            count,
            ..self.clone()
        }
    }

    /// Integer tag value, if present and of the right type.
    pub fn tag_int(&self, key: &str) -> Option<i32> {
        match self.tag.get(key) {
            Some(TagValue::Int(v)) => Some(*v),
            _ => None,
        }
    }

    /// Integer list tag value, if present and of the right type.
    pub fn tag_int_list(&self, key: &str) -> Option<&[i32]> {
        match self.tag.get(key) {
            Some(TagValue::IntList(v)) => Some(v.as_slice()),
            _ => None,
        }
    }
}
