//! Dropped item bookkeeping.
//!
//! Items ejected by block entities (mixer output, emptied ingredients,
//! leftover containers) are recorded here with a despawn timer. Physics is
//! the host engine's concern.

use drinkmix_core::{BlockPos, ItemStack};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Maximum lifetime for dropped items (5 minutes = 6000 ticks at 20 TPS).
pub const ITEM_DESPAWN_TICKS: u32 = 6000;

/// Pickup radius in blocks.
pub const PICKUP_RADIUS: f64 = 1.5;

/// A dropped item entity in the world.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DroppedItem {
    /// Unique ID for this dropped item.
    pub id: u64,
    /// World X position.
    pub x: f64,
    /// World Y position.
    pub y: f64,
    /// World Z position.
    pub z: f64,
    /// The dropped stack.
    pub stack: ItemStack,
    /// Ticks remaining before despawn.
    pub lifetime_ticks: u32,
}

impl DroppedItem {
    /// Create a dropped item at the centre of `pos`.
    pub fn new(id: u64, pos: BlockPos, stack: ItemStack) -> Self {
        let (x, y, z) = pos.center();
        Self {
            id,
            x,
            y,
            z,
            stack,
            lifetime_ticks: ITEM_DESPAWN_TICKS,
        }
    }

    /// Advance the despawn timer.
    ///
    /// # Returns
    /// `true` if the item should be removed (despawned), `false` otherwise.
    pub fn update(&mut self) -> bool {
        if self.lifetime_ticks > 0 {
            self.lifetime_ticks -= 1;
            false
        } else {
            true
        }
    }

    /// Check if this item can be picked up from the given position.
    pub fn can_pickup(&self, px: f64, py: f64, pz: f64) -> bool {
        let dx = self.x - px;
        let dy = self.y - py;
        let dz = self.z - pz;
        dx * dx + dy * dy + dz * dz <= PICKUP_RADIUS * PICKUP_RADIUS
    }
}

/// Manages all dropped items in the world.
///
/// Keyed by spawn order so iteration is deterministic.
#[derive(Debug, Default)]
pub struct ItemManager {
    items: BTreeMap<u64, DroppedItem>,
    next_id: u64,
}

impl ItemManager {
    /// Create a new empty item manager.
    pub fn new() -> Self {
        Self {
            items: BTreeMap::new(),
            next_id: 1,
        }
    }

    /// Spawn a new dropped item at `pos`.
    ///
    /// # Returns
    /// The ID of the newly spawned item.
    pub fn spawn_item(&mut self, pos: BlockPos, stack: ItemStack) -> u64 {
        let id = self.next_id.max(1);
        self.next_id = id + 1;
        self.items.insert(id, DroppedItem::new(id, pos, stack));
        id
    }

    /// Tick every item's lifetime.
    ///
    /// # Returns
    /// Number of items that despawned this tick.
    pub fn update(&mut self) -> usize {
        let before = self.items.len();
        self.items.retain(|_, item| !item.update());
        before - self.items.len()
    }

    /// Pick up every item within reach of the given position.
    pub fn pickup_items(&mut self, x: f64, y: f64, z: f64) -> Vec<ItemStack> {
        let ids: Vec<u64> = self
            .items
            .values()
            .filter(|item| item.can_pickup(x, y, z))
            .map(|item| item.id)
            .collect();
        ids.into_iter()
            .filter_map(|id| self.items.remove(&id))
            .map(|item| item.stack)
            .collect()
    }

    /// Get the number of active dropped items.
    pub fn count(&self) -> usize {
        self.items.len()
    }

    /// Get a reference to a specific item by ID.
    pub fn get(&self, id: u64) -> Option<&DroppedItem> {
        self.items.get(&id)
    }

    /// All items in spawn order.
    pub fn items(&self) -> impl Iterator<Item = &DroppedItem> {
        self.items.values()
    }
}
