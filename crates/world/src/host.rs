//! Host-side services a block entity calls into.

use crate::drop_item::ItemManager;
use crate::sync::BlockEntityUpdate;
use drinkmix_core::{BlockPos, ItemStack};

/// World services used by the drink mixer.
pub trait MixerHost {
    /// Materialize `stack` as a dropped item at `pos`.
    fn spawn_item(&mut self, pos: BlockPos, stack: ItemStack);

    /// Broadcast a full-state update to observers.
    fn notify_block_update(&mut self, update: BlockEntityUpdate);
}

/// In-process host: dropped items plus a queue of outbound updates.
#[derive(Debug, Default)]
pub struct LocalWorld {
    /// Dropped items spawned by block entities.
    pub items: ItemManager,
    outbound: Vec<BlockEntityUpdate>,
}

impl LocalWorld {
    /// Create an empty world.
    pub fn new() -> Self {
        Self {
            items: ItemManager::new(),
            outbound: Vec::new(),
        }
    }

    /// Take every queued update, oldest first.
    pub fn drain_updates(&mut self) -> Vec<BlockEntityUpdate> {
        std::mem::take(&mut self.outbound)
    }

    /// Number of queued updates.
    pub fn pending_updates(&self) -> usize {
        self.outbound.len()
    }
}

impl MixerHost for LocalWorld {
    fn spawn_item(&mut self, pos: BlockPos, stack: ItemStack) {
        self.items.spawn_item(pos, stack);
    }

    fn notify_block_update(&mut self, update: BlockEntityUpdate) {
        self.outbound.push(update);
    }
}
