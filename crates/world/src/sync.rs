//! Block entity update packets.
//!
//! Sync is a full-state broadcast: every observable mutation ships the whole
//! persisted record, and receivers overwrite their copy with it. The most
//! recent packet per position wins.

use crate::persist::MixerRecord;
use anyhow::{ensure, Result};
use drinkmix_core::BlockPos;
use serde::{Deserialize, Serialize};

/// Update action code for drink mixer payloads.
pub const MIXER_UPDATE_ACTION: u8 = 1;

/// Full-state update for the block entity at `pos`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BlockEntityUpdate {
    /// Location of the block entity.
    pub pos: BlockPos,
    /// Payload kind.
    pub action: u8,
    /// Encoded [`MixerRecord`].
    pub payload: Vec<u8>,
}

impl BlockEntityUpdate {
    /// Wrap a mixer record.
    pub fn mixer(pos: BlockPos, record: &MixerRecord) -> Result<Self> {
        Ok(Self {
            pos,
            action: MIXER_UPDATE_ACTION,
            payload: record.to_bytes()?,
        })
    }

    /// Decode the mixer record carried by this update.
    pub fn mixer_record(&self) -> Result<MixerRecord> {
        ensure!(
            self.action == MIXER_UPDATE_ACTION,
            "Unexpected block entity action {} at {}",
            self.action,
            self.pos
        );
        MixerRecord::from_bytes(&self.payload)
    }
}
