#![warn(missing_docs)]
//! Headless testing surfaces: recording host, fixtures and event logs.

mod fixtures;

use anyhow::Result;
use drinkmix_core::{BlockPos, ItemStack, SimTick};
use drinkmix_world::{BlockEntityUpdate, MixerHost};
use serde::Serialize;
use std::fs::{self, File};
use std::io::Write;
use std::path::Path;

pub use fixtures::*;

/// Host double that records every side effect in call order.
#[derive(Debug, Default)]
pub struct RecordingHost {
    /// Dropped items as `(position, stack)`.
    pub drops: Vec<(BlockPos, ItemStack)>,
    /// Broadcast updates.
    pub updates: Vec<BlockEntityUpdate>,
}

impl RecordingHost {
    /// Create an empty recorder.
    pub fn new() -> Self {
        Self::default()
    }

    /// Dropped stacks without positions.
    pub fn dropped_stacks(&self) -> Vec<&ItemStack> {
        self.drops.iter().map(|(_, stack)| stack).collect()
    }

    /// The most recent update, if any.
    pub fn last_update(&self) -> Option<&BlockEntityUpdate> {
        self.updates.last()
    }

    /// Forget everything recorded so far.
    pub fn clear(&mut self) {
        self.drops.clear();
        self.updates.clear();
    }
}

impl MixerHost for RecordingHost {
    fn spawn_item(&mut self, pos: BlockPos, stack: ItemStack) {
        self.drops.push((pos, stack));
    }

    fn notify_block_update(&mut self, update: BlockEntityUpdate) {
        self.updates.push(update);
    }
}

/// Primary event record captured by headless runs.
#[derive(Debug, Serialize)]
pub struct EventRecord<'a> {
    /// Simulation tick when the event occurred.
    pub tick: SimTick,
    /// Human-readable kind label.
    pub kind: &'a str,
    /// Free-form payload.
    pub payload: &'a str,
}

/// A sink that writes newline-delimited JSON to disk.
pub struct JsonlSink {
    file: File,
}

impl JsonlSink {
    /// Create a new sink at `path`, creating parent dirs if needed.
    pub fn create<P: AsRef<Path>>(path: P) -> Result<Self> {
        if let Some(parent) = path.as_ref().parent() {
            fs::create_dir_all(parent)?;
        }
        let file = File::create(path)?;
        Ok(Self { file })
    }

    /// Append an event to the log.
    pub fn write(&mut self, event: &EventRecord<'_>) -> Result<()> {
        let line = serde_json::to_string(event)?;
        self.file.write_all(line.as_bytes())?;
        self.file.write_all(b"\n")?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::{SystemTime, UNIX_EPOCH};

    #[test]
    fn jsonl_sink_writes_lines() {
        let path = std::env::temp_dir().join(format!(
            "drinkmix-events-{}.jsonl",
            SystemTime::now()
                .duration_since(UNIX_EPOCH)
                .unwrap()
                .as_nanos()
        ));
        let mut sink = JsonlSink::create(&path).expect("sink create");
        sink.write(&EventRecord {
            tick: SimTick(3),
            kind: "insert",
            payload: "tropic:lime",
        })
        .expect("write succeeds");
        sink.write(&EventRecord {
            tick: SimTick(4),
            kind: "start",
            payload: "",
        })
        .expect("write succeeds");
        drop(sink);

        let contents = fs::read_to_string(&path).expect("file readable");
        let lines: Vec<_> = contents.lines().collect();
        assert_eq!(lines.len(), 2);
        assert!(lines[0].contains("\"tick\":3"));
        assert!(lines[0].contains("tropic:lime"));
        let _ = fs::remove_file(&path);
    }

    #[test]
    fn recording_host_keeps_order() {
        let mut host = RecordingHost::new();
        let lime = fixtures::item("tropic:lime");
        host.spawn_item(BlockPos::new(1, 1, 1), lime.clone());
        host.spawn_item(BlockPos::new(1, 1, 1), fixtures::item("tropic:lemon"));
        assert_eq!(host.dropped_stacks()[0], &lime);
        assert!(host.last_update().is_none());
        host.clear();
        assert!(host.drops.is_empty());
    }
}
