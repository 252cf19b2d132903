use anyhow::Result;
use drinkmix_core::BlockPos;
use drinkmix_world::MIX_DURATION;
use serde::{Deserialize, Serialize};
use std::{
    fs,
    path::{Path, PathBuf},
};
use tracing::warn;

pub const DEFAULT_CONFIG_PATH: &str = "config/drinkmix.toml";

#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
#[serde(default)]
pub struct MixerConfig {
    /// Block position of the mixer, `[x, y, z]`.
    pub position: [i32; 3],
    /// Upper bound on ticks simulated per session.
    pub max_ticks: u32,
    /// Drink pack to load instead of the built-in one.
    pub pack: Option<PathBuf>,
    /// Where the mixer record is saved between sessions.
    pub state_path: PathBuf,
}

impl Default for MixerConfig {
    fn default() -> Self {
        Self {
            position: [0, 64, 0],
            // A full mix plus a second of slack
            max_ticks: MIX_DURATION + 20,
            pack: None,
            state_path: PathBuf::from("saves/mixer.json"),
        }
    }
}

impl MixerConfig {
    pub fn block_pos(&self) -> BlockPos {
        let [x, y, z] = self.position;
        BlockPos::new(x, y, z)
    }

    /// Load configuration from an explicit path, falling back to defaults on errors.
    pub fn load_from_path(path: &Path) -> Self {
        match fs::read_to_string(path) {
            Ok(contents) => match toml::from_str::<MixerConfig>(&contents) {
                Ok(cfg) => cfg,
                Err(err) => {
                    warn!("Failed to parse {}: {err}. Using defaults", path.display());
                    MixerConfig::default()
                }
            },
            Err(err) => {
                if path != Path::new(DEFAULT_CONFIG_PATH)
                    || err.kind() != std::io::ErrorKind::NotFound
                {
                    warn!("Failed to read {}: {err}. Using defaults", path.display());
                }
                MixerConfig::default()
            }
        }
    }

    /// Save configuration to an explicit path.
    pub fn save_to_path(&self, path: &Path) -> Result<()> {
        let toml = toml::to_string_pretty(self)?;
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)?;
        }
        fs::write(path, toml)?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn temp_path(name: &str) -> PathBuf {
        std::env::temp_dir().join(format!("drinkmix-config-{}-{name}", std::process::id()))
    }

    #[test]
    fn missing_file_uses_defaults() {
        let cfg = MixerConfig::load_from_path(&temp_path("missing.toml"));
        assert_eq!(cfg, MixerConfig::default());
    }

    #[test]
    fn partial_file_keeps_defaults() {
        let path = temp_path("partial.toml");
        fs::write(&path, "position = [5, 70, -2]\n").unwrap();
        let cfg = MixerConfig::load_from_path(&path);
        assert_eq!(cfg.block_pos(), BlockPos::new(5, 70, -2));
        assert_eq!(cfg.max_ticks, MIX_DURATION + 20);
        let _ = fs::remove_file(&path);
    }

    #[test]
    fn invalid_file_uses_defaults() {
        let path = temp_path("invalid.toml");
        fs::write(&path, "max_ticks = \"lots\"\n").unwrap();
        assert_eq!(MixerConfig::load_from_path(&path), MixerConfig::default());
        let _ = fs::remove_file(&path);
    }

    #[test]
    fn save_roundtrip() {
        let path = temp_path("saved.toml");
        let cfg = MixerConfig {
            position: [1, 2, 3],
            max_ticks: 200,
            pack: Some(PathBuf::from("packs/custom.json")),
            state_path: PathBuf::from("state.json"),
        };
        cfg.save_to_path(&path).unwrap();
        assert_eq!(MixerConfig::load_from_path(&path), cfg);
        let _ = fs::remove_file(&path);
    }
}
