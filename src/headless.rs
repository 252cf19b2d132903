use anyhow::{Context, Result};
use drinkmix_core::{ItemStack, RegistryKey, SimTick};
use drinkmix_testkit::{EventRecord, JsonlSink};
use drinkmix_world::{DrinkMixerRegistry, LocalWorld, MixerEnv, MixerRecord, MixerState};
use std::path::{Path, PathBuf};
use tracing::{debug, info, warn};

use crate::config::MixerConfig;

fn mixer_env<'a>(registry: &'a DrinkMixerRegistry, world: &'a mut LocalWorld) -> MixerEnv<'a> {
    MixerEnv {
        ingredients: registry.ingredients(),
        recipes: registry,
        host: world,
    }
}

/// A headless mixer with its drink registry, world and optional event log.
pub struct Session {
    registry: DrinkMixerRegistry,
    world: LocalWorld,
    mixer: MixerState,
    state_path: PathBuf,
    max_ticks: u32,
    tick: SimTick,
    events: Option<JsonlSink>,
}

/// What a mix session produced.
#[derive(Debug, Default)]
pub struct SessionReport {
    /// Items the mixer took.
    pub accepted: Vec<String>,
    /// Items the mixer refused.
    pub rejected: Vec<String>,
    /// Ticks simulated this session.
    pub ticks: u32,
    /// Stacks picked up at the mixer afterwards.
    pub drops: Vec<ItemStack>,
}

impl Session {
    /// Open a session, resuming the saved mixer if its record exists.
    pub fn open(
        cfg: &MixerConfig,
        registry: DrinkMixerRegistry,
        events: Option<&Path>,
    ) -> Result<Self> {
        let pos = cfg.block_pos();
        let mixer = if cfg.state_path.exists() {
            let record = MixerRecord::load_from_path(&cfg.state_path)?;
            info!(path = %cfg.state_path.display(), "resuming saved mixer");
            MixerState::from_record(pos, &record)
        } else {
            MixerState::new(pos)
        };
        let events = events
            .map(|path| {
                JsonlSink::create(path)
                    .with_context(|| format!("Failed to open event log {}", path.display()))
            })
            .transpose()?;

        Ok(Self {
            registry,
            world: LocalWorld::new(),
            mixer,
            state_path: cfg.state_path.clone(),
            max_ticks: cfg.max_ticks,
            tick: SimTick::ZERO,
            events,
        })
    }

    /// Current mixer state.
    pub fn mixer(&self) -> &MixerState {
        &self.mixer
    }

    /// Insert `items`, mix for as long as the budget allows, and collect the output.
    pub fn mix(&mut self, items: &[String]) -> Result<SessionReport> {
        let mut report = SessionReport::default();

        for raw in items {
            let stack = ItemStack::new(
                RegistryKey::parse(raw).with_context(|| format!("Invalid item `{raw}`"))?,
                1,
            );
            let accepted = {
                let mut env = mixer_env(&self.registry, &mut self.world);
                self.mixer.insert(&stack, &mut env)
            };
            let kind = if accepted { "insert" } else { "reject" };
            self.record(kind, raw)?;
            if accepted {
                report.accepted.push(raw.clone());
            } else {
                report.rejected.push(raw.clone());
            }
        }

        let started = {
            let mut env = mixer_env(&self.registry, &mut self.world);
            self.mixer.can_mix(&env) && self.mixer.start_mixing(&mut env)
        };
        if started {
            self.record("start", "")?;
        }
        if self.mixer.is_mixing() {
            while self.mixer.is_mixing() && report.ticks < self.max_ticks {
                let finished = {
                    let mut env = mixer_env(&self.registry, &mut self.world);
                    self.mixer.tick(&mut env)
                };
                report.ticks += 1;
                self.tick = self.tick.advance(1);
                if finished {
                    self.record("done", "")?;
                }
            }
        } else if !self.mixer.is_done_mixing() {
            warn!("ingredients do not form a known drink; nothing to mix");
        }

        if self.mixer.is_done_mixing() {
            let mut env = mixer_env(&self.registry, &mut self.world);
            self.mixer.retrieve_result(&mut env);
            self.record("retrieve", "")?;
        }

        report.drops = self.collect_drops();
        Ok(report)
    }

    /// Drop everything in the mixer.
    pub fn empty(&mut self) -> Result<Vec<ItemStack>> {
        {
            let mut env = mixer_env(&self.registry, &mut self.world);
            self.mixer.empty_mixer(&mut env);
        }
        self.record("empty", "")?;
        Ok(self.collect_drops())
    }

    /// Persist the mixer record.
    pub fn save(&self) -> Result<()> {
        self.mixer.to_record().save_to_path(&self.state_path)?;
        debug!(path = %self.state_path.display(), "mixer saved");
        Ok(())
    }

    fn collect_drops(&mut self) -> Vec<ItemStack> {
        let updates = self.world.drain_updates();
        debug!(count = updates.len(), "block updates broadcast");
        let (x, y, z) = self.mixer.pos().center();
        self.world.items.pickup_items(x, y, z)
    }

    fn record(&mut self, kind: &str, payload: &str) -> Result<()> {
        if let Some(sink) = self.events.as_mut() {
            sink.write(&EventRecord {
                tick: self.tick,
                kind,
                payload,
            })?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn session(name: &str) -> Session {
        let cfg = MixerConfig {
            state_path: std::env::temp_dir()
                .join(format!("drinkmix-session-{}-{name}.json", std::process::id())),
            ..MixerConfig::default()
        };
        let _ = std::fs::remove_file(&cfg.state_path);
        let registry = drinkmix_assets::default_registry().unwrap();
        Session::open(&cfg, registry, None).unwrap()
    }

    #[test]
    fn mixes_a_known_drink() {
        let mut session = session("known");
        let items = ["tropic:lime", "mc:sugar", "tropic:water_bottle"].map(String::from);
        let report = session.mix(&items).unwrap();

        assert_eq!(report.accepted.len(), 3);
        assert_eq!(report.ticks, drinkmix_world::MIX_DURATION);
        let dropped: Vec<_> = report.drops.iter().map(|s| s.item.to_string()).collect();
        assert_eq!(dropped, vec!["tropic:cocktail", "mc:glass_bottle"]);
        assert_eq!(session.mixer().ingredient_count(), 0);
    }

    #[test]
    fn unknown_mix_keeps_ingredients() {
        let mut session = session("unknown");
        let items = ["tropic:lime", "tropic:lemon", "mc:dirt"].map(String::from);
        let report = session.mix(&items).unwrap();

        assert_eq!(report.rejected, vec!["mc:dirt".to_string()]);
        assert_eq!(report.ticks, 0);
        assert!(report.drops.is_empty());
        assert_eq!(session.mixer().ingredient_count(), 2);

        let emptied = session.empty().unwrap();
        assert_eq!(emptied.len(), 2);
    }

    #[test]
    fn resumed_done_mixer_is_retrieved_not_restarted() {
        let cfg = MixerConfig {
            state_path: std::env::temp_dir()
                .join(format!("drinkmix-session-{}-done.json", std::process::id())),
            ..MixerConfig::default()
        };
        let cocktail = ItemStack::new(RegistryKey::parse("tropic:cocktail").unwrap(), 1);
        MixerRecord {
            ticks: drinkmix_world::MIX_DURATION as i32,
            mixing: false,
            ingredient0: Some(ItemStack::new(
                RegistryKey::parse("tropic:pineapple").unwrap(),
                1,
            )),
            result: Some(cocktail.clone()),
            ..MixerRecord::default()
        }
        .save_to_path(&cfg.state_path)
        .unwrap();

        let mut session =
            Session::open(&cfg, drinkmix_assets::default_registry().unwrap(), None).unwrap();
        assert!(session.mixer().is_done_mixing());
        let report = session.mix(&["tropic:lime".to_string()]).unwrap();

        assert_eq!(report.rejected, vec!["tropic:lime".to_string()]);
        assert_eq!(report.ticks, 0);
        assert_eq!(report.drops, vec![cocktail]);
        assert_eq!(session.mixer().ingredient_count(), 0);
        assert!(!session.mixer().is_mixing());
        let _ = std::fs::remove_file(&cfg.state_path);
    }

    #[test]
    fn save_and_resume() {
        let mut first = session("resume");
        first.mix(&["tropic:orange".to_string()]).unwrap();
        first.save().unwrap();

        let cfg = MixerConfig {
            state_path: first.state_path.clone(),
            ..MixerConfig::default()
        };
        let resumed =
            Session::open(&cfg, drinkmix_assets::default_registry().unwrap(), None).unwrap();
        assert_eq!(resumed.mixer(), first.mixer());
        let _ = std::fs::remove_file(&cfg.state_path);
    }
}
