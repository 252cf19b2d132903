//! drinkmix - headless driver for the drink mixer block entity
//!
//! Loads a drink pack, resumes the saved mixer, runs a mixing session and
//! saves the mixer record back.

mod config;
mod headless;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use config::{MixerConfig, DEFAULT_CONFIG_PATH};
use drinkmix_assets::{default_registry, registry_from_file};
use drinkmix_core::ItemStack;
use drinkmix_world::{DrinkMixerRegistry, IngredientLookup};
use headless::Session;
use std::path::PathBuf;
use tracing::info;

#[derive(Debug, Parser)]
#[command(name = "drinkmix", version, about = "Mix tropical drinks headlessly")]
struct Cli {
    /// TOML configuration file.
    #[arg(long, default_value = DEFAULT_CONFIG_PATH)]
    config: PathBuf,
    /// Drink pack JSON (overrides the config file).
    #[arg(long)]
    pack: Option<PathBuf>,
    /// Mixer record to resume and save (overrides the config file).
    #[arg(long)]
    state: Option<PathBuf>,
    /// Write session events as JSON lines.
    #[arg(long)]
    events: Option<PathBuf>,
    #[command(subcommand)]
    command: Command,
}

#[derive(Debug, Subcommand)]
enum Command {
    /// Insert items, mix, and collect the drink.
    Mix {
        /// Item keys, e.g. `tropic:pineapple`.
        #[arg(required = true)]
        items: Vec<String>,
    },
    /// Drop everything in the mixer.
    Empty,
    /// Print the saved mixer record.
    Inspect,
    /// List the drinks the loaded pack can make.
    Recipes,
}

fn main() -> Result<()> {
    // Initialize tracing with WARN level by default (can be overridden via RUST_LOG env var)
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("warn")),
        )
        .init();

    info!("Starting drinkmix v{}", env!("CARGO_PKG_VERSION"));

    let cli = Cli::parse();
    let mut cfg = MixerConfig::load_from_path(&cli.config);
    if let Some(pack) = cli.pack {
        cfg.pack = Some(pack);
    }
    if let Some(state) = cli.state {
        cfg.state_path = state;
    }

    let registry = load_registry(&cfg)?;

    match cli.command {
        Command::Recipes => {
            for recipe in registry.recipes() {
                let names: Vec<String> = recipe
                    .ingredients
                    .iter()
                    .filter_map(|&id| registry.ingredients().by_id(id))
                    .map(|i| i.stack.item.to_string())
                    .collect();
                println!("{}: {}", recipe.drink.key, names.join(" + "));
            }
        }
        Command::Inspect => {
            let session = Session::open(&cfg, registry, None)?;
            let record = session.mixer().to_record();
            println!("{}", serde_json::to_string_pretty(&record)?);
        }
        Command::Mix { items } => {
            let mut session = Session::open(&cfg, registry, cli.events.as_deref())?;
            let report = session.mix(&items)?;
            for item in &report.rejected {
                println!("rejected {item}");
            }
            println!("mixed for {} ticks", report.ticks);
            print_drops(&report.drops);
            session.save()?;
        }
        Command::Empty => {
            let mut session = Session::open(&cfg, registry, cli.events.as_deref())?;
            let drops = session.empty()?;
            print_drops(&drops);
            session.save()?;
        }
    }

    Ok(())
}

fn load_registry(cfg: &MixerConfig) -> Result<DrinkMixerRegistry> {
    match &cfg.pack {
        Some(path) => registry_from_file(path)
            .with_context(|| format!("failed to load drink pack from {}", path.display())),
        None => default_registry().context("built-in drink pack is invalid"),
    }
}

fn print_drops(drops: &[ItemStack]) {
    for stack in drops {
        println!("dropped {} x{}", stack.item, stack.count);
    }
}
