//! # Lootforge Main Entry Point
//!
//! Command-line demo host: wires filesystem tables, seeded dice, and stub
//! collaborators into the roll pipeline and prints the rolled item as JSON.

use clap::Parser;
use log::info;
use lootforge::{
    roll_archetype, Archetype, ArchetypeRegistry, DiceRoller, FirstPick, FixedLevelSource,
    ForgeResult, FsResourceStore, OfflineCatalog, QualityTier, RollEnvironment, RollRequest,
    SeededDice, Spell, StaticSpellbook,
};
use std::path::PathBuf;
use std::sync::Arc;

/// Command line arguments for the Lootforge roller.
#[derive(Parser, Debug)]
#[command(name = "lootforge")]
#[command(about = "Weighted-table magic item generator for tabletop loot")]
#[command(version)]
struct Args {
    /// Item archetype to roll (weapon, armor, shield, staff, wand, scroll,
    /// potion, worn, jewelry, grimoire)
    archetype: String,

    /// Quality tier selecting the range column of tiered tables
    #[arg(short, long, default_value = "moderate")]
    quality: String,

    /// Directory holding the table files
    #[arg(short, long, default_value = "tables")]
    tables: PathBuf,

    /// Random seed for reproducible rolls
    #[arg(short, long)]
    seed: Option<u64>,

    /// Acting character level for level-scoped archetypes
    #[arg(short, long, default_value_t = 1)]
    level: i32,

    /// Condition tag narrowing table rows (repeatable)
    #[arg(short, long)]
    condition: Vec<String>,

    /// Log level (error, warn, info, debug, trace)
    #[arg(long, default_value = "info")]
    log_level: String,
}

#[tokio::main]
async fn main() -> ForgeResult<()> {
    let args = Args::parse();

    initialize_logging(&args.log_level);

    info!("Starting Lootforge v{}", lootforge::VERSION);

    let archetype: Archetype = args.archetype.parse()?;
    let quality: QualityTier = args.quality.parse()?;

    let dice: Arc<dyn DiceRoller> = match args.seed {
        Some(seed) => {
            info!("Rolling with seed {}", seed);
            Arc::new(SeededDice::new(seed))
        }
        None => Arc::new(SeededDice::from_entropy()),
    };

    let env = RollEnvironment::new(
        Arc::new(FsResourceStore::new(args.tables.clone())),
        dice,
        Arc::new(FixedLevelSource::new(args.level)),
        Arc::new(OfflineCatalog),
        Arc::new(StaticSpellbook::new(demo_spells())),
        Arc::new(FirstPick),
    );

    let mut request = RollRequest::new(archetype).with_quality(quality);
    for tag in &args.condition {
        request = request.with_condition(tag.clone());
    }

    let registry = ArchetypeRegistry::standard();
    let item = roll_archetype(&registry, &env, &request).await?;

    println!("{}", serde_json::to_string_pretty(&item)?);
    Ok(())
}

/// Initializes the logging system based on the specified log level.
fn initialize_logging(log_level: &str) {
    let level = match log_level.to_lowercase().as_str() {
        "error" => log::LevelFilter::Error,
        "warn" => log::LevelFilter::Warn,
        "info" => log::LevelFilter::Info,
        "debug" => log::LevelFilter::Debug,
        "trace" => log::LevelFilter::Trace,
        _ => log::LevelFilter::Info,
    };

    env_logger::Builder::new().filter_level(level).init();
}

/// A small spellbook so scroll rolls resolve to real spell names without a
/// compendium behind the CLI.
fn demo_spells() -> Vec<Spell> {
    vec![
        Spell::new("Magic Missile", 1, &["arcane"]),
        Spell::new("Heal", 1, &["divine", "primal"]),
        Spell::new("Fear", 1, &["arcane", "divine", "occult"]),
        Spell::new("Invisibility", 2, &["arcane", "occult"]),
        Spell::new("Restoration", 2, &["divine", "occult", "primal"]),
        Spell::new("Spider Climb", 2, &["arcane", "primal"]),
        Spell::new("Fireball", 3, &["arcane", "primal"]),
        Spell::new("Haste", 3, &["arcane", "occult"]),
        Spell::new("Heroism", 3, &["divine", "occult"]),
        Spell::new("Dimension Door", 4, &["arcane", "occult"]),
        Spell::new("Fire Shield", 4, &["arcane", "primal"]),
    ]
}
