//! # Lootforge
//!
//! A weighted-table magic item generator for tabletop role-playing loot.
//!
//! ## Architecture Overview
//!
//! Lootforge is the table-resolution and item-assembly engine behind a loot
//! roller: the host application asks for one archetype (weapon, armor,
//! shield, staff, wand, scroll, potion, worn, jewelry, grimoire) and gets
//! back a normalized item record. The pipeline is built from a few layers:
//!
//! - **Tables**: delimited probability tables (tab or comma separated) are
//!   loaded through a host-supplied store, memoized, and narrowed by quality
//!   tier and condition tags
//! - **Resolution**: a uniform roll is matched against the surviving rows'
//!   dice ranges, with a nearest-neighbor policy for gaps in coverage
//! - **Roll protocols**: each archetype scripts an ordered chain of
//!   dependent table resolutions (material, potency, type, item, runes),
//!   including the precious-material reroll loop and the potency-bounded
//!   property-rune loop
//! - **Normalization**: the accumulated raw strings become a structured,
//!   serializable item record (rune tiers, material grades, damage blocks)
//!
//! ## Host Integration
//!
//! The engine renders no pixels and owns no transport. Everything external
//! (table storage, randomness, the acting character, compendium lookups,
//! and the human "pick one of two" choice) enters through the async traits
//! in [`host`], so the same protocols run under a virtual tabletop, a CLI,
//! or a test harness.

pub mod host;
pub mod item;
pub mod roll;
pub mod tables;
pub mod utils;

// Core module re-exports
pub use host::*;
pub use item::*;
pub use roll::*;
pub use tables::*;
pub use utils::*;

// Explicit re-exports for the types most hosts touch
pub use host::{
    CharacterSource,
    DiceRoller,
    // From providers
    FirstPick,
    FsResourceStore,
    ItemCatalog,
    ItemTemplate,
    MemoryStore,
    OfflineCatalog,
    OutcomePicker,
    ResourceStore,
    ScriptedDice,
    SeededDice,
    Spell,
    SpellSource,
    StaticCatalog,
    StaticSpellbook,
};

pub use item::{Archetype, Field, ItemData, LootItem, RuneFamily, RuneTier};

pub use roll::{
    roll_archetype, ArchetypeRegistry, RollConfig, RollEnvironment, RollProtocol, RollRequest,
    RollSession,
};

pub use tables::{QualityTier, Table, TableCache, TableRow};

/// Core error type for the Lootforge engine.
#[derive(thiserror::Error, Debug)]
pub enum ForgeError {
    /// I/O operation failed
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Serialization/deserialization error
    #[error("Serialization error: {0}")]
    Serde(#[from] serde_json::Error),

    /// A named table resource could not be fetched
    #[error("failed to load table '{name}': {reason}")]
    Load { name: String, reason: String },

    /// A table resource was fetched but its structure is defective
    #[error("malformed table '{name}': {reason}")]
    Parse { name: String, reason: String },

    /// A roll value resolved against no row of a filtered table
    #[error("no row in table '{table}' matches roll {roll}")]
    NoMatch { table: String, roll: i64 },

    /// A potency string did not match the `"+N <tier>"` shape
    #[error("malformed potency string: '{0}'")]
    Potency(String),

    /// An archetype name outside the closed set
    #[error("unknown archetype: '{0}'")]
    UnknownArchetype(String),

    /// A quality tier name outside the closed set
    #[error("unknown quality tier: '{0}'")]
    UnknownQuality(String),

    /// The randomness collaborator failed to produce a draw
    #[error("randomness source failed: {0}")]
    Dice(String),

    /// The pick-one collaborator failed to choose an outcome
    #[error("outcome picker failed: {0}")]
    Picker(String),

    /// A roll protocol step failed, tagged with the field being resolved
    #[error("{archetype} roll failed at field '{field}': {source}")]
    RollFailure {
        archetype: String,
        field: String,
        #[source]
        source: Box<ForgeError>,
    },
}

/// Result type used throughout the Lootforge codebase.
pub type ForgeResult<T> = Result<T, ForgeError>;

/// Version information for the engine.
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Engine configuration constants.
pub mod config {
    /// Outcome label that triggers the compound "roll twice, pick one"
    /// expansion instead of terminating a resolution
    pub const REROLL_SENTINEL: &str = "Roll twice again";

    /// Potency outcome that chains into a material roll before the potency
    /// is re-rolled on the shortened table
    pub const PRECIOUS_MATERIAL_SENTINEL: &str = "Precious Material and roll again";

    /// Default number of compound-reroll expansions allowed per resolution;
    /// sub-rolls at or beyond this depth have the sentinel row removed from
    /// their table before rolling
    pub const MAX_REROLL_DEPTH: usize = 1;

    /// File extension of table resources derived from archetype and field
    pub const TABLE_EXTENSION: &str = "tsv";

    /// Character level assumed when no character source is consulted
    pub const DEFAULT_CHARACTER_LEVEL: i32 = 1;

    /// Damage dice granted to elemental staves and wands
    pub const ELEMENT_DAMAGE_DICE: &str = "1d6";
}
