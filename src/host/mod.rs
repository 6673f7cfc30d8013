//! # Host Module
//!
//! Seams between the roll pipeline and whatever hosts it.
//!
//! Everything the pipeline needs from the outside world — table text,
//! random numbers, the acting character's level, compendium item data,
//! spell lists, a way to pick between equally-valid outcomes — arrives
//! through one of the traits here. Production hosts wire in their own
//! implementations; tests and the CLI use the providers in
//! [`providers`].

pub mod providers;

pub use providers::*;

use crate::ForgeResult;
use async_trait::async_trait;
use serde::{Deserialize, Serialize};

/// Source of raw table text, addressed by resource name
/// (e.g. `"weapon/weapon-potency.tsv"`).
#[async_trait]
pub trait ResourceStore: Send + Sync {
    async fn load_resource(&self, name: &str) -> ForgeResult<String>;
}

/// Source of uniform random draws.
#[async_trait]
pub trait DiceRoller: Send + Sync {
    /// Draws a uniformly random integer in `1..=max`.
    async fn draw_uniform(&self, max: i64) -> ForgeResult<i64>;
}

/// Source of the acting character's level, recorded on level-sensitive
/// item kinds (potions, worn items, jewelry).
#[async_trait]
pub trait CharacterSource: Send + Sync {
    async fn character_level(&self) -> ForgeResult<i32>;
}

/// Compendium item data merged into a rolled item when available.
///
/// The icon path is presentation data: it rides along for hosts that render
/// the item but is never merged into the roll itself.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ItemTemplate {
    pub name: String,
    pub category: Option<String>,
    pub level: Option<i32>,
    pub description: Option<String>,
    pub damage_type: Option<String>,
    pub traits: Vec<String>,
    pub icon: Option<String>,
}

impl ItemTemplate {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            ..Self::default()
        }
    }
}

/// Lookup of compendium templates by item name and category.
///
/// A miss is not an error: rolled names frequently have no compendium
/// counterpart and the pipeline proceeds with defaults.
#[async_trait]
pub trait ItemCatalog: Send + Sync {
    async fn lookup(&self, name: &str, category: &str) -> ForgeResult<Option<ItemTemplate>>;
}

/// A castable spell a scroll can carry.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Spell {
    pub name: String,
    pub rank: i32,
    pub traditions: Vec<String>,
}

impl Spell {
    pub fn new(name: impl Into<String>, rank: i32, traditions: &[&str]) -> Self {
        Self {
            name: name.into(),
            rank,
            traditions: traditions.iter().map(|t| t.to_string()).collect(),
        }
    }
}

/// Source of spells filtered by rank and, optionally, tradition.
#[async_trait]
pub trait SpellSource: Send + Sync {
    async fn spells_by_rank(&self, rank: i32, tradition: Option<&str>)
        -> ForgeResult<Vec<Spell>>;
}

/// Chooses one outcome from candidates produced by a compound roll.
///
/// Hosts typically put this choice in front of a user; automated hosts
/// pick by policy.
#[async_trait]
pub trait OutcomePicker: Send + Sync {
    async fn pick_one(&self, candidates: &[String]) -> ForgeResult<String>;
}
