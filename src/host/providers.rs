//! Bundled implementations of the host traits.
//!
//! These cover the CLI and test harness: table text from the filesystem or
//! from memory, seeded or scripted randomness, a fixed character level,
//! catalog/spellbook stubs, and a deterministic outcome picker. A real host
//! replaces whichever of these it has better answers for.

use crate::host::{
    CharacterSource, DiceRoller, ItemCatalog, ItemTemplate, OutcomePicker, ResourceStore, Spell,
    SpellSource,
};
use crate::{ForgeError, ForgeResult};
use async_trait::async_trait;
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use std::collections::{HashMap, VecDeque};
use std::path::PathBuf;
use std::sync::Mutex;

/// Serves table resources from files under a root directory.
///
/// Resource names map directly to relative paths, so
/// `"weapon/weapon-potency.tsv"` reads `<root>/weapon/weapon-potency.tsv`.
#[derive(Debug, Clone)]
pub struct FsResourceStore {
    root: PathBuf,
}

impl FsResourceStore {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }
}

#[async_trait]
impl ResourceStore for FsResourceStore {
    async fn load_resource(&self, name: &str) -> ForgeResult<String> {
        let path = self.root.join(name);
        tokio::fs::read_to_string(&path)
            .await
            .map_err(|e| ForgeError::Load {
                name: name.to_string(),
                reason: format!("{}: {}", path.display(), e),
            })
    }
}

/// Serves table resources from an in-memory map. Test harness staple.
#[derive(Debug, Clone, Default)]
pub struct MemoryStore {
    documents: HashMap<String, String>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, name: impl Into<String>, text: impl Into<String>) {
        self.documents.insert(name.into(), text.into());
    }
}

#[async_trait]
impl ResourceStore for MemoryStore {
    async fn load_resource(&self, name: &str) -> ForgeResult<String> {
        self.documents
            .get(name)
            .cloned()
            .ok_or_else(|| ForgeError::Load {
                name: name.to_string(),
                reason: "no such document".to_string(),
            })
    }
}

/// Uniform dice backed by a seeded PRNG.
#[derive(Debug)]
pub struct SeededDice {
    rng: Mutex<StdRng>,
}

impl SeededDice {
    /// Dice that replay the same sequence for the same seed.
    pub fn new(seed: u64) -> Self {
        Self {
            rng: Mutex::new(StdRng::seed_from_u64(seed)),
        }
    }

    /// Dice seeded from OS entropy.
    pub fn from_entropy() -> Self {
        Self {
            rng: Mutex::new(StdRng::from_entropy()),
        }
    }
}

#[async_trait]
impl DiceRoller for SeededDice {
    async fn draw_uniform(&self, max: i64) -> ForgeResult<i64> {
        if max < 1 {
            return Err(ForgeError::Dice(format!(
                "cannot draw from an empty range 1..={}",
                max
            )));
        }
        let mut rng = self
            .rng
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner());
        Ok(rng.gen_range(1..=max))
    }
}

/// Dice that replay a fixed script of draws, in order.
///
/// Each scripted draw is validated against the die it is asked for, so a
/// test with a stale script fails loudly instead of resolving nonsense.
#[derive(Debug)]
pub struct ScriptedDice {
    draws: Mutex<VecDeque<i64>>,
}

impl ScriptedDice {
    pub fn new(draws: impl IntoIterator<Item = i64>) -> Self {
        Self {
            draws: Mutex::new(draws.into_iter().collect()),
        }
    }
}

#[async_trait]
impl DiceRoller for ScriptedDice {
    async fn draw_uniform(&self, max: i64) -> ForgeResult<i64> {
        let mut draws = self
            .draws
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner());
        let draw = draws
            .pop_front()
            .ok_or_else(|| ForgeError::Dice("scripted draws exhausted".to_string()))?;
        if draw < 1 || draw > max {
            return Err(ForgeError::Dice(format!(
                "scripted draw {} outside 1..={}",
                draw, max
            )));
        }
        Ok(draw)
    }
}

/// A character source reporting one fixed level.
#[derive(Debug, Clone, Copy)]
pub struct FixedLevelSource {
    level: i32,
}

impl FixedLevelSource {
    pub fn new(level: i32) -> Self {
        Self { level }
    }
}

#[async_trait]
impl CharacterSource for FixedLevelSource {
    async fn character_level(&self) -> ForgeResult<i32> {
        Ok(self.level)
    }
}

/// A catalog with no compendium behind it: every lookup misses.
#[derive(Debug, Clone, Copy, Default)]
pub struct OfflineCatalog;

#[async_trait]
impl ItemCatalog for OfflineCatalog {
    async fn lookup(&self, _name: &str, _category: &str) -> ForgeResult<Option<ItemTemplate>> {
        Ok(None)
    }
}

/// A catalog over a fixed template set, keyed by case-insensitive name.
#[derive(Debug, Clone, Default)]
pub struct StaticCatalog {
    templates: HashMap<String, ItemTemplate>,
}

impl StaticCatalog {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, template: ItemTemplate) {
        self.templates
            .insert(template.name.to_lowercase(), template);
    }
}

#[async_trait]
impl ItemCatalog for StaticCatalog {
    async fn lookup(&self, name: &str, _category: &str) -> ForgeResult<Option<ItemTemplate>> {
        Ok(self.templates.get(&name.to_lowercase()).cloned())
    }
}

/// A spell source over a fixed spell list.
#[derive(Debug, Clone, Default)]
pub struct StaticSpellbook {
    spells: Vec<Spell>,
}

impl StaticSpellbook {
    pub fn new(spells: Vec<Spell>) -> Self {
        Self { spells }
    }
}

#[async_trait]
impl SpellSource for StaticSpellbook {
    async fn spells_by_rank(
        &self,
        rank: i32,
        tradition: Option<&str>,
    ) -> ForgeResult<Vec<Spell>> {
        Ok(self
            .spells
            .iter()
            .filter(|spell| spell.rank == rank)
            .filter(|spell| match tradition {
                Some(tradition) => spell
                    .traditions
                    .iter()
                    .any(|t| t.eq_ignore_ascii_case(tradition)),
                None => true,
            })
            .cloned()
            .collect())
    }
}

/// Picks the first candidate. Deterministic stand-in for a human chooser.
#[derive(Debug, Clone, Copy, Default)]
pub struct FirstPick;

#[async_trait]
impl OutcomePicker for FirstPick {
    async fn pick_one(&self, candidates: &[String]) -> ForgeResult<String> {
        candidates
            .first()
            .cloned()
            .ok_or_else(|| ForgeError::Picker("no candidates offered".to_string()))
    }
}
