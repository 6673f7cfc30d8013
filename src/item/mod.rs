//! # Item Module
//!
//! The item archetypes and the mutable record a roll protocol fills in.
//!
//! A [`LootItem`] starts as an archetype plus an id and accumulates one raw
//! table outcome per [`Field`] as the protocol works through its tables,
//! together with property runes and the condition tags that narrow later
//! rolls. Normalization into the serializable host-facing record lives in
//! [`normalize`].

pub mod normalize;

pub use normalize::*;

use crate::tables::QualityTier;
use crate::{ForgeError, ForgeResult};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use uuid::Uuid;

/// The closed set of rollable item archetypes.
///
/// Each archetype owns a table directory named after its prefix and a roll
/// protocol that scripts which tables are consulted in which order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Archetype {
    Weapon,
    Armor,
    Shield,
    Staff,
    Wand,
    Scroll,
    Potion,
    Worn,
    Jewelry,
    Grimoire,
}

impl Archetype {
    /// Every archetype, in registry order.
    pub const ALL: [Archetype; 10] = [
        Archetype::Weapon,
        Archetype::Armor,
        Archetype::Shield,
        Archetype::Staff,
        Archetype::Wand,
        Archetype::Scroll,
        Archetype::Potion,
        Archetype::Worn,
        Archetype::Jewelry,
        Archetype::Grimoire,
    ];

    /// Table directory prefix (`"weapon"` owns `weapon/weapon-*.tsv`).
    pub fn prefix(&self) -> &'static str {
        match self {
            Archetype::Weapon => "weapon",
            Archetype::Armor => "armor",
            Archetype::Shield => "shield",
            Archetype::Staff => "staff",
            Archetype::Wand => "wand",
            Archetype::Scroll => "scroll",
            Archetype::Potion => "potion",
            Archetype::Worn => "worn",
            Archetype::Jewelry => "jewelry",
            Archetype::Grimoire => "grimoire",
        }
    }

    /// Display name used when no table supplies a better one.
    pub fn title(&self) -> &'static str {
        match self {
            Archetype::Weapon => "Weapon",
            Archetype::Armor => "Armor",
            Archetype::Shield => "Shield",
            Archetype::Staff => "Staff",
            Archetype::Wand => "Wand",
            Archetype::Scroll => "Scroll",
            Archetype::Potion => "Potion",
            Archetype::Worn => "Worn Item",
            Archetype::Jewelry => "Jewelry",
            Archetype::Grimoire => "Grimoire",
        }
    }

    /// The fundamental-rune family this archetype's potency maps onto, if
    /// its potency bonus is expressed as a rune at all.
    pub fn rune_family(&self) -> Option<RuneFamily> {
        match self {
            Archetype::Weapon | Archetype::Staff | Archetype::Wand => Some(RuneFamily::Striking),
            Archetype::Armor => Some(RuneFamily::Resilient),
            Archetype::Shield => Some(RuneFamily::Reinforcing),
            _ => None,
        }
    }

    /// True for archetypes whose potency boosts spellcasting rather than
    /// weapon or armor statistics.
    pub fn is_spellcasting(&self) -> bool {
        matches!(
            self,
            Archetype::Staff | Archetype::Wand | Archetype::Grimoire
        )
    }
}

impl fmt::Display for Archetype {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.prefix())
    }
}

impl FromStr for Archetype {
    type Err = ForgeError;

    fn from_str(s: &str) -> ForgeResult<Self> {
        match s.trim().to_lowercase().as_str() {
            "weapon" => Ok(Archetype::Weapon),
            "armor" => Ok(Archetype::Armor),
            "shield" => Ok(Archetype::Shield),
            "staff" => Ok(Archetype::Staff),
            "wand" => Ok(Archetype::Wand),
            "scroll" => Ok(Archetype::Scroll),
            "potion" => Ok(Archetype::Potion),
            "worn" => Ok(Archetype::Worn),
            "jewelry" => Ok(Archetype::Jewelry),
            "grimoire" => Ok(Archetype::Grimoire),
            _ => Err(ForgeError::UnknownArchetype(s.to_string())),
        }
    }
}

/// Families of fundamental runes, one per potency-bearing archetype group.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum RuneFamily {
    /// Weapons, staves, and wands
    Striking,
    /// Armor
    Resilient,
    /// Shields
    Reinforcing,
}

/// The item slots a single table resolution can fill.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Field {
    Material,
    Element,
    Kind,
    Potency,
    Rune,
    Item,
}

impl Field {
    /// Field name as it appears in table file names
    /// (`weapon/weapon-type.tsv` fills [`Field::Kind`]).
    pub fn name(&self) -> &'static str {
        match self {
            Field::Material => "material",
            Field::Element => "element",
            Field::Kind => "type",
            Field::Potency => "potency",
            Field::Rune => "rune",
            Field::Item => "item",
        }
    }
}

impl fmt::Display for Field {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.name())
    }
}

/// A magic item under construction, one raw table outcome per slot.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LootItem {
    /// Unique id threaded through log lines for this roll
    pub id: Uuid,
    pub archetype: Archetype,
    /// Archetype's table prefix, denormalized for hosts
    pub prefix: String,
    pub quality: Option<QualityTier>,
    pub material: Option<String>,
    pub element: Option<String>,
    #[serde(rename = "type")]
    pub kind: Option<String>,
    pub potency: Option<String>,
    pub rune: Option<String>,
    pub item: Option<String>,
    pub level: Option<i32>,
    /// Property runes in roll order, canonicalized
    pub runes: Vec<String>,
    /// Lowercased condition tags narrowing later table rolls
    pub conditions: Vec<String>,
    pub description: Option<String>,
}

impl LootItem {
    /// Creates an empty item of the given archetype with a fresh id.
    pub fn new(archetype: Archetype) -> Self {
        Self {
            id: Uuid::new_v4(),
            archetype,
            prefix: archetype.prefix().to_string(),
            quality: None,
            material: None,
            element: None,
            kind: None,
            potency: None,
            rune: None,
            item: None,
            level: None,
            runes: Vec::new(),
            conditions: Vec::new(),
            description: None,
        }
    }

    /// Stores a raw table outcome in a slot, replacing any earlier value.
    pub fn set_field(&mut self, field: Field, value: impl Into<String>) {
        let value = Some(value.into());
        match field {
            Field::Material => self.material = value,
            Field::Element => self.element = value,
            Field::Kind => self.kind = value,
            Field::Potency => self.potency = value,
            Field::Rune => self.rune = value,
            Field::Item => self.item = value,
        }
    }

    /// Reads a slot back.
    pub fn field(&self, field: Field) -> Option<&str> {
        let slot = match field {
            Field::Material => &self.material,
            Field::Element => &self.element,
            Field::Kind => &self.kind,
            Field::Potency => &self.potency,
            Field::Rune => &self.rune,
            Field::Item => &self.item,
        };
        slot.as_deref()
    }

    /// Appends a property rune. Duplicates are kept: rolling the same rune
    /// twice is a table-content question, not the item's.
    pub fn push_rune(&mut self, rune: impl Into<String>) {
        self.runes.push(rune.into());
    }

    /// Adds a condition tag, normalized to lowercase. Empty tags are
    /// dropped and repeats ignored.
    pub fn add_condition(&mut self, tag: &str) {
        let tag = tag.trim().to_lowercase();
        if tag.is_empty() || self.conditions.contains(&tag) {
            return;
        }
        self.conditions.push(tag);
    }
}
