//! Normalization of a finished roll into the host-facing item record.
//!
//! Protocols accumulate raw table strings; hosts want structure. This pass
//! is pure and total: defective inputs degrade field by field (a potency
//! that fails to parse becomes bonus 0 with no tier) instead of failing the
//! whole item, because by the time we are here the dice have already been
//! spent.

use crate::config;
use crate::item::{Archetype, LootItem, RuneFamily};
use crate::utils::{map_carrier_potency, split_potency, split_trailing_parenthetical};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Fundamental rune tiers across the three families, in the identifier
/// form hosts store (`"greaterStriking"`).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum RuneTier {
    Striking,
    GreaterStriking,
    MajorStriking,
    Resilient,
    GreaterResilient,
    MajorResilient,
    Reinforcing,
    GreaterReinforcing,
    MajorReinforcing,
}

impl RuneTier {
    /// Maps a potency bonus onto a family's tier ladder: +1 is the base
    /// rune, +2 the greater, +3 and above the major. No bonus, no rune.
    pub fn for_potency(family: RuneFamily, potency: i32) -> Option<RuneTier> {
        if potency <= 0 {
            return None;
        }
        Some(match (family, potency) {
            (RuneFamily::Striking, 1) => RuneTier::Striking,
            (RuneFamily::Striking, 2) => RuneTier::GreaterStriking,
            (RuneFamily::Striking, _) => RuneTier::MajorStriking,
            (RuneFamily::Resilient, 1) => RuneTier::Resilient,
            (RuneFamily::Resilient, 2) => RuneTier::GreaterResilient,
            (RuneFamily::Resilient, _) => RuneTier::MajorResilient,
            (RuneFamily::Reinforcing, 1) => RuneTier::Reinforcing,
            (RuneFamily::Reinforcing, 2) => RuneTier::GreaterReinforcing,
            (RuneFamily::Reinforcing, _) => RuneTier::MajorReinforcing,
        })
    }

    /// Canonical identifier, matching the serialized form.
    pub fn identifier(&self) -> &'static str {
        match self {
            RuneTier::Striking => "striking",
            RuneTier::GreaterStriking => "greaterStriking",
            RuneTier::MajorStriking => "majorStriking",
            RuneTier::Resilient => "resilient",
            RuneTier::GreaterResilient => "greaterResilient",
            RuneTier::MajorResilient => "majorResilient",
            RuneTier::Reinforcing => "reinforcing",
            RuneTier::GreaterReinforcing => "greaterReinforcing",
            RuneTier::MajorReinforcing => "majorReinforcing",
        }
    }
}

impl fmt::Display for RuneTier {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.identifier())
    }
}

/// A precious material and its grade, split from `"Cold Iron (Low)"`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MaterialData {
    pub kind: String,
    pub grade: Option<String>,
}

/// The rune block of a normalized item.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct RuneData {
    /// Numeric potency bonus, 0 when absent or unparseable
    pub potency: i32,
    /// Fundamental rune implied by the potency, for rune-bearing archetypes
    pub tier: Option<RuneTier>,
    /// Property rune identifiers in roll order
    pub property: Vec<String>,
}

/// Bonus damage granted by an elemental implement.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DamageData {
    pub dice: String,
    pub damage_type: String,
}

/// One automation rule attached to the item record.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RuleEntry {
    pub key: String,
    pub selector: String,
    pub value: i32,
}

/// The normalized, serializable item record handed back to hosts.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ItemData {
    pub name: String,
    pub category: Archetype,
    pub level: Option<i32>,
    pub material: Option<MaterialData>,
    pub runes: RuneData,
    pub damage: Option<DamageData>,
    pub rules: Vec<RuleEntry>,
    pub description: Option<String>,
}

/// Normalizes a finished roll into an [`ItemData`] record.
///
/// Never fails: missing slots fall back (the archetype title stands in for
/// a missing name) and malformed slots degrade (an unparseable potency
/// yields bonus 0 and no tier). Running the result of a roll through this
/// twice is meaningless — it consumes a [`LootItem`], not an [`ItemData`] —
/// but every string transform it applies is itself idempotent.
pub fn to_item_data(item: &LootItem) -> ItemData {
    let name = item
        .item
        .clone()
        .unwrap_or_else(|| item.archetype.title().to_string());

    let material = item.material.as_deref().map(material_data);
    let potency = parse_potency(item);
    let tier = item
        .archetype
        .rune_family()
        .and_then(|family| RuneTier::for_potency(family, potency));

    ItemData {
        name,
        category: item.archetype,
        level: item.level,
        material,
        runes: RuneData {
            potency,
            tier,
            property: item.runes.clone(),
        },
        damage: damage_data(item),
        rules: rule_entries(item.archetype, potency),
        description: item.description.clone(),
    }
}

fn material_data(raw: &str) -> MaterialData {
    match split_trailing_parenthetical(raw.trim()) {
        Some((kind, grade)) => MaterialData {
            kind: kind.to_string(),
            grade: Some(grade.to_string()),
        },
        None => MaterialData {
            kind: raw.trim().to_string(),
            grade: None,
        },
    }
}

fn parse_potency(item: &LootItem) -> i32 {
    let Some(raw) = item.potency.as_deref() else {
        return 0;
    };
    // Staves and wands phrase their potency as a carrier enchantment
    let raw = match item.archetype {
        Archetype::Staff | Archetype::Wand => map_carrier_potency(raw),
        _ => raw.to_string(),
    };
    split_potency(&raw).map(|split| split.potency).unwrap_or(0)
}

fn damage_data(item: &LootItem) -> Option<DamageData> {
    if !matches!(item.archetype, Archetype::Staff | Archetype::Wand) {
        return None;
    }
    let element = item.element.as_deref()?.trim();
    if element.is_empty() {
        return None;
    }
    Some(DamageData {
        dice: config::ELEMENT_DAMAGE_DICE.to_string(),
        damage_type: element.to_lowercase(),
    })
}

fn rule_entries(archetype: Archetype, potency: i32) -> Vec<RuleEntry> {
    if !archetype.is_spellcasting() || potency <= 0 {
        return Vec::new();
    }
    ["spell-attack", "spell-dc"]
        .iter()
        .map(|selector| RuleEntry {
            key: "FlatModifier".to_string(),
            selector: selector.to_string(),
            value: potency,
        })
        .collect()
}
