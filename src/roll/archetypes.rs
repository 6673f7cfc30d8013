//! The ten archetype roll protocols.
//!
//! Each protocol is a short sequential script over [`RollSession`] steps.
//! The table set an archetype consults is fixed by convention: the tables
//! under its prefix directory, one per field it resolves.

use crate::item::{Archetype, Field, RuneFamily, RuneTier};
use crate::roll::{subprotocol, RollProtocol, RollSession};
use crate::utils::{
    add_element_to_energy_breath, add_element_to_retaliation, extract_scroll_rank, rank_ordinal,
    split_potency,
};
use crate::ForgeResult;
use async_trait::async_trait;
use std::sync::Arc;

/// Merges compendium data for the rolled item name into the session, when
/// the catalog has any. Misses and lookup failures degrade to defaults:
/// the roll is already made and must complete.
async fn apply_catalog_template(session: &mut RollSession<'_>) {
    let Some(name) = session.item.item.clone() else {
        return;
    };
    let catalog = Arc::clone(&session.env().catalog);
    match catalog.lookup(&name, session.item.archetype.prefix()).await {
        Ok(Some(template)) => {
            if let Some(damage_type) = &template.damage_type {
                session.item.add_condition(damage_type);
            }
            if let Some(category) = &template.category {
                session.item.add_condition(category);
            }
            for tag in &template.traits {
                session.item.add_condition(tag);
            }
            if session.item.level.is_none() {
                session.item.level = template.level;
            }
            if session.item.description.is_none() {
                session.item.description = template.description.clone();
            }
            log::debug!("[{}] merged catalog template for '{}'", session.item.id, name);
        }
        Ok(None) => {
            log::warn!(
                "[{}] no catalog entry for '{}', continuing with defaults",
                session.item.id,
                name
            );
        }
        Err(e) => {
            log::warn!(
                "[{}] catalog lookup for '{}' failed ({}), continuing with defaults",
                session.item.id,
                name,
                e
            );
        }
    }
}

/// Records the acting character's level on the item, for the archetypes
/// whose tables are level-scoped.
async fn record_character_level(session: &mut RollSession<'_>) -> ForgeResult<i32> {
    let character = Arc::clone(&session.env().character);
    let level = character
        .character_level()
        .await
        .map_err(|source| session.step_failure("level", source))?;
    session.item.level = Some(level);
    log::debug!("[{}] acting character level {}", session.item.id, level);
    Ok(level)
}

/// Replaces a generic ranked scroll name with a concrete spell of that
/// rank, preferring the rolled tradition and falling back to any tradition
/// before giving up on the generic name.
async fn pick_scroll_spell(
    session: &mut RollSession<'_>,
    rank: i32,
    tradition: &str,
) -> ForgeResult<()> {
    let spells = Arc::clone(&session.env().spells);
    let mut candidates = spells
        .spells_by_rank(rank, Some(tradition))
        .await
        .map_err(|source| session.step_failure("spell", source))?;
    if candidates.is_empty() {
        log::warn!(
            "[{}] no rank-{} {} spells, falling back to any tradition",
            session.item.id,
            rank,
            tradition
        );
        candidates = spells
            .spells_by_rank(rank, None)
            .await
            .map_err(|source| session.step_failure("spell", source))?;
    }
    if candidates.is_empty() {
        log::warn!(
            "[{}] no rank-{} spells at all, keeping the generic scroll name",
            session.item.id,
            rank
        );
        return Ok(());
    }

    let dice = Arc::clone(&session.env().dice);
    let index = dice
        .draw_uniform(candidates.len() as i64)
        .await
        .map_err(|source| session.step_failure("spell", source))?;
    let spell = &candidates[(index - 1) as usize];
    let name = format!("Scroll of {} ({}-rank)", spell.name, rank_ordinal(rank));
    session.item.set_field(Field::Item, name);
    Ok(())
}

/// Weapons: potency (chaining precious materials), a type tag that narrows
/// later tables, the weapon itself, compendium enrichment, then property
/// runes bounded by potency.
#[derive(Debug, Clone, Copy, Default)]
pub struct WeaponProtocol;

#[async_trait]
impl RollProtocol for WeaponProtocol {
    fn archetype(&self) -> Archetype {
        Archetype::Weapon
    }

    async fn roll(&self, session: &mut RollSession<'_>) -> ForgeResult<()> {
        let potency = subprotocol::roll_potency_with_material(session).await?;
        let split =
            split_potency(&potency).map_err(|source| session.step_failure("potency", source))?;

        let kind = session.roll_field(Field::Kind).await?;
        session.item.add_condition(&kind);

        session.roll_field(Field::Item).await?;
        apply_catalog_template(session).await;

        subprotocol::roll_bounded_runes(session, split.potency).await
    }
}

/// Armor: same shape as weapons with the resilient rune family.
#[derive(Debug, Clone, Copy, Default)]
pub struct ArmorProtocol;

#[async_trait]
impl RollProtocol for ArmorProtocol {
    fn archetype(&self) -> Archetype {
        Archetype::Armor
    }

    async fn roll(&self, session: &mut RollSession<'_>) -> ForgeResult<()> {
        let potency = subprotocol::roll_potency_with_material(session).await?;
        let split =
            split_potency(&potency).map_err(|source| session.step_failure("potency", source))?;

        let kind = session.roll_field(Field::Kind).await?;
        session.item.add_condition(&kind);

        session.roll_field(Field::Item).await?;
        apply_catalog_template(session).await;

        subprotocol::roll_bounded_runes(session, split.potency).await
    }
}

/// Shields: material, potency, a single reinforcing rune derived from the
/// potency bonus rather than a rune loop, then the shield itself.
#[derive(Debug, Clone, Copy, Default)]
pub struct ShieldProtocol;

#[async_trait]
impl RollProtocol for ShieldProtocol {
    fn archetype(&self) -> Archetype {
        Archetype::Shield
    }

    async fn roll(&self, session: &mut RollSession<'_>) -> ForgeResult<()> {
        session.roll_field(Field::Material).await?;

        let potency = subprotocol::roll_potency_with_material(session).await?;
        let split =
            split_potency(&potency).map_err(|source| session.step_failure("potency", source))?;
        if let Some(tier) = RuneTier::for_potency(RuneFamily::Reinforcing, split.potency) {
            session.item.set_field(Field::Rune, tier.identifier());
            session.item.push_rune(tier.identifier());
        }

        session.roll_field(Field::Item).await?;
        Ok(())
    }
}

/// Staves: a carrier potency, a haft material, the staff itself, and the
/// element its bonus damage derives from.
#[derive(Debug, Clone, Copy, Default)]
pub struct StaffProtocol;

#[async_trait]
impl RollProtocol for StaffProtocol {
    fn archetype(&self) -> Archetype {
        Archetype::Staff
    }

    async fn roll(&self, session: &mut RollSession<'_>) -> ForgeResult<()> {
        subprotocol::roll_potency_with_material(session).await?;
        session.roll_field(Field::Material).await?;
        session.roll_field(Field::Item).await?;
        session.roll_field(Field::Element).await?;
        session.roll_field(Field::Kind).await?;
        Ok(())
    }
}

/// Wands: same script as staves against the wand tables.
#[derive(Debug, Clone, Copy, Default)]
pub struct WandProtocol;

#[async_trait]
impl RollProtocol for WandProtocol {
    fn archetype(&self) -> Archetype {
        Archetype::Wand
    }

    async fn roll(&self, session: &mut RollSession<'_>) -> ForgeResult<()> {
        subprotocol::roll_potency_with_material(session).await?;
        session.roll_field(Field::Material).await?;
        session.roll_field(Field::Item).await?;
        session.roll_field(Field::Element).await?;
        session.roll_field(Field::Kind).await?;
        Ok(())
    }
}

/// Scrolls: a ranked scroll name and a tradition, then a concrete spell of
/// that rank looked up from the host's spell source.
#[derive(Debug, Clone, Copy, Default)]
pub struct ScrollProtocol;

#[async_trait]
impl RollProtocol for ScrollProtocol {
    fn archetype(&self) -> Archetype {
        Archetype::Scroll
    }

    async fn roll(&self, session: &mut RollSession<'_>) -> ForgeResult<()> {
        let name = session.roll_field(Field::Item).await?;
        let tradition = session.roll_field(Field::Kind).await?;

        let rank = extract_scroll_rank(&name);
        if rank == 0 {
            log::warn!(
                "[{}] scroll name '{}' carries no rank, keeping it as rolled",
                session.item.id,
                name
            );
            return Ok(());
        }
        pick_scroll_spell(session, rank, &tradition).await
    }
}

/// Potions: level-scoped single-item roll, with an elemental descriptor
/// injected into the names that call for one.
#[derive(Debug, Clone, Copy, Default)]
pub struct PotionProtocol;

#[async_trait]
impl RollProtocol for PotionProtocol {
    fn archetype(&self) -> Archetype {
        Archetype::Potion
    }

    async fn roll(&self, session: &mut RollSession<'_>) -> ForgeResult<()> {
        record_character_level(session).await?;
        let name = session.roll_field(Field::Item).await?;

        if name.contains("Retaliation") {
            let element = session.roll_field(Field::Element).await?;
            session
                .item
                .set_field(Field::Item, add_element_to_retaliation(&name, &element));
        } else if name.contains("Energy Breath") {
            let element = session.roll_field(Field::Element).await?;
            session
                .item
                .set_field(Field::Item, add_element_to_energy_breath(&name, &element));
        }
        Ok(())
    }
}

/// Worn items: level-scoped single-item roll.
#[derive(Debug, Clone, Copy, Default)]
pub struct WornProtocol;

#[async_trait]
impl RollProtocol for WornProtocol {
    fn archetype(&self) -> Archetype {
        Archetype::Worn
    }

    async fn roll(&self, session: &mut RollSession<'_>) -> ForgeResult<()> {
        record_character_level(session).await?;
        session.roll_field(Field::Item).await?;
        Ok(())
    }
}

/// Jewelry: level-scoped material-then-item roll.
#[derive(Debug, Clone, Copy, Default)]
pub struct JewelryProtocol;

#[async_trait]
impl RollProtocol for JewelryProtocol {
    fn archetype(&self) -> Archetype {
        Archetype::Jewelry
    }

    async fn roll(&self, session: &mut RollSession<'_>) -> ForgeResult<()> {
        record_character_level(session).await?;
        session.roll_field(Field::Material).await?;
        session.roll_field(Field::Item).await?;
        Ok(())
    }
}

/// Grimoires: a binding material and the tome itself.
#[derive(Debug, Clone, Copy, Default)]
pub struct GrimoireProtocol;

#[async_trait]
impl RollProtocol for GrimoireProtocol {
    fn archetype(&self) -> Archetype {
        Archetype::Grimoire
    }

    async fn roll(&self, session: &mut RollSession<'_>) -> ForgeResult<()> {
        session.roll_field(Field::Material).await?;
        session.roll_field(Field::Item).await?;
        Ok(())
    }
}
