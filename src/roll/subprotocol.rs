//! Sub-protocols shared across archetype scripts: the compound "roll
//! twice" expansion, the precious-material chain, and the potency-bounded
//! property-rune loop.

use crate::item::Field;
use crate::roll::{RollSession, StepOptions};
use crate::utils::{purify_rune_name, split_potency};
use crate::{config, ForgeError, ForgeResult};
use std::future::Future;
use std::pin::Pin;

/// Upper bound on precious-material chaining. The sentinel row sits last
/// by convention and the re-roll skips it, so a healthy table resolves in
/// one hop; a table with the sentinel anywhere else would chain forever.
const PRECIOUS_LOOP_LIMIT: usize = 8;

/// Resolves a table to an outcome, expanding the compound-reroll sentinel.
///
/// When the roll lands on the sentinel, two sub-rolls run concurrently
/// against the same table and the environment's picker chooses between
/// them. Sub-rolls at or beyond the configured depth have the sentinel row
/// removed before rolling, which bounds the fan-out. Boxed because the
/// expansion recurses.
pub(crate) fn resolve_with_reroll<'a>(
    session: &'a RollSession<'_>,
    table: &'a str,
    depth: usize,
    opts: StepOptions,
) -> Pin<Box<dyn Future<Output = ForgeResult<String>> + Send + 'a>> {
    Box::pin(async move {
        let mut step = opts;
        step.exclude_reroll_sentinel =
            opts.exclude_reroll_sentinel || depth >= session.env().config.max_reroll_depth;

        let outcome = session.resolve_once(table, step).await?;
        if outcome != config::REROLL_SENTINEL {
            return Ok(outcome);
        }

        let (first, second) = tokio::join!(
            resolve_with_reroll(session, table, depth + 1, opts),
            resolve_with_reroll(session, table, depth + 1, opts),
        );
        let candidates = vec![first?, second?];
        log::debug!(
            "[{}] {}: compound reroll offers {:?}",
            session.item.id,
            table,
            candidates
        );
        session.env().picker.pick_one(&candidates).await
    })
}

/// Rolls the potency field, chaining through the precious-material
/// sentinel: each hit rolls a material and re-rolls potency on the table
/// minus its final row, until a real potency lands.
pub(crate) async fn roll_potency_with_material(
    session: &mut RollSession<'_>,
) -> ForgeResult<String> {
    let mut outcome = session.roll_field(Field::Potency).await?;
    let mut hops = 0;
    while outcome == config::PRECIOUS_MATERIAL_SENTINEL {
        hops += 1;
        if hops > PRECIOUS_LOOP_LIMIT {
            return Err(ForgeError::Parse {
                name: session.table_name(Field::Potency.name()),
                reason: format!(
                    "precious-material sentinel still present after {} re-rolls; \
                     the sentinel row must be the table's last",
                    PRECIOUS_LOOP_LIMIT
                ),
            });
        }
        session.roll_field(Field::Material).await?;
        outcome = session
            .roll_field_with(
                Field::Potency,
                StepOptions {
                    skip_last: true,
                    ..StepOptions::default()
                },
            )
            .await?;
    }
    Ok(outcome)
}

/// Rolls the property-rune loop: a rune count from the runechance table,
/// clamped to the potency bonus, then that many rune outcomes appended to
/// the item in roll order, each canonicalized.
pub(crate) async fn roll_bounded_runes(
    session: &mut RollSession<'_>,
    potency: i32,
) -> ForgeResult<()> {
    let chance_table = session.table_name("runechance");
    let outcome = resolve_with_reroll(session, &chance_table, 0, StepOptions::default())
        .await
        .map_err(|source| session.step_failure("runechance", source))?;
    let rolled = split_potency(&outcome)
        .map(|split| split.potency)
        .unwrap_or(0);

    // Property runes may never outnumber the potency bonus.
    let budget = rolled.min(potency.max(0));
    if rolled > budget {
        log::debug!(
            "[{}] rune count {} clamped to potency {}",
            session.item.id,
            rolled,
            budget
        );
    }

    let runes_table = session.table_name("runes");
    for _ in 0..budget {
        let rune = resolve_with_reroll(session, &runes_table, 0, StepOptions::default())
            .await
            .map_err(|source| session.step_failure("runes", source))?;
        session.item.push_rune(purify_rune_name(&rune));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::host::{
        FirstPick, FixedLevelSource, MemoryStore, OfflineCatalog, ScriptedDice, StaticSpellbook,
    };
    use crate::item::Archetype;
    use crate::roll::{RollEnvironment, RollRequest};
    use std::sync::Arc;

    const POTENCY: &str = "Item\tChance\n\
        +1 Striking weapon\t1-40\n\
        +2 Greater Striking weapon\t41-90\n\
        Precious Material and roll again\t91-100\n";
    const MATERIAL: &str = "Item\tChance\n\
        Cold Iron (Low)\t1-60\n\
        Silver (Low)\t61-100\n";
    const RUNECHANCE: &str = "Item\tChance\n\
        No Property Runes\t1-50\n\
        1 Property Rune\t51-80\n\
        2 Property Runes\t81-95\n\
        3 Property Runes\t96-100\n";
    const RUNES: &str = "Item\tChance\n\
        Flaming (Greater)\t1-50\n\
        Frost\t51-100\n";

    fn weapon_store() -> MemoryStore {
        let mut store = MemoryStore::new();
        store.insert("weapon/weapon-potency.tsv", POTENCY);
        store.insert("weapon/weapon-material.tsv", MATERIAL);
        store.insert("weapon/weapon-runechance.tsv", RUNECHANCE);
        store.insert("weapon/weapon-runes.tsv", RUNES);
        store
    }

    fn env_with_draws(store: MemoryStore, draws: impl IntoIterator<Item = i64>) -> RollEnvironment {
        RollEnvironment::new(
            Arc::new(store),
            Arc::new(ScriptedDice::new(draws)),
            Arc::new(FixedLevelSource::new(5)),
            Arc::new(OfflineCatalog),
            Arc::new(StaticSpellbook::default()),
            Arc::new(FirstPick),
        )
    }

    #[tokio::test]
    async fn test_plain_potency_rolls_no_material() {
        let env = env_with_draws(weapon_store(), [10]);
        let request = RollRequest::new(Archetype::Weapon);
        let mut session = RollSession::new(&env, &request);

        let outcome = roll_potency_with_material(&mut session).await.unwrap();
        assert_eq!(outcome, "+1 Striking weapon");
        assert_eq!(session.item.material, None);
    }

    #[tokio::test]
    async fn test_precious_sentinel_chains_into_material_then_rerolls() {
        // 95 hits the sentinel, 30 picks Cold Iron, 50 re-rolls potency on
        // the 90-face table without its sentinel row.
        let env = env_with_draws(weapon_store(), [95, 30, 50]);
        let request = RollRequest::new(Archetype::Weapon);
        let mut session = RollSession::new(&env, &request);

        let outcome = roll_potency_with_material(&mut session).await.unwrap();
        assert_eq!(outcome, "+2 Greater Striking weapon");
        assert_eq!(session.item.material.as_deref(), Some("Cold Iron (Low)"));
        assert_eq!(
            session.item.potency.as_deref(),
            Some("+2 Greater Striking weapon")
        );
    }

    #[tokio::test]
    async fn test_misplaced_sentinel_is_reported_not_chased() {
        let mut store = MemoryStore::new();
        store.insert(
            "weapon/weapon-potency.tsv",
            "Item\tChance\n\
             Precious Material and roll again\t1-50\n\
             +1 Striking weapon\t51-100\n",
        );
        store.insert("weapon/weapon-material.tsv", MATERIAL);

        // Every re-roll drops the last row, leaving only the sentinel.
        let draws = std::iter::once(10).chain([50, 25].into_iter().cycle().take(16));
        let env = env_with_draws(store, draws);
        let request = RollRequest::new(Archetype::Weapon);
        let mut session = RollSession::new(&env, &request);

        let err = roll_potency_with_material(&mut session).await.unwrap_err();
        match err {
            ForgeError::Parse { name, .. } => {
                assert_eq!(name, "weapon/weapon-potency.tsv");
            }
            other => panic!("expected Parse, got {:?}", other),
        }
    }

    #[tokio::test]
    async fn test_rune_count_is_clamped_to_potency() {
        // 97 rolls "3 Property Runes" against potency 1.
        let env = env_with_draws(weapon_store(), [97, 40]);
        let request = RollRequest::new(Archetype::Weapon);
        let mut session = RollSession::new(&env, &request);

        roll_bounded_runes(&mut session, 1).await.unwrap();
        assert_eq!(session.item.runes, vec!["greaterFlaming"]);
    }

    #[tokio::test]
    async fn test_zero_potency_rolls_no_runes() {
        let env = env_with_draws(weapon_store(), [97]);
        let request = RollRequest::new(Archetype::Weapon);
        let mut session = RollSession::new(&env, &request);

        roll_bounded_runes(&mut session, 0).await.unwrap();
        assert!(session.item.runes.is_empty());
    }

    #[tokio::test]
    async fn test_textual_zero_rune_count() {
        // "No Property Runes" parses to no digits and degrades to zero.
        let env = env_with_draws(weapon_store(), [30]);
        let request = RollRequest::new(Archetype::Weapon);
        let mut session = RollSession::new(&env, &request);

        roll_bounded_runes(&mut session, 3).await.unwrap();
        assert!(session.item.runes.is_empty());
    }

    #[tokio::test]
    async fn test_runes_accumulate_in_roll_order() {
        // Two runes under potency 2: Frost then Flaming (Greater).
        let env = env_with_draws(weapon_store(), [90, 80, 20]);
        let request = RollRequest::new(Archetype::Weapon);
        let mut session = RollSession::new(&env, &request);

        roll_bounded_runes(&mut session, 2).await.unwrap();
        assert_eq!(session.item.runes, vec!["frost", "greaterFlaming"]);
    }
}
