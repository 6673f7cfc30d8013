//! Property-style checks on range resolution and the invariants that the
//! rolling pipeline builds on top of it.

use lootforge::{
    max_roll, resolve, split_potency, Archetype, ArchetypeRegistry, DiceRange, FirstPick,
    FixedLevelSource, MemoryStore, OfflineCatalog, RollEnvironment, RollRequest, SeededDice,
    StaticSpellbook, TableRow,
};
use proptest::prelude::*;
use std::sync::Arc;

fn row(item: &str, min: i64, max: i64) -> TableRow {
    let mut row = TableRow::new();
    row.set("Item", item);
    row.set("Chance", format!("{}-{}", min, max));
    row
}

proptest! {
    /// A table whose ranges tile 1..=N without gaps resolves every face to
    /// the row that contains it.
    #[test]
    fn contiguous_coverage_resolves_every_face(
        widths in prop::collection::vec(1i64..20, 1..8),
    ) {
        let mut rows = Vec::new();
        let mut start = 1i64;
        for (index, width) in widths.iter().enumerate() {
            rows.push(row(&format!("outcome-{}", index), start, start + width - 1));
            start += width;
        }
        let total = start - 1;
        prop_assert_eq!(max_roll(&rows, "fixture").unwrap(), total);

        for roll in 1..=total {
            let hit = resolve(&rows, roll, "fixture").unwrap();
            let range = DiceRange::parse("fixture", hit.chance().unwrap()).unwrap();
            prop_assert!(range.contains(roll), "roll {} landed outside {:?}", roll, range);
        }
    }

    /// Rolls into a gap snap to the closer neighbor; the lower row wins a
    /// tie.
    #[test]
    fn gap_rolls_snap_to_the_nearest_neighbor(
        first_max in 1i64..60,
        gap in 1i64..25,
        second_width in 1i64..40,
    ) {
        let second_min = first_max + gap + 1;
        let rows = vec![
            row("lower", 1, first_max),
            row("upper", second_min, second_min + second_width - 1),
        ];

        for roll in (first_max + 1)..second_min {
            let hit = resolve(&rows, roll, "fixture").unwrap();
            let expected = if (second_min - roll) < (roll - first_max) {
                "upper"
            } else {
                "lower"
            };
            prop_assert_eq!(hit.item().unwrap(), expected, "roll {} in gap", roll);
        }
    }

    /// Splitting a `+N Bonus` outcome always recovers both halves.
    #[test]
    fn potency_splits_recover_both_halves(
        potency in 1i32..10,
        bonus in "[A-Za-z][A-Za-z ]{0,18}[A-Za-z]",
    ) {
        let split = split_potency(&format!("+{} {}", potency, bonus)).unwrap();
        prop_assert_eq!(split.potency, potency);
        prop_assert_eq!(split.bonus, bonus);
    }
}

/// Whatever the dice do, a weapon never carries more property runes than
/// its potency allows, and the potency itself stays inside the table's
/// bounds. The fixture keeps melee and ranged slices overlapping so both
/// filtered views stay seamless.
#[tokio::test]
async fn property_rune_counts_never_exceed_potency() {
    let mut store = MemoryStore::new();
    store.insert(
        "weapon/weapon-potency.tsv",
        "Item\tChance\n\
         +1 Striking weapon\t1-50\n\
         +2 Greater Striking weapon\t51-90\n\
         Precious Material and roll again\t91-100\n",
    );
    store.insert(
        "weapon/weapon-material.tsv",
        "Item\tChance\nCold Iron (Low)\t1-100\n",
    );
    store.insert(
        "weapon/weapon-type.tsv",
        "Item\tChance\nMelee\t1-55\nRanged\t56-100\n",
    );
    store.insert(
        "weapon/weapon-item.tsv",
        "Item\tChance\tCondition\n\
         Dagger\t1-10\n\
         Longsword\t11-55\tmelee\n\
         Longbow\t11-60\tranged\n\
         Greatsword\t56-100\tmelee\n\
         Heavy Crossbow\t61-100\tranged\n",
    );
    store.insert(
        "weapon/weapon-runechance.tsv",
        "Item\tChance\n\
         No Property Runes\t1-25\n\
         1 Property Rune\t26-50\n\
         2 Property Runes\t51-75\n\
         3 Property Runes\t76-100\n",
    );
    store.insert(
        "weapon/weapon-runes.tsv",
        "Item\tChance\tCondition\n\
         Flaming\t1-40\n\
         Keen\t41-70\tmelee\n\
         Returning\t41-70\tranged\n\
         Vorpal\t71-100\tmelee\n\
         Crushing\t71-100\tranged\n",
    );
    let store = Arc::new(store);
    let registry = ArchetypeRegistry::standard();

    for seed in 0..40 {
        let env = RollEnvironment::new(
            store.clone(),
            Arc::new(SeededDice::new(seed)),
            Arc::new(FixedLevelSource::new(3)),
            Arc::new(OfflineCatalog),
            Arc::new(StaticSpellbook::default()),
            Arc::new(FirstPick),
        );
        let request = RollRequest::new(Archetype::Weapon);
        let data = registry
            .roll(&env, &request)
            .await
            .unwrap_or_else(|e| panic!("seed {} failed: {}", seed, e));

        assert!(
            (1..=2).contains(&data.runes.potency),
            "seed {}: potency {} out of table bounds",
            seed,
            data.runes.potency
        );
        assert!(
            data.runes.property.len() as i32 <= data.runes.potency,
            "seed {}: {} runes on a +{} weapon",
            seed,
            data.runes.property.len(),
            data.runes.potency
        );
    }
}
