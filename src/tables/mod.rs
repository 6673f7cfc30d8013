//! # Tables Module
//!
//! Weighted probability tables and the filter chain that narrows them.
//!
//! A table is an ordered sequence of rows parsed from a delimited text
//! resource. Every row names an outcome in its `Item` column; rows that
//! encode probability carry one or more dice-range columns (`"<min>-<max>"`).
//! Tiered tables carry one range column per quality tier; untiered tables
//! carry a single `d%` (legacy) or `Chance` column. Before a roll is
//! resolved, the filter chain narrows the rows by quality tier and by the
//! condition tags accumulated on the in-progress item, projecting whichever
//! range column applies into the uniform `Chance` field the resolver reads.

pub mod loader;
pub mod resolve;

pub use loader::*;
pub use resolve::*;

use crate::{ForgeError, ForgeResult};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::fmt;
use std::str::FromStr;

/// Column naming the outcome of each row.
pub const ITEM_COLUMN: &str = "Item";

/// Uniform range column the resolver reads after filtering.
pub const CHANCE_COLUMN: &str = "Chance";

/// Legacy range column of untiered tables.
pub const LEGACY_RANGE_COLUMN: &str = "d%";

/// Column carrying comma-separated condition tags.
pub const CONDITION_COLUMN: &str = "Condition";

/// Column carrying an item level (ignored by the deprecated level filter).
pub const LEVEL_COLUMN: &str = "Level";

/// Quality tiers selecting which range column of a tiered table applies.
///
/// Absence of a tier (`Option::None`) is the "no tiering" sentinel used for
/// tables with a single range column.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum QualityTier {
    Minor,
    Lesser,
    Moderate,
    Greater,
    Major,
}

impl QualityTier {
    /// All tiers in ascending rarity order.
    pub const ALL: [QualityTier; 5] = [
        QualityTier::Minor,
        QualityTier::Lesser,
        QualityTier::Moderate,
        QualityTier::Greater,
        QualityTier::Major,
    ];

    /// The table column carrying this tier's dice ranges.
    ///
    /// # Examples
    ///
    /// ```
    /// use lootforge::QualityTier;
    ///
    /// assert_eq!(QualityTier::Moderate.column_name(), "Moderate");
    /// ```
    pub fn column_name(&self) -> &'static str {
        match self {
            QualityTier::Minor => "Minor",
            QualityTier::Lesser => "Lesser",
            QualityTier::Moderate => "Moderate",
            QualityTier::Greater => "Greater",
            QualityTier::Major => "Major",
        }
    }
}

impl fmt::Display for QualityTier {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.column_name())
    }
}

impl FromStr for QualityTier {
    type Err = ForgeError;

    fn from_str(s: &str) -> ForgeResult<Self> {
        match s.trim().to_lowercase().as_str() {
            "minor" => Ok(QualityTier::Minor),
            "lesser" => Ok(QualityTier::Lesser),
            "moderate" => Ok(QualityTier::Moderate),
            "greater" => Ok(QualityTier::Greater),
            "major" => Ok(QualityTier::Major),
            _ => Err(ForgeError::UnknownQuality(s.to_string())),
        }
    }
}

/// One table row: a mapping from column name to cell value.
///
/// Rows preserve no column order of their own; ordering lives in the owning
/// [`Table`]'s `rows` vector, which the resolver depends on for its
/// nearest-neighbor fallback.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct TableRow {
    cells: HashMap<String, String>,
}

impl TableRow {
    /// Creates an empty row.
    pub fn new() -> Self {
        Self {
            cells: HashMap::new(),
        }
    }

    /// Gets a cell value by column name. Absent cells return `None`;
    /// present-but-empty cells return `Some("")`.
    pub fn get(&self, column: &str) -> Option<&str> {
        self.cells.get(column).map(String::as_str)
    }

    /// Sets a cell value, overwriting any previous value.
    pub fn set(&mut self, column: impl Into<String>, value: impl Into<String>) {
        self.cells.insert(column.into(), value.into());
    }

    /// The row's outcome label (the `Item` column).
    pub fn item(&self) -> Option<&str> {
        self.get(ITEM_COLUMN)
    }

    /// The row's uniform range field, present after quality filtering.
    pub fn chance(&self) -> Option<&str> {
        self.get(CHANCE_COLUMN)
    }

    /// The row's condition tags: comma-split, trimmed, lowercased.
    ///
    /// # Examples
    ///
    /// ```
    /// use lootforge::TableRow;
    ///
    /// let mut row = TableRow::new();
    /// row.set("Condition", "Melee, Slashing");
    /// assert_eq!(row.conditions(), vec!["melee", "slashing"]);
    /// ```
    pub fn conditions(&self) -> Vec<String> {
        self.get(CONDITION_COLUMN)
            .map(|raw| {
                raw.split(',')
                    .map(|tag| tag.trim().to_lowercase())
                    .filter(|tag| !tag.is_empty())
                    .collect()
            })
            .unwrap_or_default()
    }

    /// The row's level, if it carries a parseable `Level` cell.
    pub fn level(&self) -> Option<i32> {
        self.get(LEVEL_COLUMN).and_then(|v| v.trim().parse().ok())
    }
}

/// An ordered probability table loaded from a delimited text resource.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Table {
    /// Resource name the table was loaded from
    pub name: String,
    /// Header columns in file order
    pub columns: Vec<String>,
    /// Rows in file order
    pub rows: Vec<TableRow>,
}

impl Table {
    /// True when the table carries one range column per quality tier.
    pub fn is_tiered(&self) -> bool {
        QualityTier::ALL
            .iter()
            .all(|tier| self.columns.iter().any(|c| c == tier.column_name()))
    }

    /// The single range column of an untiered table, if present.
    pub fn untiered_range_column(&self) -> Option<&str> {
        if self.columns.iter().any(|c| c == LEGACY_RANGE_COLUMN) {
            Some(LEGACY_RANGE_COLUMN)
        } else if self.columns.iter().any(|c| c == CHANCE_COLUMN) {
            Some(CHANCE_COLUMN)
        } else {
            None
        }
    }

    /// Number of data rows.
    pub fn len(&self) -> usize {
        self.rows.len()
    }

    /// True when the table has no data rows.
    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }
}

/// Narrows a table to the rows rollable under the selected quality tier,
/// projecting the applicable range column into the uniform `Chance` field.
///
/// Tiered tables keep only rows with a non-empty cell in the selected tier's
/// column; selecting no tier against a tiered table is a content error.
/// Untiered tables pass through unchanged apart from the projection. Row
/// order is preserved.
pub fn filter_by_quality(
    table: &Table,
    quality: Option<QualityTier>,
) -> ForgeResult<Vec<TableRow>> {
    if table.is_tiered() {
        let tier = quality.ok_or_else(|| ForgeError::Parse {
            name: table.name.clone(),
            reason: "tiered table requires a quality tier".to_string(),
        })?;
        let column = tier.column_name();
        let mut rows = Vec::new();
        for row in &table.rows {
            let Some(range) = row.get(column) else {
                continue;
            };
            if range.is_empty() {
                continue;
            }
            let mut projected = row.clone();
            projected.set(CHANCE_COLUMN, range.to_string());
            rows.push(projected);
        }
        return Ok(rows);
    }

    let column = table
        .untiered_range_column()
        .ok_or_else(|| ForgeError::Parse {
            name: table.name.clone(),
            reason: "table has no range column".to_string(),
        })?;
    let mut rows = Vec::new();
    for row in &table.rows {
        let mut projected = row.clone();
        if let Some(range) = row.get(column) {
            projected.set(CHANCE_COLUMN, range.to_string());
        }
        rows.push(projected);
    }
    Ok(rows)
}

/// Deprecated level filter, retained as a documented no-op.
///
/// Historically this removed rows whose `Level` exceeded the acting
/// character's level. That capped rare high-value finds and was disabled;
/// the function stays in the chain so the pipeline shape (and the decision)
/// remain visible. It must not be reinstated without new product direction.
pub fn filter_by_level(rows: Vec<TableRow>, _max_level: i32) -> Vec<TableRow> {
    rows
}

/// Narrows rows by condition tags, preserving order.
///
/// Rows without a `Condition` value always survive. Rows with conditions
/// survive when their tag set intersects the query tags, except that a row
/// tagged `melee` is excluded whenever the query contains `ranged` even if
/// another tag overlaps — melee and ranged are mutually exclusive.
pub fn filter_by_condition(rows: Vec<TableRow>, tags: &[String]) -> Vec<TableRow> {
    rows.into_iter()
        .filter(|row| {
            let row_tags = row.conditions();
            if row_tags.is_empty() {
                return true;
            }
            if row_tags.iter().any(|t| t == "melee") && tags.iter().any(|t| t == "ranged") {
                return false;
            }
            row_tags.iter().any(|t| tags.contains(t))
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn row(pairs: &[(&str, &str)]) -> TableRow {
        let mut row = TableRow::new();
        for (column, value) in pairs {
            row.set(*column, *value);
        }
        row
    }

    fn tiered_table() -> Table {
        Table {
            name: "weapon/weapon-item.tsv".to_string(),
            columns: vec![
                "Item".to_string(),
                "Minor".to_string(),
                "Lesser".to_string(),
                "Moderate".to_string(),
                "Greater".to_string(),
                "Major".to_string(),
            ],
            rows: vec![
                row(&[
                    ("Item", "Dagger"),
                    ("Minor", "1-50"),
                    ("Lesser", "1-40"),
                    ("Moderate", "1-30"),
                    ("Greater", "1-20"),
                    ("Major", "1-10"),
                ]),
                row(&[
                    ("Item", "Runeblade"),
                    ("Minor", ""),
                    ("Lesser", ""),
                    ("Moderate", "31-100"),
                    ("Greater", "21-100"),
                    ("Major", "11-100"),
                ]),
            ],
        }
    }

    #[test]
    fn test_tier_column_names() {
        assert_eq!(QualityTier::Minor.column_name(), "Minor");
        assert_eq!(QualityTier::Major.column_name(), "Major");
        assert_eq!(QualityTier::ALL.len(), 5);
    }

    #[test]
    fn test_tier_parsing() {
        assert_eq!("moderate".parse::<QualityTier>().unwrap(), QualityTier::Moderate);
        assert_eq!("Greater".parse::<QualityTier>().unwrap(), QualityTier::Greater);
        assert!(matches!(
            "legendary".parse::<QualityTier>(),
            Err(ForgeError::UnknownQuality(_))
        ));
    }

    #[test]
    fn test_quality_filter_keeps_only_rows_with_tier_ranges() {
        let table = tiered_table();

        let minor = filter_by_quality(&table, Some(QualityTier::Minor)).unwrap();
        assert_eq!(minor.len(), 1);
        assert_eq!(minor[0].item(), Some("Dagger"));
        assert_eq!(minor[0].chance(), Some("1-50"));

        let major = filter_by_quality(&table, Some(QualityTier::Major)).unwrap();
        assert_eq!(major.len(), 2);
        assert_eq!(major[0].chance(), Some("1-10"));
        assert_eq!(major[1].chance(), Some("11-100"));
    }

    #[test]
    fn test_quality_filter_requires_tier_for_tiered_tables() {
        let table = tiered_table();
        assert!(matches!(
            filter_by_quality(&table, None),
            Err(ForgeError::Parse { .. })
        ));
    }

    #[test]
    fn test_quality_filter_projects_untiered_range_column() {
        let table = Table {
            name: "potion/potion-item.tsv".to_string(),
            columns: vec!["Item".to_string(), "d%".to_string()],
            rows: vec![
                row(&[("Item", "Healing Potion"), ("d%", "1-60")]),
                row(&[("Item", "Invisibility Potion"), ("d%", "61-100")]),
            ],
        };

        // Untiered tables ignore the selected tier entirely
        let rows = filter_by_quality(&table, Some(QualityTier::Major)).unwrap();
        assert_eq!(rows.len(), 2);
        assert_eq!(rows[0].chance(), Some("1-60"));
        assert_eq!(rows[1].chance(), Some("61-100"));
    }

    #[test]
    fn test_quality_filter_rejects_tables_without_ranges() {
        let table = Table {
            name: "broken.tsv".to_string(),
            columns: vec!["Item".to_string()],
            rows: vec![row(&[("Item", "Orphan")])],
        };
        assert!(matches!(
            filter_by_quality(&table, None),
            Err(ForgeError::Parse { .. })
        ));
    }

    #[test]
    fn test_level_filter_is_a_no_op() {
        // Regression guard: high-level rows must survive a low-level character.
        let rows = vec![
            row(&[("Item", "Common Trinket"), ("Level", "1")]),
            row(&[("Item", "Priceless Relic"), ("Level", "20")]),
        ];
        let filtered = filter_by_level(rows.clone(), 1);
        assert_eq!(filtered, rows);
    }

    #[test]
    fn test_condition_filter_keeps_unconditional_rows() {
        let rows = vec![
            row(&[("Item", "Ghost Touch")]),
            row(&[("Item", "Keen"), ("Condition", "slashing")]),
        ];
        let filtered = filter_by_condition(rows, &["bludgeoning".to_string()]);
        assert_eq!(filtered.len(), 1);
        assert_eq!(filtered[0].item(), Some("Ghost Touch"));
    }

    #[test]
    fn test_condition_filter_matches_intersections() {
        let rows = vec![
            row(&[("Item", "Keen"), ("Condition", "slashing, piercing")]),
            row(&[("Item", "Thundering"), ("Condition", "bludgeoning")]),
        ];
        let filtered = filter_by_condition(rows, &["piercing".to_string()]);
        assert_eq!(filtered.len(), 1);
        assert_eq!(filtered[0].item(), Some("Keen"));
    }

    #[test]
    fn test_condition_filter_melee_ranged_exclusion() {
        // Overlap on another tag must not rescue a melee row from a ranged query.
        let rows = vec![row(&[
            ("Item", "Vorpal"),
            ("Condition", "melee, slashing"),
        ])];
        let filtered = filter_by_condition(
            rows,
            &["ranged".to_string(), "slashing".to_string()],
        );
        assert!(filtered.is_empty());
    }

    #[test]
    fn test_condition_filter_melee_rows_survive_melee_queries() {
        let rows = vec![row(&[("Item", "Vorpal"), ("Condition", "melee, slashing")])];
        let filtered = filter_by_condition(rows, &["melee".to_string()]);
        assert_eq!(filtered.len(), 1);
    }

    #[test]
    fn test_row_conditions_are_normalized() {
        let row = row(&[("Item", "Keen"), ("Condition", " Slashing ,PIERCING, ")]);
        assert_eq!(row.conditions(), vec!["slashing", "piercing"]);
    }

    #[test]
    fn test_row_level_parsing() {
        let leveled = row(&[("Item", "Relic"), ("Level", "14")]);
        assert_eq!(leveled.level(), Some(14));
        let unleveled = row(&[("Item", "Trinket")]);
        assert_eq!(unleveled.level(), None);
    }
}
