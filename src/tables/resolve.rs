//! Roll resolution against filtered table rows.
//!
//! Filtering can leave gaps between adjacent ranges (a tier or condition
//! slice rarely covers every face of the die). A roll that lands in a gap
//! snaps to the nearer neighboring row, with ties going to the earlier row.
//! A roll below the first row's minimum has no neighbor to snap back to and
//! is reported as a content defect rather than silently re-rolled.

use crate::tables::TableRow;
use crate::{ForgeError, ForgeResult};

/// An inclusive dice range parsed from a `"<min>-<max>"` cell.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DiceRange {
    pub min: i64,
    pub max: i64,
}

impl DiceRange {
    /// Parses a `"<min>-<max>"` cell. Single numbers, reversed bounds, and
    /// non-numeric text are content errors naming the offending table.
    pub fn parse(table: &str, range: &str) -> ForgeResult<Self> {
        let (min, max) = range.split_once('-').ok_or_else(|| ForgeError::Parse {
            name: table.to_string(),
            reason: format!("range '{}' is not of the form '<min>-<max>'", range),
        })?;
        let min: i64 = min.trim().parse().map_err(|_| ForgeError::Parse {
            name: table.to_string(),
            reason: format!("range '{}' has a non-numeric minimum", range),
        })?;
        let max: i64 = max.trim().parse().map_err(|_| ForgeError::Parse {
            name: table.to_string(),
            reason: format!("range '{}' has a non-numeric maximum", range),
        })?;
        if min > max {
            return Err(ForgeError::Parse {
                name: table.to_string(),
                reason: format!("range '{}' runs backwards", range),
            });
        }
        Ok(Self { min, max })
    }

    /// True when `roll` falls inside the range, bounds included.
    pub fn contains(&self, roll: i64) -> bool {
        roll >= self.min && roll <= self.max
    }
}

/// The die size implied by filtered rows: the last row's range maximum.
///
/// Rows arrive in file order with ascending ranges, so the last row closes
/// the table. An empty row set is a content error (every filter slice must
/// leave something rollable).
pub fn max_roll(rows: &[TableRow], table: &str) -> ForgeResult<i64> {
    let last = rows.last().ok_or_else(|| ForgeError::Parse {
        name: table.to_string(),
        reason: "no rows to roll against".to_string(),
    })?;
    let range = last.chance().ok_or_else(|| ForgeError::Parse {
        name: table.to_string(),
        reason: "last row has no range".to_string(),
    })?;
    Ok(DiceRange::parse(table, range)?.max)
}

/// Resolves a roll to a row, snapping gap rolls to the nearest neighbor.
///
/// Rows are scanned in order. A roll inside a row's range selects that row.
/// A roll that falls short of the current row's minimum landed in a gap: it
/// selects whichever of the current row and the previous row is nearer, the
/// previous row on a tie. A roll below the first row's minimum, or beyond
/// the last row's maximum, means the table's ranges do not cover its die
/// and is reported as [`ForgeError::NoMatch`].
pub fn resolve<'a>(rows: &'a [TableRow], roll: i64, table: &str) -> ForgeResult<&'a TableRow> {
    let mut previous: Option<(&TableRow, DiceRange)> = None;

    for row in rows {
        let raw = row.chance().ok_or_else(|| ForgeError::Parse {
            name: table.to_string(),
            reason: "row has no range".to_string(),
        })?;
        let range = DiceRange::parse(table, raw)?;

        if range.contains(roll) {
            return Ok(row);
        }
        if roll < range.min {
            return match previous {
                None => Err(ForgeError::NoMatch {
                    table: table.to_string(),
                    roll,
                }),
                Some((prev_row, prev_range)) => {
                    if (range.min - roll) < (roll - prev_range.max) {
                        Ok(row)
                    } else {
                        Ok(prev_row)
                    }
                }
            };
        }
        previous = Some((row, range));
    }

    Err(ForgeError::NoMatch {
        table: table.to_string(),
        roll,
    })
}
