//! Table parsing and the shared in-memory table cache.
//!
//! Table resources are plain text: one header line naming the columns, then
//! one line per row. The delimiter is sniffed from the header — tab when the
//! header contains one, comma otherwise — so TSV exports and hand-edited CSV
//! files load through the same path.

use crate::host::ResourceStore;
use crate::tables::Table;
use crate::{ForgeError, ForgeResult};
use std::collections::HashMap;
use std::sync::{Arc, Mutex};

use super::TableRow;

/// Parses delimited table text into a [`Table`].
///
/// Blank lines are skipped and carriage returns stripped, so CRLF files
/// parse identically to LF files. Rows shorter than the header are
/// tolerated (trailing cells absent); rows longer than the header are a
/// content error, as are files with no header or no data rows.
pub fn parse_table(name: &str, raw: &str) -> ForgeResult<Table> {
    let mut lines = raw
        .lines()
        .map(|line| line.trim_end_matches('\r'))
        .filter(|line| !line.trim().is_empty());

    let header = lines.next().ok_or_else(|| ForgeError::Parse {
        name: name.to_string(),
        reason: "empty table file".to_string(),
    })?;
    let delimiter = if header.contains('\t') { '\t' } else { ',' };
    let columns: Vec<String> = header
        .split(delimiter)
        .map(|c| c.trim().to_string())
        .collect();

    let mut rows = Vec::new();
    for line in lines {
        let cells: Vec<&str> = line.split(delimiter).map(str::trim).collect();
        if cells.len() > columns.len() {
            return Err(ForgeError::Parse {
                name: name.to_string(),
                reason: format!(
                    "row has {} cells but the header has {} columns: '{}'",
                    cells.len(),
                    columns.len(),
                    line
                ),
            });
        }
        let mut row = TableRow::new();
        for (column, cell) in columns.iter().zip(cells) {
            row.set(column.clone(), cell.to_string());
        }
        rows.push(row);
    }

    if rows.is_empty() {
        return Err(ForgeError::Parse {
            name: name.to_string(),
            reason: "table has no data rows".to_string(),
        });
    }

    Ok(Table {
        name: name.to_string(),
        columns,
        rows,
    })
}

/// Memoizing cache of parsed tables, keyed by resource name.
///
/// Tables are loaded at most once per cache and shared via [`Arc`]. There is
/// no eviction: the table set of a campaign is small and static for the
/// lifetime of a process. The internal lock is never held across an await.
#[derive(Debug, Default)]
pub struct TableCache {
    tables: Mutex<HashMap<String, Arc<Table>>>,
}

impl TableCache {
    /// Creates an empty cache.
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns the cached table for `name`, if already loaded.
    pub fn lookup(&self, name: &str) -> Option<Arc<Table>> {
        let tables = self
            .tables
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner());
        tables.get(name).cloned()
    }

    /// Loads a table through `store`, parsing and caching it on first use.
    ///
    /// Concurrent first loads of the same name may both fetch the resource;
    /// the first parse to finish wins the cache slot and both callers see
    /// the same [`Arc`].
    pub async fn load(&self, store: &dyn ResourceStore, name: &str) -> ForgeResult<Arc<Table>> {
        if let Some(table) = self.lookup(name) {
            return Ok(table);
        }

        let raw = store.load_resource(name).await?;
        let table = Arc::new(parse_table(name, &raw)?);

        let mut tables = self
            .tables
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner());
        Ok(tables.entry(name.to_string()).or_insert(table).clone())
    }

    /// Number of tables currently cached.
    pub fn len(&self) -> usize {
        let tables = self
            .tables
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner());
        tables.len()
    }

    /// True when nothing has been cached yet.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}
