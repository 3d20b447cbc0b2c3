use crate::error::{EngineError, EngineResult};
use crate::symbols::SymbolId;
use serde::{Deserialize, Serialize};
use std::fmt;

pub const DEFAULT_REELS: usize = 5;
pub const DEFAULT_ROWS: usize = 3;
/// Shortest run that pays, and therefore the narrowest board that can win.
pub const MIN_REELS: usize = 3;

/// One spin outcome, stored row-major: `rows[row][reel]`.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Grid {
    rows: Vec<Vec<SymbolId>>,
}

impl Grid {
    /// Wraps rows as given. Shape is only checked by [`Grid::validate`], so a
    /// ragged grid can still reach the evaluator and be rejected there.
    pub fn from_rows(rows: Vec<Vec<SymbolId>>) -> Self {
        Self { rows }
    }

    /// Builds a grid from reel columns (`reels[reel][row]`).
    pub fn from_reels(reels: &[Vec<SymbolId>]) -> EngineResult<Self> {
        let row_count = reels.first().map_or(0, Vec::len);
        if let Some(bad) = reels.iter().position(|reel| reel.len() != row_count) {
            return Err(EngineError::MalformedGrid(format!(
                "reel {bad} has {} rows, expected {row_count}",
                reels[bad].len()
            )));
        }
        let rows = (0..row_count)
            .map(|row| reels.iter().map(|reel| reel[row]).collect())
            .collect();
        Ok(Self { rows })
    }

    pub fn row_count(&self) -> usize {
        self.rows.len()
    }

    /// Reel count taken from the first row.
    pub fn reel_count(&self) -> usize {
        self.rows.first().map_or(0, Vec::len)
    }

    pub fn rows(&self) -> &[Vec<SymbolId>] {
        &self.rows
    }

    pub fn row(&self, row: usize) -> Option<&[SymbolId]> {
        self.rows.get(row).map(Vec::as_slice)
    }

    pub fn get(&self, reel: usize, row: usize) -> Option<SymbolId> {
        self.rows.get(row).and_then(|r| r.get(reel)).copied()
    }

    /// Column-major copy (`[reel][row]`), the layout reel renderers expect.
    /// Cells missing from a short row are skipped.
    pub fn to_reels(&self) -> Vec<Vec<SymbolId>> {
        (0..self.reel_count())
            .map(|reel| {
                self.rows
                    .iter()
                    .filter_map(|row| row.get(reel).copied())
                    .collect()
            })
            .collect()
    }

    pub fn validate(&self) -> EngineResult<()> {
        let reel_count = self.reel_count();
        if let Some(bad) = self.rows.iter().position(|r| r.len() != reel_count) {
            return Err(EngineError::MalformedGrid(format!(
                "row {bad} has {} reels, expected {reel_count}",
                self.rows[bad].len()
            )));
        }
        if reel_count < MIN_REELS {
            return Err(EngineError::MalformedGrid(format!(
                "{reel_count} reels, need at least {MIN_REELS}"
            )));
        }
        Ok(())
    }
}

impl fmt::Display for Grid {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (i, row) in self.rows.iter().enumerate() {
            if i > 0 {
                writeln!(f)?;
            }
            for (reel, symbol) in row.iter().enumerate() {
                if reel > 0 {
                    f.write_str(" ")?;
                }
                write!(f, "{:<6}", symbol.as_str())?;
            }
        }
        Ok(())
    }
}
