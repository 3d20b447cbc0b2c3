use crate::error::{EngineError, EngineResult};
use crate::paytable::{MatchKind, Paytable, PaytableRow};
use rand::Rng;
use serde::{Deserialize, Serialize};
use std::fmt;
use tracing::trace;

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[serde(rename_all = "lowercase")]
pub enum SymbolId {
    Cherry,
    Lemon,
    Orange,
    Plum,
    Bell,
    Seven,
}

impl SymbolId {
    pub const ALL: [SymbolId; 6] = [
        SymbolId::Cherry,
        SymbolId::Lemon,
        SymbolId::Orange,
        SymbolId::Plum,
        SymbolId::Bell,
        SymbolId::Seven,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            SymbolId::Cherry => "cherry",
            SymbolId::Lemon => "lemon",
            SymbolId::Orange => "orange",
            SymbolId::Plum => "plum",
            SymbolId::Bell => "bell",
            SymbolId::Seven => "seven",
        }
    }

    pub fn display_name(self) -> &'static str {
        match self {
            SymbolId::Cherry => "Cherry",
            SymbolId::Lemon => "Lemon",
            SymbolId::Orange => "Orange",
            SymbolId::Plum => "Purple Plum",
            SymbolId::Bell => "Golden Bell",
            SymbolId::Seven => "Lucky 7",
        }
    }
}

impl fmt::Display for SymbolId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub struct SymbolSpec {
    pub id: SymbolId,
    /// Relative selection frequency.
    pub weight: u32,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TableConfig {
    pub symbols: Vec<SymbolSpec>,
    pub paytable: Paytable,
}

/// Immutable symbol catalog: weights for the reels plus the paytable.
///
/// Built once and shared read-only; every lookup is `&self`, so a table can
/// sit behind an `Arc` and serve any number of evaluations at once.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "TableConfig", into = "TableConfig")]
pub struct SymbolTable {
    symbols: Vec<SymbolSpec>,
    paytable: Paytable,
    total_weight: u64,
}

impl SymbolTable {
    pub fn new(symbols: Vec<SymbolSpec>, paytable: Paytable) -> EngineResult<Self> {
        if symbols.is_empty() {
            return Err(EngineError::InvalidTable("catalog is empty".into()));
        }
        let mut ids: Vec<SymbolId> = Vec::with_capacity(symbols.len());
        for spec in &symbols {
            if ids.contains(&spec.id) {
                return Err(EngineError::InvalidTable(format!(
                    "{} listed more than once",
                    spec.id
                )));
            }
            if spec.weight == 0 {
                return Err(EngineError::InvalidTable(format!(
                    "{} has zero weight",
                    spec.id
                )));
            }
            ids.push(spec.id);
        }
        paytable.validate(&ids)?;
        let total_weight = symbols.iter().map(|s| u64::from(s.weight)).sum();
        Ok(Self {
            symbols,
            paytable,
            total_weight,
        })
    }

    /// The six-fruit catalog: cherries are common, sevens are rare.
    pub fn classic() -> Self {
        let weights = [
            (SymbolId::Cherry, 20),
            (SymbolId::Lemon, 15),
            (SymbolId::Orange, 12),
            (SymbolId::Plum, 10),
            (SymbolId::Bell, 8),
            (SymbolId::Seven, 5),
        ];
        let symbols: Vec<SymbolSpec> = weights
            .iter()
            .map(|&(id, weight)| SymbolSpec { id, weight })
            .collect();
        let total_weight = symbols.iter().map(|s| u64::from(s.weight)).sum();
        Self {
            symbols,
            paytable: Paytable::classic(),
            total_weight,
        }
    }

    pub fn from_json(json: &str) -> EngineResult<Self> {
        let config: TableConfig = serde_json::from_str(json)
            .map_err(|e| EngineError::InvalidTable(e.to_string()))?;
        Self::try_from(config)
    }

    pub fn symbols(&self) -> &[SymbolSpec] {
        &self.symbols
    }

    pub fn paytable(&self) -> &Paytable {
        &self.paytable
    }

    pub fn total_weight(&self) -> u64 {
        self.total_weight
    }

    pub fn contains(&self, id: SymbolId) -> bool {
        self.symbols.iter().any(|s| s.id == id)
    }

    /// Share of draws that land on `id`.
    pub fn probability(&self, id: SymbolId) -> EngineResult<f64> {
        self.symbols
            .iter()
            .find(|s| s.id == id)
            .map(|s| f64::from(s.weight) / self.total_weight as f64)
            .ok_or(EngineError::UnknownSymbol(id))
    }

    /// Draws one symbol with probability `weight / total_weight`.
    pub fn weighted_pick<R: Rng + ?Sized>(&self, rng: &mut R) -> SymbolId {
        let unit: f64 = rng.gen();
        self.pick_at(unit)
    }

    /// Maps a unit draw in `[0, 1)` onto the catalog by walking it in order
    /// and subtracting weights until the remainder is `<= 0`. If rounding ever
    /// leaves a positive remainder after the walk, the last symbol wins.
    pub fn pick_at(&self, unit: f64) -> SymbolId {
        let mut remainder = unit * self.total_weight as f64;
        for spec in &self.symbols {
            remainder -= f64::from(spec.weight);
            if remainder <= 0.0 {
                return spec.id;
            }
        }
        trace!(unit, remainder, "weighted walk exhausted, using last symbol");
        // `new` rejects empty catalogs
        self.symbols[self.symbols.len() - 1].id
    }

    pub fn payout_multiplier(&self, id: SymbolId, match_count: usize) -> EngineResult<f64> {
        MatchKind::from_count(match_count)?;
        if !self.contains(id) {
            return Err(EngineError::UnknownSymbol(id));
        }
        self.paytable.multiplier(id, match_count)
    }

    /// Catalog rows ordered by five-of-a-kind payout, highest first.
    pub fn paytable_rows(&self) -> EngineResult<Vec<PaytableRow>> {
        let mut rows = self
            .symbols
            .iter()
            .map(|spec| {
                Ok(PaytableRow {
                    symbol: spec.id,
                    name: spec.id.display_name(),
                    three: self.paytable.multiplier(spec.id, 3)?,
                    four: self.paytable.multiplier(spec.id, 4)?,
                    five: self.paytable.multiplier(spec.id, 5)?,
                    probability: f64::from(spec.weight) / self.total_weight as f64,
                })
            })
            .collect::<EngineResult<Vec<_>>>()?;
        rows.sort_by(|a, b| b.five.total_cmp(&a.five));
        Ok(rows)
    }
}

impl Default for SymbolTable {
    fn default() -> Self {
        Self::classic()
    }
}

impl TryFrom<TableConfig> for SymbolTable {
    type Error = EngineError;

    fn try_from(config: TableConfig) -> EngineResult<Self> {
        Self::new(config.symbols, config.paytable)
    }
}

impl From<SymbolTable> for TableConfig {
    fn from(table: SymbolTable) -> Self {
        Self {
            symbols: table.symbols,
            paytable: table.paytable,
        }
    }
}
