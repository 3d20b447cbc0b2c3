use crate::error::{EngineError, EngineResult};
use crate::symbols::SymbolId;
use serde::{Deserialize, Serialize};

/// Length class of a horizontal run.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "camelCase")]
pub enum MatchKind {
    ThreeOfAKind,
    FourOfAKind,
    FiveOfAKind,
}

impl MatchKind {
    pub const ALL: [MatchKind; 3] = [
        MatchKind::ThreeOfAKind,
        MatchKind::FourOfAKind,
        MatchKind::FiveOfAKind,
    ];

    pub fn from_count(count: usize) -> EngineResult<Self> {
        match count {
            3 => Ok(MatchKind::ThreeOfAKind),
            4 => Ok(MatchKind::FourOfAKind),
            5 => Ok(MatchKind::FiveOfAKind),
            other => Err(EngineError::InvalidMatchCount(other)),
        }
    }

    pub fn count(self) -> usize {
        match self {
            MatchKind::ThreeOfAKind => 3,
            MatchKind::FourOfAKind => 4,
            MatchKind::FiveOfAKind => 5,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct PaytableEntry {
    pub symbol: SymbolId,
    pub count: u8,
    pub payout_multiplier: f64,
}

/// Multipliers applied to the wager, one entry per (symbol, run length).
///
/// `any_pair` and `wild_combo` are carried for configuration compatibility
/// only; evaluation never reads them.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct Paytable {
    pub entries: Vec<PaytableEntry>,
    #[serde(default)]
    pub any_pair: f64,
    #[serde(default)]
    pub wild_combo: f64,
}

impl Paytable {
    pub fn classic() -> Self {
        let rows: [(SymbolId, [f64; 3]); 6] = [
            (SymbolId::Seven, [25.0, 50.0, 100.0]),
            (SymbolId::Bell, [20.0, 30.0, 60.0]),
            (SymbolId::Plum, [10.0, 20.0, 40.0]),
            (SymbolId::Orange, [5.0, 15.0, 30.0]),
            (SymbolId::Lemon, [4.0, 10.0, 20.0]),
            (SymbolId::Cherry, [3.0, 5.0, 10.0]),
        ];
        let entries = rows
            .iter()
            .flat_map(|(symbol, pays)| {
                MatchKind::ALL
                    .into_iter()
                    .zip(pays.iter())
                    .map(move |(kind, &pay)| PaytableEntry {
                        symbol: *symbol,
                        count: kind.count() as u8,
                        payout_multiplier: pay,
                    })
            })
            .collect();
        Self {
            entries,
            any_pair: 2.0,
            wild_combo: 5.0,
        }
    }

    /// Multiplier for `symbol` landing `count` in a row.
    pub fn multiplier(&self, symbol: SymbolId, count: usize) -> EngineResult<f64> {
        let kind = MatchKind::from_count(count)?;
        self.entries
            .iter()
            .find(|e| e.symbol == symbol && e.count as usize == kind.count())
            .map(|e| e.payout_multiplier)
            .ok_or(EngineError::UnknownSymbol(symbol))
    }

    /// Checks that `catalog` and the entries describe exactly the same symbols,
    /// each with one non-negative multiplier per match kind.
    pub(crate) fn validate(&self, catalog: &[SymbolId]) -> EngineResult<()> {
        for entry in &self.entries {
            if !catalog.contains(&entry.symbol) {
                return Err(EngineError::InvalidTable(format!(
                    "paytable references {} which is not in the catalog",
                    entry.symbol
                )));
            }
            MatchKind::from_count(entry.count as usize).map_err(|_| {
                EngineError::InvalidTable(format!(
                    "paytable entry for {} has run length {}",
                    entry.symbol, entry.count
                ))
            })?;
            if !entry.payout_multiplier.is_finite() || entry.payout_multiplier < 0.0 {
                return Err(EngineError::InvalidTable(format!(
                    "multiplier for {} x{} must be a non-negative number",
                    entry.symbol, entry.count
                )));
            }
        }
        for &symbol in catalog {
            for kind in MatchKind::ALL {
                let matches = self
                    .entries
                    .iter()
                    .filter(|e| e.symbol == symbol && e.count as usize == kind.count())
                    .count();
                if matches != 1 {
                    return Err(EngineError::InvalidTable(format!(
                        "expected one x{} entry for {}, found {matches}",
                        kind.count(),
                        symbol
                    )));
                }
            }
        }
        Ok(())
    }
}

/// One line of a printable pay table.
#[derive(Debug, Clone, Serialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct PaytableRow {
    pub symbol: SymbolId,
    pub name: &'static str,
    pub three: f64,
    pub four: f64,
    pub five: f64,
    pub probability: f64,
}
