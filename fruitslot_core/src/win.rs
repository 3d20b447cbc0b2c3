use crate::paytable::MatchKind;
use crate::symbols::SymbolId;
use serde::{Deserialize, Serialize};

/// Win-to-wager ratio at which a win is announced as big.
pub const BIG_WIN_RATIO: f64 = 30.0;
/// Win-to-wager ratio at which a win is announced as a jackpot.
pub const JACKPOT_RATIO: f64 = 50.0;

/// One horizontal run of identical symbols that pays.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WinLine {
    pub row: usize,
    pub start_reel: usize,
    /// Inclusive.
    pub end_reel: usize,
    pub symbol: SymbolId,
    pub match_count: usize,
    pub multiplier: f64,
    pub amount: f64,
}

impl WinLine {
    pub fn kind(&self) -> Option<MatchKind> {
        MatchKind::from_count(self.match_count).ok()
    }

    pub fn reels(&self) -> std::ops::RangeInclusive<usize> {
        self.start_reel..=self.end_reel
    }

    pub fn overlaps(&self, other: &WinLine) -> bool {
        self.row == other.row
            && self.start_reel <= other.end_reel
            && other.start_reel <= self.end_reel
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum WinTier {
    None,
    Small,
    Big,
    Jackpot,
}

/// Everything one evaluation found, in row-major, left-to-right order.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WinResult {
    pub total_win: f64,
    pub win_lines: Vec<WinLine>,
}

impl WinResult {
    pub fn is_win(&self) -> bool {
        self.total_win > 0.0
    }

    pub fn win_ratio(&self, wager: f64) -> f64 {
        if wager > 0.0 {
            self.total_win / wager
        } else {
            0.0
        }
    }

    pub fn tier(&self, wager: f64) -> WinTier {
        if !self.is_win() {
            return WinTier::None;
        }
        let ratio = self.win_ratio(wager);
        if ratio >= JACKPOT_RATIO {
            WinTier::Jackpot
        } else if ratio >= BIG_WIN_RATIO {
            WinTier::Big
        } else {
            WinTier::Small
        }
    }

    /// `[reel][row]` mask of the cells covered by any win line.
    pub fn winning_positions(&self, reel_count: usize, row_count: usize) -> Vec<Vec<bool>> {
        let mut mask = vec![vec![false; row_count]; reel_count];
        for line in &self.win_lines {
            for reel in line.reels() {
                if let Some(cell) = mask.get_mut(reel).and_then(|r| r.get_mut(line.row)) {
                    *cell = true;
                }
            }
        }
        mask
    }
}
