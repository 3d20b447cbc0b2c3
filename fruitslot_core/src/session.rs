//! Player session: credits and bet policy around the outcome engine.
//!
//! The engine neither checks balances nor bet limits. This module is the
//! orchestrating caller that does, and it is the place that calls
//! [`SessionStats::record_spin`] once per spin.

use crate::engine::{OutcomeEngine, SpinOutcome};
use crate::error::{SessionError, SessionResult};
use crate::grid::{DEFAULT_REELS, DEFAULT_ROWS};
use crate::stats::SessionStats;
use crate::win::WinTier;
use rand::Rng;
use serde::{Deserialize, Serialize};
use tracing::info;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct SessionConfig {
    pub starting_credits: f64,
    pub default_bet: f64,
    pub min_bet: f64,
    pub max_bet: f64,
    pub bet_options: Vec<f64>,
    pub reels: usize,
    pub rows: usize,
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            starting_credits: 1000.0,
            default_bet: 10.0,
            min_bet: 1.0,
            max_bet: 100.0,
            bet_options: vec![1.0, 2.0, 5.0, 10.0, 25.0],
            reels: DEFAULT_REELS,
            rows: DEFAULT_ROWS,
        }
    }
}

/// What an external store persists between runs.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SessionSnapshot {
    pub credits: f64,
    pub current_bet: f64,
    pub last_win: f64,
    pub stats: SessionStats,
}

#[derive(Debug, Clone, PartialEq)]
pub struct SpinReport {
    pub outcome: SpinOutcome,
    pub tier: WinTier,
    /// `[reel][row]` cells to highlight.
    pub winning_positions: Vec<Vec<bool>>,
    pub credits_after: f64,
}

#[derive(Debug, Clone)]
pub struct SlotSession {
    config: SessionConfig,
    credits: f64,
    current_bet: f64,
    last_win: f64,
    stats: SessionStats,
}

impl SlotSession {
    pub fn new(config: SessionConfig) -> Self {
        Self {
            credits: config.starting_credits,
            current_bet: config.default_bet,
            last_win: 0.0,
            stats: SessionStats::default(),
            config,
        }
    }

    pub fn from_snapshot(config: SessionConfig, snapshot: SessionSnapshot) -> SessionResult<Self> {
        for (name, value) in [
            ("credits", snapshot.credits),
            ("currentBet", snapshot.current_bet),
            ("lastWin", snapshot.last_win),
        ] {
            if !value.is_finite() || value < 0.0 {
                return Err(SessionError::CorruptSnapshot(format!(
                    "{name} must be a non-negative number, got {value}"
                )));
            }
        }
        snapshot.stats.check().map_err(SessionError::CorruptSnapshot)?;
        // a stored bet that no longer fits the limits falls back to the default
        let current_bet = if (config.min_bet..=config.max_bet).contains(&snapshot.current_bet) {
            snapshot.current_bet
        } else {
            config.default_bet
        };
        Ok(Self {
            config,
            credits: snapshot.credits,
            current_bet,
            last_win: snapshot.last_win,
            stats: snapshot.stats,
        })
    }

    pub fn snapshot(&self) -> SessionSnapshot {
        SessionSnapshot {
            credits: self.credits,
            current_bet: self.current_bet,
            last_win: self.last_win,
            stats: self.stats,
        }
    }

    pub fn config(&self) -> &SessionConfig {
        &self.config
    }

    pub fn credits(&self) -> f64 {
        self.credits
    }

    pub fn current_bet(&self) -> f64 {
        self.current_bet
    }

    pub fn last_win(&self) -> f64 {
        self.last_win
    }

    pub fn stats(&self) -> &SessionStats {
        &self.stats
    }

    /// Configured bet options other than the min and max limits.
    pub fn quick_bets(&self) -> Vec<f64> {
        self.config
            .bet_options
            .iter()
            .copied()
            .filter(|&bet| bet != self.config.min_bet && bet != self.config.max_bet)
            .collect()
    }

    pub fn can_spin(&self) -> bool {
        self.credits >= self.current_bet
    }

    /// One complete spin: draw, evaluate, settle credits, record stats.
    ///
    /// Nothing changes unless the whole spin succeeds.
    pub fn spin<R: Rng + ?Sized>(
        &mut self,
        engine: &OutcomeEngine,
        rng: &mut R,
    ) -> SessionResult<SpinReport> {
        if !self.can_spin() {
            return Err(SessionError::InsufficientCredits {
                credits: self.credits,
                bet: self.current_bet,
            });
        }
        let wager = self.current_bet;
        let grid = engine.generate_grid(rng, self.config.reels, self.config.rows);
        let result = engine.evaluate(&grid, wager)?;

        self.credits = self.credits - wager + result.total_win;
        self.last_win = result.total_win;
        self.stats.record_spin(wager, &result);

        let tier = result.tier(wager);
        let winning_positions = result.winning_positions(grid.reel_count(), grid.row_count());
        Ok(SpinReport {
            outcome: SpinOutcome {
                grid,
                wager,
                result,
            },
            tier,
            winning_positions,
            credits_after: self.credits,
        })
    }

    pub fn set_bet(&mut self, bet: f64) -> SessionResult<()> {
        if !(self.config.min_bet..=self.config.max_bet).contains(&bet) {
            return Err(SessionError::BetOutOfRange {
                bet,
                min: self.config.min_bet,
                max: self.config.max_bet,
            });
        }
        self.current_bet = bet;
        Ok(())
    }

    pub fn increment_bet(&mut self) -> f64 {
        self.current_bet = (self.current_bet + 1.0).min(self.config.max_bet);
        self.current_bet
    }

    pub fn decrement_bet(&mut self) -> f64 {
        self.current_bet = (self.current_bet - 1.0).max(self.config.min_bet);
        self.current_bet
    }

    pub fn add_credits(&mut self, amount: f64) -> SessionResult<f64> {
        if !amount.is_finite() || amount <= 0.0 {
            return Err(SessionError::InvalidAmount(amount));
        }
        self.credits += amount;
        info!(amount, credits = self.credits, "credits added");
        Ok(self.credits)
    }

    /// Back to starting credits, default bet and empty stats.
    pub fn reset(&mut self) {
        *self = Self::new(self.config.clone());
        info!("session reset");
    }
}

impl Default for SlotSession {
    fn default() -> Self {
        Self::new(SessionConfig::default())
    }
}
