use crate::win::WinResult;
use parking_lot::Mutex;
use serde::{Deserialize, Serialize};
use tracing::debug;

/// Running session counters.
///
/// Serialized with the field names a persisted snapshot uses
/// (`spins`, `wins`, `totalBet`, `totalWon`).
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SessionStats {
    pub spins: u64,
    pub wins: u64,
    pub total_bet: f64,
    pub total_won: f64,
}

impl SessionStats {
    /// The only mutation point. Call exactly once per completed spin:
    /// the counters cannot tell whether a spin was already recorded.
    pub fn record_spin(&mut self, wager: f64, result: &WinResult) {
        self.spins += 1;
        self.total_bet += wager;
        if result.total_win > 0.0 {
            self.wins += 1;
            self.total_won += result.total_win;
        }
        debug!(
            spins = self.spins,
            wager,
            won = result.total_win,
            "spin recorded"
        );
    }

    /// Return to player, percent. 0 before anything was bet.
    pub fn rtp(&self) -> f64 {
        if self.total_bet > 0.0 {
            (self.total_won / self.total_bet) * 100.0
        } else {
            0.0
        }
    }

    /// Share of spins that won anything, percent.
    pub fn hit_rate(&self) -> f64 {
        if self.spins > 0 {
            (self.wins as f64 / self.spins as f64) * 100.0
        } else {
            0.0
        }
    }

    /// Net credits the player is down (negative when ahead).
    pub fn net_loss(&self) -> f64 {
        self.total_bet - self.total_won
    }

    pub(crate) fn check(&self) -> Result<(), String> {
        for (name, value) in [("totalBet", self.total_bet), ("totalWon", self.total_won)] {
            if !value.is_finite() || value < 0.0 {
                return Err(format!("{name} must be a non-negative number, got {value}"));
            }
        }
        if self.wins > self.spins {
            return Err(format!("{} wins out of {} spins", self.wins, self.spins));
        }
        Ok(())
    }
}

/// Stats shared between threads; every update takes the lock.
#[derive(Debug, Default)]
pub struct StatsLedger {
    inner: Mutex<SessionStats>,
}

impl StatsLedger {
    pub fn new(initial: SessionStats) -> Self {
        Self {
            inner: Mutex::new(initial),
        }
    }

    pub fn record(&self, wager: f64, result: &WinResult) {
        self.inner.lock().record_spin(wager, result);
    }

    pub fn snapshot(&self) -> SessionStats {
        *self.inner.lock()
    }

    pub fn reset(&self) -> SessionStats {
        std::mem::take(&mut *self.inner.lock())
    }
}
