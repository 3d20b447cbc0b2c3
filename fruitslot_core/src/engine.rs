use crate::{
    error::{EngineError, EngineResult},
    grid::{Grid, DEFAULT_REELS, DEFAULT_ROWS, MIN_REELS},
    rng::FairRng,
    symbols::{SymbolId, SymbolTable},
    paytable::MatchKind,
    win::{WinLine, WinResult},
};
use rand::Rng;
use std::sync::Arc;
use tracing::debug;

/// Grid generation and win evaluation over a fixed [`SymbolTable`].
///
/// The engine holds no session state. Evaluating the same grid twice gives
/// the same result, and statistics only change through
/// [`crate::stats::SessionStats::record_spin`].
#[derive(Debug, Clone)]
pub struct OutcomeEngine {
    table: Arc<SymbolTable>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct SpinOutcome {
    pub grid: Grid,
    pub wager: f64,
    pub result: WinResult,
}

impl OutcomeEngine {
    pub fn new(table: SymbolTable) -> Self {
        Self {
            table: Arc::new(table),
        }
    }

    pub fn with_shared_table(table: Arc<SymbolTable>) -> Self {
        Self { table }
    }

    pub fn table(&self) -> &SymbolTable {
        &self.table
    }

    /// Fills every cell with an independent weighted draw, reel by reel.
    pub fn generate_grid<R: Rng + ?Sized>(
        &self,
        rng: &mut R,
        reel_count: usize,
        row_count: usize,
    ) -> Grid {
        let mut rows = vec![Vec::with_capacity(reel_count); row_count];
        for _reel in 0..reel_count {
            for row in rows.iter_mut() {
                row.push(self.table.weighted_pick(rng));
            }
        }
        Grid::from_rows(rows)
    }

    /// Scores `grid` for `wager`. Pure: no RNG, no statistics.
    ///
    /// Each row is scanned left to right; a run of three or more identical
    /// symbols pays once at its full length and the scan resumes after it.
    pub fn evaluate(&self, grid: &Grid, wager: f64) -> EngineResult<WinResult> {
        if !wager.is_finite() || wager <= 0.0 {
            return Err(EngineError::InvalidWager(wager));
        }
        grid.validate()?;
        if let Some(unknown) = grid
            .rows()
            .iter()
            .flatten()
            .find(|&&symbol| !self.table.contains(symbol))
        {
            return Err(EngineError::UnknownSymbol(*unknown));
        }

        let mut win_lines = Vec::new();
        for (row, symbols) in grid.rows().iter().enumerate() {
            self.scan_row(row, symbols, wager, &mut win_lines)?;
        }
        let total_win = win_lines.iter().map(|l| l.amount).sum();
        Ok(WinResult {
            total_win,
            win_lines,
        })
    }

    fn scan_row(
        &self,
        row: usize,
        symbols: &[SymbolId],
        wager: f64,
        out: &mut Vec<WinLine>,
    ) -> EngineResult<()> {
        let mut start = 0;
        while start + MIN_REELS <= symbols.len() {
            let symbol = symbols[start];
            let run = symbols[start..]
                .iter()
                .take_while(|&&s| s == symbol)
                .count();
            if run < MIN_REELS {
                start += 1;
                continue;
            }
            let multiplier = self.line_multiplier(symbol, run)?;
            let line = WinLine {
                row,
                start_reel: start,
                end_reel: start + run - 1,
                symbol,
                match_count: run,
                multiplier,
                amount: wager * multiplier,
            };
            debug!(
                row,
                start_reel = line.start_reel,
                symbol = %symbol,
                match_count = run,
                amount = line.amount,
                "win line"
            );
            out.push(line);
            start += run;
        }
        Ok(())
    }

    /// Runs longer than five pay at the three-of-a-kind rate.
    fn line_multiplier(&self, symbol: SymbolId, run: usize) -> EngineResult<f64> {
        let count = if run > MatchKind::FiveOfAKind.count() {
            MatchKind::ThreeOfAKind.count()
        } else {
            run
        };
        self.table.payout_multiplier(symbol, count)
    }

    /// Draws a standard 5x3 grid and scores it. Statistics are left to the caller.
    pub fn spin<R: Rng + ?Sized>(&self, rng: &mut R, wager: f64) -> EngineResult<SpinOutcome> {
        let grid = self.generate_grid(rng, DEFAULT_REELS, DEFAULT_ROWS);
        let result = self.evaluate(&grid, wager)?;
        Ok(SpinOutcome {
            grid,
            wager,
            result,
        })
    }

    /// Convenience: perform a spin creating the RNG from seeds.
    pub fn spin_with_seeds(
        &self,
        server_seed: &str,
        client_seed: &str,
        nonce: u64,
        wager: f64,
    ) -> EngineResult<SpinOutcome> {
        let mut rng = FairRng::new(server_seed, client_seed, nonce);
        self.spin(&mut rng, wager)
    }

    /// Verify that a given grid matches what the seeds would produce.
    pub fn verify_grid(
        &self,
        server_seed: &str,
        client_seed: &str,
        nonce: u64,
        expected: &Grid,
    ) -> bool {
        let mut rng = FairRng::new(server_seed, client_seed, nonce);
        let actual = self.generate_grid(&mut rng, expected.reel_count(), expected.row_count());
        &actual == expected
    }

    /// Expected return, in percent of the wager, for i.i.d. weighted draws.
    ///
    /// Every maximal run of three or more pays exactly once, so the expectation
    /// per row is the sum over (symbol, start, length) of the probability that
    /// the run is maximal there, times its multiplier.
    pub fn theoretical_rtp(&self, reel_count: usize, row_count: usize) -> EngineResult<f64> {
        if reel_count < MIN_REELS {
            return Err(EngineError::MalformedGrid(format!(
                "{reel_count} reels, need at least {MIN_REELS}"
            )));
        }
        let mut per_row = 0.0;
        for spec in self.table.symbols() {
            let p = self.table.probability(spec.id)?;
            for start in 0..=reel_count - MIN_REELS {
                for run in MIN_REELS..=reel_count - start {
                    let left = if start > 0 { 1.0 - p } else { 1.0 };
                    let right = if start + run < reel_count { 1.0 - p } else { 1.0 };
                    let multiplier = self.line_multiplier(spec.id, run)?;
                    per_row += p.powi(run as i32) * left * right * multiplier;
                }
            }
        }
        Ok(per_row * row_count as f64 * 100.0)
    }
}

impl Default for OutcomeEngine {
    fn default() -> Self {
        Self::new(SymbolTable::classic())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::paytable::Paytable;
    use crate::session::{SessionConfig, SlotSession};
    use crate::symbols::SymbolId::*;
    use crate::symbols::SymbolSpec;
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    fn board(first_row: [SymbolId; 5]) -> Grid {
        Grid::from_rows(vec![
            first_row.to_vec(),
            vec![Cherry, Lemon, Orange, Plum, Bell],
            vec![Bell, Plum, Orange, Lemon, Cherry],
        ])
    }

    #[test]
    fn three_cherries_then_noise() {
        let engine = OutcomeEngine::default();
        let result = engine
            .evaluate(&board([Cherry, Cherry, Cherry, Lemon, Orange]), 10.0)
            .unwrap();
        assert_eq!(
            result.win_lines,
            vec![WinLine {
                row: 0,
                start_reel: 0,
                end_reel: 2,
                symbol: Cherry,
                match_count: 3,
                multiplier: 3.0,
                amount: 30.0,
            }]
        );
        assert_eq!(result.total_win, 30.0);
    }

    #[test]
    fn full_row_pays_once() {
        let engine = OutcomeEngine::default();
        let result = engine.evaluate(&board([Seven; 5]), 1.0).unwrap();
        assert_eq!(result.win_lines.len(), 1);
        assert_eq!(result.win_lines[0].match_count, 5);
        assert_eq!(result.win_lines[0].multiplier, 100.0);
        assert_eq!(result.total_win, 100.0);
    }

    #[test]
    fn pair_then_triple_pays_only_triple() {
        let engine = OutcomeEngine::default();
        let result = engine
            .evaluate(&board([Cherry, Cherry, Lemon, Lemon, Lemon]), 5.0)
            .unwrap();
        assert_eq!(result.win_lines.len(), 1);
        let line = &result.win_lines[0];
        assert_eq!((line.symbol, line.start_reel, line.end_reel), (Lemon, 2, 4));
        assert_eq!(result.total_win, 20.0);
    }

    #[test]
    fn four_run_is_not_split() {
        let engine = OutcomeEngine::default();
        let result = engine
            .evaluate(&board([Plum, Bell, Bell, Bell, Bell]), 1.0)
            .unwrap();
        assert_eq!(result.win_lines.len(), 1);
        assert_eq!(result.win_lines[0].start_reel, 1);
        assert_eq!(result.win_lines[0].match_count, 4);
        assert_eq!(result.total_win, 30.0);
    }

    #[test]
    fn two_runs_in_one_row() {
        let engine = OutcomeEngine::default();
        let grid = Grid::from_rows(vec![
            vec![Cherry, Cherry, Cherry, Plum, Lemon, Lemon, Lemon],
            vec![Bell, Seven, Bell, Seven, Bell, Seven, Bell],
        ]);
        let result = engine.evaluate(&grid, 1.0).unwrap();
        assert_eq!(result.win_lines.len(), 2);
        assert_eq!(result.win_lines[0].symbol, Cherry);
        assert_eq!(result.win_lines[1].symbol, Lemon);
        assert_eq!(result.win_lines[1].start_reel, 4);
        assert_eq!(result.total_win, 7.0);
    }

    #[test]
    fn rows_pay_independently() {
        let engine = OutcomeEngine::default();
        let grid = Grid::from_rows(vec![vec![Orange; 5], vec![Orange; 5], vec![Orange; 5]]);
        let result = engine.evaluate(&grid, 1.0).unwrap();
        assert_eq!(result.win_lines.len(), 3);
        assert_eq!(
            result.win_lines.iter().map(|l| l.row).collect::<Vec<_>>(),
            vec![0, 1, 2]
        );
        assert_eq!(result.total_win, 90.0);
    }

    #[test]
    fn columns_and_diagonals_do_not_pay() {
        let engine = OutcomeEngine::default();
        let grid = Grid::from_rows(vec![
            vec![Seven, Lemon, Plum, Cherry, Bell],
            vec![Seven, Seven, Orange, Plum, Lemon],
            vec![Seven, Orange, Seven, Bell, Cherry],
        ]);
        let result = engine.evaluate(&grid, 1.0).unwrap();
        assert!(result.win_lines.is_empty());
        assert!(!result.is_win());
    }

    #[test]
    fn rejects_bad_wager_before_anything_else() {
        let engine = OutcomeEngine::default();
        let grid = board([Seven; 5]);
        assert_eq!(engine.evaluate(&grid, 0.0), Err(EngineError::InvalidWager(0.0)));
        assert_eq!(engine.evaluate(&grid, -3.0), Err(EngineError::InvalidWager(-3.0)));
        assert!(matches!(
            engine.evaluate(&grid, f64::NAN),
            Err(EngineError::InvalidWager(_))
        ));
    }

    #[test]
    fn rejects_malformed_grids() {
        let engine = OutcomeEngine::default();
        let ragged = Grid::from_rows(vec![vec![Seven; 5], vec![Seven; 4], vec![Seven; 5]]);
        assert!(matches!(
            engine.evaluate(&ragged, 1.0),
            Err(EngineError::MalformedGrid(_))
        ));
        let narrow = Grid::from_rows(vec![vec![Seven, Seven]; 3]);
        assert!(matches!(
            engine.evaluate(&narrow, 1.0),
            Err(EngineError::MalformedGrid(_))
        ));
    }

    #[test]
    fn long_runs_pay_the_three_rate() {
        let engine = OutcomeEngine::default();
        let grid = Grid::from_rows(vec![vec![Lemon; 6], vec![Seven; 7]]);
        let result = engine.evaluate(&grid, 2.0).unwrap();
        let lines: Vec<_> = result
            .win_lines
            .iter()
            .map(|l| (l.match_count, l.multiplier))
            .collect();
        assert_eq!(lines, vec![(6, 4.0), (7, 25.0)]);
        assert_eq!(result.total_win, 58.0);
    }

    #[test]
    fn wide_sessions_never_fail_on_long_runs() {
        let engine = OutcomeEngine::default();
        let config = SessionConfig {
            reels: 7,
            starting_credits: 1e9,
            ..SessionConfig::default()
        };
        let mut session = SlotSession::new(config);
        let mut rng = StdRng::seed_from_u64(1);
        for _ in 0..5_000 {
            session.spin(&engine, &mut rng).unwrap();
        }
        assert_eq!(session.stats().spins, 5_000);
    }

    #[test]
    fn theoretical_rtp_counts_long_runs() {
        let engine = OutcomeEngine::default();
        let five = engine.theoretical_rtp(5, 1).unwrap();
        let seven = engine.theoretical_rtp(7, 1).unwrap();
        assert!(seven > five);
    }

    #[test]
    fn grid_symbol_missing_from_catalog() {
        let mut paytable = Paytable::classic();
        paytable.entries.retain(|e| e.symbol != Seven);
        let specs = SymbolId::ALL
            .into_iter()
            .filter(|&id| id != Seven)
            .map(|id| SymbolSpec { id, weight: 1 })
            .collect();
        let engine = OutcomeEngine::new(SymbolTable::new(specs, paytable).unwrap());
        let grid = board([Cherry, Lemon, Seven, Plum, Bell]);
        assert_eq!(
            engine.evaluate(&grid, 1.0),
            Err(EngineError::UnknownSymbol(Seven))
        );
        // the unknown cell is rejected even when the rest of the row would pay
        let grid = board([Cherry, Cherry, Cherry, Cherry, Seven]);
        assert_eq!(
            engine.evaluate(&grid, 1.0),
            Err(EngineError::UnknownSymbol(Seven))
        );
    }

    #[test]
    fn generated_grid_has_requested_shape() {
        let engine = OutcomeEngine::default();
        let mut rng = StdRng::seed_from_u64(9);
        let grid = engine.generate_grid(&mut rng, 5, 3);
        assert_eq!((grid.reel_count(), grid.row_count()), (5, 3));
        assert!(grid.validate().is_ok());
    }

    #[test]
    fn seeded_spins_verify() {
        let engine = OutcomeEngine::default();
        let out = engine.spin_with_seeds("server", "client", 3, 1.0).unwrap();
        assert!(engine.verify_grid("server", "client", 3, &out.grid));

        let mut rows = out.grid.rows().to_vec();
        rows[0][0] = if rows[0][0] == Seven { Cherry } else { Seven };
        assert!(!engine.verify_grid("server", "client", 3, &Grid::from_rows(rows)));
    }

    #[test]
    fn theoretical_rtp_of_classic_table() {
        let engine = OutcomeEngine::default();
        let rtp = engine.theoretical_rtp(5, 3).unwrap();
        assert!((rtp - 185.2611).abs() < 0.01, "rtp = {rtp}");
    }
}
