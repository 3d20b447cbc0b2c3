use fruitslot_core::{
    FairRng, Grid, OutcomeEngine, SessionStats, SlotSession, StatsLedger, SymbolTable,
    DEFAULT_REELS, DEFAULT_ROWS,
};
use rand::rngs::StdRng;
use rand::SeedableRng;
use std::sync::Arc;
use std::thread;

#[test]
fn rng_repeatable() {
    let engine = OutcomeEngine::default();
    let a = engine.generate_grid(&mut FairRng::new("s", "c", 42), 5, 3);
    let b = engine.generate_grid(&mut FairRng::new("s", "c", 42), 5, 3);
    assert_eq!(a, b);
}

#[test]
fn payout_equals_wager_times_multipliers() {
    let engine = OutcomeEngine::default();
    let mut rng = StdRng::seed_from_u64(7);
    for wager in [1.0, 2.0, 5.0, 25.0] {
        for _ in 0..2_000 {
            let grid = engine.generate_grid(&mut rng, DEFAULT_REELS, DEFAULT_ROWS);
            let result = engine.evaluate(&grid, wager).unwrap();
            let multipliers: f64 = result.win_lines.iter().map(|l| l.multiplier).sum();
            assert_eq!(result.total_win, wager * multipliers);
            assert!(result.total_win >= 0.0);
        }
    }
}

#[test]
fn win_lines_never_overlap_within_a_row() {
    let engine = OutcomeEngine::default();
    let mut rng = StdRng::seed_from_u64(11);
    for _ in 0..5_000 {
        let grid = engine.generate_grid(&mut rng, 5, 3);
        let result = engine.evaluate(&grid, 1.0).unwrap();
        for (i, a) in result.win_lines.iter().enumerate() {
            assert!((3..=5).contains(&a.match_count));
            for symbol in &grid.row(a.row).unwrap()[a.start_reel..=a.end_reel] {
                assert_eq!(*symbol, a.symbol);
            }
            for b in &result.win_lines[i + 1..] {
                assert!(!a.overlaps(b), "{a:?} overlaps {b:?}");
                // discovery order: row-major, then left to right
                assert!((a.row, a.start_reel) < (b.row, b.start_reel));
            }
        }
    }
}

#[test]
fn evaluation_is_idempotent() {
    let engine = OutcomeEngine::default();
    let mut rng = StdRng::seed_from_u64(13);
    for _ in 0..500 {
        let grid = engine.generate_grid(&mut rng, 5, 3);
        let first = engine.evaluate(&grid, 3.0).unwrap();
        let second = engine.evaluate(&grid, 3.0).unwrap();
        assert_eq!(first, second);
        assert_eq!(first.total_win.to_bits(), second.total_win.to_bits());
    }
}

#[test]
fn mixed_rows_on_a_full_board() {
    use fruitslot_core::SymbolId::*;
    let engine = OutcomeEngine::default();
    let grid = Grid::from_reels(&[
        vec![Cherry, Seven, Cherry],
        vec![Cherry, Seven, Cherry],
        vec![Cherry, Seven, Lemon],
        vec![Lemon, Seven, Lemon],
        vec![Orange, Seven, Lemon],
    ])
    .unwrap();
    let result = engine.evaluate(&grid, 2.0).unwrap();
    let summary: Vec<_> = result
        .win_lines
        .iter()
        .map(|l| (l.row, l.start_reel, l.end_reel, l.symbol, l.match_count))
        .collect();
    assert_eq!(
        summary,
        vec![
            (0, 0, 2, Cherry, 3),
            (1, 0, 4, Seven, 5),
            (2, 2, 4, Lemon, 3),
        ]
    );
    // 2 x (3 + 100 + 4)
    assert_eq!(result.total_win, 214.0);
}

#[test]
fn rtp_simulation_tracks_theory() {
    let engine = OutcomeEngine::default();
    let theoretical = engine.theoretical_rtp(DEFAULT_REELS, DEFAULT_ROWS).unwrap();
    let mut stats = SessionStats::default();
    let mut rng = StdRng::seed_from_u64(2024);
    for _ in 0..50_000 {
        let outcome = engine.spin(&mut rng, 1.0).unwrap();
        stats.record_spin(outcome.wager, &outcome.result);
    }
    assert_eq!(stats.spins, 50_000);
    // per-spin sd is about 4.2x the wager, so 15 points is roughly 8 sigma
    assert!(
        (stats.rtp() - theoretical).abs() < 15.0,
        "simulated {:.2} vs theoretical {:.2}",
        stats.rtp(),
        theoretical
    );
}

#[test]
fn shared_table_across_threads() {
    let table = Arc::new(SymbolTable::classic());
    let ledger = Arc::new(StatsLedger::default());
    let handles: Vec<_> = (0..4u64)
        .map(|seed| {
            let engine = OutcomeEngine::with_shared_table(Arc::clone(&table));
            let ledger = Arc::clone(&ledger);
            thread::spawn(move || {
                let mut rng = StdRng::seed_from_u64(seed);
                for _ in 0..250 {
                    let outcome = engine.spin(&mut rng, 2.0).unwrap();
                    ledger.record(outcome.wager, &outcome.result);
                }
            })
        })
        .collect();
    for h in handles {
        h.join().unwrap();
    }
    let stats = ledger.snapshot();
    assert_eq!(stats.spins, 1_000);
    assert_eq!(stats.total_bet, 2_000.0);
}

#[test]
fn session_conserves_credits() {
    let engine = OutcomeEngine::default();
    let mut session = SlotSession::default();
    session.set_bet(1.0).unwrap();
    let start = session.credits();
    let mut rng = StdRng::seed_from_u64(99);
    for _ in 0..200 {
        if !session.can_spin() {
            break;
        }
        session.spin(&engine, &mut rng).unwrap();
    }
    let stats = session.stats();
    assert_eq!(session.credits(), start - stats.total_bet + stats.total_won);
}
