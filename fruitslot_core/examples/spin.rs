use fruitslot_core::{FairRng, OutcomeEngine, SessionStats};

fn main() {
    // Example end-to-end spin
    let server_seed = "example-server-seed";
    let client_seed = "example-client-seed";
    let nonce = 1u64;
    let engine = OutcomeEngine::default();
    let mut rng = FairRng::new(server_seed, client_seed, nonce);
    let outcome = engine.spin(&mut rng, 10.0).expect("valid wager");

    let mut stats = SessionStats::default();
    stats.record_spin(outcome.wager, &outcome.result);

    println!("server_seed_hash={}", rng.server_seed_hash_hex());
    println!("{}", outcome.grid);
    for line in &outcome.result.win_lines {
        println!(
            "row {} reels {}-{}: {} x{} pays {}",
            line.row, line.start_reel, line.end_reel, line.symbol, line.match_count, line.amount
        );
    }
    println!("total_win={} rtp={:.1}%", outcome.result.total_win, stats.rtp());
}
