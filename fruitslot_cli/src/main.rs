mod store;

use anyhow::{bail, Context};
use chrono::Utc;
use clap::{Parser, Subcommand};
use fruitslot_core::{
    derive_hash_hex, FairRng, Grid, OutcomeEngine, SessionConfig, SessionStats, SpinReport,
    SymbolId, SymbolTable, WinTier, DEFAULT_REELS, DEFAULT_ROWS,
};
use rand::rngs::StdRng;
use rand::{RngCore, SeedableRng};
use std::path::{Path, PathBuf};
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "fruitslot", about = "Play and audit the fruit slot outcome engine")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
    /// Session state file
    #[arg(long, env = "FRUITSLOT_STATE", default_value = "fruitslot.json")]
    state: PathBuf,
    /// JSON symbol table replacing the classic catalog
    #[arg(long, env = "FRUITSLOT_TABLE")]
    table: Option<PathBuf>,
    /// Secret server seed; enables provably-fair spins
    #[arg(long, env = "FRUITSLOT_SERVER_SEED")]
    server_seed: Option<String>,
    #[arg(long, default_value = "player")]
    client_seed: String,
}

#[derive(Subcommand)]
enum Commands {
    /// Spin the persisted session
    Spin {
        #[arg(default_value_t = 1)]
        count: u32,
    },
    /// Run a batch of spins on fresh stats and compare against theory
    Simulate {
        #[arg(long, default_value_t = 100_000)]
        spins: u64,
        #[arg(long, default_value_t = 1.0)]
        bet: f64,
        /// Export every spin to CSV
        #[arg(long)]
        csv: Option<PathBuf>,
    },
    /// Reproduce the grid a seeded spin produced, or check a claimed one
    Verify {
        nonce: u64,
        /// Claimed grid as JSON rows, e.g. '[["cherry","lemon",...],...]'
        #[arg(long)]
        grid: Option<String>,
        #[arg(long, default_value_t = 1.0)]
        bet: f64,
    },
    /// Print the pay table
    Paytable,
    /// Print session statistics
    Stats,
    /// Change the session bet (see `stats` for quick bets)
    SetBet { bet: f64 },
    AddCredits { amount: f64 },
    /// Restore starting credits and clear stats
    Reset,
}

fn load_engine(path: Option<&Path>) -> anyhow::Result<OutcomeEngine> {
    let table = match path {
        Some(path) => {
            let raw = std::fs::read_to_string(path)
                .with_context(|| format!("reading symbol table {}", path.display()))?;
            SymbolTable::from_json(&raw)?
        }
        None => SymbolTable::classic(),
    };
    Ok(OutcomeEngine::new(table))
}

fn spin_rng(server_seed: Option<&str>, client_seed: &str, nonce: u64) -> Box<dyn RngCore> {
    match server_seed {
        Some(seed) => Box::new(FairRng::new(seed, client_seed, nonce)),
        None => Box::new(StdRng::from_entropy()),
    }
}

fn print_report(report: &SpinReport) {
    println!("{}", report.outcome.grid);
    for line in &report.outcome.result.win_lines {
        println!(
            "  row {} reels {}-{}: {} x{} ({}x) pays {}",
            line.row,
            line.start_reel,
            line.end_reel,
            line.symbol.display_name(),
            line.match_count,
            line.multiplier,
            line.amount
        );
    }
    let banner = match report.tier {
        WinTier::None => "no win",
        WinTier::Small => "win",
        WinTier::Big => "BIG WIN",
        WinTier::Jackpot => "JACKPOT",
    };
    println!(
        "{banner}: {} | credits {}",
        report.outcome.result.total_win, report.credits_after
    );
}

fn print_stats(stats: &SessionStats) {
    println!(
        "spins={} wins={} total_bet={} total_won={} rtp={:.2}% hit_rate={:.1}%",
        stats.spins,
        stats.wins,
        stats.total_bet,
        stats.total_won,
        stats.rtp(),
        stats.hit_rate()
    );
}

fn simulate(
    engine: &OutcomeEngine,
    spins: u64,
    bet: f64,
    csv: Option<&Path>,
) -> anyhow::Result<()> {
    let mut wtr = match csv {
        Some(path) => {
            let mut wtr = csv::Writer::from_path(path)?;
            wtr.write_record(["spin", "grid", "total_win", "lines"])?;
            Some(wtr)
        }
        None => None,
    };
    let mut rng = StdRng::from_entropy();
    let mut stats = SessionStats::default();
    for n in 1..=spins {
        let outcome = engine.spin(&mut rng, bet)?;
        stats.record_spin(outcome.wager, &outcome.result);
        if let Some(wtr) = wtr.as_mut() {
            wtr.write_record(&[
                n.to_string(),
                serde_json::to_string(outcome.grid.rows())?,
                outcome.result.total_win.to_string(),
                outcome.result.win_lines.len().to_string(),
            ])?;
        }
    }
    if let Some(mut wtr) = wtr {
        wtr.flush()?;
    }
    let theoretical = engine.theoretical_rtp(DEFAULT_REELS, DEFAULT_ROWS)?;
    print_stats(&stats);
    println!("theoretical rtp={theoretical:.2}%");
    Ok(())
}

/// Checks a JSON row list against the grid the seeds produce for `nonce`.
fn verify_claim(
    engine: &OutcomeEngine,
    server_seed: &str,
    client_seed: &str,
    nonce: u64,
    raw: &str,
) -> anyhow::Result<()> {
    let rows: Vec<Vec<SymbolId>> = serde_json::from_str(raw).context("parsing --grid")?;
    let claimed = Grid::from_rows(rows);
    claimed.validate()?;
    if !engine.verify_grid(server_seed, client_seed, nonce, &claimed) {
        bail!("grid does not match nonce {nonce}");
    }
    Ok(())
}

fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .with_writer(std::io::stderr)
        .init();
    let cli = Cli::parse();
    let engine = load_engine(cli.table.as_deref())?;
    let server_seed = cli.server_seed.as_deref();

    match cli.command {
        Commands::Spin { count } => {
            let (mut session, mut nonce) = store::load(&cli.state, SessionConfig::default())?;
            if let Some(seed) = server_seed {
                println!("server_seed_hash={}", derive_hash_hex(seed.as_bytes()));
            }
            for _ in 0..count {
                if !session.can_spin() {
                    warn!(
                        credits = session.credits(),
                        bet = session.current_bet(),
                        "out of credits"
                    );
                    break;
                }
                nonce += 1;
                let mut rng = spin_rng(server_seed, &cli.client_seed, nonce);
                let report = session.spin(&engine, &mut *rng)?;
                if server_seed.is_some() {
                    println!("nonce={nonce}");
                }
                print_report(&report);
            }
            store::save(&cli.state, &session, nonce)?;
        }
        Commands::Simulate { spins, bet, csv } => {
            info!(spins, bet, started = %Utc::now().to_rfc3339(), "simulation");
            simulate(&engine, spins, bet, csv.as_deref())?;
            if let Some(path) = csv {
                println!("Exported {} rows to {}", spins, path.display());
            }
        }
        Commands::Verify { nonce, grid, bet } => {
            let Some(seed) = server_seed else {
                bail!("verify needs --server-seed (or FRUITSLOT_SERVER_SEED)");
            };
            println!("server_seed_hash={}", derive_hash_hex(seed.as_bytes()));
            match grid {
                Some(raw) => {
                    verify_claim(&engine, seed, &cli.client_seed, nonce, &raw)?;
                    println!("verified nonce={nonce}");
                }
                None => {
                    let outcome = engine.spin_with_seeds(seed, &cli.client_seed, nonce, bet)?;
                    println!("{}", outcome.grid);
                    println!("total_win={} at bet {bet}", outcome.result.total_win);
                }
            }
        }
        Commands::Paytable => {
            println!("{:<12} {:>6} {:>6} {:>6} {:>7}", "symbol", "3x", "4x", "5x", "chance");
            for row in engine.table().paytable_rows()? {
                println!(
                    "{:<12} {:>6} {:>6} {:>6} {:>6.1}%",
                    row.name,
                    row.three,
                    row.four,
                    row.five,
                    row.probability * 100.0
                );
            }
        }
        Commands::Stats => {
            let (session, _) = store::load(&cli.state, SessionConfig::default())?;
            println!(
                "credits={} bet={} last_win={} quick_bets={:?}",
                session.credits(),
                session.current_bet(),
                session.last_win(),
                session.quick_bets()
            );
            print_stats(session.stats());
        }
        Commands::SetBet { bet } => {
            let (mut session, nonce) = store::load(&cli.state, SessionConfig::default())?;
            session.set_bet(bet)?;
            store::save(&cli.state, &session, nonce)?;
            println!("bet={}", session.current_bet());
        }
        Commands::AddCredits { amount } => {
            let (mut session, nonce) = store::load(&cli.state, SessionConfig::default())?;
            let credits = session.add_credits(amount)?;
            store::save(&cli.state, &session, nonce)?;
            println!("credits={credits}");
        }
        Commands::Reset => {
            let (mut session, nonce) = store::load(&cli.state, SessionConfig::default())?;
            session.reset();
            store::save(&cli.state, &session, nonce)?;
            println!("session reset");
        }
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn claimed_grid_must_match_the_seeds() {
        let engine = OutcomeEngine::default();
        let outcome = engine.spin_with_seeds("server", "player", 4, 1.0).unwrap();
        let raw = serde_json::to_string(outcome.grid.rows()).unwrap();
        assert!(verify_claim(&engine, "server", "player", 4, &raw).is_ok());
        assert!(verify_claim(&engine, "server", "player", 5, &raw).is_err());
        assert!(verify_claim(&engine, "other", "player", 4, &raw).is_err());
        assert!(verify_claim(&engine, "server", "player", 4, "[[\"cherry\"]]").is_err());
        assert!(verify_claim(&engine, "server", "player", 4, "not json").is_err());
    }
}
