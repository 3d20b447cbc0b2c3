pub mod engine;
pub mod error;
pub mod grid;
pub mod paytable;
pub mod rng;
pub mod session;
pub mod stats;
pub mod symbols;
pub mod win;

pub use crate::engine::{OutcomeEngine, SpinOutcome};
pub use crate::error::{EngineError, EngineResult, SessionError, SessionResult};
pub use crate::grid::{Grid, DEFAULT_REELS, DEFAULT_ROWS, MIN_REELS};
pub use crate::paytable::{MatchKind, Paytable, PaytableEntry, PaytableRow};
pub use crate::rng::{derive_hash_hex, FairRng};
pub use crate::session::{SessionConfig, SessionSnapshot, SlotSession, SpinReport};
pub use crate::stats::{SessionStats, StatsLedger};
pub use crate::symbols::{SymbolId, SymbolSpec, SymbolTable, TableConfig};
pub use crate::win::{WinLine, WinResult, WinTier};
