use crate::symbols::SymbolId;

/// Precondition violations raised by the outcome engine.
///
/// None of these are transient: a correct caller never triggers them in
/// normal play, so they are surfaced loudly instead of being recovered.
#[derive(thiserror::Error, Debug, Clone, PartialEq)]
pub enum EngineError {
    #[error("symbol {0} is not in the catalog")]
    UnknownSymbol(SymbolId),
    #[error("no payout defined for a run of {0} (expected 3, 4 or 5)")]
    InvalidMatchCount(usize),
    #[error("wager must be a positive amount, got {0}")]
    InvalidWager(f64),
    #[error("malformed grid: {0}")]
    MalformedGrid(String),
    #[error("invalid symbol table: {0}")]
    InvalidTable(String),
}

pub type EngineResult<T> = Result<T, EngineError>;

/// Policy violations raised by [`crate::session::SlotSession`].
#[derive(thiserror::Error, Debug, Clone, PartialEq)]
pub enum SessionError {
    #[error("insufficient credits: balance {credits}, bet {bet}")]
    InsufficientCredits { credits: f64, bet: f64 },
    #[error("bet {bet} outside allowed range {min}..={max}")]
    BetOutOfRange { bet: f64, min: f64, max: f64 },
    #[error("amount must be positive, got {0}")]
    InvalidAmount(f64),
    #[error("corrupt session snapshot: {0}")]
    CorruptSnapshot(String),
    #[error(transparent)]
    Engine(#[from] EngineError),
}

pub type SessionResult<T> = Result<T, SessionError>;
