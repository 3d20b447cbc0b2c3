use anyhow::Context;
use chrono::{DateTime, Utc};
use fruitslot_core::{SessionConfig, SessionSnapshot, SlotSession};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;
use tracing::info;

/// On-disk session state.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StateFile {
    pub saved_at: Option<DateTime<Utc>>,
    /// Last nonce consumed by a seeded spin.
    #[serde(default)]
    pub nonce: u64,
    pub session: SessionSnapshot,
}

pub fn load(path: &Path, config: SessionConfig) -> anyhow::Result<(SlotSession, u64)> {
    if !path.exists() {
        info!(path = %path.display(), "no saved session, starting fresh");
        return Ok((SlotSession::new(config), 0));
    }
    let raw = fs::read_to_string(path)
        .with_context(|| format!("reading session state {}", path.display()))?;
    let state: StateFile = serde_json::from_str(&raw)
        .with_context(|| format!("parsing session state {}", path.display()))?;
    let session = SlotSession::from_snapshot(config, state.session)?;
    Ok((session, state.nonce))
}

pub fn save(path: &Path, session: &SlotSession, nonce: u64) -> anyhow::Result<()> {
    let state = StateFile {
        saved_at: Some(Utc::now()),
        nonce,
        session: session.snapshot(),
    };
    let json = serde_json::to_string_pretty(&state)?;
    fs::write(path, json).with_context(|| format!("writing session state {}", path.display()))?;
    Ok(())
}
