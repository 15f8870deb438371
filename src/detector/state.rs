//! Replay cursor persistence
//!
//! The cursor is the only state carried across invocations. A missing or
//! unreadable state file means "start over", never a fatal error. Saves go
//! through a sibling temp file and an atomic rename so an interrupted write
//! can never leave a half-written state file.

use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;

/// Persisted replay position over the eligible evaluation days
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReplayState {
    #[serde(default)]
    pub cursor: usize,
}

/// Load the replay state, resetting to cursor 0 when the file is missing or
/// cannot be parsed
pub fn load_state(file_path: impl AsRef<Path>) -> ReplayState {
    let file_path = file_path.as_ref();
    if !file_path.exists() {
        log::info!("No existing replay state at {}, starting at cursor 0", file_path.display());
        return ReplayState::default();
    }

    match fs::read_to_string(file_path) {
        Ok(json) => match serde_json::from_str(&json) {
            Ok(state) => state,
            Err(e) => {
                log::warn!("⚠️  Corrupt replay state ({}), resetting to cursor 0", e);
                ReplayState::default()
            }
        },
        Err(e) => {
            log::warn!("⚠️  Unreadable replay state ({}), resetting to cursor 0", e);
            ReplayState::default()
        }
    }
}

/// Persist the replay state atomically (temp file + rename)
pub fn save_state(
    state: &ReplayState,
    file_path: impl AsRef<Path>,
) -> Result<(), Box<dyn std::error::Error>> {
    let file_path = file_path.as_ref();
    let json = serde_json::to_string_pretty(state)?;

    let mut tmp_path = file_path.as_os_str().to_owned();
    tmp_path.push(".tmp");
    let tmp_path = Path::new(&tmp_path);

    fs::write(tmp_path, json)?;
    fs::rename(tmp_path, file_path)?;

    log::debug!("Saved replay cursor {} to {}", state.cursor, file_path.display());
    Ok(())
}
