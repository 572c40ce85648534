//! Durable page-level progress state
//!
//! A crawl too large for one invocation is split into bounded chunks, and
//! this small JSON file is the only thing that survives between them. It is
//! human-readable and safe to delete: the next run starts over from page 1
//! and re-resolves the total page count.

use crate::error::{Error, Result};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;
use tracing::warn;

/// Cross-run crawl progress: the resume cursor, the cached page total and
/// the terminal completion flag.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProgressState {
    /// 1-based page the next run resumes from; advances monotonically
    #[serde(default = "default_current_page")]
    pub current_page: u32,

    /// Total listing pages, resolved once and cached permanently
    #[serde(default)]
    pub total_pages: Option<u32>,

    /// Set exactly once, when the cursor passes the page ceiling; terminal
    #[serde(default)]
    pub completed: bool,
}

impl Default for ProgressState {
    fn default() -> Self {
        Self {
            current_page: default_current_page(),
            total_pages: None,
            completed: false,
        }
    }
}

fn default_current_page() -> u32 {
    1
}

impl ProgressState {
    /// Load state from disk, falling back to defaults when the file is
    /// missing or unreadable. A corrupt state file restarts the crawl from
    /// page 1 rather than aborting the run.
    pub fn load(path: &Path) -> Self {
        let raw = match fs::read_to_string(path) {
            Ok(raw) => raw,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Self::default(),
            Err(e) => {
                warn!(path = %path.display(), error = %e, "failed to read state file, starting fresh");
                return Self::default();
            }
        };

        match serde_json::from_str(&raw) {
            Ok(state) => state,
            Err(e) => {
                warn!(path = %path.display(), error = %e, "state file is corrupt, starting fresh");
                Self::default()
            }
        }
    }

    /// Persist state as pretty-printed JSON.
    ///
    /// # Errors
    ///
    /// Returns [`Error::State`] when the file cannot be written.
    pub fn save(&self, path: &Path) -> Result<()> {
        let json = serde_json::to_string_pretty(self)?;
        fs::write(path, json).map_err(|e| {
            Error::State(format!("failed to write {}: {e}", path.display()))
        })
    }
}
