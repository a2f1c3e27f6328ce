//! Runtime configuration for hosts embedding the engine.

use serde::{Deserialize, Serialize};
use std::path::PathBuf;

const APP_NAME: &str = "odessen";

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AppConfig {
    /// Directory scanned for `combat_*.txt` files.
    pub log_directory: String,
}

impl Default for AppConfig {
    fn default() -> Self {
        AppConfig {
            log_directory: default_log_directory(),
        }
    }
}

impl AppConfig {
    /// Load from the platform config location, creating the file with
    /// defaults on first run.
    pub fn load() -> crate::Result<AppConfig> {
        Ok(confy::load(APP_NAME, None)?)
    }

    pub fn store(&self) -> crate::Result<()> {
        Ok(confy::store(APP_NAME, None, self)?)
    }
}

/// The game writes combat logs under the user's documents folder.
fn default_log_directory() -> String {
    dirs::document_dir()
        .map(|documents| {
            documents
                .join("Star Wars - The Old Republic")
                .join("CombatLogs")
        })
        .unwrap_or_else(|| PathBuf::from("."))
        .to_string_lossy()
        .into_owned()
}
