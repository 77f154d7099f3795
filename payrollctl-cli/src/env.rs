//! `.env` loading
//!
//! Priority order (highest to lowest):
//! 1. Variables already set in the environment
//! 2. Current directory .env
//! 3. ~/.payrollctl/.env
//!
//! dotenvy never overwrites a variable that is already set, so loading in
//! this order gives the priorities above.

use std::path::PathBuf;

/// Directory holding config.toml and the global .env
pub fn config_dir() -> Option<PathBuf> {
    dirs::home_dir().map(|home| home.join(".payrollctl"))
}

/// Load .env files; returns where variables came from, for logging once
/// tracing is up.
pub fn load_dotenv() -> Vec<String> {
    let mut loaded_from = Vec::new();

    if let Ok(path) = dotenvy::dotenv() {
        loaded_from.push(path.display().to_string());
    }

    if let Some(env_file) = config_dir().map(|dir| dir.join(".env")) {
        if env_file.exists() {
            match dotenvy::from_path(&env_file) {
                Ok(()) => loaded_from.push(env_file.display().to_string()),
                Err(e) => loaded_from.push(format!("{} (failed: {})", env_file.display(), e)),
            }
        }
    }

    loaded_from
}
