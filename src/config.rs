//! Runtime settings resolved from CLI flags, environment, and defaults.

use std::env;
use std::path::{Path, PathBuf};

use tracing::warn;

use crate::commit::DEFAULT_SAMPLE_LIMIT;

/// Environment variable overriding the profile store location.
pub const STORE_ENV_VAR: &str = "EASYGIT_STORE";

/// Environment variable overriding the content sample size.
pub const SAMPLE_LIMIT_ENV_VAR: &str = "EASYGIT_SAMPLE_LIMIT";

/// Settings shared by every command.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Settings {
    pub store_path: PathBuf,
    pub sample_limit: usize,
}

impl Settings {
    /// Resolve settings. An explicit `store` flag wins over the environment.
    pub fn resolve(store: Option<&Path>) -> Self {
        Self {
            store_path: store
                .map(Path::to_path_buf)
                .unwrap_or_else(default_store_path),
            sample_limit: sample_limit(),
        }
    }
}

/// Profile store path: `EASYGIT_STORE`, else `<config dir>/easygit/profile.json`.
pub fn default_store_path() -> PathBuf {
    match env::var_os(STORE_ENV_VAR) {
        Some(v) if !v.is_empty() => PathBuf::from(v),
        _ => dirs::config_dir()
            .unwrap_or_else(|| PathBuf::from("."))
            .join("easygit")
            .join("profile.json"),
    }
}

/// Content sample size from `EASYGIT_SAMPLE_LIMIT`, else 1000 characters.
///
/// Logs a warning if the variable is set but is not a positive integer.
fn sample_limit() -> usize {
    match env::var(SAMPLE_LIMIT_ENV_VAR) {
        Ok(v) if !v.is_empty() => match v.parse::<usize>() {
            Ok(n) if n > 0 => n,
            _ => {
                warn!(
                    "Invalid {} value '{}', using default {}",
                    SAMPLE_LIMIT_ENV_VAR, v, DEFAULT_SAMPLE_LIMIT
                );
                DEFAULT_SAMPLE_LIMIT
            }
        },
        _ => DEFAULT_SAMPLE_LIMIT,
    }
}
