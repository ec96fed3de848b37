//! Development logging setup.
//!
//! Quiet by default; set `PORTICO_LOG` (e.g. `portico_core=debug`) to watch
//! the auth flow. Tokens and codes are never logged in full.

use tracing_subscriber::EnvFilter;

/// Environment variable controlling the log filter.
pub const LOG_ENV_VAR: &str = "PORTICO_LOG";

/// Installs the global fmt subscriber. Safe to call more than once.
pub fn init() {
    let filter = EnvFilter::try_from_env(LOG_ENV_VAR).unwrap_or_else(|_| EnvFilter::new("warn"));
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .try_init();
}

/// Returns a masked form of a token or code for log output.
pub fn mask(secret: &str) -> String {
    if secret.len() <= 8 {
        return "***".to_string();
    }
    match secret.get(..6) {
        Some(prefix) => format!("{prefix}..."),
        None => "***".to_string(),
    }
}
