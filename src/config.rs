//! Engine configuration and logging setup

use std::env;
use std::time::Duration;

use crate::sweeper::SWEEP_INTERVAL;

/// Default validity applied when the user picks no duration (30 minutes)
pub const DEFAULT_VALIDITY_MINUTES: i64 = 30;

/// Runtime settings for an embedding application
///
/// # Environment Variables
///
/// - `STORAGE_PATH` - Path of the redb database file (default: "snaplink.redb")
/// - `SWEEP_INTERVAL_SECS` - Sweeper cadence in seconds (default: 300)
/// - `DEFAULT_VALIDITY_MINUTES` - Validity applied when none requested (default: 30)
#[derive(Debug, Clone)]
pub struct Settings {
    pub storage_path: String,
    pub sweep_interval: Duration,
    pub default_validity_minutes: i64,
}

impl Default for Settings {
    fn default() -> Self {
        Settings {
            storage_path: "snaplink.redb".to_string(),
            sweep_interval: SWEEP_INTERVAL,
            default_validity_minutes: DEFAULT_VALIDITY_MINUTES,
        }
    }
}

impl Settings {
    /// Reads settings from the environment, falling back to defaults.
    ///
    /// Loads a `.env` file first when one exists. Unparseable values fall
    /// back silently rather than failing startup.
    pub fn from_env() -> Self {
        dotenvy::dotenv().ok();

        let defaults = Settings::default();

        let storage_path =
            env::var("STORAGE_PATH").unwrap_or(defaults.storage_path);

        let sweep_interval = env::var("SWEEP_INTERVAL_SECS")
            .ok()
            .and_then(|raw| raw.parse::<u64>().ok())
            .map(Duration::from_secs)
            .unwrap_or(defaults.sweep_interval);

        let default_validity_minutes = env::var("DEFAULT_VALIDITY_MINUTES")
            .ok()
            .and_then(|raw| raw.parse::<i64>().ok())
            .filter(|minutes| *minutes >= 1)
            .unwrap_or(defaults.default_validity_minutes);

        Settings {
            storage_path,
            sweep_interval,
            default_validity_minutes,
        }
    }
}

/// Installs the tracing subscriber for an embedding application.
///
/// Honors `RUST_LOG` when set, defaulting to debug-level output for this
/// crate only.
pub fn init_tracing() {
    let filter = env::var("RUST_LOG").unwrap_or_else(|_| "snaplink=debug".to_string());
    tracing_subscriber::fmt().with_env_filter(filter).init();
}
