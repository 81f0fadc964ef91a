use crate::SignalMode;

/// All configuration loaded from environment variables at startup.
/// Every variable has a default; malformed values cause an immediate panic
/// with a clear message.
#[derive(Debug, Clone)]
pub struct Config {
    // Server
    pub port: u16,

    // Request defaults
    pub default_balance: f64,
    pub signal_mode: SignalMode,

    // Suggestion gate for single-signal mode
    pub min_win_rate: f64,
    pub min_samples: usize,

    // History retrieval
    pub history_interval: String,
    pub history_months: u32,
    pub yahoo_base_url: Option<String>,

    // Detector parameter file (TOML), optional
    pub strategy_config_path: Option<String>,
}

impl Config {
    /// Load configuration from environment variables.
    /// Loads `.env` if present.
    pub fn from_env() -> Self {
        let _ = dotenvy::dotenv(); // ignore error if .env not present

        let signal_mode = optional_env("SIGNAL_MODE")
            .map(|v| {
                v.parse::<SignalMode>()
                    .unwrap_or_else(|e| panic!("ERROR: SIGNAL_MODE: {e}"))
            })
            .unwrap_or_default();

        Config {
            port: parsed_env("PORT", 5000),
            default_balance: parsed_env("DEFAULT_BALANCE", 200.0),
            signal_mode,
            min_win_rate: parsed_env("MIN_WIN_RATE", 0.65),
            min_samples: parsed_env("MIN_SAMPLES", 30),
            history_interval: optional_env("HISTORY_INTERVAL").unwrap_or_else(|| "1h".to_string()),
            history_months: parsed_env("HISTORY_MONTHS", 12),
            yahoo_base_url: optional_env("YAHOO_BASE_URL"),
            strategy_config_path: optional_env("STRATEGY_CONFIG_PATH"),
        }
    }
}

fn parsed_env<T>(key: &str, default: T) -> T
where
    T: std::str::FromStr,
    T::Err: std::fmt::Display,
{
    match optional_env(key) {
        Some(raw) => raw.trim().parse().unwrap_or_else(|e| {
            panic!("Environment variable '{key}' has invalid value '{raw}': {e}")
        }),
        None => default,
    }
}

fn optional_env(key: &str) -> Option<String> {
    std::env::var(key).ok().filter(|v| !v.trim().is_empty())
}
