use crate::core_types::{AccountId, ClockKey};
use crate::dividend::DEFAULT_EXPIRY_WINDOW;
use serde::{Deserialize, Serialize};
use std::fs;

#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct AppConfig {
    pub log_level: String,
    pub log_dir: String,
    pub log_file: String,
    pub use_json: bool,
    pub rotation: String,
    pub enable_tracing: bool,
    #[serde(default)]
    pub dividend: DividendConfig,
}

/// Distribution policy knobs.
#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct DividendConfig {
    /// Claim window after the payout date, in logical-time units.
    pub expiry_window: ClockKey,
    /// Initial payout-destination wallet for recycled residue.
    pub wallet: AccountId,
}

impl Default for DividendConfig {
    fn default() -> Self {
        Self {
            expiry_window: DEFAULT_EXPIRY_WINDOW,
            wallet: 1,
        }
    }
}

impl AppConfig {
    pub fn load(env: &str) -> Self {
        let config_path = format!("config/{}.yaml", env);
        let content = fs::read_to_string(&config_path)
            .unwrap_or_else(|_| panic!("Failed to read config file: {}", config_path));
        serde_yaml::from_str(&content).expect("Failed to parse config yaml")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_dividend_defaults_apply_when_section_missing() {
        let yaml = r#"
log_level: info
log_dir: ./logs
log_file: dividend.log
use_json: false
rotation: daily
enable_tracing: true
"#;
        let config: AppConfig = serde_yaml::from_str(yaml).unwrap();
        assert_eq!(config.dividend.expiry_window, DEFAULT_EXPIRY_WINDOW);
        assert_eq!(config.dividend.wallet, 1);
    }
}
