//! config.rs: Environment-driven backend settings

use std::path::PathBuf;

use tracing::warn;

const DEFAULT_PORT: u16 = 3001;
const DEFAULT_STATE_FILE: &str = "state.json";

#[derive(Debug, Clone)]
pub struct BackendConfig {
    pub port: u16,
    pub state_file: PathBuf,
    /// Charge owed water breaks against each practice's time budget.
    pub auto_water_breaks: bool,
}

impl Default for BackendConfig {
    fn default() -> Self {
        Self {
            port: DEFAULT_PORT,
            state_file: PathBuf::from(DEFAULT_STATE_FILE),
            auto_water_breaks: true,
        }
    }
}

impl BackendConfig {
    /// `PORT`, `PRACTICE_STATE_FILE`, `PRACTICE_AUTO_WATER_BREAKS`. Unset or
    /// unparsable values keep their defaults.
    pub fn from_env() -> Self {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Self {
        let mut cfg = Self::default();

        if let Some(raw) = lookup("PORT") {
            match raw.parse() {
                Ok(port) => cfg.port = port,
                Err(_) => warn!("Ignoring invalid PORT={raw}, using {DEFAULT_PORT}"),
            }
        }
        if let Some(path) = lookup("PRACTICE_STATE_FILE").filter(|p| !p.trim().is_empty()) {
            cfg.state_file = PathBuf::from(path);
        }
        if let Some(raw) = lookup("PRACTICE_AUTO_WATER_BREAKS") {
            match raw.to_ascii_lowercase().as_str() {
                "1" | "true" | "yes" | "on" => cfg.auto_water_breaks = true,
                "0" | "false" | "no" | "off" => cfg.auto_water_breaks = false,
                _ => warn!("Ignoring invalid PRACTICE_AUTO_WATER_BREAKS={raw}"),
            }
        }

        cfg
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn from(pairs: &[(&str, &str)]) -> BackendConfig {
        let env: HashMap<String, String> = pairs.iter().map(|(k, v)| (k.to_string(), v.to_string())).collect();
        BackendConfig::from_lookup(|key| env.get(key).cloned())
    }

    #[test]
    fn defaults_when_unset() {
        let cfg = from(&[]);
        assert_eq!(cfg.port, 3001);
        assert_eq!(cfg.state_file, PathBuf::from("state.json"));
        assert!(cfg.auto_water_breaks);
    }

    #[test]
    fn reads_overrides() {
        let cfg = from(&[
            ("PORT", "8080"),
            ("PRACTICE_STATE_FILE", "/tmp/plans.json"),
            ("PRACTICE_AUTO_WATER_BREAKS", "off"),
        ]);
        assert_eq!(cfg.port, 8080);
        assert_eq!(cfg.state_file, PathBuf::from("/tmp/plans.json"));
        assert!(!cfg.auto_water_breaks);
    }

    #[test]
    fn invalid_values_fall_back() {
        let cfg = from(&[("PORT", "http"), ("PRACTICE_AUTO_WATER_BREAKS", "maybe"), ("PRACTICE_STATE_FILE", " ")]);
        assert_eq!(cfg.port, 3001);
        assert!(cfg.auto_water_breaks);
        assert_eq!(cfg.state_file, PathBuf::from("state.json"));
    }
}
