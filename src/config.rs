use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;

use crate::bench::harness::BaselineMode;
use crate::bench::workload::{DEFAULT_TRANSFER_AMOUNT, DEFAULT_TRANSFER_PCT};
use crate::core_types::Amount;
use crate::error::ConfigError;
use crate::strategy::StrategyKind;

#[derive(Debug, Serialize, Deserialize, Clone)]
#[serde(default)]
pub struct AppConfig {
    pub log_level: String,
    /// No file logging when unset
    pub log_dir: Option<String>,
    pub log_file: String,
    pub use_json: bool,
    /// never | hourly | daily
    pub rotation: String,
    pub bench: BenchSection,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            log_level: "info".to_string(),
            log_dir: None,
            log_file: "ledger_bench.log".to_string(),
            use_json: false,
            rotation: "never".to_string(),
            bench: BenchSection::default(),
        }
    }
}

/// Benchmark defaults; CLI flags take precedence
#[derive(Debug, Serialize, Deserialize, Clone)]
#[serde(default)]
pub struct BenchSection {
    pub strategy: StrategyKind,
    pub transfer_amount: Amount,
    pub transfer_pct: u32,
    pub seed: Option<u64>,
    pub baseline: BaselineMode,
}

impl Default for BenchSection {
    fn default() -> Self {
        Self {
            strategy: StrategyKind::default(),
            transfer_amount: DEFAULT_TRANSFER_AMOUNT,
            transfer_pct: DEFAULT_TRANSFER_PCT,
            seed: None,
            baseline: BaselineMode::default(),
        }
    }
}

impl AppConfig {
    /// Load from an explicit path. The file must exist.
    pub fn load(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let content = fs::read_to_string(path).map_err(|source| ConfigError::Read {
            path: path.display().to_string(),
            source,
        })?;
        Self::parse(&content, &path.display().to_string())
    }

    /// Load `config/{env}.yaml`, falling back to defaults if it is absent.
    pub fn load_env(env: &str) -> Result<Self, ConfigError> {
        let path = format!("config/{}.yaml", env);
        if !Path::new(&path).exists() {
            return Ok(Self::default());
        }
        Self::load(&path)
    }

    pub fn parse(content: &str, origin: &str) -> Result<Self, ConfigError> {
        serde_yaml::from_str(content).map_err(|source| ConfigError::Parse {
            path: origin.to_string(),
            source,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_partial_yaml_uses_defaults() {
        let cfg = AppConfig::parse(
            "log_level: debug\nbench:\n  strategy: coarse\n  seed: 7\n",
            "inline",
        )
        .unwrap();
        assert_eq!(cfg.log_level, "debug");
        assert_eq!(cfg.log_dir, None);
        assert_eq!(cfg.bench.strategy, StrategyKind::Coarse);
        assert_eq!(cfg.bench.seed, Some(7));
        assert_eq!(cfg.bench.transfer_amount, DEFAULT_TRANSFER_AMOUNT);
        assert_eq!(cfg.bench.baseline, BaselineMode::Passthrough);
    }

    #[test]
    fn test_kebab_case_values() {
        let cfg = AppConfig::parse(
            "bench:\n  strategy: fine-grained\n  baseline: same-strategy\n",
            "inline",
        )
        .unwrap();
        assert_eq!(cfg.bench.strategy, StrategyKind::FineGrained);
        assert_eq!(cfg.bench.baseline, BaselineMode::SameStrategy);
    }

    #[test]
    fn test_malformed_yaml() {
        let err = AppConfig::parse("bench:\n  strategy: spinlock\n", "bad.yaml").unwrap_err();
        assert!(matches!(err, ConfigError::Parse { .. }));
        assert!(err.to_string().contains("bad.yaml"));
    }

    #[test]
    fn test_missing_explicit_file() {
        let err = AppConfig::load("config/does-not-exist.yaml").unwrap_err();
        assert!(matches!(err, ConfigError::Read { .. }));
    }

    #[test]
    fn test_missing_env_file_is_default() {
        let cfg = AppConfig::load_env("no-such-env").unwrap();
        assert_eq!(cfg.log_level, "info");
    }
}
