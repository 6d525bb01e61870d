//! Engine configuration
//!
//! All numeric thresholds used by the extractors, persona predicates, and
//! cache live here rather than inline at the call sites, so operators can
//! tune them without a rebuild.
//!
//! ## Configuration Resolution
//!
//! Config is loaded with a two-layer resolution:
//! 1. Check for override in data dir (~/.local/share/finch/config/engine.toml)
//! 2. Fall back to embedded defaults (compiled into binary)

use std::fs;
use std::path::PathBuf;
use std::time::Duration;

use serde::Deserialize;

use crate::error::{Error, Result};

/// Embedded default config (compiled into binary)
const DEFAULT_CONFIG: &str = include_str!("../../../config/engine.toml");

/// Lookback window lengths
#[derive(Debug, Clone, Deserialize)]
pub struct WindowConfig {
    pub short_term_days: i64,
    pub long_term_days: i64,
}

/// Subscription extractor + persona thresholds
#[derive(Debug, Clone, Deserialize)]
pub struct SubscriptionConfig {
    pub recurring_min_occurrences: usize,
    pub recurring_span_days: i64,
    pub interval_consistency: f64,
    pub heavy_min_merchants: usize,
    pub heavy_min_monthly_spend: f64,
    pub heavy_min_share: f64,
}

/// Savings extractor + persona thresholds
#[derive(Debug, Clone, Deserialize)]
pub struct SavingsConfig {
    pub builder_min_growth_rate: f64,
    pub builder_min_monthly_inflow: f64,
}

/// Credit utilization tiers and payment tolerances
#[derive(Debug, Clone, Deserialize)]
pub struct CreditConfig {
    pub medium_utilization: f64,
    pub high_utilization: f64,
    pub very_high_utilization: f64,
    pub minimum_payment_tolerance: f64,
}

/// Income extractor + persona thresholds
#[derive(Debug, Clone, Deserialize)]
pub struct IncomeConfig {
    pub payroll_amount_floor: f64,
    pub variable_pay_gap_days: f64,
    pub low_buffer_months: f64,
    pub gap_irregularity_ratio: f64,
}

/// New User persona thresholds
#[derive(Debug, Clone, Deserialize)]
pub struct NewUserConfig {
    pub max_account_age_days: i64,
    pub max_accounts: usize,
    pub max_card_limit: f64,
}

/// Read-through cache settings
#[derive(Debug, Clone, Deserialize)]
pub struct CacheConfig {
    pub ttl_minutes: u64,
}

/// AI augmentation overlay settings
#[derive(Debug, Clone, Deserialize)]
pub struct AugmentationConfig {
    pub timeout_seconds: u64,
}

impl AugmentationConfig {
    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_seconds)
    }
}

/// Complete engine configuration
#[derive(Debug, Clone, Deserialize)]
pub struct EngineConfig {
    pub windows: WindowConfig,
    pub subscriptions: SubscriptionConfig,
    pub savings: SavingsConfig,
    pub credit: CreditConfig,
    pub income: IncomeConfig,
    pub new_user: NewUserConfig,
    pub cache: CacheConfig,
    pub augmentation: AugmentationConfig,
}

impl Default for EngineConfig {
    fn default() -> Self {
        // The embedded config is validated by tests; a parse failure here
        // would mean the binary shipped with a broken default.
        toml::from_str(DEFAULT_CONFIG).expect("embedded engine.toml must parse")
    }
}

impl EngineConfig {
    /// Load config with override resolution: data-dir override first,
    /// embedded defaults otherwise.
    pub fn load() -> Result<Self> {
        if let Some(path) = Self::override_path() {
            if path.exists() {
                tracing::info!(path = %path.display(), "Loading engine config override");
                return Self::from_file(&path);
            }
        }
        Ok(Self::default())
    }

    /// Parse config from a TOML file
    pub fn from_file(path: &std::path::Path) -> Result<Self> {
        let raw = fs::read_to_string(path)?;
        Self::from_toml(&raw)
    }

    /// Parse config from a TOML string
    pub fn from_toml(raw: &str) -> Result<Self> {
        toml::from_str(raw).map_err(|e| Error::Config(format!("invalid engine config: {}", e)))
    }

    /// Path of the user override file, if a data dir can be resolved
    fn override_path() -> Option<PathBuf> {
        std::env::var_os("FINCH_DATA_DIR")
            .map(PathBuf::from)
            .map(|d| d.join("config").join("engine.toml"))
    }

    pub fn cache_ttl(&self) -> Duration {
        Duration::from_secs(self.cache.ttl_minutes * 60)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_embedded_defaults_parse() {
        let config = EngineConfig::default();
        assert_eq!(config.windows.short_term_days, 30);
        assert_eq!(config.windows.long_term_days, 180);
        assert_eq!(config.subscriptions.recurring_min_occurrences, 3);
        assert_eq!(config.credit.medium_utilization, 0.30);
        assert_eq!(config.cache.ttl_minutes, 15);
    }

    #[test]
    fn test_from_toml_rejects_garbage() {
        assert!(EngineConfig::from_toml("not toml at all [[[").is_err());
    }

    #[test]
    fn test_override_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("engine.toml");
        let mut raw = DEFAULT_CONFIG.to_string();
        raw = raw.replace("ttl_minutes = 15", "ttl_minutes = 1");
        std::fs::write(&path, raw).unwrap();

        let config = EngineConfig::from_file(&path).unwrap();
        assert_eq!(config.cache.ttl_minutes, 1);
    }
}
