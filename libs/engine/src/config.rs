//! Engine configuration
//!
//! Runtime parameters for the market engine: the admin identity that gates
//! resolve/cancel/fee-withdrawal, and the protocol fee taken off every
//! trade. Supports JSON file loading, environment variable overrides, and
//! validation with detailed error reporting.

use market_types::AccountId;
use serde::{Deserialize, Serialize};

/// Default protocol fee: 1%
pub const DEFAULT_FEE_BPS: u32 = 100;

/// Complete configuration for the market engine
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EngineConfig {
    /// Account allowed to resolve/cancel markets and withdraw fees
    pub admin: AccountId,
    /// Protocol fee in basis points taken off every trade amount (100 = 1%)
    pub fee_bps: u32,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            admin: AccountId::ZERO,
            fee_bps: DEFAULT_FEE_BPS,
        }
    }
}

impl EngineConfig {
    pub fn new(admin: AccountId, fee_bps: u32) -> Self {
        Self { admin, fee_bps }
    }

    /// Load configuration from a JSON file
    pub fn from_file(path: &str) -> anyhow::Result<Self> {
        let contents = std::fs::read_to_string(path)?;
        let config: Self = serde_json::from_str(&contents)?;
        Ok(config)
    }

    /// Load configuration from environment variables with defaults
    pub fn from_env() -> Self {
        let mut config = Self::default();

        if let Ok(admin) = std::env::var("MARKET_ENGINE_ADMIN") {
            if let Ok(account) = AccountId::from_hex(&admin) {
                config.admin = account;
            }
        }

        if let Ok(fee) = std::env::var("MARKET_ENGINE_FEE_BPS") {
            if let Ok(value) = fee.parse::<u32>() {
                config.fee_bps = value;
            }
        }

        config
    }

    /// Save configuration to a JSON file
    pub fn save_to_file(&self, path: &str) -> anyhow::Result<()> {
        let json = serde_json::to_string_pretty(self)?;
        std::fs::write(path, json)?;
        Ok(())
    }

    /// Validate configuration parameters
    pub fn validate(&self) -> anyhow::Result<()> {
        if self.fee_bps >= 10_000 {
            anyhow::bail!("fee_bps must be below 10000 (100%)");
        }

        if self.admin == AccountId::ZERO {
            anyhow::bail!("admin account must be configured");
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn admin() -> AccountId {
        AccountId([0x42; 20])
    }

    #[test]
    fn test_validation() {
        let config = EngineConfig::new(admin(), 100);
        assert!(config.validate().is_ok());

        let no_admin = EngineConfig::default();
        assert!(no_admin.validate().is_err());

        let bad_fee = EngineConfig::new(admin(), 10_000);
        assert!(bad_fee.validate().is_err());
    }

    #[test]
    fn test_file_roundtrip() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("engine.json");
        let path = path.to_str().unwrap();

        let config = EngineConfig::new(admin(), 250);
        config.save_to_file(path).unwrap();

        let loaded = EngineConfig::from_file(path).unwrap();
        assert_eq!(loaded.admin, config.admin);
        assert_eq!(loaded.fee_bps, 250);
    }

    #[test]
    fn test_env_override() {
        std::env::set_var("MARKET_ENGINE_ADMIN", format!("0x{}", "42".repeat(20)));
        std::env::set_var("MARKET_ENGINE_FEE_BPS", "321");

        let config = EngineConfig::from_env();
        assert_eq!(config.admin, admin());
        assert_eq!(config.fee_bps, 321);

        std::env::remove_var("MARKET_ENGINE_ADMIN");
        std::env::remove_var("MARKET_ENGINE_FEE_BPS");
    }
}
