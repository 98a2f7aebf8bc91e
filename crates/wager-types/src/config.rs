//! Ledger configuration.

use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::{Result, WagerError, constants};

/// Tunables for one escrow ledger.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct LedgerConfig {
    /// Platform fee used by `initialize` when none is given explicitly.
    pub fee_bps: u16,
    /// Smallest accepted stake. Must be at least 1.
    pub min_wager: u64,
    /// Largest accepted stake, if bounded.
    pub max_wager: Option<u64>,
    /// Seconds between creation and the moment anyone may expire a game.
    pub game_expiry_secs: i64,
    /// Cap on the opaque `game_data` payload.
    pub max_game_data_len: usize,
}

impl Default for LedgerConfig {
    fn default() -> Self {
        Self {
            fee_bps: constants::DEFAULT_FEE_BPS,
            min_wager: constants::DEFAULT_MIN_WAGER,
            max_wager: None,
            game_expiry_secs: constants::DEFAULT_GAME_EXPIRY_SECS,
            max_game_data_len: constants::DEFAULT_MAX_GAME_DATA_LEN,
        }
    }
}

impl LedgerConfig {
    /// Reject values the ledger cannot honor.
    pub fn validate(&self) -> Result<()> {
        if u64::from(self.fee_bps) > constants::BPS_DENOMINATOR {
            return Err(WagerError::InvalidFeeBps(self.fee_bps));
        }
        if self.min_wager == 0 {
            return Err(WagerError::Configuration("min_wager must be > 0".into()));
        }
        if let Some(max) = self.max_wager {
            if max < self.min_wager {
                return Err(WagerError::Configuration(format!(
                    "max_wager {max} is below min_wager {}",
                    self.min_wager
                )));
            }
        }
        if self.game_expiry_secs <= 0 {
            return Err(WagerError::Configuration(
                "game_expiry_secs must be positive".into(),
            ));
        }
        Ok(())
    }

    /// Expiry window as a chrono duration.
    #[must_use]
    pub fn game_expiry(&self) -> chrono::Duration {
        chrono::Duration::seconds(self.game_expiry_secs)
    }

    /// Parse and validate a JSON config. Missing fields take defaults.
    pub fn from_json_str(json: &str) -> Result<Self> {
        let cfg: Self = serde_json::from_str(json)
            .map_err(|e| WagerError::Configuration(e.to_string()))?;
        cfg.validate()?;
        Ok(cfg)
    }

    pub fn from_json_file(path: impl AsRef<Path>) -> Result<Self> {
        let raw = std::fs::read_to_string(path)?;
        Self::from_json_str(&raw)
    }
}
