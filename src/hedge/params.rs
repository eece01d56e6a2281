//! Hedge sizing inputs

use serde::{Deserialize, Serialize};

use crate::error::{ensure_at_least, ensure_positive, Result, SimulatorError};

/// Standard equity option contract size
pub const DEFAULT_CONTRACT_MULTIPLIER: u32 = 100;

/// Default budget: premiums up to 5% of the position value
pub const DEFAULT_MAX_COST_PERCENT: f64 = 5.0;

/// Inputs for sizing and scoring a protective put
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HedgeParameters {
    /// Current underlying price ($)
    pub current_price: f64,

    /// Price the holder expects to sell at ($)
    pub exit_price: f64,

    /// Shares to protect
    pub shares_to_hedge: f64,

    /// Shares per contract
    pub contract_multiplier: u32,

    /// Maximum premium as a percent of position value (advisory)
    pub max_cost_percent: f64,
}

impl HedgeParameters {
    pub fn new(current_price: f64, exit_price: f64, shares_to_hedge: f64) -> Self {
        Self {
            current_price,
            exit_price,
            shares_to_hedge,
            contract_multiplier: DEFAULT_CONTRACT_MULTIPLIER,
            max_cost_percent: DEFAULT_MAX_COST_PERCENT,
        }
    }

    pub fn validate(&self) -> Result<()> {
        ensure_positive("shares_to_hedge", self.shares_to_hedge)?;
        ensure_positive("current_price", self.current_price)?;
        ensure_positive("exit_price", self.exit_price)?;
        if self.contract_multiplier == 0 {
            return Err(SimulatorError::invalid("contract_multiplier", "must be > 0, got 0"));
        }
        ensure_at_least("max_cost_percent", self.max_cost_percent, 0.0)?;
        Ok(())
    }

    /// Whole contracts that fit in the hedged share count
    pub fn contracts(&self) -> u64 {
        (self.shares_to_hedge / self.contract_multiplier as f64).floor() as u64
    }

    /// Market value of the hedged shares
    pub fn position_value(&self) -> f64 {
        self.current_price * self.shares_to_hedge
    }

    /// Advisory premium ceiling
    pub fn max_cost_allowed(&self) -> f64 {
        self.position_value() * self.max_cost_percent / 100.0
    }
}
