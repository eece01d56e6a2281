//! JSON run configuration
//!
//! Saved sessions are plain JSON. Every field has a default so a partial file
//! (or `{}`) still produces a complete, validated parameter set.

use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;

use crate::error::Result;
use crate::hedge::{HedgeParameters, DEFAULT_CONTRACT_MULTIPLIER, DEFAULT_MAX_COST_PERCENT};
use crate::projection::{AccountType, ProjectionParameters, ReinvestmentMode};

/// Projection inputs as stored in a run file
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProjectionRequest {
    #[serde(default = "default_initial_shares")]
    pub initial_shares: f64,

    #[serde(default = "default_holding_months")]
    pub holding_months: u32,

    /// Average monthly dividend per share
    #[serde(default = "default_avg_dividend")]
    pub avg_dividend: f64,

    #[serde(default = "default_federal_tax_rate")]
    pub federal_tax_rate: f64,

    #[serde(default = "default_state_tax_rate")]
    pub state_tax_rate: f64,

    #[serde(default = "default_account_type")]
    pub account_type: AccountType,

    /// `{"mode": "reinvest", "percent": 100}` or `{"mode": "withdraw", "monthly_amount": 2000}`
    #[serde(default = "default_reinvestment")]
    pub reinvestment: ReinvestmentMode,

    #[serde(default = "default_reinvest_price")]
    pub reinvest_price: f64,

    #[serde(default)]
    pub cost_basis_per_share: Option<f64>,
}

fn default_initial_shares() -> f64 { 10_000.0 }
fn default_holding_months() -> u32 { 24 }
fn default_avg_dividend() -> f64 { 2.0 }
fn default_federal_tax_rate() -> f64 { 20.0 }
fn default_state_tax_rate() -> f64 { 5.0 }
fn default_account_type() -> AccountType { AccountType::Taxable }
fn default_reinvestment() -> ReinvestmentMode { ReinvestmentMode::Reinvest { percent: 100.0 } }
fn default_reinvest_price() -> f64 { 25.0 }
fn default_contract_multiplier() -> u32 { DEFAULT_CONTRACT_MULTIPLIER }
fn default_max_cost_percent() -> f64 { DEFAULT_MAX_COST_PERCENT }

impl Default for ProjectionRequest {
    fn default() -> Self {
        Self {
            initial_shares: default_initial_shares(),
            holding_months: default_holding_months(),
            avg_dividend: default_avg_dividend(),
            federal_tax_rate: default_federal_tax_rate(),
            state_tax_rate: default_state_tax_rate(),
            account_type: default_account_type(),
            reinvestment: default_reinvestment(),
            reinvest_price: default_reinvest_price(),
            cost_basis_per_share: None,
        }
    }
}

impl ProjectionRequest {
    /// Convert to validated projection parameters
    pub fn to_parameters(&self) -> Result<ProjectionParameters> {
        let params = ProjectionParameters {
            initial_shares: self.initial_shares,
            holding_periods: self.holding_months,
            avg_dividend_per_share: self.avg_dividend,
            federal_tax_rate: self.federal_tax_rate,
            state_tax_rate: self.state_tax_rate,
            account_type: self.account_type,
            reinvestment_mode: self.reinvestment,
            reinvestment_price: self.reinvest_price,
            cost_basis_per_share: self.cost_basis_per_share,
        };
        params.validate()?;
        Ok(params)
    }
}

/// Hedge inputs as stored in a run file
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HedgeRequest {
    /// Underlying to quote, when a provider is used
    #[serde(default)]
    pub ticker: Option<String>,

    /// Falls back to the provider's latest close when absent
    #[serde(default)]
    pub current_price: Option<f64>,

    pub exit_price: f64,

    /// Falls back to the projection's starting share count when absent
    #[serde(default)]
    pub shares_to_hedge: Option<f64>,

    #[serde(default = "default_contract_multiplier")]
    pub contract_multiplier: u32,

    #[serde(default = "default_max_cost_percent")]
    pub max_cost_percent: f64,
}

impl HedgeRequest {
    /// Fill in fallbacks and convert to validated hedge parameters
    pub fn to_parameters(&self, current_price: f64, default_shares: f64) -> Result<HedgeParameters> {
        let params = HedgeParameters {
            current_price: self.current_price.unwrap_or(current_price),
            exit_price: self.exit_price,
            shares_to_hedge: self.shares_to_hedge.unwrap_or(default_shares),
            contract_multiplier: self.contract_multiplier,
            max_cost_percent: self.max_cost_percent,
        };
        params.validate()?;
        Ok(params)
    }
}

/// A saved run: projection inputs plus optional hedge inputs
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct RunConfig {
    #[serde(default)]
    pub projection: ProjectionRequest,

    #[serde(default)]
    pub hedge: Option<HedgeRequest>,
}

impl RunConfig {
    pub fn from_json_str(json: &str) -> Result<Self> {
        Ok(serde_json::from_str(json)?)
    }

    pub fn from_path<P: AsRef<Path>>(path: P) -> Result<Self> {
        let text = fs::read_to_string(path)?;
        Self::from_json_str(&text)
    }

    pub fn to_json_pretty(&self) -> Result<String> {
        Ok(serde_json::to_string_pretty(self)?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::SimulatorError;

    #[test]
    fn test_empty_config_uses_defaults() {
        let config = RunConfig::from_json_str("{}").unwrap();
        assert_eq!(config.projection, ProjectionRequest::default());
        assert!(config.hedge.is_none());

        let params = config.projection.to_parameters().unwrap();
        assert_eq!(params, ProjectionParameters::default());
    }

    #[test]
    fn test_partial_config() {
        let json = r#"{
            "projection": {
                "holding_months": 60,
                "account_type": "tax_deferred",
                "reinvestment": {"mode": "withdraw", "monthly_amount": 1500}
            },
            "hedge": {"exit_price": 12.5, "max_cost_percent": 3}
        }"#;
        let config = RunConfig::from_json_str(json).unwrap();
        let params = config.projection.to_parameters().unwrap();

        assert_eq!(params.holding_periods, 60);
        assert_eq!(params.account_type, AccountType::TaxDeferred);
        assert_eq!(params.reinvestment_mode, ReinvestmentMode::Withdraw { monthly_amount: 1500.0 });
        assert_eq!(params.reinvestment_price, 25.0);

        let hedge = config.hedge.unwrap().to_parameters(22.0, params.initial_shares).unwrap();
        assert_eq!(hedge.current_price, 22.0);
        assert_eq!(hedge.exit_price, 12.5);
        assert_eq!(hedge.shares_to_hedge, 10_000.0);
        assert_eq!(hedge.contract_multiplier, 100);
        assert_eq!(hedge.max_cost_percent, 3.0);
    }

    #[test]
    fn test_invalid_values_surface_as_invalid_parameter() {
        let config = RunConfig::from_json_str(r#"{"projection": {"reinvest_price": 0}}"#).unwrap();
        assert!(matches!(
            config.projection.to_parameters(),
            Err(SimulatorError::InvalidParameter { .. })
        ));
    }

    #[test]
    fn test_malformed_json() {
        assert!(matches!(RunConfig::from_json_str("{"), Err(SimulatorError::Json(_))));
    }

    #[test]
    fn test_round_trip_through_json() {
        let config = RunConfig::default();
        let text = config.to_json_pretty().unwrap();
        assert_eq!(RunConfig::from_json_str(&text).unwrap(), config);
    }
}
