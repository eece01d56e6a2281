//! Input parameters for a dividend reinvestment projection

use serde::{Deserialize, Serialize};

use crate::error::{ensure_at_least, ensure_percent, ensure_positive, Result, SimulatorError};

/// Tax treatment of the account holding the position
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AccountType {
    /// Dividends are taxed at federal + state rates as they are paid
    Taxable,
    /// IRA/401(k) style account; dividends are not taxed
    TaxDeferred,
}

impl AccountType {
    pub fn is_tax_deferred(&self) -> bool {
        matches!(self, AccountType::TaxDeferred)
    }
}

/// What happens to each month's net dividend
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(tag = "mode", rename_all = "snake_case")]
pub enum ReinvestmentMode {
    /// Reinvest a percentage (0-100) of the net dividend
    Reinvest { percent: f64 },
    /// Withdraw a fixed dollar amount each month. Anything left over after the
    /// withdrawal is swept back into shares.
    Withdraw { monthly_amount: f64 },
}

impl ReinvestmentMode {
    /// Dollar amount of `net_dividend` that buys new shares this month
    pub fn reinvest_amount(&self, net_dividend: f64) -> f64 {
        match *self {
            ReinvestmentMode::Reinvest { percent } => net_dividend * percent / 100.0,
            ReinvestmentMode::Withdraw { monthly_amount } => (net_dividend - monthly_amount).max(0.0),
        }
    }

    fn validate(&self) -> Result<()> {
        match *self {
            ReinvestmentMode::Reinvest { percent } => ensure_percent("reinvest_percent", percent),
            ReinvestmentMode::Withdraw { monthly_amount } => {
                ensure_at_least("withdrawal_amount", monthly_amount, 0.0)
            }
        }
    }
}

/// Immutable inputs for one projection run
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProjectionParameters {
    /// Starting share count
    pub initial_shares: f64,

    /// Number of months to simulate
    pub holding_periods: u32,

    /// Average monthly dividend per share ($)
    pub avg_dividend_per_share: f64,

    /// Federal tax rate on dividends, in percent
    pub federal_tax_rate: f64,

    /// State tax rate on dividends, in percent
    pub state_tax_rate: f64,

    pub account_type: AccountType,

    pub reinvestment_mode: ReinvestmentMode,

    /// Price paid per share when reinvesting ($)
    pub reinvestment_price: f64,

    /// Weighted average cost per share, only used for yield-on-cost reporting
    #[serde(default)]
    pub cost_basis_per_share: Option<f64>,
}

impl ProjectionParameters {
    /// Check every precondition. Nothing is simulated if this fails.
    pub fn validate(&self) -> Result<()> {
        ensure_at_least("initial_shares", self.initial_shares, 0.0)?;
        if self.holding_periods < 1 {
            return Err(SimulatorError::invalid(
                "holding_periods",
                format!("must be >= 1, got {}", self.holding_periods),
            ));
        }
        ensure_at_least("avg_dividend_per_share", self.avg_dividend_per_share, 0.0)?;
        ensure_percent("federal_tax_rate", self.federal_tax_rate)?;
        ensure_percent("state_tax_rate", self.state_tax_rate)?;
        self.reinvestment_mode.validate()?;
        ensure_positive("reinvestment_price", self.reinvestment_price)?;
        if let Some(basis) = self.cost_basis_per_share {
            ensure_at_least("cost_basis_per_share", basis, 0.0)?;
        }
        Ok(())
    }

    /// Combined tax rate applied to gross dividends, as a fraction
    pub fn effective_tax_fraction(&self) -> f64 {
        if self.account_type.is_tax_deferred() {
            0.0
        } else {
            (self.federal_tax_rate + self.state_tax_rate) / 100.0
        }
    }

    /// Same parameters with a different reinvestment price
    pub fn with_reinvestment_price(&self, price: f64) -> Self {
        Self {
            reinvestment_price: price,
            ..self.clone()
        }
    }
}

impl Default for ProjectionParameters {
    fn default() -> Self {
        Self {
            initial_shares: 10_000.0,
            holding_periods: 24,
            avg_dividend_per_share: 2.0,
            federal_tax_rate: 20.0,
            state_tax_rate: 5.0,
            account_type: AccountType::Taxable,
            reinvestment_mode: ReinvestmentMode::Reinvest { percent: 100.0 },
            reinvestment_price: 25.0,
            cost_basis_per_share: None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_parameters_are_valid() {
        assert!(ProjectionParameters::default().validate().is_ok());
    }

    #[test]
    fn test_rejects_bad_inputs() {
        let base = ProjectionParameters::default();

        let cases = vec![
            ("holding_periods", ProjectionParameters { holding_periods: 0, ..base.clone() }),
            ("reinvestment_price", ProjectionParameters { reinvestment_price: 0.0, ..base.clone() }),
            ("reinvestment_price", ProjectionParameters { reinvestment_price: -5.0, ..base.clone() }),
            ("initial_shares", ProjectionParameters { initial_shares: -1.0, ..base.clone() }),
            ("federal_tax_rate", ProjectionParameters { federal_tax_rate: 101.0, ..base.clone() }),
            ("state_tax_rate", ProjectionParameters { state_tax_rate: -1.0, ..base.clone() }),
            (
                "reinvest_percent",
                ProjectionParameters {
                    reinvestment_mode: ReinvestmentMode::Reinvest { percent: 150.0 },
                    ..base.clone()
                },
            ),
            (
                "withdrawal_amount",
                ProjectionParameters {
                    reinvestment_mode: ReinvestmentMode::Withdraw { monthly_amount: -1.0 },
                    ..base.clone()
                },
            ),
        ];

        for (expected_field, params) in cases {
            match params.validate() {
                Err(SimulatorError::InvalidParameter { field, .. }) => assert_eq!(field, expected_field),
                other => panic!("expected InvalidParameter for {}, got {:?}", expected_field, other),
            }
        }
    }

    #[test]
    fn test_reinvest_amounts() {
        let half = ReinvestmentMode::Reinvest { percent: 50.0 };
        assert_eq!(half.reinvest_amount(1000.0), 500.0);

        // Residual after the withdrawal is swept into shares
        let withdraw = ReinvestmentMode::Withdraw { monthly_amount: 2000.0 };
        assert_eq!(withdraw.reinvest_amount(15000.0), 13000.0);
        assert_eq!(withdraw.reinvest_amount(1500.0), 0.0);
    }

    #[test]
    fn test_tax_fraction() {
        let taxable = ProjectionParameters::default();
        assert!((taxable.effective_tax_fraction() - 0.25).abs() < 1e-12);

        let deferred = ProjectionParameters {
            account_type: AccountType::TaxDeferred,
            ..taxable
        };
        assert_eq!(deferred.effective_tax_fraction(), 0.0);
    }

    #[test]
    fn test_mode_json_shape() {
        let mode: ReinvestmentMode =
            serde_json::from_str(r#"{"mode":"withdraw","monthly_amount":2000.0}"#).unwrap();
        assert_eq!(mode, ReinvestmentMode::Withdraw { monthly_amount: 2000.0 });
    }
}
