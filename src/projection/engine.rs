//! Core projection engine for monthly dividend reinvestment projections

use log::{debug, info};

use super::ledger::{PeriodRecord, ProjectionResult};
use super::params::ProjectionParameters;
use super::state::PositionState;
use crate::error::Result;

/// Main projection engine
///
/// Holds validated parameters; `project` is a pure function of them and can be
/// called any number of times.
#[derive(Debug, Clone)]
pub struct ProjectionEngine {
    params: ProjectionParameters,
}

impl ProjectionEngine {
    /// Create a new projection engine. Fails with `InvalidParameter` before
    /// anything is simulated.
    pub fn new(params: ProjectionParameters) -> Result<Self> {
        params.validate()?;
        Ok(Self { params })
    }

    pub fn params(&self) -> &ProjectionParameters {
        &self.params
    }

    /// Run the projection over every holding period
    pub fn project(&self) -> ProjectionResult {
        let mut result = ProjectionResult::new(self.params.clone());
        let mut state = PositionState::from_params(&self.params);

        for _month in 1..=self.params.holding_periods {
            state.advance_month();
            let record = self.calculate_month(&mut state);
            result.add_record(record);
        }

        info!(
            "Projected {} months: {:.4} -> {:.4} shares, ${:.2} net dividends, ${:.2} reinvested",
            self.params.holding_periods,
            self.params.initial_shares,
            state.shares,
            state.total_dividends,
            state.total_reinvested,
        );

        result
    }

    /// Calculate dividend flows and share purchases for a single month
    fn calculate_month(&self, state: &mut PositionState) -> PeriodRecord {
        let gross_dividend = state.shares * self.params.avg_dividend_per_share;
        let tax = gross_dividend * self.params.effective_tax_fraction();
        let net_dividend = gross_dividend - tax;

        let reinvested = self.params.reinvestment_mode.reinvest_amount(net_dividend);
        let new_shares = reinvested / self.params.reinvestment_price;

        state.apply_period(gross_dividend, tax, reinvested, new_shares);

        debug!(
            "Month {}: gross={:.4} tax={:.4} net={:.4} reinvested={:.4} shares={:.6}",
            state.projection_month, gross_dividend, tax, net_dividend, reinvested, state.shares
        );

        PeriodRecord {
            month: state.projection_month,
            year: state.projection_year,
            shares: state.shares,
            gross_dividend,
            tax,
            net_dividend,
            reinvested,
            withdrawn: net_dividend - reinvested,
            new_shares,
        }
    }
}

/// Validate `params` and run a projection in one call
pub fn run_projection(params: &ProjectionParameters) -> Result<ProjectionResult> {
    Ok(ProjectionEngine::new(params.clone())?.project())
}
