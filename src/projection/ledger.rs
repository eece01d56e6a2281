//! Monthly ledger produced by a projection

use serde::{Deserialize, Serialize};

use super::params::ProjectionParameters;

/// A single row of projection output for one month
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PeriodRecord {
    // Timing
    pub month: u32,
    pub year: u32,

    /// Shares held at the end of the month, after reinvestment
    pub shares: f64,

    // Dividend flows ($)
    pub gross_dividend: f64,
    pub tax: f64,
    pub net_dividend: f64,
    pub reinvested: f64,
    pub withdrawn: f64,

    /// Shares bought with `reinvested`
    pub new_shares: f64,
}

/// Complete projection result
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProjectionResult {
    /// Parameters the ledger was produced from
    pub params: ProjectionParameters,

    /// Monthly rows, one per simulated month in order
    pub records: Vec<PeriodRecord>,
}

impl ProjectionResult {
    pub fn new(params: ProjectionParameters) -> Self {
        let capacity = params.holding_periods as usize;
        Self {
            params,
            records: Vec::with_capacity(capacity),
        }
    }

    /// Append a month
    pub fn add_record(&mut self, record: PeriodRecord) {
        self.records.push(record);
    }

    pub fn final_shares(&self) -> f64 {
        self.records
            .last()
            .map(|r| r.shares)
            .unwrap_or(self.params.initial_shares)
    }

    /// Get summary statistics
    pub fn summary(&self) -> ProjectionSummary {
        let total_gross_dividends: f64 = self.records.iter().map(|r| r.gross_dividend).sum();
        let total_tax: f64 = self.records.iter().map(|r| r.tax).sum();
        let total_net_dividends: f64 = self.records.iter().map(|r| r.net_dividend).sum();
        let total_reinvested: f64 = self.records.iter().map(|r| r.reinvested).sum();
        let total_withdrawn: f64 = self.records.iter().map(|r| r.withdrawn).sum();

        let final_shares = self.final_shares();
        let final_monthly_income = self.records.last().map(|r| r.net_dividend).unwrap_or(0.0);

        // Annualized dividend over cost; undefined for a zero basis
        let yield_on_cost_pct = self
            .params
            .cost_basis_per_share
            .filter(|basis| *basis > 0.0)
            .map(|basis| self.params.avg_dividend_per_share * 12.0 / basis * 100.0);

        ProjectionSummary {
            total_months: self.records.len() as u32,
            initial_shares: self.params.initial_shares,
            final_shares,
            shares_added: final_shares - self.params.initial_shares,
            total_gross_dividends,
            total_tax,
            total_net_dividends,
            total_reinvested,
            total_withdrawn,
            final_monthly_income,
            yield_on_cost_pct,
        }
    }
}

/// Summary statistics for a projection
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProjectionSummary {
    pub total_months: u32,
    pub initial_shares: f64,
    pub final_shares: f64,
    pub shares_added: f64,
    pub total_gross_dividends: f64,
    pub total_tax: f64,
    pub total_net_dividends: f64,
    pub total_reinvested: f64,
    pub total_withdrawn: f64,
    pub final_monthly_income: f64,
    pub yield_on_cost_pct: Option<f64>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    fn record(month: u32, shares: f64, net: f64, reinvested: f64) -> PeriodRecord {
        PeriodRecord {
            month,
            year: (month - 1) / 12 + 1,
            shares,
            gross_dividend: net,
            tax: 0.0,
            net_dividend: net,
            reinvested,
            withdrawn: net - reinvested,
            new_shares: reinvested / 25.0,
        }
    }

    #[test]
    fn test_summary_totals() {
        let mut result = ProjectionResult::new(ProjectionParameters {
            holding_periods: 2,
            cost_basis_per_share: Some(20.0),
            ..Default::default()
        });
        result.add_record(record(1, 10_400.0, 20_000.0, 10_000.0));
        result.add_record(record(2, 10_816.0, 20_800.0, 10_400.0));

        let summary = result.summary();
        assert_eq!(summary.total_months, 2);
        assert_eq!(summary.final_shares, 10_816.0);
        assert_relative_eq!(summary.shares_added, 816.0);
        assert_relative_eq!(summary.total_net_dividends, 40_800.0);
        assert_relative_eq!(summary.total_reinvested, 20_400.0);
        assert_relative_eq!(summary.total_withdrawn, 20_400.0);
        assert_eq!(summary.final_monthly_income, 20_800.0);
        // $2.00/month * 12 / $20 basis
        assert_relative_eq!(summary.yield_on_cost_pct.unwrap(), 120.0);
    }

    #[test]
    fn test_zero_cost_basis_has_no_yield() {
        let result = ProjectionResult::new(ProjectionParameters {
            cost_basis_per_share: Some(0.0),
            ..Default::default()
        });
        assert_eq!(result.summary().yield_on_cost_pct, None);
        assert_eq!(result.final_shares(), 10_000.0);
    }
}
