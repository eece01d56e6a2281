//! Position state tracking for a single projection

use super::params::ProjectionParameters;

/// State of the share position at a point in time during projection
#[derive(Debug, Clone)]
pub struct PositionState {
    /// Current projection month (1-indexed, 0 before the first month)
    pub projection_month: u32,

    /// Projection year (1-indexed)
    pub projection_year: u32,

    /// Current share count
    pub shares: f64,

    /// Cumulative net dividends received
    pub total_dividends: f64,

    /// Cumulative dollars reinvested into new shares
    pub total_reinvested: f64,

    /// Cumulative gross dividends before tax
    pub total_gross_dividends: f64,

    /// Cumulative tax withheld on dividends
    pub total_tax: f64,

    /// Cumulative net dividends not reinvested
    pub total_withdrawn: f64,
}

impl PositionState {
    /// Initialize state at projection start
    pub fn from_params(params: &ProjectionParameters) -> Self {
        Self {
            projection_month: 0,
            projection_year: 1,
            shares: params.initial_shares,
            total_dividends: 0.0,
            total_reinvested: 0.0,
            total_gross_dividends: 0.0,
            total_tax: 0.0,
            total_withdrawn: 0.0,
        }
    }

    /// Advance to next month
    pub fn advance_month(&mut self) {
        self.projection_month += 1;
        self.projection_year = (self.projection_month - 1) / 12 + 1;
    }

    /// Book one month's dividend flows and add the purchased shares
    pub fn apply_period(&mut self, gross_dividend: f64, tax: f64, reinvested: f64, new_shares: f64) {
        let net_dividend = gross_dividend - tax;
        self.shares += new_shares;
        self.total_gross_dividends += gross_dividend;
        self.total_tax += tax;
        self.total_dividends += net_dividend;
        self.total_reinvested += reinvested;
        self.total_withdrawn += net_dividend - reinvested;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_year_rolls_after_twelve_months() {
        let mut state = PositionState::from_params(&ProjectionParameters::default());
        for _ in 0..12 {
            state.advance_month();
        }
        assert_eq!(state.projection_month, 12);
        assert_eq!(state.projection_year, 1);

        state.advance_month();
        assert_eq!(state.projection_month, 13);
        assert_eq!(state.projection_year, 2);
    }

    #[test]
    fn test_apply_period_accumulates() {
        let mut state = PositionState::from_params(&ProjectionParameters::default());
        state.apply_period(20_000.0, 5_000.0, 12_000.0, 480.0);

        assert_eq!(state.shares, 10_480.0);
        assert_eq!(state.total_gross_dividends, 20_000.0);
        assert_eq!(state.total_tax, 5_000.0);
        assert_eq!(state.total_dividends, 15_000.0);
        assert_eq!(state.total_reinvested, 12_000.0);
        assert_eq!(state.total_withdrawn, 3_000.0);
    }
}
