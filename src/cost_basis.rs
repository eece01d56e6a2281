//! Weighted average cost basis over share lots

use serde::{Deserialize, Serialize};

use crate::error::{ensure_at_least, Result, SimulatorError};

/// A block of shares bought at one price
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Lot {
    pub shares: f64,
    pub price_per_share: f64,
}

impl Lot {
    pub fn new(shares: f64, price_per_share: f64) -> Self {
        Self { shares, price_per_share }
    }

    pub fn cost(&self) -> f64 {
        self.shares * self.price_per_share
    }

    fn validate(&self, index: usize) -> Result<()> {
        ensure_at_least(&format!("lots[{}].shares", index), self.shares, 0.0)?;
        ensure_at_least(&format!("lots[{}].price_per_share", index), self.price_per_share, 0.0)
    }
}

/// Aggregate view of a set of lots
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CostBasisSummary {
    pub lot_count: usize,
    pub total_shares: f64,
    pub total_cost: f64,
    pub average_cost: f64,
}

/// Total cost divided by total shares.
///
/// Fails with `InvalidParameter` for negative or non-finite lots and with
/// `Undefined` when there are no shares at all.
pub fn weighted_average_cost(lots: &[Lot]) -> Result<f64> {
    Ok(summarize_lots(lots)?.average_cost)
}

pub fn summarize_lots(lots: &[Lot]) -> Result<CostBasisSummary> {
    for (i, lot) in lots.iter().enumerate() {
        lot.validate(i)?;
    }

    let total_shares: f64 = lots.iter().map(|l| l.shares).sum();
    let total_cost: f64 = lots.iter().map(Lot::cost).sum();

    if total_shares <= 0.0 {
        return Err(SimulatorError::Undefined(
            "weighted average cost of zero total shares".to_string(),
        ));
    }

    Ok(CostBasisSummary {
        lot_count: lots.len(),
        total_shares,
        total_cost,
        average_cost: total_cost / total_shares,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn test_weighted_average() {
        let lots = vec![Lot::new(100.0, 20.0), Lot::new(300.0, 30.0)];
        // (2,000 + 9,000) / 400
        assert_relative_eq!(weighted_average_cost(&lots).unwrap(), 27.5);
    }

    #[test]
    fn test_order_independent() {
        let lots = vec![Lot::new(100.0, 20.0), Lot::new(300.0, 30.0), Lot::new(50.0, 41.25)];
        let mut reversed = lots.clone();
        reversed.reverse();

        assert_relative_eq!(
            weighted_average_cost(&lots).unwrap(),
            weighted_average_cost(&reversed).unwrap(),
            epsilon = 1e-12
        );
    }

    #[test]
    fn test_splitting_a_lot_is_additive() {
        let whole = vec![Lot::new(400.0, 25.0), Lot::new(100.0, 40.0)];
        let split = vec![Lot::new(150.0, 25.0), Lot::new(250.0, 25.0), Lot::new(100.0, 40.0)];

        assert_relative_eq!(
            weighted_average_cost(&whole).unwrap(),
            weighted_average_cost(&split).unwrap(),
            epsilon = 1e-12
        );
    }

    #[test]
    fn test_zero_shares_is_undefined() {
        assert!(matches!(weighted_average_cost(&[]), Err(SimulatorError::Undefined(_))));
        assert!(matches!(
            weighted_average_cost(&[Lot::new(0.0, 25.0), Lot::new(0.0, 30.0)]),
            Err(SimulatorError::Undefined(_))
        ));
    }

    #[test]
    fn test_negative_lot_is_invalid() {
        match weighted_average_cost(&[Lot::new(100.0, 20.0), Lot::new(-5.0, 20.0)]) {
            Err(SimulatorError::InvalidParameter { field, .. }) => assert_eq!(field, "lots[1].shares"),
            other => panic!("expected InvalidParameter, got {:?}", other),
        }
    }

    #[test]
    fn test_summary() {
        let lots = vec![Lot::new(100.0, 20.0), Lot::new(300.0, 30.0), Lot::new(0.0, 99.0)];
        let summary = summarize_lots(&lots).unwrap();

        assert_eq!(summary.lot_count, 3);
        assert_relative_eq!(summary.total_shares, 400.0);
        assert_relative_eq!(summary.total_cost, 11_000.0);
        assert_relative_eq!(summary.average_cost, 27.5);
    }
}
