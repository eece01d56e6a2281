//! Scenario runner for batch projections
//!
//! Holds a base parameter set and runs many variations of it. Projections are
//! independent and stateless, so batches fan out over the rayon thread pool.

use rayon::prelude::*;

use crate::error::Result;
use crate::projection::{run_projection, ProjectionParameters, ProjectionResult};

/// Runner for what-if projections around a base parameter set
///
/// # Example
/// ```ignore
/// let runner = ScenarioRunner::new(ProjectionParameters::default());
///
/// // Same position, different reinvestment prices
/// for result in runner.run_price_sweep(&[20.0, 25.0, 30.0]) {
///     println!("{:.2}", result?.final_shares());
/// }
/// ```
#[derive(Debug, Clone)]
pub struct ScenarioRunner {
    base_params: ProjectionParameters,
}

impl ScenarioRunner {
    pub fn new(base_params: ProjectionParameters) -> Self {
        Self { base_params }
    }

    /// Run the base parameters
    pub fn run_base(&self) -> Result<ProjectionResult> {
        run_projection(&self.base_params)
    }

    /// Run a single projection with the given parameters
    pub fn run(&self, params: &ProjectionParameters) -> Result<ProjectionResult> {
        run_projection(params)
    }

    /// Run many parameter sets in parallel. Results come back in input order and
    /// an invalid scenario only fails its own slot.
    pub fn run_scenarios(&self, scenarios: &[ProjectionParameters]) -> Vec<Result<ProjectionResult>> {
        scenarios.par_iter().map(run_projection).collect()
    }

    /// Run the base parameters at each reinvestment price
    pub fn run_price_sweep(&self, prices: &[f64]) -> Vec<Result<ProjectionResult>> {
        let scenarios: Vec<ProjectionParameters> = prices
            .iter()
            .map(|&price| self.base_params.with_reinvestment_price(price))
            .collect();
        self.run_scenarios(&scenarios)
    }

    pub fn base_params(&self) -> &ProjectionParameters {
        &self.base_params
    }

    /// Mutable access for adjusting the base before a batch
    pub fn base_params_mut(&mut self) -> &mut ProjectionParameters {
        &mut self.base_params
    }
}

impl Default for ScenarioRunner {
    fn default() -> Self {
        Self::new(ProjectionParameters::default())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::SimulatorError;
    use crate::projection::ReinvestmentMode;

    #[test]
    fn test_price_sweep_orders_results() {
        let runner = ScenarioRunner::default();
        let results = runner.run_price_sweep(&[20.0, 25.0, 30.0]);

        assert_eq!(results.len(), 3);
        let finals: Vec<f64> = results.iter().map(|r| r.as_ref().unwrap().final_shares()).collect();

        // Cheaper reinvestment buys more shares
        assert!(finals[0] > finals[1]);
        assert!(finals[1] > finals[2]);
        assert_eq!(results[1].as_ref().unwrap().params.reinvestment_price, 25.0);
    }

    #[test]
    fn test_invalid_scenario_is_isolated() {
        let runner = ScenarioRunner::default();
        let results = runner.run_price_sweep(&[25.0, 0.0]);

        assert!(results[0].is_ok());
        assert!(matches!(results[1], Err(SimulatorError::InvalidParameter { .. })));
    }

    #[test]
    fn test_parallel_matches_sequential() {
        let runner = ScenarioRunner::default();
        let scenarios: Vec<_> = [0.0, 50.0, 100.0]
            .iter()
            .map(|&percent| ProjectionParameters {
                holding_periods: 60,
                reinvestment_mode: ReinvestmentMode::Reinvest { percent },
                ..Default::default()
            })
            .collect();

        let parallel = runner.run_scenarios(&scenarios);
        for (params, result) in scenarios.iter().zip(&parallel) {
            let sequential = runner.run(params).unwrap();
            assert_eq!(result.as_ref().unwrap().records, sequential.records);
        }
    }

    #[test]
    fn test_base_params_mut() {
        let mut runner = ScenarioRunner::default();
        runner.base_params_mut().holding_periods = 6;
        assert_eq!(runner.run_base().unwrap().records.len(), 6);
    }
}
