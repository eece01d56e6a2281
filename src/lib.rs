//! DRIP Simulator - dividend reinvestment projections and protective put selection
//!
//! This library provides:
//! - Month-by-month compounding of a share position under dividends, taxes,
//!   and a reinvest-or-withdraw policy, with monthly/yearly/total views
//! - Put hedge ranking by payout per premium dollar across expiries
//! - Weighted average cost basis over share lots
//! - Batch what-if projections
//!
//! The calculators are pure functions of their inputs. Market data arrives
//! through the `MarketDataProvider` trait; files through `loader` and `config`.

pub mod error;
pub mod projection;
pub mod hedge;
pub mod cost_basis;
pub mod market;
pub mod loader;
pub mod config;
pub mod scenario;

// Re-export commonly used types
pub use error::{Result, SimulatorError};
pub use projection::{
    run_projection, AccountType, AggregateRow, PeriodRecord, ProjectionEngine,
    ProjectionParameters, ProjectionResult, ReinvestmentMode, ViewFrequency,
};
pub use hedge::{
    select_hedges, HedgeCandidate, HedgeParameters, HedgeSelection, HedgeSelector, OptionQuote,
};
pub use cost_basis::{weighted_average_cost, Lot};
pub use market::{MarketDataProvider, StaticMarketData};
pub use config::RunConfig;
pub use scenario::ScenarioRunner;
