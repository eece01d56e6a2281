//! Dividend reinvestment projection engine

mod params;
mod state;
mod engine;
mod ledger;
mod views;

pub use params::{AccountType, ProjectionParameters, ReinvestmentMode};
pub use state::PositionState;
pub use engine::{run_projection, ProjectionEngine};
pub use ledger::{PeriodRecord, ProjectionResult, ProjectionSummary};
pub use views::{aggregate, monthly_view, total_view, yearly_view, AggregateRow, ViewFrequency};
