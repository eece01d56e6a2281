//! Protective put hedge selection

mod params;
mod quote;
mod selector;

pub use params::{HedgeParameters, DEFAULT_CONTRACT_MULTIPLIER, DEFAULT_MAX_COST_PERCENT};
pub use quote::{chains_from_quotes, OptionChains, OptionQuote};
pub use selector::{
    select_hedges, BudgetCheck, CoverageGap, GapReason, HedgeCandidate, HedgeRow, HedgeSelection,
    HedgeSelector,
};
