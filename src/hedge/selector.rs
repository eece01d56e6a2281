//! Protective put selection across expiries
//!
//! Each expiry is scored independently: quotes struck at or above the exit price
//! are sized to the hedged share count and ranked by payout per premium dollar.
//! Expiries that cannot produce a candidate are reported as coverage gaps and
//! never abort the comparison.

use chrono::NaiveDate;
use log::{debug, info, warn};
use serde::{Deserialize, Serialize};
use std::cmp::Ordering;
use std::collections::BTreeMap;
use std::fmt;

use super::params::HedgeParameters;
use super::quote::{OptionChains, OptionQuote};
use crate::error::{Result, SimulatorError};

/// Best contract found for one expiry
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HedgeCandidate {
    pub expiry: NaiveDate,
    pub quote: OptionQuote,
    pub mid: f64,
    pub contracts: u64,
    /// Premium: mid * contracts
    pub cost: f64,
    /// Payout if the position is sold at the exit price
    pub cash_out: f64,
    /// cash_out / cost
    pub value_score: f64,
}

impl HedgeCandidate {
    /// Ranking order: higher score, then lower cost, then lower strike
    fn rank(&self, other: &Self) -> Ordering {
        self.value_score
            .total_cmp(&other.value_score)
            .then_with(|| other.cost.total_cmp(&self.cost))
            .then_with(|| other.quote.strike.total_cmp(&self.quote.strike))
    }
}

/// Why an expiry produced no candidate
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", content = "detail", rename_all = "snake_case")]
pub enum GapReason {
    /// Provider failed to supply the chain
    DataUnavailable(String),
    /// Chain contained a quote that could not be priced
    MalformedQuote(String),
    /// Every strike is below the exit price
    NoStrikeAtOrAboveExit,
    /// Qualifying quotes exist but none has a positive cost, so no value score
    UndefinedValueScore,
}

impl fmt::Display for GapReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            GapReason::DataUnavailable(detail) => write!(f, "data unavailable: {}", detail),
            GapReason::MalformedQuote(detail) => write!(f, "malformed quote: {}", detail),
            GapReason::NoStrikeAtOrAboveExit => f.write_str("no strike at or above exit price"),
            GapReason::UndefinedValueScore => f.write_str("no quote with positive cost"),
        }
    }
}

/// An expiry without a candidate
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CoverageGap {
    pub expiry: NaiveDate,
    pub reason: GapReason,
}

/// Advisory comparison of the overall best premium against the budget
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BudgetCheck {
    pub max_cost_allowed: f64,
    pub over_budget: bool,
}

/// Flat table row for presentation/export
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HedgeRow {
    pub expiry: NaiveDate,
    pub strike: f64,
    pub bid: f64,
    pub ask: f64,
    pub mid: f64,
    pub contracts: u64,
    pub cost: f64,
    pub cash_out: f64,
    pub value_score: f64,
    pub open_interest: u64,
    pub volume: u64,
    pub implied_volatility: f64,
    pub cost_pct_of_position: f64,
    pub overall_best: bool,
}

/// Result of a hedge comparison
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HedgeSelection {
    pub per_expiry: BTreeMap<NaiveDate, HedgeCandidate>,
    pub overall_best: Option<HedgeCandidate>,
    pub gaps: Vec<CoverageGap>,
    pub budget: BudgetCheck,
    pub position_value: f64,
}

impl HedgeSelection {
    /// One row per expiry winner, in expiry order
    pub fn rows(&self) -> Vec<HedgeRow> {
        self.per_expiry
            .values()
            .map(|c| HedgeRow {
                expiry: c.expiry,
                strike: c.quote.strike,
                bid: c.quote.bid,
                ask: c.quote.ask,
                mid: c.mid,
                contracts: c.contracts,
                cost: c.cost,
                cash_out: c.cash_out,
                value_score: c.value_score,
                open_interest: c.quote.open_interest,
                volume: c.quote.volume,
                implied_volatility: c.quote.implied_volatility,
                cost_pct_of_position: if self.position_value > 0.0 {
                    c.cost / self.position_value * 100.0
                } else {
                    0.0
                },
                overall_best: self.overall_best.as_ref() == Some(c),
            })
            .collect()
    }
}

/// Ranks put quotes for a validated set of hedge parameters
#[derive(Debug, Clone)]
pub struct HedgeSelector {
    params: HedgeParameters,
}

impl HedgeSelector {
    /// Create a selector. Fails with `InvalidParameter` on bad inputs.
    pub fn new(params: HedgeParameters) -> Result<Self> {
        params.validate()?;
        Ok(Self { params })
    }

    pub fn params(&self) -> &HedgeParameters {
        &self.params
    }

    /// Select the best contract per expiry and overall
    pub fn select(&self, chains: &OptionChains) -> HedgeSelection {
        let mut per_expiry = BTreeMap::new();
        let mut gaps = Vec::new();

        for (&expiry, chain) in chains {
            let outcome = match chain {
                Ok(quotes) => self.best_for_expiry(expiry, quotes),
                Err(SimulatorError::Parse(detail)) => Err(GapReason::MalformedQuote(detail.clone())),
                Err(e) => Err(GapReason::DataUnavailable(e.to_string())),
            };

            match outcome {
                Ok(candidate) => {
                    per_expiry.insert(expiry, candidate);
                }
                Err(reason) => {
                    warn!("No hedge candidate for {}: {}", expiry, reason);
                    gaps.push(CoverageGap { expiry, reason });
                }
            }
        }

        // Strictly-greater replacement keeps the earliest expiry on a full tie
        let mut overall_best: Option<&HedgeCandidate> = None;
        for candidate in per_expiry.values() {
            if overall_best.map_or(true, |best| candidate.rank(best) == Ordering::Greater) {
                overall_best = Some(candidate);
            }
        }
        let overall_best = overall_best.cloned();

        let max_cost_allowed = self.params.max_cost_allowed();
        let over_budget = overall_best
            .as_ref()
            .map_or(false, |best| best.cost > max_cost_allowed);

        if let Some(best) = &overall_best {
            info!(
                "Best hedge: {} strike {} x{} cost ${:.2} score {:.2}",
                best.expiry, best.quote.strike, best.contracts, best.cost, best.value_score
            );
            if over_budget {
                warn!(
                    "Best hedge cost ${:.2} exceeds budget ${:.2}",
                    best.cost, max_cost_allowed
                );
            }
        }

        HedgeSelection {
            per_expiry,
            overall_best,
            gaps,
            budget: BudgetCheck {
                max_cost_allowed,
                over_budget,
            },
            position_value: self.params.position_value(),
        }
    }

    /// Score one expiry's quotes and pick the winner
    fn best_for_expiry(
        &self,
        expiry: NaiveDate,
        quotes: &[OptionQuote],
    ) -> std::result::Result<HedgeCandidate, GapReason> {
        // A single bad quote invalidates the whole expiry
        for quote in quotes {
            quote
                .validate()
                .map_err(|e| GapReason::MalformedQuote(e.to_string()))?;
        }

        let qualifying: Vec<&OptionQuote> = quotes
            .iter()
            .filter(|q| q.strike >= self.params.exit_price)
            .collect();
        if qualifying.is_empty() {
            return Err(GapReason::NoStrikeAtOrAboveExit);
        }

        qualifying
            .into_iter()
            .filter_map(|q| self.score(expiry, q))
            .max_by(|a, b| a.rank(b))
            .ok_or(GapReason::UndefinedValueScore)
    }

    /// Size and score a single quote. `None` when the cost is not positive.
    fn score(&self, expiry: NaiveDate, quote: &OptionQuote) -> Option<HedgeCandidate> {
        let mid = quote.mid();
        let contracts = self.params.contracts();
        let cost = mid * contracts as f64;
        let cash_out = contracts as f64
            * self.params.contract_multiplier as f64
            * (quote.strike - self.params.exit_price);

        if cost <= 0.0 {
            debug!("{} strike {}: zero cost, skipped", expiry, quote.strike);
            return None;
        }

        let value_score = cash_out / cost;
        debug!(
            "{} strike {}: mid={:.4} cost={:.2} cash_out={:.2} score={:.4}",
            expiry, quote.strike, mid, cost, cash_out, value_score
        );

        Some(HedgeCandidate {
            expiry,
            quote: quote.clone(),
            mid,
            contracts,
            cost,
            cash_out,
            value_score,
        })
    }
}

/// Validate `params` and select hedges in one call
pub fn select_hedges(chains: &OptionChains, params: &HedgeParameters) -> Result<HedgeSelection> {
    Ok(HedgeSelector::new(params.clone())?.select(chains))
}
