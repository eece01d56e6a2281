//! Put option quotes as delivered by the market-data provider

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

use crate::error::{Result, SimulatorError};

/// A single put contract quote
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OptionQuote {
    pub expiry: NaiveDate,
    pub strike: f64,
    pub bid: f64,
    pub ask: f64,

    /// Outstanding contracts (liquidity indicator)
    #[serde(default)]
    pub open_interest: u64,

    #[serde(default)]
    pub volume: u64,

    /// Implied volatility as a decimal (0.85 = 85%)
    #[serde(default)]
    pub implied_volatility: f64,
}

impl OptionQuote {
    pub fn new(expiry: NaiveDate, strike: f64, bid: f64, ask: f64) -> Self {
        Self {
            expiry,
            strike,
            bid,
            ask,
            open_interest: 0,
            volume: 0,
            implied_volatility: 0.0,
        }
    }

    /// Midpoint of bid and ask
    pub fn mid(&self) -> f64 {
        (self.bid + self.ask) / 2.0
    }

    /// Reject quotes that cannot be priced: non-finite or negative strike/bid/ask,
    /// crossed markets. Liquidity and IV fields are informational only.
    pub fn validate(&self) -> Result<()> {
        let fields = [("strike", self.strike), ("bid", self.bid), ("ask", self.ask)];
        for (name, value) in fields {
            if !value.is_finite() || value < 0.0 {
                return Err(SimulatorError::Parse(format!(
                    "{} strike {}: {} is {}",
                    self.expiry, self.strike, name, value
                )));
            }
        }
        if self.bid > self.ask {
            return Err(SimulatorError::Parse(format!(
                "{} strike {}: bid {} above ask {}",
                self.expiry, self.strike, self.bid, self.ask
            )));
        }
        Ok(())
    }
}

/// Option chains keyed by expiry. An `Err` entry marks an expiry the provider
/// could not supply; it is reported as a coverage gap rather than aborting.
pub type OptionChains = BTreeMap<NaiveDate, Result<Vec<OptionQuote>>>;

/// Wrap fully fetched quotes as chains with no gaps
pub fn chains_from_quotes(quotes: Vec<OptionQuote>) -> OptionChains {
    let mut chains: OptionChains = BTreeMap::new();
    for quote in quotes {
        if let Ok(list) = chains.entry(quote.expiry).or_insert_with(|| Ok(Vec::new())) {
            list.push(quote);
        }
    }
    chains
}
