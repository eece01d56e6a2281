//! Market-data provider seam
//!
//! The calculators never fetch anything themselves. A provider supplies prices
//! and option chains; per-expiry failures are recorded as data gaps so one bad
//! expiry cannot abort a whole hedge comparison.

use chrono::NaiveDate;
use log::{debug, warn};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

use crate::error::{Result, SimulatorError};
use crate::hedge::{HedgeParameters, HedgeSelection, HedgeSelector, OptionChains, OptionQuote};

/// One daily OHLCV bar
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PriceBar {
    pub date: NaiveDate,
    pub open: f64,
    pub high: f64,
    pub low: f64,
    pub close: f64,
    pub volume: u64,
}

/// Source of quotes for a ticker
///
/// Implement this trait to plug in a live feed or a recorded snapshot.
pub trait MarketDataProvider {
    /// Latest underlying price
    fn current_price(&self, ticker: &str) -> Result<f64>;

    /// Daily bars, oldest first
    fn price_history(&self, ticker: &str) -> Result<Vec<PriceBar>>;

    /// Listed option expiries
    fn expirations(&self, ticker: &str) -> Result<Vec<NaiveDate>>;

    /// Put quotes for one expiry
    fn option_chain(&self, ticker: &str, expiry: NaiveDate) -> Result<Vec<OptionQuote>>;
}

/// Fetch every listed expiry. Failed expiries become `DataGap` entries instead
/// of errors (malformed quotes keep their `Parse` cause); only a failure to
/// list expiries at all is returned as an error.
pub fn collect_chains<P: MarketDataProvider + ?Sized>(provider: &P, ticker: &str) -> Result<OptionChains> {
    let expiries = provider.expirations(ticker)?;
    let mut chains: OptionChains = BTreeMap::new();

    for expiry in expiries {
        let chain = provider.option_chain(ticker, expiry).map_err(|e| match e {
            kept @ (SimulatorError::DataGap { .. } | SimulatorError::Parse(_)) => kept,
            other => SimulatorError::data_gap(expiry.to_string(), other.to_string()),
        });
        match &chain {
            Ok(quotes) => debug!("{} {}: {} quotes", ticker, expiry, quotes.len()),
            Err(e) => warn!("{} {}: {}", ticker, expiry, e),
        }
        chains.insert(expiry, chain);
    }

    Ok(chains)
}

/// Validate the parameters, fetch all chains, and run the hedge selection
pub fn hedge_for_ticker<P: MarketDataProvider + ?Sized>(
    provider: &P,
    ticker: &str,
    params: &HedgeParameters,
) -> Result<HedgeSelection> {
    let selector = HedgeSelector::new(params.clone())?;
    let chains = collect_chains(provider, ticker)?;
    Ok(selector.select(&chains))
}

/// Provider backed by a recorded snapshot (CSV exports, test fixtures)
#[derive(Debug, Clone)]
pub struct StaticMarketData {
    ticker: String,
    bars: Vec<PriceBar>,
    chains: BTreeMap<NaiveDate, std::result::Result<Vec<OptionQuote>, ChainFault>>,
}

/// Why a recorded expiry has no quotes
#[derive(Debug, Clone)]
enum ChainFault {
    Unavailable(String),
    Malformed(String),
}

impl StaticMarketData {
    /// Build from bars (any order) and chains as loaded
    pub fn new(ticker: impl Into<String>, mut bars: Vec<PriceBar>, chains: OptionChains) -> Self {
        bars.sort_by_key(|b| b.date);
        let chains = chains
            .into_iter()
            .map(|(expiry, chain)| {
                let chain = chain.map_err(|e| match e {
                    SimulatorError::DataGap { reason, .. } => ChainFault::Unavailable(reason),
                    SimulatorError::Parse(detail) => ChainFault::Malformed(detail),
                    other => ChainFault::Unavailable(other.to_string()),
                });
                (expiry, chain)
            })
            .collect();
        Self {
            ticker: ticker.into(),
            bars,
            chains,
        }
    }

    fn check_ticker(&self, ticker: &str) -> Result<()> {
        if ticker.eq_ignore_ascii_case(&self.ticker) {
            Ok(())
        } else {
            Err(SimulatorError::data_gap(ticker, "ticker not in snapshot"))
        }
    }
}

impl MarketDataProvider for StaticMarketData {
    fn current_price(&self, ticker: &str) -> Result<f64> {
        self.check_ticker(ticker)?;
        self.bars
            .last()
            .map(|b| b.close)
            .ok_or_else(|| SimulatorError::data_gap(ticker, "no price history"))
    }

    fn price_history(&self, ticker: &str) -> Result<Vec<PriceBar>> {
        self.check_ticker(ticker)?;
        Ok(self.bars.clone())
    }

    fn expirations(&self, ticker: &str) -> Result<Vec<NaiveDate>> {
        self.check_ticker(ticker)?;
        Ok(self.chains.keys().copied().collect())
    }

    fn option_chain(&self, ticker: &str, expiry: NaiveDate) -> Result<Vec<OptionQuote>> {
        self.check_ticker(ticker)?;
        match self.chains.get(&expiry) {
            Some(Ok(quotes)) => Ok(quotes.clone()),
            Some(Err(ChainFault::Unavailable(reason))) => {
                Err(SimulatorError::data_gap(expiry.to_string(), reason.clone()))
            }
            Some(Err(ChainFault::Malformed(detail))) => Err(SimulatorError::Parse(detail.clone())),
            None => Err(SimulatorError::data_gap(expiry.to_string(), "expiry not listed")),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::hedge::{chains_from_quotes, GapReason};

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    fn bar(date: NaiveDate, close: f64) -> PriceBar {
        PriceBar { date, open: close, high: close, low: close, close, volume: 100 }
    }

    /// Lists an expiry it cannot deliver
    struct FlakyProvider {
        inner: StaticMarketData,
        broken: NaiveDate,
    }

    impl MarketDataProvider for FlakyProvider {
        fn current_price(&self, ticker: &str) -> Result<f64> {
            self.inner.current_price(ticker)
        }
        fn price_history(&self, ticker: &str) -> Result<Vec<PriceBar>> {
            self.inner.price_history(ticker)
        }
        fn expirations(&self, ticker: &str) -> Result<Vec<NaiveDate>> {
            let mut expiries = self.inner.expirations(ticker)?;
            expiries.push(self.broken);
            Ok(expiries)
        }
        fn option_chain(&self, ticker: &str, expiry: NaiveDate) -> Result<Vec<OptionQuote>> {
            if expiry == self.broken {
                return Err(SimulatorError::Io(std::io::Error::new(
                    std::io::ErrorKind::TimedOut,
                    "request timed out",
                )));
            }
            self.inner.option_chain(ticker, expiry)
        }
    }

    fn snapshot() -> StaticMarketData {
        let june = date(2025, 6, 20);
        StaticMarketData::new(
            "MSTY",
            vec![bar(date(2025, 3, 4), 22.0), bar(date(2025, 3, 3), 21.0)],
            chains_from_quotes(vec![OptionQuote::new(june, 30.0, 2.0, 3.0)]),
        )
    }

    #[test]
    fn test_static_provider() {
        let data = snapshot();
        assert_eq!(data.current_price("msty").unwrap(), 22.0);
        assert_eq!(data.price_history("MSTY").unwrap().len(), 2);
        assert_eq!(data.expirations("MSTY").unwrap(), vec![date(2025, 6, 20)]);
        assert!(matches!(data.current_price("SPY"), Err(SimulatorError::DataGap { .. })));
        assert!(data.option_chain("MSTY", date(2025, 7, 18)).is_err());
    }

    #[test]
    fn test_collect_chains_tolerates_failed_expiry() {
        let provider = FlakyProvider { inner: snapshot(), broken: date(2025, 7, 18) };
        let chains = collect_chains(&provider, "MSTY").unwrap();

        assert_eq!(chains.len(), 2);
        assert!(chains[&date(2025, 6, 20)].is_ok());
        assert!(matches!(chains[&date(2025, 7, 18)], Err(SimulatorError::DataGap { .. })));
    }

    #[test]
    fn test_hedge_for_ticker_reports_gap() {
        let provider = FlakyProvider { inner: snapshot(), broken: date(2025, 7, 18) };
        let params = HedgeParameters::new(22.0, 10.0, 1000.0);

        let selection = hedge_for_ticker(&provider, "MSTY", &params).unwrap();
        assert_eq!(selection.overall_best.unwrap().expiry, date(2025, 6, 20));
        assert_eq!(selection.gaps.len(), 1);
        assert!(matches!(selection.gaps[0].reason, GapReason::DataUnavailable(_)));
    }

    #[test]
    fn test_malformed_chain_survives_the_snapshot() {
        let june = date(2025, 6, 20);
        let july = date(2025, 7, 18);
        let mut chains = chains_from_quotes(vec![OptionQuote::new(june, 30.0, 2.0, 3.0)]);
        chains.insert(july, Err(SimulatorError::Parse("malformed quote on row 3".to_string())));
        let data = StaticMarketData::new("MSTY", vec![bar(date(2025, 3, 4), 22.0)], chains);

        let selection = hedge_for_ticker(&data, "MSTY", &HedgeParameters::new(22.0, 10.0, 1000.0)).unwrap();
        assert_eq!(selection.overall_best.unwrap().expiry, june);
        assert_eq!(selection.gaps.len(), 1);
        assert_eq!(selection.gaps[0].expiry, july);
        assert_eq!(
            selection.gaps[0].reason,
            GapReason::MalformedQuote("malformed quote on row 3".to_string())
        );
    }

    #[test]
    fn test_unknown_ticker_is_an_error() {
        let params = HedgeParameters::new(22.0, 10.0, 1000.0);
        assert!(matches!(
            hedge_for_ticker(&snapshot(), "SPY", &params),
            Err(SimulatorError::DataGap { .. })
        ));
    }
}
