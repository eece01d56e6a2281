//! CSV loaders for share lots, option quotes, and daily price bars
//!
//! These sit outside the calculators: they turn files into the plain values the
//! projection, hedge, and cost basis code consume.

use chrono::NaiveDate;
use csv::{ByteRecord, Reader, ReaderBuilder};
use log::warn;
use std::collections::BTreeMap;
use std::path::Path;

use crate::cost_basis::Lot;
use crate::error::{Result, SimulatorError};
use crate::hedge::{OptionChains, OptionQuote};
use crate::market::PriceBar;

const DATE_FORMAT: &str = "%Y-%m-%d";

/// Load lots from a CSV file with `shares,price_per_share` columns
pub fn load_lots<P: AsRef<Path>>(path: P) -> Result<Vec<Lot>> {
    collect_rows(Reader::from_path(path)?)
}

/// Load lots from any reader (e.g., string buffer)
pub fn load_lots_from_reader<R: std::io::Read>(reader: R) -> Result<Vec<Lot>> {
    collect_rows(Reader::from_reader(reader))
}

/// Load daily bars from a CSV file with `date,open,high,low,close,volume` columns
pub fn load_price_history<P: AsRef<Path>>(path: P) -> Result<Vec<PriceBar>> {
    let mut bars: Vec<PriceBar> = collect_rows(Reader::from_path(path)?)?;
    bars.sort_by_key(|b| b.date);
    Ok(bars)
}

pub fn load_price_history_from_reader<R: std::io::Read>(reader: R) -> Result<Vec<PriceBar>> {
    let mut bars: Vec<PriceBar> = collect_rows(Reader::from_reader(reader))?;
    bars.sort_by_key(|b| b.date);
    Ok(bars)
}

fn collect_rows<T, R>(mut reader: Reader<R>) -> Result<Vec<T>>
where
    T: serde::de::DeserializeOwned,
    R: std::io::Read,
{
    let mut rows = Vec::new();
    for result in reader.deserialize() {
        let row: T = result?;
        rows.push(row);
    }
    Ok(rows)
}

/// Raw CSV row of an options chain export. Fields stay as text so one bad
/// value only poisons its own expiry. Short rows are padded with empty fields.
#[derive(Debug, serde::Deserialize)]
struct QuoteRow {
    expiry: String,
    strike: String,
    bid: String,
    ask: String,
    #[serde(default, alias = "openInterest")]
    open_interest: String,
    #[serde(default)]
    volume: String,
    #[serde(default, alias = "impliedVolatility")]
    implied_volatility: String,
}

impl QuoteRow {
    fn to_quote(&self, expiry: NaiveDate) -> Result<OptionQuote> {
        Ok(OptionQuote {
            expiry,
            strike: parse_f64("strike", &self.strike)?,
            bid: parse_f64("bid", &self.bid)?,
            ask: parse_f64("ask", &self.ask)?,
            open_interest: parse_count("open_interest", &self.open_interest)?,
            volume: parse_count("volume", &self.volume)?,
            implied_volatility: parse_optional_f64("implied_volatility", &self.implied_volatility)?,
        })
    }
}

fn parse_f64(field: &str, raw: &str) -> Result<f64> {
    if raw.trim().is_empty() {
        return Err(SimulatorError::Parse(format!("{}: missing", field)));
    }
    raw.trim()
        .parse::<f64>()
        .map_err(|_| SimulatorError::Parse(format!("{}: not a number: {:?}", field, raw)))
}

fn parse_optional_f64(field: &str, raw: &str) -> Result<f64> {
    if raw.trim().is_empty() {
        Ok(0.0)
    } else {
        parse_f64(field, raw)
    }
}

/// Counts are often exported as floats ("1234.0") or left blank
fn parse_count(field: &str, raw: &str) -> Result<u64> {
    let value = parse_optional_f64(field, raw)?;
    if !value.is_finite() || value < 0.0 || value.fract() != 0.0 || value >= u64::MAX as f64 {
        return Err(SimulatorError::Parse(format!("{}: not a whole count: {:?}", field, raw)));
    }
    Ok(value as u64)
}

/// Load an options chain export from a CSV file, grouped by expiry
pub fn load_option_quotes<P: AsRef<Path>>(path: P) -> Result<OptionChains> {
    group_quotes(ReaderBuilder::new().flexible(true).from_path(path)?)
}

pub fn load_option_quotes_from_reader<R: std::io::Read>(reader: R) -> Result<OptionChains> {
    group_quotes(ReaderBuilder::new().flexible(true).from_reader(reader))
}

fn group_quotes<R: std::io::Read>(mut reader: Reader<R>) -> Result<OptionChains> {
    let headers = reader.byte_headers()?.clone();
    let expiry_col = headers
        .iter()
        .position(|h| String::from_utf8_lossy(h).trim() == "expiry")
        .ok_or_else(|| SimulatorError::Parse("options chain has no expiry column".to_string()))?;

    let mut chains: OptionChains = BTreeMap::new();

    for (line, result) in reader.byte_records().enumerate() {
        let mut record: ByteRecord = result?;
        while record.len() < headers.len() {
            record.push_field(b"");
        }
        let raw_expiry = record.get(expiry_col).map(String::from_utf8_lossy).unwrap_or_default();

        let expiry = match NaiveDate::parse_from_str(raw_expiry.trim(), DATE_FORMAT) {
            Ok(date) => date,
            Err(_) => {
                warn!("Skipping quote row {} with bad expiry {:?}", line + 1, raw_expiry);
                continue;
            }
        };

        let entry = chains.entry(expiry).or_insert_with(|| Ok(Vec::new()));
        if entry.is_err() {
            // Expiry already marked as a gap
            continue;
        }

        let parsed = record
            .deserialize::<QuoteRow>(Some(&headers))
            .map_err(SimulatorError::from)
            .and_then(|row| row.to_quote(expiry));

        match parsed {
            Ok(quote) => {
                if let Ok(quotes) = entry {
                    quotes.push(quote);
                }
            }
            Err(e) => {
                warn!("Expiry {} has a malformed quote on row {}: {}", expiry, line + 1, e);
                *entry = Err(SimulatorError::Parse(format!("malformed quote on row {}: {}", line + 1, e)));
            }
        }
    }

    Ok(chains)
}
