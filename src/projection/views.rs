//! Monthly / yearly / total views over a projection ledger
//!
//! Views are pure functions over the produced records. Nothing is re-simulated.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use super::ledger::PeriodRecord;
use crate::error::SimulatorError;

/// Granularity of an aggregated view
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ViewFrequency {
    Monthly,
    Yearly,
    Total,
}

impl fmt::Display for ViewFrequency {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            ViewFrequency::Monthly => "monthly",
            ViewFrequency::Yearly => "yearly",
            ViewFrequency::Total => "total",
        };
        f.write_str(s)
    }
}

impl FromStr for ViewFrequency {
    type Err = SimulatorError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "monthly" | "month" => Ok(ViewFrequency::Monthly),
            "yearly" | "year" | "annual" => Ok(ViewFrequency::Yearly),
            "total" => Ok(ViewFrequency::Total),
            other => Err(SimulatorError::Parse(format!("Unknown view frequency: {}", other))),
        }
    }
}

/// One row of an aggregated view
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AggregateRow {
    /// Month number, year number, or "Total"
    pub period: String,
    /// End-of-period share count
    pub shares: f64,
    pub net_dividends: f64,
    pub reinvested: f64,
}

/// Build the requested view
pub fn aggregate(records: &[PeriodRecord], frequency: ViewFrequency) -> Vec<AggregateRow> {
    match frequency {
        ViewFrequency::Monthly => monthly_view(records),
        ViewFrequency::Yearly => yearly_view(records),
        ViewFrequency::Total => total_view(records).into_iter().collect(),
    }
}

/// One row per month
pub fn monthly_view(records: &[PeriodRecord]) -> Vec<AggregateRow> {
    records
        .iter()
        .map(|r| AggregateRow {
            period: r.month.to_string(),
            shares: r.shares,
            net_dividends: r.net_dividend,
            reinvested: r.reinvested,
        })
        .collect()
}

/// One row per projection year. Shares are the last month's snapshot; flows are summed.
pub fn yearly_view(records: &[PeriodRecord]) -> Vec<AggregateRow> {
    let mut rows: Vec<(u32, AggregateRow)> = Vec::new();

    for r in records {
        let same_year = rows.last().map_or(false, |(year, _)| *year == r.year);
        if same_year {
            if let Some((_, row)) = rows.last_mut() {
                row.shares = r.shares;
                row.net_dividends += r.net_dividend;
                row.reinvested += r.reinvested;
            }
        } else {
            rows.push((
                r.year,
                AggregateRow {
                    period: r.year.to_string(),
                    shares: r.shares,
                    net_dividends: r.net_dividend,
                    reinvested: r.reinvested,
                },
            ));
        }
    }

    rows.into_iter().map(|(_, row)| row).collect()
}

/// Single row covering the whole projection. `None` for an empty ledger.
pub fn total_view(records: &[PeriodRecord]) -> Option<AggregateRow> {
    let last = records.last()?;
    Some(AggregateRow {
        period: "Total".to_string(),
        shares: last.shares,
        net_dividends: records.iter().map(|r| r.net_dividend).sum(),
        reinvested: records.iter().map(|r| r.reinvested).sum(),
    })
}
