//! DRIP Simulator CLI
//!
//! Command-line front end for projections, hedge comparisons, and cost basis

use anyhow::{bail, Context, Result};
use clap::{Parser, Subcommand};
use serde::Serialize;
use std::path::{Path, PathBuf};

use drip_simulator::config::{HedgeRequest, RunConfig};
use drip_simulator::cost_basis::summarize_lots;
use drip_simulator::hedge::{DEFAULT_CONTRACT_MULTIPLIER, DEFAULT_MAX_COST_PERCENT};
use drip_simulator::loader::{load_lots, load_option_quotes, load_price_history};
use drip_simulator::market::{hedge_for_ticker, MarketDataProvider, StaticMarketData};
use drip_simulator::projection::{aggregate, run_projection, ViewFrequency};
use drip_simulator::ScenarioRunner;

const DEFAULT_TICKER: &str = "MSTY";

#[derive(Parser)]
#[command(name = "drip", version, about = "Dividend reinvestment and put hedge simulator")]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Run a compounding projection
    Project {
        /// JSON run file (defaults are used for missing fields)
        #[arg(long)]
        config: Option<PathBuf>,

        /// monthly, yearly, or total
        #[arg(long, default_value = "yearly")]
        view: ViewFrequency,

        /// Write the view to this CSV file
        #[arg(long)]
        output: Option<PathBuf>,

        /// Print the full result as JSON instead of a table
        #[arg(long)]
        json: bool,
    },

    /// Rank protective puts across expiries
    Hedge {
        /// Options chain CSV (expiry,strike,bid,ask,open_interest,volume,implied_volatility)
        #[arg(long)]
        quotes: PathBuf,

        /// Daily price CSV used for the current price when none is given
        #[arg(long)]
        prices: Option<PathBuf>,

        /// JSON run file; its hedge section supplies defaults for the flags below
        #[arg(long)]
        config: Option<PathBuf>,

        /// Underlying symbol (defaults to hedge.ticker in the config, then MSTY)
        #[arg(long)]
        ticker: Option<String>,

        /// Price at which the position would be sold
        #[arg(long)]
        exit_price: Option<f64>,

        /// Underlying price (defaults to the last close in --prices)
        #[arg(long)]
        current_price: Option<f64>,

        /// Shares to protect (defaults to the projection's initial shares)
        #[arg(long)]
        shares: Option<f64>,

        /// Premium budget as a percent of position value
        #[arg(long)]
        max_cost_pct: Option<f64>,

        /// Write the ranked candidates to this CSV file
        #[arg(long)]
        output: Option<PathBuf>,
    },

    /// Weighted average cost of share lots
    CostBasis {
        /// Lots CSV (shares,price_per_share)
        #[arg(long)]
        lots: PathBuf,
    },

    /// Re-run one projection at several reinvestment prices
    Sweep {
        /// JSON run file with the base projection
        #[arg(long)]
        config: Option<PathBuf>,

        /// Comma-separated reinvestment prices
        #[arg(long, value_delimiter = ',', required = true)]
        prices: Vec<f64>,

        /// Write one summary row per price to this CSV file
        #[arg(long)]
        output: Option<PathBuf>,
    },
}

fn main() -> Result<()> {
    env_logger::init();

    let cli = Cli::parse();
    match cli.command {
        Command::Project { config, view, output, json } => {
            project(config.as_deref(), view, output.as_deref(), json)
        }
        Command::Hedge {
            quotes,
            prices,
            config,
            ticker,
            exit_price,
            current_price,
            shares,
            max_cost_pct,
            output,
        } => {
            let overrides = HedgeOverrides { exit_price, current_price, shares, max_cost_pct };
            hedge(&quotes, prices.as_deref(), config.as_deref(), ticker, overrides, output.as_deref())
        }
        Command::CostBasis { lots } => cost_basis(&lots),
        Command::Sweep { config, prices, output } => sweep(config.as_deref(), &prices, output.as_deref()),
    }
}

fn load_run_config(path: Option<&Path>) -> Result<RunConfig> {
    match path {
        Some(p) => RunConfig::from_path(p).with_context(|| format!("reading config {}", p.display())),
        None => Ok(RunConfig::default()),
    }
}

fn write_csv<T: Serialize>(path: &Path, rows: &[T]) -> Result<()> {
    let mut writer = csv::Writer::from_path(path).with_context(|| format!("creating {}", path.display()))?;
    for row in rows {
        writer.serialize(row)?;
    }
    writer.flush()?;
    println!("\nResults written to: {}", path.display());
    Ok(())
}

fn project(config: Option<&Path>, view: ViewFrequency, output: Option<&Path>, json: bool) -> Result<()> {
    let run = load_run_config(config)?;
    let params = run.projection.to_parameters()?;
    let result = run_projection(&params)?;

    if json {
        println!("{}", serde_json::to_string_pretty(&result)?);
        return Ok(());
    }

    let rows = aggregate(&result.records, view);
    let summary = result.summary();

    println!("DRIP Projection ({} months, {} view)", summary.total_months, view);
    println!("{}", "=".repeat(56));
    println!("{:>8} {:>16} {:>14} {:>14}", "Period", "Shares", "Net Div", "Reinvested");
    println!("{}", "-".repeat(56));
    for row in &rows {
        println!(
            "{:>8} {:>16.2} {:>14.2} {:>14.2}",
            row.period, row.shares, row.net_dividends, row.reinvested
        );
    }

    println!("\nSummary:");
    println!("  Final Share Count:         {:.2}", summary.final_shares);
    println!("  Shares Added:              {:.2}", summary.shares_added);
    println!("  Total Dividends Collected: ${:.2}", summary.total_net_dividends);
    println!("  Total Tax:                 ${:.2}", summary.total_tax);
    println!("  Total Reinvested:          ${:.2}", summary.total_reinvested);
    println!("  Total Withdrawn:           ${:.2}", summary.total_withdrawn);
    println!("  Final Monthly Income:      ${:.2}", summary.final_monthly_income);
    if let Some(yoc) = summary.yield_on_cost_pct {
        println!("  Yield on Cost:             {:.2}%", yoc);
    }

    if let Some(path) = output {
        write_csv(path, &rows)?;
    }
    Ok(())
}

struct HedgeOverrides {
    exit_price: Option<f64>,
    current_price: Option<f64>,
    shares: Option<f64>,
    max_cost_pct: Option<f64>,
}

fn hedge(
    quotes: &Path,
    prices: Option<&Path>,
    config: Option<&Path>,
    ticker: Option<String>,
    overrides: HedgeOverrides,
    output: Option<&Path>,
) -> Result<()> {
    let run = load_run_config(config)?;

    let mut request = match (run.hedge, overrides.exit_price) {
        (Some(req), _) => req,
        (None, Some(exit_price)) => HedgeRequest {
            ticker: None,
            current_price: None,
            exit_price,
            shares_to_hedge: None,
            contract_multiplier: DEFAULT_CONTRACT_MULTIPLIER,
            max_cost_percent: DEFAULT_MAX_COST_PERCENT,
        },
        (None, None) => bail!("an exit price is required (--exit-price or hedge.exit_price in the config)"),
    };
    if let Some(exit_price) = overrides.exit_price {
        request.exit_price = exit_price;
    }
    if overrides.current_price.is_some() {
        request.current_price = overrides.current_price;
    }
    if overrides.shares.is_some() {
        request.shares_to_hedge = overrides.shares;
    }
    if let Some(pct) = overrides.max_cost_pct {
        request.max_cost_percent = pct;
    }
    let ticker = ticker
        .or_else(|| request.ticker.clone())
        .unwrap_or_else(|| DEFAULT_TICKER.to_string());

    let chains = load_option_quotes(quotes).with_context(|| format!("loading quotes {}", quotes.display()))?;
    let bars = match prices {
        Some(p) => load_price_history(p).with_context(|| format!("loading prices {}", p.display()))?,
        None => Vec::new(),
    };
    let provider = StaticMarketData::new(ticker.as_str(), bars, chains);

    let current_price = match request.current_price {
        Some(price) => price,
        None => provider
            .current_price(&ticker)
            .context("no --current-price given and no price history to fall back on")?,
    };
    let params = request.to_parameters(current_price, run.projection.initial_shares)?;
    let selection = hedge_for_ticker(&provider, &ticker, &params)?;

    println!(
        "Hedge Comparison: {} @ ${:.2}, exit ${:.2}, {} shares",
        ticker, params.current_price, params.exit_price, params.shares_to_hedge
    );
    println!("{}", "=".repeat(84));
    println!(
        "{:>10} {:>8} {:>8} {:>9} {:>10} {:>12} {:>10} {:>8}",
        "Expiry", "Strike", "Mid", "Contracts", "Cost", "Cash Out", "Score", "OI"
    );
    println!("{}", "-".repeat(84));
    let rows = selection.rows();
    for row in &rows {
        println!(
            "{:>10} {:>8.2} {:>8.2} {:>9} {:>10.2} {:>12.2} {:>10.2} {:>8}{}",
            row.expiry.to_string(),
            row.strike,
            row.mid,
            row.contracts,
            row.cost,
            row.cash_out,
            row.value_score,
            row.open_interest,
            if row.overall_best { "  *" } else { "" },
        );
    }

    for gap in &selection.gaps {
        println!("  No candidate for {}: {}", gap.expiry, gap.reason);
    }

    match &selection.overall_best {
        Some(best) => {
            println!(
                "\nBest: {} strike {:.2}, cost ${:.2} (budget ${:.2})",
                best.expiry, best.quote.strike, best.cost, selection.budget.max_cost_allowed
            );
            if selection.budget.over_budget {
                println!("  WARNING: best hedge exceeds the maximum cost budget");
            }
        }
        None => println!("\nNo qualifying hedge found"),
    }

    if let Some(path) = output {
        write_csv(path, &rows)?;
    }
    Ok(())
}

fn cost_basis(lots_path: &Path) -> Result<()> {
    let lots = load_lots(lots_path).with_context(|| format!("loading lots {}", lots_path.display()))?;
    let summary = summarize_lots(&lots)?;

    println!("Cost Basis ({} lots)", summary.lot_count);
    println!("  Total Shares:          {:.4}", summary.total_shares);
    println!("  Total Cost:            ${:.2}", summary.total_cost);
    println!("  Weighted Average Cost: ${:.4}", summary.average_cost);
    Ok(())
}

#[derive(Serialize)]
struct SweepRow {
    reinvestment_price: f64,
    final_shares: f64,
    total_net_dividends: f64,
    total_reinvested: f64,
    final_monthly_income: f64,
}

fn sweep(config: Option<&Path>, prices: &[f64], output: Option<&Path>) -> Result<()> {
    let run = load_run_config(config)?;
    let runner = ScenarioRunner::new(run.projection.to_parameters()?);

    let mut rows = Vec::with_capacity(prices.len());
    for (price, result) in prices.iter().zip(runner.run_price_sweep(prices)) {
        let result = result.with_context(|| format!("reinvestment price {}", price))?;
        let summary = result.summary();
        rows.push(SweepRow {
            reinvestment_price: *price,
            final_shares: summary.final_shares,
            total_net_dividends: summary.total_net_dividends,
            total_reinvested: summary.total_reinvested,
            final_monthly_income: summary.final_monthly_income,
        });
    }

    println!("{:>10} {:>16} {:>16} {:>16}", "Price", "Final Shares", "Net Dividends", "Monthly Income");
    println!("{}", "-".repeat(62));
    for row in &rows {
        println!(
            "{:>10.2} {:>16.2} {:>16.2} {:>16.2}",
            row.reinvestment_price, row.final_shares, row.total_net_dividends, row.final_monthly_income
        );
    }

    if let Some(path) = output {
        write_csv(path, &rows)?;
    }
    Ok(())
}
