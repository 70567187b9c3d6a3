//! Value every company in a CSV or JSON file
//!
//! Writes one output row per input record, in input order. Records that
//! cannot be valued come back as all-zero rows and are counted as failed;
//! set RUST_LOG=warn to see why.
//! Supports JSON output for API integration via --json flag

use anyhow::{Context, Result};
use cfroi_valuation::company::{load_companies, load_companies_from_json, CompanyRecord};
use cfroi_valuation::{ValuationConfig, ValuationResult, ValuationRunner};
use clap::Parser;
use serde::Serialize;
use std::fs::File;
use std::path::PathBuf;
use std::time::Instant;

#[derive(Parser, Debug)]
#[command(name = "value_companies", about = "Batch CFROI valuation")]
struct Args {
    /// Input file of company records
    input: PathBuf,

    /// Read the input as a JSON array instead of CSV
    #[arg(long)]
    json_input: bool,

    /// Output CSV path
    #[arg(short, long, default_value = "valuation_output.csv")]
    output: PathBuf,

    /// Print JSON to stdout instead of writing CSV
    #[arg(long)]
    json: bool,

    /// Default fade rate for records without one
    #[arg(long)]
    fade_rate: Option<f64>,

    /// Default cost of capital for records without one
    #[arg(long)]
    cost_of_capital: Option<f64>,

    /// Default inflation adjustment for records without one
    #[arg(long)]
    inflation_adjustment: Option<f64>,
}

#[derive(Serialize)]
struct ValuationRow {
    company: String,
    #[serde(flatten)]
    result: ValuationResult,
}

#[derive(Serialize)]
struct BatchResponse {
    config: ValuationConfig,
    company_count: usize,
    failed: Vec<usize>,
    valuations: Vec<ValuationRow>,
    execution_time_ms: u64,
}

fn config_from_args(args: &Args) -> ValuationConfig {
    let defaults = ValuationConfig::default();
    ValuationConfig {
        inflation_adjustment: args.inflation_adjustment.unwrap_or(defaults.inflation_adjustment),
        fade_rate: args.fade_rate.unwrap_or(defaults.fade_rate),
        cost_of_capital: args.cost_of_capital.unwrap_or(defaults.cost_of_capital),
    }
}

fn load(args: &Args) -> Result<Vec<CompanyRecord>> {
    let companies = if args.json_input {
        let file = File::open(&args.input)
            .with_context(|| format!("Unable to open {}", args.input.display()))?;
        load_companies_from_json(file)?
    } else {
        load_companies(&args.input)?
    };
    Ok(companies)
}

fn main() -> Result<()> {
    env_logger::init();

    let args = Args::parse();
    let start = Instant::now();

    let companies = load(&args)
        .with_context(|| format!("Failed to load companies from {}", args.input.display()))?;
    log::info!("Loaded {} companies in {:?}", companies.len(), start.elapsed());

    let config = config_from_args(&args);
    let runner = ValuationRunner::new(config);
    let batch = runner.run_batch_detailed(&companies);
    let failed = batch.failed;

    let valuations: Vec<ValuationRow> = companies
        .iter()
        .zip(batch.results)
        .enumerate()
        .map(|(i, (record, result))| ValuationRow { company: record.label(i), result })
        .collect();

    if args.json {
        let response = BatchResponse {
            config,
            company_count: valuations.len(),
            failed,
            valuations,
            execution_time_ms: start.elapsed().as_millis() as u64,
        };
        println!("{}", serde_json::to_string_pretty(&response)?);
        return Ok(());
    }

    let mut writer = csv::Writer::from_path(&args.output)
        .with_context(|| format!("Unable to create {}", args.output.display()))?;
    writer.write_record(["company", "cfroi", "economic_profit", "gross_investment", "gross_cash_flow", "asset_life"])?;
    for row in &valuations {
        writer.write_record([
            row.company.clone(),
            format!("{:.6}", row.result.cfroi),
            format!("{:.2}", row.result.economic_profit),
            format!("{:.2}", row.result.gross_investment),
            format!("{:.2}", row.result.gross_cash_flow),
            format!("{:.2}", row.result.asset_life),
        ])?;
    }
    writer.flush()?;

    println!("Valued {} companies ({} failed) in {:?}", valuations.len(), failed.len(), start.elapsed());
    println!("Output written to {}", args.output.display());

    Ok(())
}
