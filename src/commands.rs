//! Command implementations. Each returns the text destined for stdout.

use std::io::Read;
use std::path::Path;

use anyhow::{Context, Result};
use serde::Serialize;
use serde::de::DeserializeOwned;
use venturegrid_engine::engine::{RecalcReport, recalculate_with, try_evaluate};
use venturegrid_engine::{CellRef, Grid};
use venturegrid_finance::{
    CalculatedKpis, FinancialProjectionsAdjusted, Money, Percent, StartupFinancials,
    apply_sensitivity_with, calculate_all_kpis_with,
};

use crate::config::Settings;

/// Position used for `eval` without `--at`. No cell reference text parses to it,
/// so the formula can never refer to itself.
const DETACHED_CELL: CellRef = CellRef::new(usize::MAX, usize::MAX);

#[derive(Debug, Serialize)]
struct KpiOutput {
    adjusted: FinancialProjectionsAdjusted,
    kpis: CalculatedKpis,
}

/// Read JSON from `path`, or from stdin when `path` is `None`.
fn read_json<T: DeserializeOwned>(path: Option<&Path>, what: &str) -> Result<T> {
    match path {
        Some(path) => {
            let content = std::fs::read_to_string(path)
                .with_context(|| format!("Failed to read {} from {}", what, path.display()))?;
            parse_json(&content, what)
        }
        None => {
            let mut content = String::new();
            std::io::stdin()
                .read_to_string(&mut content)
                .with_context(|| format!("Failed to read {} from stdin", what))?;
            parse_json(&content, what)
        }
    }
}

fn parse_json<T: DeserializeOwned>(content: &str, what: &str) -> Result<T> {
    serde_json::from_str(content).with_context(|| format!("Invalid {} JSON", what))
}

/// Evaluate `formula` against a grid and render the result as a JSON number or `null`.
pub fn eval(formula: &str, grid_path: Option<&Path>, at: Option<CellRef>) -> Result<String> {
    let grid = match grid_path {
        Some(path) => read_json::<Grid>(Some(path), "grid")?,
        None => Grid::default(),
    };
    Ok(eval_in(formula, &grid, at))
}

fn eval_in(formula: &str, grid: &Grid, at: Option<CellRef>) -> String {
    let at = at.unwrap_or(DETACHED_CELL);
    match try_evaluate(formula, grid, at) {
        Ok(value) => value.to_string(),
        Err(err) => {
            tracing::info!(formula, error = %err, "formula did not evaluate");
            "null".to_string()
        }
    }
}

/// Recalculate a grid read from `input` (stdin when `None`).
///
/// Returns the recalculated grid as pretty JSON together with the report.
pub fn recalc(input: Option<&Path>, settings: &Settings) -> Result<(String, RecalcReport)> {
    let grid: Grid = read_json(input, "grid")?;
    recalc_grid(&grid, settings)
}

fn recalc_grid(grid: &Grid, settings: &Settings) -> Result<(String, RecalcReport)> {
    let (result, report) = recalculate_with(grid, &settings.recalc_options());
    if !report.failed.is_empty() {
        tracing::info!(failed = report.failed.len(), "some formulas kept their previous value");
    }
    let json = serde_json::to_string_pretty(&result).context("Failed to serialize grid")?;
    Ok((json, report))
}

pub fn report_json(report: &RecalcReport) -> Result<String> {
    serde_json::to_string_pretty(report).context("Failed to serialize recalculation report")
}

/// Apply sensitivity to a financial record read from `input` and compute KPIs.
pub fn kpis(
    input: Option<&Path>,
    revenue_pct: Percent,
    cost_pct: Percent,
    initial_investment: Option<Money>,
    settings: &Settings,
) -> Result<String> {
    let financials: StartupFinancials = read_json(input, "financial record")?;
    kpis_for(&financials, revenue_pct, cost_pct, initial_investment, settings)
}

fn kpis_for(
    financials: &StartupFinancials,
    revenue_pct: Percent,
    cost_pct: Percent,
    initial_investment: Option<Money>,
    settings: &Settings,
) -> Result<String> {
    let assumptions = settings.assumptions();
    let initial_investment = initial_investment.unwrap_or(settings.finance.initial_investment);

    let adjusted = apply_sensitivity_with(financials, revenue_pct, cost_pct, assumptions.tax_rate);
    let kpis = calculate_all_kpis_with(&adjusted, initial_investment, &assumptions);
    tracing::debug!(npv = kpis.npv, irr = kpis.irr, "computed KPIs");

    serde_json::to_string_pretty(&KpiOutput { adjusted, kpis }).context("Failed to serialize KPIs")
}
