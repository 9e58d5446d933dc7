//! Whole-grid recalculation.
//!
//! Recalculation works on a copy of the grid and runs repeated row-major
//! passes over the formula cells, writing each newly computed value straight
//! back into the copy so later cells in the same pass see it. It stops at the
//! first pass that changes nothing, or after `max_passes`.
//!
//! Only a cell that names itself fails outright. Longer reference loops keep
//! feeding each other cached values and stop changing only when the pass cap
//! is reached; [`RecalcReport::cycles`] lists them when cycle detection is on.
//!
//! One evaluator serves every pass, so a loop-free cell is computed once per
//! recalculation no matter how many formulas read it.

use serde::Serialize;

use super::cycle::find_cycles;
use super::eval::Evaluator;
use super::{CellRef, Grid};

/// Pass cap used by [`recalculate`].
pub const MAX_RECALC_PASSES: usize = 10;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct RecalcOptions {
    /// Upper bound on full passes over the grid.
    pub max_passes: usize,
    /// Run dependency-graph cycle detection and fill [`RecalcReport::cycles`].
    pub detect_cycles: bool,
}

impl Default for RecalcOptions {
    fn default() -> Self {
        RecalcOptions {
            max_passes: MAX_RECALC_PASSES,
            detect_cycles: true,
        }
    }
}

/// What happened during a recalculation.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RecalcReport {
    /// Passes actually run.
    pub passes: usize,
    /// Whether the last pass changed nothing.
    pub converged: bool,
    /// Formula cells that could not be evaluated in the last pass. Their
    /// values are left as they were.
    pub failed: Vec<CellRef>,
    /// Reference loops found in the formula graph.
    pub cycles: Vec<Vec<CellRef>>,
}

/// Recalculate every formula cell with the default pass cap.
///
/// The input grid is not modified.
pub fn recalculate(grid: &Grid) -> Grid {
    let options = RecalcOptions {
        detect_cycles: false,
        ..RecalcOptions::default()
    };
    recalculate_with(grid, &options).0
}

/// Recalculate every formula cell and report how it went.
pub fn recalculate_with(grid: &Grid, options: &RecalcOptions) -> (Grid, RecalcReport) {
    let mut working = grid.clone();
    let mut report = RecalcReport::default();

    let formula_cells: Vec<(CellRef, String)> = working
        .formula_cells()
        .map(|(cell_ref, formula)| (cell_ref, formula.to_string()))
        .collect();

    if options.detect_cycles {
        report.cycles = find_cycles(&working);
        if !report.cycles.is_empty() {
            tracing::warn!(count = report.cycles.len(), "formula grid contains reference cycles");
        }
    }

    let mut evaluator = Evaluator::default();
    evaluator.prime(&working, formula_cells.iter().map(|(cell_ref, _)| *cell_ref));

    for pass in 1..=options.max_passes {
        report.passes = pass;
        report.failed.clear();
        let mut changed = 0usize;

        for (cell_ref, formula) in &formula_cells {
            match evaluator.evaluate_cell(formula, &working, *cell_ref) {
                Ok(value) => {
                    if let Some(cell) = working.cell_mut(*cell_ref)
                        && cell.value != value
                    {
                        cell.value = value;
                        changed += 1;
                    }
                }
                Err(err) => {
                    tracing::debug!(cell = %cell_ref, formula = formula.as_str(), error = %err, "formula evaluation failed");
                    report.failed.push(*cell_ref);
                }
            }
        }

        tracing::debug!(pass, changed, "recalculation pass complete");
        if changed == 0 {
            report.converged = true;
            break;
        }
    }

    if !report.converged {
        tracing::warn!(
            passes = report.passes,
            "recalculation stopped at the pass cap without reaching a fixed point"
        );
    }

    (working, report)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::engine::{Cell, Row};
    use pretty_assertions::assert_eq;

    fn incubator_sheet() -> Grid {
        Grid::new(
            vec!["Q1".to_string()],
            vec![
                Row::from_values("Rev", &[100.0]),
                Row::from_values("Cost", &[40.0]),
                Row::new("Net", vec![Cell::new_formula("=A1-A2")]),
            ],
        )
    }

    #[test]
    fn test_net_row_is_revenue_minus_cost() {
        let out = recalculate(&incubator_sheet());
        assert_eq!(out.rows[2].cells[0].value, 60.0);
        assert_eq!(out.rows[2].cells[0].formula(), Some("=A1-A2"));
    }

    #[test]
    fn test_input_grid_is_untouched() {
        let grid = incubator_sheet();
        let _ = recalculate(&grid);
        assert_eq!(grid, incubator_sheet());
    }

    #[test]
    fn test_acyclic_grid_is_idempotent() {
        let mut grid = Grid::default();
        for col in 0..4 {
            grid.set_value(CellRef::new(0, col), 100.0 * (col + 1) as f64).unwrap();
            grid.set_value(CellRef::new(1, col), 30.0).unwrap();
        }
        grid.add_row("Total");
        grid.set_formula(CellRef::new(3, 0), "=SUM(A3:D3)").unwrap();

        let (once, report) = recalculate_with(&grid, &RecalcOptions::default());
        assert!(report.converged);
        assert!(report.passes <= MAX_RECALC_PASSES);
        assert!(report.cycles.is_empty());
        assert_eq!(once.rows[3].cells[0].value, 880.0);

        let (twice, report) = recalculate_with(&once, &RecalcOptions::default());
        assert_eq!(twice, once);
        assert_eq!(report.passes, 1);
        assert!(report.converged);
    }

    #[test]
    fn test_forward_references_settle() {
        // A1 reads B1 which is later in row-major order.
        let mut grid = Grid::from_values(&[&[0.0, 0.0, 5.0]]);
        grid.set_formula(CellRef::new(0, 0), "=B1*2").unwrap();
        grid.set_formula(CellRef::new(0, 1), "=C1+1").unwrap();
        let (out, report) = recalculate_with(&grid, &RecalcOptions::default());
        assert_eq!(out.rows[0].cells[0].value, 12.0);
        assert_eq!(out.rows[0].cells[1].value, 6.0);
        assert!(report.converged);
        assert_eq!(report.passes, 2);
    }

    #[test]
    fn test_self_reference_fails_only_that_cell() {
        let mut grid = incubator_sheet();
        grid.rows.push(Row::new("Loop", vec![Cell {
            value: 7.0,
            formula: Some("=A4+1".to_string()),
        }]));
        let (out, report) = recalculate_with(&grid, &RecalcOptions::default());
        assert_eq!(out.rows[2].cells[0].value, 60.0);
        assert_eq!(out.rows[3].cells[0].value, 7.0);
        assert_eq!(report.failed, vec![CellRef::new(3, 0)]);
        assert_eq!(report.cycles, vec![vec![CellRef::new(3, 0)]]);
        assert!(report.converged);
    }

    #[test]
    fn test_mutual_reference_stops_at_pass_cap() {
        let mut grid = Grid::from_values(&[&[0.0, 0.0]]);
        grid.set_formula(CellRef::new(0, 0), "=B1+1").unwrap();
        grid.set_formula(CellRef::new(0, 1), "=A1+1").unwrap();

        let (out, report) = recalculate_with(&grid, &RecalcOptions::default());
        assert_eq!(report.passes, MAX_RECALC_PASSES);
        assert!(!report.converged);
        assert!(report.failed.is_empty());
        assert_eq!(
            report.cycles,
            vec![vec![CellRef::new(0, 0), CellRef::new(0, 1)]]
        );
        // Each pass feeds the other cell's cached value back in: both grow by 2.
        assert_eq!(out.rows[0].cells[0].value, 20.0);
        assert_eq!(out.rows[0].cells[1].value, 20.0);
    }

    #[test]
    fn test_custom_pass_cap() {
        let mut grid = Grid::from_values(&[&[0.0, 0.0]]);
        grid.set_formula(CellRef::new(0, 0), "=B1+1").unwrap();
        grid.set_formula(CellRef::new(0, 1), "=A1+1").unwrap();
        let options = RecalcOptions {
            max_passes: 3,
            detect_cycles: false,
        };
        let (_, report) = recalculate_with(&grid, &options);
        assert_eq!(report.passes, 3);
        assert!(report.cycles.is_empty());
    }

    #[test]
    fn test_grid_without_formulas_converges_immediately() {
        let grid = Grid::from_values(&[&[1.0, 2.0]]);
        let (out, report) = recalculate_with(&grid, &RecalcOptions::default());
        assert_eq!(out, grid);
        assert_eq!(report.passes, 1);
        assert!(report.converged);
    }

    #[test]
    fn test_removed_row_references_read_zero() {
        let mut grid = incubator_sheet();
        grid.remove_row(0).unwrap();
        // "Net" is now row 1 and its formula still says A1-A2: A1 is Cost, A2 is itself.
        let (out, report) = recalculate_with(&grid, &RecalcOptions::default());
        assert_eq!(report.failed, vec![CellRef::new(1, 0)]);
        assert_eq!(out.rows[1].cells[0].value, 0.0);
    }

    fn balance_column(len: usize, step: impl Fn(usize) -> String) -> Grid {
        let mut rows = vec![Row::from_values("Opening", &[1.0])];
        for row in 1..len {
            rows.push(Row::new(&format!("Month {}", row), vec![Cell::new_formula(&step(row))]));
        }
        Grid::new(vec!["Balance".to_string()], rows)
    }

    #[test]
    fn test_long_running_balance_converges() {
        let grid = balance_column(10_000, |row| format!("=A{}+1", row));
        let (out, report) = recalculate_with(&grid, &RecalcOptions::default());
        assert!(report.converged);
        assert_eq!(report.passes, 2);
        assert!(report.failed.is_empty());
        assert!(report.cycles.is_empty());
        assert_eq!(out.rows[9_999].cells[0].value, 10_000.0);
    }

    #[test]
    fn test_long_chain_written_bottom_up_converges() {
        // Every row reads the row below it; the last row is the literal.
        let len = 10_000;
        let mut rows: Vec<Row> = (0..len - 1)
            .map(|row| Row::new("Step", vec![Cell::new_formula(&format!("=A{}+1", row + 2))]))
            .collect();
        rows.push(Row::from_values("Closing", &[1.0]));
        let grid = Grid::new(vec!["Balance".to_string()], rows);

        let (out, report) = recalculate_with(&grid, &RecalcOptions::default());
        assert!(report.converged);
        assert_eq!(out.rows[0].cells[0].value, len as f64);
    }

    #[test]
    fn test_doubling_column_recalculates() {
        let grid = balance_column(40, |row| format!("=A{}+A{}", row, row));
        let out = recalculate(&grid);
        assert_eq!(out.rows[39].cells[0].value, 2f64.powi(39));
    }
}
