//! Formula evaluation against a grid snapshot.
//!
//! A formula is evaluated in three steps: built-in range calls are expanded,
//! remaining cell references are substituted, and the resulting arithmetic is
//! evaluated. Referenced formula cells are evaluated depth-first.
//!
//! Resolution rules for a referenced cell:
//! - the cell being evaluated: `CircularReference`, which aborts the whole call
//! - outside the grid: `0` for a single reference, skipped inside a range
//! - a literal: its value
//! - a formula already on the evaluation stack: its cached value
//! - any other formula: evaluated recursively; failures other than a circular
//!   reference or [`MAX_EVAL_DEPTH`] read as `0`
//!
//! Outcomes that never fell back on a cached value depend only on the grid's
//! literals and formulas, so they are memoized and reused. Before evaluating,
//! the loop-free part of the dependency graph is evaluated bottom-up, which
//! keeps nesting shallow for long chains.

use std::collections::{HashMap, HashSet};

use super::arith::eval_arithmetic;
use super::cycle::acyclic_dependency_order;
use super::deps::extract_dependencies;
use super::preprocess::{expand_range_functions, strip_formula_prefix, substitute_cell_refs};
use super::{CellRef, Grid};
use crate::error::{EngineError, Result};

/// Most formula cells that may be mid-evaluation at once.
pub const MAX_EVAL_DEPTH: usize = 256;

/// Evaluate `formula` as if it lived at (`current_row`, `current_col`).
///
/// Returns `None` when the formula cannot be evaluated: a self-reference,
/// characters outside the arithmetic allow-list, a syntax error, or a
/// non-finite result.
pub fn evaluate(formula: &str, grid: &Grid, current_row: usize, current_col: usize) -> Option<f64> {
    let current = CellRef::new(current_row, current_col);
    match try_evaluate(formula, grid, current) {
        Ok(value) => Some(value),
        Err(err) => {
            tracing::debug!(cell = %current, formula, error = %err, "formula evaluation failed");
            None
        }
    }
}

/// Evaluate `formula` at `current`, keeping the failure reason.
pub fn try_evaluate(formula: &str, grid: &Grid, current: CellRef) -> Result<f64> {
    let mut evaluator = Evaluator {
        pinned: Some(current),
        ..Evaluator::default()
    };
    evaluator.prime(grid, extract_dependencies(formula));
    evaluator.run(formula, grid, current).0
}

/// Evaluation state kept across calls against one grid.
///
/// Memoized outcomes stay valid while formula cells' cached values change,
/// but not across edits to literals or formulas.
#[derive(Debug, Default)]
pub(crate) struct Evaluator {
    /// Cell that stays mid-evaluation for this evaluator's whole life, so
    /// reading its cached value is stable.
    pinned: Option<CellRef>,
    visiting: HashSet<CellRef>,
    memo: HashMap<CellRef, Result<f64>>,
    used_cached: bool,
}

impl Evaluator {
    /// Evaluate the loop-free formula cells reachable from `roots`, leaves
    /// first, so later lookups hit the memo instead of nesting.
    pub(crate) fn prime(&mut self, grid: &Grid, roots: impl IntoIterator<Item = CellRef>) {
        for cell_ref in acyclic_dependency_order(grid, roots, self.pinned) {
            if let Some(formula) = grid.cell(cell_ref).and_then(|cell| cell.formula()) {
                let _ = self.evaluate_cell(formula, grid, cell_ref);
            }
        }
    }

    /// Evaluate the formula stored at `cell_ref`, reusing a memoized outcome.
    pub(crate) fn evaluate_cell(
        &mut self,
        formula: &str,
        grid: &Grid,
        cell_ref: CellRef,
    ) -> Result<f64> {
        if let Some(outcome) = self.memo.get(&cell_ref) {
            return outcome.clone();
        }
        let (result, reusable) = self.run(formula, grid, cell_ref);
        if reusable && !matches!(result, Err(EngineError::CircularReference { .. })) {
            self.memo.insert(cell_ref, result.clone());
        }
        result
    }

    /// Evaluate `formula` at `current`. The flag says whether the outcome is
    /// free of cached values.
    fn run(&mut self, formula: &str, grid: &Grid, current: CellRef) -> (Result<f64>, bool) {
        let outer_used_cached = std::mem::take(&mut self.used_cached);
        self.visiting.insert(current);
        let result = self.eval_body(strip_formula_prefix(formula), grid, current);
        self.visiting.remove(&current);
        let reusable = !self.used_cached;
        self.used_cached |= outer_used_cached;
        (result, reusable)
    }

    fn eval_body(&mut self, body: &str, grid: &Grid, current: CellRef) -> Result<f64> {
        let expanded =
            expand_range_functions(body, |member| self.resolve_reference(member, grid, current))?;

        let substituted = substitute_cell_refs(&expanded, |cell_ref| match cell_ref {
            Some(target) => Ok(self.resolve_reference(target, grid, current)?.unwrap_or(0.0)),
            None => Ok(0.0),
        })?;

        eval_arithmetic(&substituted)
    }

    /// Resolve one referenced cell. `Ok(None)` means the cell does not exist.
    fn resolve_reference(
        &mut self,
        target: CellRef,
        grid: &Grid,
        current: CellRef,
    ) -> Result<Option<f64>> {
        if target == current {
            return Err(EngineError::CircularReference { cell: current });
        }

        let Some(cell) = grid.cell(target) else {
            return Ok(None);
        };

        let Some(formula) = cell.formula() else {
            return Ok(Some(cell.value));
        };

        if self.pinned == Some(target) {
            return Ok(Some(cell.value));
        }
        if self.visiting.contains(&target) {
            self.used_cached = true;
            return Ok(Some(cell.value));
        }

        if !self.memo.contains_key(&target) && self.visiting.len() >= MAX_EVAL_DEPTH {
            self.used_cached = true;
            return Err(EngineError::TooDeep { limit: MAX_EVAL_DEPTH });
        }

        match self.evaluate_cell(formula, grid, target) {
            Ok(value) => Ok(Some(value)),
            Err(err @ (EngineError::CircularReference { .. } | EngineError::TooDeep { .. })) => {
                Err(err)
            }
            Err(err) => {
                tracing::debug!(cell = %target, from = %current, error = %err, "referenced formula failed; using 0");
                Ok(Some(0.0))
            }
        }
    }
}
