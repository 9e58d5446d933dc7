//! Spreadsheet formula engine API.
//!
//! This module provides the computation engine for dashboard sheets:
//!
//! - [`Cell`], [`Row`], [`Grid`] - Data structures for cell storage and structural edits
//! - [`CellRef`] - Cell reference parsing (A1 notation ↔ row/col indices)
//! - [`evaluate`] - Evaluate one formula against a grid snapshot
//! - [`recalculate`] - Fixed-point recalculation of a whole grid
//! - [`detect_cycle`], [`find_cycles`] - Reference loop detection
//! - [`extract_dependencies`] - Parse formula dependencies

mod arith;
mod cell;
mod cell_ref;
mod cycle;
mod deps;
mod eval;
mod preprocess;
mod recalc;

pub use arith::eval_arithmetic;
pub use cell::{Cell, Grid, Row};
pub use cell_ref::CellRef;
pub use cycle::{detect_cycle, find_cycles};
pub use deps::{extract_dependencies, parse_range, range_members};
pub use eval::{MAX_EVAL_DEPTH, evaluate, try_evaluate};
pub use preprocess::{expand_range_functions, strip_formula_prefix, substitute_cell_refs};
pub use recalc::{MAX_RECALC_PASSES, RecalcOptions, RecalcReport, recalculate, recalculate_with};
