//! Dependency extraction from formula strings.
//!
//! Parses formula text to find all cell references (e.g., `A1`, `B2:C5`)
//! that the formula reads. This is used for cycle detection.
//!
//! Handles:
//! - Simple cell references: `A1`, `B2`
//! - Rectangular ranges in built-ins: `SUM(A1:B5)`
//! - Comma lists in built-ins: `MAX(A1, C3, D7)`

use regex::Regex;
use std::sync::OnceLock;

use super::cell_ref::CellRef;
use super::Grid;

const MAX_DEPENDENCY_RANGE_CELLS: usize = 1_000_000;

/// Extract all cell references from a formula as dependencies.
pub fn extract_dependencies(formula: &str) -> Vec<CellRef> {
    let mut deps = Vec::new();

    let range_re = crate::builtins::range_fn_re();

    // Remove built-in calls first so their arguments are not counted twice.
    let without_ranges = range_re.replace_all(formula, "").to_string();

    for caps in range_re.captures_iter(formula) {
        deps.extend(range_members(&caps[2]));
    }

    for caps in cell_ref_re().captures_iter(&without_ranges) {
        if let Some(cr) = CellRef::parse(&caps[0]) {
            deps.push(cr);
        }
    }

    deps
}

/// Dependencies of the formula stored at `cell`, or `None` when the cell is
/// missing or holds a literal.
pub(crate) fn formula_dependencies(grid: &Grid, cell: CellRef) -> Option<Vec<CellRef>> {
    grid.cell(cell)?.formula().map(extract_dependencies)
}

/// Regex for bare cell references inside a formula: uppercase letters then digits.
pub(crate) fn cell_ref_re() -> &'static Regex {
    static CELL_RE: OnceLock<Regex> = OnceLock::new();
    CELL_RE.get_or_init(|| {
        Regex::new(r"\b([A-Z]+)([0-9]+)\b").expect("cell reference regex must compile")
    })
}

/// Parse a cell range like "A1:B5" into its two corners, as written.
pub fn parse_range(range: &str) -> Option<(CellRef, CellRef)> {
    let (start, end) = range.split_once(':')?;
    let start = CellRef::parse(start.trim())?;
    let end = CellRef::parse(end.trim())?;
    Some((start, end))
}

/// Expand a built-in argument into the cells it names, row-major.
///
/// The argument is a comma-separated list where each item is a single
/// reference or an inclusive `REF:REF` rectangle (corners in any order).
/// Items that do not parse are skipped, as are rectangles larger than
/// `MAX_DEPENDENCY_RANGE_CELLS`.
pub fn range_members(arg: &str) -> Vec<CellRef> {
    let mut members = Vec::new();

    for item in arg.split(',').map(str::trim) {
        if item.contains(':') {
            let Some((start, end)) = parse_range(item) else {
                continue;
            };
            let min_row = start.row.min(end.row);
            let max_row = start.row.max(end.row);
            let min_col = start.col.min(end.col);
            let max_col = start.col.max(end.col);

            let row_count = max_row - min_row + 1;
            let col_count = max_col - min_col + 1;
            let Some(cell_count) = row_count.checked_mul(col_count) else {
                continue;
            };
            if cell_count > MAX_DEPENDENCY_RANGE_CELLS {
                continue;
            }

            for row in min_row..=max_row {
                for col in min_col..=max_col {
                    members.push(CellRef::new(row, col));
                }
            }
        } else if let Some(cr) = CellRef::parse(item) {
            members.push(cr);
        }
    }

    members
}
