//! Formula preprocessing: turning formula text into plain arithmetic.
//!
//! Before a formula can be handed to the arithmetic evaluator, everything that
//! names a cell must be replaced by a number:
//!
//! - **Range functions**: `SUM(A1:B2)` → `10`, `MAX(A1, C3)` → `7`
//! - **Cell references**: `A1` → `100`
//!
//! Range functions are expanded first so their arguments are not mistaken for
//! single references. How a reference resolves is left to the caller.

use super::cell_ref::CellRef;
use super::deps::{cell_ref_re, range_members};
use crate::builtins::{range_fn, range_fn_re};
use crate::error::Result;

/// Render a value for splicing back into formula text.
///
/// `f64`'s `Display` never emits an exponent, so the result stays within the
/// arithmetic character set.
fn format_operand(n: f64) -> String {
    n.to_string()
}

/// Strip a single leading `=`, if present.
pub fn strip_formula_prefix(formula: &str) -> &str {
    formula.strip_prefix('=').unwrap_or(formula)
}

/// Replace every built-in call with its aggregated value.
///
/// `resolve` returns `Ok(None)` for members that do not exist; those are
/// skipped rather than counted as zero. Errors from `resolve` abort the
/// expansion.
pub fn expand_range_functions<F>(script: &str, mut resolve: F) -> Result<String>
where
    F: FnMut(CellRef) -> Result<Option<f64>>,
{
    let mut out = String::with_capacity(script.len());
    let mut last = 0;

    for caps in range_fn_re().captures_iter(script) {
        let Some(whole) = caps.get(0) else {
            continue;
        };
        out.push_str(&script[last..whole.start()]);
        last = whole.end();

        let Some(function) = range_fn(&caps[1]) else {
            out.push_str(whole.as_str());
            continue;
        };

        let mut values = Vec::new();
        for member in range_members(&caps[2]) {
            if let Some(value) = resolve(member)? {
                values.push(value);
            }
        }
        out.push_str(&format_operand(function.apply(&values)));
    }

    out.push_str(&script[last..]);
    Ok(out)
}

/// Replace every cell reference with the value `resolve` gives it.
///
/// Tokens that look like references but fail to parse (e.g. `A0`) are passed
/// to `resolve` as `None`.
pub fn substitute_cell_refs<F>(script: &str, mut resolve: F) -> Result<String>
where
    F: FnMut(Option<CellRef>) -> Result<f64>,
{
    let mut out = String::with_capacity(script.len());
    let mut last = 0;

    for m in cell_ref_re().find_iter(script) {
        out.push_str(&script[last..m.start()]);
        last = m.end();
        let value = resolve(CellRef::parse(m.as_str()))?;
        out.push_str(&format_operand(value));
    }

    out.push_str(&script[last..]);
    Ok(out)
}
