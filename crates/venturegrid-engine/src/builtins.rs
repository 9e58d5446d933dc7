//! Built-in range functions and their metadata.
//!
//! Conventions:
//! - Function names are matched case-insensitively (`sum(A1:B2)` works).
//! - A call is expanded textually to its numeric result before arithmetic
//!   evaluation, so built-ins cannot nest inside one another.
//! - If you add a new built-in, update `RANGE_BUILTINS`; the call regex is
//!   generated from the table.

use regex::Regex;
use std::sync::OnceLock;

/// Aggregation applied to the resolved members of a range.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum RangeFn {
    Sum,
    Average,
    Min,
    Max,
}

impl RangeFn {
    /// Aggregate resolved values. An empty set aggregates to 0 for every function.
    pub fn apply(self, values: &[f64]) -> f64 {
        if values.is_empty() {
            return 0.0;
        }
        match self {
            RangeFn::Sum => values.iter().sum(),
            RangeFn::Average => values.iter().sum::<f64>() / values.len() as f64,
            RangeFn::Min => values.iter().copied().fold(f64::INFINITY, f64::min),
            RangeFn::Max => values.iter().copied().fold(f64::NEG_INFINITY, f64::max),
        }
    }
}

pub struct RangeBuiltin {
    pub sheet_name: &'static str,
    pub function: RangeFn,
}

pub const RANGE_BUILTINS: &[RangeBuiltin] = &[
    RangeBuiltin {
        sheet_name: "SUM",
        function: RangeFn::Sum,
    },
    RangeBuiltin {
        sheet_name: "AVERAGE",
        function: RangeFn::Average,
    },
    RangeBuiltin {
        sheet_name: "MIN",
        function: RangeFn::Min,
    },
    RangeBuiltin {
        sheet_name: "MAX",
        function: RangeFn::Max,
    },
];

/// Regex that matches built-in calls like `SUM(A1:B5)` or `max(A1, C3)`.
///
/// Captures:
/// - group 1: function name as written (e.g. `SUM`, `sum`)
/// - group 2: the raw argument text (e.g. `A1:B5`, `A1, C3`)
pub fn range_fn_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| {
        let names = RANGE_BUILTINS
            .iter()
            .map(|b| b.sheet_name)
            .collect::<Vec<_>>()
            .join("|");
        Regex::new(&format!(r"(?i)\b({})\(([^()]*)\)", names))
            .expect("built-in range regex must compile")
    })
}

/// Look up a built-in by name, ignoring case.
pub fn range_fn(sheet_name: &str) -> Option<RangeFn> {
    RANGE_BUILTINS
        .iter()
        .find(|b| b.sheet_name.eq_ignore_ascii_case(sheet_name))
        .map(|b| b.function)
}
