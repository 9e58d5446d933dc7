//! A1-style addresses for dashboard grid cells.
//!
//! Columns are uppercase letters (`A`..`Z`, then `AA`), rows count from 1 in
//! text and from 0 in a [`CellRef`].
//!
//! ```
//! use venturegrid_engine::engine::CellRef;
//!
//! let revenue_q2 = CellRef::parse("B1").unwrap();
//! assert_eq!((revenue_q2.row, revenue_q2.col), (0, 1));
//! assert_eq!(revenue_q2.to_string(), "B1");
//! assert_eq!(CellRef::parse("b1"), None);
//! ```

use regex::Regex;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::sync::OnceLock;

/// A reference to a cell by row and column indices (0-indexed).
///
/// Ordering is row-major, which is also the order recalculation visits cells.
#[derive(Clone, Copy, Debug, Hash, Eq, PartialEq, Ord, PartialOrd, Serialize, Deserialize)]
pub struct CellRef {
    pub row: usize,
    pub col: usize,
}

impl CellRef {
    pub const fn new(row: usize, col: usize) -> CellRef {
        CellRef { row, col }
    }

    /// Parse `"C3"`-style text.
    ///
    /// Only uppercase column letters are accepted. Returns `None` for anything
    /// that is not a reference, including row `0` and coordinates that would
    /// overflow `usize`.
    pub fn parse(name: &str) -> Option<CellRef> {
        let caps = a1_re().captures(name)?;
        let letters = &caps["letters"];

        // Bijective base 26: A = 1 .. Z = 26.
        let col = letters
            .bytes()
            .try_fold(0usize, |acc, c| {
                acc.checked_mul(26)?.checked_add((c - b'A') as usize + 1)
            })?
            .checked_sub(1)?;

        let row = caps["numbers"].parse::<usize>().ok()?.checked_sub(1)?;

        Some(CellRef::new(row, col))
    }

    /// Serialize a row/column pair back to A1 notation.
    pub fn format(row: usize, col: usize) -> String {
        CellRef::new(row, col).to_string()
    }

    /// Column letters for a zero-based index: 0 is `A`, 26 is `AA`.
    pub fn col_to_letters(col: usize) -> String {
        let mut letters = Vec::new();
        let mut remaining = col as u128 + 1;
        while remaining > 0 {
            remaining -= 1;
            letters.push(b'A' + (remaining % 26) as u8);
            remaining /= 26;
        }
        letters.iter().rev().map(|&b| b as char).collect()
    }
}

fn a1_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| {
        Regex::new(r"^(?<letters>[A-Z]+)(?<numbers>[0-9]+)$")
            .expect("cell reference regex must compile")
    })
}

impl std::str::FromStr for CellRef {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s).ok_or_else(|| format!("Invalid cell reference: {}", s))
    }
}

impl fmt::Display for CellRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}{}", CellRef::col_to_letters(self.col), self.row as u128 + 1)
    }
}
