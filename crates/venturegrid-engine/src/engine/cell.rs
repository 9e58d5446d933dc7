//! Cell data structures for the spreadsheet grid.
//!
//! This module provides the core data types for representing a sheet:
//! - [`Cell`] - A numeric value, optionally derived from a formula
//! - [`Row`] - A named, ordered run of cells
//! - [`Grid`] - Rows plus display-only column labels, with structural edits
//!
//! Addressing is purely positional: a [`CellRef`] indexes `rows[row].cells[col]`.
//! Column labels are never consulted when resolving references.

use serde::{Deserialize, Serialize};

use super::cell_ref::CellRef;
use crate::error::{EngineError, Result};

/// A single grid entry.
///
/// When `formula` is present, `value` is only the cached result of the last
/// recalculation and gets overwritten on the next pass.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct Cell {
    pub value: f64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub formula: Option<String>,
}

impl Cell {
    pub fn new_number(value: f64) -> Cell {
        Cell {
            value,
            formula: None,
        }
    }

    /// Create a formula cell with a zero cached value.
    pub fn new_formula(formula: &str) -> Cell {
        Cell {
            value: 0.0,
            formula: Some(formula.to_string()),
        }
    }

    /// The formula text, if this cell is derived. Blank formula text counts as a literal.
    pub fn formula(&self) -> Option<&str> {
        self.formula.as_deref().filter(|f| !f.trim().is_empty())
    }

    pub fn is_formula(&self) -> bool {
        self.formula().is_some()
    }
}

/// A named row of cells.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Row {
    pub row_name: String,
    pub cells: Vec<Cell>,
}

impl Row {
    pub fn new(row_name: &str, cells: Vec<Cell>) -> Row {
        Row {
            row_name: row_name.to_string(),
            cells,
        }
    }

    /// A row of literal values.
    pub fn from_values(row_name: &str, values: &[f64]) -> Row {
        Row::new(row_name, values.iter().copied().map(Cell::new_number).collect())
    }
}

/// The spreadsheet: ordered rows plus display-only column labels.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Grid {
    #[serde(default)]
    pub columns: Vec<String>,
    pub rows: Vec<Row>,
}

impl Default for Grid {
    /// A four-quarter sheet with revenue, costs and a profit row derived from them.
    fn default() -> Self {
        let columns: Vec<String> = (1..=4).map(|q| format!("Q{}", q)).collect();
        let zeros = vec![0.0; columns.len()];
        let profit = (0..columns.len())
            .map(|col| {
                Cell::new_formula(&format!(
                    "={}-{}",
                    CellRef::format(0, col),
                    CellRef::format(1, col)
                ))
            })
            .collect();

        Grid {
            rows: vec![
                Row::from_values("Revenue", &zeros),
                Row::from_values("Costs", &zeros),
                Row::new("Profit", profit),
            ],
            columns,
        }
    }
}

impl Grid {
    pub fn new(columns: Vec<String>, rows: Vec<Row>) -> Grid {
        Grid { columns, rows }
    }

    /// Build a label-less grid from literal values, one inner slice per row.
    pub fn from_values(values: &[&[f64]]) -> Grid {
        let rows = values
            .iter()
            .enumerate()
            .map(|(i, row)| Row::from_values(&format!("Row {}", i + 1), row))
            .collect();
        Grid::new(Vec::new(), rows)
    }

    pub fn row_count(&self) -> usize {
        self.rows.len()
    }

    /// Column count, taken from the first row.
    pub fn col_count(&self) -> usize {
        self.rows.first().map_or(0, |row| row.cells.len())
    }

    /// Look up a cell. Out-of-bounds coordinates (including short rows) yield `None`.
    pub fn cell(&self, cell_ref: CellRef) -> Option<&Cell> {
        self.rows.get(cell_ref.row)?.cells.get(cell_ref.col)
    }

    pub fn cell_mut(&mut self, cell_ref: CellRef) -> Option<&mut Cell> {
        self.rows.get_mut(cell_ref.row)?.cells.get_mut(cell_ref.col)
    }

    /// All cells in row-major order.
    pub fn cells(&self) -> impl Iterator<Item = (CellRef, &Cell)> {
        self.rows.iter().enumerate().flat_map(|(row, r)| {
            r.cells
                .iter()
                .enumerate()
                .map(move |(col, cell)| (CellRef::new(row, col), cell))
        })
    }

    /// Formula cells in row-major order, with their formula text.
    pub fn formula_cells(&self) -> impl Iterator<Item = (CellRef, &str)> {
        self.cells()
            .filter_map(|(cell_ref, cell)| cell.formula().map(|f| (cell_ref, f)))
    }

    fn checked_cell_mut(&mut self, cell_ref: CellRef) -> Result<&mut Cell> {
        let row = self
            .rows
            .get_mut(cell_ref.row)
            .ok_or(EngineError::RowOutOfBounds(cell_ref.row))?;
        row.cells
            .get_mut(cell_ref.col)
            .ok_or(EngineError::ColumnOutOfBounds(cell_ref.col))
    }

    /// Store a literal value. Any formula in the cell is replaced.
    pub fn set_value(&mut self, cell_ref: CellRef, value: f64) -> Result<()> {
        let cell = self.checked_cell_mut(cell_ref)?;
        cell.value = value;
        cell.formula = None;
        Ok(())
    }

    /// Store formula text. Blank text turns the cell back into a literal
    /// holding its current value. Nothing is evaluated until recalculation.
    pub fn set_formula(&mut self, cell_ref: CellRef, formula: &str) -> Result<()> {
        let cell = self.checked_cell_mut(cell_ref)?;
        cell.formula = if formula.trim().is_empty() {
            None
        } else {
            Some(formula.to_string())
        };
        Ok(())
    }

    /// Append a row of zero cells sized to the current column count.
    /// Returns the new row's index.
    pub fn add_row(&mut self, row_name: &str) -> usize {
        let cells = vec![Cell::default(); self.col_count()];
        self.rows.push(Row::new(row_name, cells));
        self.rows.len() - 1
    }

    /// Remove a row. The last remaining row is never removed.
    pub fn remove_row(&mut self, at_row: usize) -> Result<Row> {
        if at_row >= self.rows.len() {
            return Err(EngineError::RowOutOfBounds(at_row));
        }
        if self.rows.len() == 1 {
            return Err(EngineError::LastRow);
        }
        Ok(self.rows.remove(at_row))
    }

    /// Append a column: a label plus a zero cell at the end of every row.
    /// Returns the new column's index.
    pub fn add_column(&mut self, label: &str) -> usize {
        let at = self.col_count();
        for row in &mut self.rows {
            row.cells.push(Cell::default());
        }
        self.columns.push(label.to_string());
        at
    }

    /// Remove a column from every row. The last remaining column is never removed.
    ///
    /// Formula text is left as-is; references past the new edge read as 0.
    pub fn remove_column(&mut self, at_col: usize) -> Result<()> {
        let cols = self.col_count();
        if at_col >= cols {
            return Err(EngineError::ColumnOutOfBounds(at_col));
        }
        if cols == 1 {
            return Err(EngineError::LastColumn);
        }
        for row in &mut self.rows {
            if at_col < row.cells.len() {
                row.cells.remove(at_col);
            }
        }
        if at_col < self.columns.len() {
            self.columns.remove(at_col);
        }
        Ok(())
    }

    /// Recalculate every formula cell, returning a new grid.
    pub fn recalculate(&self) -> Grid {
        super::recalc::recalculate(self)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_default_grid_seeds_profit_formulas() {
        let grid = Grid::default();
        assert_eq!(grid.columns, vec!["Q1", "Q2", "Q3", "Q4"]);
        assert_eq!(grid.row_count(), 3);
        assert_eq!(grid.col_count(), 4);
        assert_eq!(grid.rows[2].cells[0].formula(), Some("=A1-A2"));
        assert_eq!(grid.rows[2].cells[3].formula(), Some("=D1-D2"));
    }

    #[test]
    fn test_blank_formula_is_literal() {
        let cell = Cell {
            value: 3.0,
            formula: Some("   ".to_string()),
        };
        assert!(!cell.is_formula());
        assert!(Cell::new_formula("=1").is_formula());
    }

    #[test]
    fn test_cell_lookup_out_of_bounds() {
        let grid = Grid::from_values(&[&[1.0, 2.0], &[3.0]]);
        assert_eq!(grid.cell(CellRef::new(0, 1)).map(|c| c.value), Some(2.0));
        assert!(grid.cell(CellRef::new(1, 1)).is_none());
        assert!(grid.cell(CellRef::new(5, 0)).is_none());
    }

    #[test]
    fn test_set_value_replaces_formula() {
        let mut grid = Grid::default();
        let profit = CellRef::new(2, 0);
        grid.set_value(profit, 12.5).unwrap();
        assert_eq!(grid.cell(profit), Some(&Cell::new_number(12.5)));
    }

    #[test]
    fn test_set_formula_and_clear() {
        let mut grid = Grid::from_values(&[&[1.0, 2.0]]);
        let b1 = CellRef::new(0, 1);
        grid.set_formula(b1, "=A1*2").unwrap();
        assert_eq!(grid.cell(b1).and_then(|c| c.formula()), Some("=A1*2"));
        grid.set_formula(b1, "").unwrap();
        assert_eq!(grid.cell(b1), Some(&Cell::new_number(2.0)));
    }

    #[test]
    fn test_edits_out_of_bounds_are_errors() {
        let mut grid = Grid::from_values(&[&[1.0]]);
        assert_eq!(
            grid.set_value(CellRef::new(3, 0), 1.0),
            Err(EngineError::RowOutOfBounds(3))
        );
        assert_eq!(
            grid.set_formula(CellRef::new(0, 4), "=1"),
            Err(EngineError::ColumnOutOfBounds(4))
        );
    }

    #[test]
    fn test_add_and_remove_rows() {
        let mut grid = Grid::default();
        let idx = grid.add_row("Headcount");
        assert_eq!(idx, 3);
        assert_eq!(grid.rows[3].cells.len(), 4);

        let removed = grid.remove_row(0).unwrap();
        assert_eq!(removed.row_name, "Revenue");
        assert_eq!(grid.row_count(), 3);
        assert_eq!(grid.remove_row(7), Err(EngineError::RowOutOfBounds(7)));
    }

    #[test]
    fn test_last_row_is_retained() {
        let mut grid = Grid::from_values(&[&[1.0, 2.0]]);
        assert_eq!(grid.remove_row(0), Err(EngineError::LastRow));
        assert_eq!(grid.row_count(), 1);
    }

    #[test]
    fn test_add_and_remove_columns() {
        let mut grid = Grid::default();
        assert_eq!(grid.add_column("Q5"), 4);
        assert!(grid.rows.iter().all(|r| r.cells.len() == 5));
        assert_eq!(grid.columns.last().map(String::as_str), Some("Q5"));

        grid.remove_column(0).unwrap();
        assert_eq!(grid.columns, vec!["Q2", "Q3", "Q4", "Q5"]);
        assert!(grid.rows.iter().all(|r| r.cells.len() == 4));
        // Formula text is not rewritten by structural edits.
        assert_eq!(grid.rows[2].cells[0].formula(), Some("=B1-B2"));
    }

    #[test]
    fn test_last_column_is_retained() {
        let mut grid = Grid::from_values(&[&[1.0], &[2.0]]);
        assert_eq!(grid.remove_column(0), Err(EngineError::LastColumn));
        assert_eq!(grid.remove_column(1), Err(EngineError::ColumnOutOfBounds(1)));
    }

    #[test]
    fn test_formula_cells_row_major() {
        let mut grid = Grid::from_values(&[&[1.0, 2.0], &[3.0, 4.0]]);
        grid.set_formula(CellRef::new(1, 0), "=B1").unwrap();
        grid.set_formula(CellRef::new(0, 1), "=A1").unwrap();
        let refs: Vec<CellRef> = grid.formula_cells().map(|(r, _)| r).collect();
        assert_eq!(refs, vec![CellRef::new(0, 1), CellRef::new(1, 0)]);
    }

    #[test]
    fn test_serde_shape() {
        let grid = Grid::new(
            vec!["Q1".to_string()],
            vec![Row::new("Net", vec![Cell::new_formula("=A1")]), Row::from_values("Rev", &[5.0])],
        );
        let json = serde_json::to_value(&grid).unwrap();
        assert_eq!(
            json,
            serde_json::json!({
                "columns": ["Q1"],
                "rows": [
                    {"rowName": "Net", "cells": [{"value": 0.0, "formula": "=A1"}]},
                    {"rowName": "Rev", "cells": [{"value": 5.0}]}
                ]
            })
        );
        let back: Grid = serde_json::from_value(json).unwrap();
        assert_eq!(back, grid);
    }
}
