//! Error types for the formula engine.

use thiserror::Error;

use crate::engine::CellRef;

/// Errors raised while evaluating formulas or editing a grid.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum EngineError {
    #[error("Circular reference: {cell} refers to itself")]
    CircularReference { cell: CellRef },

    #[error("Formula references nest deeper than {limit} cells")]
    TooDeep { limit: usize },

    #[error("Invalid expression: {0}")]
    InvalidExpression(String),

    #[error("Expression did not produce a finite number")]
    NonFinite,

    #[error("Cannot remove the last row")]
    LastRow,

    #[error("Cannot remove the last column")]
    LastColumn,

    #[error("Row {0} is out of bounds")]
    RowOutOfBounds(usize),

    #[error("Column {0} is out of bounds")]
    ColumnOutOfBounds(usize),
}

pub type Result<T> = std::result::Result<T, EngineError>;
