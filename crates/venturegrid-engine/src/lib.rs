//! venturegrid_engine - Spreadsheet formula engine for dashboard grids.

pub(crate) mod builtins;
pub mod engine;
pub mod error;

pub use engine::{CellRef, Grid, evaluate, recalculate};
pub use error::{EngineError, Result};
