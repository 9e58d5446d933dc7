//! Error types for the financial math engine.
//!
//! The public KPI functions report failure as `NaN`; these variants carry the
//! reason for callers that use the `try_` entry points.

use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq)]
pub enum FinanceError {
    #[error("IRR needs at least one positive and one negative cash flow")]
    NoSignChange,

    #[error("IRR derivative vanished at iteration {iteration}")]
    FlatDerivative { iteration: u32 },

    #[error("IRR estimate diverged at iteration {iteration}")]
    Diverged { iteration: u32 },

    #[error("IRR did not converge after {iterations} iterations (last rate: {last_rate})")]
    NoConvergence { iterations: u32, last_rate: f64 },
}

pub type FinanceResult<T> = std::result::Result<T, FinanceError>;
