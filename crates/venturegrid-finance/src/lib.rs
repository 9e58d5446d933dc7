//! venturegrid_finance - Sensitivity analysis and KPI math for startup projections.
//!
//! Everything here is pure computation over plain data:
//!
//! - [`apply_sensitivity`] shifts quarterly revenue/COGS and derives profit figures
//! - [`npv`] and [`irr`] are the discounted-cash-flow primitives
//! - [`calculate_all_kpis`] aggregates adjusted quarters into portfolio KPIs
//!
//! Undefined NPV/IRR results are `NaN`, never errors; use [`try_irr`] for the reason.

pub mod error;
pub mod kpi;
pub mod sensitivity;
pub mod time_value;
pub mod types;

pub use error::{FinanceError, FinanceResult};
pub use kpi::{calculate_all_kpis, calculate_all_kpis_with};
pub use sensitivity::{TAX_RATE, apply_sensitivity, apply_sensitivity_with};
pub use time_value::{
    DEFAULT_DISCOUNT_RATE, DEFAULT_IRR_GUESS, IRR_TOLERANCE, MAX_IRR_ITERATIONS, irr, npv,
    try_irr,
};
pub use types::{
    AdjustedQuarter, Assumptions, CalculatedKpis, FinancialProjections,
    FinancialProjectionsAdjusted, Money, Percent, QuarterProjection, Rate, StartupFinancials,
};
